//! Device dialects and the device-type to template-platform mapping.
//!
//! A *dialect* describes what to speak on the wire for a connection driver
//! identifier: the prompt pattern that terminates a read and the commands to
//! run after login (paging disable and friends). The *platform* is a separate
//! identifier used to select a template family; several dialects can map to
//! one platform (e.g. `cisco_xe` uses `cisco_ios` templates).

mod dialect;
mod registry;

pub use dialect::Dialect;
pub use registry::DialectRegistry;

use std::collections::HashMap;

/// Many-to-one map from connection driver identifier to template platform.
///
/// Unmapped identifiers fall back to themselves, so a new device type works
/// out of the box as long as its templates are indexed under the same name.
#[derive(Debug, Clone)]
pub struct DeviceTypeMap {
    map: HashMap<String, String>,
}

impl DeviceTypeMap {
    /// Create an empty mapping (every device type maps to itself).
    pub fn empty() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Insert or replace a mapping.
    pub fn insert(&mut self, device_type: impl Into<String>, platform: impl Into<String>) {
        self.map.insert(device_type.into(), platform.into());
    }

    /// Resolve the template platform for a device type.
    pub fn platform_for<'a>(&'a self, device_type: &'a str) -> &'a str {
        self.map
            .get(device_type)
            .map(String::as_str)
            .unwrap_or(device_type)
    }
}

impl Default for DeviceTypeMap {
    /// The built-in mapping, mirroring common template-index conventions.
    fn default() -> Self {
        let mut m = Self::empty();
        m.insert("cisco_ios", "cisco_ios");
        m.insert("cisco_xe", "cisco_ios");
        m.insert("cisco_nxos", "cisco_nxos");
        m.insert("cisco_asa", "cisco_asa");
        m.insert("arista_eos", "arista_eos");
        m.insert("juniper_junos", "juniper_junos");
        m.insert("linux", "linux");
        m
    }
}
