//! Registry of built-in and user-registered dialects.

use std::collections::HashMap;

use log::debug;

use super::dialect::Dialect;

/// Registry mapping driver identifiers to dialects.
///
/// Lookup never fails: unknown identifiers get [`Dialect::generic`], because
/// raw-text collection must not depend on dialect coverage.
#[derive(Debug)]
pub struct DialectRegistry {
    dialects: HashMap<String, Dialect>,
    generic: Dialect,
}

impl DialectRegistry {
    /// Create an empty registry (everything resolves to the generic dialect).
    pub fn empty() -> Self {
        Self {
            dialects: HashMap::new(),
            generic: Dialect::generic(),
        }
    }

    /// Register or replace a dialect under its own name.
    pub fn register(&mut self, dialect: Dialect) {
        self.dialects.insert(dialect.name.clone(), dialect);
    }

    /// Look up the dialect for a driver identifier.
    pub fn get(&self, device_type: &str) -> &Dialect {
        match self.dialects.get(device_type) {
            Some(d) => d,
            None => {
                debug!("no dialect for '{device_type}', using generic prompt matching");
                &self.generic
            }
        }
    }

    /// Whether a dialect is registered under this name.
    pub fn contains(&self, device_type: &str) -> bool {
        self.dialects.contains_key(device_type)
    }

    /// Names of all registered dialects.
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.dialects.keys()
    }
}

impl Default for DialectRegistry {
    /// Registry pre-seeded with the built-in dialects.
    fn default() -> Self {
        let mut registry = Self::empty();

        for (name, prompt, paging) in [
            ("cisco_ios", r"[\w.@/-]+[>#]", Some("terminal length 0")),
            ("cisco_xe", r"[\w.@/-]+[>#]", Some("terminal length 0")),
            ("cisco_nxos", r"[\w.@/-]+[>#]", Some("terminal length 0")),
            ("cisco_asa", r"[\w.@/-]+[>#]", Some("terminal pager 0")),
            ("arista_eos", r"[\w.@/-]+[>#]", Some("terminal length 0")),
            (
                "juniper_junos",
                r"[\w.@/-]+[>#%]",
                Some("set cli screen-length 0"),
            ),
            ("linux", r"[$#]", None),
        ] {
            // Built-in prompt patterns are known-good literals.
            let mut dialect = match Dialect::new(name, prompt) {
                Ok(d) => d,
                Err(_) => Dialect::generic(),
            };
            if let Some(cmd) = paging {
                dialect = dialect.with_on_open_command(cmd);
            }
            registry.register(dialect);
        }

        registry
    }
}
