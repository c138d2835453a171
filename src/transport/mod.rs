//! SSH transport layer wrapping russh.
//!
//! Connection setup, authentication, and shell channel creation. One
//! transport per host; the collector opens an independent transport for
//! every host in a run.

pub mod config;
mod ssh;

pub use config::{AuthMethod, Credential, SshConfig};
pub use ssh::SshTransport;
