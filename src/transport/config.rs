//! SSH connection configuration and credentials.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

/// Credentials shared by every host in one collection run.
///
/// Secrets are held in [`SecretString`] so they are zeroized on drop and
/// redacted from `Debug` output; they are never logged or persisted.
#[derive(Debug, Clone)]
pub struct Credential {
    /// Username for authentication.
    pub username: String,

    /// Login password.
    pub password: SecretString,

    /// Optional enable/privilege secret. Unused by plain collection but
    /// carried for dialects that require escalation before paging disable.
    pub enable: Option<SecretString>,
}

impl Credential {
    /// Create a password credential.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into().into(),
            enable: None,
        }
    }

    /// Attach an enable secret.
    pub fn with_enable(mut self, enable: impl Into<String>) -> Self {
        self.enable = Some(enable.into().into());
        self
    }
}

/// SSH connection configuration for a single host.
#[derive(Debug, Clone)]
pub struct SshConfig {
    /// Target host (hostname or IP address).
    pub host: String,

    /// SSH port (default: 22).
    pub port: u16,

    /// Username for authentication.
    pub username: String,

    /// Authentication method.
    pub auth: AuthMethod,

    /// Timeout covering connect, handshake and authentication.
    pub timeout: Duration,

    /// Terminal width for PTY.
    pub terminal_width: u32,

    /// Terminal height for PTY.
    pub terminal_height: u32,
}

impl SshConfig {
    /// Build a config for one host from run-wide credentials.
    pub fn for_host(host: impl Into<String>, credential: &Credential, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port: 22,
            username: credential.username.clone(),
            auth: AuthMethod::Password(credential.password.clone()),
            timeout,
            terminal_width: 511,
            terminal_height: 24,
        }
    }
}

/// Authentication method for SSH connections.
#[derive(Debug, Clone)]
pub enum AuthMethod {
    /// No authentication (for testing only).
    None,

    /// Password authentication.
    Password(SecretString),

    /// Private key authentication.
    PrivateKey {
        /// Path to the private key file.
        path: PathBuf,
        /// Optional passphrase for encrypted keys.
        passphrase: Option<SecretString>,
    },
}
