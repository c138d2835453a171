//! Error types for netharvest.

use std::io;
use thiserror::Error;

/// Main error type for netharvest operations.
#[derive(Error, Debug)]
pub enum Error {
    /// SSH transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Shell channel operation errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Template directory and archive errors
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    /// Collection run errors
    #[error("Collect error: {0}")]
    Collect(#[from] CollectError),
}

/// Transport layer errors (SSH connection, authentication).
#[derive(Error, Debug)]
pub enum TransportError {
    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// SSH key error
    #[error("SSH key error: {0}")]
    Key(String),

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Shell channel errors (prompt matching, PTY operations).
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Prompt was not seen before the deadline
    #[error("Prompt not found within {0:?}")]
    PromptTimeout(std::time::Duration),

    /// Channel closed before the prompt was seen
    #[error("Channel closed")]
    Closed,

    /// SSH protocol error on the channel
    #[error("Channel SSH error: {0}")]
    Ssh(russh::Error),
}

/// Template directory resolution and archive errors.
///
/// `TemplateResolver::resolve()` never returns these: total resolution
/// failure degrades to an empty directory. They surface only from archive
/// loading, which has an explicit failure mode.
#[derive(Error, Debug)]
pub enum TemplateError {
    /// The uploaded archive could not be read
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// No index file anywhere inside the extracted archive
    #[error("No 'index' file found inside the archive")]
    NoIndexInArchive,

    /// I/O error while extracting or scanning
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Collection run errors.
///
/// Per-host connection failures are *not* errors at this level; they are
/// recorded on the host's `CollectionResult`. These cover run-level problems.
#[derive(Error, Debug)]
pub enum CollectError {
    /// The host list was empty after parsing
    #[error("No hosts to collect from")]
    NoHosts,

    /// Concurrency limit must be at least one
    #[error("Invalid concurrency limit: {0}")]
    InvalidConcurrency(usize),
}

/// Result type alias using netharvest's Error.
pub type Result<T> = std::result::Result<T, Error>;
