//! Shell channel layer: output buffering and prompt-driven reads.

mod buffer;
mod shell;

pub use buffer::OutputBuffer;
pub use shell::{ShellConfig, ShellSession};
