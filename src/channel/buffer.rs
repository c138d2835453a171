//! Output buffer with tail-limited prompt search.
//!
//! Prompt patterns only ever appear at the end of accumulated output, so
//! searches are restricted to the last `search_depth` bytes. For large
//! outputs (full routing tables) this keeps prompt detection O(1) per read
//! instead of rescanning the whole buffer.

use regex::bytes::Regex;

/// Accumulates raw channel output and searches its tail for prompts.
#[derive(Debug)]
pub struct OutputBuffer {
    buffer: Vec<u8>,

    /// How many bytes from the end to search for prompt patterns.
    search_depth: usize,
}

impl OutputBuffer {
    /// Create a buffer searching the last `search_depth` bytes.
    pub fn new(search_depth: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(4096),
            search_depth,
        }
    }

    /// Append channel data, stripping ANSI escape sequences first.
    pub fn extend(&mut self, data: &[u8]) {
        let cleaned = strip_ansi_escapes::strip(data);
        self.buffer.extend_from_slice(&cleaned);
    }

    /// Whether the pattern matches within the buffer tail.
    pub fn tail_contains(&self, pattern: &Regex) -> bool {
        let start = self.buffer.len().saturating_sub(self.search_depth);
        pattern.is_match(&self.buffer[start..])
    }

    /// Take ownership of the contents, leaving the buffer empty.
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buffer)
    }

    /// Current contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Current length in bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Discard the contents.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new(1000)
    }
}
