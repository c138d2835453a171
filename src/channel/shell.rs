//! Prompt-driven shell session over a russh channel.

use std::time::Duration;

use log::debug;
use regex::bytes::Regex;
use russh::client::Msg;
use russh::{Channel, ChannelMsg};
use tokio::time::Instant;

use super::buffer::OutputBuffer;
use crate::error::{ChannelError, Result};

/// Configuration for shell session reads.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Default timeout for prompt reads.
    pub timeout: Duration,

    /// Tail search depth for prompt detection.
    pub search_depth: usize,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            search_depth: 1000,
        }
    }
}

/// Interactive shell session: send lines, read until the prompt returns.
pub struct ShellSession {
    channel: Channel<Msg>,
    buffer: OutputBuffer,
    config: ShellConfig,
}

impl ShellSession {
    /// Wrap an open PTY/shell channel.
    pub fn new(channel: Channel<Msg>, config: ShellConfig) -> Self {
        Self {
            channel,
            buffer: OutputBuffer::new(config.search_depth),
            config,
        }
    }

    /// Send a line of input (a trailing newline is appended).
    pub async fn send(&mut self, line: &str) -> Result<()> {
        let data = format!("{line}\n");
        self.channel
            .data(data.as_bytes())
            .await
            .map_err(ChannelError::Ssh)?;
        Ok(())
    }

    /// Read until `pattern` matches the buffer tail or `timeout` elapses.
    ///
    /// Returns everything read since the last call, prompt included. If the
    /// channel closes with the prompt already buffered, the output is still
    /// returned; closing without a prompt is an error.
    pub async fn read_until(&mut self, pattern: &Regex, timeout: Duration) -> Result<Vec<u8>> {
        let deadline = Instant::now() + timeout;

        loop {
            if self.buffer.tail_contains(pattern) {
                debug!("prompt matched after {} bytes", self.buffer.len());
                return Ok(self.buffer.take());
            }

            let remaining = deadline
                .checked_duration_since(Instant::now())
                .ok_or(ChannelError::PromptTimeout(timeout))?;

            let msg = tokio::time::timeout(remaining, self.channel.wait())
                .await
                .map_err(|_| ChannelError::PromptTimeout(timeout))?;

            match msg {
                Some(ChannelMsg::Data { data }) => self.buffer.extend(&data),
                Some(ChannelMsg::ExtendedData { data, .. }) => self.buffer.extend(&data),
                Some(ChannelMsg::Eof) | Some(ChannelMsg::Close) | None => {
                    if self.buffer.tail_contains(pattern) {
                        return Ok(self.buffer.take());
                    }
                    return Err(ChannelError::Closed.into());
                }
                Some(_) => {}
            }
        }
    }

    /// Read until the prompt using the session's default timeout.
    pub async fn read_until_prompt(&mut self, pattern: &Regex) -> Result<Vec<u8>> {
        let timeout = self.config.timeout;
        self.read_until(pattern, timeout).await
    }

    /// Discard any buffered output (e.g., the login banner echo).
    pub fn clear_buffer(&mut self) {
        self.buffer.clear();
    }

    /// Close the channel.
    pub async fn close(self) -> Result<()> {
        self.channel.eof().await.map_err(ChannelError::Ssh)?;
        self.channel.close().await.map_err(ChannelError::Ssh)?;
        Ok(())
    }
}
