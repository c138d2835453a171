//! Dialect definition for driver-specific session behavior.

use regex::bytes::Regex;

/// Dialect describing how to interact with one class of device.
#[derive(Debug, Clone)]
pub struct Dialect {
    /// Driver identifier (e.g., "cisco_ios", "linux").
    pub name: String,

    /// Pattern matching the CLI prompt at the end of output.
    pub prompt_pattern: Regex,

    /// Commands sent right after login, before the collected command.
    /// Typically paging disable. Failures here are best-effort.
    pub on_open_commands: Vec<String>,
}

impl Dialect {
    /// Create a new dialect with the given prompt pattern.
    pub fn new(name: impl Into<String>, prompt: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.into(),
            prompt_pattern: compile_prompt(prompt)?,
            on_open_commands: Vec::new(),
        })
    }

    /// Add an on-open command.
    pub fn with_on_open_command(mut self, command: impl Into<String>) -> Self {
        self.on_open_commands.push(command.into());
        self
    }

    /// The catch-all dialect used when a device type has no registered
    /// dialect: matches the common `>`, `#`, `$` and `%` prompt endings.
    pub fn generic() -> Self {
        Self {
            name: "generic".to_string(),
            prompt_pattern: Regex::new(r"[>#$%]\s*$").unwrap_or_else(|_| unreachable!()),
            on_open_commands: Vec::new(),
        }
    }
}

/// Compile a prompt pattern, anchoring to end of buffer if not anchored.
fn compile_prompt(pattern: &str) -> Result<Regex, regex::Error> {
    let pattern = if pattern.ends_with('$') {
        pattern.to_string()
    } else {
        format!("{}\\s*$", pattern)
    };
    Regex::new(&pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_anchoring_added() {
        let dialect = Dialect::new("test", r"router#").unwrap();
        assert!(dialect.prompt_pattern.is_match(b"output\nrouter# "));
        assert!(!dialect.prompt_pattern.is_match(b"router# more output"));
    }

    #[test]
    fn test_prompt_anchor_kept() {
        let dialect = Dialect::new("test", r"sw>\s*$").unwrap();
        assert!(dialect.prompt_pattern.is_match(b"sw>"));
    }

    #[test]
    fn test_generic_matches_common_prompts() {
        let dialect = Dialect::generic();
        assert!(dialect.prompt_pattern.is_match(b"router# "));
        assert!(dialect.prompt_pattern.is_match(b"switch> "));
        assert!(dialect.prompt_pattern.is_match(b"user@host:~$ "));
    }
}
