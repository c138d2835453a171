//! Hosts-file input.
//!
//! One address (IP or hostname) per line. Blank lines and `#` comments are
//! ignored. Input order is preserved; the result set mirrors it.

/// Parse a hosts file body into an ordered list of addresses.
pub fn parse_hosts(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
