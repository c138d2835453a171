//! # Netharvest
//!
//! Async bulk CLI collector with TextFSM structured parsing for network
//! devices.
//!
//! Netharvest runs one show command against many devices in parallel over
//! SSH, then parses each host's raw output into structured rows using
//! TextFSM templates selected through an ntc-templates style index.
//!
//! ## Features
//!
//! - Async SSH connections via russh with bounded per-run concurrency
//! - Prompt-driven output collection with ANSI stripping
//! - TextFSM parsing with a typed reason for every zero-row outcome
//! - Template directory resolution across packaged, bundled, env-override
//!   and working-directory locations, plus zip archive uploads
//! - Per-host results in input order with independent connection and
//!   parse error channels
//! - Read-only line and row filters over a finished run, plus delimiter
//!   splitting and named-group regex extraction for untemplated output
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use netharvest::{CollectOptions, Credential, Runner};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), netharvest::Error> {
//!     let runner = Runner::new();
//!     let credential = Credential::new("admin", "secret");
//!     let options = CollectOptions::new("cisco_ios", "show version");
//!
//!     let report = runner
//!         .run("10.1.1.1\n10.1.1.2\n", &credential, &options)
//!         .await?;
//!
//!     for result in &report.results {
//!         match &result.error {
//!             Some(error) => println!("{}: {error}", result.host),
//!             None => println!("{}: {} row(s)", result.host, result.rows.len()),
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod collector;
pub mod error;
pub mod filter;
pub mod hosts;
pub mod parser;
pub mod platform;
pub mod result;
pub mod run;
pub mod templates;
pub mod transport;

// Re-export main types for convenience
pub use collector::{collect, CollectOptions, HostOutput};
pub use error::Error;
pub use filter::{
    ColumnSplit, ExtractView, LineFilter, LineView, RegexExtract, RowFilter, RowView, SplitView,
};
pub use hosts::parse_hosts;
pub use parser::{parse, ParseOutcome, ParseReason, Row};
pub use platform::{DeviceTypeMap, Dialect, DialectRegistry};
pub use result::{CollectionResult, ResultSet};
pub use run::{RunReport, Runner};
pub use templates::{TemplateDirectory, TemplateResolver};
pub use transport::{AuthMethod, Credential, SshConfig};
