//! One-call orchestration of a collection run.
//!
//! Wires hosts input, template resolution, collection and aggregation
//! together: the lifecycle a front end drives with a single "run" action.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use log::info;
use tokio_util::sync::CancellationToken;

use crate::collector::{self, CollectOptions};
use crate::error::{CollectError, Result};
use crate::hosts::parse_hosts;
use crate::platform::{DeviceTypeMap, DialectRegistry};
use crate::result::ResultSet;
use crate::templates::TemplateResolver;
use crate::transport::Credential;

/// Summary of one finished collection run.
#[derive(Debug)]
pub struct RunReport {
    /// Merged per-host results, in input order.
    pub results: ResultSet,

    /// Wall-clock duration of the run.
    pub elapsed: Duration,

    /// Number of hosts attempted.
    pub hosts_total: usize,

    /// Number of hosts whose connection failed.
    pub hosts_failed: usize,

    /// Total structured rows parsed across all hosts.
    pub structured_rows: usize,

    /// Template root used for this run, if one resolved.
    pub templates_root: Option<PathBuf>,
}

/// Collection runner holding the long-lived pieces: template resolver,
/// dialect registry and device-type mapping.
#[derive(Default)]
pub struct Runner {
    resolver: TemplateResolver,
    dialects: DialectRegistry,
    device_types: DeviceTypeMap,
}

impl Runner {
    /// Runner with default dialects, device-type mapping and template
    /// resolution order.
    pub fn new() -> Self {
        Self::default()
    }

    /// The template resolver, for overrides and archive uploads.
    pub fn resolver(&self) -> &TemplateResolver {
        &self.resolver
    }

    /// Mutable template resolver access.
    pub fn resolver_mut(&mut self) -> &mut TemplateResolver {
        &mut self.resolver
    }

    /// Mutable dialect registry access.
    pub fn dialects_mut(&mut self) -> &mut DialectRegistry {
        &mut self.dialects
    }

    /// Mutable device-type mapping access.
    pub fn device_types_mut(&mut self) -> &mut DeviceTypeMap {
        &mut self.device_types
    }

    /// Run one collection: parse hosts, snapshot the template directory,
    /// collect in parallel, parse and aggregate.
    pub async fn run(
        &self,
        hosts_text: &str,
        credential: &Credential,
        options: &CollectOptions,
    ) -> Result<RunReport> {
        self.run_with_cancel(hosts_text, credential, options, CancellationToken::new())
            .await
    }

    /// Like [`run`](Self::run), cancellable via the token. Cancellation
    /// stops in-flight hosts promptly; hosts not yet started are skipped.
    pub async fn run_with_cancel(
        &self,
        hosts_text: &str,
        credential: &Credential,
        options: &CollectOptions,
        cancel: CancellationToken,
    ) -> Result<RunReport> {
        let hosts = parse_hosts(hosts_text);
        if hosts.is_empty() {
            return Err(CollectError::NoHosts.into());
        }

        // One snapshot per run: a concurrent refresh() or archive upload
        // never changes what this run parses against.
        let directory = self.resolver.resolve();
        let platform = self
            .device_types
            .platform_for(&options.device_type)
            .to_string();

        info!(
            "collecting {:?} from {} host(s) as {} (concurrency {})",
            options.command,
            hosts.len(),
            options.device_type,
            options.concurrency
        );

        let start = Instant::now();
        let outputs =
            collector::collect(&hosts, credential, options, &self.dialects, cancel).await?;
        let results = ResultSet::assemble(outputs, &platform, &options.command, &directory);
        let elapsed = start.elapsed();

        let report = RunReport {
            hosts_total: results.len(),
            hosts_failed: results.failed_hosts(),
            structured_rows: results.structured_rows(),
            templates_root: directory.root.clone(),
            results,
            elapsed,
        };

        info!(
            "processed {} host(s) in {:.1}s: {} failed, {} structured row(s)",
            report.hosts_total,
            report.elapsed.as_secs_f64(),
            report.hosts_failed,
            report.structured_rows
        );

        Ok(report)
    }
}
