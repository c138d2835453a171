//! Bounded-concurrency collection across a host list.
//!
//! One task per host, parallelism capped by a semaphore; excess hosts queue.
//! Failures are host-local: every host produces exactly one [`HostOutput`],
//! successful or not, and the output vector is reassembled in input order
//! (completion order is nondeterministic under concurrency).

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::channel::{ShellConfig, ShellSession};
use crate::error::CollectError;
use crate::platform::{Dialect, DialectRegistry};
use crate::transport::{Credential, SshConfig, SshTransport};

/// Options for one collection run.
#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Connection driver identifier (e.g., "cisco_ios").
    pub device_type: String,

    /// The command sent to every host.
    pub command: String,

    /// Per-host timeout, applied independently to each host's connect and
    /// each prompt read.
    pub timeout: Duration,

    /// Maximum number of hosts worked in parallel.
    pub concurrency: usize,
}

impl CollectOptions {
    /// Options with the default timeout (25s) and concurrency (30).
    pub fn new(device_type: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            device_type: device_type.into(),
            command: command.into(),
            timeout: Duration::from_secs(25),
            concurrency: 30,
        }
    }

    /// Set the per-host timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the concurrency limit.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }
}

/// Raw collection record for one host.
#[derive(Debug, Clone)]
pub struct HostOutput {
    /// The host as listed in the input.
    pub host: String,

    /// Raw command output (empty when the connection failed).
    pub raw: String,

    /// Connection error description, absent on success.
    pub error: Option<String>,
}

impl HostOutput {
    fn failed(host: String, error: impl Into<String>) -> Self {
        Self {
            host,
            raw: String::new(),
            error: Some(error.into()),
        }
    }
}

/// Run the command against every host, bounded by `options.concurrency`.
///
/// Always yields exactly one [`HostOutput`] per input host, in input order,
/// no matter how many hosts individually fail. Cancelling the token stops
/// in-flight hosts promptly and marks hosts not yet started as `cancelled`.
pub async fn collect(
    hosts: &[String],
    credential: &Credential,
    options: &CollectOptions,
    dialects: &DialectRegistry,
    cancel: CancellationToken,
) -> Result<Vec<HostOutput>, CollectError> {
    let dialect = Arc::new(dialects.get(&options.device_type).clone());
    let credential = Arc::new(credential.clone());
    let command = Arc::new(options.command.clone());
    let timeout = options.timeout;

    let op = move |host: String| {
        let dialect = dialect.clone();
        let credential = credential.clone();
        let command = command.clone();
        async move { collect_host(host, &credential, &dialect, &command, timeout).await }
    };

    fan_out(hosts.to_vec(), options.concurrency, cancel, op).await
}

/// Fan a per-host async operation out over the host list.
///
/// This is the scheduling core, generic over the operation so ordering,
/// bounding and cancellation are testable without a network.
pub(crate) async fn fan_out<F, Fut>(
    hosts: Vec<String>,
    limit: usize,
    cancel: CancellationToken,
    op: F,
) -> Result<Vec<HostOutput>, CollectError>
where
    F: Fn(String) -> Fut + Clone + Send + 'static,
    Fut: Future<Output = HostOutput> + Send + 'static,
{
    if limit == 0 {
        return Err(CollectError::InvalidConcurrency(limit));
    }

    let semaphore = Arc::new(Semaphore::new(limit));
    let mut set: JoinSet<(usize, HostOutput)> = JoinSet::new();

    for (i, host) in hosts.iter().cloned().enumerate() {
        let semaphore = semaphore.clone();
        let cancel = cancel.clone();
        let op = op.clone();

        set.spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return (i, HostOutput::failed(host, "cancelled")),
            };

            // Hosts that have not started when cancellation lands are
            // skipped, never silently completed.
            if cancel.is_cancelled() {
                return (i, HostOutput::failed(host, "cancelled"));
            }

            let output = tokio::select! {
                output = op(host.clone()) => output,
                _ = cancel.cancelled() => HostOutput::failed(host, "cancelled"),
            };
            (i, output)
        });
    }

    // Buffer completions keyed by host index to restore input order.
    let mut slots: Vec<Option<HostOutput>> = (0..hosts.len()).map(|_| None).collect();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((i, output)) => slots[i] = Some(output),
            Err(e) => warn!("collection worker failed: {e}"),
        }
    }

    Ok(slots
        .into_iter()
        .enumerate()
        .map(|(i, slot)| {
            slot.unwrap_or_else(|| HostOutput::failed(hosts[i].clone(), "worker task failed"))
        })
        .collect())
}

/// Collect one host: connect, disable paging, run the command, read until
/// the prompt returns. Every failure path collapses into a descriptive
/// error string on the host's record.
async fn collect_host(
    host: String,
    credential: &Credential,
    dialect: &Dialect,
    command: &str,
    timeout: Duration,
) -> HostOutput {
    match run_session(&host, credential, dialect, command, timeout).await {
        Ok(raw) => {
            debug!("{host}: collected {} bytes", raw.len());
            HostOutput {
                host,
                raw,
                error: None,
            }
        }
        Err(e) => {
            debug!("{host}: {e}");
            let message = describe_error(&e);
            HostOutput::failed(host, message)
        }
    }
}

async fn run_session(
    host: &str,
    credential: &Credential,
    dialect: &Dialect,
    command: &str,
    timeout: Duration,
) -> crate::error::Result<String> {
    let config = SshConfig::for_host(host, credential, timeout);
    let transport = SshTransport::connect(config).await?;
    let channel = transport.open_channel().await?;

    let mut shell = ShellSession::new(
        channel,
        ShellConfig {
            timeout,
            ..Default::default()
        },
    );

    // Wait out the banner and initial prompt, then discard them.
    shell.read_until_prompt(&dialect.prompt_pattern).await?;
    shell.clear_buffer();

    // Paging disable is best effort: some platforms reject it per user
    // profile and still page nothing for short outputs.
    for cmd in &dialect.on_open_commands {
        shell.send(cmd).await?;
        if shell
            .read_until(&dialect.prompt_pattern, Duration::from_secs(5))
            .await
            .is_err()
        {
            warn!("{host}: on-open command {cmd:?} did not return a prompt");
            // A timed-out read leaves its partial echo buffered; drop it
            // so it cannot prepend itself to the collected output.
            shell.clear_buffer();
        }
    }

    shell.send(command).await?;
    let data = shell.read_until_prompt(&dialect.prompt_pattern).await?;
    let raw = normalize_output(&String::from_utf8_lossy(&data), command, dialect);

    // Collection already succeeded; teardown failures are not the host's fault.
    if let Err(e) = shell.close().await {
        debug!("{host}: channel close failed: {e}");
    }
    if let Err(e) = transport.close().await {
        debug!("{host}: disconnect failed: {e}");
    }

    Ok(raw)
}

/// Strip the echoed command line and the trailing prompt from raw output.
fn normalize_output(raw: &str, command: &str, dialect: &Dialect) -> String {
    let mut lines: Vec<&str> = raw.lines().collect();

    if let Some(first) = lines.first() {
        if first.contains(command) {
            lines.remove(0);
        }
    }
    if let Some(last) = lines.last() {
        if dialect.prompt_pattern.is_match(last.as_bytes()) {
            lines.pop();
        }
    }

    lines.join("\n")
}

/// Collapse an error into the short description recorded per host.
fn describe_error(e: &crate::error::Error) -> String {
    use crate::error::{ChannelError, Error, TransportError};

    match e {
        Error::Transport(TransportError::Timeout(_)) => "timeout".to_string(),
        Error::Channel(ChannelError::PromptTimeout(_)) => "timeout".to_string(),
        Error::Transport(TransportError::AuthenticationFailed { .. }) => {
            "authentication failed".to_string()
        }
        Error::Transport(inner) => format!("connection failed: {inner}"),
        other => format!("error: {other}"),
    }
}
