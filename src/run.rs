//! Application execution logic.
//!
//! This module wires the probe, history store, and notification channels
//! into a change detector, serves the read API when configured, and drives
//! the detector until a shutdown signal arrives.

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use ipwatch::api;
use ipwatch::config::ValidatedConfig;
use ipwatch::detect::{BaselinePolicy, ChangeDetector};
use ipwatch::history::{FileHistoryStore, HistoryStore, StoreError};
use ipwatch::notify::{Dispatcher, EmailChannel, TelegramChannel};
use ipwatch::probe::HttpProbe;
use ipwatch::scheduler::Scheduler;
use ipwatch::transport::{HttpClient, ReqwestClient};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// The history file exists but could not be loaded.
    #[error("Failed to open history: {0}")]
    HistoryOpen(#[source] StoreError),

    /// The read API could not bind its listen address.
    #[error("Failed to bind read API on {addr}: {source}")]
    ApiBind {
        /// Configured listen address
        addr: SocketAddr,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A notification channel could not be built from its settings.
    #[error("Failed to set up {channel} channel: {reason}")]
    ChannelSetup {
        /// Channel name
        channel: &'static str,
        /// Reason, never containing a secret
        reason: String,
    },
}

/// Handle to the background read API task.
struct ApiTask {
    stop: oneshot::Sender<()>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl ApiTask {
    /// Signals graceful shutdown and waits for in-flight requests to finish.
    async fn shutdown(self) {
        // The receiver is gone only if the server already exited
        let _ = self.stop.send(());
        match self.handle.await {
            Ok(Ok(())) => tracing::debug!("Read API stopped"),
            Ok(Err(e)) => tracing::error!("Read API failed: {e}"),
            Err(e) => tracing::error!("Read API task failed: {e}"),
        }
    }
}

/// Executes the main application loop.
///
/// This function:
/// 1. Opens the history file
/// 2. Builds the probe and the enabled notification channels
/// 3. Starts the read API (if a listen address is configured)
/// 4. Runs detection cycles until shutdown signal (Ctrl+C / SIGTERM)
/// 5. Stops the read API
///
/// # Errors
///
/// Returns an error if:
/// - The history file cannot be read
/// - A channel cannot be built from its settings
/// - The read API cannot bind its address
///
/// # Coverage Note
///
/// This function is excluded from coverage because it requires real
/// network access and signal handling.
#[cfg(not(tarpaulin_include))]
pub async fn execute(config: ValidatedConfig) -> Result<(), RunError> {
    let client = ReqwestClient::new();

    let store = Arc::new(
        FileHistoryStore::open(&config.history_file).map_err(RunError::HistoryOpen)?,
    );
    tracing::info!(
        "Loaded {} record(s) from {}",
        store.len(),
        store.path().display()
    );

    let dispatcher = build_dispatcher(&config, &client)?;
    if dispatcher.is_empty() {
        tracing::warn!("No notification channels enabled - changes will only be recorded");
    }
    if config.dry_run {
        tracing::info!("Dry-run mode enabled - notifications will be logged but not sent");
    }

    let probe = HttpProbe::new(client, config.probe_url.clone()).with_timeout(config.probe_timeout);
    let detector = ChangeDetector::new(probe, Arc::clone(&store), dispatcher)
        .with_baseline_policy(baseline_policy(&config))
        .with_dry_run(config.dry_run);

    let api = match config.listen {
        Some(addr) => Some(start_api(addr, Arc::clone(&store)).await?),
        None => None,
    };

    Scheduler::new(config.interval)
        .run(&detector, shutdown_signal())
        .await;

    if let Some(api) = api {
        api.shutdown().await;
    }

    Ok(())
}

/// Builds the dispatcher with every enabled channel, email first.
fn build_dispatcher<H>(config: &ValidatedConfig, client: &H) -> Result<Dispatcher, RunError>
where
    H: HttpClient + Clone + 'static,
{
    let mut dispatcher = Dispatcher::new().with_timeout(config.notify_timeout);

    if let Some(email) = &config.email {
        let channel = EmailChannel::new(
            client.clone(),
            email.api_url.clone(),
            &email.api_key,
            email.from.clone(),
            email.to.clone(),
        )
        .map_err(|_| RunError::ChannelSetup {
            channel: "email",
            reason: "API key is not a valid header value".to_string(),
        })?
        .with_subject(email.subject.clone())
        .with_body(email.body.clone());

        dispatcher = dispatcher.with_channel(channel);
    }

    if let Some(telegram) = &config.telegram {
        let channel = TelegramChannel::new(
            client.clone(),
            &telegram.api_base,
            &telegram.bot_token,
            telegram.chat_id.clone(),
        )
        .map_err(|e| RunError::ChannelSetup {
            channel: "telegram",
            reason: e.to_string(),
        })?
        .with_text(telegram.text.clone());

        dispatcher = dispatcher.with_channel(channel);
    }

    Ok(dispatcher)
}

const fn baseline_policy(config: &ValidatedConfig) -> BaselinePolicy {
    if config.silent_baseline {
        BaselinePolicy::Silent
    } else {
        BaselinePolicy::Notify
    }
}

/// Binds the read API and serves it in the background.
async fn start_api<S>(addr: SocketAddr, store: Arc<S>) -> Result<ApiTask, RunError>
where
    S: HistoryStore + 'static,
{
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| RunError::ApiBind { addr, source })?;

    let (stop, stopped) = oneshot::channel::<()>();
    let handle = tokio::spawn(api::serve(listener, api::router(store), async move {
        // A dropped sender also means shut down
        let _ = stopped.await;
    }));

    Ok(ApiTask { stop, handle })
}

/// Returns a future that completes when a shutdown signal is received.
///
/// If a handler cannot be installed, that signal source is logged and
/// ignored rather than stopping the monitor.
///
/// Excluded from coverage - requires OS signal handling.
#[cfg(not(tarpaulin_include))]
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
