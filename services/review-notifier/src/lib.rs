//! Review Notifier - homework review status watcher
//!
//! Polls the homework status API, turns review state changes into messages and
//! delivers them to a Telegram chat.

pub mod config;
pub mod cursor;
pub mod error;
pub mod fetcher;
pub mod io;
pub mod notifier;
pub mod poll_loop;
pub mod status;
pub mod telegram;

pub use config::{load_config, Config};
pub use error::{MappingError, Result, ReviewNotifierError, TransportError};

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::cursor::{now_unix, CursorStore, MemoryCursorStore};
use crate::fetcher::{HomeworkApiClient, StatusFetcher};
use crate::io::{HttpClient, ReqwestHttpClient};
use crate::notifier::{MessageSender, Notifier};
use crate::poll_loop::PollLoop;
use crate::telegram::TelegramSender;

/// Assembles a [`Service`] from configuration and optional injected parts
pub struct ServiceBuilder {
    config: Config,
    http: Option<Arc<dyn HttpClient>>,
    fetcher: Option<Arc<dyn StatusFetcher>>,
    sender: Option<Arc<dyn MessageSender>>,
    cursor_store: Option<Arc<dyn CursorStore>>,
    cancel: Option<CancellationToken>,
}

impl ServiceBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            http: None,
            fetcher: None,
            sender: None,
            cursor_store: None,
            cancel: None,
        }
    }

    /// Use this HTTP client for the status API and Telegram
    pub fn with_http_client(mut self, http: Arc<dyn HttpClient>) -> Self {
        self.http = Some(http);
        self
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn StatusFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn with_sender(mut self, sender: Arc<dyn MessageSender>) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn with_cursor_store(mut self, store: Arc<dyn CursorStore>) -> Self {
        self.cursor_store = Some(store);
        self
    }

    pub fn with_cancellation_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Validate credentials and wire the poll loop
    pub async fn build(self) -> Result<Service> {
        self.config.validate()?;

        let http: Arc<dyn HttpClient> = match self.http {
            Some(http) => http,
            None => Arc::new(ReqwestHttpClient::new(self.config.api.request_timeout)?),
        };

        let fetcher = self.fetcher.unwrap_or_else(|| {
            Arc::new(HomeworkApiClient::new(&self.config.api, Arc::clone(&http)))
        });
        let sender = self.sender.unwrap_or_else(|| {
            Arc::new(TelegramSender::new(&self.config.telegram, Arc::clone(&http)))
        });
        let cursor_store = self.cursor_store.unwrap_or_else(|| {
            let start = self.config.polling.from_date.unwrap_or_else(now_unix);
            Arc::new(MemoryCursorStore::new(start))
        });
        let cancel = self.cancel.unwrap_or_else(CancellationToken::new);

        tracing::debug!(
            "Polling every {:?}, retrying after {:?}, sending via {}",
            self.config.polling.interval,
            self.config.polling.retry_interval,
            sender.type_name()
        );

        let notifier = Notifier::new(self.config.telegram.chat_id.clone(), sender);
        let poll_loop = PollLoop::new(
            fetcher,
            notifier,
            cursor_store,
            &self.config.polling,
            cancel.clone(),
        );

        Ok(Service { poll_loop, cancel })
    }
}

/// A built service, ready to poll
#[derive(Debug)]
pub struct Service {
    poll_loop: PollLoop,
    cancel: CancellationToken,
}

impl Service {
    /// Token that stops the service when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Poll until a shutdown signal arrives or the token is cancelled
    pub async fn start(mut self) -> Result<()> {
        let cancel_for_signal = self.cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = shutdown_signal() => {
                    tracing::info!("Shutdown signal received");
                    cancel_for_signal.cancel();
                }
                _ = cancel_for_signal.cancelled() => {}
            }
        });

        tracing::info!(
            "Review notifier started at cursor {}",
            self.poll_loop.cursor()
        );
        self.poll_loop.run().await;
        tracing::info!("Review notifier stopped");

        Ok(())
    }
}

/// Resolves on SIGINT, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to register SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
