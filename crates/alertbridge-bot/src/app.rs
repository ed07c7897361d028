//! Main application orchestration.
//!
//! Wires brokerage -> pipeline -> queue -> worker -> webhook server and owns
//! the shutdown sequence.

use std::future::Future;
use std::sync::Arc;

use alertbridge_broker::{AlpacaClient, Brokerage};
use alertbridge_core::{AlertValidator, Clock, SystemClock};
use alertbridge_executor::{alert_queue, OrderPipeline, QueueWorker, WorkerHandle};
use alertbridge_intake::{run_server, DispatchMode, IntakeState};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

/// Assembled runtime pieces.
pub struct Components {
    /// Webhook handler state.
    pub state: IntakeState,
    /// Running queue worker (queued dispatch only).
    pub worker: Option<WorkerHandle>,
}

/// Main application.
pub struct Application {
    config: AppConfig,
    broker: Arc<dyn Brokerage>,
    clock: Arc<dyn Clock>,
}

impl Application {
    /// Create the application against the live brokerage.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        config.validate()?;
        let broker = AlpacaClient::new(&config.broker_config())?;
        Ok(Self::with_brokerage(config, Arc::new(broker)))
    }

    /// Create the application against any brokerage implementation.
    pub fn with_brokerage(config: AppConfig, broker: Arc<dyn Brokerage>) -> Self {
        Self {
            config,
            broker,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn pipeline(&self) -> Arc<OrderPipeline> {
        Arc::new(OrderPipeline::new(
            self.config.router(),
            self.broker.clone(),
            self.clock.clone(),
        ))
    }

    /// Build intake state and, in queued mode, spawn the worker.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn components(&self) -> Components {
        let validator = AlertValidator::new(self.config.passphrase_policy());
        let pipeline = self.pipeline();

        let (state, worker) = match self.config.server.mode {
            DispatchMode::Queued => {
                let (sender, receiver) = alert_queue();
                let worker =
                    QueueWorker::new(receiver, pipeline, self.config.worker_config()).spawn();
                (IntakeState::queued(validator, sender), Some(worker))
            }
            DispatchMode::Immediate => (IntakeState::immediate(validator, pipeline), None),
        };

        Components {
            state: state.with_debug(self.config.server.debug),
            worker,
        }
    }

    /// Run until Ctrl-C.
    pub async fn run(self) -> AppResult<()> {
        self.run_until(ctrl_c()).await
    }

    /// Run until `signal` resolves or the server exits.
    pub async fn run_until<F>(self, signal: F) -> AppResult<()>
    where
        F: Future<Output = ()>,
    {
        info!(
            port = self.config.server.port,
            mode = %self.config.server.mode,
            quantity = self.config.order.quantity,
            time_in_force = %self.config.order.time_in_force,
            pacing_ms = self.config.worker.pacing_ms,
            passphrase = self.config.auth.use_passphrase,
            "Starting alertbridge"
        );

        let Components { state, worker } = self.components();

        let shutdown = CancellationToken::new();
        let server_config = self.config.server.clone();
        let server_shutdown = shutdown.clone();
        let mut server =
            tokio::spawn(async move { run_server(state, &server_config, server_shutdown).await });

        let server_result = tokio::select! {
            () = signal => {
                info!("Shutdown signal received");
                shutdown.cancel();
                server.await
            }
            result = &mut server => {
                warn!("Webhook server exited");
                result
            }
        };

        if let Some(mut worker) = worker {
            info!("Draining alert queue");
            worker.stop().await?;
            info!(
                processed = worker.processed(),
                failed = worker.failed(),
                "Queue worker stopped"
            );
        }

        match server_result {
            Ok(result) => result.map_err(AppError::from),
            Err(e) => Err(AppError::Server(e.to_string())),
        }
    }
}

/// Resolves on Ctrl-C. If the handler cannot be installed, never resolves.
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
