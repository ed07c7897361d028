//! Shared state for the webhook handlers.

use std::sync::Arc;

use alertbridge_core::AlertValidator;
use alertbridge_executor::{AlertSender, OrderPipeline};

use crate::config::DispatchMode;

/// Where accepted alerts go.
#[derive(Clone)]
pub enum Dispatcher {
    /// Hand off to the queue worker.
    Queued(AlertSender),
    /// Run the pipeline inside the request.
    Immediate(Arc<OrderPipeline>),
}

impl Dispatcher {
    pub fn mode(&self) -> DispatchMode {
        match self {
            Self::Queued(_) => DispatchMode::Queued,
            Self::Immediate(_) => DispatchMode::Immediate,
        }
    }
}

/// Shared application state for axum handlers.
#[derive(Clone)]
pub struct IntakeState {
    pub(crate) validator: Arc<AlertValidator>,
    pub(crate) dispatcher: Dispatcher,
    pub(crate) debug: bool,
}

impl IntakeState {
    pub fn new(validator: AlertValidator, dispatcher: Dispatcher) -> Self {
        Self {
            validator: Arc::new(validator),
            dispatcher,
            debug: false,
        }
    }

    /// Queued intake in front of `sender`.
    pub fn queued(validator: AlertValidator, sender: AlertSender) -> Self {
        Self::new(validator, Dispatcher::Queued(sender))
    }

    /// Synchronous intake executing through `pipeline`.
    pub fn immediate(validator: AlertValidator, pipeline: Arc<OrderPipeline>) -> Self {
        Self::new(validator, Dispatcher::Immediate(pipeline))
    }

    /// Log inbound payloads (passphrase redacted).
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn mode(&self) -> DispatchMode {
        self.dispatcher.mode()
    }
}
