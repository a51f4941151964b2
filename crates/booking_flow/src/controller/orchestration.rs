//! Effect orchestration from reducer output to timers, the renderer queue and the booking sink.

use std::sync::Arc;

use crossbeam_channel::{Sender, TrySendError};
use shared::{clock::Clock, domain::BookingSink};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::controller::{
    events::{FlowAction, FlowError, UiEvent, ViewModel},
    reducer::{reduce, Effect},
    state::BookingState,
};

/// Cloneable entry point for user input.
#[derive(Clone)]
pub struct FlowHandle {
    tx: mpsc::UnboundedSender<FlowAction>,
}

impl FlowHandle {
    pub fn send(&self, action: FlowAction) -> Result<(), FlowError> {
        self.tx.send(action).map_err(|_| FlowError::Closed)
    }
}

pub struct FlowController {
    state: BookingState,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn BookingSink>,
    ui_tx: Sender<UiEvent>,
    action_tx: mpsc::UnboundedSender<FlowAction>,
    action_rx: mpsc::UnboundedReceiver<FlowAction>,
}

impl FlowController {
    pub fn new(
        viewport_width: u32,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn BookingSink>,
        ui_tx: Sender<UiEvent>,
    ) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        Self {
            state: BookingState::new(clock.today(), viewport_width),
            clock,
            sink,
            ui_tx,
            action_tx,
            action_rx,
        }
    }

    pub fn handle(&self) -> FlowHandle {
        FlowHandle {
            tx: self.action_tx.clone(),
        }
    }

    pub fn state(&self) -> &BookingState {
        &self.state
    }

    /// Publishes the initial view so the renderer can draw before any input.
    pub fn render(&self) {
        emit_ui_event(
            &self.ui_tx,
            UiEvent::Changed(Box::new(ViewModel::from_state(
                &self.state,
                self.clock.today(),
            ))),
        );
    }

    /// Processes queued actions until the flow reaches confirmation and
    /// returns the final state.
    pub async fn run(mut self) -> BookingState {
        self.render();
        while !self.state.is_confirmed() {
            let Some(action) = self.action_rx.recv().await else {
                break;
            };
            self.apply(action);
        }
        info!("booking flow finished");
        self.state
    }

    /// Runs a single action through the reducer and executes its effects.
    /// Must be called from within a tokio runtime.
    pub fn apply(&mut self, action: FlowAction) {
        let name = action.name();
        let effects = reduce(&mut self.state, action, self.clock.today());
        debug!(action = name, effects = effects.len(), "flow action applied");
        for effect in effects {
            self.run_effect(effect);
        }
    }

    fn run_effect(&self, effect: Effect) {
        match effect {
            Effect::Render => self.render(),
            Effect::Emit(event) => emit_ui_event(&self.ui_tx, event),
            Effect::After { delay, action } => {
                let action_tx = self.action_tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    // The flow may already be done; a closed queue is fine.
                    let _ = action_tx.send(action);
                });
            }
            Effect::ScrollIntoView { panel, delay } => {
                let ui_tx = self.ui_tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    emit_ui_event(&ui_tx, UiEvent::ScrollIntoView(panel));
                });
            }
            Effect::SubmitBooking(record) => {
                info!(
                    booking_date = %record.booking_date,
                    booking_time = %record.booking_time,
                    "booking submitted"
                );
                self.sink.submit(record);
            }
        }
    }
}

fn emit_ui_event(ui_tx: &Sender<UiEvent>, event: UiEvent) {
    let event_name = event.name();
    match ui_tx.try_send(event) {
        Ok(()) => debug!(event = event_name, "queued flow->ui event"),
        Err(TrySendError::Full(_)) => {
            warn!(event = event_name, "UI event queue is full; dropping event");
        }
        Err(TrySendError::Disconnected(_)) => {
            debug!(event = event_name, "renderer disconnected; dropping event");
        }
    }
}

#[cfg(test)]
#[path = "tests/orchestration_tests.rs"]
mod tests;
