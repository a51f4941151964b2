use std::sync::Arc;

use anyhow::{Context, Result};
use attribution::{AttributionService, DeliveryOutcome};
use booking_flow::FlowController;
use crossbeam_channel::bounded;
use shared::{clock::Clock, domain::BookingRecord};
use tracing::{debug, error, info};

use crate::visitor::{BookingInput, ScriptedVisitor};

const UI_EVENT_QUEUE: usize = 256;

#[derive(Debug)]
pub struct SessionReport {
    pub confirmation: BookingRecord,
    pub deliveries: Vec<DeliveryOutcome>,
}

/// One visit to the booking page: page view, the flow up to confirmation,
/// then waiting on the delivery the submit started.
pub async fn run_session(
    service: AttributionService,
    clock: Arc<dyn Clock>,
    viewport_width: u32,
    input: BookingInput,
) -> Result<SessionReport> {
    input.check(clock.today())?;
    service.record_page_view().await;

    let (ui_tx, ui_rx) = bounded(UI_EVENT_QUEUE);
    let controller = FlowController::new(viewport_width, clock, Arc::new(service.clone()), ui_tx);
    let visitor = ScriptedVisitor::new(
        input,
        controller.handle(),
        ui_rx,
        service.config().country_code.clone(),
    );

    let flow = tokio::spawn(controller.run());
    let visitor = tokio::task::spawn_blocking(move || visitor.run());

    let confirmation = match visitor.await.context("visitor thread panicked")? {
        Ok(record) => record,
        Err(err) => {
            flow.abort();
            return Err(err);
        }
    };
    let final_state = flow.await.context("booking flow task failed")?;
    debug!(screen = ?final_state.screen(), "booking flow settled");

    let deliveries = service.wait_for_deliveries().await;
    for outcome in &deliveries {
        match outcome {
            DeliveryOutcome::Delivered { status } => info!(status, "booking delivered"),
            DeliveryOutcome::Failed(err) => {
                error!(error = %err, "booking was confirmed but not delivered")
            }
        }
    }

    Ok(SessionReport {
        confirmation,
        deliveries,
    })
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
