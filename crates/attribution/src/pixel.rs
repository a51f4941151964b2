use shared::protocol::LeadSignal;
use tracing::info;

/// Browser-side ad pixel. Optional: the service skips both signals when none
/// is configured.
pub trait AdPixel: Send + Sync {
    fn record_page_view(&self);
    fn record_lead(&self, signal: &LeadSignal);
}

/// Pixel for hosts without a real ad integration; signals end up in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingPixel;

impl AdPixel for LoggingPixel {
    fn record_page_view(&self) {
        info!(signal = "PageView", "ad pixel signal");
    }

    fn record_lead(&self, signal: &LeadSignal) {
        info!(
            signal = "Lead",
            content_name = %signal.content_name,
            event_id = %signal.event_id,
            "ad pixel signal"
        );
    }
}
