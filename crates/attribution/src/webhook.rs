use reqwest::Client;
use shared::{error::DeliveryError, protocol::TrackingEvent};
use tracing::{error, info};

#[derive(Debug)]
pub enum DeliveryOutcome {
    Delivered { status: u16 },
    Failed(DeliveryError),
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered { .. })
    }
}

#[derive(Clone)]
pub struct CalendarWebhook {
    http: Client,
    url: String,
}

impl CalendarWebhook {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn post(&self, event: &TrackingEvent) -> Result<u16, DeliveryError> {
        let response = self
            .http
            .post(&self.url)
            .json(event)
            .send()
            .await
            .map_err(|err| DeliveryError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Status(status.as_u16()));
        }
        Ok(status.as_u16())
    }

    /// Posts the event once and logs the result. Failures are never retried.
    pub async fn deliver(&self, event: TrackingEvent) -> DeliveryOutcome {
        match self.post(&event).await {
            Ok(status) => {
                info!(
                    event_id = %event.event_id,
                    status,
                    "booking sent to calendar webhook"
                );
                DeliveryOutcome::Delivered { status }
            }
            Err(err) => {
                error!(
                    event_id = %event.event_id,
                    url = %self.url,
                    error = %err,
                    "calendar webhook delivery failed"
                );
                DeliveryOutcome::Failed(err)
            }
        }
    }
}
