//! Attribution identity and best-effort booking delivery.
//!
//! The service keeps three identity cookies stable across visits, turns a
//! submitted [`BookingRecord`] into a [`TrackingEvent`] and hands it to the
//! calendar webhook on a detached task. Nothing in here reports failure to
//! the booking flow; delivery problems are logged and captured in a
//! [`DeliveryOutcome`].

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Result;
use chrono::Duration;
use shared::{
    clock::{Clock, SystemClock},
    domain::{BookingRecord, BookingSink},
    error::DeliveryError,
    protocol::{LeadSignal, TrackingEvent, LEAD_CONTENT_NAME},
};
use storage::{Cookie, IdentityStore};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

pub mod hashing;
pub mod identity;
pub mod pixel;
pub mod webhook;

pub use hashing::hash_pii;
pub use identity::AttributionIdentity;
pub use pixel::{AdPixel, LoggingPixel};
pub use webhook::{CalendarWebhook, DeliveryOutcome};

use hashing::{digits_only, international_phone};
use identity::{
    click_param_from_url, new_browser_id, new_click_id, new_event_id, new_external_id,
    BROWSER_ID_COOKIE, BROWSER_ID_LIFETIME_DAYS, CLICK_ID_COOKIE, CLICK_ID_LIFETIME_DAYS,
    DEFAULT_CLICK_PARAM, EXTERNAL_ID_COOKIE, EXTERNAL_ID_LIFETIME_DAYS,
};

pub const DEFAULT_CALENDAR_WEBHOOK_URL: &str =
    "https://hooks.zapier.com/hooks/catch/23096608/uid9pnc/";
pub const DEFAULT_COUNTRY_CODE: &str = "1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributionConfig {
    pub webhook_url: String,
    /// Prepended to the digits of the phone number, without the `+`.
    pub country_code: String,
    pub lead_content_name: String,
    pub click_param: String,
}

impl Default for AttributionConfig {
    fn default() -> Self {
        Self {
            webhook_url: DEFAULT_CALENDAR_WEBHOOK_URL.to_string(),
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
            lead_content_name: LEAD_CONTENT_NAME.to_string(),
            click_param: DEFAULT_CLICK_PARAM.to_string(),
        }
    }
}

/// Where the booking page was loaded and by which agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    pub url: Url,
    pub user_agent: String,
}

impl PageContext {
    pub fn parse(url: &str, user_agent: impl Into<String>) -> Result<Self, url::ParseError> {
        Ok(Self {
            url: Url::parse(url)?,
            user_agent: user_agent.into(),
        })
    }
}

pub struct DispatchReceipt {
    pub event_id: String,
    pub delivery: JoinHandle<DeliveryOutcome>,
}

#[derive(Clone)]
pub struct AttributionService {
    config: Arc<AttributionConfig>,
    page: Arc<PageContext>,
    store: Arc<dyn IdentityStore>,
    clock: Arc<dyn Clock>,
    pixel: Option<Arc<dyn AdPixel>>,
    webhook: CalendarWebhook,
    pending: Arc<Mutex<Vec<JoinHandle<DeliveryOutcome>>>>,
}

impl AttributionService {
    pub fn new(
        config: AttributionConfig,
        page: PageContext,
        store: Arc<dyn IdentityStore>,
    ) -> Self {
        let webhook = CalendarWebhook::new(config.webhook_url.clone());
        Self {
            config: Arc::new(config),
            page: Arc::new(page),
            store,
            clock: Arc::new(SystemClock),
            pixel: None,
            webhook,
            pending: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_pixel(mut self, pixel: Arc<dyn AdPixel>) -> Self {
        self.pixel = Some(pixel);
        self
    }

    pub fn config(&self) -> &AttributionConfig {
        &self.config
    }

    pub fn page(&self) -> &PageContext {
        &self.page
    }

    pub async fn get_or_create_external_id(&self) -> Result<String> {
        let now = self.clock.now();
        if let Some(existing) = self.store.get(EXTERNAL_ID_COOKIE, now).await? {
            return Ok(existing);
        }

        let cookie = Cookie::new(
            EXTERNAL_ID_COOKIE,
            new_external_id(now),
            now,
            Duration::days(EXTERNAL_ID_LIFETIME_DAYS),
        );
        let value = self.store.put_if_absent(cookie, now).await?;
        debug!(external_id = %value, "created external id");
        Ok(value)
    }

    /// Returns the stored click id, or derives one from the page URL. Without
    /// the click parameter nothing is stored and `None` is returned.
    pub async fn get_or_create_click_id(&self) -> Result<Option<String>> {
        let now = self.clock.now();
        if let Some(existing) = self.store.get(CLICK_ID_COOKIE, now).await? {
            return Ok(Some(existing));
        }

        let Some(click_param) = click_param_from_url(&self.page.url, &self.config.click_param)
        else {
            return Ok(None);
        };

        let cookie = Cookie::new(
            CLICK_ID_COOKIE,
            new_click_id(now, &click_param),
            now,
            Duration::days(CLICK_ID_LIFETIME_DAYS),
        );
        let value = self.store.put_if_absent(cookie, now).await?;
        debug!(fbc = %value, "captured ad click id");
        Ok(Some(value))
    }

    pub async fn get_or_create_browser_id(&self) -> Result<String> {
        let now = self.clock.now();
        if let Some(existing) = self.store.get(BROWSER_ID_COOKIE, now).await? {
            return Ok(existing);
        }

        let cookie = Cookie::new(
            BROWSER_ID_COOKIE,
            new_browser_id(now),
            now,
            Duration::days(BROWSER_ID_LIFETIME_DAYS),
        );
        let value = self.store.put_if_absent(cookie, now).await?;
        debug!(fbp = %value, "created browser id");
        Ok(value)
    }

    /// Initializes the browser and click cookies and forwards a page view to
    /// the pixel, if any. Never fails.
    pub async fn record_page_view(&self) {
        if let Err(err) = self.get_or_create_browser_id().await {
            warn!(error = %err, "failed to initialize browser id cookie");
        }
        if let Err(err) = self.get_or_create_click_id().await {
            warn!(error = %err, "failed to initialize click id cookie");
        }

        match &self.pixel {
            Some(pixel) => pixel.record_page_view(),
            None => debug!("no ad pixel configured; page view signal skipped"),
        }
        info!(source_url = %self.page.url, "page view tracked");
    }

    /// Resolves all three identifiers. Store failures fall back to fresh,
    /// unpersisted values so an event can still be built.
    pub async fn resolve_identity(&self) -> AttributionIdentity {
        let external_id = match self.get_or_create_external_id().await {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "external id cookie unavailable; using ephemeral id");
                new_external_id(self.clock.now())
            }
        };
        let click_id = match self.get_or_create_click_id().await {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "click id cookie unavailable");
                None
            }
        };
        let browser_id = match self.get_or_create_browser_id().await {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "browser id cookie unavailable; using ephemeral id");
                new_browser_id(self.clock.now())
            }
        };

        AttributionIdentity {
            external_id,
            click_id,
            browser_id,
        }
    }

    pub async fn build_tracking_event(&self, record: &BookingRecord) -> TrackingEvent {
        let identity = self.resolve_identity().await;
        let now = self.clock.now();

        TrackingEvent {
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            email: record.email.clone(),
            phone: international_phone(&record.phone, &self.config.country_code),
            booking_date: record.booking_date.clone(),
            booking_time: record.booking_time.clone(),
            event_id: new_event_id(now),
            event_time: now.timestamp(),
            source_url: self.page.url.to_string(),
            fbc: identity.click_id,
            fbp: identity.browser_id,
            external_id: identity.external_id,
            user_agent: self.page.user_agent.clone(),
            em_hash: hash_pii(&record.email),
            ph_hash: hash_pii(&digits_only(&record.phone)),
            fn_hash: hash_pii(&record.first_name),
            ln_hash: hash_pii(&record.last_name),
        }
    }

    /// Builds the event and starts both deliveries without waiting on either.
    pub async fn dispatch_booking(&self, record: BookingRecord) -> DispatchReceipt {
        let event = self.build_tracking_event(&record).await;
        let event_id = event.event_id.clone();

        let webhook = self.webhook.clone();
        let delivery = tokio::spawn(async move { webhook.deliver(event).await });

        match &self.pixel {
            Some(pixel) => pixel.record_lead(&LeadSignal {
                content_name: self.config.lead_content_name.clone(),
                event_id: event_id.clone(),
            }),
            None => debug!(event_id = %event_id, "no ad pixel configured; lead signal skipped"),
        }

        DispatchReceipt { event_id, delivery }
    }

    /// Waits for every delivery started through [`BookingSink::submit`].
    pub async fn wait_for_deliveries(&self) -> Vec<DeliveryOutcome> {
        let handles = std::mem::take(
            &mut *self
                .pending
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );

        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            let outcome = handle.await.unwrap_or_else(|err| {
                DeliveryOutcome::Failed(DeliveryError::TaskFailed(err.to_string()))
            });
            outcomes.push(outcome);
        }
        outcomes
    }
}

impl BookingSink for AttributionService {
    fn submit(&self, record: BookingRecord) {
        let service = self.clone();
        let handle = tokio::spawn(async move {
            let receipt = service.dispatch_booking(record).await;
            debug!(event_id = %receipt.event_id, "booking dispatched");
            receipt.delivery.await.unwrap_or_else(|err| {
                DeliveryOutcome::Failed(DeliveryError::TaskFailed(err.to_string()))
            })
        });

        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handle);
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
