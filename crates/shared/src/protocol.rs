use serde::{Deserialize, Serialize};

/// Content label attached to every lead signal sent to the ad pixel.
pub const LEAD_CONTENT_NAME: &str = "Strategy Call Booking";

/// JSON body posted to the calendar webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Digits only, prefixed with `+<country code>`.
    pub phone: String,

    pub booking_date: String,
    pub booking_time: String,

    pub event_id: String,
    /// Unix seconds.
    pub event_time: i64,
    pub source_url: String,

    pub fbc: Option<String>,
    pub fbp: String,
    pub external_id: String,
    pub user_agent: String,

    pub em_hash: String,
    pub ph_hash: String,
    pub fn_hash: String,
    pub ln_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadSignal {
    pub content_name: String,
    /// Shared with the webhook event so the two deliveries can be deduplicated.
    pub event_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracking_event_serializes_with_webhook_field_names() {
        let event = TrackingEvent {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: "jane@x.com".into(),
            phone: "+15551234567".into(),
            booking_date: "Tuesday, October 20, 2026".into(),
            booking_time: "10:00 AM".into(),
            event_id: "lead_1_abc".into(),
            event_time: 1,
            source_url: "https://example.com/".into(),
            fbc: None,
            fbp: "fb.1.1.abc".into(),
            external_id: "extid.1.abc".into(),
            user_agent: "test-agent".into(),
            em_hash: "e".into(),
            ph_hash: "p".into(),
            fn_hash: "f".into(),
            ln_hash: "l".into(),
        };

        let value = serde_json::to_value(&event).expect("serialize");
        let object = value.as_object().expect("object");
        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();

        let mut expected = vec![
            "first_name",
            "last_name",
            "email",
            "phone",
            "booking_date",
            "booking_time",
            "event_id",
            "event_time",
            "source_url",
            "fbc",
            "fbp",
            "external_id",
            "user_agent",
            "em_hash",
            "ph_hash",
            "fn_hash",
            "ln_hash",
        ];
        expected.sort_unstable();

        assert_eq!(keys, expected);
        assert!(object["fbc"].is_null());
    }
}
