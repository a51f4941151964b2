//! Cookie names, lifetimes and formats of the attribution identifiers.

use chrono::{DateTime, Utc};
use rand::Rng;
use url::Url;
use uuid::Uuid;

pub const EXTERNAL_ID_COOKIE: &str = "external_id";
pub const CLICK_ID_COOKIE: &str = "_fbc";
pub const BROWSER_ID_COOKIE: &str = "_fbp";

pub const EXTERNAL_ID_LIFETIME_DAYS: i64 = 365;
pub const CLICK_ID_LIFETIME_DAYS: i64 = 90;
pub const BROWSER_ID_LIFETIME_DAYS: i64 = 90;

pub const DEFAULT_CLICK_PARAM: &str = "fbclid";

const BROWSER_ID_SUFFIX_LEN: usize = 10;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributionIdentity {
    pub external_id: String,
    pub click_id: Option<String>,
    pub browser_id: String,
}

pub fn new_external_id(now: DateTime<Utc>) -> String {
    format!("extid.{}.{}", now.timestamp_millis(), Uuid::new_v4())
}

pub fn new_click_id(now: DateTime<Utc>, click_param: &str) -> String {
    format!("fb.1.{}.{click_param}", now.timestamp_millis())
}

pub fn new_browser_id(now: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..BROWSER_ID_SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("fb.1.{}.{suffix}", now.timestamp_millis())
}

pub fn new_event_id(now: DateTime<Utc>) -> String {
    format!("lead_{}_{}", now.timestamp_millis(), Uuid::new_v4())
}

/// Reads an ad-click parameter from the page URL. Empty values count as
/// absent.
pub fn click_param_from_url(url: &Url, param: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == param)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}
