use std::fs;

use attribution::{
    identity::DEFAULT_CLICK_PARAM, AttributionConfig, DEFAULT_CALENDAR_WEBHOOK_URL,
    DEFAULT_COUNTRY_CODE,
};
use serde::Deserialize;
use shared::protocol::LEAD_CONTENT_NAME;
use storage::default_cookie_jar_url;

pub const SETTINGS_FILE: &str = "booking.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub webhook_url: String,
    pub cookie_jar_url: String,
    pub country_code: String,
    pub click_param: String,
    pub page_url: String,
    pub user_agent: String,
    pub viewport_width: u32,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            webhook_url: DEFAULT_CALENDAR_WEBHOOK_URL.into(),
            cookie_jar_url: default_cookie_jar_url(),
            country_code: DEFAULT_COUNTRY_CODE.into(),
            click_param: DEFAULT_CLICK_PARAM.into(),
            page_url: "http://localhost/".into(),
            user_agent: format!("booking/{}", env!("CARGO_PKG_VERSION")),
            viewport_width: 1280,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn attribution_config(&self) -> AttributionConfig {
        AttributionConfig {
            webhook_url: self.webhook_url.clone(),
            country_code: self.country_code.clone(),
            lead_content_name: LEAD_CONTENT_NAME.into(),
            click_param: self.click_param.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    webhook_url: Option<String>,
    cookie_jar_url: Option<String>,
    country_code: Option<String>,
    click_param: Option<String>,
    page_url: Option<String>,
    user_agent: Option<String>,
    viewport_width: Option<u32>,
    log_filter: Option<String>,
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(SETTINGS_FILE) {
        apply_file_overrides(&mut settings, &raw);
    }
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());

    settings
}

/// Unparseable files are ignored as a whole.
fn apply_file_overrides(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<FileSettings>(raw) else {
        return;
    };

    if let Some(v) = file_cfg.webhook_url {
        settings.webhook_url = v;
    }
    if let Some(v) = file_cfg.cookie_jar_url {
        settings.cookie_jar_url = v;
    }
    if let Some(v) = file_cfg.country_code {
        settings.country_code = v;
    }
    if let Some(v) = file_cfg.click_param {
        settings.click_param = v;
    }
    if let Some(v) = file_cfg.page_url {
        settings.page_url = v;
    }
    if let Some(v) = file_cfg.user_agent {
        settings.user_agent = v;
    }
    if let Some(v) = file_cfg.viewport_width {
        settings.viewport_width = v;
    }
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
}

fn apply_env_overrides(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("APP__WEBHOOK_URL") {
        settings.webhook_url = v;
    }
    if let Some(v) = var("APP__COOKIE_JAR_URL") {
        settings.cookie_jar_url = v;
    }
    if let Some(v) = var("APP__COUNTRY_CODE") {
        settings.country_code = v;
    }
    if let Some(v) = var("APP__CLICK_PARAM") {
        settings.click_param = v;
    }
    if let Some(v) = var("APP__PAGE_URL") {
        settings.page_url = v;
    }
    if let Some(v) = var("APP__USER_AGENT") {
        settings.user_agent = v;
    }
    if let Some(v) = var("APP__VIEWPORT_WIDTH") {
        if let Ok(parsed) = v.parse::<u32>() {
            settings.viewport_width = parsed;
        }
    }
    if let Some(v) = var("RUST_LOG") {
        settings.log_filter = v;
    }
    if let Some(v) = var("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
