use std::{collections::HashMap, fs, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;

pub const SETTINGS_FILE: &str = "cloudbrew.toml";
pub const DEFAULT_ORDER_ENDPOINT: &str =
    "https://nh9mq2pqr2.execute-api.ap-south-1.amazonaws.com/order";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSettings {
    pub order_endpoint: String,
    pub mask_submission_errors: bool,
    pub recommendation_delay_ms: u64,
    pub request_timeout_secs: Option<u64>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            order_endpoint: DEFAULT_ORDER_ENDPOINT.into(),
            mask_submission_errors: true,
            recommendation_delay_ms: 800,
            request_timeout_secs: None,
        }
    }
}

impl ClientSettings {
    pub fn recommendation_delay(&self) -> Duration {
        Duration::from_millis(self.recommendation_delay_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Loads `cloudbrew.toml` from the working directory (if any), then applies environment overrides.
pub fn load_settings() -> anyhow::Result<ClientSettings> {
    let mut settings = ClientSettings::default();

    let path = Path::new(SETTINGS_FILE);
    if path.exists() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
        apply_file_settings(&mut settings, &raw)?;
    }

    apply_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file_settings(settings: &mut ClientSettings, raw: &str) -> anyhow::Result<()> {
    let file_cfg = toml::from_str::<HashMap<String, toml::Value>>(raw)
        .with_context(|| format!("failed to parse {SETTINGS_FILE}"))?;

    if let Some(v) = file_cfg.get("order_endpoint").and_then(toml::Value::as_str) {
        settings.order_endpoint = v.to_string();
    }
    if let Some(v) = file_cfg
        .get("mask_submission_errors")
        .and_then(toml::Value::as_bool)
    {
        settings.mask_submission_errors = v;
    }
    if let Some(v) = file_cfg
        .get("recommendation_delay_ms")
        .and_then(toml::Value::as_integer)
        .and_then(|v| u64::try_from(v).ok())
    {
        settings.recommendation_delay_ms = v;
    }
    if let Some(v) = file_cfg
        .get("request_timeout_secs")
        .and_then(toml::Value::as_integer)
        .and_then(|v| u64::try_from(v).ok())
    {
        settings.request_timeout_secs = Some(v);
    }

    Ok(())
}

fn apply_overrides(settings: &mut ClientSettings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("ORDER_ENDPOINT") {
        settings.order_endpoint = v;
    }
    if let Some(v) = lookup("APP__ORDER_ENDPOINT") {
        settings.order_endpoint = v;
    }

    if let Some(parsed) = lookup("APP__MASK_SUBMISSION_ERRORS").and_then(|v| parse_bool(&v)) {
        settings.mask_submission_errors = parsed;
    }

    if let Some(parsed) =
        lookup("APP__RECOMMENDATION_DELAY_MS").and_then(|v| v.trim().parse::<u64>().ok())
    {
        settings.recommendation_delay_ms = parsed;
    }

    if let Some(parsed) =
        lookup("APP__REQUEST_TIMEOUT_SECS").and_then(|v| v.trim().parse::<u64>().ok())
    {
        settings.request_timeout_secs = Some(parsed);
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
