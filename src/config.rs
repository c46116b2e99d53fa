use std::env;

use anyhow::{Context, bail};

use crate::services::session_completer::{DurationPolicy, FinishPolicy};

const DEFAULT_API_URL: &str = "http://localhost:8000/api/";
const DEFAULT_PORT: &str = "8080";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DURATION_MINUTES: u32 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub fitness_api_url: String,
    pub port: String,
    pub request_timeout_secs: u64,
    pub finish_policy: FinishPolicy,
    pub duration_policy: DurationPolicy,
    pub cors_allow_origin: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut fitness_api_url =
            lookup("FITNESS_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        // Relative joins drop the last path segment unless the base ends in '/'.
        if !fitness_api_url.ends_with('/') {
            fitness_api_url.push('/');
        }

        let port = lookup("PORT").unwrap_or_else(|| DEFAULT_PORT.to_string());

        let request_timeout_secs = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("REQUEST_TIMEOUT_SECS is not a number: {raw}"))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let finish_policy = match lookup("FINISH_POLICY").as_deref() {
            None | Some("require_completed") => FinishPolicy::RequireCompleted,
            Some("allow_empty") => FinishPolicy::AllowEmpty,
            Some(other) => bail!("unknown FINISH_POLICY: {other}"),
        };

        let fixed_minutes = match lookup("FIXED_DURATION_MINUTES") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("FIXED_DURATION_MINUTES is not a number: {raw}"))?,
            None => DEFAULT_DURATION_MINUTES,
        };

        let duration_policy = match lookup("DURATION_POLICY").as_deref() {
            None | Some("fixed") => DurationPolicy::Fixed(fixed_minutes),
            Some("measured") => DurationPolicy::Measured,
            Some(other) => bail!("unknown DURATION_POLICY: {other}"),
        };

        let cors_allow_origin = lookup("CORS_ALLOW_ORIGIN").filter(|origin| !origin.is_empty());

        Ok(Self {
            fitness_api_url,
            port,
            request_timeout_secs,
            finish_policy,
            duration_policy,
            cors_allow_origin,
        })
    }
}
