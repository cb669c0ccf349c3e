use crate::config::Config;
use chrono_tz::Tz;
use std::net::SocketAddr;
use tracing::{debug, info};

const DEFAULT_LISTEN: &str = "0.0.0.0:8080";
const DEFAULT_TIMEZONE: &str = "Europe/Madrid";
const DEFAULT_MAX_BODY_BYTES: usize = 1_048_576; // 1 MB
const DEFAULT_MAX_POINTS: u64 = 100_000;
const DEFAULT_DATASOURCE: &str = "simplejson";
const DEFAULT_ANNOTATION_TEXT: &str = "annotation";
const DEFAULT_SEARCH_TARGETS: [&str; 5] = ["10", "25", "50", "75", "100"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub listen: SocketAddr,
    pub timezone: Tz,
    pub credentials: Credentials,
    pub max_request_body_bytes: usize,
    pub max_points: u64,
    pub search_targets: Vec<String>,
    pub annotation_datasource: String,
    pub annotation_text: String,
}

impl AppState {
    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        let listen = cfg.listen.as_deref().unwrap_or(DEFAULT_LISTEN);
        let listen: SocketAddr = listen
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid listen address '{}': {}", listen, e))?;

        let tz_name = cfg.timezone.as_deref().unwrap_or(DEFAULT_TIMEZONE);
        let timezone: Tz = tz_name
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid timezone '{}': {}", tz_name, e))?;
        info!("Interpreting ranges in timezone {}", timezone);

        // Both halves are required so the service never starts unprotected
        let credentials = match (&cfg.auth.user, &cfg.auth.password) {
            (Some(user), Some(password)) => Credentials {
                user: user.clone(),
                password: password.clone(),
            },
            _ => anyhow::bail!(
                "Basic auth credentials missing: set [auth] user/password or HTTP_USER/HTTP_PASS"
            ),
        };

        let max_request_body_bytes = cfg.max_request_body_bytes.unwrap_or(DEFAULT_MAX_BODY_BYTES);
        debug!("Maximum request body size: {} bytes", max_request_body_bytes);

        let max_points = cfg.max_points.unwrap_or(DEFAULT_MAX_POINTS);
        debug!("Maximum points per response: {}", max_points);

        let search_targets = cfg.search_targets.clone().unwrap_or_else(|| {
            DEFAULT_SEARCH_TARGETS
                .iter()
                .map(|t| t.to_string())
                .collect()
        });
        debug!("Search targets: {:?}", search_targets);

        Ok(AppState {
            listen,
            timezone,
            credentials,
            max_request_body_bytes,
            max_points,
            search_targets,
            annotation_datasource: cfg
                .annotations
                .datasource
                .clone()
                .unwrap_or_else(|| DEFAULT_DATASOURCE.to_string()),
            annotation_text: cfg
                .annotations
                .text
                .clone()
                .unwrap_or_else(|| DEFAULT_ANNOTATION_TEXT.to_string()),
        })
    }
}
