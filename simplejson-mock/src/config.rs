use serde::Deserialize;
use std::{fs, path::Path};

pub const CONFIG_PATH_ENV: &str = "SIMPLEJSON_CONFIG";
pub const USER_ENV: &str = "HTTP_USER";
pub const PASS_ENV: &str = "HTTP_PASS";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Auth {
    pub user: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Annotations {
    // Placeholder written into every annotation's `annotation.datasource`
    pub datasource: Option<String>,
    // Placeholder written into every annotation's `text`
    pub text: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    pub listen: Option<String>,
    // IANA zone used to interpret incoming ranges. Defaults to Europe/Madrid.
    pub timezone: Option<String>,
    // Maximum JSON body size in bytes; larger requests get 413 Payload Too Large.
    pub max_request_body_bytes: Option<usize>,
    // Maximum points a single /query or /annotations response may hold; wider ranges get 400.
    // If not set, defaults to 100_000.
    pub max_points: Option<u64>,
    // Names returned by /search
    pub search_targets: Option<Vec<String>>,
    #[serde(default)]
    pub auth: Auth,
    #[serde(default)]
    pub annotations: Annotations,
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let cfg_str = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read config file '{}': {}", path, e))?;
        Ok(toml::from_str(&cfg_str)?)
    }

    /// Loads the file named by `SIMPLEJSON_CONFIG`, falling back to `config.toml`
    /// when present and to defaults otherwise, then applies credential overrides
    /// from `HTTP_USER` / `HTTP_PASS`.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(&path)?,
            Err(_) if Path::new("config.toml").exists() => Self::from_file("config.toml")?,
            Err(_) => Self::default(),
        };
        cfg.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(user) = lookup(USER_ENV) {
            self.auth.user = Some(user);
        }
        if let Some(pass) = lookup(PASS_ENV) {
            self.auth.password = Some(pass);
        }
    }
}
