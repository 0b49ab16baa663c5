//! Runtime configuration for the Asset Central connection
//!
//! All four settings are required and come from the process environment,
//! optionally seeded from a `.env` file in the working directory.

use anyhow::{Result, bail};

/// Environment variable names
pub mod vars {
    pub const CLIENT_ID: &str = "AC_CLIENT_ID";
    pub const CLIENT_SECRET: &str = "AC_CLIENT_SECRET";
    pub const BASE_URL: &str = "AC_BASE_URL";
    pub const TOKEN_URL: &str = "AC_TOKEN_URL";
}

/// Connection settings for one run
#[derive(Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    /// API root, e.g. `https://host/ain/services/api/v1` (no trailing slash)
    pub base_url: String,
    /// OAuth2 token endpoint
    pub token_url: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("token_url", &self.token_url)
            .finish()
    }
}

impl Config {
    /// Load from the environment, reading `.env` first if one exists
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => log::debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => log::warn!("Ignoring unreadable .env file: {}", e),
        }

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut get = |name: &'static str| -> String {
            match lookup(name).map(|v| v.trim().to_string()) {
                Some(v) if !v.is_empty() => v,
                _ => {
                    missing.push(name);
                    String::new()
                }
            }
        };

        let client_id = get(vars::CLIENT_ID);
        let client_secret = get(vars::CLIENT_SECRET);
        let base_url = get(vars::BASE_URL);
        let token_url = get(vars::TOKEN_URL);

        if !missing.is_empty() {
            bail!(
                "Missing required configuration: {}. Set them in the environment or a .env file",
                missing.join(", ")
            );
        }

        Ok(Self {
            client_id,
            client_secret,
            base_url: base_url.trim_end_matches('/').to_string(),
            token_url,
        })
    }

    /// Absolute URL for an API path such as `/indicators`
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
