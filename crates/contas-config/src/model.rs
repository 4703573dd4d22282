use serde::{Deserialize, Serialize};

/// Stores the backend connection settings and user-facing preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the managed backend project.
    pub service_url: String,
    /// Publishable (anonymous) API key for that project.
    pub anon_key: String,
    /// Currency symbol used when formatting amounts.
    #[serde(default = "Config::default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default = "Config::default_locale")]
    pub locale: String,
    /// Overrides the fetch window size; the services' default applies when
    /// absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_limit: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_url: String::new(),
            anon_key: String::new(),
            currency_symbol: Self::default_currency_symbol(),
            locale: Self::default_locale(),
            fetch_limit: None,
        }
    }
}

impl Config {
    pub fn default_currency_symbol() -> String {
        "R$".into()
    }

    pub fn default_locale() -> String {
        "pt-BR".into()
    }

    /// Checks the settings a live backend connection cannot run without.
    /// Called once at startup so a misconfigured build fails loudly instead
    /// of issuing unauthenticated requests.
    pub fn ensure_backend(&self) -> Result<(), crate::ConfigError> {
        if self.service_url.trim().is_empty() || self.anon_key.trim().is_empty() {
            return Err(crate::ConfigError::Incomplete(
                "service_url and anon_key must both be set".into(),
            ));
        }
        Ok(())
    }
}
