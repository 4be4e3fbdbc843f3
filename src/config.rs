use anyhow::{Context, Result};
use keyring::Entry;

const KEYRING_SERVICE: &str = "mock_interviewer_api_key";

const DEFAULT_API_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_API_KEY_REF: &str = "env:OPENAI_API_KEY";

/// Where and how to reach the language-model backend. The credential is held
/// as a reference (`env:<VAR>` or `keyring`), never inline; a reference that
/// cannot be resolved at startup is the fatal configuration error.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_url: String,
    pub model: String,
    pub api_key_ref: Option<String>,
}

impl ProviderConfig {
    /// Reads endpoint, model and key reference from the environment, with
    /// OpenAI defaults.
    pub fn from_env() -> Self {
        Self {
            api_url: std::env::var("INTERVIEWER_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            model: std::env::var("INTERVIEWER_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            api_key_ref: Some(
                std::env::var("INTERVIEWER_API_KEY_REF")
                    .unwrap_or_else(|_| DEFAULT_API_KEY_REF.to_string()),
            ),
        }
    }

    /// Retrieves the API key for this configuration. The `api_key_ref` field
    /// determines whether to read from environment variables or the OS keyring.
    pub fn resolve_api_key(&self) -> Result<String> {
        match self.api_key_ref.as_deref() {
            Some(ref_str) if ref_str.starts_with("env:") => {
                let env_var_name = ref_str.trim_start_matches("env:");
                log::debug!("Retrieving API key from environment variable: {}", env_var_name);
                std::env::var(env_var_name).context(format!(
                    "Failed to get API key from environment variable '{}'",
                    env_var_name
                ))
            }
            Some(ref_str) if ref_str == "keyring" => {
                let entry = Entry::new(KEYRING_SERVICE, &self.model)
                    .context("Failed to create keyring entry")?;
                log::debug!("Retrieving API key from keyring for service: {}", KEYRING_SERVICE);
                entry.get_password().context(format!(
                    "Failed to get API key from keyring for '{}'. Please set it first.",
                    self.model
                ))
            }
            Some(other) => Err(anyhow::anyhow!("Unsupported api_key_ref format: {}", other)),
            None => Err(anyhow::anyhow!("API key reference not set")),
        }
    }
}

/// Stores an API key in the OS keyring so a `keyring` reference resolves.
pub fn set_api_key_in_keyring(config: &ProviderConfig, api_key: &str) -> Result<()> {
    let entry = Entry::new(KEYRING_SERVICE, &config.model)
        .context("Failed to create keyring entry for setting password")?;
    log::info!("Setting API key in keyring for service: {}", KEYRING_SERVICE);
    entry
        .set_password(api_key)
        .context(format!("Failed to set API key in keyring for '{}'", config.model))
}
