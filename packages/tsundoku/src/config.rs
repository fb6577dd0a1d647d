use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use secrecy::{ExposeSecret, SecretString};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use llm_client::{GeminiClient, OpenAiClient, Provider, TextGenerator};
use sheets_client::{Auth, ServiceAccountKey, SheetsClient};

use crate::extractor::{ExtractorConfig, Strategy, DEFAULT_CHAR_BUDGET};
use crate::store::{MemoryStore, RecordStore, SheetsStore};

pub const DEFAULT_WORKSHEET: &str = "Sheet1";

/// Where the shelf lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreKind {
    #[default]
    Sheets,
    Memory,
}

impl std::str::FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sheets" | "google-sheets" => Ok(StoreKind::Sheets),
            "memory" => Ok(StoreKind::Memory),
            other => Err(format!("unknown store: {} (expected sheets|memory)", other)),
        }
    }
}

impl std::fmt::Display for StoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreKind::Sheets => f.write_str("sheets"),
            StoreKind::Memory => f.write_str("memory"),
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug)]
pub struct Config {
    pub provider: Provider,
    pub gemini_api_key: Option<SecretString>,
    pub openai_api_key: Option<SecretString>,
    pub openai_base_url: Option<String>,
    /// Whether the OpenAI-compatible server honours `json_schema` output.
    pub openai_schema_support: bool,
    pub model: Option<String>,
    pub extractor: ExtractorConfig,
    pub store: StoreKind,
    pub spreadsheet_id: Option<String>,
    pub worksheet: String,
    pub credentials_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider = match var("TSUNDOKU_PROVIDER") {
            Some(v) => v
                .parse::<Provider>()
                .context("TSUNDOKU_PROVIDER must be gemini or openai")?,
            None => Provider::default(),
        };

        let strategy = match var("TSUNDOKU_STRATEGY") {
            Some(v) => v
                .parse::<Strategy>()
                .map_err(anyhow::Error::msg)
                .context("TSUNDOKU_STRATEGY must be schema or freeform")?,
            None => Strategy::default(),
        };

        let char_budget = match var("TSUNDOKU_CHAR_BUDGET") {
            Some(v) => v
                .trim()
                .parse::<usize>()
                .context("TSUNDOKU_CHAR_BUDGET must be a positive number")?,
            None => DEFAULT_CHAR_BUDGET,
        };

        let store = match var("TSUNDOKU_STORE") {
            Some(v) => v
                .parse::<StoreKind>()
                .map_err(anyhow::Error::msg)
                .context("TSUNDOKU_STORE must be sheets or memory")?,
            None => StoreKind::default(),
        };

        let openai_schema_support = match var("TSUNDOKU_SCHEMA_SUPPORT") {
            Some(v) => parse_flag(&v).context("TSUNDOKU_SCHEMA_SUPPORT must be true or false")?,
            None => true,
        };

        Ok(Self {
            provider,
            gemini_api_key: var("GEMINI_API_KEY")
                .or_else(|| var("GOOGLE_API_KEY"))
                .map(SecretString::from),
            openai_api_key: var("OPENAI_API_KEY").map(SecretString::from),
            openai_base_url: var("OPENAI_BASE_URL"),
            openai_schema_support,
            model: var("TSUNDOKU_MODEL"),
            extractor: ExtractorConfig::default()
                .with_strategy(strategy)
                .with_char_budget(char_budget),
            store,
            spreadsheet_id: var("TSUNDOKU_SPREADSHEET_ID"),
            worksheet: var("TSUNDOKU_WORKSHEET").unwrap_or_else(|| DEFAULT_WORKSHEET.to_string()),
            credentials_path: var("GOOGLE_APPLICATION_CREDENTIALS").map(PathBuf::from),
        })
    }

    /// The generation backend for the configured provider.
    pub fn build_generator(&self) -> Result<Arc<dyn TextGenerator>> {
        match self.provider {
            Provider::Gemini => {
                let key = self
                    .gemini_api_key
                    .as_ref()
                    .context("GEMINI_API_KEY (or GOOGLE_API_KEY) must be set")?;
                let mut client = GeminiClient::new(key.expose_secret());
                if let Some(model) = &self.model {
                    client = client.with_model(model);
                }
                Ok(Arc::new(client))
            }
            Provider::OpenAi => {
                let key = self
                    .openai_api_key
                    .as_ref()
                    .context("OPENAI_API_KEY must be set")?;
                let mut client = OpenAiClient::new(key.expose_secret())
                    .with_schema_support(self.openai_schema_support);
                if let Some(base_url) = &self.openai_base_url {
                    client = client.with_base_url(base_url);
                }
                if let Some(model) = &self.model {
                    client = client.with_model(model);
                }
                Ok(Arc::new(client))
            }
        }
    }

    /// Open the configured store. Sheets connects once here and the handle is
    /// reused for the whole process.
    pub async fn connect_store(&self) -> Result<Arc<dyn RecordStore>> {
        match self.store {
            StoreKind::Memory => Ok(Arc::new(MemoryStore::new())),
            StoreKind::Sheets => {
                let Some(spreadsheet_id) = &self.spreadsheet_id else {
                    bail!("TSUNDOKU_SPREADSHEET_ID must be set for the sheets store");
                };
                let path = self
                    .credentials_path
                    .as_ref()
                    .context("GOOGLE_APPLICATION_CREDENTIALS must point to a service-account key")?;

                let key = ServiceAccountKey::from_file(path).with_context(|| {
                    format!("Failed to load service-account key from {}", path.display())
                })?;
                let client = SheetsClient::new(Auth::service_account(key));

                let store = SheetsStore::connect(client, spreadsheet_id.as_str(), self.worksheet.as_str())
                    .await
                    .with_context(|| {
                        format!(
                            "Failed to open worksheet {:?} in spreadsheet {}",
                            self.worksheet, spreadsheet_id
                        )
                    })?;
                Ok(Arc::new(store))
            }
        }
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => bail!("not a boolean: {}", other),
    }
}
