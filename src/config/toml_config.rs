use crate::adapters::NewsQuery;
use crate::core::artifacts::ArtifactFiles;
use crate::utils::error::{Result, ServiceError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_NEWS_ENDPOINT: &str = "https://newsdata.io/api/1/news";
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5173";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub artifacts: ArtifactConfig,
    pub news: NewsConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub allowed_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5050)),
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    pub dir: PathBuf,
    #[serde(flatten)]
    pub files: ArtifactFiles,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("model"),
            files: ArtifactFiles::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    pub endpoint: String,
    pub topic: String,
    pub language: String,
    pub page_size: u32,
    pub timeout_seconds: u64,
    /// Name of the environment variable holding the provider key.
    pub api_key_env: String,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_NEWS_ENDPOINT.to_string(),
            topic: "automobile".to_string(),
            language: "en".to_string(),
            page_size: 10,
            timeout_seconds: 10,
            api_key_env: "NEWS_API_KEY".to_string(),
        }
    }
}

impl NewsConfig {
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    pub fn query(&self) -> NewsQuery {
        NewsQuery {
            endpoint: self.endpoint.clone(),
            topic: self.topic.clone(),
            language: self.language.clone(),
            page_size: self.page_size,
            api_key: self.api_key(),
            timeout: Duration::from_secs(self.timeout_seconds),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub system_stats: bool,
    pub json_logs: bool,
}

impl ServiceConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ServiceError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ServiceError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ARTIFACT_DIR})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ServiceError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_origin("server.allowed_origin", &self.server.allowed_origin)?;

        let dir = self.artifacts.dir.to_string_lossy();
        validation::validate_path("artifacts.dir", &dir)?;
        for (field, name) in [
            ("artifacts.model", &self.artifacts.files.model),
            ("artifacts.encoders", &self.artifacts.files.encoders),
            ("artifacts.scaler", &self.artifacts.files.scaler),
            ("artifacts.feature_order", &self.artifacts.files.feature_order),
        ] {
            validation::validate_path(field, name)?;
        }

        validation::validate_url("news.endpoint", &self.news.endpoint)?;
        validation::validate_non_empty_string("news.topic", &self.news.topic)?;
        validation::validate_non_empty_string("news.language", &self.news.language)?;
        validation::validate_non_empty_string("news.api_key_env", &self.news.api_key_env)?;
        validation::validate_range("news.page_size", self.news.page_size, 1, 50)?;
        validation::validate_range("news.timeout_seconds", self.news.timeout_seconds, 1, 120)?;

        Ok(())
    }
}
