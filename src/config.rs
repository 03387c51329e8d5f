use crate::error::{PlantIdError, Result};
use plant_id_common::{HealthMode, IdentificationOptions, RequestShape};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const API_KEY_ENV: &str = "PLANT_ID_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub identification_url: String,
    pub enrichment_url: String,
    pub timeout_seconds: u64,
    pub request_shape: RequestShape,
    pub similar_images: bool,
    pub health: HealthMode,
    /// plant.id に要求する詳細項目（`details` クエリ）
    pub details: Vec<String>,
    pub language: Option<String>,
    /// 説明が無い場合に Wikipedia で補完する
    pub enrichment: bool,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            identification_url: "https://plant.id/api/v3/identification".into(),
            enrichment_url: "https://en.wikipedia.org/w/api.php".into(),
            timeout_seconds: 20,
            request_shape: RequestShape::Coordinates,
            similar_images: true,
            health: HealthMode::Auto,
            details: vec!["common_names".into(), "description".into()],
            language: None,
            enrichment: true,
            user_agent: concat!("plant-id-rust/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// 設定ファイルを読み込み（存在しなければデフォルト）
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| PlantIdError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("plant-id").join("config.json"))
    }

    pub fn get_api_key(&self) -> Result<String> {
        // 環境変数を優先
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                return Ok(key);
            }
        }

        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(PlantIdError::MissingApiKey)
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.max(1))
    }

    /// 設定から1リクエスト分の送信オプションを作る（撮影位置は未設定）
    pub fn identification_options(&self) -> IdentificationOptions {
        IdentificationOptions {
            shape: self.request_shape,
            similar_images: self.similar_images,
            health: self.health,
            latitude: None,
            longitude: None,
        }
    }
}
