//! 同定結果の型定義
//!
//! CLIと表示層で共有される型:
//! - Suggestion: plant.id レスポンスの先頭候補
//! - EnrichmentRecord: Wikipedia から補完した一般名・説明
//! - PlantResult: 最終出力（表示層へ渡す不変な結果）

use serde::{Deserialize, Serialize};

/// plant.id レスポンスの生データ（トップレベルはJSONオブジェクト）
pub type RawResponse = serde_json::Map<String, serde_json::Value>;

/// 先頭候補から取り出した各フィールド
///
/// 各フィールドは独立して欠落しうる。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Suggestion {
    pub species_name: Option<String>,
    pub probability: Option<f64>,
    pub common_names: Vec<String>,
    pub description: Option<String>,
}

impl Suggestion {
    /// 最初の一般名
    pub fn common_name(&self) -> Option<&str> {
        self.common_names.first().map(String::as_str)
    }

    /// 空白のみの説明は説明なしとして扱う
    pub fn has_description(&self) -> bool {
        self.description
            .as_deref()
            .is_some_and(|d| !d.trim().is_empty())
    }
}

/// 補完ルックアップの結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentRecord {
    pub common_name: String,
    pub description: String,
}

/// 表示層へ渡す最終結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantResult {
    /// 学名
    pub plant_name: String,

    #[serde(default)]
    pub common_name: String,

    /// "Confidence: 87.3%" 形式
    #[serde(default)]
    pub confidence_label: String,

    #[serde(default)]
    pub description: String,
}

/// 健康診断フラグ（health リクエスト形式でのみ送信）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthMode {
    #[default]
    Auto,
    OnlyHealth,
}

impl HealthMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthMode::Auto => "auto",
            HealthMode::OnlyHealth => "only_health",
        }
    }
}

/// リクエストパラメータの形式
///
/// 座標ベースと健康フラグベースの2形式がある。どちらか一方のみ送信する。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestShape {
    #[default]
    Coordinates,
    Health,
}

/// 1リクエスト分の送信オプション
#[derive(Debug, Clone, PartialEq)]
pub struct IdentificationOptions {
    pub shape: RequestShape,
    pub similar_images: bool,
    pub health: HealthMode,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Default for IdentificationOptions {
    fn default() -> Self {
        Self {
            shape: RequestShape::Coordinates,
            similar_images: true,
            health: HealthMode::Auto,
            latitude: None,
            longitude: None,
        }
    }
}

impl IdentificationOptions {
    /// 撮影位置を設定したコピーを返す
    pub fn with_location(&self, latitude: Option<f64>, longitude: Option<f64>) -> Self {
        Self {
            latitude,
            longitude,
            ..self.clone()
        }
    }
}
