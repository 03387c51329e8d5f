//! 同定パイプライン
//!
//! 画像エンコード -> 同定API -> 先頭候補の解析 -> （説明が無ければ）補完
//! -> 不変な PlantResult

use crate::client::IdentificationClient;
use crate::config::Config;
use crate::encoder;
use crate::enrichment::EnrichmentLookup;
use crate::error::{PlantIdError, Result};
use async_trait::async_trait;
use image::DynamicImage;
use plant_id_common::{merge_result, parse_suggestion, IdentificationOptions, PlantResult};
use tracing::{debug, info, warn};

/// 画像から同定結果を得る処理
#[async_trait]
pub trait Identifier: Send + Sync {
    async fn identify(&self, image: DynamicImage) -> Result<PlantResult>;
}

pub struct Pipeline {
    client: IdentificationClient,
    enrichment: Option<EnrichmentLookup>,
    options: IdentificationOptions,
}

impl Pipeline {
    pub fn new(
        client: IdentificationClient,
        enrichment: Option<EnrichmentLookup>,
        options: IdentificationOptions,
    ) -> Self {
        Self {
            client,
            enrichment,
            options,
        }
    }

    /// 設定から組み立てる（APIキーが無ければエラー）
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = IdentificationClient::new(config, config.get_api_key()?)?;
        let enrichment = if config.enrichment {
            Some(EnrichmentLookup::new(config)?)
        } else {
            None
        };
        Ok(Self::new(client, enrichment, config.identification_options()))
    }

    pub fn options(&self) -> &IdentificationOptions {
        &self.options
    }

    pub fn with_options(mut self, options: IdentificationOptions) -> Self {
        self.options = options;
        self
    }

    /// オプションを指定して1画像を同定
    pub async fn identify_with_options(
        &self,
        image: DynamicImage,
        options: &IdentificationOptions,
    ) -> Result<PlantResult> {
        // エンコードはCPU処理なのでブロッキングプールで実行
        let encoded = tokio::task::spawn_blocking(move || encoder::encode(&image))
            .await
            .map_err(|e| PlantIdError::Encoding(format!("エンコードタスク異常終了: {}", e)))??;

        let raw = self.client.identify(&encoded, options).await?;

        let suggestion = parse_suggestion(&raw).ok_or(PlantIdError::NoIdentification)?;
        debug!(?suggestion, "先頭候補");

        let enrichment = match (&self.enrichment, suggestion.species_name.as_deref()) {
            (Some(lookup), Some(name)) if !suggestion.has_description() => {
                match lookup.lookup(name).await {
                    Ok(record) => Some(record),
                    Err(e) => {
                        warn!(species = name, error = %e, "補完に失敗、説明なしで続行");
                        None
                    }
                }
            }
            _ => None,
        };

        let result = merge_result(&suggestion, enrichment.as_ref());
        info!(
            plant = %result.plant_name,
            confidence = %result.confidence_label,
            "同定完了"
        );
        Ok(result)
    }
}

#[async_trait]
impl Identifier for Pipeline {
    async fn identify(&self, image: DynamicImage) -> Result<PlantResult> {
        self.identify_with_options(image, &self.options).await
    }
}
