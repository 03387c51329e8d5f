//! Wikipedia による説明の補完
//!
//! 同定結果に説明が無い場合のみ使う。失敗しても同定結果自体は有効。

use crate::client::check_http_url;
use crate::config::Config;
use crate::error::{LookupError, PlantIdError, RequestCause, Result};
use plant_id_common::{parse_enrichment, EnrichmentRecord};
use tracing::debug;
use url::Url;

#[derive(Debug, Clone)]
pub struct EnrichmentLookup {
    http: reqwest::Client,
    endpoint: String,
}

impl EnrichmentLookup {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| PlantIdError::Config(format!("HTTPクライアント初期化エラー: {}", e)))?;

        Ok(Self {
            http,
            endpoint: config.enrichment_url.clone(),
        })
    }

    /// 学名をタイトルとして検索するURL
    pub fn lookup_url(&self, species_name: &str) -> std::result::Result<Url, LookupError> {
        let url = format!(
            "{}?action=query&format=json&prop=extracts&exintro=true&explaintext=true&titles={}",
            self.endpoint,
            urlencoding::encode(species_name)
        );
        let url = Url::parse(&url).map_err(|e| LookupError::InvalidUrl(format!("{}: {}", url, e)))?;
        check_http_url(&url).map_err(LookupError::InvalidUrl)?;
        Ok(url)
    }

    /// 学名で要約を1回だけ取得する
    pub async fn lookup(&self, species_name: &str) -> std::result::Result<EnrichmentRecord, LookupError> {
        let url = self.lookup_url(species_name)?;
        debug!(url = %url, "補完ルックアップ送信");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| LookupError::RequestFailed(RequestCause::from(e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::InvalidResponse(format!("HTTP {}", status)));
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            if e.is_decode() {
                LookupError::InvalidResponse(e.to_string())
            } else {
                LookupError::RequestFailed(e.into())
            }
        })?;

        parse_enrichment(&body, species_name)
            .ok_or_else(|| LookupError::NotFound(species_name.to_string()))
    }
}
