//! plant.id 同定API クライアント
//!
//! 1画像を1回だけPOSTし、HTTPレベルの結果を型付きのエラーへ写像する。
//! リトライは行わない。

use crate::config::Config;
use crate::encoder::EncodedImage;
use crate::error::{PlantIdError, RequestCause, RequestError, Result};
use plant_id_common::{decode_raw_response, IdentificationOptions, RawResponse, RequestShape};
use reqwest::StatusCode;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

/// 同定リクエスト本文
#[derive(Debug, Serialize)]
pub struct IdentificationRequest<'a> {
    images: [&'a str; 1],
    similar_images: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    health: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    longitude: Option<f64>,
}

impl<'a> IdentificationRequest<'a> {
    /// 形式に応じて座標か健康フラグのどちらか一方だけを載せる
    pub fn new(image: &'a EncodedImage, options: &IdentificationOptions) -> Self {
        let (health, latitude, longitude) = match options.shape {
            RequestShape::Coordinates => (None, options.latitude, options.longitude),
            RequestShape::Health => (Some(options.health.as_str()), None, None),
        };

        Self {
            images: [image.base64()],
            similar_images: options.similar_images,
            health,
            latitude,
            longitude,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IdentificationClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    details: Vec<String>,
    language: Option<String>,
}

impl IdentificationClient {
    pub fn new(config: &Config, api_key: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| PlantIdError::Config(format!("HTTPクライアント初期化エラー: {}", e)))?;

        Ok(Self {
            http,
            endpoint: config.identification_url.clone(),
            api_key,
            details: config.details.clone(),
            language: config.language.clone(),
        })
    }

    /// クエリパラメータ付きのエンドポイントURL
    pub fn endpoint_url(&self) -> std::result::Result<Url, RequestError> {
        let mut url = Url::parse(&self.endpoint)
            .map_err(|e| RequestError::InvalidUrl(format!("{}: {}", self.endpoint, e)))?;
        check_http_url(&url).map_err(RequestError::InvalidUrl)?;

        if !self.details.is_empty() || self.language.is_some() {
            let mut query = url.query_pairs_mut();
            if !self.details.is_empty() {
                query.append_pair("details", &self.details.join(","));
            }
            if let Some(language) = &self.language {
                query.append_pair("language", language);
            }
        }

        Ok(url)
    }

    /// 画像を送信して生レスポンスを返す
    pub async fn identify(
        &self,
        image: &EncodedImage,
        options: &IdentificationOptions,
    ) -> std::result::Result<RawResponse, RequestError> {
        let url = self.endpoint_url()?;
        let body = IdentificationRequest::new(image, options);

        debug!(
            url = %url,
            image_bytes = image.len(),
            shape = ?options.shape,
            "同定リクエスト送信"
        );

        let response = self
            .http
            .post(url)
            .header("Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| RequestError::RequestFailed(e.into()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| RequestError::RequestFailed(RequestCause::from(e)))?;

        debug!(status = status.as_u16(), body_bytes = bytes.len(), "同定レスポンス受信");

        map_response(status, &bytes)
    }
}

/// http/https でホストを持つURLだけを受け付ける
pub(crate) fn check_http_url(url: &Url) -> std::result::Result<(), String> {
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(()),
        scheme => Err(format!("{}: 非対応のスキーム {}", url, scheme)),
    }
}

/// ステータスと本文から結果を判定
fn map_response(status: StatusCode, body: &[u8]) -> std::result::Result<RawResponse, RequestError> {
    if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
        let reason = status.canonical_reason().unwrap_or("Unknown").to_string();
        let body = String::from_utf8_lossy(body).into_owned();
        warn!(status = status.as_u16(), %reason, %body, "同定APIがリクエストを拒否");
        return Err(RequestError::HttpResponse {
            status: status.as_u16(),
            reason,
            body,
        });
    }

    if !status.is_success() {
        return Err(RequestError::InvalidResponse(format!("HTTP {}", status)));
    }

    decode_raw_response(body).map_err(|e| RequestError::InvalidResponse(e.to_string()))
}
