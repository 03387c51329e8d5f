//! APIレスポンスパーサー
//!
//! plant.id と Wikipedia のレスポンスを型付きの中間構造へ一度だけ
//! デシリアライズし、必要なフィールドを取り出す。
//!
//! 各葉フィールドは型が違っていても欠落扱いになるだけで、
//! 他のフィールドの取り出しには影響しない。

use crate::error::{Error, Result};
use crate::types::{EnrichmentRecord, RawResponse, Suggestion};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// 型が合わない値を None として読み飛ばす
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

// =============================================
// plant.id: result.classification.suggestions[]
// =============================================

#[derive(Deserialize)]
struct ResultBody {
    #[serde(default, deserialize_with = "lenient")]
    classification: Option<Classification>,
}

#[derive(Deserialize)]
struct Classification {
    #[serde(default, deserialize_with = "lenient")]
    suggestions: Option<Vec<RawSuggestion>>,
}

#[derive(Deserialize)]
struct RawSuggestion {
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    probability: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    details: Option<RawDetails>,
}

#[derive(Deserialize)]
struct RawDetails {
    #[serde(default, deserialize_with = "lenient")]
    common_names: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    description: Option<RawDescription>,
}

#[derive(Deserialize)]
struct RawDescription {
    #[serde(default, deserialize_with = "lenient")]
    value: Option<String>,
}

impl From<RawSuggestion> for Suggestion {
    fn from(raw: RawSuggestion) -> Self {
        let (common_names, description) = match raw.details {
            Some(details) => (
                details.common_names.unwrap_or_default(),
                details.description.and_then(|d| d.value),
            ),
            None => (Vec::new(), None),
        };

        Suggestion {
            species_name: raw.name,
            probability: raw.probability,
            common_names,
            description,
        }
    }
}

/// レスポンス本文をJSONオブジェクトとしてデコード
///
/// # Returns
/// * `Ok(RawResponse)` - トップレベルがオブジェクト
/// * `Err` - JSONでない、またはオブジェクトでない
pub fn decode_raw_response(body: &[u8]) -> Result<RawResponse> {
    match serde_json::from_slice::<Value>(body)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::Parse(format!(
            "トップレベルがオブジェクトではありません: {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// 先頭の候補を取り出す
///
/// 候補の並びはサービス側の順位をそのまま採用し、ローカルで並べ替えない。
/// 後続候補の確率が高くても先頭のみを使う。
///
/// # Returns
/// * `Some(Suggestion)` - 候補あり
/// * `None` - パスが存在しない、形式不正、または候補が空
///
/// # Examples
/// ```
/// use plant_id_common::{decode_raw_response, parse_suggestion};
///
/// let raw = decode_raw_response(br#"{"result":{"classification":{"suggestions":[
///     {"name":"Ficus benjamina","probability":0.87}
/// ]}}}"#).unwrap();
/// let suggestion = parse_suggestion(&raw).unwrap();
/// assert_eq!(suggestion.species_name.as_deref(), Some("Ficus benjamina"));
/// ```
pub fn parse_suggestion(raw: &RawResponse) -> Option<Suggestion> {
    let result = ResultBody::deserialize(raw.get("result")?).ok()?;
    let suggestions = result.classification?.suggestions?;
    suggestions.into_iter().next().map(Suggestion::from)
}

/// 確率を表示用ラベルに整形（×100、小数1桁）
pub fn format_confidence(probability: f64) -> String {
    format!("Confidence: {:.1}%", probability * 100.0)
}

// =============================================
// Wikipedia: query.pages.<pageId>.extract
// =============================================

#[derive(Deserialize)]
struct WikiEnvelope {
    #[serde(default, deserialize_with = "lenient")]
    query: Option<WikiQuery>,
}

#[derive(Deserialize)]
struct WikiQuery {
    #[serde(default, deserialize_with = "lenient")]
    pages: Option<serde_json::Map<String, Value>>,
}

#[derive(Deserialize)]
struct WikiPage {
    #[serde(default, deserialize_with = "lenient")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    extract: Option<String>,
}

/// Wikipedia のクエリ結果から最初に本文を持つページを取り出す
///
/// 一般名にはページタイトルを使い、無ければ検索した名前を使う。
/// 該当ページが無い（`missing` ページのみ等）場合は None。
pub fn parse_enrichment(body: &Value, queried_name: &str) -> Option<EnrichmentRecord> {
    let envelope = WikiEnvelope::deserialize(body).ok()?;
    let pages = envelope.query?.pages?;

    pages.values().find_map(|page| {
        let page = WikiPage::deserialize(page).ok()?;
        let extract = page.extract.filter(|e| !e.trim().is_empty())?;
        Some(EnrichmentRecord {
            common_name: page.title.unwrap_or_else(|| queried_name.to_string()),
            description: extract,
        })
    })
}
