//! Plant ID Common Library
//!
//! 同定パイプラインと表示層で共有される型と、ネットワークを伴わない
//! レスポンス解析

pub mod error;
pub mod merge;
pub mod parser;
pub mod types;

pub use error::{Error, Result};
pub use merge::merge_result;
pub use parser::{decode_raw_response, format_confidence, parse_enrichment, parse_suggestion};
pub use types::{
    EnrichmentRecord, HealthMode, IdentificationOptions, PlantResult, RawResponse, RequestShape,
    Suggestion,
};
