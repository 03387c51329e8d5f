//! 先頭候補と補完結果のマージ

use crate::parser::format_confidence;
use crate::types::{EnrichmentRecord, PlantResult, Suggestion};

/// 先頭候補と補完結果から最終結果を組み立てる
///
/// 補完結果は候補側で欠落しているフィールドのみを埋める。
pub fn merge_result(suggestion: &Suggestion, enrichment: Option<&EnrichmentRecord>) -> PlantResult {
    let common_name = match suggestion.common_name() {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => enrichment.map(|e| e.common_name.clone()).unwrap_or_default(),
    };

    let description = if suggestion.has_description() {
        suggestion.description.clone().unwrap_or_default()
    } else {
        enrichment.map(|e| e.description.clone()).unwrap_or_default()
    };

    PlantResult {
        plant_name: suggestion.species_name.clone().unwrap_or_default(),
        common_name,
        confidence_label: suggestion
            .probability
            .map(format_confidence)
            .unwrap_or_default(),
        description,
    }
}
