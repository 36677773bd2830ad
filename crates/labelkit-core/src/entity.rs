//! Literal entity span matching over free text.
//!
//! Given raw text and a caller-supplied list of entity definitions,
//! locates every occurrence of each entity string and emits
//! de-duplicated [`EntitySpan`]s. Entities are matched as escaped
//! literals (never interpreted as a pattern language),
//! case-insensitively, left to right.
//!
//! The function is pure and referentially transparent; the
//! difference-checked persistence path in [`crate::annotate`] relies on
//! identical inputs producing identical output.
//!
//! # Algorithm
//!
//! 1. Walk definitions in caller-supplied order.
//! 2. For each, scan the text for every non-overlapping occurrence of
//!    the escaped literal, recording character offsets.
//! 3. Append a span for each occurrence not yet seen under its
//!    `(entity, start, end)` key; identical keys are recorded once even
//!    when the same definition is supplied twice.
//! 4. Return spans in discovery order (definitions outer, left-to-right
//!    occurrences inner), not sorted by position across definitions.

use regex::RegexBuilder;
use std::collections::HashSet;

use crate::error::{EngineError, EngineResult};
use crate::models::{EntityDefinition, EntitySpan};

/// Label applied when a definition leaves its label unset.
pub const DEFAULT_LABEL: &str = "UNKNOWN";

/// Background color applied when a definition leaves it unset.
pub const DEFAULT_BACKGROUND_COLOR: &str = "#ffffff";

/// Match every definition against `text` and return de-duplicated
/// spans with 0-indexed, half-open character offsets.
///
/// An empty entity string, or one that matches nowhere, contributes
/// nothing. Overlapping matches from different definitions are all
/// kept; only identical `(entity, start, end)` triples collapse.
pub fn annotate(text: &str, definitions: &[EntityDefinition]) -> EngineResult<Vec<EntitySpan>> {
    let mut spans = Vec::new();
    let mut seen: HashSet<(String, usize, usize)> = HashSet::new();

    for def in definitions {
        if def.entity.is_empty() {
            continue;
        }

        let pattern = RegexBuilder::new(&regex::escape(&def.entity))
            .case_insensitive(true)
            .build()
            .map_err(|e| EngineError::MalformedInput(format!("entity pattern: {}", e)))?;

        for m in pattern.find_iter(text) {
            let start = char_offset(text, m.start());
            let end = start + m.as_str().chars().count();

            let key = (def.entity.clone(), start, end);
            if seen.contains(&key) {
                continue;
            }
            seen.insert(key);

            spans.push(EntitySpan {
                entity: def.entity.clone(),
                label: def
                    .label
                    .clone()
                    .unwrap_or_else(|| DEFAULT_LABEL.to_string()),
                start_pos: start,
                end_pos: end,
                color: def.color.clone(),
                background_color: def
                    .background_color
                    .clone()
                    .unwrap_or_else(|| DEFAULT_BACKGROUND_COLOR.to_string()),
                text_color: def.text_color.clone(),
            });
        }
    }

    Ok(spans)
}

/// Convert a byte index into `text` to a character offset.
fn char_offset(text: &str, byte_index: usize) -> usize {
    text[..byte_index].chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(entity: &str, label: Option<&str>) -> EntityDefinition {
        EntityDefinition {
            entity: entity.to_string(),
            label: label.map(|l| l.to_string()),
            color: "#f00".to_string(),
            background_color: None,
            text_color: "#000".to_string(),
        }
    }

    #[test]
    fn test_every_occurrence_found_once() {
        let text = "Paris is in France. Paris is beautiful.";
        let spans = annotate(text, &[def("Paris", Some("CITY"))]).unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].start_pos, 0);
        assert_eq!(spans[0].end_pos, 5);
        assert_eq!(spans[1].start_pos, 20);
        assert_eq!(spans[1].end_pos, 25);
    }

    #[test]
    fn test_duplicate_definitions_do_not_duplicate_spans() {
        let text = "Paris is in France. Paris is beautiful.";
        let defs = vec![def("Paris", Some("CITY")), def("Paris", Some("CITY"))];
        let spans = annotate(text, &defs).unwrap();
        assert_eq!(spans.len(), 2);
    }

    #[test]
    fn test_case_insensitive_preserves_definition_casing() {
        let spans = annotate("Paris is lovely.", &[def("paris", None)]).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].entity, "paris");
        assert_eq!(spans[0].start_pos, 0);
    }

    #[test]
    fn test_defaults_applied() {
        let spans = annotate("Tesla makes cars.", &[def("Tesla", None)]).unwrap();
        assert_eq!(spans[0].label, "UNKNOWN");
        assert_eq!(spans[0].background_color, "#ffffff");
    }

    #[test]
    fn test_explicit_label_kept() {
        let spans = annotate("Tesla makes cars.", &[def("Tesla", Some("ORG"))]).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].label, "ORG");
        assert_eq!(spans[0].start_pos, 0);
        assert_eq!(spans[0].end_pos, 5);
    }

    #[test]
    fn test_empty_entity_contributes_nothing() {
        let spans = annotate("anything at all", &[def("", Some("X"))]).unwrap();
        assert!(spans.is_empty());
    }

    #[test]
    fn test_no_match_contributes_nothing() {
        let spans = annotate("plain text", &[def("Paris", None)]).unwrap();
        assert!(spans.is_empty());
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let spans = annotate("cost is $5.00 (net)", &[def("$5.00 (net)", None)]).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].start_pos, 8);
        // A dot must not match arbitrary characters.
        let none = annotate("cost is $5x00", &[def("$5.00", None)]).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_overlaps_across_definitions_kept() {
        let text = "New York City";
        let defs = vec![def("New York", Some("GPE")), def("York City", Some("GPE"))];
        let spans = annotate(text, &defs).unwrap();
        assert_eq!(spans.len(), 2);
    }

    #[test]
    fn test_discovery_order_not_position_order() {
        let text = "beta alpha";
        let defs = vec![def("alpha", None), def("beta", None)];
        let spans = annotate(text, &defs).unwrap();
        assert_eq!(spans[0].entity, "alpha");
        assert_eq!(spans[1].entity, "beta");
    }

    #[test]
    fn test_character_offsets_with_multibyte_text() {
        let text = "café — Paris";
        let spans = annotate(text, &[def("Paris", None)]).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].start_pos, 7);
        assert_eq!(spans[0].end_pos, 12);
    }

    #[test]
    fn test_referentially_transparent() {
        let text = "Paris, paris, PARIS";
        let defs = vec![def("paris", Some("CITY"))];
        let a = annotate(text, &defs).unwrap();
        let b = annotate(text, &defs).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 3);
    }
}
