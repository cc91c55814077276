//! Combines the per-source sector scores into one value per PKD section.
//!
//! The four sources use different scales (market and GUS are `0..=100`,
//! CEIDG is batch-relative, social is a raw emotion mean) and are averaged
//! without weights. Only the sources that have data for a sector take part,
//! and a sector with no source at all is never produced.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

/// Display name used when neither the market report nor the registry names
/// a sector.
pub const UNKNOWN_SECTOR_NAME: &str = "unknown";

/// A per-sector value read from one source table.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceValue {
    pub code: String,
    pub value: f64,
}

impl SourceValue {
    #[must_use]
    pub fn new(code: impl Into<String>, value: f64) -> Self {
        Self {
            code: code.into(),
            value,
        }
    }
}

/// Market score of one section of the latest report.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketValue {
    pub code: String,
    pub name: String,
    pub safety_score: i32,
}

/// Snapshot of every source table, as read for one blend.
#[derive(Debug, Clone, Default)]
pub struct BlendInputs {
    pub market: Vec<MarketValue>,
    pub gus: Vec<SourceValue>,
    pub ceidg: Vec<SourceValue>,
    pub youtube: Vec<SourceValue>,
    pub wykop: Vec<SourceValue>,
    /// Section names from the `pkd` registry.
    pub registry_names: HashMap<String, String>,
}

/// The sources present for one sector.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SourceScores {
    pub market: Option<i32>,
    pub gus: Option<f64>,
    pub ceidg: Option<f64>,
    pub social: Option<f64>,
}

impl SourceScores {
    fn present(&self) -> impl Iterator<Item = f64> {
        [
            self.market.map(f64::from),
            self.gus,
            self.ceidg,
            self.social,
        ]
        .into_iter()
        .flatten()
    }

    /// Unweighted mean of the present sources, `0.0` when none are present.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn combined(&self) -> f64 {
        let (sum, count) = self
            .present()
            .fold((0.0, 0_usize), |(sum, count), v| (sum + v, count + 1));
        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    }
}

/// Blended result for one sector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlendedScore {
    pub section_code: String,
    pub section_name: String,
    pub final_score: f64,
    pub market_score: Option<i32>,
    pub gus_score: Option<f64>,
    pub ceidg_score: Option<f64>,
    pub social_score: Option<f64>,
}

/// Mean across platforms that have data; `None` when none do.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn merge_platforms(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        None
    } else {
        Some(present.iter().sum::<f64>() / present.len() as f64)
    }
}

/// Blend every sector present in at least one source.
///
/// The result is sorted by `final_score` descending, ties broken by code.
#[must_use]
pub fn blend(inputs: &BlendInputs) -> Vec<BlendedScore> {
    let mut scores: BTreeMap<&str, SourceScores> = BTreeMap::new();
    let mut market_names: HashMap<&str, &str> = HashMap::new();

    for m in &inputs.market {
        scores.entry(&m.code).or_default().market = Some(m.safety_score);
        market_names.insert(&m.code, &m.name);
    }
    for g in &inputs.gus {
        scores.entry(&g.code).or_default().gus = Some(g.value);
    }
    for c in &inputs.ceidg {
        scores.entry(&c.code).or_default().ceidg = Some(c.value);
    }

    let youtube = by_code(&inputs.youtube);
    let wykop = by_code(&inputs.wykop);
    for code in youtube.keys().chain(wykop.keys()) {
        let social = merge_platforms(&[youtube.get(code).copied(), wykop.get(code).copied()]);
        scores.entry(code).or_default().social = social;
    }

    let mut blended: Vec<BlendedScore> = scores
        .into_iter()
        .map(|(code, sources)| {
            let section_name = market_names
                .get(code)
                .map(|name| (*name).to_string())
                .or_else(|| inputs.registry_names.get(code).cloned())
                .unwrap_or_else(|| UNKNOWN_SECTOR_NAME.to_string());

            BlendedScore {
                section_code: code.to_string(),
                section_name,
                final_score: sources.combined(),
                market_score: sources.market,
                gus_score: sources.gus,
                ceidg_score: sources.ceidg,
                social_score: sources.social,
            }
        })
        .collect();

    blended.sort_by(|a, b| {
        b.final_score
            .total_cmp(&a.final_score)
            .then_with(|| a.section_code.cmp(&b.section_code))
    });
    blended
}

/// Blend and pick a single sector.
#[must_use]
pub fn blend_one(inputs: &BlendInputs, code: &str) -> Option<BlendedScore> {
    blend(inputs).into_iter().find(|s| s.section_code == code)
}

fn by_code(values: &[SourceValue]) -> HashMap<&str, f64> {
    values.iter().map(|v| (v.code.as_str(), v.value)).collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn market(code: &str, name: &str, score: i32) -> MarketValue {
        MarketValue {
            code: code.to_string(),
            name: name.to_string(),
            safety_score: score,
        }
    }

    #[test]
    fn result_is_exactly_the_union_of_source_codes() {
        let inputs = BlendInputs {
            market: vec![market("K", "Finanse", 70)],
            gus: vec![SourceValue::new("K", 50.0), SourceValue::new("C", 20.0)],
            ceidg: vec![SourceValue::new("J", 80.0)],
            youtube: vec![SourceValue::new("D", 55.0)],
            wykop: vec![SourceValue::new("H", 40.0)],
            registry_names: HashMap::new(),
        };

        let codes: HashSet<String> = blend(&inputs)
            .into_iter()
            .map(|s| s.section_code)
            .collect();
        let expected: HashSet<String> = ["K", "C", "J", "D", "H"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(codes, expected);
    }

    #[test]
    fn single_source_is_returned_unchanged() {
        let inputs = BlendInputs {
            ceidg: vec![SourceValue::new("J", 33.333_333)],
            ..Default::default()
        };
        let result = blend(&inputs);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].final_score, 33.333_333);
    }

    #[test]
    fn two_sources_average() {
        let inputs = BlendInputs {
            market: vec![market("K", "Finanse", 70)],
            gus: vec![SourceValue::new("K", 50.0)],
            ..Default::default()
        };
        let k = blend_one(&inputs, "K").expect("K present");
        assert!((k.final_score - 60.0).abs() < 0.01);
        assert_eq!(k.market_score, Some(70));
        assert_eq!(k.gus_score, Some(50.0));
        assert_eq!(k.ceidg_score, None);
        assert_eq!(k.social_score, None);
    }

    #[test]
    fn four_sources_average() {
        let inputs = BlendInputs {
            market: vec![market("G", "Handel", 40)],
            gus: vec![SourceValue::new("G", 60.0)],
            ceidg: vec![SourceValue::new("G", 80.0)],
            youtube: vec![SourceValue::new("G", 20.0)],
            ..Default::default()
        };
        let g = blend_one(&inputs, "G").unwrap();
        assert!((g.final_score - 50.0).abs() < 1e-9);
    }

    #[test]
    fn social_merges_platforms_before_blending() {
        let inputs = BlendInputs {
            gus: vec![SourceValue::new("D", 90.0)],
            youtube: vec![SourceValue::new("D", 40.0)],
            wykop: vec![SourceValue::new("D", 60.0)],
            ..Default::default()
        };
        let d = blend_one(&inputs, "D").unwrap();
        assert_eq!(d.social_score, Some(50.0));
        // (90 + 50) / 2, not (90 + 40 + 60) / 3
        assert!((d.final_score - 70.0).abs() < 1e-9);
    }

    #[test]
    fn name_priority_market_then_registry_then_unknown() {
        let mut registry_names = HashMap::new();
        registry_names.insert("K".to_string(), "Działalność finansowa".to_string());
        registry_names.insert("C".to_string(), "Przetwórstwo przemysłowe".to_string());

        let inputs = BlendInputs {
            market: vec![market("K", "Finanse", 70)],
            gus: vec![SourceValue::new("C", 20.0), SourceValue::new("X", 5.0)],
            registry_names,
            ..Default::default()
        };
        let result = blend(&inputs);
        let name_of = |code: &str| {
            result
                .iter()
                .find(|s| s.section_code == code)
                .map(|s| s.section_name.clone())
        };
        assert_eq!(name_of("K").as_deref(), Some("Finanse"));
        assert_eq!(name_of("C").as_deref(), Some("Przetwórstwo przemysłowe"));
        assert_eq!(name_of("X").as_deref(), Some(UNKNOWN_SECTOR_NAME));
    }

    #[test]
    fn sorted_by_score_descending_then_code() {
        let inputs = BlendInputs {
            gus: vec![
                SourceValue::new("B", 10.0),
                SourceValue::new("A", 50.0),
                SourceValue::new("C", 50.0),
            ],
            ..Default::default()
        };
        let codes: Vec<String> = blend(&inputs).into_iter().map(|s| s.section_code).collect();
        assert_eq!(codes, vec!["A", "C", "B"]);
    }

    #[test]
    fn no_sources_yields_zero_combined() {
        assert_eq!(SourceScores::default().combined(), 0.0);
    }

    #[test]
    fn empty_inputs_blend_to_nothing() {
        assert!(blend(&BlendInputs::default()).is_empty());
    }

    #[test]
    fn merge_platforms_ignores_missing() {
        assert_eq!(merge_platforms(&[None, None]), None);
        assert_eq!(merge_platforms(&[Some(30.0), None]), Some(30.0));
        assert_eq!(merge_platforms(&[Some(30.0), Some(50.0)]), Some(40.0));
    }

    #[test]
    fn blended_score_serializes_missing_sources_as_null() {
        let inputs = BlendInputs {
            market: vec![market("K", "Finanse", 70)],
            gus: vec![SourceValue::new("K", 50.0)],
            ..Default::default()
        };
        let json = serde_json::to_value(blend_one(&inputs, "K").unwrap()).unwrap();
        assert_eq!(json["final_score"], 60.0);
        assert_eq!(json["market_score"], 70);
        assert!(json["ceidg_score"].is_null());
        assert!(json["social_score"].is_null());
    }
}
