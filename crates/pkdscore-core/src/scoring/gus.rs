//! Revenue growth indicator derived from GUS (BDL) national statistics.
//!
//! BDL variables are named by industry in free Polish text, so each variable
//! is first classified to a PKD section by keyword rules. The indicator is the
//! median year-over-year revenue growth against a 25% benchmark.

use crate::scoring::median;

/// Growth rate that earns a full score.
pub const GROWTH_BENCHMARK: f64 = 0.25;
/// Number of most recent years kept per series.
pub const YEARS_KEPT: usize = 5;
/// Series whose newest observation is older than this are stale.
pub const MIN_LATEST_YEAR: i32 = 2022;

/// Result of classifying a BDL industry label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndustryClass {
    Section(&'static str),
    /// Totals or ownership splits that are not an industry.
    Aggregate,
    Unknown,
}

/// Classify a BDL industry label to a PKD section.
///
/// Rules are checked in order; the first match wins.
#[must_use]
pub fn classify_industry(label: &str) -> IndustryClass {
    let n = label.to_lowercase();
    let has = |k: &str| n.contains(k);

    let section = if has("rolnictwo") || has("łowiectwo") || has("leśnictwo") || has("rybołówstwo")
    {
        "A"
    } else if has("górnictwo") || has("wydobywanie") {
        "B"
    } else if has("przetwórstwo") && has("przemysłowe") {
        "C"
    } else if (has("wytwarzanie") && has("energię")) || has("dostawa pary") || has("klimatyzacja")
    {
        "D"
    } else if has("dostawa wody") || has("gospodarowanie odpadami") || has("rekultywacja") {
        "E"
    } else if has("budownictwo") {
        "F"
    } else if has("handel") || has("naprawa pojazdów") {
        "G"
    } else if has("transport") || has("gospodarka magazynowa") {
        "H"
    } else if has("zakwaterowanie")
        || has("gastronomia")
        || has("usługi gastronomiczne")
        || has("hotele i restauracje")
    {
        "I"
    } else if (has("informacja") && has("komunikacja"))
        || has("telekomunikacja")
        || has("wydawnictwa")
    {
        "J"
    } else if has("finansowa") || has("ubezpieczeniowa") {
        "K"
    } else if has("nieruchomości") {
        "L"
    } else if has("profesjonalna") || has("naukowa") || has("techniczna") {
        "M"
    } else if has("administrowanie") || (has("obsługa") && has("biurowa")) {
        "N"
    } else if has("administracja publiczna")
        || has("obrona")
        || has("zabezpieczenia społeczne")
        || has("obowiązkowe ubezpieczenia")
    {
        "O"
    } else if has("edukacja") || has("oświata") {
        "P"
    } else if has("opieka zdrowotna") || has("pomoc społeczna") {
        "Q"
    } else if has("kultura") || has("rozrywka") || has("sztuka") || has("sport") {
        "R"
    } else if has("pozostała działalność usługowa")
        || has("usługowa komunalna")
        || has("indywidualna")
    {
        "S"
    } else if has("gospodarstwa domowe") {
        "T"
    } else if has("organizacje i zespoły") || has("eksterytorialne") {
        "U"
    } else if has("sektor publiczny") || has("sektor prywatny") || has("ogółem") {
        return IndustryClass::Aggregate;
    } else {
        return IndustryClass::Unknown;
    };

    IndustryClass::Section(section)
}

/// Whether a variable measures a ratio, a dynamics index or a per-entity
/// average rather than total revenue.
#[must_use]
pub fn is_derived_variable(full_name: &str) -> bool {
    let n = full_name.to_lowercase();
    n.contains("wskaźnik") || n.contains("dynamika") || n.contains("na 1 podmiot")
}

/// Pick the industry label of a BDL variable from its `n2`/`n3` name levels.
///
/// `n2` is used unless it is empty or repeats the measure ("przychody"), in
/// which case `n3` is used. Totals ("ogółem") yield `None`.
#[must_use]
pub fn industry_label<'a>(n2: Option<&'a str>, n3: Option<&'a str>) -> Option<&'a str> {
    let label = match n2 {
        Some(n2) if !n2.trim().is_empty() && !n2.to_lowercase().contains("przychody") => Some(n2),
        _ => n3,
    }?;
    if label.to_lowercase().contains("ogółem") {
        None
    } else {
        Some(label)
    }
}

/// One annual observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearValue {
    pub year: i32,
    pub value: f64,
}

/// Sort a series by year and keep the last [`YEARS_KEPT`] observations.
///
/// Returns `None` for an empty series or one whose newest year is before
/// [`MIN_LATEST_YEAR`].
#[must_use]
pub fn recent_window(mut values: Vec<YearValue>) -> Option<Vec<YearValue>> {
    values.sort_by_key(|v| v.year);
    let latest = values.last()?.year;
    if latest < MIN_LATEST_YEAR {
        return None;
    }
    let skip = values.len().saturating_sub(YEARS_KEPT);
    Some(values.split_off(skip))
}

/// Median year-over-year growth of a year-sorted series.
///
/// Zero values are treated as missing; growth is measured between
/// consecutive observations that are present.
#[must_use]
pub fn median_growth(values: &[YearValue]) -> Option<f64> {
    let present: Vec<f64> = values
        .iter()
        .map(|v| v.value)
        .filter(|v| v.is_finite() && *v != 0.0)
        .collect();

    median(present.windows(2).map(|w| (w[1] - w[0]) / w[0]))
}

/// Convert median growth to a `0..=100` score.
///
/// Growth equal to [`GROWTH_BENCHMARK`] scores exactly 100. Missing or
/// negative growth scores 0.
#[must_use]
pub fn growth_score(median_growth: Option<f64>) -> f64 {
    match median_growth {
        Some(g) if g.is_finite() => (g / GROWTH_BENCHMARK * 100.0).clamp(0.0, 100.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(points: &[(i32, f64)]) -> Vec<YearValue> {
        points
            .iter()
            .map(|&(year, value)| YearValue { year, value })
            .collect()
    }

    #[test]
    fn classifies_common_industries() {
        assert_eq!(
            classify_industry("Przetwórstwo przemysłowe"),
            IndustryClass::Section("C")
        );
        assert_eq!(
            classify_industry("Wytwarzanie i zaopatrywanie w energię elektryczną"),
            IndustryClass::Section("D")
        );
        assert_eq!(
            classify_industry("Handel; naprawa pojazdów samochodowych"),
            IndustryClass::Section("G")
        );
        assert_eq!(
            classify_industry("Informacja i komunikacja"),
            IndustryClass::Section("J")
        );
        assert_eq!(
            classify_industry("Działalność finansowa i ubezpieczeniowa"),
            IndustryClass::Section("K")
        );
        assert_eq!(classify_industry("BUDOWNICTWO"), IndustryClass::Section("F"));
    }

    #[test]
    fn rule_order_decides_overlaps() {
        // "transport" contains "sport"; H is checked before R.
        assert_eq!(
            classify_industry("Transport lądowy"),
            IndustryClass::Section("H")
        );
        assert_eq!(
            classify_industry("Działalność związana z obsługą rynku nieruchomości"),
            IndustryClass::Section("L")
        );
    }

    #[test]
    fn aggregates_and_unknowns_are_not_sections() {
        assert_eq!(classify_industry("sektor publiczny"), IndustryClass::Aggregate);
        assert_eq!(classify_industry("Ogółem"), IndustryClass::Aggregate);
        assert_eq!(classify_industry("coś zupełnie innego"), IndustryClass::Unknown);
    }

    #[test]
    fn derived_variables_are_detected() {
        assert!(is_derived_variable("Wskaźnik rentowności obrotu brutto"));
        assert!(is_derived_variable("przychody DYNAMIKA rok do roku"));
        assert!(is_derived_variable("przychody na 1 podmiot"));
        assert!(!is_derived_variable("przychody z całokształtu działalności"));
    }

    #[test]
    fn industry_label_prefers_n2() {
        assert_eq!(
            industry_label(Some("Budownictwo"), Some("ignored")),
            Some("Budownictwo")
        );
    }

    #[test]
    fn industry_label_falls_back_to_n3() {
        assert_eq!(
            industry_label(Some("przychody z całokształtu"), Some("Transport")),
            Some("Transport")
        );
        assert_eq!(industry_label(None, Some("Edukacja")), Some("Edukacja"));
        assert_eq!(industry_label(Some("  "), Some("Edukacja")), Some("Edukacja"));
    }

    #[test]
    fn industry_label_drops_totals() {
        assert_eq!(industry_label(Some("Ogółem"), None), None);
        assert_eq!(industry_label(None, None), None);
    }

    #[test]
    fn recent_window_sorts_and_trims() {
        let values = series(&[
            (2023, 6.0),
            (2017, 0.5),
            (2018, 1.0),
            (2019, 2.0),
            (2020, 3.0),
            (2021, 4.0),
            (2022, 5.0),
        ]);
        let window = recent_window(values).expect("fresh series");
        let years: Vec<i32> = window.iter().map(|v| v.year).collect();
        assert_eq!(years, vec![2019, 2020, 2021, 2022, 2023]);
    }

    #[test]
    fn recent_window_rejects_stale_or_empty_series() {
        assert!(recent_window(series(&[(2019, 1.0), (2021, 2.0)])).is_none());
        assert!(recent_window(Vec::new()).is_none());
    }

    #[test]
    fn median_growth_of_steady_series() {
        let values = series(&[(2021, 100.0), (2022, 125.0), (2023, 156.25)]);
        let g = median_growth(&values).unwrap();
        assert!((g - 0.25).abs() < 1e-12);
    }

    #[test]
    fn median_growth_treats_zero_as_missing() {
        let values = series(&[(2020, 100.0), (2021, 0.0), (2022, 110.0)]);
        let g = median_growth(&values).unwrap();
        assert!((g - 0.10).abs() < 1e-12);
    }

    #[test]
    fn median_growth_needs_two_points() {
        assert!(median_growth(&series(&[(2023, 100.0)])).is_none());
    }

    #[test]
    fn benchmark_growth_scores_hundred() {
        assert_eq!(growth_score(Some(GROWTH_BENCHMARK)), 100.0);
    }

    #[test]
    fn growth_above_benchmark_is_clipped() {
        assert_eq!(growth_score(Some(0.60)), 100.0);
    }

    #[test]
    fn half_benchmark_scores_fifty() {
        assert!((growth_score(Some(0.125)) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn negative_or_missing_growth_scores_zero() {
        assert_eq!(growth_score(Some(-0.10)), 0.0);
        assert_eq!(growth_score(None), 0.0);
        assert_eq!(growth_score(Some(f64::NAN)), 0.0);
    }
}
