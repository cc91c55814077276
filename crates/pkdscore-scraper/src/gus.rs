//! Client for the GUS Bank Danych Lokalnych (BDL) API.

use pkdscore_core::scoring::gus::{
    classify_industry, industry_label, is_derived_variable, IndustryClass, YearValue,
};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::ScraperError;
use crate::http;

const DEFAULT_BASE_URL: &str = "https://bdl.stat.gov.pl/api/v1/";

/// Name searched for when looking up revenue variables.
pub const REVENUE_VARIABLE_QUERY: &str = "przychody z całokształtu działalności";

const PAGE_SIZE: &str = "100";

/// A BDL variable; `n1`..`n3` are the levels of its descriptive name.
#[derive(Debug, Clone, Deserialize)]
pub struct GusVariable {
    pub id: i64,
    #[serde(default)]
    pub n1: Option<String>,
    #[serde(default)]
    pub n2: Option<String>,
    #[serde(default)]
    pub n3: Option<String>,
}

impl GusVariable {
    #[must_use]
    pub fn full_name(&self) -> String {
        [&self.n1, &self.n2, &self.n3]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The PKD section this variable reports on, or `None` for derived
    /// measures, totals, and unrecognized industries.
    #[must_use]
    pub fn section(&self) -> Option<&'static str> {
        if is_derived_variable(&self.full_name()) {
            return None;
        }
        let label = industry_label(self.n2.as_deref(), self.n3.as_deref())?;
        match classify_industry(label) {
            IndustryClass::Section(code) => Some(code),
            IndustryClass::Aggregate | IndustryClass::Unknown => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ResultsEnvelope<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct UnitSeries {
    #[serde(default)]
    values: Vec<RawValue>,
}

#[derive(Debug, Deserialize)]
struct RawValue {
    year: serde_json::Value,
    val: Option<f64>,
}

impl RawValue {
    fn year(&self) -> Option<i32> {
        match &self.year {
            serde_json::Value::String(s) => s.trim().parse().ok(),
            serde_json::Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
            _ => None,
        }
    }
}

pub struct GusClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl GusClient {
    /// Creates a client pointed at the production BDL API.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(api_key: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ScraperError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for wiremock tests).
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`ScraperError::InvalidBaseUrl`] if `base_url` is invalid.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, ScraperError> {
        Ok(Self {
            client: http::build_client(timeout_secs, user_agent)?,
            api_key: api_key.to_owned(),
            base_url: http::parse_base_url(base_url)?,
        })
    }

    /// Searches variables by name (first 100 matches).
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] on transport failure, a non-2xx status, or an
    /// unparseable body.
    pub async fn search_variables(&self, name: &str) -> Result<Vec<GusVariable>, ScraperError> {
        let mut url = http::join(&self.base_url, "variables/search")?;
        url.query_pairs_mut()
            .append_pair("name", name)
            .append_pair("page-size", PAGE_SIZE);

        let response = http::send(self.get(&url), &url).await?;
        let envelope: ResultsEnvelope<GusVariable> =
            http::decode_json(response, format!("BDL variables/search name={name}")).await?;
        Ok(envelope.results)
    }

    /// National-level (`unit-level=0`) annual series of a variable.
    ///
    /// Observations with no value or an unreadable year are dropped. An
    /// empty result means BDL has no national data for the variable.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] on transport failure, a non-2xx status, or an
    /// unparseable body.
    pub async fn national_series(&self, variable_id: i64) -> Result<Vec<YearValue>, ScraperError> {
        let mut url = http::join(&self.base_url, &format!("data/by-variable/{variable_id}"))?;
        url.query_pairs_mut()
            .append_pair("unit-level", "0")
            .append_pair("page-size", PAGE_SIZE);

        let response = http::send(self.get(&url), &url).await?;
        let envelope: ResultsEnvelope<UnitSeries> =
            http::decode_json(response, format!("BDL data/by-variable/{variable_id}")).await?;

        let series = envelope
            .results
            .into_iter()
            .next()
            .map(|unit| {
                unit.values
                    .into_iter()
                    .filter_map(|v| {
                        Some(YearValue {
                            year: v.year()?,
                            value: v.val?,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(series)
    }

    fn get(&self, url: &Url) -> reqwest::RequestBuilder {
        self.client
            .get(url.clone())
            .header("X-ClientId", &self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
    }
}

/// Variables worth fetching, in search order, paired with their section.
#[must_use]
pub fn candidate_variables(variables: &[GusVariable]) -> Vec<(&'static str, &GusVariable)> {
    variables
        .iter()
        .filter_map(|v| v.section().map(|code| (code, v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(id: i64, n1: &str, n2: &str, n3: &str) -> GusVariable {
        let opt = |s: &str| (!s.is_empty()).then(|| s.to_owned());
        GusVariable {
            id,
            n1: opt(n1),
            n2: opt(n2),
            n3: opt(n3),
        }
    }

    #[test]
    fn full_name_skips_missing_levels() {
        let v = var(1, "przychody", "", "budownictwo");
        assert_eq!(v.full_name(), "przychody budownictwo");
    }

    #[test]
    fn derived_variables_have_no_section() {
        let v = var(1, "wskaźnik rentowności", "budownictwo", "");
        assert_eq!(v.section(), None);
        let v = var(2, "przychody na 1 podmiot", "budownictwo", "");
        assert_eq!(v.section(), None);
    }

    #[test]
    fn measure_in_n2_falls_back_to_n3() {
        let v = var(3, "finanse", "przychody ogółem", "transport i gospodarka magazynowa");
        assert_eq!(v.section(), Some("H"));
    }

    #[test]
    fn totals_are_skipped() {
        let v = var(4, "finanse", "ogółem", "");
        assert_eq!(v.section(), None);
    }

    #[test]
    fn candidates_keep_search_order() {
        let vars = vec![
            var(1, "przychody", "budownictwo", ""),
            var(2, "przychody", "sektor publiczny", ""),
            var(3, "przychody", "handel; naprawa pojazdów", ""),
            var(4, "przychody", "budownictwo", "inne"),
        ];
        let picked: Vec<(&str, i64)> = candidate_variables(&vars)
            .into_iter()
            .map(|(code, v)| (code, v.id))
            .collect();
        assert_eq!(picked, vec![("F", 1), ("G", 3), ("F", 4)]);
    }

    #[test]
    fn raw_year_accepts_string_or_number() {
        let s: RawValue = serde_json::from_str(r#"{"year":"2023","val":1.5}"#).unwrap();
        let n: RawValue = serde_json::from_str(r#"{"year":2022,"val":null}"#).unwrap();
        assert_eq!(s.year(), Some(2023));
        assert_eq!(n.year(), Some(2022));
        assert_eq!(n.val, None);
    }
}
