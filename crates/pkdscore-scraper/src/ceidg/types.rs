use chrono::NaiveDate;
use pkdscore_core::scoring::ceidg::FirmLifespan;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FirmSearchPage {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub firmy: Vec<FirmRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FirmRef {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FirmDetailResponse {
    #[serde(default)]
    pub firma: Vec<FirmDetail>,
}

/// One firm as returned by the `firma/{id}` endpoint. Only the fields that
/// end up in the CSV export are kept.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FirmDetail {
    pub id: Option<String>,
    pub nazwa: Option<String>,
    pub data_rozpoczecia: Option<String>,
    pub data_zakonczenia: Option<String>,
    pub status: Option<String>,
    pub wlasciciel: Option<Owner>,
    pub adres_dzialalnosci: Option<Address>,
    pub pkd_glowny: Option<Pkd>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Owner {
    pub imie: Option<String>,
    pub nazwisko: Option<String>,
    pub nip: Option<String>,
    pub regon: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Address {
    pub ulica: Option<String>,
    pub miasto: Option<String>,
    pub powiat: Option<String>,
    pub wojewodztwo: Option<String>,
    pub kod: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Pkd {
    pub kod: Option<String>,
    pub nazwa: Option<String>,
}

/// Flattened firm, one row of a `firmy_*.csv` export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmRecord {
    pub id: String,
    pub nazwa: String,
    #[serde(rename = "dataRozpoczecia")]
    pub data_rozpoczecia: String,
    #[serde(rename = "dataZakonczenia")]
    pub data_zakonczenia: String,
    pub status: String,
    pub imie_wlasciciel: String,
    pub nazwisko_wlasciciel: String,
    pub nip: String,
    pub regon: String,
    pub ulica_dzialalnosc: String,
    pub miasto_dzialalnosc: String,
    pub powiat_dzialalnosc: String,
    pub wojewodztwo_dzialalnosc: String,
    pub kod_dzialalnosc: String,
    /// Two-digit PKD division of the main activity.
    pub kod_pkd_glowny: String,
    pub nazwa_pkd_glowny: String,
}

impl From<FirmDetail> for FirmRecord {
    fn from(detail: FirmDetail) -> Self {
        let owner = detail.wlasciciel.unwrap_or_default();
        let address = detail.adres_dzialalnosci.unwrap_or_default();
        let pkd = detail.pkd_glowny.unwrap_or_default();
        let division: String = pkd
            .kod
            .unwrap_or_default()
            .chars()
            .take(2)
            .collect();

        Self {
            id: detail.id.unwrap_or_default(),
            nazwa: detail.nazwa.unwrap_or_default(),
            data_rozpoczecia: detail.data_rozpoczecia.unwrap_or_default(),
            data_zakonczenia: detail.data_zakonczenia.unwrap_or_default(),
            status: detail.status.unwrap_or_default(),
            imie_wlasciciel: owner.imie.unwrap_or_default(),
            nazwisko_wlasciciel: owner.nazwisko.unwrap_or_default(),
            nip: owner.nip.unwrap_or_default(),
            regon: owner.regon.unwrap_or_default(),
            ulica_dzialalnosc: address.ulica.unwrap_or_default(),
            miasto_dzialalnosc: address.miasto.unwrap_or_default(),
            powiat_dzialalnosc: address.powiat.unwrap_or_default(),
            wojewodztwo_dzialalnosc: address.wojewodztwo.unwrap_or_default(),
            kod_dzialalnosc: address.kod.unwrap_or_default(),
            kod_pkd_glowny: division,
            nazwa_pkd_glowny: pkd.nazwa.unwrap_or_default(),
        }
    }
}

impl FirmRecord {
    /// The fields the longevity score needs. Unparseable dates become `None`.
    #[must_use]
    pub fn lifespan(&self) -> FirmLifespan {
        FirmLifespan {
            pkd_division: self.kod_pkd_glowny.trim().to_owned(),
            started: parse_date(&self.data_rozpoczecia),
            ended: parse_date(&self.data_zakonczenia),
            status: self.status.trim().to_uppercase(),
        }
    }
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time part.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let date = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}
