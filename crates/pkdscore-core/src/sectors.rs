//! The PKD 2007 section catalogue and the division-to-section mapping.
//!
//! Sections are single uppercase letters `A`..`U`. Registry data (CEIDG)
//! reports two-digit divisions (`"62"`), which roll up into sections through
//! [`section_for_division`].

use serde::Serialize;

/// One PKD section as seeded into the `pkd` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Section {
    pub code: &'static str,
    pub name: &'static str,
    /// Short display label used in market reports.
    pub short_name: &'static str,
}

pub const SECTIONS: &[Section] = &[
    Section {
        code: "A",
        name: "Rolnictwo, leśnictwo, łowiectwo i rybactwo",
        short_name: "Rolnictwo",
    },
    Section {
        code: "B",
        name: "Górnictwo i wydobywanie",
        short_name: "Górnictwo",
    },
    Section {
        code: "C",
        name: "Przetwórstwo przemysłowe",
        short_name: "Przetwórstwo",
    },
    Section {
        code: "D",
        name: "Wytwarzanie i zaopatrywanie w energię elektryczną, gaz, parę wodną i gorącą wodę",
        short_name: "Energetyka",
    },
    Section {
        code: "E",
        name: "Dostawa wody; gospodarowanie ściekami i odpadami oraz działalność związana z rekultywacją",
        short_name: "Gospodarka wodna",
    },
    Section {
        code: "F",
        name: "Budownictwo",
        short_name: "Budownictwo",
    },
    Section {
        code: "G",
        name: "Handel hurtowy i detaliczny; naprawa pojazdów samochodowych, włączając motocykle",
        short_name: "Handel",
    },
    Section {
        code: "H",
        name: "Transport i gospodarka magazynowa",
        short_name: "Transport",
    },
    Section {
        code: "I",
        name: "Działalność związana z zakwaterowaniem i usługami gastronomicznymi",
        short_name: "Gastronomia",
    },
    Section {
        code: "J",
        name: "Informacja i komunikacja",
        short_name: "IT i Media",
    },
    Section {
        code: "K",
        name: "Działalność finansowa i ubezpieczeniowa",
        short_name: "Finanse",
    },
    Section {
        code: "L",
        name: "Działalność związana z obsługą rynku nieruchomości",
        short_name: "Nieruchomości",
    },
    Section {
        code: "M",
        name: "Działalność profesjonalna, naukowa i techniczna",
        short_name: "Nauka",
    },
    Section {
        code: "N",
        name: "Działalność w zakresie usług administrowania i działalność wspierająca",
        short_name: "Administrowanie",
    },
    Section {
        code: "O",
        name: "Administracja publiczna i obrona narodowa; obowiązkowe zabezpieczenia społeczne",
        short_name: "Administracja",
    },
    Section {
        code: "P",
        name: "Edukacja",
        short_name: "Edukacja",
    },
    Section {
        code: "Q",
        name: "Opieka zdrowotna i pomoc społeczna",
        short_name: "Opieka Zdrowotna",
    },
    Section {
        code: "R",
        name: "Działalność związana z kulturą, rozrywką i rekreacją",
        short_name: "Kultura",
    },
    Section {
        code: "S",
        name: "Pozostała działalność usługowa",
        short_name: "Usługi",
    },
    Section {
        code: "T",
        name: "Gospodarstwa domowe zatrudniające pracowników; gospodarstwa domowe produkujące wyroby i świadczące usługi na własne potrzeby",
        short_name: "Gosp. domowe",
    },
    Section {
        code: "U",
        name: "Organizacje i zespoły eksterytorialne",
        short_name: "Eksterytorialne",
    },
];

/// Inclusive division ranges per section.
const DIVISIONS: &[(u8, u8, &str)] = &[
    (1, 3, "A"),
    (5, 9, "B"),
    (10, 33, "C"),
    (35, 35, "D"),
    (36, 39, "E"),
    (41, 43, "F"),
    (45, 47, "G"),
    (49, 53, "H"),
    (55, 56, "I"),
    (58, 63, "J"),
    (64, 66, "K"),
    (68, 68, "L"),
    (69, 75, "M"),
    (77, 82, "N"),
    (84, 84, "O"),
    (85, 85, "P"),
    (86, 88, "Q"),
    (90, 93, "R"),
    (94, 96, "S"),
    (97, 98, "T"),
    (99, 99, "U"),
];

/// Trim and upper-case a sector code taken from user input.
#[must_use]
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Look up a section by its (already normalized) letter code.
#[must_use]
pub fn section(code: &str) -> Option<&'static Section> {
    SECTIONS.iter().find(|s| s.code == code)
}

/// Map a two-digit PKD division to its section letter.
///
/// Returns `None` for numbers that fall into gaps of the classification
/// (`04`, `34`, `40`, ...).
#[must_use]
pub fn section_for_division(division: u8) -> Option<&'static str> {
    DIVISIONS
        .iter()
        .find(|(lo, hi, _)| (*lo..=*hi).contains(&division))
        .map(|(_, _, code)| *code)
}

/// Parse the leading division digits of a PKD code such as `"62.01.Z"` or
/// `"62"` and map them to a section.
#[must_use]
pub fn section_for_pkd_code(raw: &str) -> Option<&'static str> {
    let digits: String = raw.trim().chars().take(2).collect();
    if digits.len() != 2 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u8>().ok().and_then(section_for_division)
}
