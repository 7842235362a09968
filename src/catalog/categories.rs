//! Central category table.
//!
//! Datastream names on the SOOP boxes look like
//! `"tide_measurement * box_gmr_twl-box_0924005"`. The part before the `*`
//! is the category; its normalized form keys this table. The stream resolver
//! and the access policy both read from here, so label, unit and visibility
//! of a category can never disagree.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Delimiter between category and device suffix in datastream names
pub const NAME_DELIMITER: char = '*';

/// Who may see a category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Privileged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryInfo {
    pub label: &'static str,
    pub unit: &'static str,
    pub visibility: Visibility,
}

const fn public(label: &'static str, unit: &'static str) -> CategoryInfo {
    CategoryInfo {
        label,
        unit,
        visibility: Visibility::Public,
    }
}

const fn privileged(label: &'static str, unit: &'static str) -> CategoryInfo {
    CategoryInfo {
        label,
        unit,
        visibility: Visibility::Privileged,
    }
}

const ENTRIES: &[(&str, CategoryInfo)] = &[
    ("battery_voltage", privileged("Batterie-Spannung", "V")),
    ("temperature", public("Temperatur", "°C")),
    (
        "temperature_water",
        public("Wassertemperatur (ca. 30 cm unter der Wasseroberfläche)", "°C"),
    ),
    (
        "wtemp",
        public("Wassertemperatur (ca. 30 cm unter der Wasseroberfläche)", "°C"),
    ),
    (
        "tide_measurement",
        public("Wasserstand (Abweichung vom mittleren Wasserstand)", "cm"),
    ),
    ("water_level", public("Wasserstand", "cm")),
    (
        "standard_deviation",
        privileged("Standardabweichung Wasserstand", "cm"),
    ),
    ("wave_height", public("Wellenhöhe", "cm")),
    ("windspeed", public("Windgeschwindigkeit", "km/h")),
    ("winddirection", public("Windrichtung", "°")),
    ("pressure", public("Luftdruck", "hPa")),
    ("lufttemperatur", public("Lufttemperatur", "°C")),
];

static STANDARD: LazyLock<CategoryTable> =
    LazyLock::new(|| CategoryTable::from_entries(ENTRIES));

/// Lookup from normalized category key to display metadata.
#[derive(Debug, Clone)]
pub struct CategoryTable {
    entries: HashMap<String, CategoryInfo>,
}

impl CategoryTable {
    /// The built-in SOOP table, built on first use.
    #[must_use]
    pub fn standard() -> &'static Self {
        &STANDARD
    }

    #[must_use]
    pub fn from_entries(entries: &[(&str, CategoryInfo)]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|(key, info)| (normalize_key(key), *info))
                .collect(),
        }
    }

    #[must_use]
    pub fn lookup(&self, category: &str) -> Option<&CategoryInfo> {
        self.entries.get(&normalize_key(category))
    }

    /// Display label; unknown categories are shown with a capital first letter.
    #[must_use]
    pub fn label(&self, category: &str) -> String {
        self.lookup(category)
            .map_or_else(|| capitalize(category.trim()), |info| info.label.to_string())
    }

    /// Unit symbol, empty for unknown categories.
    #[must_use]
    pub fn unit(&self, category: &str) -> &'static str {
        self.lookup(category).map_or("", |info| info.unit)
    }

    /// Unknown categories are public.
    #[must_use]
    pub fn visibility(&self, category: &str) -> Visibility {
        self.lookup(category)
            .map_or(Visibility::Public, |info| info.visibility)
    }
}

/// Category part of a datastream name: everything before the first `*`, trimmed.
#[must_use]
pub fn short_name(raw_name: &str) -> &str {
    raw_name
        .split(NAME_DELIMITER)
        .next()
        .unwrap_or(raw_name)
        .trim()
}

/// Lower-case with whitespace folded to `_`, so `"Wave Height"` and
/// `"wave_height"` compare equal.
#[must_use]
pub fn normalize_key(category: &str) -> String {
    category
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .flat_map(char::to_lowercase)
        .collect()
}

/// Latitude/longitude streams carry station position, not measurements.
#[must_use]
pub fn is_positional(category: &str) -> bool {
    let key = normalize_key(category);
    key.starts_with("latitude") || key.starts_with("longitude")
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
