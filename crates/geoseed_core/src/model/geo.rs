//! Geographic dataset model.
//!
//! # Responsibility
//! - Define the country/region/city shapes read from dataset files.
//! - Validate a dataset before any of it reaches storage.
//!
//! # Invariants
//! - Regions and cities never carry their own country code; the owning
//!   dataset's `country.code` is stamped onto them at insert time.
//! - A city's `region_code`, when set, names a region of the same dataset.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Kind of geographic row kept in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeoKind {
    Country,
    Region,
    City,
}

impl GeoKind {
    /// Order in which storage is probed when checking installation status.
    pub const INSTALL_PROBE_ORDER: [GeoKind; 3] =
        [GeoKind::Country, GeoKind::Region, GeoKind::City];

    /// Backing table name.
    pub fn table(self) -> &'static str {
        match self {
            Self::Country => "countries",
            Self::Region => "regions",
            Self::City => "cities",
        }
    }

    /// Column holding the owning country's code.
    ///
    /// Countries store it as their own `code`.
    pub fn country_code_column(self) -> &'static str {
        match self {
            Self::Country => "code",
            Self::Region | Self::City => "country_code",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Country => "country",
            Self::Region => "region",
            Self::City => "city",
        }
    }
}

/// Country header of a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryRecord {
    /// ISO 3166-1 alpha-2 code, e.g. `MX`.
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub iso3: Option<String>,
}

/// First-level subdivision (state, province, parish...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRecord {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRecord {
    pub name: String,
    #[serde(default)]
    pub region_code: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Seed data for one country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    country: CountryRecord,
    #[serde(default)]
    regions: Vec<RegionRecord>,
    #[serde(default)]
    cities: Vec<CityRecord>,
}

impl Dataset {
    pub fn new(country: CountryRecord, regions: Vec<RegionRecord>, cities: Vec<CityRecord>) -> Self {
        Self {
            country,
            regions,
            cities,
        }
    }

    /// Country header; its `code` is the key used for installation checks.
    pub fn country(&self) -> &CountryRecord {
        &self.country
    }

    pub fn regions(&self) -> &[RegionRecord] {
        &self.regions
    }

    pub fn cities(&self) -> &[CityRecord] {
        &self.cities
    }

    /// Validates structural invariants before seeding.
    ///
    /// Coordinate ranges are left to storage constraints.
    pub fn validate(&self) -> Result<(), DatasetValidationError> {
        if self.country.code.trim().is_empty() {
            return Err(DatasetValidationError::EmptyCountryCode);
        }
        if self.country.name.trim().is_empty() {
            return Err(DatasetValidationError::EmptyCountryName);
        }

        let mut region_codes = BTreeSet::new();
        for region in &self.regions {
            let code = region.code.trim();
            if code.is_empty() {
                return Err(DatasetValidationError::EmptyRegionCode);
            }
            if !region_codes.insert(code) {
                return Err(DatasetValidationError::DuplicateRegionCode(code.to_string()));
            }
        }

        for city in &self.cities {
            if city.name.trim().is_empty() {
                return Err(DatasetValidationError::EmptyCityName);
            }
            if let Some(region_code) = city.region_code.as_deref() {
                if !region_codes.contains(region_code.trim()) {
                    return Err(DatasetValidationError::UnknownRegion {
                        city: city.name.clone(),
                        region_code: region_code.to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Structural problems found in a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetValidationError {
    EmptyCountryCode,
    EmptyCountryName,
    EmptyRegionCode,
    DuplicateRegionCode(String),
    EmptyCityName,
    UnknownRegion { city: String, region_code: String },
}

impl Display for DatasetValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCountryCode => write!(f, "country code cannot be empty"),
            Self::EmptyCountryName => write!(f, "country name cannot be empty"),
            Self::EmptyRegionCode => write!(f, "region code cannot be empty"),
            Self::DuplicateRegionCode(code) => write!(f, "duplicate region code: {code}"),
            Self::EmptyCityName => write!(f, "city name cannot be empty"),
            Self::UnknownRegion { city, region_code } => {
                write!(f, "city `{city}` references unknown region `{region_code}`")
            }
        }
    }
}

impl Error for DatasetValidationError {}
