//! Per-population parameter tables.
//!
//! Every table is optional at the serde level; which entries are actually
//! required depends on the energy terms selected for a run, and is checked
//! when the engine resolves the tables.

use super::region::Region;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A lambda multiplier plus optional per-region multipliers.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct LambdaParameters {
    #[serde(default)]
    pub lambda: Option<f64>,
    #[serde(default)]
    pub regions: BTreeMap<Region, f64>,
}

impl LambdaParameters {
    #[must_use]
    pub fn new(lambda: f64) -> Self {
        Self {
            lambda: Some(lambda),
            regions: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_region(mut self, region: Region, lambda: f64) -> Self {
        self.regions.insert(region, lambda);
        self
    }
}

/// Adhesion coefficients toward medium, other populations and other regions.
///
/// `populations` is keyed by population name. `regions[a][b]` is the
/// coefficient of region `a` toward region `b` within one cell.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct AdhesionParameters {
    #[serde(default)]
    pub medium: Option<f64>,
    #[serde(default)]
    pub populations: BTreeMap<String, f64>,
    #[serde(default)]
    pub regions: BTreeMap<Region, BTreeMap<Region, f64>>,
}

impl AdhesionParameters {
    #[must_use]
    pub fn new(medium: f64) -> Self {
        Self {
            medium: Some(medium),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_population(mut self, name: &str, value: f64) -> Self {
        self.populations.insert(name.to_string(), value);
        self
    }

    #[must_use]
    pub fn with_region(mut self, from: Region, to: Region, value: f64) -> Self {
        self.regions.entry(from).or_default().insert(to, value);
        self
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct PersistenceParameters {
    #[serde(default)]
    pub lambda: Option<f64>,
    /// Fraction of the latest displacement blended into the direction vector.
    #[serde(default)]
    pub decay: Option<f64>,
    #[serde(default)]
    pub regions: BTreeMap<Region, f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct SubstrateParameters {
    #[serde(default)]
    pub adhesion: Option<f64>,
}

/// Parameters shared by every cell of one population.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PopulationParameters {
    pub name: String,
    /// Population code; 0 is reserved for medium.
    pub code: u32,
    /// Declared sub-regions. `default` is implied when any are present.
    #[serde(default)]
    pub regions: Vec<Region>,
    #[serde(default)]
    pub critical_height: Option<f64>,
    #[serde(default)]
    pub critical_region_heights: BTreeMap<Region, f64>,
    #[serde(default)]
    pub adhesion: AdhesionParameters,
    #[serde(default)]
    pub volume: LambdaParameters,
    #[serde(default)]
    pub surface: LambdaParameters,
    #[serde(default)]
    pub height: LambdaParameters,
    #[serde(default)]
    pub persistence: PersistenceParameters,
    #[serde(default)]
    pub junction: LambdaParameters,
    #[serde(default)]
    pub substrate: SubstrateParameters,
}

impl PopulationParameters {
    #[must_use]
    pub fn new(name: &str, code: u32) -> Self {
        Self {
            name: name.to_string(),
            code,
            regions: Vec::new(),
            critical_height: None,
            critical_region_heights: BTreeMap::new(),
            adhesion: AdhesionParameters::default(),
            volume: LambdaParameters::default(),
            surface: LambdaParameters::default(),
            height: LambdaParameters::default(),
            persistence: PersistenceParameters::default(),
            junction: LambdaParameters::default(),
            substrate: SubstrateParameters::default(),
        }
    }

    #[must_use]
    pub fn has_regions(&self) -> bool {
        self.regions.iter().any(|r| *r != Region::Undefined)
    }

    /// All regions a cell of this population can hold, `Default` first.
    ///
    /// Empty when the population declares no regions.
    #[must_use]
    pub fn declared_regions(&self) -> Vec<Region> {
        if !self.has_regions() {
            return Vec::new();
        }
        let mut regions = vec![Region::Default];
        for region in &self.regions {
            if region.is_sub_region() && !regions.contains(region) {
                regions.push(*region);
            }
        }
        regions.sort();
        regions
    }
}
