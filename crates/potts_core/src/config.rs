//! Configuration management for lattice simulations.
//!
//! This module provides strongly-typed configuration structures that map to
//! a TOML file. The whole configuration is an immutable snapshot for the
//! run: the engine reads it once at construction.
//!
//! ## Example
//!
//! ```toml
//! [lattice]
//! length = 40
//! width = 40
//! height = 1
//!
//! [potts]
//! mcs = 1.0
//! temperature = 10.0
//! seed = 42
//! terms = ["adhesion", "volume", "surface"]
//!
//! [[populations]]
//! name = "tissue"
//! code = 1
//!
//! [populations.adhesion]
//! medium = 10.0
//! populations = { tissue = 20.0 }
//!
//! [populations.volume]
//! lambda = 1.0
//!
//! [populations.surface]
//! lambda = 0.5
//! ```

use anyhow::Context;
use potts_data::{AdhesionParameters, LambdaParameters, PopulationParameters, TermKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Interior dimensions of the lattice. A height of 1 selects a planar run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LatticeConfig {
    pub length: usize,
    pub width: usize,
    pub height: usize,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self {
            length: 50,
            width: 50,
            height: 1,
        }
    }
}

/// Stepper settings and the active energy terms.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PottsConfig {
    /// Trials per interior voxel in one step.
    pub mcs: f64,
    pub temperature: f64,
    #[serde(default)]
    pub seed: Option<u64>,
    pub terms: Vec<TermKind>,
}

impl Default for PottsConfig {
    fn default() -> Self {
        Self {
            mcs: 1.0,
            temperature: 10.0,
            seed: None,
            terms: vec![TermKind::Adhesion, TermKind::Volume, TermKind::Surface],
        }
    }
}

/// Global persistence settings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PersistenceTermConfig {
    /// Volume at which the vertical bias of the direction vector reaches 1.
    pub volume_threshold: f64,
}

impl Default for PersistenceTermConfig {
    fn default() -> Self {
        Self {
            volume_threshold: 100.0,
        }
    }
}

/// Global substrate settings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SubstrateTermConfig {
    /// Height at which substrate adhesion falls to 1% of its base value.
    pub height_threshold: f64,
}

impl Default for SubstrateTermConfig {
    fn default() -> Self {
        Self {
            height_threshold: 10.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    #[serde(default)]
    pub lattice: LatticeConfig,
    #[serde(default)]
    pub potts: PottsConfig,
    #[serde(default)]
    pub persistence: PersistenceTermConfig,
    #[serde(default)]
    pub substrate: SubstrateTermConfig,
    #[serde(default)]
    pub populations: Vec<PopulationParameters>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let mut tissue = PopulationParameters::new("tissue", 1);
        tissue.adhesion = AdhesionParameters::new(10.0).with_population("tissue", 20.0);
        tissue.volume = LambdaParameters::new(1.0);
        tissue.surface = LambdaParameters::new(0.5);
        tissue.persistence.lambda = Some(1.0);
        tissue.persistence.decay = Some(0.1);
        Self {
            lattice: LatticeConfig::default(),
            potts: PottsConfig::default(),
            persistence: PersistenceTermConfig::default(),
            substrate: SubstrateTermConfig::default(),
            populations: vec![tissue],
        }
    }
}

impl SimulationConfig {
    #[must_use]
    pub fn is_volumetric(&self) -> bool {
        self.lattice.height != 1
    }

    #[must_use]
    pub fn has_term(&self, term: TermKind) -> bool {
        self.potts.terms.contains(&term)
    }

    #[must_use]
    pub fn population(&self, code: u32) -> Option<&PopulationParameters> {
        self.populations.iter().find(|p| p.code == code)
    }

    /// Trials in one step: `floor(mcs × interior voxels)`.
    #[must_use]
    pub fn steps(&self) -> usize {
        let interior = self.lattice.length * self.lattice.width * self.lattice.height;
        (self.potts.mcs * interior as f64) as usize
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        // Lattice validation
        anyhow::ensure!(self.lattice.length > 0, "Lattice length must be positive");
        anyhow::ensure!(self.lattice.width > 0, "Lattice width must be positive");
        anyhow::ensure!(self.lattice.height > 0, "Lattice height must be positive");
        anyhow::ensure!(
            self.lattice.length <= 4096 && self.lattice.width <= 4096 && self.lattice.height <= 4096,
            "Lattice dimension too large (max 4096)"
        );

        // Stepper validation
        anyhow::ensure!(
            self.potts.temperature.is_finite() && self.potts.temperature > 0.0,
            "Temperature must be positive"
        );
        anyhow::ensure!(
            self.potts.mcs.is_finite() && self.potts.mcs > 0.0,
            "MCS multiplier must be positive"
        );

        // Term selection
        let mut seen = HashSet::new();
        for term in &self.potts.terms {
            anyhow::ensure!(seen.insert(*term), "Term '{term}' selected more than once");
            anyhow::ensure!(
                self.is_volumetric() || !term.requires_volumetric(),
                "Term '{term}' requires a lattice height above 1"
            );
        }
        if self.has_term(TermKind::Persistence) {
            anyhow::ensure!(
                self.persistence.volume_threshold > 0.0,
                "Persistence volume threshold must be positive"
            );
        }
        if self.has_term(TermKind::Substrate) {
            anyhow::ensure!(
                self.substrate.height_threshold > 1.0,
                "Substrate height threshold must be greater than 1"
            );
        }

        // Populations
        let mut names = HashSet::new();
        let mut codes = HashSet::new();
        for pop in &self.populations {
            anyhow::ensure!(pop.code > 0, "Population '{}' uses reserved code 0", pop.name);
            anyhow::ensure!(
                names.insert(pop.name.as_str()),
                "Duplicate population name '{}'",
                pop.name
            );
            anyhow::ensure!(codes.insert(pop.code), "Duplicate population code {}", pop.code);
        }

        Ok(())
    }

    /// Parses and validates a TOML document.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a TOML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Digest of every setting that influences the lattice trajectory.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.lattice).as_bytes());
        hasher.update(format!("{:?}", self.potts).as_bytes());
        hasher.update(format!("{:?}", self.persistence).as_bytes());
        hasher.update(format!("{:?}", self.substrate).as_bytes());
        hasher.update(format!("{:?}", self.populations).as_bytes());
        hex::encode(hasher.finalize())
    }
}
