pub mod macros;

use potts_lib::model::data::{
    AdhesionParameters, LambdaParameters, PopulationParameters, Region, TermKind, Voxel,
};
use potts_lib::model::{Potts, SimulationConfig};

/// Voxels of an axis-aligned box with its low corner at `(x0, y0, z0)`.
#[allow(dead_code)]
pub fn block(x0: i32, y0: i32, z0: i32, nx: i32, ny: i32, nz: i32) -> Vec<Voxel> {
    let mut out = Vec::new();
    for x in x0..x0 + nx {
        for y in y0..y0 + ny {
            for z in z0..z0 + nz {
                out.push(Voxel::new(x, y, z));
            }
        }
    }
    out
}

/// A population with every term table filled and a nucleus sub-region.
#[allow(dead_code)]
pub fn nucleated(name: &str, code: u32, others: &[&str]) -> PopulationParameters {
    let mut pop = PopulationParameters::new(name, code);
    pop.regions = vec![Region::Nucleus];
    let mut adhesion = AdhesionParameters::new(16.0)
        .with_region(Region::Default, Region::Nucleus, 2.0)
        .with_region(Region::Nucleus, Region::Default, 2.0);
    for other in others.iter().chain(std::iter::once(&name)) {
        adhesion = adhesion.with_population(other, 8.0);
    }
    pop.adhesion = adhesion;
    pop.volume = LambdaParameters::new(1.0).with_region(Region::Nucleus, 2.0);
    pop.surface = LambdaParameters::new(0.5).with_region(Region::Nucleus, 0.5);
    pop.height = LambdaParameters::new(0.2).with_region(Region::Nucleus, 0.2);
    pop.junction = LambdaParameters::new(1.0).with_region(Region::Nucleus, 1.0);
    pop.critical_height = Some(3.0);
    pop.critical_region_heights.insert(Region::Nucleus, 1.0);
    pop.persistence.lambda = Some(1.0);
    pop.persistence.decay = Some(0.1);
    pop.persistence.regions.insert(Region::Nucleus, 0.5);
    pop.substrate.adhesion = Some(1.0);
    pop
}

type CellSpec = (u32, Vec<Voxel>, Vec<(Region, Voxel)>);

#[allow(dead_code)]
pub struct PottsBuilder {
    config: SimulationConfig,
    cells: Vec<CellSpec>,
}

#[allow(dead_code)]
impl PottsBuilder {
    /// A 20×20 planar run with the default tissue population.
    pub fn new() -> Self {
        let mut config = SimulationConfig::default();
        config.lattice.length = 20;
        config.lattice.width = 20;
        config.potts.seed = Some(1);
        Self {
            config,
            cells: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.potts.seed = Some(seed);
        self
    }

    pub fn with_dims(mut self, length: usize, width: usize, height: usize) -> Self {
        self.config.lattice.length = length;
        self.config.lattice.width = width;
        self.config.lattice.height = height;
        self
    }

    pub fn with_terms(mut self, terms: &[TermKind]) -> Self {
        self.config.potts.terms = terms.to_vec();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.config.potts.temperature = temperature;
        self
    }

    pub fn with_populations(mut self, populations: Vec<PopulationParameters>) -> Self {
        self.config.populations = populations;
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut SimulationConfig),
    {
        modifier(&mut self.config);
        self
    }

    pub fn with_cell(mut self, population: u32, voxels: Vec<Voxel>) -> Self {
        self.cells.push((population, voxels, Vec::new()));
        self
    }

    pub fn with_region_cell(
        mut self,
        population: u32,
        voxels: Vec<Voxel>,
        region_voxels: Vec<(Region, Voxel)>,
    ) -> Self {
        self.cells.push((population, voxels, region_voxels));
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn build(self) -> Potts {
        let mut potts = Potts::new(&self.config).expect("Failed to create Potts in test builder");
        for (population, voxels, region_voxels) in &self.cells {
            potts
                .add_cell(*population, voxels, region_voxels)
                .expect("Failed to place cell in test builder");
        }
        potts
    }
}

/// A 3×3×2 slab at `(x0, y0, 1)` topped by a single nucleus voxel.
#[allow(dead_code)]
pub fn nucleated_cell(x0: i32, y0: i32) -> (Vec<Voxel>, Vec<(Region, Voxel)>) {
    (
        block(x0, y0, 1, 3, 3, 2),
        vec![(Region::Nucleus, Voxel::new(x0 + 1, y0 + 1, 3))],
    )
}

/// Builder for a volumetric run with two nucleated populations and every
/// energy term active.
#[allow(dead_code)]
pub fn full_tissue(seed: u64) -> PottsBuilder {
    let mut builder = PottsBuilder::new()
        .with_seed(seed)
        .with_dims(14, 14, 6)
        .with_terms(&TermKind::ALL)
        .with_populations(vec![
            nucleated("epithelium", 1, &["stroma"]),
            nucleated("stroma", 2, &["epithelium"]),
        ]);
    for (i, (x0, y0)) in [(2, 2), (6, 2), (2, 7), (7, 7)].into_iter().enumerate() {
        let (voxels, nucleus) = nucleated_cell(x0, y0);
        builder = builder.with_region_cell(1 + (i as u32 % 2), voxels, nucleus);
    }
    builder
}

/// Builder for a planar run with a row of 3×3 tissue cells.
#[allow(dead_code)]
pub fn planar_tissue(seed: u64) -> PottsBuilder {
    let mut builder = PottsBuilder::new().with_seed(seed);
    for x0 in [2, 7, 12] {
        builder = builder.with_cell(1, block(x0, 8, 0, 3, 3, 1));
    }
    builder
}
