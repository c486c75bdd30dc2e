pub use potts_core::{Potts, PottsError, SimulationConfig, StepStats};
pub mod cell {
    pub use potts_core::cell::*;
}
pub mod config {
    pub use potts_core::config::*;
}
pub mod connectivity {
    pub use potts_core::connectivity::*;
}
pub mod hamiltonian {
    pub use potts_core::hamiltonian::*;
}
pub mod lattice {
    pub use potts_core::lattice::*;
}
pub mod location {
    pub use potts_core::location::*;
}
pub mod metrics {
    pub use potts_core::metrics::*;
}
pub mod potts {
    pub use potts_core::potts::*;
}
pub mod topology {
    pub use potts_core::topology::*;
}
pub mod data {
    pub use potts_data::*;
}
