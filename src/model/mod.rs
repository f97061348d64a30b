pub mod config {
    pub use secretion_core::config::*;
}
pub mod state {
    pub use secretion_data::*;
}
pub mod tasks {
    pub use secretion_core::tasks::*;
}

pub mod factory;
pub mod integrator;
pub mod recorder;
pub mod world;
