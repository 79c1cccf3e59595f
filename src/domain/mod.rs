//! Domain layer: models, error taxonomy, and the ports adapters implement.

pub mod errors;
pub mod models;
pub mod ports;
