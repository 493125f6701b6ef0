pub mod constants;
pub mod domain;
pub mod error;
pub mod logging;

// Layered boundaries: ports in app, adapters in infra
pub mod app;
pub mod infra;

pub mod observability;
pub mod pipeline;
