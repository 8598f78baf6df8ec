pub mod adaptive;
pub mod composite;
pub mod context;
pub mod metrics;
pub mod parking;
pub mod presets;
pub mod progression;
pub mod strategy;

pub use adaptive::*;
pub use composite::*;
pub use context::*;
pub use metrics::*;
pub use parking::*;
pub use presets::*;
pub use progression::*;
pub use strategy::*;
