pub mod checkpoint;
pub mod compare;
pub mod dispatch;
pub mod log_sink;
pub mod plan;
pub mod runner;
pub mod sweep;

pub use checkpoint::*;
pub use compare::*;
pub use dispatch::*;
pub use log_sink::*;
pub use plan::*;
pub use runner::*;
pub use sweep::*;
