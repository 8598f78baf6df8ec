pub mod dalembert;
pub mod fibonacci;
pub mod flat;
pub mod martingale;
pub mod paroli;

pub use dalembert::DAlembertState;
pub use fibonacci::FibonacciState;
pub use flat::FlatState;
pub use martingale::MartingaleState;
pub use paroli::ParoliState;
