pub mod roll;

pub use roll::*;
