pub mod error;
pub mod math;
pub mod operations;
pub mod space;
pub mod topology;

pub use error::{KernelError, Result};
