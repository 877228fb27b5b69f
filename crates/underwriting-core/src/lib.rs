pub mod error;
pub mod ratios;
pub mod types;

#[cfg(feature = "projections")]
pub mod projections;

#[cfg(feature = "sensitivity")]
pub mod sensitivity;

#[cfg(feature = "pipeline")]
pub mod pipeline;

#[cfg(feature = "registry")]
pub mod registry;

#[cfg(feature = "compliance")]
pub mod compliance;

#[cfg(feature = "risk")]
pub mod risk;

#[cfg(feature = "variance")]
pub mod variance;

pub use error::UnderwritingError;
pub use types::*;

/// Standard result type for all underwriting operations
pub type UnderwritingResult<T> = Result<T, UnderwritingError>;
