//! Display setup types
//!
//! The configuration record, the board manifest and the checks applied
//! before the values are handed to the graphics library.

pub mod setup;
pub mod types;
pub mod validate;

pub use setup::*;
pub use types::*;
pub use validate::{check_output_pin, validate, SetupError};
