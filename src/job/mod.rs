//! Job configuration and its validation against a tier's entitlements.
//!
//! ```text
//! JobConfig (user input) ──validate(config, tier)──▶ ValidatedJobConfig
//!                                   └──────────────▶ ValidationError
//! ```

pub mod config;
pub mod validate;

pub use config::{JobConfig, ValidatedJobConfig};
pub use validate::{validate, ValidationError};
