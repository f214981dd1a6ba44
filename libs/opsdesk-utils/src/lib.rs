#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Small building blocks shared by the Opsdesk crates.

pub mod duration_serde;
mod secret_string;

pub use secret_string::SecretString;
