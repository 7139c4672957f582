//! This crate provides common funcionality shared by reservoirs and forecasters

#![deny(unused_imports, unused_crate_dependencies)]
#![warn(missing_docs)]

mod activation;
mod reservoir_trait;

pub use activation::Activation;
pub use reservoir_trait::{Reservoir, ReservoirParams};
