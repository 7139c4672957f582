//! Classic reservoir computers, usable as the reservoir unit of a forecaster

#[macro_use]
extern crate log;

use nalgebra::{Const, Dyn, Matrix, VecStorage};

mod esn;
mod esn_constructor;
mod eusn_constructor;
mod params;
mod reservoir_constructor;

pub use esn::EchoStateNetwork;
pub use esn_constructor::{spectral_radius, ESNConstructor};
pub use eusn_constructor::EUSNConstructor;
pub use params::Params;
pub use reservoir_constructor::ReservoirConstructor;

pub type StateMatrix = Matrix<f64, Dyn, Const<1>, VecStorage<f64, Dyn, Const<1>>>;
