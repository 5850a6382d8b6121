extern crate bitcrypto;
extern crate primitives;
extern crate ser;

mod network;
mod params;

pub use crate::network::{Magic, Network};
pub use crate::params::{Params, PowFn};
