extern crate bitcrypto;
extern crate linked_hash_map;
#[macro_use]
extern crate log;
extern crate message;
extern crate network;
extern crate parking_lot;
extern crate primitives;
extern crate ser;
extern crate sharechain;

pub mod io;

mod config;
mod coordinator;
mod node;
mod p2p;

pub use primitives::bytes;

pub use crate::config::Config;
pub use crate::coordinator::{PeerCoordinator, ProtocolError, KNOWN_TXS_CACHE_DEPTH};
pub use crate::node::Node;
pub use crate::p2p::P2P;
