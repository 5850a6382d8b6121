extern crate bitcrypto;
extern crate network;
#[macro_use]
extern crate primitives;
#[macro_use]
extern crate ser;

pub mod common;
mod error;
mod message;
mod payload;
pub mod types;

pub use primitives::bytes;

pub use crate::common::Command;
pub use crate::error::{Error, MessageResult};
pub use crate::message::{to_raw_message, Message, MessageHeader};
pub use crate::payload::{deserialize_payload, serialize_payload, Payload};
