extern crate bitcrypto;
extern crate hex;
#[macro_use]
extern crate uint;

#[macro_use]
mod array_wrapper;

pub mod bytes;
pub mod checksum;
pub mod compact;

construct_uint! {
	pub struct U256(4);
}
