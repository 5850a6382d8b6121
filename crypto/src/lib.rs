#[macro_use]
extern crate bitcoin_hashes;

use bitcoin_hashes::hash160;
pub use bitcoin_hashes::hex::Error as HexError;
pub use bitcoin_hashes::hex::FromHex;
pub use bitcoin_hashes::Hash;
pub use bitcoin_hashes::HashEngine;
use bitcoin_hashes::{ripemd160, sha256, sha256d};
pub use std::str::FromStr;

hash_newtype!(
	SHA256D,
	sha256d::Hash,
	32,
	doc = "SHA256D newtype wrapper of bitcoin_hashes::sha256d::Hash"
);

#[inline]
pub fn dhash256(input: &[u8]) -> SHA256D {
	SHA256D(sha256d::Hash::hash(input))
}

impl Default for SHA256D {
	fn default() -> Self {
		SHA256D(sha256d::Hash::from_inner(<sha256d::Hash as Hash>::Inner::default()))
	}
}

hash_newtype!(
	SHA256,
	sha256::Hash,
	32,
	doc = "SHA256 newtype wrapper of bitcoin_hashes::sha256::Hash"
);

#[inline]
pub fn sha256(input: &[u8]) -> SHA256 {
	SHA256(sha256::Hash::hash(input))
}

hash_newtype!(
	RIPEMD160,
	ripemd160::Hash,
	20,
	doc = "RIPEMD160 newtype wrapper of bitcoin_hashes::ripemd160::Hash"
);

#[inline]
pub fn ripemd160(input: &[u8]) -> RIPEMD160 {
	RIPEMD160(ripemd160::Hash::hash(input))
}

hash_newtype!(
	HASH160,
	hash160::Hash,
	20,
	doc = "HASH160 newtype wrapper of bitcoin_hashes::hash160::Hash"
);

#[inline]
pub fn dhash160(input: &[u8]) -> HASH160 {
	HASH160(hash160::Hash::hash(input))
}

/// A lot of tests use hashes in the form of already reversed hex strings. SHA256D from_str/from_hex impl reverses the
/// order and we don't want to do that if it's already reversed. This trait should only be used for this one hash type.
pub trait FromInnerHex {
	fn from_inner_hex(hex: &str) -> Result<SHA256D, HexError>;
}

impl FromInnerHex for SHA256D {
	fn from_inner_hex(hex: &str) -> Result<SHA256D, HexError> {
		Ok(SHA256D::from_inner(FromHex::from_hex(hex)?))
	}
}

/// SHA-256 state captured after absorbing a whole number of 64-byte blocks.
///
/// `state` is the raw midstate, `processed` the number of bytes compressed so
/// far (always a multiple of 64).
pub fn sha256_midstate(data: &[u8]) -> ([u8; 32], u64) {
	let aligned = data.len() - data.len() % 64;
	let mut engine = sha256::Hash::engine();
	engine.input(&data[..aligned]);
	(engine.midstate().0, aligned as u64)
}

/// Resumes SHA-256 from a midstate, absorbs `tail` followed by `suffix`,
/// finalizes, and double-hashes. `processed` must be a multiple of 64.
pub fn dhash256_from_midstate(state: [u8; 32], processed: u64, tail: &[u8], suffix: &[u8]) -> SHA256D {
	let midstate = sha256::Midstate(state);
	let mut engine = sha256::HashEngine::from_midstate(midstate, processed as usize);
	engine.input(tail);
	engine.input(suffix);
	let first = sha256::Hash::from_engine(engine);
	let second = sha256::Hash::hash(&first[..]);
	SHA256D(sha256d::Hash::from_inner(second.into_inner()))
}
