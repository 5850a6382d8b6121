use ser::{Deserializable, Error, Reader, Serializable, Stream};
use std::io;

/// Message framing magic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Magic(u32);

impl From<u32> for Magic {
	fn from(m: u32) -> Self {
		Magic(m)
	}
}

impl From<Magic> for u32 {
	fn from(m: Magic) -> Self {
		m.0
	}
}

impl Serializable for Magic {
	fn serialize(&self, stream: &mut Stream) {
		stream.append(&self.0);
	}

	#[inline]
	fn serialized_size(&self) -> usize {
		4
	}
}

impl Deserializable for Magic {
	fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, Error>
	where
		T: io::Read,
	{
		reader.read::<u32>().map(Magic)
	}
}

/// Share chain the node participates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
	Mainnet,
	Testnet,
	/// Any other network with a custom magic, used in tests.
	Other(u32),
}

impl Network {
	pub fn magic(&self) -> Magic {
		match *self {
			Network::Mainnet => Magic(0x2472_ef18),
			Network::Testnet => Magic(0x71b0_2c8f),
			Network::Other(magic) => Magic(magic),
		}
	}

	/// Share-chain identifier mixed into every share's reference hash, so that
	/// shares from foreign chains never validate.
	pub fn identifier(&self) -> [u8; 8] {
		match *self {
			Network::Mainnet => [0xfc, 0x70, 0x03, 0x5c, 0x7a, 0x81, 0xbc, 0x6f],
			Network::Testnet | Network::Other(_) => [0xf7, 0x7c, 0xea, 0x5d, 0x16, 0xa2, 0x18, 0x3f],
		}
	}
}
