use bitcrypto::{dhash256, SHA256D};
use primitives::bytes::Bytes;
use primitives::compact::Compact;
use ser::{CompactInteger, Deserializable, Error, Reader, Serializable, Stream};
use std::io;

/// Condensed block header carried by shares: everything but the merkle root,
/// which is re-derived from the share's generation transaction.
#[derive(Debug, PartialEq, Clone)]
pub struct SmallBlockHeader {
	pub version: u64,
	pub previous_block_hash: SHA256D,
	pub timestamp: u32,
	pub bits: Compact,
	pub nonce: u32,
}

impl SmallBlockHeader {
	/// The full 80-byte header this share proves work for.
	pub fn full_header(&self, merkle_root: &SHA256D) -> Bytes {
		let mut stream = Stream::new();
		stream
			.append(&(self.version as u32))
			.append(&self.previous_block_hash)
			.append(merkle_root)
			.append(&self.timestamp)
			.append(&self.bits)
			.append(&self.nonce);
		stream.out()
	}

	pub fn calculate_hash(&self, merkle_root: &SHA256D) -> SHA256D {
		dhash256(&self.full_header(merkle_root))
	}
}

impl Serializable for SmallBlockHeader {
	fn serialize(&self, stream: &mut Stream) {
		stream
			.append(&CompactInteger::from(self.version))
			.append(&self.previous_block_hash)
			.append(&self.timestamp)
			.append(&self.bits)
			.append(&self.nonce);
	}
}

impl Deserializable for SmallBlockHeader {
	fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, Error>
	where
		T: io::Read,
	{
		Ok(SmallBlockHeader {
			version: reader.read::<CompactInteger>()?.into(),
			previous_block_hash: reader.read()?,
			timestamp: reader.read()?,
			bits: reader.read()?,
			nonce: reader.read()?,
		})
	}
}
