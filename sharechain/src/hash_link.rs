use bitcrypto::{dhash256_from_midstate, sha256_midstate, SHA256D};
use primitives::bytes::Bytes;
use ser::{Deserializable, Error, Reader, Serializable, Stream};
use std::io;

/// Persisted SHA-256 midstate.
///
/// Binds a share's generation transaction to a long common prefix without
/// re-hashing that prefix for every share: the prefix is hashed once, and the
/// midstate travels with the share.
///
/// `length` counts every prefix byte; `tail` holds the residue past the last
/// 64-byte block boundary, so `length - tail.len()` is always block-aligned.
#[derive(Debug, PartialEq, Clone)]
pub struct HashLink {
	pub state: [u8; 32],
	pub length: u64,
	pub tail: Bytes,
}

impl HashLink {
	/// Captures the midstate of `prefix`.
	pub fn from_prefix(prefix: &[u8]) -> HashLink {
		let (state, processed) = sha256_midstate(prefix);
		HashLink {
			state,
			length: prefix.len() as u64,
			tail: prefix[processed as usize..].into(),
		}
	}

	/// Verifies that this link is structurally consistent with having hashed
	/// `expected_prefix`, then returns the double-sha256 of
	/// `expected_prefix || suffix`. A link with a forged midstate still passes
	/// this check but produces a digest that fails proof-of-work downstream.
	pub fn check(&self, suffix: &[u8], expected_prefix: &[u8]) -> Option<SHA256D> {
		if self.length != expected_prefix.len() as u64 {
			return None;
		}
		if self.tail.len() as u64 > self.length {
			return None;
		}

		let compressed = self.length - self.tail.len() as u64;
		if compressed % 64 != 0 {
			return None;
		}
		if &expected_prefix[compressed as usize..] != &self.tail[..] {
			return None;
		}

		Some(dhash256_from_midstate(self.state, compressed, &self.tail, suffix))
	}
}

impl Serializable for HashLink {
	fn serialize(&self, stream: &mut Stream) {
		stream.append_slice(&self.state).append(&self.length).append(&self.tail);
	}

	fn serialized_size(&self) -> usize {
		32 + 8 + self.tail.serialized_size()
	}
}

impl Deserializable for HashLink {
	fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, Error>
	where
		T: io::Read,
	{
		let mut state = [0u8; 32];
		reader.read_slice(&mut state)?;
		let length: u64 = reader.read()?;
		let tail: Bytes = reader.read()?;

		if tail.len() >= 64 || (tail.len() as u64) > length || (length - tail.len() as u64) % 64 != 0 {
			return Err(Error::MalformedData);
		}

		Ok(HashLink { state, length, tail })
	}
}

#[cfg(test)]
mod tests {
	use super::HashLink;
	use bitcrypto::dhash256;
	use ser::{deserialize, serialize};

	#[test]
	fn test_check_matches_direct_hash() {
		let prefix = vec![0x11u8; 77];
		let suffix = vec![0x22u8; 44];

		let link = HashLink::from_prefix(&prefix);
		assert_eq!(link.tail.len(), 13);

		let mut whole = prefix.clone();
		whole.extend_from_slice(&suffix);
		assert_eq!(link.check(&suffix, &prefix), Some(dhash256(&whole)));
	}

	#[test]
	fn test_check_rejects_wrong_prefix_length() {
		let prefix = vec![0x11u8; 77];
		let link = HashLink::from_prefix(&prefix);
		assert_eq!(link.check(b"suffix", &prefix[..76]), None);
	}

	#[test]
	fn test_check_rejects_unaligned_length() {
		let prefix = vec![0x11u8; 77];
		let mut link = HashLink::from_prefix(&prefix);
		// claim one fewer tail byte than the length implies
		link.tail = link.tail[..12].to_vec().into();
		assert_eq!(link.check(b"suffix", &prefix), None);
	}

	#[test]
	fn test_check_rejects_tail_mismatch() {
		let prefix = vec![0x11u8; 77];
		let mut other = prefix.clone();
		other[70] = 0x12;

		let link = HashLink::from_prefix(&prefix);
		assert_eq!(link.check(b"suffix", &other), None);
	}

	#[test]
	fn test_serialization_roundtrip() {
		let link = HashLink::from_prefix(&[0x33u8; 100]);
		let serialized = serialize(&link);
		assert_eq!(serialized.len(), 32 + 8 + 1 + 36);
		assert_eq!(link, deserialize::<_, HashLink>(serialized.as_ref()).unwrap());
	}

	#[test]
	fn test_deserialize_rejects_oversized_tail() {
		let mut stream = ser::Stream::new();
		stream.append_slice(&[0u8; 32]).append(&128u64).append(&primitives::bytes::Bytes::from(vec![0u8; 64]));
		assert!(deserialize::<_, HashLink>(stream.out().as_ref()).is_err());
	}
}
