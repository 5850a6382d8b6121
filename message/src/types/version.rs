use crate::{MessageResult, Payload};
use bitcrypto::SHA256D;
use ser::{Reader, Stream};
use std::io;

/// Handshake message, sent by both sides immediately after connecting.
///
/// `best_share_hash` is all zeroes while the sender has no share chain yet.
#[derive(Debug, PartialEq, Clone)]
pub struct Version {
	pub version: u32,
	pub services: u64,
	pub timestamp: i64,
	pub nonce: u64,
	pub user_agent: String,
	pub best_share_hash: SHA256D,
}

impl Payload for Version {
	fn version() -> u32 {
		0
	}

	fn command() -> &'static str {
		"version"
	}

	fn deserialize_payload<T>(reader: &mut Reader<T>, _version: u32) -> MessageResult<Self>
	where
		T: io::Read,
	{
		let version = Version {
			version: reader.read()?,
			services: reader.read()?,
			timestamp: reader.read()?,
			nonce: reader.read()?,
			user_agent: reader.read()?,
			best_share_hash: reader.read()?,
		};

		Ok(version)
	}

	fn serialize_payload(&self, stream: &mut Stream, _version: u32) -> MessageResult<()> {
		stream
			.append(&self.version)
			.append(&self.services)
			.append(&self.timestamp)
			.append(&self.nonce)
			.append(&self.user_agent)
			.append(&self.best_share_hash);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::Version;
	use crate::{deserialize_payload, serialize_payload};
	use bitcrypto::{dhash256, SHA256D};

	#[test]
	fn test_version_roundtrip() {
		let version = Version {
			version: 1700,
			services: 0,
			timestamp: 1_521_080_000,
			nonce: 0xdead_beef_0000_0001,
			user_agent: "/p2pool-rs:0.1.0/".into(),
			best_share_hash: dhash256(b"best share"),
		};

		let serialized = serialize_payload(&version, 0).unwrap();
		assert_eq!(version, deserialize_payload::<Version>(serialized.as_ref(), 0).unwrap());
	}

	#[test]
	fn test_version_without_share_chain() {
		let version = Version {
			version: 1700,
			services: 0,
			timestamp: 0,
			nonce: 1,
			user_agent: String::new(),
			best_share_hash: SHA256D::default(),
		};

		let serialized = serialize_payload(&version, 0).unwrap();
		assert_eq!(serialized.len(), 4 + 8 + 8 + 8 + 1 + 32);
	}
}
