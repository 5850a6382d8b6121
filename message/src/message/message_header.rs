use crate::common::Command;
use crate::Error;
use network::Magic;
use primitives::checksum::Checksum;
use ser::{Reader, Serializable, Stream};

#[derive(Debug, PartialEq)]
pub struct MessageHeader {
	pub magic: Magic,
	pub command: Command,
	pub len: u32,
	pub checksum: Checksum,
}

impl MessageHeader {
	pub fn for_data(magic: Magic, command: Command, data: &[u8]) -> Self {
		MessageHeader {
			magic,
			command,
			len: data.len() as u32,
			checksum: Checksum::generate(data),
		}
	}
}

impl MessageHeader {
	pub fn deserialize(data: &[u8], expected: Magic) -> Result<Self, Error> {
		if data.len() != 24 {
			return Err(Error::Deserialize);
		}

		let mut reader = Reader::new(data);
		let magic: Magic = reader.read()?;
		if expected != magic {
			return Err(Error::InvalidMagic);
		}

		let header = MessageHeader {
			magic,
			command: reader.read()?,
			len: reader.read()?,
			checksum: reader.read()?,
		};

		Ok(header)
	}
}

impl Serializable for MessageHeader {
	fn serialize(&self, stream: &mut Stream) {
		stream
			.append(&self.magic)
			.append(&self.command)
			.append(&self.len)
			.append(&self.checksum);
	}

	#[inline]
	fn serialized_size(&self) -> usize {
		24
	}
}

#[cfg(test)]
mod tests {
	use super::MessageHeader;
	use crate::bytes::Bytes;
	use network::Network;
	use ser::serialize;

	#[test]
	fn test_message_header_serialization() {
		let expected = "18ef7224686176655f7478000000000008000000b3b5447e".into();
		let header = MessageHeader {
			magic: Network::Mainnet.magic(),
			command: "have_tx".into(),
			len: 8,
			checksum: "b3b5447e".into(),
		};

		assert_eq!(serialize(&header), expected);
	}

	#[test]
	fn test_message_header_deserialization() {
		let raw: Bytes = "18ef7224686176655f7478000000000008000000b3b5447e".into();
		let expected = MessageHeader {
			magic: Network::Mainnet.magic(),
			command: "have_tx".into(),
			len: 8,
			checksum: "b3b5447e".into(),
		};

		assert_eq!(expected, MessageHeader::deserialize(&raw, Network::Mainnet.magic()).unwrap());
	}

	#[test]
	fn test_message_header_wrong_magic() {
		let raw: Bytes = "18ef7224686176655f7478000000000008000000b3b5447e".into();
		assert!(MessageHeader::deserialize(&raw, Network::Testnet.magic()).is_err());
	}
}
