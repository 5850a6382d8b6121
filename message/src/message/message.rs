use crate::common::Command;
use crate::message::MessageHeader;
use crate::payload::{serialize_payload, Payload};
use crate::MessageResult;
use network::Magic;
use primitives::bytes::{Bytes, TaggedBytes};
use ser::Stream;

pub fn to_raw_message(magic: Magic, command: Command, payload: &Bytes) -> Bytes {
	let header = MessageHeader::for_data(magic, command, payload);
	let mut stream = Stream::default();
	stream.append(&header);
	stream.append_slice(payload);
	stream.out()
}

pub struct Message<T> {
	bytes: TaggedBytes<T>,
}

impl<T> Message<T>
where
	T: Payload,
{
	pub fn new(magic: Magic, version: u32, payload: &T) -> MessageResult<Self> {
		let serialized = serialize_payload(payload, version)?;

		let message = Message {
			bytes: TaggedBytes::new(to_raw_message(magic, T::command().into(), &serialized)),
		};

		Ok(message)
	}

	pub fn len(&self) -> usize {
		self.bytes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.bytes.is_empty()
	}
}

impl<T> Message<T> {
	pub fn into_raw(self) -> Bytes {
		self.bytes.into_raw()
	}
}

impl<T> AsRef<[u8]> for Message<T> {
	fn as_ref(&self) -> &[u8] {
		self.bytes.as_ref()
	}
}

#[cfg(test)]
mod tests {
	use super::Message;
	use crate::types::HaveTx;
	use crate::MessageHeader;
	use network::Network;

	#[test]
	fn test_message_framing() {
		let magic = Network::Mainnet.magic();
		let message = Message::new(magic, 1700, &HaveTx { tx_hashes: vec![] }).unwrap();

		let raw = message.as_ref();
		// 24-byte header followed by the single-byte empty hash list
		assert_eq!(raw.len(), 24 + 1);

		let header = MessageHeader::deserialize(&raw[..24], magic).unwrap();
		assert_eq!(header.command, "have_tx");
		assert_eq!(header.len, 1);
	}
}
