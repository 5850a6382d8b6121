use crate::{Error, MessageResult};
use primitives::bytes::Bytes;
use ser::{Reader, Stream};
use std::io;

/// Typed peer protocol payload.
pub trait Payload: Send + 'static {
	fn version() -> u32;

	fn command() -> &'static str;

	fn deserialize_payload<T>(reader: &mut Reader<T>, version: u32) -> MessageResult<Self>
	where
		Self: Sized,
		T: io::Read;

	fn serialize_payload(&self, stream: &mut Stream, version: u32) -> MessageResult<()>;
}

pub fn serialize_payload<T>(t: &T, version: u32) -> MessageResult<Bytes>
where
	T: Payload,
{
	let mut stream = Stream::default();
	t.serialize_payload(&mut stream, version)?;
	Ok(stream.out())
}

pub fn deserialize_payload<T>(buffer: &[u8], version: u32) -> MessageResult<T>
where
	T: Payload,
{
	let mut reader = Reader::new(buffer);
	let result = T::deserialize_payload(&mut reader, version)?;

	if !reader.is_finished() {
		return Err(Error::Deserialize);
	}

	Ok(result)
}

#[cfg(test)]
mod tests {
	use super::{deserialize_payload, serialize_payload};
	use crate::types::ForgetTx;
	use crate::Error;

	#[test]
	fn test_payload_roundtrip() {
		let payload = ForgetTx {
			tx_hashes: vec![bitcrypto::dhash256(b"tx")],
			total_size: 250,
		};

		let serialized = serialize_payload(&payload, 0).unwrap();
		assert_eq!(payload, deserialize_payload::<ForgetTx>(serialized.as_ref(), 0).unwrap());
	}

	#[test]
	fn test_trailing_bytes_rejected() {
		let payload = ForgetTx {
			tx_hashes: vec![],
			total_size: 0,
		};

		let mut serialized = serialize_payload(&payload, 0).unwrap().take();
		serialized.push(0);
		assert_eq!(deserialize_payload::<ForgetTx>(&serialized, 0).unwrap_err(), Error::Deserialize);
	}
}
