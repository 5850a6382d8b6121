use crate::compact_integer::CompactInteger;
use primitives::bytes::Bytes;
use primitives::U256;
use std::borrow::Borrow;
use std::io;

pub fn serialize<T>(t: &T) -> Bytes
where
	T: Serializable,
{
	let mut stream = Stream::default();
	stream.append(t);
	stream.out()
}

pub fn serialize_list<T, K>(t: &[K]) -> Bytes
where
	T: Serializable,
	K: Borrow<T>,
{
	let mut stream = Stream::default();
	stream.append_list(t);
	stream.out()
}

pub trait Serializable {
	/// Serialize the struct and appends it to the end of stream.
	fn serialize(&self, s: &mut Stream);

	/// Hint about the size of serialized struct.
	fn serialized_size(&self) -> usize {
		let mut stream = Stream::default();
		self.serialize(&mut stream);
		stream.out().len()
	}
}

/// Stream used for serialization of wire structures.
#[derive(Default)]
pub struct Stream {
	buffer: Bytes,
}

impl Stream {
	pub fn new() -> Self {
		Stream::default()
	}

	/// Serializes the struct and appends it to the end of stream.
	pub fn append<T>(&mut self, t: &T) -> &mut Self
	where
		T: Serializable,
	{
		t.serialize(self);
		self
	}

	/// Appends raw bytes to the end of the stream.
	pub fn append_slice(&mut self, bytes: &[u8]) -> &mut Self {
		self.buffer.extend_from_slice(bytes);
		self
	}

	/// Appends a list of serializable structs, prefixed with the compact-size length.
	pub fn append_list<T, K>(&mut self, t: &[K]) -> &mut Self
	where
		T: Serializable,
		K: Borrow<T>,
	{
		CompactInteger::from(t.len()).serialize(self);
		for i in t {
			i.borrow().serialize(self);
		}
		self
	}

	/// Little-endian unsigned integer of an arbitrary byte width up to 32.
	pub fn append_uint_le(&mut self, value: U256, width: usize) -> &mut Self {
		assert!(width <= 32);
		let mut buf = [0u8; 32];
		value.to_little_endian(&mut buf);
		self.buffer.extend_from_slice(&buf[..width]);
		self
	}

	/// Full stream.
	pub fn out(self) -> Bytes {
		self.buffer
	}
}

impl io::Write for Stream {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		io::Write::write(&mut self.buffer, buf)
	}

	fn flush(&mut self) -> io::Result<()> {
		io::Write::flush(&mut self.buffer)
	}
}

#[cfg(test)]
mod tests {
	use super::{serialize, Stream};
	use primitives::bytes::Bytes;
	use primitives::U256;

	#[test]
	fn test_stream_append() {
		let mut stream = Stream::default();
		stream.append(&1u8).append(&2u16).append(&3u32).append(&4u64);

		let expected: Bytes = "010200030000000400000000000000".into();
		assert_eq!(expected, stream.out());
	}

	#[test]
	fn test_stream_append_uint_le() {
		let mut stream = Stream::default();
		stream.append_uint_le(U256::from(0x0102u64), 16);

		let expected: Bytes = "02010000000000000000000000000000".into();
		assert_eq!(expected, stream.out());
	}

	#[test]
	fn test_serialize_var_string() {
		let expected: Bytes = "0776657273696f6e".into();
		assert_eq!(expected, serialize(&"version".to_owned()));
	}
}
