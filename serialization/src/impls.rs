use crate::compact_integer::CompactInteger;
use crate::reader::{Deserializable, Error, Reader};
use crate::stream::{Serializable, Stream};
use bitcrypto::{Hash, HASH160, SHA256D};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use primitives::bytes::Bytes;
use primitives::checksum::Checksum;
use primitives::compact::Compact;
use std::io;

impl_ser_for_array!(Checksum, 4);

macro_rules! impl_ser_for_int {
	($int: ty, $size: expr, $write_fn: ident, $read_fn: ident) => {
		impl Serializable for $int {
			fn serialize(&self, stream: &mut Stream) {
				let _ = stream.$write_fn::<LittleEndian>(*self);
			}

			#[inline]
			fn serialized_size(&self) -> usize {
				$size
			}
		}

		impl Deserializable for $int {
			fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, Error>
			where
				T: io::Read,
			{
				Ok(reader.$read_fn::<LittleEndian>()?)
			}
		}
	};
}

impl_ser_for_int!(i16, 2, write_i16, read_i16);
impl_ser_for_int!(i32, 4, write_i32, read_i32);
impl_ser_for_int!(i64, 8, write_i64, read_i64);
impl_ser_for_int!(u16, 2, write_u16, read_u16);
impl_ser_for_int!(u32, 4, write_u32, read_u32);
impl_ser_for_int!(u64, 8, write_u64, read_u64);

impl Serializable for u8 {
	fn serialize(&self, stream: &mut Stream) {
		let _ = stream.write_u8(*self);
	}

	#[inline]
	fn serialized_size(&self) -> usize {
		1
	}
}

impl Deserializable for u8 {
	fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, Error>
	where
		T: io::Read,
	{
		Ok(reader.read_u8()?)
	}
}

impl Serializable for Compact {
	fn serialize(&self, stream: &mut Stream) {
		stream.append(&u32::from(*self));
	}

	#[inline]
	fn serialized_size(&self) -> usize {
		4
	}
}

impl Deserializable for Compact {
	fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, Error>
	where
		T: io::Read,
	{
		reader.read::<u32>().map(Compact::new)
	}
}

/// Strings are serialized as var-strings: compact-size length followed by the bytes.
impl Serializable for String {
	fn serialize(&self, stream: &mut Stream) {
		let bytes: &[u8] = self.as_ref();
		stream.append(&CompactInteger::from(bytes.len())).append_slice(bytes);
	}

	fn serialized_size(&self) -> usize {
		let bytes: &[u8] = self.as_ref();
		CompactInteger::from(bytes.len()).serialized_size() + bytes.len()
	}
}

impl<'a> Serializable for &'a str {
	fn serialize(&self, stream: &mut Stream) {
		let bytes: &[u8] = self.as_bytes();
		stream.append(&CompactInteger::from(bytes.len())).append_slice(bytes);
	}

	fn serialized_size(&self) -> usize {
		let bytes: &[u8] = self.as_bytes();
		CompactInteger::from(bytes.len()).serialized_size() + bytes.len()
	}
}

impl Deserializable for String {
	fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, Error>
	where
		T: io::Read,
	{
		let bytes: Bytes = reader.read()?;
		String::from_utf8(bytes.take()).map_err(|_| Error::MalformedData)
	}
}

/// `Bytes` are serialized as var-bytes: compact-size length followed by the raw content.
impl Serializable for Bytes {
	fn serialize(&self, stream: &mut Stream) {
		stream.append(&CompactInteger::from(self.len())).append_slice(self);
	}

	fn serialized_size(&self) -> usize {
		CompactInteger::from(self.len()).serialized_size() + self.len()
	}
}

impl Deserializable for Bytes {
	fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, Error>
	where
		T: io::Read,
	{
		let len: usize = reader.read::<CompactInteger>()?.into();
		let mut bytes = Bytes::new_with_len(len);
		reader.read_slice(&mut bytes)?;
		Ok(bytes)
	}
}

impl Serializable for SHA256D {
	fn serialize(&self, stream: &mut Stream) {
		stream.append_slice(&self[..]);
	}

	#[inline]
	fn serialized_size(&self) -> usize {
		32
	}
}

impl Deserializable for SHA256D {
	fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, Error>
	where
		T: io::Read,
	{
		let mut buf = [0u8; 32];
		reader.read_slice(&mut buf)?;
		SHA256D::from_slice(&buf).map_err(|_| Error::MalformedData)
	}
}

impl Serializable for HASH160 {
	fn serialize(&self, stream: &mut Stream) {
		stream.append_slice(&self[..]);
	}

	#[inline]
	fn serialized_size(&self) -> usize {
		20
	}
}

impl Deserializable for HASH160 {
	fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, Error>
	where
		T: io::Read,
	{
		let mut buf = [0u8; 20];
		reader.read_slice(&mut buf)?;
		HASH160::from_slice(&buf).map_err(|_| Error::MalformedData)
	}
}

#[cfg(test)]
mod tests {
	use crate::{deserialize, serialize, Error};
	use bitcrypto::{FromStr, SHA256D};
	use primitives::bytes::Bytes;

	#[test]
	fn test_bytes_roundtrip() {
		let bytes: Bytes = "deadbeef".into();
		let serialized = serialize(&bytes);
		assert_eq!(serialized, "04deadbeef".into());
		assert_eq!(bytes, deserialize::<_, Bytes>(serialized.as_ref()).unwrap());
	}

	#[test]
	fn test_string_deserialize_short() {
		let buffer: Bytes = "0576657273".into();
		assert_eq!(Error::UnexpectedEnd, deserialize::<_, String>(buffer.as_ref()).unwrap_err());
	}

	#[test]
	fn test_hash_serialize_raw() {
		// display form is byte-reversed, the wire form is not
		let hash = SHA256D::from_str("00000000000000000000000000000000000000000000000000000000000000ff").unwrap();
		let serialized = serialize(&hash);
		assert_eq!(serialized[0], 0xff);
		assert_eq!(hash, deserialize::<_, SHA256D>(serialized.as_ref()).unwrap());
	}
}
