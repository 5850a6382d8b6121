//! Bitcoin compact-size ("var int") encoding.

use crate::reader::{Deserializable, Error, Reader};
use crate::stream::{Serializable, Stream};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CompactInteger(u64);

impl From<CompactInteger> for u64 {
	fn from(i: CompactInteger) -> Self {
		i.0
	}
}

impl From<CompactInteger> for usize {
	fn from(i: CompactInteger) -> Self {
		i.0 as usize
	}
}

impl From<u8> for CompactInteger {
	fn from(i: u8) -> Self {
		CompactInteger(i as u64)
	}
}

impl From<u16> for CompactInteger {
	fn from(i: u16) -> Self {
		CompactInteger(i as u64)
	}
}

impl From<u32> for CompactInteger {
	fn from(i: u32) -> Self {
		CompactInteger(i as u64)
	}
}

impl From<u64> for CompactInteger {
	fn from(i: u64) -> Self {
		CompactInteger(i)
	}
}

impl From<usize> for CompactInteger {
	fn from(i: usize) -> Self {
		CompactInteger(i as u64)
	}
}

impl Serializable for CompactInteger {
	fn serialize(&self, stream: &mut Stream) {
		match self.0 {
			0..=0xfc => {
				let _ = stream.write_u8(self.0 as u8);
			}
			0xfd..=0xffff => {
				let _ = stream.write_u8(0xfd);
				let _ = stream.write_u16::<LittleEndian>(self.0 as u16);
			}
			0x10000..=0xffff_ffff => {
				let _ = stream.write_u8(0xfe);
				let _ = stream.write_u32::<LittleEndian>(self.0 as u32);
			}
			_ => {
				let _ = stream.write_u8(0xff);
				let _ = stream.write_u64::<LittleEndian>(self.0);
			}
		}
	}

	fn serialized_size(&self) -> usize {
		match self.0 {
			0..=0xfc => 1,
			0xfd..=0xffff => 3,
			0x10000..=0xffff_ffff => 5,
			_ => 9,
		}
	}
}

impl Deserializable for CompactInteger {
	fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, Error>
	where
		T: io::Read,
	{
		let result = match reader.read_u8()? {
			i @ 0..=0xfc => i.into(),
			0xfd => reader.read_u16::<LittleEndian>()?.into(),
			0xfe => reader.read_u32::<LittleEndian>()?.into(),
			_ => reader.read_u64::<LittleEndian>()?.into(),
		};

		Ok(result)
	}
}
