use crate::compact_integer::CompactInteger;
use primitives::U256;
use std::{cmp, io};

pub fn deserialize<R, T>(buffer: R) -> Result<T, Error>
where
	R: io::Read,
	T: Deserializable,
{
	let mut reader = Reader::from_read(buffer);
	let result = reader.read()?;

	if reader.is_finished() {
		Ok(result)
	} else {
		Err(Error::UnreadData)
	}
}

#[derive(Debug, PartialEq)]
pub enum Error {
	MalformedData,
	UnexpectedEnd,
	UnreadData,
}

impl Error {
	fn description(&self) -> &str {
		match *self {
			Error::MalformedData => "malformed data",
			Error::UnexpectedEnd => "unexpected end",
			Error::UnreadData => "unread data",
		}
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "Deserialisation error: {}", &self.description())
	}
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
	fn from(_: io::Error) -> Self {
		Error::UnexpectedEnd
	}
}

pub trait Deserializable {
	fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, Error>
	where
		Self: Sized,
		T: io::Read;
}

/// Wire structures reader.
#[derive(Debug)]
pub struct Reader<T> {
	buffer: T,
	peeked: Vec<u8>,
}

impl<'a> Reader<&'a [u8]> {
	/// Convenient way of creating for slice of bytes
	pub fn new(buffer: &'a [u8]) -> Self {
		Reader {
			buffer,
			peeked: Vec::new(),
		}
	}
}

impl<T> io::Read for Reader<T>
where
	T: io::Read,
{
	fn read(&mut self, buf: &mut [u8]) -> Result<usize, io::Error> {
		if buf.is_empty() {
			Ok(0)
		} else if self.peeked.is_empty() {
			io::Read::read(&mut self.buffer, buf)
		} else {
			let from_peeked = cmp::min(buf.len(), self.peeked.len());
			buf[..from_peeked].copy_from_slice(&self.peeked[..from_peeked]);
			self.peeked.drain(..from_peeked);

			let mut wrote = from_peeked;
			if buf.len() > wrote {
				wrote += io::Read::read(&mut self.buffer, &mut buf[wrote..])?;
			}
			Ok(wrote)
		}
	}
}

impl<R> Reader<R>
where
	R: io::Read,
{
	pub fn from_read(read: R) -> Self {
		Reader {
			buffer: read,
			peeked: Vec::new(),
		}
	}

	pub fn read<T>(&mut self) -> Result<T, Error>
	where
		T: Deserializable,
	{
		T::deserialize(self)
	}

	pub fn read_slice(&mut self, bytes: &mut [u8]) -> Result<(), Error> {
		io::Read::read_exact(self, bytes).map_err(|_| Error::UnexpectedEnd)
	}

	pub fn read_list<T>(&mut self) -> Result<Vec<T>, Error>
	where
		T: Deserializable,
	{
		let len: usize = self.read::<CompactInteger>()?.into();
		let mut result = Vec::with_capacity(cmp::min(len, 1024));

		for _ in 0..len {
			result.push(self.read()?);
		}

		Ok(result)
	}

	pub fn read_list_max<T>(&mut self, max: usize) -> Result<Vec<T>, Error>
	where
		T: Deserializable,
	{
		let len: usize = self.read::<CompactInteger>()?.into();
		if len > max {
			return Err(Error::MalformedData);
		}

		let mut result = Vec::with_capacity(len);

		for _ in 0..len {
			result.push(self.read()?);
		}

		Ok(result)
	}

	/// Little-endian unsigned integer of an arbitrary byte width up to 32.
	pub fn read_uint_le(&mut self, width: usize) -> Result<U256, Error> {
		assert!(width <= 32);
		let mut buf = [0u8; 32];
		self.read_slice(&mut buf[..width])?;
		Ok(U256::from_little_endian(&buf[..width]))
	}

	#[cfg_attr(feature = "cargo-clippy", allow(wrong_self_convention))]
	pub fn is_finished(&mut self) -> bool {
		if !self.peeked.is_empty() {
			return false;
		}

		let peek = &mut [0u8; 1];
		match self.read_slice(peek) {
			Ok(_) => {
				self.peeked = Vec::from(peek.as_ref());
				false
			}
			Err(_) => true,
		}
	}
}
