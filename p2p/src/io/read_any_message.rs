use crate::bytes::Bytes;
use crate::io::{read_header, Error, SharedTcpStream};
use message::{Command, Error as MessageError};
use network::Magic;
use primitives::checksum::Checksum;

/// Largest payload a peer may send in a single message.
pub const MAX_MESSAGE_LEN: u32 = 8 * 1024 * 1024;

pub async fn read_any_message(a: &SharedTcpStream, magic: Magic) -> Result<(Command, Bytes), Error> {
	let header = read_header(a, magic).await?;
	if header.len > MAX_MESSAGE_LEN {
		return Err(MessageError::Deserialize.into());
	}

	let mut buf = Bytes::new_with_len(header.len as usize);
	a.read_exact(buf.as_mut()).await?;

	if Checksum::generate(&buf) != header.checksum {
		return Err(MessageError::InvalidChecksum.into());
	}
	Ok((header.command, buf))
}
