use crate::types::MAX_TX_HASHES;
use crate::{MessageResult, Payload};
use bitcrypto::SHA256D;
use ser::{Reader, Stream};
use std::io;

/// Releases transactions previously pinned with `remember_tx`. `total_size`
/// is the sender's accounting of the raw bytes freed.
#[derive(Debug, PartialEq, Default, Clone)]
pub struct ForgetTx {
	pub tx_hashes: Vec<SHA256D>,
	pub total_size: u64,
}

impl Payload for ForgetTx {
	fn version() -> u32 {
		0
	}

	fn command() -> &'static str {
		"forget_tx"
	}

	fn deserialize_payload<T>(reader: &mut Reader<T>, _version: u32) -> MessageResult<Self>
	where
		T: io::Read,
	{
		let forget_tx = ForgetTx {
			tx_hashes: reader.read_list_max(MAX_TX_HASHES)?,
			total_size: reader.read()?,
		};

		Ok(forget_tx)
	}

	fn serialize_payload(&self, stream: &mut Stream, _version: u32) -> MessageResult<()> {
		stream.append_list::<SHA256D, SHA256D>(&self.tx_hashes).append(&self.total_size);
		Ok(())
	}
}
