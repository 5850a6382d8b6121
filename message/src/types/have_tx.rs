use crate::types::MAX_TX_HASHES;
use crate::{MessageResult, Payload};
use bitcrypto::SHA256D;
use ser::{Reader, Stream};
use std::io;

/// Advertises transactions the sender knows in full.
#[derive(Debug, PartialEq, Default, Clone)]
pub struct HaveTx {
	pub tx_hashes: Vec<SHA256D>,
}

impl Payload for HaveTx {
	fn version() -> u32 {
		0
	}

	fn command() -> &'static str {
		"have_tx"
	}

	fn deserialize_payload<T>(reader: &mut Reader<T>, _version: u32) -> MessageResult<Self>
	where
		T: io::Read,
	{
		let have_tx = HaveTx {
			tx_hashes: reader.read_list_max(MAX_TX_HASHES)?,
		};

		Ok(have_tx)
	}

	fn serialize_payload(&self, stream: &mut Stream, _version: u32) -> MessageResult<()> {
		stream.append_list::<SHA256D, SHA256D>(&self.tx_hashes);
		Ok(())
	}
}
