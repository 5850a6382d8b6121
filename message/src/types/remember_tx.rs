use crate::types::MAX_TX_HASHES;
use crate::{MessageResult, Payload};
use bitcrypto::SHA256D;
use primitives::bytes::Bytes;
use ser::{Reader, Stream};
use std::io;

/// Asks the receiver to pin transactions on the sender's behalf: `tx_hashes`
/// reference transactions the receiver already knows, `txs` carry full raw
/// transactions.
#[derive(Debug, PartialEq, Default, Clone)]
pub struct RememberTx {
	pub tx_hashes: Vec<SHA256D>,
	pub txs: Vec<Bytes>,
}

impl Payload for RememberTx {
	fn version() -> u32 {
		0
	}

	fn command() -> &'static str {
		"remember_tx"
	}

	fn deserialize_payload<T>(reader: &mut Reader<T>, _version: u32) -> MessageResult<Self>
	where
		T: io::Read,
	{
		let remember_tx = RememberTx {
			tx_hashes: reader.read_list_max(MAX_TX_HASHES)?,
			txs: reader.read_list_max(MAX_TX_HASHES)?,
		};

		Ok(remember_tx)
	}

	fn serialize_payload(&self, stream: &mut Stream, _version: u32) -> MessageResult<()> {
		stream
			.append_list::<SHA256D, SHA256D>(&self.tx_hashes)
			.append_list::<Bytes, Bytes>(&self.txs);
		Ok(())
	}
}
