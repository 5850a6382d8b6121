use bitcrypto::{dhash256, SHA256D};
use primitives::bytes::Bytes;

/// Pending transaction as carried in block templates and peer gossip.
///
/// `txid` and `hash` coincide for non-segwit transactions and differ for
/// segwit ones; `data` is the raw transaction in hex.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionTemplate {
	pub txid: Option<SHA256D>,
	pub hash: SHA256D,
	pub data: String,
}

impl TransactionTemplate {
	/// Builds a template from raw transaction bytes received from a peer. The
	/// daemon is not consulted, so the transaction is keyed by its plain
	/// double-sha256.
	pub fn from_raw(raw: &Bytes) -> TransactionTemplate {
		TransactionTemplate {
			txid: None,
			hash: dhash256(raw),
			data: format!("{}", raw),
		}
	}

	/// Stable identity key: the txid when the daemon supplied one, the hash
	/// otherwise.
	pub fn identity(&self) -> SHA256D {
		self.txid.unwrap_or(self.hash)
	}

	/// Serialized size in bytes.
	pub fn size(&self) -> usize {
		self.data.len() / 2
	}

	pub fn raw(&self) -> Option<Bytes> {
		self.data.parse().ok()
	}
}
