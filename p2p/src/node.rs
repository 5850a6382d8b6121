use crate::bytes::Bytes;
use bitcrypto::SHA256D;
use linked_hash_map::LinkedHashMap;
use message::types::Version;
use message::{Message, Payload};
use network::Magic;
use parking_lot::Mutex;
use sharechain::TransactionTemplate;
use std::collections::HashSet;
use tokio::sync::mpsc::UnboundedSender;

/// One connected peer.
///
/// Outbound messages are queued on an unbounded channel drained by the
/// connection's writer task, so sends from the coordinator never block and
/// stay FIFO per peer.
pub struct Node {
	tag: String,
	magic: Magic,
	negotiated_version: u32,
	version: Version,
	sender: UnboundedSender<Bytes>,
	state: Mutex<NodeState>,
}

#[derive(Default)]
struct NodeState {
	/// Transactions the remote asked us to pin on its behalf.
	remembered_txs: LinkedHashMap<SHA256D, TransactionTemplate>,
	remembered_size: usize,
	/// Hashes the remote has advertised as known.
	remote_tx_hashes: HashSet<SHA256D>,
}

impl Node {
	pub fn new(tag: String, magic: Magic, negotiated_version: u32, version: Version, sender: UnboundedSender<Bytes>) -> Node {
		Node {
			tag,
			magic,
			negotiated_version,
			version,
			sender,
			state: Mutex::new(NodeState::default()),
		}
	}

	/// Peer tag in `host:port` form.
	pub fn tag(&self) -> &str {
		&self.tag
	}

	pub fn version(&self) -> &Version {
		&self.version
	}

	/// Queues a message for delivery. Returns false when the connection's
	/// writer is gone; the caller treats that as a dead peer, not an error.
	pub fn send<T>(&self, payload: &T) -> bool
	where
		T: Payload,
	{
		let message = match Message::new(self.magic, self.negotiated_version, payload) {
			Ok(message) => message,
			Err(err) => {
				warn!("failed to serialize {} message for {}: {}", T::command(), self.tag, err);
				return false;
			}
		};

		self.sender.send(message.into_raw()).is_ok()
	}

	pub fn note_remote_tx_hashes(&self, hashes: &[SHA256D]) {
		let mut state = self.state.lock();
		state.remote_tx_hashes.extend(hashes.iter().cloned());
	}

	pub fn forget_remote_tx_hashes(&self, hashes: &[SHA256D]) {
		let mut state = self.state.lock();
		for hash in hashes {
			state.remote_tx_hashes.remove(hash);
		}
	}

	pub fn has_remote_tx_hash(&self, hash: &SHA256D) -> bool {
		self.state.lock().remote_tx_hashes.contains(hash)
	}

	pub fn remembers(&self, hash: &SHA256D) -> bool {
		self.state.lock().remembered_txs.contains_key(hash)
	}

	/// Pins a transaction for the remote. Returns false on a double insert.
	pub fn remember(&self, hash: SHA256D, template: TransactionTemplate) -> bool {
		let mut state = self.state.lock();
		if state.remembered_txs.contains_key(&hash) {
			return false;
		}
		state.remembered_size += template.size();
		state.remembered_txs.insert(hash, template);
		true
	}

	/// Releases a pinned transaction, returning its accounted size.
	pub fn forget(&self, hash: &SHA256D) -> Option<usize> {
		let mut state = self.state.lock();
		let template = state.remembered_txs.remove(hash)?;
		let size = template.size();
		state.remembered_size -= size;
		Some(size)
	}

	pub fn remembered_size(&self) -> usize {
		self.state.lock().remembered_size
	}

	pub fn remembered_count(&self) -> usize {
		self.state.lock().remembered_txs.len()
	}
}
