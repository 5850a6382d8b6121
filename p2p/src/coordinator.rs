use crate::node::Node;
use bitcrypto::SHA256D;
use linked_hash_map::LinkedHashMap;
use message::types::{ForgetTx, HaveTx, LosingTx, RememberTx};
use message::{deserialize_payload, Command, Payload};
use network::Params;
use parking_lot::Mutex;
use sharechain::TransactionTemplate;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::{error, fmt};

/// Number of forgotten-transaction snapshots kept around to absorb reordering
/// between in-flight `losing_tx` and `remember_tx` messages.
pub const KNOWN_TXS_CACHE_DEPTH: usize = 10;

/// Violation of the transaction-awareness protocol. The offending peer is
/// disconnected with fatal disposition.
#[derive(Debug, PartialEq)]
pub enum ProtocolError {
	/// Peer referenced the same transaction twice in remember_tx.
	DoubleRememberedTx(SHA256D),
	/// Peer referenced a transaction we do not know and have not recently
	/// forgotten.
	UnknownTx(SHA256D),
	/// Peer asked to forget a transaction it never asked to remember.
	UnknownForgottenTx(SHA256D),
	/// Malformed payload.
	Message(message::Error),
}

impl From<message::Error> for ProtocolError {
	fn from(err: message::Error) -> Self {
		ProtocolError::Message(err)
	}
}

impl fmt::Display for ProtocolError {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			ProtocolError::DoubleRememberedTx(hash) => write!(f, "transaction {} remembered twice", hash),
			ProtocolError::UnknownTx(hash) => write!(f, "reference to unknown transaction {}", hash),
			ProtocolError::UnknownForgottenTx(hash) => write!(f, "forget_tx for unremembered transaction {}", hash),
			ProtocolError::Message(err) => write!(f, "malformed payload: {}", err),
		}
	}
}

impl error::Error for ProtocolError {}

struct State {
	peers: HashMap<String, Arc<Node>>,
	known_txs: LinkedHashMap<SHA256D, TransactionTemplate>,
	mining_txs: LinkedHashMap<SHA256D, TransactionTemplate>,
	known_txs_caches: VecDeque<LinkedHashMap<SHA256D, TransactionTemplate>>,
}

/// Keeps the shared view of pending transactions synchronized across the peer
/// set. Commits to the transaction maps diff against the previous value and
/// broadcast the difference before the committing call returns.
pub struct PeerCoordinator {
	params: Params,
	state: Mutex<State>,
}

impl PeerCoordinator {
	pub fn new(params: Params) -> PeerCoordinator {
		PeerCoordinator {
			params,
			state: Mutex::new(State {
				peers: HashMap::new(),
				known_txs: LinkedHashMap::new(),
				mining_txs: LinkedHashMap::new(),
				known_txs_caches: VecDeque::new(),
			}),
		}
	}

	pub fn params(&self) -> &Params {
		&self.params
	}

	/// Registers a peer whose version has been verified and brings it up to
	/// date: all known hashes, then the full mining set to pin.
	pub fn register(&self, node: Arc<Node>) {
		let mut state = self.state.lock();

		info!("registering peer {}", node.tag());

		node.send(&HaveTx {
			tx_hashes: state.known_txs.keys().cloned().collect(),
		});
		node.send(&RememberTx {
			tx_hashes: Vec::new(),
			txs: state.mining_txs.values().filter_map(TransactionTemplate::raw).collect(),
		});

		state.peers.insert(node.tag().to_owned(), node);
	}

	/// Drops a peer along with its remembered-transaction state.
	pub fn remove(&self, tag: &str) -> Option<Arc<Node>> {
		let node = self.state.lock().peers.remove(tag);
		if node.is_some() {
			info!("removed peer {}", tag);
		}
		node
	}

	pub fn peer(&self, tag: &str) -> Option<Arc<Node>> {
		self.state.lock().peers.get(tag).cloned()
	}

	pub fn peer_count(&self) -> usize {
		self.state.lock().peers.len()
	}

	/// Dispatches a command received from a verified peer. An error means the
	/// peer violated the protocol and must be disconnected.
	pub fn on_message(&self, node: &Arc<Node>, command: Command, payload: &[u8]) -> Result<(), ProtocolError> {
		if command == HaveTx::command() {
			let message: HaveTx = deserialize_payload(payload, 0)?;
			node.note_remote_tx_hashes(&message.tx_hashes);
			Ok(())
		} else if command == LosingTx::command() {
			let message: LosingTx = deserialize_payload(payload, 0)?;
			node.forget_remote_tx_hashes(&message.tx_hashes);
			Ok(())
		} else if command == RememberTx::command() {
			let message: RememberTx = deserialize_payload(payload, 0)?;
			self.on_remember_tx(node, message)
		} else if command == ForgetTx::command() {
			let message: ForgetTx = deserialize_payload(payload, 0)?;
			self.on_forget_tx(node, message)
		} else {
			trace!("ignoring {} message from {}", command, node.tag());
			Ok(())
		}
	}

	fn on_remember_tx(&self, node: &Arc<Node>, message: RememberTx) -> Result<(), ProtocolError> {
		let mut state = self.state.lock();
		let mut working = state.known_txs.clone();
		let mut seen = HashSet::new();

		for hash in &message.tx_hashes {
			if !seen.insert(*hash) || node.remembers(hash) {
				return Err(ProtocolError::DoubleRememberedTx(*hash));
			}

			let template = state
				.known_txs
				.get(hash)
				.cloned()
				// scan the most recently forgotten snapshots first
				.or_else(|| state.known_txs_caches.iter().rev().find_map(|cache| cache.get(hash).cloned()))
				.ok_or(ProtocolError::UnknownTx(*hash))?;

			node.remember(*hash, template);
		}

		for raw in &message.txs {
			let template = TransactionTemplate::from_raw(raw);
			let hash = template.identity();

			if !seen.insert(hash) || node.remembers(&hash) {
				return Err(ProtocolError::DoubleRememberedTx(hash));
			}

			node.remember(hash, template.clone());
			working.insert(hash, template);
		}

		self.set_known_txs(&mut state, working);
		Ok(())
	}

	fn on_forget_tx(&self, node: &Arc<Node>, message: ForgetTx) -> Result<(), ProtocolError> {
		let mut freed = 0u64;
		for hash in &message.tx_hashes {
			match node.forget(hash) {
				Some(size) => freed += size as u64,
				None => return Err(ProtocolError::UnknownForgottenTx(*hash)),
			}
		}

		if freed != message.total_size {
			warn!(
				"forget_tx accounting mismatch from {}: claimed {}, freed {}",
				node.tag(),
				message.total_size,
				freed
			);
		}
		Ok(())
	}

	/// Replaces the mining set from a fresh block template and merges its
	/// transactions into the known set. Known transactions that are neither
	/// mined against nor pinned for any peer are forgotten in the same
	/// commit. Both commits broadcast their diffs before this returns.
	pub fn update_gbt(&self, transactions: &[TransactionTemplate]) {
		let mut state = self.state.lock();

		let mut mining = LinkedHashMap::new();
		for template in transactions {
			mining.insert(template.identity(), template.clone());
		}

		let mut known = state.known_txs.clone();
		for template in transactions {
			known.insert(template.identity(), template.clone());
		}
		let known = known
			.into_iter()
			.filter(|(hash, _)| mining.contains_key(hash) || state.peers.values().any(|node| node.remembers(hash)))
			.collect();

		self.set_mining_txs(&mut state, mining);
		self.set_known_txs(&mut state, known);
	}

	/// Commit-then-broadcast for the known set: peers learn which hashes
	/// appeared and which went away, and the removed entries join the
	/// forgotten-snapshot ring.
	fn set_known_txs(&self, state: &mut State, new: LinkedHashMap<SHA256D, TransactionTemplate>) {
		let added: Vec<SHA256D> = new.keys().filter(|hash| !state.known_txs.contains_key(*hash)).cloned().collect();
		let removed: LinkedHashMap<SHA256D, TransactionTemplate> = state
			.known_txs
			.iter()
			.filter(|(hash, _)| !new.contains_key(*hash))
			.map(|(hash, template)| (*hash, template.clone()))
			.collect();

		if !added.is_empty() {
			broadcast(&state.peers, &HaveTx { tx_hashes: added });
		}
		if !removed.is_empty() {
			broadcast(
				&state.peers,
				&LosingTx {
					tx_hashes: removed.keys().cloned().collect(),
				},
			);
		}

		state.known_txs_caches.push_back(removed);
		if state.known_txs_caches.len() > KNOWN_TXS_CACHE_DEPTH {
			state.known_txs_caches.pop_front();
		}

		state.known_txs = new;
	}

	/// Commit-then-broadcast for the mining set: every peer is asked to pin
	/// the additions (by hash when it already knows the transaction, in full
	/// otherwise) and to release the removals.
	fn set_mining_txs(&self, state: &mut State, new: LinkedHashMap<SHA256D, TransactionTemplate>) {
		let added: Vec<(SHA256D, TransactionTemplate)> = new
			.iter()
			.filter(|(hash, _)| !state.mining_txs.contains_key(*hash))
			.map(|(hash, template)| (*hash, template.clone()))
			.collect();
		let removed: Vec<(SHA256D, TransactionTemplate)> = state
			.mining_txs
			.iter()
			.filter(|(hash, _)| !new.contains_key(*hash))
			.map(|(hash, template)| (*hash, template.clone()))
			.collect();

		if !added.is_empty() {
			for node in state.peers.values() {
				let mut tx_hashes = Vec::new();
				let mut txs = Vec::new();
				for (hash, template) in &added {
					if node.has_remote_tx_hash(hash) {
						tx_hashes.push(*hash);
					} else if let Some(raw) = template.raw() {
						txs.push(raw);
					} else {
						warn!("mining tx {} has undecodable data, not relayed to {}", hash, node.tag());
					}
				}

				if !node.send(&RememberTx { tx_hashes, txs }) {
					debug!("failed to queue remember_tx to {}", node.tag());
				}
			}
		}

		if !removed.is_empty() {
			let total_size: u64 = removed.iter().map(|(_, template)| template.size() as u64).sum();
			broadcast(
				&state.peers,
				&ForgetTx {
					tx_hashes: removed.iter().map(|(hash, _)| *hash).collect(),
					total_size,
				},
			);
		}

		state.mining_txs = new;
	}

	pub fn contains_known_tx(&self, hash: &SHA256D) -> bool {
		self.state.lock().known_txs.contains_key(hash)
	}

	pub fn known_tx_count(&self) -> usize {
		self.state.lock().known_txs.len()
	}

	pub fn mining_tx_count(&self) -> usize {
		self.state.lock().mining_txs.len()
	}

	pub fn caches_len(&self) -> usize {
		self.state.lock().known_txs_caches.len()
	}

	/// True while the hash sits in some forgotten-transaction snapshot.
	pub fn recently_forgotten(&self, hash: &SHA256D) -> bool {
		self.state.lock().known_txs_caches.iter().any(|cache| cache.contains_key(hash))
	}
}

/// Best-effort fanout: a peer with a dead connection is skipped, never an
/// abort of the loop.
fn broadcast<T>(peers: &HashMap<String, Arc<Node>>, payload: &T)
where
	T: Payload,
{
	for node in peers.values() {
		if !node.send(payload) {
			debug!("failed to queue {} to {}", T::command(), node.tag());
		}
	}
}
