use crate::block_template::BlockTemplate;
use crate::task::{build_task, StratumParams};
use bitcrypto::SHA256D;
use parking_lot::Mutex;
use primitives::bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use sharechain::merkle::merkle_root;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;

/// Downstream transport the serialized tasks are handed to. Treated as a
/// black box that may come up after the first templates arrive.
pub trait TaskPublisher: Send + Sync {
	fn is_ready(&self) -> bool;
	fn publish(&self, task: &TaskMessage);
}

/// Daemon watcher seam: something that can be asked to fetch a fresh block
/// template.
pub trait DaemonWatcher: Send + Sync {
	fn refresh_mining_info(&self);
}

/// Stratum-ready task message, JSON-serialized for the publisher.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskMessage {
	pub task_id: String,
	pub coinbase_tx: [String; 2],
	pub stratum_params: StratumParams,
	pub previous_block_hash: String,
	pub height: u32,
	pub merkle_link: Vec<String>,
	pub template: Value,
}

struct ServerState {
	last_template_identity: Option<SHA256D>,
	last_notified_hash: Option<String>,
	task_counter: u64,
}

/// Converts incoming block templates into tasks and pushes them downstream.
pub struct TaskServer {
	publisher: Arc<dyn TaskPublisher>,
	watcher: Arc<dyn DaemonWatcher>,
	payout_script: Bytes,
	state: Mutex<ServerState>,
}

impl TaskServer {
	pub fn new(publisher: Arc<dyn TaskPublisher>, watcher: Arc<dyn DaemonWatcher>, payout_script: Bytes) -> TaskServer {
		TaskServer {
			publisher,
			watcher,
			payout_script,
			state: Mutex::new(ServerState {
				last_template_identity: None,
				last_notified_hash: None,
				task_counter: 0,
			}),
		}
	}

	/// Builds and publishes a task for a fresh template. Templates repeating
	/// the last identity and templates arriving before the publisher is ready
	/// are dropped; the post-ready refresh covers the latter.
	pub fn on_template_updated(&self, template: &BlockTemplate) {
		if !self.publisher.is_ready() {
			debug!("publisher not ready, dropping template at height {}", template.height);
			return;
		}

		let identity = template.identity();
		let job_id = {
			let mut state = self.state.lock();
			if state.last_template_identity == Some(identity) {
				trace!("template at height {} unchanged, not republishing", template.height);
				return;
			}
			state.last_template_identity = Some(identity);
			state.task_counter += 1;
			state.task_counter
		};

		let aux_hashes: Vec<SHA256D> = template.auxes.iter().map(|aux| aux.hash).collect();
		let aux_root = merkle_root(&aux_hashes);

		let task = build_task(template, aux_root, aux_hashes.len(), &self.payout_script, job_id, true);

		let message = TaskMessage {
			task_id: task.task_id.clone(),
			coinbase_tx: [format!("{}", task.coinbase_part1), format!("{}", task.coinbase_part2)],
			stratum_params: task.stratum.clone(),
			previous_block_hash: task.previous_block_hash.to_string(),
			height: task.height,
			merkle_link: task.stratum.merkle_branch.clone(),
			template: template.raw.clone(),
		};

		info!("publishing task {} for height {}", message.task_id, message.height);
		self.publisher.publish(&message);
	}

	/// The publisher signalled readiness: refresh so the first broadcast is
	/// deliverable.
	pub fn on_publisher_ready(&self) {
		self.watcher.refresh_mining_info();
	}

	/// One block-notify delivery. Empty payloads and repeats of the last seen
	/// hash are no-ops.
	pub fn on_block_notify(&self, hash: &str) {
		let hash = hash.trim();
		if hash.is_empty() {
			return;
		}

		{
			let mut state = self.state.lock();
			if state.last_notified_hash.as_deref() == Some(hash) {
				trace!("duplicate block notify {}", hash);
				return;
			}
			state.last_notified_hash = Some(hash.to_owned());
		}

		debug!("block notify {}", hash);
		self.watcher.refresh_mining_info();
	}

	/// Plain TCP listener for daemon block notifications: every accepted
	/// connection delivers a single hash string and is closed.
	pub async fn run_block_notify_listener(self: Arc<Self>, address: SocketAddr) {
		let listener = match TcpListener::bind(&address).await {
			Ok(listener) => listener,
			Err(err) => {
				error!("unable to bind block notify listener to {}: {}", address, err);
				return;
			}
		};

		info!("listening for block notifications on {}", address);
		loop {
			match listener.accept().await {
				Ok((stream, _)) => {
					let server = self.clone();
					tokio::spawn(async move {
						let mut payload = Vec::new();
						if stream.take(128).read_to_end(&mut payload).await.is_ok() {
							server.on_block_notify(&String::from_utf8_lossy(&payload));
						}
					});
				}
				Err(_) => { /* connection failed */ }
			}
		}
	}
}
