//! Template feed: the external daemon watcher connects here, streams block
//! templates as JSON lines and accepts refresh requests back on the same
//! connection.

use miner::{BlockTemplate, DaemonWatcher, TaskServer};
use p2p::PeerCoordinator;
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

/// Daemon watcher handle backed by the currently connected feed. Refresh
/// requests while no watcher is connected are dropped; the watcher resyncs on
/// reconnect anyway.
pub struct FeedWatcher {
	control: Mutex<Option<UnboundedSender<String>>>,
}

impl FeedWatcher {
	pub fn new() -> FeedWatcher {
		FeedWatcher {
			control: Mutex::new(None),
		}
	}

	fn attach(&self, sender: UnboundedSender<String>) {
		*self.control.lock() = Some(sender);
	}

	fn detach(&self) {
		*self.control.lock() = None;
	}
}

impl DaemonWatcher for FeedWatcher {
	fn refresh_mining_info(&self) {
		match &*self.control.lock() {
			Some(sender) => {
				let _ = sender.send("refresh".to_owned());
			}
			None => debug!("refresh requested while no daemon watcher is connected"),
		}
	}
}

/// Serves the template feed. A single watcher connection is active at a time;
/// a newer connection replaces the control channel of the previous one.
pub async fn listen(address: SocketAddr, watcher: Arc<FeedWatcher>, server: Arc<TaskServer>, coordinator: Arc<PeerCoordinator>) {
	let listener = match TcpListener::bind(&address).await {
		Ok(listener) => listener,
		Err(err) => {
			error!("unable to bind template feed to {}: {}", address, err);
			return;
		}
	};

	info!("listening for block templates on {}", address);
	loop {
		match listener.accept().await {
			Ok((stream, peer)) => {
				info!("daemon watcher connected from {}", peer);

				let (read_half, mut write_half) = stream.into_split();
				let (control, mut control_receiver) = unbounded_channel::<String>();
				watcher.attach(control);

				tokio::spawn(async move {
					while let Some(line) = control_receiver.recv().await {
						if write_half.write_all(format!("{}\n", line).as_bytes()).await.is_err() {
							break;
						}
					}
				});

				let mut lines = BufReader::new(read_half).lines();
				loop {
					match lines.next_line().await {
						Ok(Some(line)) => {
							if line.trim().is_empty() {
								continue;
							}
							handle_template_line(&line, &server, &coordinator);
						}
						Ok(None) | Err(_) => break,
					}
				}

				watcher.detach();
				info!("daemon watcher {} disconnected", peer);
			}
			Err(_) => { /* connection failed */ }
		}
	}
}

fn handle_template_line(line: &str, server: &Arc<TaskServer>, coordinator: &Arc<PeerCoordinator>) {
	let value: serde_json::Value = match serde_json::from_str(line) {
		Ok(value) => value,
		Err(err) => {
			info!("discarding malformed template line: {}", err);
			return;
		}
	};

	let template = match BlockTemplate::from_json(&value) {
		Ok(template) => template,
		Err(err) => {
			info!("discarding invalid block template: {}", err);
			return;
		}
	};

	debug!(
		"block template at height {} with {} transactions",
		template.height,
		template.transactions.len()
	);

	// the same template feeds both the task pipeline and the tx gossip
	coordinator.update_gbt(&template.transactions);
	server.on_template_updated(&template);
}
