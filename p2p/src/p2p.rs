use crate::bytes::Bytes;
use crate::coordinator::PeerCoordinator;
use crate::io::{accept_handshake, handshake, read_any_message, SharedTcpStream};
use crate::node::Node;
use crate::Config;
use bitcrypto::SHA256D;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

#[derive(Clone, Copy)]
enum Direction {
	Inbound,
	Outbound,
}

/// Peer network driver: accepts and dials peers, runs the handshake and feeds
/// verified connections into the coordinator.
pub struct P2P {
	config: Config,
	coordinator: Arc<PeerCoordinator>,
}

impl P2P {
	pub fn new(config: Config, coordinator: Arc<PeerCoordinator>) -> P2P {
		P2P { config, coordinator }
	}

	pub fn coordinator(&self) -> &Arc<PeerCoordinator> {
		&self.coordinator
	}

	/// Dials the configured peers and serves inbound connections until the
	/// listener fails.
	pub async fn run(self) {
		for peer in self.config.peers.clone() {
			self.connect(peer);
		}

		self.listen().await;
	}

	pub fn connect(&self, address: SocketAddr) {
		let config = self.config.clone();
		let coordinator = self.coordinator.clone();

		tokio::spawn(async move {
			trace!("trying to connect to {}", address);
			match SharedTcpStream::connect(&address).await {
				Ok(stream) => {
					Self::handle_connection(coordinator, config, stream, address, Direction::Outbound).await;
				}
				Err(err) => {
					debug!("failed to connect to {}: {}", address, err);
				}
			}
		});
	}

	async fn listen(self) {
		let listener = match TcpListener::bind(&self.config.local_address).await {
			Ok(listener) => listener,
			Err(err) => {
				error!("unable to bind p2p listener to {}: {}", self.config.local_address, err);
				return;
			}
		};

		info!("listening for peers on {}", self.config.local_address);
		loop {
			match listener.accept().await {
				Ok((stream, address)) => {
					let config = self.config.clone();
					let coordinator = self.coordinator.clone();
					tokio::spawn(async move {
						Self::handle_connection(coordinator, config, stream.into(), address, Direction::Inbound).await;
					});
				}
				Err(_) => { /* connection failed */ }
			}
		}
	}

	async fn handle_connection(
		coordinator: Arc<PeerCoordinator>,
		config: Config,
		stream: SharedTcpStream,
		address: SocketAddr,
		direction: Direction,
	) {
		let magic = coordinator.params().magic;
		let version = config.version(SHA256D::default());

		let result = match direction {
			Direction::Outbound => handshake(&stream, magic, version, config.protocol_minimum).await,
			Direction::Inbound => accept_handshake(&stream, magic, version, config.protocol_minimum).await,
		};

		let handshake_result = match result {
			Ok(result) => result,
			Err(err) => {
				debug!("handshake with {} failed: {}", address, err);
				return;
			}
		};

		trace!("verified version of {}: {:?}", address, handshake_result.version);

		let (sender, receiver) = unbounded_channel();
		let node = Arc::new(Node::new(
			format!("{}", address),
			magic,
			handshake_result.negotiated_version,
			handshake_result.version,
			sender,
		));

		Self::spawn_writer(stream.clone(), receiver);
		coordinator.register(node.clone());

		loop {
			match read_any_message(&stream, magic).await {
				Ok((command, payload)) => match coordinator.on_message(&node, command, &payload) {
					Ok(()) => {}
					Err(err) => {
						warn!("fatal protocol violation from {}: {}", node.tag(), err);
						break;
					}
				},
				Err(err) => {
					debug!("connection to {} closed: {}", node.tag(), err);
					break;
				}
			}
		}

		coordinator.remove(node.tag());
		stream.shutdown().await;
	}

	/// Drains a node's outbound queue onto its socket, preserving the send
	/// order the coordinator produced.
	fn spawn_writer(stream: SharedTcpStream, mut receiver: UnboundedReceiver<Bytes>) {
		tokio::spawn(async move {
			while let Some(bytes) = receiver.recv().await {
				if stream.write_all(&bytes).await.is_err() {
					break;
				}
			}
		});
	}
}
