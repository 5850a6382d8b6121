use bitcrypto::SHA256D;
use message::types::Version;
use std::net::SocketAddr;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone)]
pub struct Config {
	/// Protocol version we speak.
	pub protocol_version: u32,
	/// Oldest protocol version we still talk to.
	pub protocol_minimum: u32,
	/// Address the listener binds to.
	pub local_address: SocketAddr,
	/// Connect to these peers on startup.
	pub peers: Vec<SocketAddr>,
	pub user_agent: String,
}

impl Config {
	/// Version message for a fresh connection. The nonce is drawn per
	/// connection so self-connections are detectable.
	pub fn version(&self, best_share_hash: SHA256D) -> Version {
		Version {
			version: self.protocol_version,
			services: 0,
			timestamp: SystemTime::now()
				.duration_since(UNIX_EPOCH)
				.map(|duration| duration.as_secs() as i64)
				.unwrap_or_default(),
			nonce: rand::random(),
			user_agent: self.user_agent.clone(),
			best_share_hash,
		}
	}
}
