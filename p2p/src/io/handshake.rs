use crate::io::Error;
use crate::io::{read_message, write_message, SharedTcpStream};
use message::types::Version;
use message::{Error as MessageError, Message};
use network::Magic;
use std::cmp;

/// Outbound handshake: send our version, wait for the peer's.
pub async fn handshake(a: &SharedTcpStream, magic: Magic, version: Version, min_version: u32) -> Result<HandshakeResult, Error> {
	write_message(a, version_message(magic, &version)).await?;

	let peer_version: Version = read_message(a, magic, 0).await?;
	verify_peer_version(&version, &peer_version, min_version)?;

	Ok(HandshakeResult {
		negotiated_version: negotiate_version(version.version, peer_version.version),
		version: peer_version,
	})
}

/// Inbound handshake: wait for the peer's version, then answer with ours.
pub async fn accept_handshake(a: &SharedTcpStream, magic: Magic, version: Version, min_version: u32) -> Result<HandshakeResult, Error> {
	let peer_version: Version = read_message(a, magic, 0).await?;
	verify_peer_version(&version, &peer_version, min_version)?;

	write_message(a, version_message(magic, &version)).await?;

	Ok(HandshakeResult {
		negotiated_version: negotiate_version(version.version, peer_version.version),
		version: peer_version,
	})
}

fn verify_peer_version(local: &Version, peer: &Version, min_version: u32) -> Result<(), Error> {
	if peer.version < min_version {
		return Err(MessageError::InvalidVersion.into());
	}
	// matching nonces mean we connected to ourselves
	if local.nonce == peer.nonce {
		return Err(MessageError::InvalidVersion.into());
	}
	Ok(())
}

pub fn negotiate_version(local: u32, other: u32) -> u32 {
	cmp::min(local, other)
}

#[derive(Debug, PartialEq)]
pub struct HandshakeResult {
	pub version: Version,
	pub negotiated_version: u32,
}

fn version_message(magic: Magic, version: &Version) -> Message<Version> {
	Message::new(magic, version.version, version).expect("version message should always be serialized correctly")
}

#[cfg(test)]
mod tests {
	use super::{accept_handshake, handshake, HandshakeResult};
	use crate::io::shared_tcp_stream::SharedTcpStream;
	use bitcrypto::{dhash256, SHA256D};
	use message::types::Version;
	use message::{serialize_payload, to_raw_message};
	use network::Network;

	fn local_version() -> Version {
		Version {
			version: 1700,
			services: 0,
			timestamp: 1_521_080_000,
			nonce: 0x3c76_a409_eb48_a227,
			user_agent: "/p2pool-rs:0.1.0/".into(),
			best_share_hash: SHA256D::default(),
		}
	}

	fn remote_version() -> Version {
		Version {
			version: 1701,
			services: 0,
			timestamp: 1_521_080_001,
			nonce: 0x3c76_a409_eb48_a228,
			user_agent: "/p2pool-rs:0.2.0/".into(),
			best_share_hash: dhash256(b"remote best"),
		}
	}

	fn raw_version(version: &Version) -> crate::bytes::Bytes {
		let payload = serialize_payload(version, 0).unwrap();
		to_raw_message(Network::Mainnet.magic(), "version".into(), &payload)
	}

	#[tokio::test]
	async fn test_handshake() {
		let stream = SharedTcpStream::new(raw_version(&remote_version()));
		let expected = HandshakeResult {
			version: remote_version(),
			negotiated_version: 1700,
		};

		let result = handshake(&stream, Network::Mainnet.magic(), local_version(), 1700).await.unwrap();
		assert_eq!(result, expected);

		// our version went out first
		let written = stream.get_written().await;
		assert_eq!(written, raw_version(&local_version()));
	}

	#[tokio::test]
	async fn test_accept_handshake() {
		let stream = SharedTcpStream::new(raw_version(&remote_version()));

		let result = accept_handshake(&stream, Network::Mainnet.magic(), local_version(), 1700).await.unwrap();
		assert_eq!(result.negotiated_version, 1700);
		assert_eq!(stream.get_written().await, raw_version(&local_version()));
	}

	#[tokio::test]
	async fn test_handshake_rejects_old_peer() {
		let mut old = remote_version();
		old.version = 1600;
		let stream = SharedTcpStream::new(raw_version(&old));

		assert!(handshake(&stream, Network::Mainnet.magic(), local_version(), 1700).await.is_err());
	}

	#[tokio::test]
	async fn test_handshake_rejects_self_connection() {
		let stream = SharedTcpStream::new(raw_version(&local_version()));

		assert!(handshake(&stream, Network::Mainnet.magic(), local_version(), 1700).await.is_err());
	}
}
