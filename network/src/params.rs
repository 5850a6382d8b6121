use crate::{Magic, Network};
use bitcrypto::{dhash256, SHA256D};
use primitives::U256;

/// Proof-of-work function applied to the 80-byte block header. Configured once
/// at startup; coins with scrypt/X11 style headers plug in their own function.
pub type PowFn = fn(&[u8]) -> SHA256D;

fn pow_sha256d(header: &[u8]) -> SHA256D {
	dhash256(header)
}

/// Parameters that influence share validation.
#[derive(Debug, Clone)]
pub struct Params {
	/// Network.
	pub network: Network,
	/// Message framing magic.
	pub magic: Magic,
	/// Share-chain identifier.
	pub identifier: [u8; 8],
	/// Highest target a share may carry.
	pub max_target: U256,
	/// First share version with segwit data in the share info.
	pub segwit_activation_version: u64,
	/// Header proof-of-work function.
	pub pow: PowFn,
}

impl Params {
	pub fn new(network: Network) -> Self {
		match network {
			Network::Mainnet => Params {
				network,
				magic: network.magic(),
				identifier: network.identifier(),
				max_target: U256::max_value() >> 20,
				segwit_activation_version: 17,
				pow: pow_sha256d,
			},
			Network::Testnet | Network::Other(_) => Params {
				network,
				magic: network.magic(),
				identifier: network.identifier(),
				max_target: U256::max_value(),
				segwit_activation_version: 17,
				pow: pow_sha256d,
			},
		}
	}

	pub fn is_segwit_activated(&self, share_version: u64) -> bool {
		share_version >= self.segwit_activation_version
	}
}

#[cfg(test)]
mod tests {
	use super::Params;
	use crate::Network;

	#[test]
	fn test_segwit_activation() {
		let params = Params::new(Network::Mainnet);
		assert!(!params.is_segwit_activated(16));
		assert!(params.is_segwit_activated(17));
		assert!(params.is_segwit_activated(18));
	}

	#[test]
	fn test_max_target_is_below_limit() {
		let params = Params::new(Network::Mainnet);
		assert!(params.max_target < primitives::U256::max_value());
	}
}
