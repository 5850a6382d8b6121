use bitcrypto::HASH160;
use primitives::bytes::Bytes;

const OP_DUP: u8 = 0x76;
const OP_HASH160: u8 = 0xa9;
const OP_EQUALVERIFY: u8 = 0x88;
const OP_CHECKSIG: u8 = 0xac;

/// Standard pay-to-pubkey-hash output script for a 20-byte key hash.
pub fn hash160_to_script(pubkey_hash: &HASH160) -> Bytes {
	let mut script = Vec::with_capacity(25);
	script.push(OP_DUP);
	script.push(OP_HASH160);
	script.push(20);
	script.extend_from_slice(&pubkey_hash[..]);
	script.push(OP_EQUALVERIFY);
	script.push(OP_CHECKSIG);
	script.into()
}

#[cfg(test)]
mod tests {
	use super::hash160_to_script;
	use bitcrypto::{FromStr, HASH160};
	use primitives::bytes::Bytes;

	#[test]
	fn test_hash160_to_script() {
		let pubkey_hash = HASH160::from_str("b6a9c8c230722b7c748331a8b450f05566dc7d0f").unwrap();
		let expected: Bytes = "76a914b6a9c8c230722b7c748331a8b450f05566dc7d0f88ac".into();
		assert_eq!(hash160_to_script(&pubkey_hash), expected);
	}
}
