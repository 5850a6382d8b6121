use bitcrypto::{dhash160, dhash256, SHA256D};
use network::{Network, Params};
use primitives::U256;
use ser::{serialize, Reader};
use sharechain::{
	HashLink, SegwitInfo, Share, ShareData, ShareInfo, StaleInfo, TxHashRef, GENTX_BEFORE_REFHASH, SHARE_VERSION_SEGWIT,
};

fn pow_always_passes(_header: &[u8]) -> SHA256D {
	SHA256D::default()
}

fn params() -> Params {
	let mut params = Params::new(Network::Other(0));
	params.pow = pow_always_passes;
	params
}

fn share_info() -> ShareInfo {
	let new_transaction_hashes: Vec<SHA256D> = (0..5u8).map(|i| dhash256(&[i])).collect();
	let mut transaction_hash_refs: Vec<TxHashRef> = (0..5u64)
		.map(|tx_count| TxHashRef {
			share_count: 0,
			tx_count,
		})
		.collect();
	transaction_hash_refs.push(TxHashRef {
		share_count: 42,
		tx_count: 3,
	});

	ShareInfo {
		data: ShareData {
			previous_share_hash: None,
			coinbase: "04ffff001d0104".into(),
			nonce: 7,
			pubkey_hash: dhash160(b"miner"),
			subsidy: 625_000_000,
			donation: 327,
			stale_info: StaleInfo::Orphan,
			desired_version: 17,
		},
		transaction_hash_refs,
		new_transaction_hashes,
		far_share_hash: Some(dhash256(b"far share")),
		bits: 0x1d00ffff.into(),
		timestamp: 1_521_080_123,
		absheight: 512_123,
		abswork: U256::from(0xffff_ffff_ffffu64),
		segwit: Some(SegwitInfo {
			txid_merkle_branch: vec![dhash256(b"txid sibling a"), dhash256(b"txid sibling b")],
			txid_merkle_index: 0,
			witness_reserved_value: SHA256D::default(),
		}),
	}
}

fn share(params: &Params) -> Share {
	Share::from_parts(
		SHARE_VERSION_SEGWIT,
		sharechain::SmallBlockHeader {
			version: 0x2000_0000,
			previous_block_hash: dhash256(b"tip"),
			timestamp: 1_521_080_124,
			bits: 0x1d00ffff.into(),
			nonce: 0x0bad_beef,
		},
		share_info(),
		vec![dhash256(b"ref sibling")],
		11,
		HashLink::from_prefix(&GENTX_BEFORE_REFHASH),
		vec![],
		params,
	)
	.unwrap()
}

// captured-buffer law: any share that parses re-serializes to the same bytes
#[test]
fn parse_validate_serialize_byte_exact() {
	let params = params();
	let original = share(&params);
	assert!(original.is_valid());

	let buffer = serialize(&original);

	let mut reader = Reader::new(buffer.as_ref());
	let parsed = Share::parse(&mut reader, SHARE_VERSION_SEGWIT, &params).unwrap();
	assert!(reader.is_finished());

	assert!(parsed.is_valid());
	assert_eq!(parsed.hash(), original.hash());
	assert_eq!(parsed.gentx_hash(), original.gentx_hash());
	assert_eq!(serialize(&parsed), buffer);
}

#[test]
fn truncated_buffer_is_clean_parse_error() {
	let params = params();
	let buffer = serialize(&share(&params));

	for cut in &[1usize, 40, 90, buffer.len() - 1] {
		let mut reader = Reader::new(&buffer[..*cut]);
		assert!(Share::parse(&mut reader, SHARE_VERSION_SEGWIT, &params).is_err(), "cut {}", cut);
	}
}
