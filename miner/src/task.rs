use crate::block_template::BlockTemplate;
use bitcrypto::SHA256D;
use primitives::bytes::Bytes;
use ser::{CompactInteger, Stream};
use serde::Serialize;
use sharechain::merkle::merkle_link;

/// Number of bytes workers insert between the two coinbase parts.
pub const EXTRANONCE_SIZE: usize = 8;

/// Merged-mining magic prefixing the aux commitment in the coinbase script.
const MERGED_MINING_MAGIC: [u8; 4] = [0xfa, 0xbe, 0x6d, 0x6d];

/// Stratum `mining.notify` parameters, hex-encoded and ready to serialize.
#[derive(Debug, PartialEq, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StratumParams {
	pub job_id: String,
	pub prevhash: String,
	pub coinb1: String,
	pub coinb2: String,
	pub merkle_branch: Vec<String>,
	pub version: String,
	pub nbits: String,
	pub ntime: String,
	pub clean_jobs: bool,
}

/// Mining task handed to the downstream publisher.
#[derive(Debug, Clone)]
pub struct Task {
	pub task_id: String,
	pub coinbase_part1: Bytes,
	pub coinbase_part2: Bytes,
	pub stratum: StratumParams,
	pub previous_block_hash: SHA256D,
	pub height: u32,
	pub merkle_link: Vec<SHA256D>,
}

/// Builds a stratum-ready task from a block template and the aux-chain
/// commitment.
pub fn build_task(
	template: &BlockTemplate,
	aux_root: SHA256D,
	aux_count: usize,
	payout_script: &Bytes,
	job_id: u64,
	clean_jobs: bool,
) -> Task {
	let (part1, part2) = build_coinbase_split(template, aux_root, aux_count, payout_script);

	// the coinbase occupies index 0; only the transaction ids matter for the
	// sibling path
	let mut leaves = Vec::with_capacity(template.transactions.len() + 1);
	leaves.push(SHA256D::default());
	leaves.extend(template.transactions.iter().map(|transaction| transaction.identity()));
	let link = merkle_link(&leaves, 0);

	let stratum = StratumParams {
		job_id: format!("{:x}", job_id),
		prevhash: stratum_prev_hash(&template.previous_header_hash),
		coinb1: format!("{}", part1),
		coinb2: format!("{}", part2),
		merkle_branch: link.iter().map(|hash| format!("{:x}", HexHash(hash))).collect(),
		version: format!("{:08x}", template.version),
		nbits: format!("{:08x}", u32::from(template.bits)),
		ntime: format!("{:08x}", template.time),
		clean_jobs,
	};

	Task {
		task_id: format!("{:x}", job_id),
		coinbase_part1: part1,
		coinbase_part2: part2,
		stratum,
		previous_block_hash: template.previous_header_hash,
		height: template.height,
		merkle_link: link,
	}
}

/// The generation transaction split around the extranonce gap: workers
/// concatenate `part1 || extranonce || part2`.
fn build_coinbase_split(template: &BlockTemplate, aux_root: SHA256D, aux_count: usize, payout_script: &Bytes) -> (Bytes, Bytes) {
	// BIP34 height, then the aux commitment, then the worker extranonce
	let mut script_prefix = Vec::new();
	let height = script_number(template.height as u64);
	script_prefix.push(height.len() as u8);
	script_prefix.extend_from_slice(&height);

	let mut commitment = Vec::with_capacity(44);
	commitment.extend_from_slice(&MERGED_MINING_MAGIC);
	commitment.extend_from_slice(&aux_root[..]);
	commitment.extend_from_slice(&(aux_count as u32).to_le_bytes());
	commitment.extend_from_slice(&0u32.to_le_bytes());
	script_prefix.push(commitment.len() as u8);
	script_prefix.extend_from_slice(&commitment);

	let script_len = script_prefix.len() + 1 + EXTRANONCE_SIZE;

	let mut part1 = Stream::new();
	part1.append(&1u32); // tx version
	part1.append(&CompactInteger::from(1u64)); // single input
	part1.append_slice(&[0u8; 32]); // null prevout
	part1.append(&0xffff_ffffu32);
	part1.append(&CompactInteger::from(script_len));
	part1.append_slice(&script_prefix);
	part1.append_slice(&[EXTRANONCE_SIZE as u8]); // push opcode the workers fill

	let mut part2 = Stream::new();
	part2.append(&0xffff_ffffu32); // sequence
	part2.append(&CompactInteger::from(1u64)); // single payout output
	part2.append(&template.coinbase_value);
	part2.append(payout_script);
	part2.append(&0u32); // locktime

	(part1.out(), part2.out())
}

/// Minimal script-number encoding used for the BIP34 height push.
fn script_number(mut value: u64) -> Vec<u8> {
	let mut result = Vec::new();
	while value > 0 {
		result.push((value & 0xff) as u8);
		value >>= 8;
	}
	if let Some(last) = result.last() {
		if last & 0x80 != 0 {
			result.push(0);
		}
	}
	result
}

/// Previous-block hash in stratum notation: the raw little-endian hash with
/// every 4-byte word byte-swapped.
pub fn stratum_prev_hash(hash: &SHA256D) -> String {
	let mut out = String::with_capacity(64);
	for chunk in hash[..].chunks(4) {
		for byte in chunk.iter().rev() {
			out.push_str(&format!("{:02x}", byte));
		}
	}
	out
}

struct HexHash<'a>(&'a SHA256D);

impl<'a> std::fmt::LowerHex for HexHash<'a> {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		for byte in self.0[..].iter() {
			write!(f, "{:02x}", byte)?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::{build_task, script_number, stratum_prev_hash, EXTRANONCE_SIZE};
	use crate::block_template::{AuxWork, BlockTemplate};
	use bitcrypto::{dhash256, FromInnerHex, FromStr, SHA256D};
	use primitives::bytes::Bytes;
	use sharechain::hash160_to_script;
	use sharechain::merkle::{aggregate_link, merkle_root};

	fn payout_script() -> Bytes {
		hash160_to_script(&bitcrypto::dhash160(b"payout"))
	}

	fn template() -> BlockTemplate {
		BlockTemplate {
			version: 0x2000_0000,
			previous_header_hash: dhash256(b"previous block"),
			time: 1_521_080_000,
			bits: 0x1d00ffff.into(),
			height: 512_000,
			coinbase_value: 625_000_000,
			transactions: vec![
				sharechain::TransactionTemplate::from_raw(&"0100000001".into()),
				sharechain::TransactionTemplate::from_raw(&"0200000002".into()),
			],
			auxes: vec![AuxWork {
				hash: dhash256(b"aux chain"),
			}],
			raw: serde_json::Value::Null,
		}
	}

	#[test]
	fn test_script_number() {
		assert_eq!(script_number(0), Vec::<u8>::new());
		assert_eq!(script_number(0x10), vec![0x10]);
		// top bit set needs a sign byte
		assert_eq!(script_number(0x80), vec![0x80, 0x00]);
		assert_eq!(script_number(512_000), vec![0x00, 0xd0, 0x07]);
	}

	#[test]
	fn test_coinbase_split_structure() {
		let template = template();
		let task = build_task(&template, dhash256(b"aux root"), 1, &payout_script(), 7, true);

		let part1 = task.coinbase_part1;
		// version, input count, null prevout
		assert_eq!(&part1[..4], &[0x01, 0x00, 0x00, 0x00]);
		assert_eq!(part1[4], 0x01);
		assert!(part1[5..37].iter().all(|byte| *byte == 0));
		assert_eq!(&part1[37..41], &[0xff, 0xff, 0xff, 0xff]);

		// the extranonce push opcode ends part1
		assert_eq!(*part1.last().unwrap(), EXTRANONCE_SIZE as u8);

		// script length covers the prefix, push opcode and extranonce gap
		let script_len = part1[41] as usize;
		assert_eq!(41 + 1 + script_len, part1.len() + EXTRANONCE_SIZE);

		// part2 carries sequence, the payout output and locktime
		let part2 = task.coinbase_part2;
		assert_eq!(&part2[..4], &[0xff, 0xff, 0xff, 0xff]);
		assert_eq!(part2[4], 0x01);
		assert_eq!(&part2[part2.len() - 4..], &[0x00, 0x00, 0x00, 0x00]);
	}

	#[test]
	fn test_merged_mining_commitment_present() {
		let template = template();
		let aux_root = dhash256(b"aux root");
		let task = build_task(&template, aux_root, 1, &payout_script(), 7, true);

		let part1: Vec<u8> = task.coinbase_part1.clone().take();
		let magic_position = part1
			.windows(4)
			.position(|window| window == [0xfa, 0xbe, 0x6d, 0x6d])
			.expect("merged mining magic missing");
		assert_eq!(&part1[magic_position + 4..magic_position + 36], &aux_root[..]);
	}

	#[test]
	fn test_merkle_branch_rebuilds_root() {
		let template = template();
		let task = build_task(&template, SHA256D::default(), 0, &payout_script(), 7, true);

		let coinbase_hash = dhash256(b"whatever the workers produce");
		let mut leaves = vec![coinbase_hash];
		leaves.extend(template.transactions.iter().map(|transaction| transaction.identity()));

		assert_eq!(aggregate_link(coinbase_hash, &task.merkle_link), merkle_root(&leaves));
	}

	#[test]
	fn test_stratum_params() {
		let template = template();
		let task = build_task(&template, SHA256D::default(), 0, &payout_script(), 0x2a, false);

		assert_eq!(task.stratum.job_id, "2a");
		assert_eq!(task.stratum.version, "20000000");
		assert_eq!(task.stratum.nbits, "1d00ffff");
		assert_eq!(task.stratum.ntime, "5aa9d6c0");
		assert!(!task.stratum.clean_jobs);
		assert_eq!(task.stratum.coinb1, format!("{}", task.coinbase_part1));
		assert_eq!(task.stratum.merkle_branch.len(), task.merkle_link.len());
	}

	#[test]
	fn test_stratum_prev_hash_swaps_words() {
		let hash = SHA256D::from_inner_hex("000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f").unwrap();
		assert_eq!(
			stratum_prev_hash(&hash),
			"03020100070605040b0a09080f0e0d0c13121110171615141b1a19181f1e1d1c"
		);
	}
}
