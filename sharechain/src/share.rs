use crate::hash_link::HashLink;
use crate::merkle::aggregate_link;
use crate::script::hash160_to_script;
use crate::share_info::ShareInfo;
use crate::small_block_header::SmallBlockHeader;
use crate::Error;
use bitcrypto::{dhash256, SHA256D};
use network::Params;
use primitives::bytes::Bytes;
use primitives::U256;
use ser::{Reader, Serializable, Stream};
use std::collections::HashSet;
use std::io;

pub const SHARE_VERSION_LEGACY: u64 = 16;
pub const SHARE_VERSION_SEGWIT: u64 = 17;

/// Highest ancestor distance a transaction reference may span.
const MAX_SHARE_COUNT_SPAN: u64 = 110;

/// Share versions differ in constants only, never in layout.
struct ShareVariant {
	version: u64,
	max_new_txs_size: usize,
}

const SHARE_VARIANTS: [ShareVariant; 2] = [
	ShareVariant {
		version: SHARE_VERSION_LEGACY,
		max_new_txs_size: 50_000,
	},
	ShareVariant {
		version: SHARE_VERSION_SEGWIT,
		max_new_txs_size: 100_000,
	},
];

fn variant(version: u64) -> Option<&'static ShareVariant> {
	SHARE_VARIANTS.iter().find(|variant| variant.version == version)
}

pub const GENTX_BEFORE_REFHASH_HEX: &str = "434104ffd03de44a6e11b9917f3a29f9443283d9871c9d743ef30d5eddcd37094b64d1b3d8090496b53256786bf5c82932ec23c3b74d9f05a6f95a8b5529352656664bac00000000000000002a6a28";

lazy_static! {
	/// Donation output script embedded in every generation transaction.
	pub static ref DONATION_SCRIPT: Bytes = "4104ffd03de44a6e11b9917f3a29f9443283d9871c9d743ef30d5eddcd37094b64d1b3d8090496b53256786bf5c82932ec23c3b74d9f05a6f95a8b5529352656664bac".into();

	/// Constant generation-transaction bytes directly before the reference
	/// hash: the pushed donation output, its zero value and the head of the
	/// var-string wrapped OP_RETURN output. Shares hash-link against exactly
	/// these bytes, so the layout is pinned to the known hex form.
	pub static ref GENTX_BEFORE_REFHASH: Bytes = {
		let built = build_gentx_before_refhash();
		let expected: Bytes = GENTX_BEFORE_REFHASH_HEX.into();
		assert_eq!(built, expected, "generation tx prefix layout drifted");
		built
	};
}

fn build_gentx_before_refhash() -> Bytes {
	let mut stream = Stream::new();
	stream.append(&*DONATION_SCRIPT).append(&0u64);

	// OP_RETURN script carrying a 40-byte push of reference hash plus txout
	// nonce; only the three bytes before the reference hash are constant
	let mut op_return = Vec::with_capacity(42);
	op_return.push(0x6a);
	op_return.push(0x28);
	op_return.extend_from_slice(&[0u8; 40]);
	let op_return: Bytes = op_return.into();

	let mut wrapped = Stream::new();
	wrapped.append(&op_return);
	stream.append_slice(&wrapped.out()[..3]);

	stream.out()
}

/// A validated share. Immutable once constructed; construction always runs the
/// whole validation pipeline and records the outcome in the validity flag.
#[derive(Debug, PartialEq, Clone)]
pub struct Share {
	version: u64,
	min_header: SmallBlockHeader,
	info: ShareInfo,
	ref_merkle_link: Vec<SHA256D>,
	last_txout_nonce: u64,
	hash_link: HashLink,
	merkle_link: Vec<SHA256D>,

	// derived
	hash: SHA256D,
	gentx_hash: SHA256D,
	new_script: Bytes,
	target: U256,
	validity: bool,
}

impl Share {
	/// Reads share contents from a buffer. The version travels outside the
	/// share contents and must already have been read by the caller.
	pub fn parse<T>(reader: &mut Reader<T>, version: u64, params: &Params) -> Result<Share, Error>
	where
		T: io::Read,
	{
		let variant = variant(version).ok_or(Error::UnknownVersion(version))?;

		let min_header = reader.read()?;
		let info = ShareInfo::parse(reader, variant.max_new_txs_size / 32, params.is_segwit_activated(version))?;
		let ref_merkle_link = reader.read_list()?;
		let last_txout_nonce = reader.read()?;
		let hash_link = reader.read()?;
		let merkle_link = reader.read_list()?;

		Ok(Share::init(
			version,
			min_header,
			info,
			ref_merkle_link,
			last_txout_nonce,
			hash_link,
			merkle_link,
			params,
		))
	}

	/// Assembles a locally constructed share.
	pub fn from_parts(
		version: u64,
		min_header: SmallBlockHeader,
		info: ShareInfo,
		ref_merkle_link: Vec<SHA256D>,
		last_txout_nonce: u64,
		hash_link: HashLink,
		merkle_link: Vec<SHA256D>,
		params: &Params,
	) -> Result<Share, Error> {
		if variant(version).is_none() {
			return Err(Error::UnknownVersion(version));
		}

		Ok(Share::init(
			version,
			min_header,
			info,
			ref_merkle_link,
			last_txout_nonce,
			hash_link,
			merkle_link,
			params,
		))
	}

	fn init(
		version: u64,
		min_header: SmallBlockHeader,
		info: ShareInfo,
		ref_merkle_link: Vec<SHA256D>,
		last_txout_nonce: u64,
		hash_link: HashLink,
		merkle_link: Vec<SHA256D>,
		params: &Params,
	) -> Share {
		let mut share = Share {
			version,
			min_header,
			info,
			ref_merkle_link,
			last_txout_nonce,
			hash_link,
			merkle_link,
			hash: SHA256D::default(),
			gentx_hash: SHA256D::default(),
			new_script: Bytes::new(),
			target: U256::zero(),
			validity: false,
		};

		match share.compute(params) {
			Ok(()) => share.validity = true,
			Err(reason) => debug!("rejecting share: {}", reason),
		}
		share
	}

	fn compute(&mut self, params: &Params) -> Result<(), &'static str> {
		// every new transaction hash must be referenced exactly once, and no
		// reference may reach unreasonably far up the chain
		let mut own_refs = HashSet::new();
		for tx_ref in &self.info.transaction_hash_refs {
			if tx_ref.share_count >= MAX_SHARE_COUNT_SPAN {
				return Err("hash ref spans too many ancestors");
			}
			if tx_ref.share_count == 0 {
				if tx_ref.tx_count >= self.info.new_transaction_hashes.len() as u64 {
					return Err("hash ref outside own transaction list");
				}
				if !own_refs.insert(tx_ref.tx_count) {
					return Err("duplicate reference into own transaction list");
				}
			}
		}
		if own_refs.len() != self.info.new_transaction_hashes.len() {
			return Err("unreferenced new transaction hashes");
		}

		self.new_script = hash160_to_script(&self.info.data.pubkey_hash);
		self.target = self.info.bits.to_u256().map_err(|_| "unrepresentable target bits")?;

		// bind the share info into the generation tx through the hash link
		let mut ref_stream = Stream::new();
		ref_stream.append_slice(&params.identifier).append(&self.info);
		let ref_hash = aggregate_link(dhash256(&ref_stream.out()), &self.ref_merkle_link);

		let mut suffix = [0u8; 44];
		suffix[..32].copy_from_slice(&ref_hash[..]);
		suffix[32..40].copy_from_slice(&self.last_txout_nonce.to_le_bytes());
		self.gentx_hash = self
			.hash_link
			.check(&suffix, &GENTX_BEFORE_REFHASH)
			.ok_or("hash link does not bind the generation tx prefix")?;

		let segwit_link = if params.is_segwit_activated(self.version) {
			self.info.segwit.as_ref().map(|segwit| &segwit.txid_merkle_branch)
		} else {
			None
		};
		let link = segwit_link.unwrap_or(&self.merkle_link);
		let merkle_root = aggregate_link(self.gentx_hash, link);

		self.hash = self.min_header.calculate_hash(&merkle_root);

		if self.target > params.max_target {
			return Err("target above the network maximum");
		}

		let pow = (params.pow)(&self.min_header.full_header(&merkle_root));
		if U256::from_little_endian(&pow[..]) > self.target {
			return Err("insufficient proof of work");
		}

		Ok(())
	}

	pub fn version(&self) -> u64 {
		self.version
	}

	pub fn min_header(&self) -> &SmallBlockHeader {
		&self.min_header
	}

	pub fn info(&self) -> &ShareInfo {
		&self.info
	}

	pub fn is_valid(&self) -> bool {
		self.validity
	}

	pub fn hash(&self) -> &SHA256D {
		&self.hash
	}

	/// Display form: byte-reversed hex, the way share hashes are logged and
	/// surfaced to users.
	pub fn hash_hex(&self) -> String {
		self.hash.to_string()
	}

	pub fn gentx_hash(&self) -> &SHA256D {
		&self.gentx_hash
	}

	pub fn new_script(&self) -> &Bytes {
		&self.new_script
	}

	pub fn target(&self) -> &U256 {
		&self.target
	}

	pub fn last_txout_nonce(&self) -> u64 {
		self.last_txout_nonce
	}
}

impl Serializable for Share {
	fn serialize(&self, stream: &mut Stream) {
		stream
			.append(&self.min_header)
			.append(&self.info)
			.append_list::<SHA256D, SHA256D>(&self.ref_merkle_link)
			.append(&self.last_txout_nonce)
			.append(&self.hash_link)
			.append_list::<SHA256D, SHA256D>(&self.merkle_link);
	}
}
