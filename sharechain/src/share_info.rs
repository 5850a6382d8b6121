use bitcrypto::{HASH160, SHA256D};
use primitives::bytes::Bytes;
use primitives::compact::Compact;
use primitives::U256;
use ser::{CompactInteger, Deserializable, Error, Reader, Serializable, Stream};
use std::io;

/// Freshness marker a share carries about its own ancestry.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum StaleInfo {
	Fresh,
	Orphan,
	DeadOnArrival,
}

impl StaleInfo {
	fn to_u8(self) -> u8 {
		match self {
			StaleInfo::Fresh => 0,
			StaleInfo::Orphan => 253,
			StaleInfo::DeadOnArrival => 254,
		}
	}

	fn from_u8(value: u8) -> Result<Self, Error> {
		match value {
			0 => Ok(StaleInfo::Fresh),
			253 => Ok(StaleInfo::Orphan),
			254 => Ok(StaleInfo::DeadOnArrival),
			_ => Err(Error::MalformedData),
		}
	}
}

/// Reference into the transaction set a share credits: `share_count == 0`
/// points into the share's own `new_transaction_hashes`, a positive count
/// points `share_count` ancestors back.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct TxHashRef {
	pub share_count: u64,
	pub tx_count: u64,
}

impl Serializable for TxHashRef {
	fn serialize(&self, stream: &mut Stream) {
		stream
			.append(&CompactInteger::from(self.share_count))
			.append(&CompactInteger::from(self.tx_count));
	}
}

impl Deserializable for TxHashRef {
	fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, Error>
	where
		T: io::Read,
	{
		Ok(TxHashRef {
			share_count: reader.read::<CompactInteger>()?.into(),
			tx_count: reader.read::<CompactInteger>()?.into(),
		})
	}
}

/// Payout-bearing payload of a share.
#[derive(Debug, PartialEq, Clone)]
pub struct ShareData {
	pub previous_share_hash: Option<SHA256D>,
	pub coinbase: Bytes,
	pub nonce: u32,
	pub pubkey_hash: HASH160,
	pub subsidy: u64,
	pub donation: u16,
	pub stale_info: StaleInfo,
	pub desired_version: u64,
}

/// Segwit extension appended to the share info from the activation version on.
#[derive(Debug, PartialEq, Clone)]
pub struct SegwitInfo {
	pub txid_merkle_branch: Vec<SHA256D>,
	pub txid_merkle_index: u32,
	pub witness_reserved_value: SHA256D,
}

impl Serializable for SegwitInfo {
	fn serialize(&self, stream: &mut Stream) {
		stream
			.append_list::<SHA256D, SHA256D>(&self.txid_merkle_branch)
			.append(&self.txid_merkle_index)
			.append(&self.witness_reserved_value);
	}
}

impl Deserializable for SegwitInfo {
	fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, Error>
	where
		T: io::Read,
	{
		Ok(SegwitInfo {
			txid_merkle_branch: reader.read_list()?,
			txid_merkle_index: reader.read()?,
			witness_reserved_value: reader.read()?,
		})
	}
}

/// Share info: share data, transaction references and the accounting fields.
///
/// Hashes encoded as `Option` use 32 zero bytes for `None` on the wire.
#[derive(Debug, PartialEq, Clone)]
pub struct ShareInfo {
	pub data: ShareData,
	pub transaction_hash_refs: Vec<TxHashRef>,
	pub new_transaction_hashes: Vec<SHA256D>,
	pub far_share_hash: Option<SHA256D>,
	pub bits: Compact,
	pub timestamp: u32,
	pub absheight: u32,
	pub abswork: U256,
	pub segwit: Option<SegwitInfo>,
}

impl ShareInfo {
	/// Reads a share info. `max_new_txs` bounds the `new_transaction_hashes`
	/// list; the segwit extension is only present from the activation version.
	pub fn parse<T>(reader: &mut Reader<T>, max_new_txs: usize, segwit_activated: bool) -> Result<Self, Error>
	where
		T: io::Read,
	{
		let previous_share_hash = read_optional_hash(reader)?;
		let coinbase = reader.read()?;
		let nonce = reader.read()?;
		let pubkey_hash = reader.read()?;
		let subsidy = reader.read()?;
		let donation = reader.read()?;
		let stale_info = StaleInfo::from_u8(reader.read()?)?;
		let desired_version = reader.read::<CompactInteger>()?.into();
		let transaction_hash_refs = reader.read_list()?;
		let new_transaction_hashes = reader.read_list_max(max_new_txs)?;
		let far_share_hash = read_optional_hash(reader)?;
		let bits = reader.read()?;
		let timestamp = reader.read()?;
		let absheight = reader.read()?;
		let abswork = reader.read_uint_le(16)?;
		let segwit = if segwit_activated { Some(reader.read()?) } else { None };

		Ok(ShareInfo {
			data: ShareData {
				previous_share_hash,
				coinbase,
				nonce,
				pubkey_hash,
				subsidy,
				donation,
				stale_info,
				desired_version,
			},
			transaction_hash_refs,
			new_transaction_hashes,
			far_share_hash,
			bits,
			timestamp,
			absheight,
			abswork,
			segwit,
		})
	}
}

impl Serializable for ShareInfo {
	fn serialize(&self, stream: &mut Stream) {
		append_optional_hash(stream, &self.data.previous_share_hash);
		stream
			.append(&self.data.coinbase)
			.append(&self.data.nonce)
			.append(&self.data.pubkey_hash)
			.append(&self.data.subsidy)
			.append(&self.data.donation)
			.append(&self.data.stale_info.to_u8())
			.append(&CompactInteger::from(self.data.desired_version))
			.append_list::<TxHashRef, TxHashRef>(&self.transaction_hash_refs)
			.append_list::<SHA256D, SHA256D>(&self.new_transaction_hashes);
		append_optional_hash(stream, &self.far_share_hash);
		stream
			.append(&self.bits)
			.append(&self.timestamp)
			.append(&self.absheight)
			.append_uint_le(self.abswork, 16);
		if let Some(ref segwit) = self.segwit {
			stream.append(segwit);
		}
	}
}

fn read_optional_hash<T>(reader: &mut Reader<T>) -> Result<Option<SHA256D>, Error>
where
	T: io::Read,
{
	let hash: SHA256D = reader.read()?;
	if hash == SHA256D::default() {
		Ok(None)
	} else {
		Ok(Some(hash))
	}
}

fn append_optional_hash(stream: &mut Stream, hash: &Option<SHA256D>) {
	match hash {
		Some(hash) => stream.append(hash),
		None => stream.append(&SHA256D::default()),
	};
}

#[cfg(test)]
mod tests {
	use super::{SegwitInfo, ShareData, ShareInfo, StaleInfo, TxHashRef};
	use bitcrypto::{dhash256, SHA256D};
	use primitives::U256;
	use ser::{serialize, Reader};

	pub fn sample_share_info(segwit: bool) -> ShareInfo {
		ShareInfo {
			data: ShareData {
				previous_share_hash: Some(dhash256(b"previous share")),
				coinbase: "03abcdef".into(),
				nonce: 0x1050_3020,
				pubkey_hash: bitcrypto::dhash160(b"payout key"),
				subsidy: 2_521_056_343,
				donation: 65535 / 200,
				stale_info: StaleInfo::Fresh,
				desired_version: 17,
			},
			transaction_hash_refs: vec![
				TxHashRef {
					share_count: 0,
					tx_count: 0,
				},
				TxHashRef {
					share_count: 3,
					tx_count: 7,
				},
			],
			new_transaction_hashes: vec![dhash256(b"tx one")],
			far_share_hash: None,
			bits: 0x1d00ffff.into(),
			timestamp: 1_521_080_000,
			absheight: 512_000,
			abswork: U256::from(0x1234_5678u64),
			segwit: if segwit {
				Some(SegwitInfo {
					txid_merkle_branch: vec![dhash256(b"sibling")],
					txid_merkle_index: 0,
					witness_reserved_value: SHA256D::default(),
				})
			} else {
				None
			},
		}
	}

	#[test]
	fn test_roundtrip_without_segwit() {
		let info = sample_share_info(false);
		let serialized = serialize(&info);

		let mut reader = Reader::new(serialized.as_ref());
		let parsed = ShareInfo::parse(&mut reader, 50_000 / 32, false).unwrap();
		assert!(reader.is_finished());
		assert_eq!(parsed, info);
		assert_eq!(serialize(&parsed), serialized);
	}

	#[test]
	fn test_roundtrip_with_segwit() {
		let info = sample_share_info(true);
		let serialized = serialize(&info);

		let mut reader = Reader::new(serialized.as_ref());
		let parsed = ShareInfo::parse(&mut reader, 50_000 / 32, true).unwrap();
		assert!(reader.is_finished());
		assert_eq!(parsed, info);
	}

	#[test]
	fn test_new_tx_hash_limit() {
		let mut info = sample_share_info(false);
		info.new_transaction_hashes = (0..4u8).map(|i| dhash256(&[i])).collect();
		let serialized = serialize(&info);

		let mut reader = Reader::new(serialized.as_ref());
		assert!(ShareInfo::parse(&mut reader, 3, false).is_err());
	}

	#[test]
	fn test_unknown_stale_info_rejected() {
		let info = sample_share_info(false);
		let mut serialized = serialize(&info).take();
		// previous hash, coinbase varstr, nonce, pubkey hash, subsidy, donation
		let stale_offset = 32 + 5 + 4 + 20 + 8 + 2;
		assert_eq!(serialized[stale_offset], 0);
		serialized[stale_offset] = 17;

		let mut reader = Reader::new(&serialized);
		assert!(ShareInfo::parse(&mut reader, 50_000 / 32, false).is_err());
	}
}
