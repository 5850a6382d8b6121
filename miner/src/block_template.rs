use bitcrypto::{dhash256, FromStr, SHA256D};
use primitives::compact::Compact;
use ser::{CompactInteger, Stream};
use serde_json::Value;
use sharechain::TransactionTemplate;
use std::{error, fmt};

/// Merge-mined auxiliary chain work: the aux block hash committed into the
/// coinbase.
#[derive(Debug, PartialEq, Clone)]
pub struct AuxWork {
	pub hash: SHA256D,
}

/// Block template as described in [BIP0022](https://github.com/bitcoin/bips/blob/master/bip-0022.mediawiki#block-template-request)
#[derive(Debug, Clone)]
pub struct BlockTemplate {
	/// Version
	pub version: u32,
	/// The hash of previous block
	pub previous_header_hash: SHA256D,
	/// The current time as seen by the server
	pub time: u32,
	/// The compressed difficulty
	pub bits: Compact,
	/// Block height
	pub height: u32,
	/// Total funds available for the coinbase (in Satoshis)
	pub coinbase_value: u64,
	/// Block transactions (excluding coinbase)
	pub transactions: Vec<TransactionTemplate>,
	/// Merge-mined chains to commit into the coinbase
	pub auxes: Vec<AuxWork>,
	/// The template as delivered by the daemon, passed through to workers
	pub raw: Value,
}

#[derive(Debug, PartialEq)]
pub enum TemplateError {
	Missing(&'static str),
	Invalid(&'static str),
}

impl fmt::Display for TemplateError {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match *self {
			TemplateError::Missing(field) => write!(f, "block template field missing: {}", field),
			TemplateError::Invalid(field) => write!(f, "block template field invalid: {}", field),
		}
	}
}

impl error::Error for TemplateError {}

impl BlockTemplate {
	/// Two templates with the same identity produce the same task; used to
	/// debounce repeated daemon notifications.
	pub fn identity(&self) -> SHA256D {
		let mut stream = Stream::new();
		stream.append(&self.previous_header_hash).append(&self.height);
		stream.append(&CompactInteger::from(self.transactions.len()));
		for transaction in &self.transactions {
			stream.append(&transaction.identity());
		}
		dhash256(&stream.out())
	}

	/// Parses a `getblocktemplate` result.
	pub fn from_json(value: &Value) -> Result<BlockTemplate, TemplateError> {
		let version = get_u64(value, "version")? as u32;
		let previous_header_hash = get_hash(value, "previousblockhash")?;
		let time = get_u64(value, "curtime")? as u32;
		let bits = parse_bits(value)?;
		let height = get_u64(value, "height")? as u32;
		let coinbase_value = get_u64(value, "coinbasevalue")?;

		let mut transactions = Vec::new();
		if let Some(entries) = value.get("transactions") {
			let entries = entries.as_array().ok_or(TemplateError::Invalid("transactions"))?;
			for entry in entries {
				transactions.push(parse_transaction(entry)?);
			}
		}

		let mut auxes = Vec::new();
		if let Some(entries) = value.get("auxes") {
			let entries = entries.as_array().ok_or(TemplateError::Invalid("auxes"))?;
			for entry in entries {
				auxes.push(AuxWork {
					hash: get_hash(entry, "hash")?,
				});
			}
		}

		Ok(BlockTemplate {
			version,
			previous_header_hash,
			time,
			bits,
			height,
			coinbase_value,
			transactions,
			auxes,
			raw: value.clone(),
		})
	}
}

fn get_u64(value: &Value, field: &'static str) -> Result<u64, TemplateError> {
	value
		.get(field)
		.ok_or(TemplateError::Missing(field))?
		.as_u64()
		.ok_or(TemplateError::Invalid(field))
}

fn get_str<'a>(value: &'a Value, field: &'static str) -> Result<&'a str, TemplateError> {
	value
		.get(field)
		.ok_or(TemplateError::Missing(field))?
		.as_str()
		.ok_or(TemplateError::Invalid(field))
}

fn get_hash(value: &Value, field: &'static str) -> Result<SHA256D, TemplateError> {
	SHA256D::from_str(get_str(value, field)?).map_err(|_| TemplateError::Invalid(field))
}

fn parse_bits(value: &Value) -> Result<Compact, TemplateError> {
	let bits = get_str(value, "bits")?;
	u32::from_str_radix(bits, 16).map(Compact::new).map_err(|_| TemplateError::Invalid("bits"))
}

fn parse_transaction(entry: &Value) -> Result<TransactionTemplate, TemplateError> {
	let data = get_str(entry, "data")?.to_owned();
	if data.len() % 2 != 0 || !data.bytes().all(|b| b.is_ascii_hexdigit()) {
		return Err(TemplateError::Invalid("transaction data"));
	}

	let txid = match entry.get("txid") {
		Some(_) => Some(get_hash(entry, "txid")?),
		None => None,
	};
	let hash = match entry.get("hash") {
		Some(_) => get_hash(entry, "hash")?,
		None => match txid {
			Some(txid) => txid,
			None => dhash256(&data.parse::<primitives::bytes::Bytes>().map_err(|_| TemplateError::Invalid("transaction data"))?),
		},
	};

	Ok(TransactionTemplate { txid, hash, data })
}

#[cfg(test)]
mod tests {
	use super::{BlockTemplate, TemplateError};
	use bitcrypto::{dhash256, FromStr, SHA256D};
	use serde_json::json;

	fn template_json() -> serde_json::Value {
		json!({
			"version": 536870912u32,
			"previousblockhash": "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f",
			"curtime": 1521080000u32,
			"bits": "1d00ffff",
			"height": 512000u32,
			"coinbasevalue": 625000000u64,
			"transactions": [
				{
					"data": "0100000001abcdef",
					"txid": "c06fbab289f723c6261d3030ddb6be121f7d2508d77862bb1e484f5cd7f92b25",
					"hash": "5a4ebf66822b0b2d56bd9dc64ece0bc38ee7844a23ff1d7320a88c5fdb2ad3e2"
				},
				{
					"data": "0200000000"
				}
			],
			"auxes": [
				{ "hash": "8fb300e3fdb6f30a4c67233b997f99fdd518b968b9a3fd65857bfe78b2600719" }
			]
		})
	}

	#[test]
	fn test_from_json() {
		let template = BlockTemplate::from_json(&template_json()).unwrap();

		assert_eq!(template.height, 512000);
		assert_eq!(u32::from(template.bits), 0x1d00ffff);
		assert_eq!(template.transactions.len(), 2);
		assert_eq!(template.auxes.len(), 1);

		let segwit_tx = &template.transactions[0];
		assert_eq!(
			segwit_tx.txid,
			Some(SHA256D::from_str("c06fbab289f723c6261d3030ddb6be121f7d2508d77862bb1e484f5cd7f92b25").unwrap())
		);
		assert!(segwit_tx.txid != Some(segwit_tx.hash));

		// bare transaction falls back to hashing its data
		let bare_tx = &template.transactions[1];
		assert_eq!(bare_tx.txid, None);
		assert_eq!(bare_tx.hash, dhash256(&"0200000000".parse::<primitives::bytes::Bytes>().unwrap()));
	}

	#[test]
	fn test_identity_tracks_content() {
		let template = BlockTemplate::from_json(&template_json()).unwrap();
		let same = BlockTemplate::from_json(&template_json()).unwrap();
		assert_eq!(template.identity(), same.identity());

		let mut changed_json = template_json();
		changed_json["height"] = serde_json::json!(512001u32);
		let changed = BlockTemplate::from_json(&changed_json).unwrap();
		assert!(template.identity() != changed.identity());
	}

	#[test]
	fn test_missing_field() {
		let mut value = template_json();
		value.as_object_mut().unwrap().remove("height");
		assert_eq!(BlockTemplate::from_json(&value).unwrap_err(), TemplateError::Missing("height"));
	}

	#[test]
	fn test_invalid_transaction_data() {
		let mut value = template_json();
		value["transactions"][1]["data"] = serde_json::json!("xyz");
		assert!(BlockTemplate::from_json(&value).is_err());
	}
}
