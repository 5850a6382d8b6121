extern crate bitcrypto;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;
extern crate network;
extern crate primitives;
extern crate rayon;
extern crate ser;

pub mod merkle;

mod hash_link;
mod script;
mod share;
mod share_info;
mod small_block_header;
mod template;

pub use primitives::{bytes, compact};

pub use crate::hash_link::HashLink;
pub use crate::script::hash160_to_script;
pub use crate::share::{Share, DONATION_SCRIPT, GENTX_BEFORE_REFHASH, SHARE_VERSION_LEGACY, SHARE_VERSION_SEGWIT};
pub use crate::share_info::{SegwitInfo, ShareData, ShareInfo, StaleInfo, TxHashRef};
pub use crate::small_block_header::SmallBlockHeader;
pub use crate::template::TransactionTemplate;

/// Share-buffer level failure. Validation failures never surface here, they
/// only clear the share's validity flag.
#[derive(Debug, PartialEq)]
pub enum Error {
	/// Share version missing from the registry.
	UnknownVersion(u64),
	/// Buffer-level failure.
	Reader(ser::Error),
}

impl From<ser::Error> for Error {
	fn from(err: ser::Error) -> Self {
		Error::Reader(err)
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match *self {
			Error::UnknownVersion(version) => write!(f, "unknown share version {}", version),
			Error::Reader(ref err) => write!(f, "share buffer error: {}", err),
		}
	}
}

impl std::error::Error for Error {}
