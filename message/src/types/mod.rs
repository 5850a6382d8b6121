mod forget_tx;
mod have_tx;
mod losing_tx;
mod remember_tx;
pub mod version;

pub use self::forget_tx::ForgetTx;
pub use self::have_tx::HaveTx;
pub use self::losing_tx::LosingTx;
pub use self::remember_tx::RememberTx;
pub use self::version::Version;

/// Upper bound on the number of hashes carried by a single tx-awareness
/// message.
pub const MAX_TX_HASHES: usize = 100_000;
