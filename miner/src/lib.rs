extern crate bitcrypto;
#[macro_use]
extern crate log;
extern crate parking_lot;
extern crate primitives;
extern crate ser;
extern crate sharechain;

mod block_template;
mod server;
mod task;

pub use primitives::bytes;

pub use crate::block_template::{AuxWork, BlockTemplate, TemplateError};
pub use crate::server::{DaemonWatcher, TaskMessage, TaskPublisher, TaskServer};
pub use crate::task::{build_task, stratum_prev_hash, StratumParams, Task, EXTRANONCE_SIZE};
