//! p2pool-rs node: share-chain peer, task constructor and publisher front.

#[macro_use]
extern crate log;

mod config;
mod daemon;
mod publisher;

use crate::config::Config;
use crate::daemon::FeedWatcher;
use crate::publisher::TaskSink;
use miner::TaskServer;
use network::Params;
use p2p::{PeerCoordinator, P2P};
use sharechain::hash160_to_script;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio::sync::mpsc::unbounded_channel;

pub const USER_AGENT: &str = env!("CARGO_PKG_NAME");
pub const USER_AGENT_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PROTOCOL_VERSION: u32 = 1700;
pub const PROTOCOL_MINIMUM: u32 = 1600;

fn main() {
	env_logger::init();

	if let Err(err) = run() {
		eprintln!("error: {}", err);
		std::process::exit(1);
	}
}

fn run() -> Result<(), String> {
	let config = config::parse()?;

	let runtime = Runtime::new().map_err(|err| format!("failure starting tokio runtime: {}", err))?;
	runtime.block_on(run_async(config))
}

async fn run_async(config: Config) -> Result<(), String> {
	let params = Params::new(config.network);
	info!(
		"starting {} {} on {:?}, fee {}%",
		USER_AGENT, USER_AGENT_VERSION, config.network, config.fee_percent
	);

	let coordinator = Arc::new(PeerCoordinator::new(params));

	let (ready_events, mut ready_receiver) = unbounded_channel();
	let task_sink = Arc::new(TaskSink::new(ready_events));
	let watcher = Arc::new(FeedWatcher::new());

	let payout_script = hash160_to_script(&config.payout_pubkey_hash);
	let task_server = Arc::new(TaskServer::new(task_sink.clone(), watcher.clone(), payout_script));

	tokio::spawn(task_sink.clone().listen(config.publisher_address));
	tokio::spawn(daemon::listen(
		config.template_feed_address,
		watcher.clone(),
		task_server.clone(),
		coordinator.clone(),
	));

	if config.block_notify.enabled {
		tokio::spawn(task_server.clone().run_block_notify_listener(config.block_notify.address));
	} else {
		info!("block notify listener disabled, the daemon watcher polls on its own schedule");
	}

	// refresh mining info whenever the publisher becomes deliverable
	{
		let task_server = task_server.clone();
		tokio::spawn(async move {
			while ready_receiver.recv().await.is_some() {
				task_server.on_publisher_ready();
			}
		});
	}

	let p2p = P2P::new(config.p2p.clone(), coordinator);
	p2p.run().await;

	Err("p2p listener terminated".into())
}
