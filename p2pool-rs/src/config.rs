use crate::{PROTOCOL_MINIMUM, PROTOCOL_VERSION, USER_AGENT, USER_AGENT_VERSION};
use bitcrypto::{FromStr, HASH160};
use clap::{App, Arg, ArgMatches};
use network::Network;
use std::net::SocketAddr;

#[derive(Debug, Clone)]
pub struct BlockNotifyConfig {
	pub enabled: bool,
	pub address: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct Config {
	pub network: Network,
	pub p2p: p2p::Config,
	/// Key hash the generation transaction pays out to.
	pub payout_pubkey_hash: HASH160,
	pub fee_percent: f64,
	/// Downstream task publisher socket.
	pub publisher_address: SocketAddr,
	/// Socket the daemon watcher delivers block templates to.
	pub template_feed_address: SocketAddr,
	pub block_notify: BlockNotifyConfig,
}

pub fn parse() -> Result<Config, String> {
	let matches = App::new(USER_AGENT)
		.version(USER_AGENT_VERSION)
		.about("peer-to-peer mining pool coordinator")
		.arg(Arg::with_name("testnet").long("testnet").help("Use the test network"))
		.arg(
			Arg::with_name("host")
				.long("host")
				.takes_value(true)
				.default_value("0.0.0.0")
				.help("Address the p2p listener binds to"),
		)
		.arg(
			Arg::with_name("port")
				.long("port")
				.takes_value(true)
				.default_value("9333")
				.help("Port the p2p listener binds to"),
		)
		.arg(
			Arg::with_name("connect")
				.long("connect")
				.takes_value(true)
				.multiple(true)
				.number_of_values(1)
				.help("Connect to this peer on startup, may be repeated"),
		)
		.arg(
			Arg::with_name("address")
				.long("address")
				.takes_value(true)
				.required(true)
				.help("Payout pubkey hash, 40 hex characters"),
		)
		.arg(
			Arg::with_name("fee")
				.long("fee")
				.takes_value(true)
				.default_value("0")
				.help("Pool fee percentage"),
		)
		.arg(
			Arg::with_name("publisher-port")
				.long("publisher-port")
				.takes_value(true)
				.default_value("9335")
				.help("Port serialized tasks are published on"),
		)
		.arg(
			Arg::with_name("template-feed-port")
				.long("template-feed-port")
				.takes_value(true)
				.default_value("9336")
				.help("Port the daemon watcher delivers block templates to"),
		)
		.arg(
			Arg::with_name("blocknotify-host")
				.long("blocknotify-host")
				.takes_value(true)
				.default_value("127.0.0.1")
				.help("Address of the block notify listener"),
		)
		.arg(
			Arg::with_name("blocknotify-port")
				.long("blocknotify-port")
				.takes_value(true)
				.default_value("9337")
				.help("Port of the block notify listener"),
		)
		.arg(
			Arg::with_name("no-blocknotify")
				.long("no-blocknotify")
				.help("Disable the block notify listener"),
		)
		.get_matches();

	build(&matches)
}

fn build(matches: &ArgMatches) -> Result<Config, String> {
	let network = if matches.is_present("testnet") {
		Network::Testnet
	} else {
		Network::Mainnet
	};

	let host = matches.value_of("host").expect("has default");
	let port: u16 = matches
		.value_of("port")
		.expect("has default")
		.parse()
		.map_err(|_| "invalid p2p port".to_owned())?;
	let local_address = parse_address(host, port)?;

	let mut peers = Vec::new();
	if let Some(values) = matches.values_of("connect") {
		for value in values {
			peers.push(value.parse().map_err(|_| format!("invalid peer address {}", value))?);
		}
	}

	let payout_pubkey_hash =
		HASH160::from_str(matches.value_of("address").expect("required")).map_err(|_| "invalid payout pubkey hash".to_owned())?;

	let fee_percent: f64 = matches
		.value_of("fee")
		.expect("has default")
		.parse()
		.map_err(|_| "invalid fee percentage".to_owned())?;
	if !(0.0..=100.0).contains(&fee_percent) {
		return Err("fee percentage out of range".into());
	}

	let publisher_port: u16 = matches
		.value_of("publisher-port")
		.expect("has default")
		.parse()
		.map_err(|_| "invalid publisher port".to_owned())?;
	let template_feed_port: u16 = matches
		.value_of("template-feed-port")
		.expect("has default")
		.parse()
		.map_err(|_| "invalid template feed port".to_owned())?;

	let blocknotify_host = matches.value_of("blocknotify-host").expect("has default");
	let blocknotify_port: u16 = matches
		.value_of("blocknotify-port")
		.expect("has default")
		.parse()
		.map_err(|_| "invalid block notify port".to_owned())?;

	Ok(Config {
		network,
		p2p: p2p::Config {
			protocol_version: PROTOCOL_VERSION,
			protocol_minimum: PROTOCOL_MINIMUM,
			local_address,
			peers,
			user_agent: format!("/{}:{}/", USER_AGENT, USER_AGENT_VERSION),
		},
		payout_pubkey_hash,
		fee_percent,
		publisher_address: parse_address("127.0.0.1", publisher_port)?,
		template_feed_address: parse_address("127.0.0.1", template_feed_port)?,
		block_notify: BlockNotifyConfig {
			enabled: !matches.is_present("no-blocknotify"),
			address: parse_address(blocknotify_host, blocknotify_port)?,
		},
	})
}

fn parse_address(host: &str, port: u16) -> Result<SocketAddr, String> {
	format!("{}:{}", host, port)
		.parse()
		.map_err(|_| format!("invalid address {}:{}", host, port))
}
