//! Main entry point for the uncle detector.
//!
//! This binary answers whether a mined transaction was also included in an
//! uncle block of its mined block or one of the recent ancestors. It can check
//! a single hash from the command line or serve the lookup over HTTP.

use clap::{builder::FalseyValueParser, ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use uncled_config::{Config, ConfigError};
use uncled_core::{SearchConfig, UncleSearchEngine};
use uncled_reader::implementations::evm::alloy::create_reader;

mod apis;
mod cli;
mod output;
mod pages;
mod server;

/// Command-line arguments for the uncle detector.
#[derive(Parser, Debug)]
#[command(name = "uncled", author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, global = true)]
	config: Option<PathBuf>,

	/// Eth node URI (eth node, Infura, etc.), overrides the configuration file
	#[arg(long, env = "ETH_NODE_URI", global = true)]
	eth: Option<String>,

	/// Number of blocks searched, the mined block included
	#[arg(long, global = true)]
	depth: Option<u64>,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info", global = true)]
	log_level: String,

	/// Emit logs as JSON
	#[arg(long, env = "LOG_JSON", global = true, action = ArgAction::SetTrue, value_parser = FalseyValueParser::new())]
	log_json: bool,

	/// Shorthand for `--log-level debug`
	#[arg(long, env = "DEBUG", global = true, action = ArgAction::SetTrue, value_parser = FalseyValueParser::new())]
	debug: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Check a single transaction and print the result
	Check {
		/// Transaction hash, 0x-prefixed
		#[arg(long)]
		tx: String,
	},
	/// Serve the lookup pages and the JSON API
	Serve {
		/// Address to listen on, overrides the configured host and port
		#[arg(long, env = "ADDR")]
		addr: Option<String>,
	},
}

/// Main entry point for the uncle detector.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Resolves configuration from file and flags
/// 4. Builds the search engine on top of the node reader
/// 5. Runs the selected subcommand
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	init_tracing(&args);

	let config = resolve_config(&args).await?;
	tracing::info!(
		depth = config.search.depth,
		timeout_seconds = config.node.timeout_seconds,
		"Loaded configuration"
	);

	let reader = create_reader(&config.node.rpc_url, config.node.timeout_seconds)?;
	let engine = UncleSearchEngine::new(
		Arc::from(reader),
		SearchConfig {
			depth: config.search.depth,
		},
	);

	match args.command {
		Command::Check { tx } => match cli::check(&engine, &tx).await {
			Ok(line) => println!("{}", line),
			Err(e) => {
				eprintln!("error: {}", e);
				std::process::exit(1);
			},
		},
		Command::Serve { addr } => {
			let bind_address = addr.unwrap_or_else(|| config.api.bind_address());
			server::start_server(&bind_address, Arc::new(engine)).await?;
			tracing::info!("Stopped server");
		},
	}

	Ok(())
}

/// Initializes tracing on stderr, leaving stdout to command output.
fn init_tracing(args: &Args) {
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = if args.debug {
		"debug".to_string()
	} else {
		args.log_level.clone()
	};
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	let builder = fmt()
		.with_writer(std::io::stderr)
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true);

	if args.log_json {
		builder.json().init();
	} else {
		builder.init();
	}
}

/// Loads the configuration file, if any, and applies flag overrides.
async fn resolve_config(args: &Args) -> Result<Config, ConfigError> {
	let mut config = match &args.config {
		Some(path) => Config::from_file(&path.to_string_lossy()).await?,
		None => Config::for_node(args.eth.clone().unwrap_or_default())?,
	};

	if let Some(eth) = &args.eth {
		config.node.rpc_url = eth.clone();
	}
	if let Some(depth) = args.depth {
		config.search.depth = depth;
	}

	config.validate()?;
	Ok(config)
}
