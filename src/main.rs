//! Command-line entry point: serve the client-id endpoint or fetch one Bitcoin quote.

// std
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
// crates.io
use clap::{Parser, Subcommand};
use color_eyre::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
// self
use oauth2_price_kit::{
	config::AppConfig,
	http::ReqwestHttpClient,
	price::{PriceTracker, ReqwestPriceClient},
	server::{self, DEFAULT_CLIENT_NAME},
};

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
	/// JSON configuration file; defaults apply when omitted.
	#[arg(long, short, global = true, env = "APP_CONFIG")]
	config: Option<PathBuf>,
	#[command(subcommand)]
	command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
	/// Serve the anonymous client-id endpoint.
	Serve {
		/// OAuth client binding whose identifier is served.
		#[arg(long, default_value = DEFAULT_CLIENT_NAME)]
		client: String,
		/// Overrides `server.listen`.
		#[arg(long)]
		listen: Option<SocketAddr>,
	},
	/// Fetch the latest BTC-USDT quote and print it as JSON.
	Price,
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	dotenvy::dotenv().ok();
	tracing_subscriber::registry()
		.with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.with(tracing_subscriber::fmt::layer())
		.init();

	let cli = Cli::parse();
	let mut config = match cli.config.as_ref() {
		Some(path) => AppConfig::from_path(path)?,
		None => AppConfig::default(),
	};

	config.apply_process_env()?;

	match cli.command {
		Command::Serve { client, listen } => serve(config, &client, listen).await,
		Command::Price => print_price(&config).await,
	}
}

async fn serve(config: AppConfig, client: &str, listen: Option<SocketAddr>) -> Result<()> {
	let router = server::routes(&config, client)?.into_router();
	let tracker = match config.price.poll_interval() {
		Some(period) => {
			let client =
				ReqwestPriceClient::from_config(&config.price, ReqwestHttpClient::default())?;

			tracing::info!(?period, endpoint = %client.endpoint(), "price tracker enabled");

			Some(Arc::new(PriceTracker::new(client)).spawn(period))
		},
		None => None,
	};
	let addr = listen.unwrap_or(config.server.listen);
	let listener = tokio::net::TcpListener::bind(addr).await?;

	tracing::info!(%addr, client, "serving client id endpoint");

	let served = axum::serve(listener, router).await;

	if let Some(handle) = tracker {
		handle.abort();
	}

	Ok(served?)
}

async fn print_price(config: &AppConfig) -> Result<()> {
	let client = ReqwestPriceClient::from_config(&config.price, ReqwestHttpClient::default())?;
	let price = client.latest().await?;

	println!("{}", serde_json::to_string_pretty(&price)?);

	Ok(())
}
