use std::io::{self, BufRead, Write};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use raven_service::SearchService;
use raven_storage::qdrant::QdrantStore;

#[derive(Debug, Parser)]
#[command(
	version = raven_cli::VERSION,
	rename_all = "kebab",
	styles = raven_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: std::path::PathBuf,
	/// Override the configured number of displayed results.
	#[arg(long, value_name = "N")]
	pub limit: Option<u32>,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = raven_config::load(&args.config)?;
	let filter = EnvFilter::new(config.service.log_level.clone());
	tracing_subscriber::fmt().with_env_filter(filter).init();

	let qdrant = QdrantStore::new(&config.storage.qdrant)?;
	let limit = args.limit.unwrap_or(config.search.top_k);
	let service = SearchService::new(config, qdrant);
	let stdin = io::stdin();

	println!("Raven email search. Type a query, /q to quit.");

	loop {
		print!(">>> ");
		io::stdout().flush()?;

		let mut line = String::new();

		if stdin.lock().read_line(&mut line)? == 0 {
			break;
		}

		let query = line.trim();

		if query.is_empty() {
			continue;
		}
		if matches!(query, "/quit" | "/q") {
			break;
		}

		let intent = match service.interpret(query).await {
			Ok(intent) => intent,
			Err(err) => {
				eprintln!("{err}");

				continue;
			},
		};

		tracing::info!(
			intent = intent.kind.as_str(),
			topic = %intent.topic,
			companies = intent.filters.companies.len(),
			keywords = intent.filters.keywords.len(),
			"Interpreted query."
		);

		let payload = service.execute_search(&intent, limit).await;

		println!("{}", serde_json::to_string_pretty(&payload)?);
	}

	Ok(())
}
