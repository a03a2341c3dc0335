use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	raven_shell::run(raven_shell::Args::parse()).await
}
