use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = rag_api::Args::parse();
	rag_api::run(args).await
}
