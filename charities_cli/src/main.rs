mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use charities_lib::{client_for, ClientConfig, Regulator};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "charities")]
#[command(about = "Query the UK charity registers (England and Wales, Scotland, Northern Ireland)")]
struct Cli {
    /// Register to query: ccew, oscr or ccni
    #[arg(long, default_value = "ccew", global = true)]
    regulator: Regulator,

    /// Output format: table or json
    #[arg(long, default_value = "table", global = true)]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search charities by name
    Search(commands::search::SearchArgs),
    /// Show a single charity
    Get(commands::charity::CharityArgs),
    /// List a charity's trustees
    Trustees(commands::trustees::TrusteesArgs),
    /// Show a charity's financial history
    Financials(commands::financials::FinancialsArgs),
    /// List other bodies regulating a charity
    Regulators(commands::regulators::RegulatorsArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("charities=info".parse()?),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let format = match cli.output.as_str() {
        "json" => OutputFormat::Json,
        _ => OutputFormat::Table,
    };

    let config = ClientConfig::from_env(cli.regulator.code());
    let client = client_for(cli.regulator, config).with_context(|| {
        format!(
            "Could not create the {} client (set {}_API_KEY?)",
            cli.regulator,
            cli.regulator.code()
        )
    })?;
    let client = client.as_ref();

    match &cli.command {
        Commands::Search(args) => commands::search::run(args, client, &format).await?,
        Commands::Get(args) => commands::charity::run(args, client, &format).await?,
        Commands::Trustees(args) => commands::trustees::run(args, client, &format).await?,
        Commands::Financials(args) => commands::financials::run(args, client, &format).await?,
        Commands::Regulators(args) => commands::regulators::run(args, client, &format).await?,
    }

    Ok(())
}
