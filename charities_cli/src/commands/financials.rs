use anyhow::Result;
use charities_lib::CharityRegulator;
use clap::Args;

use crate::output::{print_financials_table, print_json, OutputFormat};

#[derive(Args)]
pub struct FinancialsArgs {
    /// Registration number, with or without its prefix
    pub id: String,
}

pub async fn run(
    args: &FinancialsArgs,
    client: &dyn CharityRegulator,
    format: &OutputFormat,
) -> Result<()> {
    let years = client.get_financial_history(&args.id).await?;

    match format {
        OutputFormat::Table => print_financials_table(&years),
        OutputFormat::Json => print_json(&years),
    }

    Ok(())
}
