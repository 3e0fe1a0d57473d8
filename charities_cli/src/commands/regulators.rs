use anyhow::Result;
use charities_lib::CharityRegulator;
use clap::Args;

use crate::output::{print_json, print_regulators_table, OutputFormat};

#[derive(Args)]
pub struct RegulatorsArgs {
    /// Registration number, with or without its prefix
    pub id: String,
}

pub async fn run(
    args: &RegulatorsArgs,
    client: &dyn CharityRegulator,
    format: &OutputFormat,
) -> Result<()> {
    let regulators = client.get_other_regulators(&args.id).await?;

    match format {
        OutputFormat::Table => print_regulators_table(&regulators),
        OutputFormat::Json => print_json(&regulators),
    }

    Ok(())
}
