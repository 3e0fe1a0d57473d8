use anyhow::Result;
use charities_lib::CharityRegulator;
use clap::Args;

use crate::output::{print_json, print_trustees_table, OutputFormat};

#[derive(Args)]
pub struct TrusteesArgs {
    /// Registration number, with or without its prefix
    pub id: String,
}

pub async fn run(
    args: &TrusteesArgs,
    client: &dyn CharityRegulator,
    format: &OutputFormat,
) -> Result<()> {
    let trustees = client.get_trustees(&args.id).await?;

    eprintln!("{} trustees", trustees.len());

    match format {
        OutputFormat::Table => print_trustees_table(&trustees),
        OutputFormat::Json => print_json(&trustees),
    }

    Ok(())
}
