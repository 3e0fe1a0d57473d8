use anyhow::Result;
use charities_lib::CharityRegulator;
use clap::Args;

use crate::output::{print_charity_detail, print_json, OutputFormat};

#[derive(Args)]
pub struct CharityArgs {
    /// Registration number, with or without its prefix (e.g. GB-CHC-1234567)
    pub id: String,
}

pub async fn run(
    args: &CharityArgs,
    client: &dyn CharityRegulator,
    format: &OutputFormat,
) -> Result<()> {
    let Some(charity) = client.get_charity(&args.id).await? else {
        eprintln!("No {} charity found for {}", client.regulator(), args.id);
        return Ok(());
    };

    match format {
        OutputFormat::Table => print_charity_detail(&charity),
        OutputFormat::Json => print_json(&charity),
    }

    Ok(())
}
