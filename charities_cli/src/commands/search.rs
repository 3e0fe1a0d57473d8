use anyhow::Result;
use charities_lib::{CharityRegulator, SearchQuery};
use clap::Args;

use crate::output::{print_charities_table, print_json, OutputFormat};

#[derive(Args)]
pub struct SearchArgs {
    /// Charity name, or part of one
    pub text: String,

    /// Page number
    #[arg(long, default_value = "1")]
    pub page: u32,

    /// Results per page (OSCR always returns 100)
    #[arg(long, default_value = "20")]
    pub page_size: u32,
}

pub async fn run(
    args: &SearchArgs,
    client: &dyn CharityRegulator,
    format: &OutputFormat,
) -> Result<()> {
    let query = SearchQuery::text(&args.text)
        .with_page(args.page)
        .with_page_size(args.page_size);

    let resp = client.search(&query).await?;

    eprintln!(
        "Page {}/{} ({}{} total charities)",
        resp.page,
        resp.total_pages,
        if resp.total_is_estimate { "~" } else { "" },
        resp.total
    );

    match format {
        OutputFormat::Table => print_charities_table(&resp.items),
        OutputFormat::Json => print_json(&resp),
    }

    Ok(())
}
