use charities_lib::types::{Charity, FinancialYear, OtherRegulator, Trustee};
use chrono::NaiveDate;
use tabled::{Table, Tabled};

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Tabled)]
struct CharityRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Registered")]
    registered: String,
    #[tabled(rename = "Income")]
    income: String,
}

#[derive(Tabled)]
struct DetailRow {
    #[tabled(rename = "Field")]
    field: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct TrusteeRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Chair")]
    chair: String,
    #[tabled(rename = "Appointed")]
    appointed: String,
}

#[derive(Tabled)]
struct FinancialRow {
    #[tabled(rename = "Year End")]
    year_end: String,
    #[tabled(rename = "Income")]
    income: String,
    #[tabled(rename = "Expenditure")]
    expenditure: String,
    #[tabled(rename = "Employees")]
    employees: String,
}

#[derive(Tabled)]
struct RegulatorRow {
    #[tabled(rename = "Regulator")]
    name: String,
    #[tabled(rename = "Website")]
    url: String,
}

// -- Row builders --

fn build_charity_rows(charities: &[Charity]) -> Vec<CharityRow> {
    charities
        .iter()
        .map(|c| CharityRow {
            id: c.id.clone(),
            name: c.name.clone(),
            status: c.status.to_string(),
            registered: format_date(c.date_registered),
            income: format_money(c.income),
        })
        .collect()
}

fn build_detail_rows(c: &Charity) -> Vec<DetailRow> {
    let text = |v: &Option<String>| v.clone().unwrap_or_default();
    let count = |v: Option<u32>| v.map(|n| n.to_string()).unwrap_or_default();
    let list = |v: &[String]| v.join("; ");
    vec![
        DetailRow { field: "ID", value: c.id.clone() },
        DetailRow { field: "Name", value: c.name.clone() },
        DetailRow { field: "Other names", value: list(&c.other_names) },
        DetailRow { field: "Status", value: c.status.to_string() },
        DetailRow { field: "Type", value: text(&c.charity_type) },
        DetailRow { field: "Company number", value: text(&c.company_number) },
        DetailRow { field: "Registered", value: format_date(c.date_registered) },
        DetailRow { field: "Removed", value: format_date(c.date_removed) },
        DetailRow { field: "Address", value: text(&c.address) },
        DetailRow { field: "Postcode", value: text(&c.postcode) },
        DetailRow { field: "Phone", value: text(&c.phone) },
        DetailRow { field: "Email", value: text(&c.email) },
        DetailRow { field: "Website", value: text(&c.website) },
        DetailRow { field: "Year end", value: format_date(c.financial_year_end) },
        DetailRow { field: "Income", value: format_money(c.income) },
        DetailRow { field: "Expenditure", value: format_money(c.expenditure) },
        DetailRow { field: "Employees", value: count(c.employees) },
        DetailRow { field: "Volunteers", value: count(c.volunteers) },
        DetailRow { field: "Trustees", value: count(c.trustees) },
        DetailRow { field: "Causes", value: list(&c.causes) },
        DetailRow { field: "Beneficiaries", value: list(&c.beneficiaries) },
        DetailRow { field: "Operations", value: list(&c.operations) },
        DetailRow { field: "Areas", value: list(&c.areas_of_operation) },
    ]
}

fn build_trustee_rows(trustees: &[Trustee]) -> Vec<TrusteeRow> {
    trustees
        .iter()
        .map(|t| TrusteeRow {
            name: t.name.clone(),
            role: t.role.clone().unwrap_or_default(),
            chair: if t.is_chair { "yes" } else { "" }.to_string(),
            appointed: format_date(t.appointed),
        })
        .collect()
}

fn build_financial_rows(years: &[FinancialYear]) -> Vec<FinancialRow> {
    years
        .iter()
        .map(|y| FinancialRow {
            year_end: format_date(y.year_end),
            income: format_money(y.income),
            expenditure: format_money(y.expenditure),
            employees: y.employees.map(|n| n.to_string()).unwrap_or_default(),
        })
        .collect()
}

fn build_regulator_rows(regulators: &[OtherRegulator]) -> Vec<RegulatorRow> {
    regulators
        .iter()
        .map(|r| RegulatorRow {
            name: r.name.clone(),
            url: r.url.clone().unwrap_or_default(),
        })
        .collect()
}

// -- Table output --

pub fn print_charities_table(charities: &[Charity]) {
    println!("{}", Table::new(build_charity_rows(charities)));
}

pub fn print_charity_detail(charity: &Charity) {
    println!("{}", Table::new(build_detail_rows(charity)));
}

pub fn print_trustees_table(trustees: &[Trustee]) {
    println!("{}", Table::new(build_trustee_rows(trustees)));
}

pub fn print_financials_table(years: &[FinancialYear]) {
    println!("{}", Table::new(build_financial_rows(years)));
}

pub fn print_regulators_table(regulators: &[OtherRegulator]) {
    println!("{}", Table::new(build_regulator_rows(regulators)));
}

// -- JSON output --

fn render_json<T: serde::Serialize>(data: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(data)
}

pub fn print_json<T: serde::Serialize>(data: &T) {
    match render_json(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_default()
}

fn format_money(value: Option<f64>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    if value >= 1_000_000.0 {
        format!("£{:.1}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("£{:.1}K", value / 1_000.0)
    } else {
        format!("£{:.0}", value)
    }
}
