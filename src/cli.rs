use clap::{Parser, Subcommand};

use crate::api::{BillingApi, ResourceClient, TokenStore, TOKEN_KEY};
use crate::error::ApiResult;
use crate::models::{Bill, Customer};
use crate::sync::SummaryStats;
use crate::ui::components::grid::GridRow;

#[derive(Parser, Debug)]
#[command(name = "billing-admin", version, about = "Manage customers and bills from the terminal")]
pub struct Cli {
    /// Base URL of the billing API, overriding BILLING_API_URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open the interactive terminal UI (default)
    Tui,
    /// Print all customers
    Customers,
    /// Print all bills
    Bills,
    /// Print customer count, bill count and total revenue
    Summary,
    /// Manage the stored access token
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum TokenAction {
    /// Store a bearer token for API requests
    Set { token: String },
    /// Remove the stored token
    Clear,
}

/// One-shot reports that print instead of opening the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    Customers,
    Bills,
    Summary,
}

impl Command {
    pub fn report(&self) -> Option<Report> {
        match self {
            Command::Customers => Some(Report::Customers),
            Command::Bills => Some(Report::Bills),
            Command::Summary => Some(Report::Summary),
            Command::Tui | Command::Token { .. } => None,
        }
    }
}

pub async fn run_report<C: ResourceClient>(api: &BillingApi<C>, report: Report) -> ApiResult<String> {
    let output = match report {
        Report::Customers => format_table(&api.list::<Customer>().await?),
        Report::Bills => format_table(&api.list::<Bill>().await?),
        Report::Summary => {
            let (customers, bills) = tokio::try_join!(api.list::<Customer>(), api.list::<Bill>())?;
            let stats = SummaryStats::compute(&customers, &bills);
            format!(
                "Total Customers: {}\nTotal Bills: {}\nTotal Revenue: {}\n",
                stats.customer_count,
                stats.bill_count,
                stats.revenue_display()
            )
        }
    };
    Ok(output)
}

pub fn run_token(store: &TokenStore, action: &TokenAction) -> ApiResult<String> {
    match action {
        TokenAction::Set { token } => {
            store.set(TOKEN_KEY, token.trim())?;
            Ok(format!("Token saved to {}", store.path().display()))
        }
        TokenAction::Clear => {
            if store.remove(TOKEN_KEY)? {
                Ok("Token removed".to_string())
            } else {
                Ok("No token was stored".to_string())
            }
        }
    }
}

/// Plain-text table with the same columns as the UI grid.
pub fn format_table<R: GridRow>(rows: &[R]) -> String {
    let columns = R::columns();
    let cells: Vec<Vec<String>> = rows.iter().map(|row| row.cells()).collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(column.header.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |values: Vec<&str>| {
        values
            .iter()
            .zip(&widths)
            .map(|(value, width)| format!("{:<width$}", value, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&line(columns.iter().map(|c| c.header).collect()));
    out.push('\n');
    for row in &cells {
        out.push_str(&line(row.iter().map(String::as_str).collect()));
        out.push('\n');
    }
    out
}
