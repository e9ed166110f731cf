//! Schedule output: a formatted table for the terminal, CSV, and JSON.

use std::io::Write;

use serde::Serialize;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};
use thiserror::Error;

use crate::engine::{LoanParameters, Money, Schedule, ScheduleRow, ScheduleSummary};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// `₹1234.50`
pub fn format_money(amount: Money, currency: &str) -> String {
    format!("{}{:.2}", currency, amount)
}

#[derive(Debug, Clone, Tabled)]
struct ScheduleTableRow {
    #[tabled(rename = "Month")]
    month: u32,

    #[tabled(rename = "EMI Paid")]
    emi_paid: String,

    #[tabled(rename = "Interest Paid")]
    interest_paid: String,

    #[tabled(rename = "Principal Paid")]
    principal_paid: String,

    #[tabled(rename = "Remaining Balance")]
    balance: String,
}

impl ScheduleTableRow {
    fn new(row: &ScheduleRow, currency: &str) -> Self {
        Self {
            month: row.month,
            emi_paid: format_money(row.emi_paid, currency),
            interest_paid: format_money(row.interest_paid, currency),
            principal_paid: format_money(row.principal_paid, currency),
            balance: format_money(row.balance, currency),
        }
    }
}

pub fn render_table(schedule: &Schedule, currency: &str) -> String {
    let rows = schedule.rows.iter().map(|row| ScheduleTableRow::new(row, currency));
    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
        .to_string()
}

/// One-line totals, e.g. for printing under the table.
pub fn render_summary(summary: &ScheduleSummary, currency: &str) -> String {
    let mut line = format!(
        "Paid off in {} months: total {}, interest {}, principal {}",
        summary.months_to_payoff,
        format_money(summary.total_paid, currency),
        format_money(summary.total_interest, currency),
        format_money(summary.total_principal, currency),
    );
    if summary.months_saved > 0 {
        line.push_str(&format!(" ({} months early)", summary.months_saved));
    }
    line
}

/// Plain numeric CSV, one record per month.
pub fn write_csv<W: Write>(schedule: &Schedule, writer: W) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in &schedule.rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct ScheduleReport<'a> {
    parameters: &'a LoanParameters,
    monthly_installment: Money,
    summary: ScheduleSummary,
    rows: &'a [ScheduleRow],
}

pub fn write_json<W: Write>(
    params: &LoanParameters,
    schedule: &Schedule,
    writer: W,
) -> Result<(), ExportError> {
    let report = ScheduleReport {
        parameters: params,
        monthly_installment: schedule.monthly_installment,
        summary: schedule.summary(),
        rows: &schedule.rows,
    };
    serde_json::to_writer_pretty(writer, &report)?;
    Ok(())
}
