//! E2E tests for the non-interactive `schedule` command

use std::process::{Command, Output};

fn emicalc(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_emicalc"))
        .args(args)
        .output()
        .expect("Failed to execute command")
}

#[test]
fn schedule_table_output() {
    let output = emicalc(&["schedule", "-a", "100000", "-r", "10", "-t", "12"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("EMI Paid"));
    assert!(stdout.contains("Remaining Balance"));
    assert!(stdout.contains("₹8791.59"));
    assert!(stdout.contains("Paid off in 12 months"));
}

#[test]
fn schedule_currency_symbol() {
    let output = emicalc(&["schedule", "-a", "100000", "-r", "10", "-t", "12", "--currency", "$"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("$8791.59"));
    assert!(!stdout.contains("₹"));
}

#[test]
fn schedule_csv_output() {
    let output = emicalc(&[
        "schedule", "-a", "50000", "-r", "12", "-t", "24", "-x", "5000", "--format", "csv",
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert_eq!(lines[0], "month,emi_paid,interest_paid,principal_paid,balance");
    assert!(lines.len() - 1 < 24);
    assert!(lines.last().unwrap().ends_with(",0.00"));
}

#[test]
fn schedule_json_output() {
    let output = emicalc(&["schedule", "-a", "100000", "-r", "10", "-t", "12", "-f", "json"]);

    assert!(output.status.success(), "Command failed: {:?}", output);
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["summary"]["months_to_payoff"], 12);
    assert_eq!(value["rows"][0]["balance"], "92041.74");
}

#[test]
fn schedule_writes_output_file() {
    let path = std::env::temp_dir().join("emicalc-cli-test.csv");
    let output = emicalc(&[
        "schedule",
        "-a",
        "100000",
        "-r",
        "10",
        "-t",
        "12",
        "-f",
        "csv",
        "-o",
        path.to_str().unwrap(),
    ]);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(output.stdout.is_empty());
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written.lines().count(), 13);
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn schedule_rejects_invalid_fields() {
    let output = emicalc(&["schedule", "-a", "5000001", "-r", "abc", "-t", "12"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("Loan amount must be greater than 0 and less than or equal to 5,000,000."));
    assert!(stderr.contains("Interest Rate (%) must be a number"));
}

#[test]
fn schedule_rejects_large_prepayment() {
    let output = emicalc(&["schedule", "-a", "40000", "-r", "10", "-t", "12", "-x", "26000"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("Prepayment must be less than or equal to half of the loan amount."));
}

#[test]
fn schedule_rejects_negative_amount() {
    let output = emicalc(&["schedule", "-a", "-100", "-r", "10", "-t", "12"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Loan amount must be greater than 0"));
}
