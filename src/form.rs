//! Loan form: raw text fields, typed parsing, and the bounds a submission must
//! satisfy before the engine runs.

use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;

use crate::engine::{LoanParameters, Money};

pub const MAX_LOAN_AMOUNT: Money = dec!(5000000);
pub const MIN_INTEREST_RATE: Decimal = dec!(1);
pub const MAX_INTEREST_RATE: Decimal = dec!(30);
pub const MIN_TENURE_MONTHS: u32 = 1;
pub const MAX_TENURE_MONTHS: u32 = 360;
/// Prepayments at or below this are always accepted.
pub const PREPAYMENT_FLOOR: Money = dec!(25000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    LoanAmount,
    InterestRate,
    LoanTenure,
    ExtraEmi,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::LoanAmount,
        Field::InterestRate,
        Field::LoanTenure,
        Field::ExtraEmi,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::LoanAmount => "Loan Amount",
            Field::InterestRate => "Interest Rate (%)",
            Field::LoanTenure => "Loan Tenure (Months)",
            Field::ExtraEmi => "Prepayment/Extra EMI (Optional)",
        }
    }

    fn noun(self) -> &'static str {
        match self {
            Field::LoanAmount => "loan amount",
            Field::InterestRate => "interest rate",
            Field::LoanTenure => "loan tenure",
            Field::ExtraEmi => "prepayment",
        }
    }

    fn range_message(self) -> &'static str {
        match self {
            Field::LoanAmount => "Loan amount must be greater than 0 and less than or equal to 5,000,000.",
            Field::InterestRate => "Interest rate must be between 1% and 30%.",
            Field::LoanTenure => "Loan tenure must be between 1 month and 360 months.",
            Field::ExtraEmi => "Prepayment cannot be negative.",
        }
    }

    pub fn next(self) -> Field {
        match self {
            Field::LoanAmount => Field::InterestRate,
            Field::InterestRate => Field::LoanTenure,
            Field::LoanTenure => Field::ExtraEmi,
            Field::ExtraEmi => Field::LoanAmount,
        }
    }

    pub fn previous(self) -> Field {
        match self {
            Field::LoanAmount => Field::ExtraEmi,
            Field::InterestRate => Field::LoanAmount,
            Field::LoanTenure => Field::InterestRate,
            Field::ExtraEmi => Field::LoanTenure,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("Please input {}!", .0.noun())]
    Missing(Field),

    #[error("{} must be a number, got {input:?}.", .field.label())]
    NotANumber { field: Field, input: String },

    #[error("{}", .0.range_message())]
    OutOfRange(Field),

    #[error("Loan tenure must be a whole number of months.")]
    FractionalTenure,

    #[error("Prepayment must be less than or equal to half of the loan amount.")]
    PrepaymentTooLarge,
}

impl FieldError {
    pub fn field(&self) -> Field {
        match self {
            FieldError::Missing(field) | FieldError::OutOfRange(field) => *field,
            FieldError::NotANumber { field, .. } => *field,
            FieldError::FractionalTenure => Field::LoanTenure,
            FieldError::PrepaymentTooLarge => Field::ExtraEmi,
        }
    }
}

/// Every field that failed, at most one error per field, in form order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} field(s) failed validation", .0.len())]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn for_field(&self, field: Field) -> Option<&FieldError> {
        self.0.iter().find(|e| e.field() == field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The form as typed: text per field, nothing parsed yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoanForm {
    pub loan_amount: String,
    pub interest_rate: String,
    pub loan_tenure: String,
    pub extra_emi: String,
}

impl LoanForm {
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::LoanAmount => &self.loan_amount,
            Field::InterestRate => &self.interest_rate,
            Field::LoanTenure => &self.loan_tenure,
            Field::ExtraEmi => &self.extra_emi,
        }
    }

    pub fn value_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::LoanAmount => &mut self.loan_amount,
            Field::InterestRate => &mut self.interest_rate,
            Field::LoanTenure => &mut self.loan_tenure,
            Field::ExtraEmi => &mut self.extra_emi,
        }
    }

    /// Parse and bound-check every field, producing the parameter snapshot
    /// for the engine or the full list of field errors.
    pub fn validate(&self) -> Result<LoanParameters, ValidationErrors> {
        let mut errors = Vec::new();

        let amount = parse_number(Field::LoanAmount, &self.loan_amount);
        let principal = match &amount {
            Ok(Some(a)) if *a > Decimal::ZERO && *a <= MAX_LOAN_AMOUNT => Some(*a),
            Ok(Some(_)) => {
                errors.push(FieldError::OutOfRange(Field::LoanAmount));
                None
            }
            Ok(None) => {
                errors.push(FieldError::Missing(Field::LoanAmount));
                None
            }
            Err(e) => {
                errors.push(e.clone());
                None
            }
        };

        let rate = match parse_number(Field::InterestRate, &self.interest_rate) {
            Ok(Some(r)) if (MIN_INTEREST_RATE..=MAX_INTEREST_RATE).contains(&r) => Some(r),
            Ok(Some(_)) => {
                errors.push(FieldError::OutOfRange(Field::InterestRate));
                None
            }
            Ok(None) => {
                errors.push(FieldError::Missing(Field::InterestRate));
                None
            }
            Err(e) => {
                errors.push(e);
                None
            }
        };

        let tenure = match parse_tenure(&self.loan_tenure) {
            Ok(t) => Some(t),
            Err(e) => {
                errors.push(e);
                None
            }
        };

        // The prepayment rule needs a numeric loan amount, in range or not.
        let loan_amount = amount.ok().flatten();
        let extra = match parse_extra(&self.extra_emi, loan_amount) {
            Ok(x) => Some(x),
            Err(e) => {
                errors.push(e);
                None
            }
        };

        match (principal, rate, tenure, extra) {
            (Some(principal), Some(rate), Some(tenure), Some(extra)) if errors.is_empty() => {
                Ok(LoanParameters::new(principal, rate, tenure).with_extra_payment(extra))
            }
            _ => Err(ValidationErrors(errors)),
        }
    }
}

/// `Ok(None)` for a blank field. Anything that isn't a plain decimal is
/// rejected rather than coerced.
fn parse_number(field: Field, input: &str) -> Result<Option<Decimal>, FieldError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let not_a_number = || FieldError::NotANumber {
        field,
        input: input.to_string(),
    };
    if !is_plain_decimal(trimmed) {
        return Err(not_a_number());
    }
    trimmed.parse::<Decimal>().map(Some).map_err(|_| not_a_number())
}

// Optional leading sign, digits, at most one point. `Decimal::from_str` also
// skips `_` separators, which a typed amount should never contain.
fn is_plain_decimal(input: &str) -> bool {
    let unsigned = input.strip_prefix(['-', '+']).unwrap_or(input);
    unsigned.chars().any(|c| c.is_ascii_digit())
        && unsigned.chars().all(|c| c.is_ascii_digit() || c == '.')
        && unsigned.matches('.').count() <= 1
}

fn parse_tenure(input: &str) -> Result<u32, FieldError> {
    let months = parse_number(Field::LoanTenure, input)?.ok_or(FieldError::Missing(Field::LoanTenure))?;

    let min = Decimal::from(MIN_TENURE_MONTHS);
    let max = Decimal::from(MAX_TENURE_MONTHS);
    if months < min || months > max {
        return Err(FieldError::OutOfRange(Field::LoanTenure));
    }
    if !months.fract().is_zero() {
        return Err(FieldError::FractionalTenure);
    }

    months.to_u32().ok_or(FieldError::OutOfRange(Field::LoanTenure))
}

fn parse_extra(input: &str, loan_amount: Option<Money>) -> Result<Money, FieldError> {
    let extra = match parse_number(Field::ExtraEmi, input)? {
        Some(x) => x,
        None => return Ok(Decimal::ZERO),
    };

    if extra < Decimal::ZERO {
        return Err(FieldError::OutOfRange(Field::ExtraEmi));
    }

    if let Some(amount) = loan_amount {
        if extra > amount / dec!(2) && extra > PREPAYMENT_FLOOR {
            return Err(FieldError::PrepaymentTooLarge);
        }
    }

    Ok(extra)
}
