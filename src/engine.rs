//! Amortization engine: loan parameters in, month-by-month payoff schedule out.
//!
//! Pure and deterministic. All arithmetic is done in `rust_decimal::Decimal`;
//! every value stored on a [`ScheduleRow`] is rounded to two fractional digits.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Currency amounts.
pub type Money = Decimal;

/// Rates. Annual rates are percentages (10 = 10%), monthly rates are fractions.
pub type Rate = Decimal;

const MONTHS_PER_YEAR: Decimal = dec!(12);
const PERCENT: Decimal = dec!(100);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("loan tenure must be at least one month")]
    ZeroTenure,

    #[error("installment overflowed compounding {monthly_rate} per month over {tenure_months} months")]
    Overflow {
        monthly_rate: Rate,
        tenure_months: u32,
    },

    #[error("division by zero in {context}")]
    DivisionByZero { context: &'static str },
}

/// Snapshot of the loan taken when the form is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanParameters {
    pub principal: Money,
    pub annual_rate_percent: Rate,
    pub tenure_months: u32,
    #[serde(default)]
    pub extra_monthly_payment: Money,
}

impl LoanParameters {
    pub fn new(principal: Money, annual_rate_percent: Rate, tenure_months: u32) -> Self {
        Self {
            principal,
            annual_rate_percent,
            tenure_months,
            extra_monthly_payment: Decimal::ZERO,
        }
    }

    pub fn with_extra_payment(self, extra_monthly_payment: Money) -> Self {
        Self {
            extra_monthly_payment,
            ..self
        }
    }

    /// `(annual_rate_percent / 100) / 12`
    pub fn monthly_rate(&self) -> Rate {
        self.annual_rate_percent / PERCENT / MONTHS_PER_YEAR
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// 1-based, no gaps.
    pub month: u32,
    pub emi_paid: Money,
    pub interest_paid: Money,
    pub principal_paid: Money,
    /// Remaining balance after this month's payment, never negative.
    pub balance: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schedule {
    /// Contracted installment before any extra payment, rounded to 2 dp.
    pub monthly_installment: Money,
    pub extra_payment: Money,
    pub tenure_months: u32,
    pub rows: Vec<ScheduleRow>,
}

/// Totals derived from a [`Schedule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleSummary {
    pub months_to_payoff: u32,
    pub months_saved: u32,
    pub total_paid: Money,
    pub total_interest: Money,
    pub total_principal: Money,
}

impl Schedule {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last(&self) -> Option<&ScheduleRow> {
        self.rows.last()
    }

    pub fn summary(&self) -> ScheduleSummary {
        let months_to_payoff = self.rows.len() as u32;
        let (total_paid, total_interest, total_principal) = self.rows.iter().fold(
            (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
            |(paid, interest, principal), row| {
                (
                    paid + row.emi_paid,
                    interest + row.interest_paid,
                    principal + row.principal_paid,
                )
            },
        );
        ScheduleSummary {
            months_to_payoff,
            months_saved: self.tenure_months.saturating_sub(months_to_payoff),
            total_paid,
            total_interest,
            total_principal,
        }
    }
}

/// Round a currency amount to exactly 2 dp, halves away from zero.
pub fn round_money(amount: Money) -> Money {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Standard fixed-rate installment: `P * r(1+r)^n / ((1+r)^n - 1)`.
///
/// A zero rate amortises straight-line, `P / n`. The result is not rounded.
pub fn base_emi(principal: Money, monthly_rate: Rate, tenure_months: u32) -> Result<Money, EngineError> {
    if tenure_months == 0 {
        return Err(EngineError::ZeroTenure);
    }

    if monthly_rate.is_zero() {
        return Ok(principal / Decimal::from(tenure_months));
    }

    let overflow = || EngineError::Overflow {
        monthly_rate,
        tenure_months,
    };

    // (1 + r)^n via iterative multiplication
    let growth = Decimal::ONE + monthly_rate;
    let mut compound = Decimal::ONE;
    for _ in 0..tenure_months {
        compound = compound.checked_mul(growth).ok_or_else(overflow)?;
    }

    let numerator = principal
        .checked_mul(monthly_rate)
        .and_then(|n| n.checked_mul(compound))
        .ok_or_else(overflow)?;
    let denominator = compound.checked_sub(Decimal::ONE).ok_or_else(overflow)?;

    if denominator.is_zero() {
        return Err(EngineError::DivisionByZero {
            context: "installment denominator",
        });
    }

    numerator.checked_div(denominator).ok_or_else(overflow)
}

/// Produce the month-by-month payoff schedule for `params`.
///
/// Ranges are not validated here; see [`crate::form`]. The schedule stops at
/// `tenure_months` rows or as soon as the balance is paid off, whichever is
/// first.
pub fn amortize(params: &LoanParameters) -> Result<Schedule, EngineError> {
    let monthly_rate = params.monthly_rate();
    let installment = base_emi(params.principal, monthly_rate, params.tenure_months)?;
    let overflow = || EngineError::Overflow {
        monthly_rate,
        tenure_months: params.tenure_months,
    };
    let payment = installment
        .checked_add(params.extra_monthly_payment)
        .ok_or_else(overflow)?;

    log::debug!(
        "installment {} (+{} extra) at {} per month over {} months",
        installment,
        params.extra_monthly_payment,
        monthly_rate,
        params.tenure_months
    );

    let mut remaining_balance = params.principal;
    let mut rows = Vec::new();
    let mut month = 0;

    while remaining_balance > Decimal::ZERO && month < params.tenure_months {
        let interest_paid = remaining_balance.checked_mul(monthly_rate).ok_or_else(overflow)?;
        let mut principal_paid = payment.checked_sub(interest_paid).ok_or_else(overflow)?;

        // Closing payment clears the balance without overpaying.
        let closing = remaining_balance <= payment;
        if closing {
            principal_paid = remaining_balance;
        }

        remaining_balance = remaining_balance
            .checked_sub(principal_paid)
            .ok_or_else(overflow)?;
        month += 1;

        let paid = principal_paid.checked_add(interest_paid).ok_or_else(overflow)?;
        let emi_paid = if closing { paid } else { payment.min(paid) };

        rows.push(ScheduleRow {
            month,
            emi_paid: round_money(emi_paid),
            interest_paid: round_money(interest_paid),
            principal_paid: round_money(principal_paid),
            balance: round_money(remaining_balance.max(Decimal::ZERO)),
        });

        if remaining_balance <= Decimal::ZERO {
            break;
        }
    }

    log::debug!("schedule has {} rows", rows.len());

    Ok(Schedule {
        monthly_installment: round_money(installment),
        extra_payment: params.extra_monthly_payment,
        tenure_months: params.tenure_months,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn assert_close(actual: Decimal, expected: Decimal, tolerance: Decimal) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "{} not within {} of {}",
            actual,
            tolerance,
            expected
        );
    }

    #[test]
    fn monthly_rate_from_annual_percent() {
        let params = LoanParameters::new(dec!(1000), dec!(12), 12);
        assert_eq!(params.monthly_rate(), dec!(0.01));
    }

    #[test]
    fn base_emi_standard_loan() {
        let emi = base_emi(dec!(100000), dec!(10) / dec!(100) / dec!(12), 12).unwrap();
        assert_eq!(round_money(emi), dec!(8791.59));
    }

    #[test]
    fn base_emi_zero_rate_is_straight_line() {
        let emi = base_emi(dec!(360000), Decimal::ZERO, 360).unwrap();
        assert_eq!(emi, dec!(1000));
    }

    #[test]
    fn base_emi_zero_tenure_errors() {
        assert_eq!(base_emi(dec!(1000), dec!(0.01), 0), Err(EngineError::ZeroTenure));
        assert_eq!(base_emi(dec!(1000), Decimal::ZERO, 0), Err(EngineError::ZeroTenure));
    }

    #[test]
    fn base_emi_overflow_is_reported() {
        let err = base_emi(dec!(1000), dec!(0.025), 10_000).unwrap_err();
        assert!(matches!(err, EngineError::Overflow { tenure_months: 10_000, .. }));
    }

    #[test]
    fn base_emi_zero_denominator_is_reported() {
        // -200% a month makes (1 + r)^2 == 1.
        assert_eq!(
            base_emi(dec!(1000), dec!(-2), 2),
            Err(EngineError::DivisionByZero {
                context: "installment denominator"
            })
        );
        let params = LoanParameters::new(dec!(1000), dec!(-2400), 2);
        assert!(matches!(amortize(&params), Err(EngineError::DivisionByZero { .. })));
    }

    #[test]
    fn oversized_extra_payment_is_reported() {
        let params = LoanParameters::new(dec!(100000), dec!(10), 12).with_extra_payment(Decimal::MAX);
        assert!(matches!(
            amortize(&params),
            Err(EngineError::Overflow { tenure_months: 12, .. })
        ));
    }

    #[test]
    fn first_month_split() {
        let schedule = amortize(&LoanParameters::new(dec!(100000), dec!(10), 12)).unwrap();
        let first = &schedule.rows[0];

        assert_eq!(schedule.monthly_installment, dec!(8791.59));
        assert_eq!(
            first,
            &ScheduleRow {
                month: 1,
                emi_paid: dec!(8791.59),
                interest_paid: dec!(833.33),
                principal_paid: dec!(7958.26),
                balance: dec!(92041.74),
            }
        );
    }

    #[test]
    fn runs_full_tenure_without_extra_payment() {
        let schedule = amortize(&LoanParameters::new(dec!(100000), dec!(10), 12)).unwrap();

        assert_eq!(schedule.len(), 12);
        assert_eq!(schedule.last().unwrap().balance, dec!(0.00));
        let months: Vec<u32> = schedule.rows.iter().map(|r| r.month).collect();
        assert_eq!(months, (1..=12).collect::<Vec<_>>());
    }

    #[test]
    fn installment_constant_before_final_row() {
        let schedule = amortize(&LoanParameters::new(dec!(250000), dec!(8.5), 60)).unwrap();
        let (_, regular) = schedule.rows.split_last().unwrap();

        for row in regular {
            assert_eq!(row.emi_paid, schedule.monthly_installment, "month {}", row.month);
        }
    }

    #[test]
    fn rows_split_payment_within_a_cent() {
        let params = LoanParameters::new(dec!(50000), dec!(12), 24).with_extra_payment(dec!(5000));
        let schedule = amortize(&params).unwrap();

        for row in &schedule.rows {
            assert_close(row.interest_paid + row.principal_paid, row.emi_paid, dec!(0.01));
        }
    }

    #[test]
    fn extra_payment_pays_off_early() {
        let params = LoanParameters::new(dec!(50000), dec!(12), 24).with_extra_payment(dec!(5000));
        let schedule = amortize(&params).unwrap();

        assert!(schedule.len() < 24, "paid off in {} months", schedule.len());
        assert_eq!(schedule.last().unwrap().balance, dec!(0.00));
        assert_eq!(schedule.extra_payment, dec!(5000));
    }

    #[test]
    fn balance_never_increases() {
        let params = LoanParameters::new(dec!(5000000), dec!(30), 360).with_extra_payment(dec!(20000));
        let schedule = amortize(&params).unwrap();

        let mut previous = params.principal;
        for row in &schedule.rows {
            assert!(row.balance <= previous, "month {} balance grew", row.month);
            assert!(row.balance >= Decimal::ZERO);
            previous = row.balance;
        }
    }

    #[test]
    fn closing_row_records_amount_actually_paid() {
        // 1000.00 owed is below the 1018.83 payment, but with 25.00 interest
        // clearing it costs 1025.00.
        let params = LoanParameters::new(dec!(1000), dec!(30), 2).with_extra_payment(dec!(500));
        let schedule = amortize(&params).unwrap();
        let last = schedule.last().unwrap();

        assert_eq!(schedule.len(), 1);
        assert_eq!(last.emi_paid, dec!(1025.00));
        assert_eq!(last.balance, dec!(0.00));
        assert_close(last.interest_paid + last.principal_paid, last.emi_paid, dec!(0.01));
    }

    #[test]
    fn zero_rate_schedule_has_no_interest() {
        let schedule = amortize(&LoanParameters::new(dec!(1200), Decimal::ZERO, 12)).unwrap();

        assert_eq!(schedule.len(), 12);
        assert!(schedule.rows.iter().all(|r| r.interest_paid.is_zero()));
        assert!(schedule.rows.iter().all(|r| r.emi_paid == dec!(100)));
        assert_eq!(schedule.last().unwrap().balance, dec!(0));
    }

    #[test]
    fn non_positive_principal_yields_empty_schedule() {
        let schedule = amortize(&LoanParameters::new(Decimal::ZERO, dec!(10), 12)).unwrap();
        assert!(schedule.is_empty());
    }

    #[test]
    fn identical_inputs_identical_schedules() {
        let params = LoanParameters::new(dec!(75000), dec!(9.25), 48).with_extra_payment(dec!(750));
        assert_eq!(amortize(&params).unwrap(), amortize(&params).unwrap());
    }

    #[test]
    fn summary_totals() {
        let params = LoanParameters::new(dec!(50000), dec!(12), 24).with_extra_payment(dec!(5000));
        let schedule = amortize(&params).unwrap();
        let summary = schedule.summary();

        assert_eq!(summary.months_to_payoff as usize, schedule.len());
        assert_eq!(summary.months_saved, 24 - summary.months_to_payoff);
        assert_close(summary.total_principal, dec!(50000), dec!(0.10));
        assert_close(
            summary.total_paid,
            summary.total_principal + summary.total_interest,
            dec!(0.01) * Decimal::from(summary.months_to_payoff),
        );
    }
}
