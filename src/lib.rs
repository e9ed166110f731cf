//! Loan EMI calculator.
//!
//! [`form::LoanForm`] turns typed-in text into [`engine::LoanParameters`],
//! [`engine::amortize`] turns those into a month-by-month [`engine::Schedule`],
//! and [`export`] renders a schedule as a table, CSV, or JSON.

pub mod engine;
pub mod export;
pub mod form;

pub use engine::{amortize, EngineError, LoanParameters, Schedule, ScheduleRow, ScheduleSummary};
pub use form::{Field, FieldError, LoanForm, ValidationErrors};
