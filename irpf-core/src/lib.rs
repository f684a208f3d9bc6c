//! Brazilian income-tax withholding (IRRF) and simplified annual liability
//! (IRPF) calculations.
//!
//! The crate has two halves:
//!
//! - [`registry`] holds the hardcoded progressive bracket tables and the
//!   simplified-deduction constants, keyed by year and sub-period.
//! - [`calculations`] turns a gross amount, a dependent count and a period
//!   into a [`ComputationResult`].
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//!
//! let result = irpf_core::compute_tax("monthly", dec!(3000.00), 0, 2023, 1).unwrap();
//!
//! assert_eq!(result.deduction_used, dec!(528.00));
//! assert_eq!(result.taxable_base, dec!(2472.00));
//! assert_eq!(result.net_tax, dec!(42.60));
//! assert_eq!(result.net_income, dec!(2957.40));
//! ```

pub mod calculations;
pub mod error;
pub mod models;
pub mod registry;

pub use calculations::{MAX_GROSS_AMOUNT, TaxEngine, compute_tax, compute_tax_with};
pub use error::{TableError, TaxError};
pub use models::*;
pub use registry::{ScheduleSelection, TableRegistry};
