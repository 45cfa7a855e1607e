//! rivolib — pain.001 payment batches and Skatteverket filing extraction
//! for a small two-employee payroll run.

pub mod error;
pub mod model;
pub mod numeric;
pub mod pain001;
pub mod storage;

pub mod filings {
    pub(crate) mod common;

    pub mod agi;
    pub mod moms;
}
