//! Domain model: the paying company's profile and one period's run input.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identification scheme of the sender id in the group header.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SenderScheme {
    #[serde(rename = "CUST")]
    Cust,
    #[serde(rename = "BANK")]
    Bank,
}

impl SenderScheme {
    pub fn code(self) -> &'static str {
        match self {
            SenderScheme::Cust => "CUST",
            SenderScheme::Bank => "BANK",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Employee {
    /// Stable tag, also used in end-to-end ids (`SAL-<date>-EMP-<KEY>`).
    pub key: String,
    pub name: String,
    pub personnummer: String,
    /// 4-digit clearing number followed by the account number, digits may be
    /// interspersed with separators.
    pub clearing_account: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vendor {
    /// Stable tag, also used in end-to-end ids (`<KEY>-<date>`).
    pub key: String,
    pub name: String,
    pub bankgiro: String,
}

/// Read-only snapshot of the paying organization. The builder never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    #[serde(default)]
    pub initiator_name: String,
    #[serde(default)]
    pub sender_id: String,
    #[serde(default = "default_scheme")]
    pub sender_scheme: SenderScheme,
    #[serde(default)]
    pub debtor_iban: String,
    #[serde(default)]
    pub debtor_bic: String,
    /// Skatteverket bankgiro number.
    #[serde(default)]
    pub skv_bg: String,
    /// OCR reference assigned to the company by Skatteverket.
    #[serde(default)]
    pub skv_ocr: String,
    #[serde(default = "default_employees")]
    pub employees: Vec<Employee>,
    #[serde(default = "default_vendors")]
    pub vendors: Vec<Vendor>,
}

fn default_scheme() -> SenderScheme {
    SenderScheme::Cust
}

fn default_employees() -> Vec<Employee> {
    vec![
        Employee {
            key: "AB".into(),
            name: "Azim Bhuiyan".into(),
            personnummer: String::new(),
            clearing_account: String::new(),
        },
        Employee {
            key: "AN".into(),
            name: "Aynun Nahar".into(),
            personnummer: String::new(),
            clearing_account: String::new(),
        },
    ]
}

fn default_vendors() -> Vec<Vendor> {
    vec![
        Vendor {
            key: "TELE2".into(),
            name: "Tele2".into(),
            bankgiro: String::new(),
        },
        Vendor {
            key: "LANSF".into(),
            name: "Länsförsäkringar".into(),
            bankgiro: String::new(),
        },
    ]
}

impl Default for Profile {
    fn default() -> Self {
        Profile {
            initiator_name: "Rivo Tech AB".into(),
            sender_id: String::new(),
            sender_scheme: SenderScheme::Cust,
            debtor_iban: String::new(),
            debtor_bic: String::new(),
            skv_bg: String::new(),
            skv_ocr: String::new(),
            employees: default_employees(),
            vendors: default_vendors(),
        }
    }
}

/// Amount plus the creditor-assigned OCR reference for one vendor invoice.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VendorPayment {
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default)]
    pub ocr: String,
}

/// One period's figures. A zero or negative amount means "this transaction
/// does not occur this period".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunInput {
    pub execution_date: NaiveDate,
    /// Employee key -> net salary payout.
    #[serde(default)]
    pub salaries: BTreeMap<String, Decimal>,
    /// Arbetsgivaravgift.
    #[serde(default)]
    pub employer_contribution: Decimal,
    /// Avdragen skatt.
    #[serde(default)]
    pub withheld_tax: Decimal,
    /// Moms.
    #[serde(default)]
    pub vat: Decimal,
    /// Vendor key -> amount + OCR.
    #[serde(default)]
    pub vendor_payments: BTreeMap<String, VendorPayment>,
}

impl RunInput {
    pub fn new(execution_date: NaiveDate) -> Self {
        RunInput {
            execution_date,
            salaries: BTreeMap::new(),
            employer_contribution: Decimal::ZERO,
            withheld_tax: Decimal::ZERO,
            vat: Decimal::ZERO,
            vendor_payments: BTreeMap::new(),
        }
    }
}
