//! pain.001.001.03 CustomerCreditTransferInitiation builder.
//!
//! Two documents per run: salaries (category purpose SALA, BBAN creditor
//! accounts) and payments (local instrument DO, bankgiro creditor accounts).
//! Counts and control sums are derived from the actual transaction lists, so
//! an emitted document is internally consistent by construction.

use chrono::{Local, NaiveDate};
use quick_xml::{
    events::{BytesDecl, BytesStart, BytesText, Event},
    Writer,
};
use rust_decimal::Decimal;
use tracing::debug;

use crate::{
    error::{Result, RivoError},
    model::{Profile, RunInput},
    numeric::digits_only,
};

pub const NAMESPACE: &str = "urn:iso:std:iso:20022:tech:xsd:pain.001.001.03";

const CURRENCY: &str = "SEK";
const CLEARING_SYSTEM: &str = "SESBA";
// Bankgirot's member id in the domestic clearing system.
const BANKGIRO_MEMBER_ID: &str = "9900";
const SENDER_ISSUER: &str = "SEB";
const TAX_AUTHORITY_NAME: &str = "Skatteverket";

/* ------------------------------- MODEL ---------------------------------- */

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreditorAccount {
    /// Domestic account number behind a 4-digit clearing prefix.
    Bban { clearing: String, account: String },
    Bankgiro(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub instruction_id: String,
    pub end_to_end_id: String,
    pub amount: Decimal,
    pub creditor_name: String,
    pub account: CreditorAccount,
    pub remittance: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    /// CtgyPurp SALA.
    Salary,
    /// LclInstrm Prtry DO.
    Domestic,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub payment_info_id: String,
    pub kind: BatchKind,
    pub transactions: Vec<Transaction>,
}

impl Batch {
    pub fn control_sum(&self) -> Decimal {
        self.transactions.iter().map(|t| t.amount).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub message_id: String,
    pub execution_date: NaiveDate,
    pub batches: Vec<Batch>,
}

impl Document {
    pub fn transaction_count(&self) -> usize {
        self.batches.iter().map(|b| b.transactions.len()).sum()
    }

    pub fn control_sum(&self) -> Decimal {
        self.batches.iter().map(Batch::control_sum).sum()
    }
}

/* ------------------------------- BUILD ----------------------------------- */

/// Builds the salary document. `Ok(None)` when no employee has a positive
/// salary figure this period.
pub fn build_salaries(profile: &Profile, run: &RunInput) -> Result<Option<String>> {
    let date = run.execution_date;
    let mut txs = Vec::new();

    for emp in &profile.employees {
        let amount = run
            .salaries
            .get(&emp.key)
            .copied()
            .unwrap_or(Decimal::ZERO);
        if amount <= Decimal::ZERO {
            continue;
        }
        let d = digits_only(&emp.clearing_account);
        let (clearing, account) = d.split_at(d.len().min(4));
        let e2e = format!("SAL-{date}-EMP-{}", emp.key.to_uppercase());
        txs.push(Transaction {
            instruction_id: e2e.clone(),
            end_to_end_id: e2e,
            amount,
            creditor_name: emp.name.clone(),
            account: CreditorAccount::Bban {
                clearing: clearing.to_string(),
                account: account.to_string(),
            },
            remittance: "LÖN".into(),
        });
    }

    if txs.is_empty() {
        return Ok(None);
    }

    let doc = Document {
        message_id: format!("RIVO-{date}-SALARIES"),
        execution_date: date,
        batches: vec![Batch {
            payment_info_id: format!("RIVO-{date}-SALARIES"),
            kind: BatchKind::Salary,
            transactions: txs,
        }],
    };
    debug!(
        transactions = doc.transaction_count(),
        control_sum = %doc.control_sum(),
        "built salaries document"
    );
    write_document(profile, &doc).map(Some)
}

/// Builds the payments document: a Skatteverket batch (employer contribution,
/// withheld tax, VAT) and a vendor batch. A positive vendor amount without an
/// OCR reference or without a profile giro number fails the whole build with
/// `MissingReference`; `Ok(None)` when nothing qualifies at all.
pub fn build_payments(profile: &Profile, run: &RunInput) -> Result<Option<String>> {
    let date = run.execution_date;
    let skv_ocr = digits_only(&profile.skv_ocr);
    let skv_bg = digits_only(&profile.skv_bg);

    let mut skv_txs = Vec::new();
    let mut push_skv = |tag: &str, amount: Decimal, ustrd: String| {
        let e2e = format!("{tag}-{date}");
        skv_txs.push(Transaction {
            instruction_id: e2e.clone(),
            end_to_end_id: e2e,
            amount,
            creditor_name: TAX_AUTHORITY_NAME.into(),
            account: CreditorAccount::Bankgiro(skv_bg.clone()),
            remittance: ustrd,
        });
    };

    if run.employer_contribution > Decimal::ZERO {
        push_skv(
            "ARBETSGIVARAVGIFT",
            run.employer_contribution,
            format!("Arbetsgivaravgift - {date} OCR {skv_ocr}"),
        );
    }
    if run.withheld_tax > Decimal::ZERO {
        push_skv(
            "AVDRAGEN-SKATT",
            run.withheld_tax,
            format!("SKATT - {date} OCR {skv_ocr}"),
        );
    }
    if run.vat > Decimal::ZERO {
        push_skv("MOMS", run.vat, format!("MOMS - {date} OCR {skv_ocr}"));
    }

    let mut vendor_txs = Vec::new();
    for vendor in &profile.vendors {
        let Some(payment) = run.vendor_payments.get(&vendor.key) else {
            continue;
        };
        if payment.amount <= Decimal::ZERO {
            continue;
        }
        let ocr = digits_only(&payment.ocr);
        if ocr.is_empty() {
            return Err(RivoError::MissingReference(format!(
                "{} OCR reference is required when its amount is positive",
                vendor.name
            )));
        }
        let bg = digits_only(&vendor.bankgiro);
        if bg.is_empty() {
            return Err(RivoError::MissingReference(format!(
                "{} bankgiro number is missing from the profile",
                vendor.name
            )));
        }
        let e2e = format!("{}-{date}", vendor.key.to_uppercase());
        vendor_txs.push(Transaction {
            instruction_id: e2e.clone(),
            end_to_end_id: e2e,
            amount: payment.amount,
            creditor_name: vendor.name.clone(),
            account: CreditorAccount::Bankgiro(bg),
            remittance: format!("OCR {ocr}"),
        });
    }

    if skv_txs.is_empty() && vendor_txs.is_empty() {
        return Ok(None);
    }

    let mut batches = Vec::new();
    if !skv_txs.is_empty() {
        batches.push(Batch {
            payment_info_id: format!("RIVO-{date}-SKV"),
            kind: BatchKind::Domestic,
            transactions: skv_txs,
        });
    }
    if !vendor_txs.is_empty() {
        batches.push(Batch {
            payment_info_id: format!("RIVO-{date}-VENDORS"),
            kind: BatchKind::Domestic,
            transactions: vendor_txs,
        });
    }

    let doc = Document {
        message_id: format!("RIVO-{date}-PAYMENTS"),
        execution_date: date,
        batches,
    };
    debug!(
        transactions = doc.transaction_count(),
        control_sum = %doc.control_sum(),
        "built payments document"
    );
    write_document(profile, &doc).map(Some)
}

/* ------------------------------- WRITE ----------------------------------- */

fn amount_text(d: Decimal) -> String {
    format!("{d:.2}")
}

fn normalized_iban(s: &str) -> String {
    s.split_whitespace().collect::<String>().to_uppercase()
}

fn now_local() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

fn xml<E: std::fmt::Display>(e: E) -> RivoError {
    RivoError::Parse(e.to_string())
}

fn write_document(profile: &Profile, doc: &Document) -> Result<String> {
    let mut buf: Vec<u8> = Vec::new();
    let mut wr = Writer::new_with_indent(&mut buf, b' ', 2);

    wr.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml)?;

    let mut root = BytesStart::new("Document");
    root.push_attribute(("xmlns", NAMESPACE));
    wr.write_event(Event::Start(root)).map_err(xml)?;
    wr.write_event(Event::Start(BytesStart::new("CstmrCdtTrfInitn")))
        .map_err(xml)?;

    write_group_header(&mut wr, profile, doc).map_err(xml)?;
    for batch in &doc.batches {
        write_batch(&mut wr, profile, doc.execution_date, batch).map_err(xml)?;
    }

    wr.write_event(Event::End(BytesStart::new("CstmrCdtTrfInitn").to_end()))
        .map_err(xml)?;
    wr.write_event(Event::End(BytesStart::new("Document").to_end()))
        .map_err(xml)?;

    String::from_utf8(buf).map_err(|e| RivoError::Parse(e.to_string()))
}

fn text_el<W: std::io::Write>(
    wr: &mut Writer<W>,
    tag: &str,
    text: &str,
) -> quick_xml::Result<()> {
    wr.write_event(Event::Start(BytesStart::new(tag)))?;
    wr.write_event(Event::Text(BytesText::new(text)))?;
    wr.write_event(Event::End(BytesStart::new(tag).to_end()))?;
    Ok(())
}

fn start<W: std::io::Write>(wr: &mut Writer<W>, tag: &str) -> quick_xml::Result<()> {
    wr.write_event(Event::Start(BytesStart::new(tag)))
}

fn end<W: std::io::Write>(wr: &mut Writer<W>, tag: &str) -> quick_xml::Result<()> {
    wr.write_event(Event::End(BytesStart::new(tag).to_end()))
}

fn write_group_header<W: std::io::Write>(
    wr: &mut Writer<W>,
    profile: &Profile,
    doc: &Document,
) -> quick_xml::Result<()> {
    start(wr, "GrpHdr")?;
    text_el(wr, "MsgId", &doc.message_id)?;
    text_el(wr, "CreDtTm", &now_local())?;
    text_el(wr, "NbOfTxs", &doc.transaction_count().to_string())?;
    text_el(wr, "CtrlSum", &amount_text(doc.control_sum()))?;

    start(wr, "InitgPty")?;
    text_el(wr, "Nm", &profile.initiator_name)?;
    start(wr, "Id")?;
    start(wr, "OrgId")?;
    start(wr, "Othr")?;
    text_el(wr, "Id", &digits_only(&profile.sender_id))?;
    start(wr, "SchmeNm")?;
    text_el(wr, "Cd", profile.sender_scheme.code())?;
    end(wr, "SchmeNm")?;
    text_el(wr, "Issr", SENDER_ISSUER)?;
    end(wr, "Othr")?;
    end(wr, "OrgId")?;
    end(wr, "Id")?;
    end(wr, "InitgPty")?;

    end(wr, "GrpHdr")
}

fn write_batch<W: std::io::Write>(
    wr: &mut Writer<W>,
    profile: &Profile,
    execution_date: NaiveDate,
    batch: &Batch,
) -> quick_xml::Result<()> {
    start(wr, "PmtInf")?;
    text_el(wr, "PmtInfId", &batch.payment_info_id)?;
    text_el(wr, "PmtMtd", "TRF")?;
    text_el(wr, "BtchBookg", "true")?;
    text_el(wr, "NbOfTxs", &batch.transactions.len().to_string())?;
    text_el(wr, "CtrlSum", &amount_text(batch.control_sum()))?;

    start(wr, "PmtTpInf")?;
    match batch.kind {
        BatchKind::Salary => {
            start(wr, "CtgyPurp")?;
            text_el(wr, "Cd", "SALA")?;
            end(wr, "CtgyPurp")?;
        }
        BatchKind::Domestic => {
            start(wr, "LclInstrm")?;
            text_el(wr, "Prtry", "DO")?;
            end(wr, "LclInstrm")?;
        }
    }
    end(wr, "PmtTpInf")?;

    text_el(wr, "ReqdExctnDt", &execution_date.to_string())?;

    start(wr, "Dbtr")?;
    text_el(wr, "Nm", &profile.initiator_name)?;
    end(wr, "Dbtr")?;
    start(wr, "DbtrAcct")?;
    start(wr, "Id")?;
    text_el(wr, "IBAN", &normalized_iban(&profile.debtor_iban))?;
    end(wr, "Id")?;
    end(wr, "DbtrAcct")?;
    start(wr, "DbtrAgt")?;
    start(wr, "FinInstnId")?;
    text_el(wr, "BIC", &profile.debtor_bic)?;
    end(wr, "FinInstnId")?;
    end(wr, "DbtrAgt")?;

    text_el(wr, "ChrgBr", "SHAR")?;

    for tx in &batch.transactions {
        write_transaction(wr, tx)?;
    }

    end(wr, "PmtInf")
}

fn write_transaction<W: std::io::Write>(
    wr: &mut Writer<W>,
    tx: &Transaction,
) -> quick_xml::Result<()> {
    start(wr, "CdtTrfTxInf")?;

    start(wr, "PmtId")?;
    text_el(wr, "InstrId", &tx.instruction_id)?;
    text_el(wr, "EndToEndId", &tx.end_to_end_id)?;
    end(wr, "PmtId")?;

    start(wr, "Amt")?;
    let mut amt = BytesStart::new("InstdAmt");
    amt.push_attribute(("Ccy", CURRENCY));
    wr.write_event(Event::Start(amt))?;
    wr.write_event(Event::Text(BytesText::new(&amount_text(tx.amount))))?;
    end(wr, "InstdAmt")?;
    end(wr, "Amt")?;

    let member_id = match &tx.account {
        CreditorAccount::Bban { clearing, .. } => clearing.as_str(),
        CreditorAccount::Bankgiro(_) => BANKGIRO_MEMBER_ID,
    };
    start(wr, "CdtrAgt")?;
    start(wr, "FinInstnId")?;
    start(wr, "ClrSysMmbId")?;
    start(wr, "ClrSysId")?;
    text_el(wr, "Cd", CLEARING_SYSTEM)?;
    end(wr, "ClrSysId")?;
    text_el(wr, "MmbId", member_id)?;
    end(wr, "ClrSysMmbId")?;
    end(wr, "FinInstnId")?;
    end(wr, "CdtrAgt")?;

    start(wr, "Cdtr")?;
    text_el(wr, "Nm", &tx.creditor_name)?;
    end(wr, "Cdtr")?;

    start(wr, "CdtrAcct")?;
    start(wr, "Id")?;
    start(wr, "Othr")?;
    match &tx.account {
        CreditorAccount::Bban { account, .. } => {
            text_el(wr, "Id", account)?;
            start(wr, "SchmeNm")?;
            text_el(wr, "Cd", "BBAN")?;
            end(wr, "SchmeNm")?;
        }
        CreditorAccount::Bankgiro(bg) => {
            text_el(wr, "Id", bg)?;
            start(wr, "SchmeNm")?;
            text_el(wr, "Prtry", "BGNR")?;
            end(wr, "SchmeNm")?;
        }
    }
    end(wr, "Othr")?;
    end(wr, "Id")?;
    end(wr, "CdtrAcct")?;

    start(wr, "RmtInf")?;
    text_el(wr, "Ustrd", &tx.remittance)?;
    end(wr, "RmtInf")?;

    end(wr, "CdtTrfTxInf")
}
