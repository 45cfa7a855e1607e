//! Extraction of AGI filings (arbetsgivardeklaration på individnivå).
//!
//! The schema namespace varies between Skatteverket versions, so elements are
//! matched by local name only. Missing figures default to zero; only a
//! document that is not well-formed XML is an error.

use std::collections::BTreeMap;

use quick_xml::{events::Event, Reader};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::{
    error::{Result, RivoError},
    filings::common::{strip_doctype, DocShape},
    model::{Profile, RunInput},
    numeric::{digits_only, parse_amount},
};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AgiEmployee {
    pub person_id: String,
    pub gross: Decimal,
    pub tax: Decimal,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AgiSummary {
    pub period: Option<String>,
    /// Aggregate arbetsgivaravgift from the HU blankett.
    pub total_contribution: Decimal,
    /// Aggregate avdragen skatt from the HU blankett.
    pub total_withheld: Decimal,
    /// Keyed by digits-only BetalningsmottagarId; a repeated id overwrites the
    /// earlier entry (last blankett wins).
    pub by_person: BTreeMap<String, AgiEmployee>,
}

impl AgiSummary {
    /// Net payout (gross minus withheld tax) for one personnummer, matched in
    /// digits-only form.
    pub fn net_pay(&self, personnummer: &str) -> Option<Decimal> {
        self.by_person
            .get(&digits_only(personnummer))
            .map(|e| e.gross - e.tax)
    }

    /// Fills a run's salary figures (net pay per employee) and the two
    /// aggregate totals. An employee absent from the filing gets zero.
    pub fn apply_to(&self, profile: &Profile, run: &mut RunInput) {
        for emp in &profile.employees {
            let amount = self.net_pay(&emp.personnummer).unwrap_or(Decimal::ZERO);
            run.salaries.insert(emp.key.clone(), amount);
        }
        run.employer_contribution = self.total_contribution;
        run.withheld_tax = self.total_withheld;
    }
}

// Leaf element the cursor is currently inside.
enum Leaf {
    Period,
    SumContribution,
    SumWithheld,
    PayeeId,
    Gross,
    Tax,
}

#[derive(Default)]
struct Blankett {
    hu: bool,
    iu: bool,
    period: Option<String>,
    sum_contribution: Option<String>,
    sum_withheld: Option<String>,
    payee_id: Option<String>,
    gross: Option<String>,
    tax: Option<String>,
}

pub fn parse_agi(xml: &str) -> Result<AgiSummary> {
    let cleaned = strip_doctype(xml);
    let mut reader = Reader::from_str(&cleaned);
    reader.trim_text(true);

    let mut out = AgiSummary {
        period: None,
        total_contribution: Decimal::ZERO,
        total_withheld: Decimal::ZERO,
        by_person: BTreeMap::new(),
    };

    let mut cur: Option<Blankett> = None;
    let mut leaf: Option<Leaf> = None;
    let mut shape = DocShape::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                shape.start()?;
                match e.local_name().as_ref() {
                    b"Blankett" => cur = Some(Blankett::default()),
                    b"HU" => {
                        if let Some(b) = cur.as_mut() {
                            b.hu = true;
                        }
                    }
                    b"IU" => {
                        if let Some(b) = cur.as_mut() {
                            b.iu = true;
                        }
                    }
                    b"RedovisningsPeriod" => leaf = Some(Leaf::Period),
                    b"SummaArbAvgSlf" => leaf = Some(Leaf::SumContribution),
                    b"SummaSkatteavdr" => leaf = Some(Leaf::SumWithheld),
                    b"BetalningsmottagarId" => leaf = Some(Leaf::PayeeId),
                    b"KontantErsattningUlagAG" => leaf = Some(Leaf::Gross),
                    b"AvdrPrelSkatt" => leaf = Some(Leaf::Tax),
                    _ => {}
                }
            }
            // Some exports mark the blankett kind with a self-closing element.
            Ok(Event::Empty(e)) => {
                shape.empty()?;
                match e.local_name().as_ref() {
                    b"HU" => {
                        if let Some(b) = cur.as_mut() {
                            b.hu = true;
                        }
                    }
                    b"IU" => {
                        if let Some(b) = cur.as_mut() {
                            b.iu = true;
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(t)) => {
                shape.text()?;
                let text = t
                    .unescape()
                    .map_err(|e| RivoError::InvalidDocument(e.to_string()))?
                    .to_string();
                if let (Some(b), Some(l)) = (cur.as_mut(), leaf.as_ref()) {
                    set_leaf(b, l, text);
                }
            }
            // textContent semantics: CDATA counts as element text
            Ok(Event::CData(t)) => {
                shape.text()?;
                let text = String::from_utf8_lossy(&t.into_inner()).to_string();
                if let (Some(b), Some(l)) = (cur.as_mut(), leaf.as_ref()) {
                    set_leaf(b, l, text);
                }
            }
            Ok(Event::End(e)) => {
                shape.end();
                leaf = None;
                if e.local_name().as_ref() == b"Blankett" {
                    if let Some(b) = cur.take() {
                        fold_blankett(&mut out, b);
                    }
                }
            }
            Ok(Event::Eof) => {
                shape.eof()?;
                break;
            }
            Err(e) => return Err(RivoError::InvalidDocument(e.to_string())),
            _ => {}
        }
    }

    debug!(
        period = out.period.as_deref(),
        individuals = out.by_person.len(),
        "parsed AGI filing"
    );
    Ok(out)
}

fn set_leaf(b: &mut Blankett, leaf: &Leaf, text: String) {
    match leaf {
        Leaf::Period => b.period = Some(text),
        Leaf::SumContribution => b.sum_contribution = Some(text),
        Leaf::SumWithheld => b.sum_withheld = Some(text),
        Leaf::PayeeId => b.payee_id = Some(text),
        Leaf::Gross => b.gross = Some(text),
        Leaf::Tax => b.tax = Some(text),
    }
}

fn fold_blankett(out: &mut AgiSummary, b: Blankett) {
    if b.hu {
        if let Some(p) = b.period.as_deref().map(str::trim) {
            if !p.is_empty() {
                out.period = Some(p.to_string());
            }
        }
        out.total_contribution = parse_amount(b.sum_contribution.as_deref());
        out.total_withheld = parse_amount(b.sum_withheld.as_deref());
    } else if b.iu {
        let person_id = digits_only(b.payee_id.as_deref().unwrap_or(""));
        if person_id.is_empty() {
            return;
        }
        let entry = AgiEmployee {
            person_id: person_id.clone(),
            gross: parse_amount(b.gross.as_deref()),
            tax: parse_amount(b.tax.as_deref()),
        };
        out.by_person.insert(person_id, entry);
    }
}
