//! Extraction of MOMS filings (eSKD VAT declaration).
//!
//! The export may start with a DOCTYPE declaration; it is stripped before
//! parsing. Only the first OrgNr and the first Moms section are read.

use quick_xml::{events::Event, Reader};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::{
    error::{Result, RivoError},
    filings::common::{strip_doctype, DocShape},
    model::RunInput,
    numeric::{digits_only, parse_amount},
};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MomsSummary {
    /// Digits-only organization number, when present.
    pub org_nr: Option<String>,
    pub period: Option<String>,
    /// MomsBetala; zero when the element is absent.
    pub vat_payable: Decimal,
}

impl MomsSummary {
    pub fn apply_to(&self, run: &mut RunInput) {
        run.vat = self.vat_payable;
    }
}

#[derive(Default)]
struct Cursor {
    in_org: bool,
    in_moms: bool,
    moms_seen: bool,
    in_period: bool,
    in_betala: bool,
}

#[derive(Default)]
struct Fields {
    org_nr: Option<String>,
    period: Option<String>,
    vat_text: Option<String>,
}

pub fn parse_moms(xml: &str) -> Result<MomsSummary> {
    let cleaned = strip_doctype(xml);
    let mut reader = Reader::from_str(&cleaned);
    reader.trim_text(true);

    let mut cur = Cursor::default();
    let mut fields = Fields::default();
    let mut shape = DocShape::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                shape.start()?;
                match e.local_name().as_ref() {
                    b"OrgNr" => cur.in_org = true,
                    b"Moms" => {
                        if !cur.moms_seen {
                            cur.moms_seen = true;
                            cur.in_moms = true;
                        }
                    }
                    b"Period" if cur.in_moms => cur.in_period = true,
                    b"MomsBetala" if cur.in_moms => cur.in_betala = true,
                    _ => {}
                }
            }
            Ok(Event::Empty(_)) => shape.empty()?,
            Ok(Event::Text(t)) => {
                shape.text()?;
                let text = t
                    .unescape()
                    .map_err(|e| RivoError::InvalidDocument(e.to_string()))?
                    .to_string();
                capture(&cur, &mut fields, text);
            }
            // textContent semantics: CDATA counts as element text
            Ok(Event::CData(t)) => {
                shape.text()?;
                let text = String::from_utf8_lossy(&t.into_inner()).to_string();
                capture(&cur, &mut fields, text);
            }
            Ok(Event::End(e)) => {
                shape.end();
                match e.local_name().as_ref() {
                    b"OrgNr" => cur.in_org = false,
                    b"Moms" => cur.in_moms = false,
                    b"Period" => cur.in_period = false,
                    b"MomsBetala" => cur.in_betala = false,
                    _ => {}
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

    let out = MomsSummary {
        org_nr: fields.org_nr,
        period: fields.period,
        vat_payable: parse_amount(fields.vat_text.as_deref()),
    };
    debug!(
        org_nr = out.org_nr.as_deref(),
        period = out.period.as_deref(),
        "parsed MOMS filing"
    );
    Ok(out)
}

// First occurrence wins for all three fields.
fn capture(cur: &Cursor, fields: &mut Fields, text: String) {
    if cur.in_org && fields.org_nr.is_none() {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            fields.org_nr = Some(digits_only(trimmed));
        }
    } else if cur.in_period && fields.period.is_none() {
        fields.period = Some(text.trim().to_string());
    } else if cur.in_betala && fields.vat_text.is_none() {
        fields.vat_text = Some(text);
    }
}
