use rivolib::error::RivoError;
use rivolib::filings::agi::parse_agi;
use rivolib::model::{Profile, RunInput};
use rust_decimal::Decimal;

const FILING: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Skatteverket xmlns="http://xmls.skatteverket.se/se/skatteverket/da/instans/schema/1.1">
  <Blankett>
    <Blankettinnehall>
      <HU>
        <RedovisningsPeriod>202508</RedovisningsPeriod>
        <SummaArbAvgSlf>12345,67</SummaArbAvgSlf>
        <SummaSkatteavdr>8000,00</SummaSkatteavdr>
      </HU>
    </Blankettinnehall>
  </Blankett>
  <Blankett>
    <Blankettinnehall>
      <IU>
        <BetalningsmottagarId>19800101-1234</BetalningsmottagarId>
        <KontantErsattningUlagAG>30000,00</KontantErsattningUlagAG>
        <AvdrPrelSkatt>8000,00</AvdrPrelSkatt>
      </IU>
    </Blankettinnehall>
  </Blankett>
</Skatteverket>
"#;

#[test]
fn header_and_individual() {
    let summary = parse_agi(FILING).expect("parse agi");

    assert_eq!(summary.period.as_deref(), Some("202508"));
    assert_eq!(
        summary.total_contribution,
        Decimal::from_str_exact("12345.67").unwrap()
    );
    assert_eq!(
        summary.total_withheld,
        Decimal::from_str_exact("8000.00").unwrap()
    );

    let emp = summary.by_person.get("198001011234").expect("individual");
    assert_eq!(emp.gross, Decimal::from_str_exact("30000.00").unwrap());
    assert_eq!(emp.tax, Decimal::from_str_exact("8000.00").unwrap());
}

#[test]
fn doctype_is_stripped_before_parsing() {
    let with_doctype = format!(
        "<!DOCTYPE Skatteverket SYSTEM \"http://xmls.skatteverket.se/agd.dtd\">\n{FILING}"
    );
    let a = parse_agi(&with_doctype).expect("parse with doctype");
    let b = parse_agi(FILING).expect("parse without doctype");
    assert_eq!(a, b);
}

#[test]
fn duplicate_person_id_last_wins() {
    let filing = r#"<Skatteverket>
  <Blankett><IU>
    <BetalningsmottagarId>19800101-1234</BetalningsmottagarId>
    <KontantErsattningUlagAG>10000</KontantErsattningUlagAG>
    <AvdrPrelSkatt>2000</AvdrPrelSkatt>
  </IU></Blankett>
  <Blankett><IU>
    <BetalningsmottagarId>198001011234</BetalningsmottagarId>
    <KontantErsattningUlagAG>11000</KontantErsattningUlagAG>
    <AvdrPrelSkatt>2500</AvdrPrelSkatt>
  </IU></Blankett>
</Skatteverket>"#;

    let summary = parse_agi(filing).expect("parse agi");
    assert_eq!(summary.by_person.len(), 1);
    let emp = &summary.by_person["198001011234"];
    assert_eq!(emp.gross, Decimal::from_str_exact("11000").unwrap());
    assert_eq!(emp.tax, Decimal::from_str_exact("2500").unwrap());
}

#[test]
fn individual_without_identifier_is_skipped() {
    let filing = r#"<Skatteverket>
  <Blankett><IU>
    <BetalningsmottagarId>---</BetalningsmottagarId>
    <KontantErsattningUlagAG>10000</KontantErsattningUlagAG>
  </IU></Blankett>
</Skatteverket>"#;

    let summary = parse_agi(filing).expect("parse agi");
    assert!(summary.by_person.is_empty());
}

#[test]
fn missing_figures_default_to_zero() {
    let filing = r#"<Skatteverket>
  <Blankett><HU><RedovisningsPeriod>202508</RedovisningsPeriod></HU></Blankett>
</Skatteverket>"#;

    let summary = parse_agi(filing).expect("parse agi");
    assert_eq!(summary.total_contribution, Decimal::ZERO);
    assert_eq!(summary.total_withheld, Decimal::ZERO);
}

#[test]
fn malformed_xml_is_an_invalid_document() {
    let err = parse_agi("<Skatteverket><Blankett></Skatteverket>").unwrap_err();
    assert!(matches!(err, RivoError::InvalidDocument(_)));

    let err = parse_agi("<Skatteverket><Blankett>").unwrap_err();
    assert!(matches!(err, RivoError::InvalidDocument(_)));
}

#[test]
fn plain_text_is_not_a_document() {
    let err = parse_agi("this is not xml at all").unwrap_err();
    assert!(matches!(err, RivoError::InvalidDocument(_)));

    let err = parse_agi("").unwrap_err();
    assert!(matches!(err, RivoError::InvalidDocument(_)));
}

#[test]
fn a_second_root_element_is_rejected() {
    let err = parse_agi("<Skatteverket/><Skatteverket/>").unwrap_err();
    assert!(matches!(err, RivoError::InvalidDocument(_)));

    let err = parse_agi("<Skatteverket></Skatteverket><Skatteverket></Skatteverket>")
        .unwrap_err();
    assert!(matches!(err, RivoError::InvalidDocument(_)));

    let err = parse_agi("<Skatteverket></Skatteverket>trailing").unwrap_err();
    assert!(matches!(err, RivoError::InvalidDocument(_)));
}

#[test]
fn cdata_field_content_is_read() {
    let filing = r#"<Skatteverket>
  <Blankett><IU>
    <BetalningsmottagarId><![CDATA[19800101-1234]]></BetalningsmottagarId>
    <KontantErsattningUlagAG><![CDATA[30000,00]]></KontantErsattningUlagAG>
    <AvdrPrelSkatt>8000</AvdrPrelSkatt>
  </IU></Blankett>
</Skatteverket>"#;

    let summary = parse_agi(filing).expect("parse agi");
    let emp = summary.by_person.get("198001011234").expect("individual");
    assert_eq!(emp.gross, Decimal::from_str_exact("30000.00").unwrap());
    assert_eq!(emp.tax, Decimal::from_str_exact("8000").unwrap());
}

#[test]
fn apply_to_fills_net_pay_and_totals() {
    let summary = parse_agi(FILING).expect("parse agi");

    let mut profile = Profile::default();
    profile.employees[0].personnummer = "19800101-1234".into();
    profile.employees[1].personnummer = "19900202-5678".into();

    let mut run = RunInput::new("2025-08-25".parse().unwrap());
    summary.apply_to(&profile, &mut run);

    // gross 30000 minus withheld 8000
    assert_eq!(
        run.salaries["AB"],
        Decimal::from_str_exact("22000.00").unwrap()
    );
    // not in the filing
    assert_eq!(run.salaries["AN"], Decimal::ZERO);
    assert_eq!(
        run.employer_contribution,
        Decimal::from_str_exact("12345.67").unwrap()
    );
    assert_eq!(
        run.withheld_tax,
        Decimal::from_str_exact("8000.00").unwrap()
    );
}
