use rivolib::{
    model::{Profile, RunInput},
    pain001::build_salaries,
};
use rust_decimal::Decimal;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Example: one positive salary -> a pain.001 document on stdout
    let mut profile = Profile::default();
    profile.sender_id = "556677-8899".into();
    profile.debtor_iban = "SE45 5000 0000 0583 9825 7466".into();
    profile.debtor_bic = "ESSESESS".into();
    profile.employees[0].clearing_account = "5491-0000003".into();

    let mut run = RunInput::new("2025-08-25".parse()?);
    run.salaries
        .insert("AB".into(), Decimal::from_str_exact("25000.00")?);

    if let Some(xml) = build_salaries(&profile, &run)? {
        println!("{xml}");
    }
    Ok(())
}
