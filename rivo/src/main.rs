use clap::{Parser, Subcommand};
use rivolib::{
    error::Result,
    filings::{agi::parse_agi, moms::parse_moms},
    pain001::{build_payments, build_salaries},
    storage::{HistoryEntry, Store},
};
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "rivo", version, about = "pain.001 salary and payment batches for a small payroll")]
struct Cli {
    /// Directory holding profile.json and history.json
    #[arg(long, default_value = ".rivo")]
    data_dir: PathBuf,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Parse an AGI filing and print the extracted summary as JSON
    Agi { file: PathBuf },
    /// Parse a MOMS filing and print the extracted summary as JSON
    Moms { file: PathBuf },
    /// Build the salary/payment documents for one run
    Build {
        /// Run input JSON (execution date + figures)
        #[arg(short, long)]
        run: PathBuf,

        /// AGI filing; fills salaries and the employer figures before building
        #[arg(long)]
        agi: Option<PathBuf>,

        /// MOMS filing; fills the VAT figure before building
        #[arg(long)]
        moms: Option<PathBuf>,

        /// Output directory for the XML files
        #[arg(short, long, default_value = ".")]
        out: PathBuf,

        /// Do not record this run in the history
        #[arg(long)]
        no_history: bool,
    },
    /// Print the run history
    History {
        /// Drop all recorded runs instead
        #[arg(long)]
        clear: bool,
    },
    /// Write the default profile to the data directory for editing
    InitProfile,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rivo=info,rivolib=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let store = Store::new(&cli.data_dir);

    match cli.cmd {
        Cmd::Agi { file } => {
            let summary = parse_agi(&fs::read_to_string(file)?)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Cmd::Moms { file } => {
            let summary = parse_moms(&fs::read_to_string(file)?)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Cmd::Build {
            run,
            agi,
            moms,
            out,
            no_history,
        } => {
            let profile = store.load_profile();
            let mut run: rivolib::model::RunInput =
                serde_json::from_str(&fs::read_to_string(run)?)?;

            let mut agi_period = None;
            if let Some(path) = agi {
                let summary = parse_agi(&fs::read_to_string(path)?)?;
                summary.apply_to(&profile, &mut run);
                agi_period = summary.period.clone();
                info!(period = agi_period.as_deref(), "applied AGI filing");
            }
            if let Some(path) = moms {
                let summary = parse_moms(&fs::read_to_string(path)?)?;
                summary.apply_to(&mut run);
                info!(vat = %summary.vat_payable, "applied MOMS filing");
            }

            let salaries = build_salaries(&profile, &run)?;
            let payments = build_payments(&profile, &run)?;

            let date = run.execution_date;
            fs::create_dir_all(&out)?;
            match &salaries {
                Some(xml) => {
                    let path = out.join(format!("{date}-salaries.xml"));
                    fs::write(&path, xml)?;
                    println!("wrote {}", path.display());
                }
                None => println!("no salary transactions this period"),
            }
            match &payments {
                Some(xml) => {
                    let path = out.join(format!("{date}-payments.xml"));
                    fs::write(&path, xml)?;
                    println!("wrote {}", path.display());
                }
                None => println!("no payment transactions this period"),
            }

            if !no_history {
                store.push_history(HistoryEntry::new(run, salaries, payments, agi_period))?;
            }
        }
        Cmd::History { clear } => {
            if clear {
                store.clear_history()?;
                println!("history cleared");
            } else {
                for entry in store.load_history() {
                    println!(
                        "{}  {}  salaries: {}  payments: {}",
                        entry.created_at,
                        entry.run.execution_date,
                        if entry.salaries_xml.is_some() { "yes" } else { "-" },
                        if entry.payments_xml.is_some() { "yes" } else { "-" },
                    );
                }
            }
        }
        Cmd::InitProfile => {
            let profile = store.load_profile();
            store.save_profile(&profile)?;
            println!("wrote {}", store.profile_path().display());
        }
    }

    Ok(())
}
