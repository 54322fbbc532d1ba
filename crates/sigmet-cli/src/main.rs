//! SIGMET - drafting and publication of ICAO SIGMET advisories
//!
//! ## Commands
//!
//! - `validate`, `describe`, `tac`: inspect a canonical JSON file
//! - `draft`, `import`: store a new draft
//! - `publish`, `cancel`, `amend`: move a stored SIGMET through its lifecycle
//! - `list`, `show`: read the store

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use sigmet_core::codec::read_file;
use sigmet_core::{
    validate_for_persist, CodecConfig, ExchangeConverter, Lookup, Phenomenon, SigmetChange,
    SigmetCodec, SigmetRecord, TacConverter, Vocabulary,
};
use sigmet_store::{FsSigmetStore, SigmetDesk, SigmetStore};
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "sigmet")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Draft, validate and publish SIGMET advisories", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Store directory
    #[arg(long, global = true, env = "SIGMET_STORE", default_value = ".sigmet")]
    store: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that a SIGMET file can be stored and published
    Validate {
        /// Canonical JSON file
        file: PathBuf,
    },

    /// Print a human-readable summary of a SIGMET file
    Describe {
        /// Canonical JSON file
        file: PathBuf,
    },

    /// Render a SIGMET file as TAC text
    Tac {
        /// Canonical JSON file
        file: PathBuf,
    },

    /// Create and store a new draft
    Draft {
        /// Flight Information Region name
        #[arg(long)]
        fir: String,

        /// ICAO location indicator of the FIR
        #[arg(long)]
        icao: String,

        /// ICAO location indicator of the meteorological watch office
        #[arg(long)]
        mwo: String,

        /// Phenomenon code, e.g. "SEV TURB"
        #[arg(short, long)]
        phenomenon: String,

        /// GeoJSON file with the hazard area
        #[arg(short, long)]
        geojson: PathBuf,

        /// Start of validity (RFC 3339)
        #[arg(long)]
        valid_from: Option<String>,

        /// End of validity (RFC 3339)
        #[arg(long)]
        valid_to: Option<String>,

        /// Change code: INTSF, WKN or NC
        #[arg(long)]
        change: Option<String>,
    },

    /// Store a SIGMET file as a draft
    Import {
        /// Canonical JSON file
        file: PathBuf,
    },

    /// Publish a stored draft
    Publish {
        /// uuid of the draft
        uuid: String,
    },

    /// Cancel a published SIGMET
    Cancel {
        /// uuid of the published SIGMET
        uuid: String,
    },

    /// Cancel a published SIGMET and start a draft with its content
    Amend {
        /// uuid of the published SIGMET
        uuid: String,
    },

    /// List stored SIGMETs
    List,

    /// Print a stored SIGMET as canonical JSON
    Show {
        /// uuid of the SIGMET
        uuid: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    sigmet_core::telemetry::init_tracing(cli.json, level);

    match cli.command {
        Commands::Validate { file } => cmd_validate(&file),
        Commands::Describe { file } => cmd_describe(&file),
        Commands::Tac { file } => cmd_tac(&file),
        Commands::Draft {
            fir,
            icao,
            mwo,
            phenomenon,
            geojson,
            valid_from,
            valid_to,
            change,
        } => {
            let mut record = SigmetRecord::draft(fir, icao, mwo);
            record.set_phenomenon(Some(parse_phenomenon(&phenomenon)?));
            let area = std::fs::read_to_string(&geojson)
                .with_context(|| format!("Failed to read GeoJSON file: {:?}", geojson))?;
            record
                .set_geo_from_str(&area)
                .context("Invalid hazard area")?;
            record.set_validdate(valid_from.as_deref().map(parse_time).transpose()?);
            record.set_validdate_end(valid_to.as_deref().map(parse_time).transpose()?);
            record.set_change(change.as_deref().map(parse_change).transpose()?);
            cmd_store_draft(&cli.store, &record)
        }
        Commands::Import { file } => {
            let record = load(&file)?;
            cmd_store_draft(&cli.store, &record)
        }
        Commands::Publish { uuid } => cmd_publish(&cli.store, &uuid),
        Commands::Cancel { uuid } => cmd_cancel(&cli.store, &uuid),
        Commands::Amend { uuid } => cmd_amend(&cli.store, &uuid),
        Commands::List => cmd_list(&cli.store),
        Commands::Show { uuid } => cmd_show(&cli.store, &uuid),
    }
}

fn load(file: &Path) -> Result<SigmetRecord> {
    read_file(file).with_context(|| format!("Failed to read SIGMET file: {:?}", file))
}

fn open_desk(store: &Path) -> Result<SigmetDesk<FsSigmetStore>> {
    let store = FsSigmetStore::new(store)
        .with_context(|| format!("Failed to open SIGMET store at {:?}", store))?;
    Ok(SigmetDesk::new(store))
}

fn parse_phenomenon(code: &str) -> Result<Phenomenon> {
    match Phenomenon::lookup(code) {
        Lookup::Found(phenomenon) => Ok(phenomenon),
        Lookup::NotFound(code) => {
            let known: Vec<&str> = Phenomenon::ALL.iter().map(|p| p.code()).collect();
            bail!("Unknown phenomenon {:?}; expected one of: {}", code, known.join(", "))
        }
    }
}

fn parse_change(code: &str) -> Result<SigmetChange> {
    SigmetChange::lookup(code)
        .found()
        .with_context(|| format!("Unknown change {:?}; expected INTSF, WKN or NC", code))
}

fn parse_time(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|at| at.with_timezone(&Utc))
        .with_context(|| format!("Invalid RFC 3339 timestamp: {:?}", value))
}

fn cmd_validate(file: &Path) -> Result<()> {
    let record = load(file)?;
    let validated = validate_for_persist(&record)
        .with_context(|| format!("SIGMET {} is not valid", record.uuid()))?;
    println!(
        "valid: {} ({}, {})",
        validated.uuid(),
        validated.lifecycle_status(),
        validated.hazard().description()
    );
    Ok(())
}

fn cmd_describe(file: &Path) -> Result<()> {
    print!("{}", load(file)?.describe());
    Ok(())
}

fn cmd_tac(file: &Path) -> Result<()> {
    let record = load(file)?;
    let validated = validate_for_persist(&record)?;
    let tac = TacConverter
        .convert(&validated)
        .context("Failed to render TAC")?;
    println!("{}", tac);
    Ok(())
}

fn cmd_store_draft(store: &Path, record: &SigmetRecord) -> Result<()> {
    let desk = open_desk(store)?;
    let draft = desk.save_draft(record).context("Failed to store draft")?;
    info!(uuid = %draft.uuid(), "draft stored");
    println!("{}", draft.uuid());
    Ok(())
}

fn cmd_publish(store: &Path, uuid: &str) -> Result<()> {
    let desk = open_desk(store)?;
    let published = desk
        .publish(uuid)
        .with_context(|| format!("Failed to publish {}", uuid))?;
    println!(
        "Published {} as {} SIGMET {}",
        published.uuid(),
        published.firname().unwrap_or("?"),
        published.sequence()
    );
    Ok(())
}

fn cmd_cancel(store: &Path, uuid: &str) -> Result<()> {
    let desk = open_desk(store)?;
    let cancellation = desk
        .cancel(uuid)
        .with_context(|| format!("Failed to cancel {}", uuid))?;
    println!(
        "Cancelled {} with SIGMET {} ({})",
        uuid,
        cancellation.sequence(),
        cancellation.uuid()
    );
    Ok(())
}

fn cmd_amend(store: &Path, uuid: &str) -> Result<()> {
    let desk = open_desk(store)?;
    let amendment = desk
        .amend(uuid)
        .with_context(|| format!("Failed to amend {}", uuid))?;
    println!(
        "Cancelled {} with SIGMET {}",
        uuid,
        amendment.cancellation.sequence()
    );
    println!("Draft: {}", amendment.draft.uuid());
    Ok(())
}

fn cmd_list(store: &Path) -> Result<()> {
    let desk = open_desk(store)?;
    let records = desk.store().list().context("Failed to list SIGMETs")?;
    if records.is_empty() {
        println!("No SIGMETs stored in {:?}", store);
        return Ok(());
    }
    for record in records {
        println!("{}", list_line(&record));
    }
    Ok(())
}

fn list_line(record: &SigmetRecord) -> String {
    let sequence = if record.has_sequence() {
        record.sequence().to_string()
    } else {
        "-".to_string()
    };
    format!(
        "{:>4}  {:<10}  {:<16}  {:<14}  {}",
        sequence,
        record.status().map(|s| s.to_string()).unwrap_or_default(),
        record.firname().unwrap_or(""),
        record.phenomenon().map_or("", |p| p.code()),
        record.uuid()
    )
}

fn cmd_show(store: &Path, uuid: &str) -> Result<()> {
    let desk = open_desk(store)?;
    let record = desk.store().get(uuid)?;
    let validated = validate_for_persist(&record)?;
    let codec = SigmetCodec::new(CodecConfig::default().with_pretty(true));
    println!("{}", codec.encode(&validated)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_phenomenon_accepts_code() {
        assert_eq!(parse_phenomenon("SEV TURB").unwrap(), Phenomenon::SevTurb);
        let err = parse_phenomenon("FOG").unwrap_err().to_string();
        assert!(err.contains("EMBD TS"), "{}", err);
    }

    #[test]
    fn test_parse_time_normalizes_offset() {
        let at = parse_time("2024-03-01T13:45:07+02:00").unwrap();
        assert_eq!(at.to_rfc3339(), "2024-03-01T11:45:07+00:00");
        assert!(parse_time("yesterday").is_err());
    }

    #[test]
    fn test_list_line_marks_unnumbered_drafts() {
        let record = SigmetRecord::new("AMSTERDAM FIR", "EHAA", "EHDB", "abcd");
        let line = list_line(&record);
        assert!(line.trim_start().starts_with("-  PRODUCTION"), "{}", line);
        assert!(line.ends_with("abcd"));
    }

    #[test]
    fn test_draft_publish_cancel_round() {
        let dir = tempfile::tempdir().unwrap();
        let geo = dir.path().join("area.json");
        std::fs::write(
            &geo,
            r#"{"type":"Polygon","coordinates":[[[4.0,52.0],[5.0,52.0],[5.0,53.0]]]}"#,
        )
        .unwrap();

        let mut record = SigmetRecord::draft("AMSTERDAM FIR", "EHAA", "EHDB");
        record.set_phenomenon(Some(Phenomenon::SevIce));
        record
            .set_geo_from_str(&std::fs::read_to_string(&geo).unwrap())
            .unwrap();
        cmd_store_draft(dir.path(), &record).unwrap();
        cmd_publish(dir.path(), record.uuid()).unwrap();
        cmd_cancel(dir.path(), record.uuid()).unwrap();
        assert!(cmd_publish(dir.path(), record.uuid()).is_err());
        cmd_list(dir.path()).unwrap();
    }
}
