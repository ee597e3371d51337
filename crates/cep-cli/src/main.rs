//! Civic Exchange Protocol CLI - fingerprints, record hashing, and chain
//! verification.

use clap::{Parser, Subcommand, ValueEnum};

mod commands;

use commands::{hash, snfei, verify};

/// Which record aggregate a JSON file contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RecordType {
    /// Entity records.
    Entity,
    /// Relationship records.
    Relationship,
    /// Exchange records.
    Exchange,
}

#[derive(Parser)]
#[command(name = "cep")]
#[command(about = "Civic Exchange Protocol canonicalization and verification CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a fingerprint for an entity name and country
    Snfei {
        /// Raw legal name
        legal_name: String,
        /// ISO country code
        #[arg(long, short = 'c', default_value = "US")]
        country_code: String,
        /// Street address, when known
        #[arg(long)]
        address: Option<String>,
        /// Registration date, when known
        #[arg(long)]
        registration_date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the canonical string and digest for a record file
    Hash {
        /// Path to a JSON record file
        record: String,
        /// Record type in the file
        #[arg(long, value_enum)]
        record_type: RecordType,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Verify the revision chain in a JSON array of records
    VerifyChain {
        /// Path to a JSON file holding an array of records, oldest first
        records: String,
        /// Record type in the file
        #[arg(long, value_enum)]
        record_type: RecordType,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show package version
    Version,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Snfei {
            legal_name,
            country_code,
            address,
            registration_date,
            json,
        } => snfei::run(legal_name, country_code, address, registration_date, json),
        Commands::Hash {
            record,
            record_type,
            json,
        } => hash::run(record, record_type, json),
        Commands::VerifyChain {
            records,
            record_type,
            json,
        } => verify::run(records, record_type, json),
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
