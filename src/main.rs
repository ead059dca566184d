use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hitran_lines::{load_with_registry, preview, save_table, Registry};

/// Extract spectral lines from HITRAN .par files by molecule and band
#[derive(Parser)]
#[command(name = "hitran-lines")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON rules file replacing the built-in registry
    #[arg(long, global = true, value_name = "FILE")]
    rules: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available molecule/band selections
    List,

    /// Extract the lines of one selection from a .par file
    Extract {
        /// HITRAN .par file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Molecule name (e.g. CS, HCN, C2H2)
        molecule: String,

        /// Band name (e.g. v_0, v2_0_1)
        band: String,

        /// Write all lines to a .csv, .json or .parquet file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of lines to preview
        #[arg(long, default_value = "5")]
        head: usize,
    },

    /// Print the registry as JSON, a starting point for a rules file
    DumpRules,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let registry = load_registry(cli.rules.as_deref())?;

    match cli.command {
        Commands::List => print!("{registry}"),
        Commands::DumpRules => println!("{}", registry.to_json_string()?),
        Commands::Extract {
            file,
            molecule,
            band,
            output,
            head,
        } => {
            let table = load_with_registry(&registry, &file, &molecule, &band)
                .with_context(|| format!("extracting {molecule}/{band} from {}", file.display()))?;

            println!("{} lines matched {molecule}/{band}", table.len());
            if head > 0 && !table.is_empty() {
                println!("{}", preview(&table, head)?);
            }
            if let Some(path) = output {
                save_table(&table, &path)
                    .with_context(|| format!("writing {}", path.display()))?;
            }
        }
    }
    Ok(())
}

fn load_registry(rules: Option<&Path>) -> Result<Registry> {
    match rules {
        Some(path) => Registry::from_json_file(path)
            .with_context(|| format!("loading rules from {}", path.display())),
        None => Ok(Registry::builtin().clone()),
    }
}
