use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod categories;
mod convert;

#[derive(Debug, Parser)]
#[command(name = "shopmig")]
#[command(about = "Convert legacy ERP product exports into Matrixify import sheets")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Convert the source tables into products and variants CSVs
    Convert {
        /// Directory holding the Shift_JIS source tables
        #[arg(long)]
        input_dir: Option<PathBuf>,
        /// Directory receiving the output sheets and the run report
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// YAML export profile
        #[arg(long)]
        profile: Option<PathBuf>,
        /// Run every stage but write nothing; print the report instead
        #[arg(long)]
        dry_run: bool,
        /// Also write the run report as JSON
        #[arg(long)]
        report_json: bool,
    },
    /// Print the resolved category tree
    Categories {
        #[arg(long)]
        input_dir: Option<PathBuf>,
        #[arg(long)]
        profile: Option<PathBuf>,
    },
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = shopmig_core::load_app_config()?;
    init_tracing(&config.log_level);

    match cli.command {
        Some(Commands::Convert {
            input_dir,
            output_dir,
            profile,
            dry_run,
            report_json,
        }) => {
            apply_overrides(&mut config, input_dir, output_dir, profile);
            let options = convert::ConvertOptions {
                dry_run,
                report_json,
            };
            convert::run_convert(&config, options).await?;
        }
        Some(Commands::Categories { input_dir, profile }) => {
            apply_overrides(&mut config, input_dir, None, profile);
            categories::run_categories(&config)?;
        }
        None => println!("shopmig: run `shopmig convert` or `shopmig --help`"),
    }

    Ok(())
}

/// Flags win over the environment.
fn apply_overrides(
    config: &mut shopmig_core::AppConfig,
    input_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    profile: Option<PathBuf>,
) {
    if let Some(dir) = input_dir {
        config.input_dir = dir;
    }
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }
    if profile.is_some() {
        config.profile_path = profile;
    }
}

/// Loads the configured export profile, or the built-in defaults.
fn load_profile(config: &shopmig_core::AppConfig) -> anyhow::Result<shopmig_core::ExportProfile> {
    match &config.profile_path {
        Some(path) => {
            let profile = shopmig_core::load_profile(path)?;
            tracing::info!(path = %path.display(), "loaded export profile");
            Ok(profile)
        }
        None => Ok(shopmig_core::ExportProfile::default()),
    }
}
