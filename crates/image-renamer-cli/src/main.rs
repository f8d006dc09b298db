use clap::{Parser, Subcommand};
use image_renamer_core::{logging, Config, ImageRenamer, LogLevel, RunSummary};
use log::info;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "image-renamer")]
#[command(about = "Rename images to the IDs listed in a CSV manifest")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rename images listed in the manifest
    Run {
        /// Number of parallel workers
        workers: Option<usize>,

        /// Manifest to read (defaults to the first .csv in the current directory)
        #[arg(short, long)]
        manifest: Option<PathBuf>,

        /// Root of the image tree
        #[arg(long)]
        images_dir: Option<PathBuf>,

        /// Where images not referenced by the manifest are moved
        #[arg(long)]
        quarantine_dir: Option<PathBuf>,

        /// Where report files are written
        #[arg(long)]
        reports_dir: Option<PathBuf>,

        /// Run without making changes
        #[arg(long)]
        dry_run: bool,

        /// Hide progress bars
        #[arg(long)]
        no_progress: bool,

        /// Write logs to rotating files in this directory instead of stderr
        #[arg(long)]
        log_dir: Option<PathBuf>,

        /// Verbosity level
        #[arg(short, long, action = clap::ArgAction::Count)]
        verbose: u8,

        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Generate default configuration file
    GenerateConfig {
        /// Path to save configuration file
        #[arg(default_value = "image-renamer.json")]
        path: PathBuf,
    },
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            workers,
            manifest,
            images_dir,
            quarantine_dir,
            reports_dir,
            dry_run,
            no_progress,
            log_dir,
            verbose,
            config,
        } => {
            // Set up configuration
            let mut config = match config {
                Some(config_path) => Config::from_file(&config_path)?,
                None => Config::default(),
            };

            // Override config with command line arguments
            if let Some(workers) = workers {
                config.workers = workers;
            }
            if manifest.is_some() {
                config.manifest = manifest;
            }
            if let Some(images_dir) = images_dir {
                config.images_dir = images_dir;
            }
            if let Some(quarantine_dir) = quarantine_dir {
                config.quarantine_dir = quarantine_dir;
            }
            if let Some(reports_dir) = reports_dir {
                config.reports_dir = reports_dir;
            }
            config.dry_run |= dry_run;
            config.show_progress &= !no_progress;

            // Set log level based on verbosity
            config.log_level = match verbose {
                0 => config.log_level,
                1 => LogLevel::Debug,
                _ => LogLevel::Trace,
            };

            match &log_dir {
                Some(dir) => logging::init_logger(dir, config.log_level.into())
                    .map_err(|e| anyhow::anyhow!("{}", e))?,
                None => env_logger::Builder::new()
                    .filter_level(config.log_level.into())
                    .parse_default_env()
                    .init(),
            }

            let renamer = ImageRenamer::new(config)?;

            info!("Starting rename...");
            let summary = renamer.run()?;
            print_summary(&summary);
            info!("Rename complete");

            Ok(())
        }

        Commands::GenerateConfig { path } => {
            let config = Config::default();
            config.save_to_file(&path)?;
            println!("Configuration file generated at: {}", path.display());
            Ok(())
        }
    }
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("Manifest:          {}", summary.manifest.display());
    println!(
        "Rows:              {} ({} unique)",
        summary.total_rows, summary.unique_rows
    );
    println!("Images found:      {}", summary.images_indexed);
    println!("Renamed:           {}", summary.renamed);
    println!(
        "Extra copies:      {} (for {} repeated images)",
        summary.copies, summary.duplicate_images
    );
    println!("Skipped rows:      {}", summary.skipped);
    println!("Not found:         {}", summary.not_found);
    if summary.failed > 0 {
        println!("Failed renames:    {}", summary.failed);
    }
    println!(
        "Unused images:     {} ({} could not be moved)",
        summary.leftovers, summary.relocation_failures
    );

    if let Some(path) = &summary.duplicate_report {
        println!("Repeated rows written to {}", path.display());
    }
    if let Some(path) = &summary.unmatched_report {
        println!("Missing images written to {}", path.display());
    }
}
