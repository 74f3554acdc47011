use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::SettingsOverrides;
use crate::models::Dataset;

#[derive(Parser)]
#[command(name = "zonegrid-etl")]
#[command(about = "Grid-based weather and air-quality ETL")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

/// Settings file plus per-run overrides shared by the grid commands
#[derive(Args, Debug, Clone, Default)]
pub struct GridArgs {
    #[arg(short, long, help = "Settings file (TOML, YAML or JSON)")]
    pub config: Option<PathBuf>,

    #[arg(long, allow_negative_numbers = true)]
    pub max_lat: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    pub min_lat: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    pub max_lon: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    pub min_lon: Option<f64>,

    #[arg(short, long, help = "Grid step in degrees")]
    pub grid_size: Option<f64>,

    #[arg(long, help = "Zone registry CSV file")]
    pub zones_file: Option<PathBuf>,
}

impl GridArgs {
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            max_lat: self.max_lat,
            min_lat: self.min_lat,
            max_lon: self.max_lon,
            min_lon: self.min_lon,
            grid_size: self.grid_size,
            zones_file: self.zones_file.clone(),
            ..SettingsOverrides::default()
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline and load the target table
    Run {
        #[command(flatten)]
        grid: GridArgs,

        #[arg(short, long, value_enum, help = "Target table")]
        target: Option<Dataset>,

        #[arg(short, long, help = "Directory for loaded Parquet files")]
        output_dir: Option<PathBuf>,

        #[arg(long, default_value = "snappy")]
        compression: String,

        #[arg(short, long, help = "Hide the progress bar")]
        quiet: bool,
    },

    /// Print the grid a run would sample
    Mesh {
        #[command(flatten)]
        grid: GridArgs,
    },

    /// Register missing zones for the grid without extracting anything
    Zones {
        #[command(flatten)]
        grid: GridArgs,
    },

    /// Display information about a Parquet file
    Info {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = "10")]
        sample: usize,
    },
}
