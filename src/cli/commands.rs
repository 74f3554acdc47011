use chrono::DateTime;
use std::path::Path;
use tracing::info;

use crate::cli::args::{Cli, Commands, GridArgs};
use crate::config::{PipelineSettings, Secrets, SettingsOverrides};
use crate::error::Result;
use crate::extractors::{Fetcher, OpenWeatherFetcher};
use crate::models::NormalizedRecord;
use crate::processors::{batch_to_records, generate_mesh, reconcile_zones, Pipeline};
use crate::stores::{CsvZoneStore, ZoneStore};
use crate::utils::progress::ProgressReporter;
use crate::writers::ParquetSink;

fn load_settings(grid: &GridArgs, overrides: SettingsOverrides) -> Result<PipelineSettings> {
    PipelineSettings::load(grid.config.as_deref(), &overrides)
}

fn describe(record: &NormalizedRecord) -> String {
    let at = DateTime::from_timestamp(record.recorded_at(), 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| record.recorded_at().to_string());

    match record {
        NormalizedRecord::Weather(r) => format!(
            "zone {} at {}: temp={:.1}°C, humidity={:.0}%, pressure={:.0}",
            r.zone_id, at, r.temperature, r.humidity, r.pressure
        ),
        NormalizedRecord::AirQuality(r) => format!(
            "zone {} at {}: co={:.2}, no={:.2}, no2={:.2}, o3={:.2}, so2={:.2}, pm2_5={:.2}, pm10={:.2}, nh3={:.2}",
            r.zone_id, at, r.co, r.no, r.no2, r.o3, r.so2, r.pm2_5, r.pm10, r.nh3
        ),
    }
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run {
            grid,
            target,
            output_dir,
            compression,
            quiet,
        } => {
            let overrides = SettingsOverrides {
                target,
                output_dir,
                ..grid.overrides()
            };
            let settings = load_settings(&grid, overrides)?;
            let secrets = Secrets::load()?;

            println!("Running pipeline for table '{}'", settings.target);
            println!(
                "Bounding box: lat ({}, {}], lon ({}, {}], step {}",
                settings.bounds.min_lat,
                settings.bounds.max_lat,
                settings.bounds.min_lon,
                settings.bounds.max_lon,
                settings.grid_size
            );

            let fetchers: Vec<Box<dyn Fetcher>> =
                OpenWeatherFetcher::from_settings(&settings, &secrets)?
                    .into_iter()
                    .map(|f| Box::new(f) as Box<dyn Fetcher>)
                    .collect();
            let store = CsvZoneStore::new(&settings.zones_file);
            let sink = ParquetSink::new(&settings.output_dir).with_compression(&compression)?;

            let mut pipeline = Pipeline::new(settings, store, sink)
                .with_fetchers(fetchers)
                .with_progress(!quiet);
            let report = pipeline.run()?;

            println!("\n{}", report.generate_summary());
            report.check_load()?;
            println!("Processing complete!");
        }

        Commands::Mesh { grid } => {
            let settings = load_settings(&grid, grid.overrides())?;
            let bounds = &settings.bounds;
            let mesh = generate_mesh(
                bounds.max_lat,
                bounds.min_lat,
                bounds.max_lon,
                bounds.min_lon,
                settings.grid_size,
            )?;

            println!(
                "{} latitudes x {} longitudes = {} grid points",
                mesh.latitudes.len(),
                mesh.longitudes.len(),
                mesh.len()
            );
            println!("Latitudes: {:?}", mesh.latitudes);
            println!("Longitudes: {:?}", mesh.longitudes);
        }

        Commands::Zones { grid } => {
            let settings = load_settings(&grid, grid.overrides())?;
            let bounds = &settings.bounds;
            let mesh = generate_mesh(
                bounds.max_lat,
                bounds.min_lat,
                bounds.max_lon,
                bounds.min_lon,
                settings.grid_size,
            )?;

            let progress = ProgressReporter::new_spinner("Reconciling zones...", false);
            let mut store = CsvZoneStore::new(&settings.zones_file);
            store.probe()?;
            let reconciliation = reconcile_zones(&mut store, &mesh)?;
            progress.finish_with_message("Zones reconciled");

            info!(path = %store.path().display(), "Zone registry up to date");
            println!(
                "{} zone(s) already registered, {} inserted ({} grid points)",
                reconciliation.existing,
                reconciliation.inserted.len(),
                mesh.len()
            );
        }

        Commands::Info { file, sample } => {
            println!("Analyzing Parquet file: {}", file.display());

            let sink = ParquetSink::new(file.parent().unwrap_or_else(|| Path::new(".")));
            let file_info = sink.get_file_info(&file)?;

            println!("\nFile Details:");
            println!("{}", file_info.summary());

            if sample > 0 {
                println!("Sample Records (showing up to {} records):", sample);
                match sink.read_batches(&file, sample) {
                    Ok(batches) => {
                        let mut shown = 0;
                        for batch in &batches {
                            for record in batch_to_records(batch)? {
                                shown += 1;
                                println!("{}. {}", shown, describe(&record));
                            }
                        }
                    }
                    Err(e) => println!("Error reading sample data: {}", e),
                }
            }
        }
    }

    Ok(())
}
