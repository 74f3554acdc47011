use arrow::record_batch::RecordBatch;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::cell::Cell;
use std::rc::Rc;
use tempfile::TempDir;
use zonegrid_etl::config::{BoundingBox, PipelineSettings};
use zonegrid_etl::error::EtlError;
use zonegrid_etl::extractors::{FetchOutcome, Fetcher};
use zonegrid_etl::models::{Dataset, NormalizedRecord, WeatherRecord};
use zonegrid_etl::processors::{batch_to_records, Pipeline};
use zonegrid_etl::stores::{CsvZoneStore, InMemoryZoneStore, ZoneStore};
use zonegrid_etl::writers::{LoadOutcome, MemorySink, ParquetSink, RecordSink};

const NOW: f64 = 1_700_000_000.6;

fn fixed_clock() -> f64 {
    NOW
}

/// Answers every coordinate with the same provider payload
struct StubFetcher {
    dataset: Dataset,
    payload: Value,
    calls: Rc<Cell<usize>>,
}

impl StubFetcher {
    fn weather() -> Self {
        Self {
            dataset: Dataset::Weather,
            payload: json!({
                "coord": { "lon": -99.1, "lat": 19.5 },
                "main": { "temp": 15.2, "humidity": 60, "pressure": 101300 },
                "name": "Mexico City"
            }),
            calls: Rc::new(Cell::new(0)),
        }
    }

    fn air_quality() -> Self {
        Self {
            dataset: Dataset::AirQuality,
            payload: json!({
                "list": [{
                    "main": { "aqi": 2 },
                    "components": {
                        "co": 201.94, "no": 0.02, "no2": 0.77, "o3": 68.66,
                        "so2": 0.64, "pm2_5": 0.5, "pm10": 0.54, "nh3": 0.12
                    },
                    "dt": 1_700_000_000
                }]
            }),
            calls: Rc::new(Cell::new(0)),
        }
    }
}

impl Fetcher for StubFetcher {
    fn dataset(&self) -> Dataset {
        self.dataset
    }

    fn fetch(&self, _latitude: f64, _longitude: f64) -> FetchOutcome {
        self.calls.set(self.calls.get() + 1);
        FetchOutcome::Success(self.payload.clone())
    }
}

fn two_by_two(target: Dataset) -> PipelineSettings {
    PipelineSettings {
        bounds: BoundingBox {
            max_lat: 19.55,
            min_lat: 19.45,
            max_lon: -99.05,
            min_lon: -99.15,
        },
        grid_size: 0.05,
        target,
        ..PipelineSettings::default()
    }
}

#[test]
fn test_two_by_two_grid_loads_four_weather_rows() {
    let weather = StubFetcher::weather();
    let weather_calls = Rc::clone(&weather.calls);
    let air = StubFetcher::air_quality();
    let air_calls = Rc::clone(&air.calls);

    let mut pipeline = Pipeline::new(
        two_by_two(Dataset::Weather),
        InMemoryZoneStore::new(),
        MemorySink::new(),
    )
    .with_fetcher(weather)
    .with_fetcher(air)
    .with_clock(fixed_clock);

    let report = pipeline.run().unwrap();

    assert_eq!(weather_calls.get(), 4);
    assert_eq!(air_calls.get(), 4);
    assert_eq!(report.samples, 4);
    assert_eq!(report.transformed, 4);
    assert_eq!(report.discarded(), 0);

    let (store, sink) = pipeline.into_parts();
    assert_eq!(sink.loads().len(), 1);
    let (dataset, batch) = &sink.loads()[0];
    assert_eq!(*dataset, Dataset::Weather);
    assert_eq!(batch.num_rows(), 4);

    let mut zone_ids: Vec<u64> = store.zones().iter().map(|z| z.id).collect();
    zone_ids.sort_unstable();

    let mut loaded = batch_to_records(batch).unwrap();
    let expected: Vec<NormalizedRecord> = zone_ids
        .iter()
        .map(|&zone_id| {
            NormalizedRecord::Weather(WeatherRecord {
                zone_id,
                recorded_at: 1_700_000_000,
                temperature: 15.2,
                humidity: 60.0,
                pressure: 101300.0,
            })
        })
        .collect();

    loaded.sort_by_key(|r| r.zone_id());
    assert_eq!(loaded, expected);
}

#[test]
fn test_air_quality_target_reads_its_own_payload() {
    let mut pipeline = Pipeline::new(
        two_by_two(Dataset::AirQuality),
        InMemoryZoneStore::new(),
        MemorySink::new(),
    )
    .with_fetcher(StubFetcher::weather())
    .with_fetcher(StubFetcher::air_quality())
    .with_clock(fixed_clock);

    let report = pipeline.run().unwrap();
    assert_eq!(report.transformed, 4);

    let (dataset, batch) = &pipeline.sink().loads()[0];
    assert_eq!(*dataset, Dataset::AirQuality);
    let records = batch_to_records(batch).unwrap();
    assert!(records.iter().all(|r| r.as_air_quality().map(|a| a.co) == Some(201.94)));
}

#[test]
fn test_rerun_reuses_registered_zones() {
    let dir = TempDir::new().unwrap();
    let zones_file = dir.path().join("zones.csv");

    let mut first = Pipeline::new(
        two_by_two(Dataset::Weather),
        CsvZoneStore::new(&zones_file),
        MemorySink::new(),
    )
    .with_fetcher(StubFetcher::weather())
    .with_clock(fixed_clock);
    let first_report = first.run().unwrap();
    assert_eq!(first_report.zones_inserted, 4);

    let mut second = Pipeline::new(
        two_by_two(Dataset::Weather),
        CsvZoneStore::new(&zones_file),
        MemorySink::new(),
    )
    .with_fetcher(StubFetcher::weather())
    .with_clock(fixed_clock);
    let second_report = second.run().unwrap();

    assert_eq!(second_report.zones_existing, 4);
    assert_eq!(second_report.zones_inserted, 0);
    assert_eq!(CsvZoneStore::new(&zones_file).read_all().unwrap().len(), 4);
}

#[test]
fn test_missing_source_payload_is_fatal_when_nothing_transforms() {
    // only the air-quality source answers, so no sample has a weather payload
    let mut pipeline = Pipeline::new(
        two_by_two(Dataset::Weather),
        InMemoryZoneStore::new(),
        MemorySink::new(),
    )
    .with_fetcher(StubFetcher::air_quality())
    .with_clock(fixed_clock);

    let result = pipeline.run();
    assert!(matches!(result, Err(EtlError::NothingTransformed(_))));
    assert!(pipeline.sink().loads().is_empty());
}

#[test]
fn test_unreachable_registry_aborts_before_extraction() {
    let weather = StubFetcher::weather();
    let calls = Rc::clone(&weather.calls);

    let mut pipeline = Pipeline::new(
        two_by_two(Dataset::Weather),
        InMemoryZoneStore::offline(),
        MemorySink::new(),
    )
    .with_fetcher(weather);

    assert!(matches!(pipeline.run(), Err(EtlError::Connectivity { .. })));
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_parquet_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let output_dir = dir.path().join("output");
    let zones_file = dir.path().join("data").join("zones.csv");

    let mut settings = two_by_two(Dataset::Weather);
    settings.zones_file = zones_file.clone();
    settings.output_dir = output_dir.clone();

    let store = CsvZoneStore::new(&zones_file);
    store.probe().unwrap();
    let sink = ParquetSink::new(&output_dir).with_compression("zstd").unwrap();

    let mut pipeline = Pipeline::new(settings, store, sink)
        .with_fetcher(StubFetcher::weather())
        .with_clock(fixed_clock);
    let report = pipeline.run().unwrap();
    assert!(report.check_load().is_ok());

    let location = report.load.as_ref().and_then(|o| o.location.clone()).unwrap();
    assert!(location.starts_with(&output_dir));
    assert!(location
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("weather-"));

    let info = pipeline.sink().get_file_info(&location).unwrap();
    assert_eq!(info.total_rows, 4);

    let rows: usize = pipeline
        .sink()
        .read_batches(&location, 100)
        .unwrap()
        .iter()
        .map(|b| batch_to_records(b).unwrap().len())
        .sum();
    assert_eq!(rows, 4);
}

#[test]
fn test_back_to_back_runs_write_separate_files() {
    let dir = TempDir::new().unwrap();
    let output_dir = dir.path().join("output");

    let mut locations = Vec::new();
    for _ in 0..2 {
        let mut pipeline = Pipeline::new(
            two_by_two(Dataset::Weather),
            InMemoryZoneStore::new(),
            ParquetSink::new(&output_dir),
        )
        .with_fetcher(StubFetcher::weather())
        .with_clock(fixed_clock);

        let report = pipeline.run().unwrap();
        assert!(report.check_load().is_ok());
        locations.push(report.load.and_then(|o| o.location).unwrap());
    }

    assert_ne!(locations[0], locations[1]);
    assert_eq!(std::fs::read_dir(&output_dir).unwrap().count(), 2);
}

/// Probes a writable directory but loads into a path beneath a regular file
struct BlockedParquetSink {
    reachable: ParquetSink,
    blocked: ParquetSink,
}

impl RecordSink for BlockedParquetSink {
    fn probe(&self) -> zonegrid_etl::Result<()> {
        self.reachable.probe()
    }

    fn load(&mut self, dataset: Dataset, batch: &RecordBatch) -> zonegrid_etl::Result<LoadOutcome> {
        self.blocked.load(dataset, batch)
    }
}

#[test]
fn test_failed_parquet_write_is_reported_per_table() {
    let dir = TempDir::new().unwrap();
    let occupied = dir.path().join("occupied");
    std::fs::write(&occupied, b"not a directory").unwrap();

    let sink = BlockedParquetSink {
        reachable: ParquetSink::new(dir.path().join("output")),
        blocked: ParquetSink::new(occupied.join("output")),
    };
    let mut pipeline = Pipeline::new(two_by_two(Dataset::Weather), InMemoryZoneStore::new(), sink)
        .with_fetcher(StubFetcher::weather())
        .with_clock(fixed_clock);

    let report = pipeline.run().unwrap();
    assert_eq!(report.zones_inserted, 4);
    assert_eq!(report.load, Some(LoadOutcome::new(Dataset::Weather, 0, 4)));
    assert!(report.generate_summary().contains("Loaded into weather: 0 row(s), 4 failed"));
    assert!(matches!(
        report.check_load(),
        Err(EtlError::LoadFailed { failed: 4, .. })
    ));
}
