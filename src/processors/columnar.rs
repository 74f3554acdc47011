use arrow::array::{Array, ArrayRef, Float64Array, TimestampSecondArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

use crate::error::{EtlError, Result};
use crate::models::{AirQualityRecord, Dataset, NormalizedRecord, WeatherRecord};
use crate::validation::POLLUTANTS;

const UTC: &str = "UTC";
const WEATHER_MEASUREMENTS: [&str; 3] = ["temperature", "humidity", "pressure"];

fn recorded_at_type() -> DataType {
    DataType::Timestamp(TimeUnit::Second, Some(UTC.into()))
}

/// Arrow schema of a target table: `zone_id`, `recorded_at`, then the measurements
pub fn schema_for(dataset: Dataset) -> SchemaRef {
    let measurements: &[&str] = match dataset {
        Dataset::Weather => &WEATHER_MEASUREMENTS,
        Dataset::AirQuality => &POLLUTANTS,
    };

    let mut fields = vec![
        Field::new("zone_id", DataType::UInt64, false),
        Field::new("recorded_at", recorded_at_type(), false),
    ];
    fields.extend(
        measurements
            .iter()
            .map(|name| Field::new(*name, DataType::Float64, false)),
    );

    Arc::new(Schema::new(fields))
}

fn float_column<T>(records: &[&T], value: impl Fn(&T) -> f64) -> ArrayRef {
    Arc::new(Float64Array::from(
        records.iter().map(|r| value(*r)).collect::<Vec<f64>>(),
    ))
}

/// Unify the records of one dataset into a single column-oriented batch
///
/// Records of other datasets are ignored. Row order is preserved.
pub fn records_to_batch(dataset: Dataset, records: &[NormalizedRecord]) -> Result<RecordBatch> {
    let schema = schema_for(dataset);

    let columns: Vec<ArrayRef> = match dataset {
        Dataset::Weather => {
            let rows: Vec<&WeatherRecord> =
                records.iter().filter_map(NormalizedRecord::as_weather).collect();
            vec![
                Arc::new(UInt64Array::from(
                    rows.iter().map(|r| r.zone_id).collect::<Vec<u64>>(),
                )),
                Arc::new(
                    TimestampSecondArray::from(
                        rows.iter().map(|r| r.recorded_at).collect::<Vec<i64>>(),
                    )
                    .with_timezone(UTC),
                ),
                float_column(&rows, |r| r.temperature),
                float_column(&rows, |r| r.humidity),
                float_column(&rows, |r| r.pressure),
            ]
        }
        Dataset::AirQuality => {
            let rows: Vec<&AirQualityRecord> = records
                .iter()
                .filter_map(NormalizedRecord::as_air_quality)
                .collect();
            vec![
                Arc::new(UInt64Array::from(
                    rows.iter().map(|r| r.zone_id).collect::<Vec<u64>>(),
                )),
                Arc::new(
                    TimestampSecondArray::from(
                        rows.iter().map(|r| r.recorded_at).collect::<Vec<i64>>(),
                    )
                    .with_timezone(UTC),
                ),
                float_column(&rows, |r| r.co),
                float_column(&rows, |r| r.no),
                float_column(&rows, |r| r.no2),
                float_column(&rows, |r| r.o3),
                float_column(&rows, |r| r.so2),
                float_column(&rows, |r| r.pm2_5),
                float_column(&rows, |r| r.pm10),
                float_column(&rows, |r| r.nh3),
            ]
        }
    };

    Ok(RecordBatch::try_new(schema, columns)?)
}

/// Which table a batch belongs to, judged by its columns
pub fn dataset_of(batch: &RecordBatch) -> Result<Dataset> {
    let schema = batch.schema();
    Dataset::ALL
        .into_iter()
        .find(|dataset| {
            let expected = schema_for(*dataset);
            expected.fields().len() == schema.fields().len()
                && expected
                    .fields()
                    .iter()
                    .zip(schema.fields().iter())
                    .all(|(a, b)| a.name() == b.name())
        })
        .ok_or_else(|| {
            EtlError::InvalidFormat(format!(
                "Columns {:?} match no known table",
                schema.fields().iter().map(|f| f.name().as_str()).collect::<Vec<_>>()
            ))
        })
}

fn column<'a, A: Array + 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a A> {
    batch
        .column_by_name(name)
        .and_then(|column| column.as_any().downcast_ref::<A>())
        .ok_or_else(|| EtlError::InvalidFormat(format!("Invalid {} column type", name)))
}

fn floats<'a>(batch: &'a RecordBatch, names: &[&str]) -> Result<Vec<&'a Float64Array>> {
    names
        .iter()
        .map(|name| column::<Float64Array>(batch, name))
        .collect()
}

/// Turn a loaded batch back into typed records
pub fn batch_to_records(batch: &RecordBatch) -> Result<Vec<NormalizedRecord>> {
    let dataset = dataset_of(batch)?;
    let zone_ids = column::<UInt64Array>(batch, "zone_id")?;
    let recorded_at = column::<TimestampSecondArray>(batch, "recorded_at")?;

    let records = match dataset {
        Dataset::Weather => {
            let m = floats(batch, &WEATHER_MEASUREMENTS)?;
            (0..batch.num_rows())
                .map(|i| {
                    NormalizedRecord::Weather(WeatherRecord {
                        zone_id: zone_ids.value(i),
                        recorded_at: recorded_at.value(i),
                        temperature: m[0].value(i),
                        humidity: m[1].value(i),
                        pressure: m[2].value(i),
                    })
                })
                .collect()
        }
        Dataset::AirQuality => {
            let m = floats(batch, &POLLUTANTS)?;
            (0..batch.num_rows())
                .map(|i| {
                    NormalizedRecord::AirQuality(AirQualityRecord {
                        zone_id: zone_ids.value(i),
                        recorded_at: recorded_at.value(i),
                        co: m[0].value(i),
                        no: m[1].value(i),
                        no2: m[2].value(i),
                        o3: m[3].value(i),
                        so2: m[4].value(i),
                        pm2_5: m[5].value(i),
                        pm10: m[6].value(i),
                        nh3: m[7].value(i),
                    })
                })
                .collect()
        }
    };

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather(zone_id: u64) -> NormalizedRecord {
        NormalizedRecord::Weather(WeatherRecord {
            zone_id,
            recorded_at: 1_700_000_000 + zone_id as i64,
            temperature: 15.2,
            humidity: 60.0,
            pressure: 101300.0,
        })
    }

    fn air(zone_id: u64) -> NormalizedRecord {
        NormalizedRecord::AirQuality(AirQualityRecord {
            zone_id,
            recorded_at: 1_700_000_000,
            co: 201.94,
            no: 0.02,
            no2: 0.77,
            o3: 68.66,
            so2: 0.64,
            pm2_5: 0.5,
            pm10: 0.54,
            nh3: 0.12,
        })
    }

    #[test]
    fn test_weather_batch_layout() {
        let records = vec![weather(1), weather(2), air(3)];
        let batch = records_to_batch(Dataset::Weather, &records).unwrap();

        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 5);
        assert_eq!(
            batch.schema().field(1).data_type(),
            &DataType::Timestamp(TimeUnit::Second, Some("UTC".into()))
        );

        let zone_ids = column::<UInt64Array>(&batch, "zone_id").unwrap();
        assert_eq!(zone_ids.values().to_vec(), vec![1, 2]);
    }

    #[test]
    fn test_air_quality_schema_follows_pollutant_order() {
        let schema = schema_for(Dataset::AirQuality);
        let names: Vec<_> = schema.fields().iter().map(|f| f.name().clone()).collect();
        assert_eq!(names[..2].to_vec(), vec!["zone_id".to_string(), "recorded_at".to_string()]);
        assert_eq!(
            names[2..].to_vec(),
            POLLUTANTS.iter().map(|p| p.to_string()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_batch_converts_back_to_records() {
        let records = vec![air(4), air(5)];
        let batch = records_to_batch(Dataset::AirQuality, &records).unwrap();

        assert_eq!(dataset_of(&batch).unwrap(), Dataset::AirQuality);
        assert_eq!(batch_to_records(&batch).unwrap(), records);
    }

    #[test]
    fn test_empty_input_gives_empty_batch() {
        let batch = records_to_batch(Dataset::Weather, &[]).unwrap();
        assert_eq!(batch.num_rows(), 0);
        assert_eq!(dataset_of(&batch).unwrap(), Dataset::Weather);
    }
}
