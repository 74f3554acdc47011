use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use tracing::debug;
use validator::Validate;

use crate::error::{EtlError, Result};
use crate::models::{Coordinate, CoordinateKey, Zone};

use super::ZoneStore;

/// Append-only zone registry stored as `id,latitude,longitude` CSV
pub struct CsvZoneStore {
    path: PathBuf,
}

impl CsvZoneStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every zone in the registry, in file order
    pub fn read_all(&self) -> Result<Vec<Zone>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut zones = Vec::new();
        for (row, result) in reader.deserialize::<Zone>().enumerate() {
            let zone = result?;
            zone.validate().map_err(|e| {
                EtlError::InvalidFormat(format!(
                    "Zone row {} in {}: {}",
                    row + 1,
                    self.path.display(),
                    e
                ))
            })?;
            zones.push(zone);
        }
        Ok(zones)
    }

    fn is_empty_file(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(true);
        }
        Ok(fs::metadata(&self.path)?.len() == 0)
    }
}

impl ZoneStore for CsvZoneStore {
    fn probe(&self) -> Result<()> {
        let connectivity = |message: String| EtlError::Connectivity {
            target: self.path.display().to_string(),
            message,
        };

        if self.path.exists() {
            File::open(&self.path).map_err(|e| connectivity(e.to_string()))?;
            let mut reader =
                csv::Reader::from_path(&self.path).map_err(|e| connectivity(e.to_string()))?;
            reader.headers().map_err(|e| connectivity(e.to_string()))?;
        } else if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| connectivity(e.to_string()))?;
        }

        Ok(())
    }

    fn find_zones(&self, candidates: &HashSet<CoordinateKey>) -> Result<Vec<Zone>> {
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|zone| candidates.contains(&zone.key()))
            .collect())
    }

    fn insert_zones(&mut self, coordinates: &[Coordinate]) -> Result<Vec<Zone>> {
        if coordinates.is_empty() {
            return Ok(Vec::new());
        }

        let first_id = self
            .read_all()?
            .iter()
            .map(|z| z.id)
            .max()
            .map_or(1, |id| id + 1);
        let created: Vec<Zone> = coordinates
            .iter()
            .zip(first_id..)
            .map(|(&coordinate, id)| Zone::new(id, coordinate))
            .collect();

        let write_header = self.is_empty_file()?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);
        for zone in &created {
            writer.serialize(zone)?;
        }
        writer.flush()?;

        debug!(
            path = %self.path.display(),
            inserted = created.len(),
            "Appended zones to registry"
        );

        Ok(created)
    }
}
