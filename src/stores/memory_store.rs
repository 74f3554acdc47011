use std::collections::HashSet;

use crate::error::{EtlError, Result};
use crate::models::{Coordinate, CoordinateKey, Zone};

use super::ZoneStore;

/// Zone registry held in memory, used for dry runs and tests
#[derive(Debug, Default)]
pub struct InMemoryZoneStore {
    zones: Vec<Zone>,
    insert_batches: Vec<usize>,
    offline: bool,
}

impl InMemoryZoneStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zones(zones: Vec<Zone>) -> Self {
        Self {
            zones,
            ..Self::default()
        }
    }

    /// A store whose probe and queries fail, standing in for an unreachable database
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Sizes of every non-empty insert, in call order
    pub fn insert_batches(&self) -> &[usize] {
        &self.insert_batches
    }

    fn ensure_online(&self) -> Result<()> {
        if self.offline {
            return Err(EtlError::Connectivity {
                target: "in-memory zone store".to_string(),
                message: "store is offline".to_string(),
            });
        }
        Ok(())
    }
}

impl ZoneStore for InMemoryZoneStore {
    fn probe(&self) -> Result<()> {
        self.ensure_online()
    }

    fn find_zones(&self, candidates: &HashSet<CoordinateKey>) -> Result<Vec<Zone>> {
        self.ensure_online()?;
        Ok(self
            .zones
            .iter()
            .filter(|zone| candidates.contains(&zone.key()))
            .cloned()
            .collect())
    }

    fn insert_zones(&mut self, coordinates: &[Coordinate]) -> Result<Vec<Zone>> {
        self.ensure_online()?;
        if coordinates.is_empty() {
            return Ok(Vec::new());
        }

        let mut next_id = self.zones.iter().map(|z| z.id).max().map_or(1, |id| id + 1);
        let created: Vec<Zone> = coordinates
            .iter()
            .map(|&coordinate| {
                let zone = Zone::new(next_id, coordinate);
                next_id += 1;
                zone
            })
            .collect();

        self.zones.extend(created.iter().cloned());
        self.insert_batches.push(created.len());
        Ok(created)
    }
}
