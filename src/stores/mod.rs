//! Persistence seam for the zone registry
//!
//! The pipeline only reads and appends zones; no store operation updates or
//! deletes an existing row. Check-then-insert is not atomic, so a single writer
//! per registry is assumed.

pub mod csv_store;
pub mod memory_store;

pub use csv_store::CsvZoneStore;
pub use memory_store::InMemoryZoneStore;

use std::collections::HashSet;

use crate::error::Result;
use crate::models::{Coordinate, CoordinateKey, Zone};

pub trait ZoneStore {
    /// Fails when the registry cannot be reached
    fn probe(&self) -> Result<()>;

    /// Zones whose rounded (latitude, longitude) is one of `candidates`
    fn find_zones(&self, candidates: &HashSet<CoordinateKey>) -> Result<Vec<Zone>>;

    /// Append one new zone per coordinate in a single operation, returning the created rows
    fn insert_zones(&mut self, coordinates: &[Coordinate]) -> Result<Vec<Zone>>;
}

impl<S: ZoneStore + ?Sized> ZoneStore for &mut S {
    fn probe(&self) -> Result<()> {
        (**self).probe()
    }

    fn find_zones(&self, candidates: &HashSet<CoordinateKey>) -> Result<Vec<Zone>> {
        (**self).find_zones(candidates)
    }

    fn insert_zones(&mut self, coordinates: &[Coordinate]) -> Result<Vec<Zone>> {
        (**self).insert_zones(coordinates)
    }
}

impl<S: ZoneStore + ?Sized> ZoneStore for Box<S> {
    fn probe(&self) -> Result<()> {
        (**self).probe()
    }

    fn find_zones(&self, candidates: &HashSet<CoordinateKey>) -> Result<Vec<Zone>> {
        (**self).find_zones(candidates)
    }

    fn insert_zones(&mut self, coordinates: &[Coordinate]) -> Result<Vec<Zone>> {
        (**self).insert_zones(coordinates)
    }
}
