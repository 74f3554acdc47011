use std::collections::{HashMap, HashSet};

use tracing::{info, warn};

use crate::error::{EtlError, Result};
use crate::models::{Coordinate, CoordinateKey, Mesh, Zone};
use crate::stores::ZoneStore;

/// In-memory (latitude, longitude) -> zone id lookup for one pipeline run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneTable {
    zones: HashMap<CoordinateKey, u64>,
}

impl ZoneTable {
    /// Build the lookup; when a coordinate appears twice the lowest id wins
    pub fn from_zones<'a, I: IntoIterator<Item = &'a Zone>>(zones: I) -> Self {
        let mut table: HashMap<CoordinateKey, u64> = HashMap::new();
        for zone in zones {
            table
                .entry(zone.key())
                .and_modify(|id| {
                    if zone.id != *id {
                        warn!(
                            first = *id,
                            duplicate = zone.id,
                            latitude = zone.latitude,
                            longitude = zone.longitude,
                            "Duplicate zone in registry"
                        );
                        *id = (*id).min(zone.id);
                    }
                })
                .or_insert(zone.id);
        }
        Self { zones: table }
    }

    pub fn resolve(&self, latitude: f64, longitude: f64) -> Option<u64> {
        self.zones.get(&CoordinateKey::of(latitude, longitude)).copied()
    }

    pub fn contains(&self, key: &CoordinateKey) -> bool {
        self.zones.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub table: ZoneTable,
    /// Candidates already present in the registry before this run
    pub existing: usize,
    /// Zones appended by this run
    pub inserted: Vec<Zone>,
}

/// Make sure every mesh point has exactly one persisted zone and map points to zone ids
///
/// Query the registry for the mesh's candidates, append the missing ones in one
/// insert, then re-query to build the lookup. Re-running with the same mesh
/// inserts nothing. Any store failure aborts reconciliation; the caller must not
/// run transformers against a partial table.
pub fn reconcile_zones<S: ZoneStore>(store: &mut S, mesh: &Mesh) -> Result<Reconciliation> {
    let candidates: Vec<Coordinate> = mesh.points().collect();
    let candidate_keys: HashSet<CoordinateKey> = candidates.iter().map(|c| c.key()).collect();

    let persisted = store
        .find_zones(&candidate_keys)
        .map_err(|e| EtlError::ZoneReconciliation(format!("zone lookup failed: {}", e)))?;
    let persisted_keys: HashSet<CoordinateKey> = persisted.iter().map(|z| z.key()).collect();

    let mut queued = HashSet::new();
    let missing: Vec<Coordinate> = candidates
        .iter()
        .filter(|c| !persisted_keys.contains(&c.key()) && queued.insert(c.key()))
        .copied()
        .collect();

    let inserted = store
        .insert_zones(&missing)
        .map_err(|e| EtlError::ZoneReconciliation(format!("zone insert failed: {}", e)))?;

    let reconciled = store
        .find_zones(&candidate_keys)
        .map_err(|e| EtlError::ZoneReconciliation(format!("zone re-query failed: {}", e)))?;
    let table = ZoneTable::from_zones(&reconciled);

    let unresolved = candidate_keys.iter().filter(|k| !table.contains(k)).count();
    if unresolved > 0 {
        return Err(EtlError::ZoneReconciliation(format!(
            "{} of {} grid points have no zone after insert",
            unresolved,
            candidate_keys.len()
        )));
    }

    info!(
        candidates = candidate_keys.len(),
        existing = persisted_keys.len(),
        inserted = inserted.len(),
        "Zone reconciliation completed"
    );

    Ok(Reconciliation {
        table,
        existing: persisted_keys.len(),
        inserted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::generate_mesh;
    use crate::stores::InMemoryZoneStore;

    #[test]
    fn test_first_run_inserts_every_point() {
        let mesh = generate_mesh(19.55, 19.45, -99.05, -99.15, 0.05).unwrap();
        let mut store = InMemoryZoneStore::new();

        let result = reconcile_zones(&mut store, &mesh).unwrap();

        assert_eq!(result.existing, 0);
        assert_eq!(result.inserted.len(), 4);
        assert_eq!(result.table.len(), 4);
        assert_eq!(result.table.resolve(19.55, -99.05), Some(1));
        assert_eq!(result.table.resolve(19.5, -99.1), Some(4));
    }

    #[test]
    fn test_second_run_inserts_nothing() {
        let mesh = generate_mesh(19.55, 19.45, -99.05, -99.15, 0.05).unwrap();
        let mut store = InMemoryZoneStore::new();

        let first = reconcile_zones(&mut store, &mesh).unwrap();
        let second = reconcile_zones(&mut store, &mesh).unwrap();

        assert!(second.inserted.is_empty());
        assert_eq!(second.existing, 4);
        assert_eq!(first.table, second.table);
        assert_eq!(store.zones().len(), 4);
        assert_eq!(store.insert_batches(), &[4]);
    }

    #[test]
    fn test_only_missing_points_are_inserted() {
        let existing = Zone::new(10, Coordinate::new(19.5, -99.1));
        let mut store = InMemoryZoneStore::with_zones(vec![existing]);
        let mesh = generate_mesh(19.55, 19.45, -99.05, -99.15, 0.05).unwrap();

        let result = reconcile_zones(&mut store, &mesh).unwrap();

        assert_eq!(result.existing, 1);
        assert_eq!(result.inserted.len(), 3);
        assert_eq!(result.table.resolve(19.5, -99.1), Some(10));
        assert!(result.inserted.iter().all(|z| z.id > 10));
    }

    #[test]
    fn test_store_noise_below_precision_still_matches() {
        // A registry row written with float drift must match the rounded mesh point
        let drifted = Zone {
            id: 5,
            latitude: 19.499999999999996,
            longitude: -99.05,
        };
        let mut store = InMemoryZoneStore::with_zones(vec![drifted]);
        let mesh = Mesh::new(vec![19.5], vec![-99.05], 0.05);

        let result = reconcile_zones(&mut store, &mesh).unwrap();

        assert!(result.inserted.is_empty());
        assert_eq!(result.table.resolve(19.5, -99.05), Some(5));
    }

    #[test]
    fn test_store_failure_is_fatal() {
        let mesh = generate_mesh(19.55, 19.45, -99.05, -99.15, 0.05).unwrap();
        let mut store = InMemoryZoneStore::offline();

        let err = reconcile_zones(&mut store, &mesh).unwrap_err();
        assert!(matches!(err, EtlError::ZoneReconciliation(_)));
    }

    #[test]
    fn test_duplicate_registry_rows_resolve_to_lowest_id() {
        let zones = vec![
            Zone::new(9, Coordinate::new(19.5, -99.1)),
            Zone::new(3, Coordinate::new(19.5, -99.1)),
        ];
        let table = ZoneTable::from_zones(&zones);
        assert_eq!(table.len(), 1);
        assert_eq!(table.resolve(19.5, -99.1), Some(3));
        assert_eq!(table.resolve(19.55, -99.1), None);
    }
}
