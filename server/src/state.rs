use std::collections::BTreeMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use serde::Serialize;
use storemap_shared::{MapSnapshot, RouteOverlay};

/// Listing entry for `/api/maps`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSummary {
    pub id: String,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub cell_count: usize,
    pub has_route: bool,
}

/// One map with its JSON bodies serialized once at startup.
#[derive(Debug, Clone)]
pub struct StoredMap {
    pub summary: MapSummary,
    pub etag: String,
    pub snapshot_json: Bytes,
    pub cells_json: Bytes,
    pub route_json: Bytes,
}

impl StoredMap {
    pub fn from_snapshot(snapshot: &MapSnapshot) -> Result<Self, serde_json::Error> {
        let snapshot_json = Bytes::from(serde_json::to_vec(snapshot)?);
        let cells_json = Bytes::from(serde_json::to_vec(&snapshot.cells)?);
        let route = snapshot.route.clone().unwrap_or_default();
        let route_json = Bytes::from(serde_json::to_vec::<RouteOverlay>(&route)?);

        let mut hasher = DefaultHasher::new();
        snapshot_json.hash(&mut hasher);
        let etag = format!("\"map-{}-{:016x}\"", snapshot.map.id, hasher.finish());

        Ok(Self {
            summary: MapSummary {
                id: snapshot.map.id.clone(),
                name: snapshot.map.name.clone(),
                width: snapshot.map.width,
                height: snapshot.map.height,
                cell_count: snapshot.cells.len(),
                has_route: !route.is_empty(),
            },
            etag,
            snapshot_json,
            cells_json,
            route_json,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub maps: Arc<BTreeMap<String, StoredMap>>,
    pub maps_json: Arc<Bytes>,
    pub observability: Arc<ObservabilityCounters>,
}

impl AppState {
    /// Build the store. Maps that fail to serialize are logged and skipped;
    /// a later map with a duplicate id replaces the earlier one.
    pub fn new(snapshots: Vec<MapSnapshot>) -> Self {
        let mut maps = BTreeMap::new();
        for snapshot in &snapshots {
            match StoredMap::from_snapshot(snapshot) {
                Ok(stored) => {
                    if maps.insert(stored.summary.id.clone(), stored).is_some() {
                        tracing::warn!(
                            id = %snapshot.map.id,
                            "duplicate map id, keeping the last one"
                        );
                    }
                }
                Err(e) => {
                    tracing::warn!(id = %snapshot.map.id, error = %e, "failed to serialize map");
                }
            }
        }

        let summaries: Vec<&MapSummary> = maps.values().map(|stored| &stored.summary).collect();
        let maps_json = match serde_json::to_vec(&summaries) {
            Ok(json) => Bytes::from(json),
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize map listing");
                Bytes::from_static(b"[]")
            }
        };

        Self {
            maps: Arc::new(maps),
            maps_json: Arc::new(maps_json),
            observability: Arc::new(ObservabilityCounters::default()),
        }
    }

    pub fn map(&self, id: &str) -> Option<&StoredMap> {
        self.maps.get(id)
    }
}

#[derive(Debug, Default)]
pub struct ObservabilityCounters {
    map_requests_total: AtomicU64,
    not_modified_total: AtomicU64,
    not_found_total: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservabilitySnapshot {
    pub map_requests_total: u64,
    pub not_modified_total: u64,
    pub not_found_total: u64,
}

impl ObservabilityCounters {
    pub fn snapshot(&self) -> ObservabilitySnapshot {
        ObservabilitySnapshot {
            map_requests_total: self.map_requests_total.load(Ordering::Relaxed),
            not_modified_total: self.not_modified_total.load(Ordering::Relaxed),
            not_found_total: self.not_found_total.load(Ordering::Relaxed),
        }
    }

    pub fn record_map_request(&self) {
        self.map_requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_not_modified(&self) {
        self.not_modified_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_not_found(&self) {
        self.not_found_total.fetch_add(1, Ordering::Relaxed);
    }
}
