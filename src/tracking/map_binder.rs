use crate::core::config::MapConfig;
use crate::core::error::MapError;
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MarkerId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    /// Smallest box containing every point, `None` for no points
    pub fn around(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        points.into_iter().fold(None, |acc, (lat, lon)| {
            Some(match acc {
                None => Bounds {
                    south: lat,
                    west: lon,
                    north: lat,
                    east: lon,
                },
                Some(b) => Bounds {
                    south: b.south.min(lat),
                    west: b.west.min(lon),
                    north: b.north.max(lat),
                    east: b.east.max(lon),
                },
            })
        })
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.south + self.north) / 2.0, (self.west + self.east) / 2.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapSettings {
    pub center: (f64, f64),
    pub zoom: u8,
    pub fit_padding: u32,
    pub max_zoom: u8,
}

impl MapSettings {
    pub fn from_config(config: &MapConfig) -> Self {
        Self {
            center: (config.center_latitude, config.center_longitude),
            zoom: config.zoom,
            fit_padding: config.fit_padding,
            max_zoom: config.max_zoom,
        }
    }
}

impl Default for MapSettings {
    fn default() -> Self {
        Self::from_config(&MapConfig::default())
    }
}

/// Rendering surface the binder drives
pub trait MapBackend: Send + 'static {
    fn open(settings: &MapSettings) -> Result<Self, MapError>
    where
        Self: Sized;

    fn add_marker(&mut self, latitude: f64, longitude: f64, popup: &str) -> Result<MarkerId, MapError>;

    fn remove_marker(&mut self, id: MarkerId);

    fn fit_bounds(&mut self, bounds: Bounds, padding: u32, max_zoom: u8);

    /// Release the surface; no other call follows
    fn destroy(&mut self);
}

/// A record that can be shown as a marker
pub trait Plottable: Clone {
    fn coordinates(&self) -> (f64, f64);

    fn popup(&self) -> String;
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum MapStatus {
    Ready,
    Error(String),
    Disposed,
}

struct PlacedMarker<T> {
    id: MarkerId,
    latitude: f64,
    longitude: f64,
    popup: String,
    record: T,
}

#[derive(Clone, Debug, Serialize)]
pub struct MarkerView {
    pub id: MarkerId,
    pub latitude: f64,
    pub longitude: f64,
    pub popup: String,
}

/// Serializable picture of the binder's current state
#[derive(Clone, Debug, Serialize)]
pub struct MapView {
    pub status: MapStatus,
    pub markers: Vec<MarkerView>,
    pub bounds: Option<Bounds>,
}

/// Keeps a backend's marker set equal to the last bound record list.
///
/// Markers are only created here and every one of them is removed again
/// before the next bind or on dispose.
pub struct MapBinder<B: MapBackend, T: Plottable> {
    backend: Option<B>,
    settings: MapSettings,
    status: MapStatus,
    placed: Vec<PlacedMarker<T>>,
    bounds: Option<Bounds>,
}

impl<B: MapBackend, T: Plottable> MapBinder<B, T> {
    pub fn open(settings: MapSettings) -> Self {
        Self::with_backend(B::open(&settings), settings)
    }

    pub fn with_backend(backend: Result<B, MapError>, settings: MapSettings) -> Self {
        let (backend, status) = match backend {
            Ok(backend) => {
                info!(zoom = settings.zoom, "Map ready");
                (Some(backend), MapStatus::Ready)
            }
            Err(e) => {
                warn!(error = %e, "Map initialization failed");
                (None, MapStatus::Error(e.to_string()))
            }
        };

        Self {
            backend,
            settings,
            status,
            placed: Vec::new(),
            bounds: None,
        }
    }

    pub fn status(&self) -> &MapStatus {
        &self.status
    }

    pub fn is_ready(&self) -> bool {
        self.status == MapStatus::Ready
    }

    pub fn marker_count(&self) -> usize {
        self.placed.len()
    }

    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    /// Replace every marker with one per record that has finite coordinates.
    ///
    /// Returns the number of markers placed. A no-op unless the map is ready.
    pub fn bind(&mut self, records: &[T]) -> usize {
        if self.status != MapStatus::Ready {
            return 0;
        }
        let Some(backend) = self.backend.as_mut() else {
            return 0;
        };

        for marker in self.placed.drain(..) {
            backend.remove_marker(marker.id);
        }
        self.bounds = None;

        for record in records {
            let (latitude, longitude) = record.coordinates();
            if !latitude.is_finite() || !longitude.is_finite() {
                continue;
            }

            let popup = record.popup();
            match backend.add_marker(latitude, longitude, &popup) {
                Ok(id) => self.placed.push(PlacedMarker {
                    id,
                    latitude,
                    longitude,
                    popup,
                    record: record.clone(),
                }),
                Err(e) => {
                    warn!(error = %e, "Marker update failed");
                    for marker in self.placed.drain(..) {
                        backend.remove_marker(marker.id);
                    }
                    self.status = MapStatus::Error(e.to_string());
                    return 0;
                }
            }
        }

        if let Some(bounds) = Bounds::around(self.placed.iter().map(|m| (m.latitude, m.longitude))) {
            backend.fit_bounds(bounds, self.settings.fit_padding, self.settings.max_zoom);
            self.bounds = Some(bounds);
        }

        debug!(markers = self.placed.len(), skipped = records.len() - self.placed.len(), "Markers bound");
        self.placed.len()
    }

    /// Record behind a clicked marker
    pub fn click(&self, id: MarkerId) -> Option<&T> {
        self.placed.iter().find(|m| m.id == id).map(|m| &m.record)
    }

    pub fn view(&self) -> MapView {
        MapView {
            status: self.status.clone(),
            markers: self
                .placed
                .iter()
                .map(|m| MarkerView {
                    id: m.id,
                    latitude: m.latitude,
                    longitude: m.longitude,
                    popup: m.popup.clone(),
                })
                .collect(),
            bounds: self.bounds,
        }
    }

    /// Remove every marker and destroy the backend. Safe to call more than once.
    pub fn dispose(&mut self) {
        if self.status == MapStatus::Disposed {
            return;
        }

        if let Some(mut backend) = self.backend.take() {
            for marker in self.placed.drain(..) {
                backend.remove_marker(marker.id);
            }
            backend.destroy();
        }

        self.placed.clear();
        self.bounds = None;
        self.status = MapStatus::Disposed;
        debug!("Map disposed");
    }
}

impl<B: MapBackend, T: Plottable> Drop for MapBinder<B, T> {
    fn drop(&mut self) {
        self.dispose();
    }
}
