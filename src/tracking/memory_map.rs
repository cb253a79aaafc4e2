use crate::core::error::MapError;
use crate::tracking::map_binder::{Bounds, MapBackend, MapSettings, MarkerId};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MemoryMarker {
    pub latitude: f64,
    pub longitude: f64,
    pub popup: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Viewport {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: u8,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitRecord {
    pub bounds: Bounds,
    pub padding: u32,
    pub max_zoom: u8,
}

/// Headless map surface that keeps its markers and viewport in memory
#[derive(Debug)]
pub struct MemoryMap {
    markers: BTreeMap<MarkerId, MemoryMarker>,
    next_id: u64,
    viewport: Viewport,
    last_fit: Option<FitRecord>,
    destroyed: bool,
}

impl MemoryMap {
    pub fn markers(&self) -> impl Iterator<Item = &MemoryMarker> {
        self.markers.values()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn last_fit(&self) -> Option<FitRecord> {
        self.last_fit
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

/// Largest zoom at which `span` degrees still fits a 256px tile
fn zoom_for_span(span: f64, max_zoom: u8) -> u8 {
    if span <= 0.0 {
        return max_zoom;
    }

    let zoom = (360.0 / span).log2().floor();
    zoom.clamp(0.0, max_zoom as f64) as u8
}

impl MapBackend for MemoryMap {
    fn open(settings: &MapSettings) -> Result<Self, MapError> {
        let (latitude, longitude) = settings.center;

        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(MapError::Init(format!("invalid center {}, {}", latitude, longitude)));
        }

        Ok(Self {
            markers: BTreeMap::new(),
            next_id: 0,
            viewport: Viewport {
                latitude,
                longitude,
                zoom: settings.zoom,
            },
            last_fit: None,
            destroyed: false,
        })
    }

    fn add_marker(&mut self, latitude: f64, longitude: f64, popup: &str) -> Result<MarkerId, MapError> {
        if self.destroyed {
            return Err(MapError::Marker("map destroyed".to_string()));
        }

        self.next_id += 1;
        let id = MarkerId(self.next_id);
        self.markers.insert(
            id,
            MemoryMarker {
                latitude,
                longitude,
                popup: popup.to_string(),
            },
        );

        Ok(id)
    }

    fn remove_marker(&mut self, id: MarkerId) {
        self.markers.remove(&id);
    }

    fn fit_bounds(&mut self, bounds: Bounds, padding: u32, max_zoom: u8) {
        let span = (bounds.north - bounds.south).max(bounds.east - bounds.west);
        let (latitude, longitude) = bounds.center();

        // Padding eats into the usable area, one zoom level is close enough
        let zoom = zoom_for_span(span, max_zoom);
        let zoom = if padding > 0 && span > 0.0 { zoom.saturating_sub(1) } else { zoom };

        self.viewport = Viewport {
            latitude,
            longitude,
            zoom,
        };
        self.last_fit = Some(FitRecord {
            bounds,
            padding,
            max_zoom,
        });
    }

    fn destroy(&mut self) {
        self.markers.clear();
        self.destroyed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_uses_configured_center() {
        let map = MemoryMap::open(&MapSettings::default()).unwrap();
        assert_eq!(
            map.viewport(),
            Viewport {
                latitude: 30.3753,
                longitude: 69.3451,
                zoom: 10
            }
        );
    }

    #[test]
    fn test_open_rejects_bad_center() {
        let settings = MapSettings {
            center: (120.0, 0.0),
            ..MapSettings::default()
        };
        assert!(matches!(MemoryMap::open(&settings), Err(MapError::Init(_))));
    }

    #[test]
    fn test_single_point_fit_caps_at_max_zoom() {
        let mut map = MemoryMap::open(&MapSettings::default()).unwrap();
        let bounds = Bounds::around([(24.86, 67.0)]).unwrap();

        map.fit_bounds(bounds, 20, 15);

        assert_eq!(map.viewport().zoom, 15);
        assert_eq!((map.viewport().latitude, map.viewport().longitude), (24.86, 67.0));
    }

    #[test]
    fn test_destroyed_map_refuses_markers() {
        let mut map = MemoryMap::open(&MapSettings::default()).unwrap();
        map.add_marker(1.0, 1.0, "a").unwrap();

        map.destroy();

        assert!(map.is_destroyed());
        assert_eq!(map.marker_count(), 0);
        assert!(map.add_marker(1.0, 1.0, "b").is_err());
    }
}
