//! Merge of static vehicle metadata with the latest GPS fix per vehicle.

use crate::core::config::TrackingConfig;
use crate::models::gps::GpsLocation;
use crate::models::route::Route;
use crate::models::vehicle::Vehicle;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PositionSource {
    /// Taken from a GPS record
    Live { recorded_at: Option<DateTime<Utc>> },
    /// Synthesized placeholder; the vehicle has no usable fix
    Fallback,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub source: PositionSource,
}

impl Position {
    pub fn is_live(&self) -> bool {
        matches!(self.source, PositionSource::Live { .. })
    }
}

/// A vehicle with exactly one position, ready for display
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrackedVehicle {
    #[serde(flatten)]
    pub vehicle: Vehicle,
    pub route_name: Option<String>,
    pub position: Position,
}

/// Area placeholder positions are drawn from
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FallbackArea {
    pub base_latitude: f64,
    pub base_longitude: f64,
    /// Offsets fall in `[0, spread)` on each axis
    pub spread: f64,
}

impl FallbackArea {
    pub fn from_config(config: &TrackingConfig) -> Self {
        Self {
            base_latitude: config.fallback_latitude,
            base_longitude: config.fallback_longitude,
            spread: config.fallback_spread,
        }
    }

    /// Placeholder for `vehicle_id`, stable across calls
    pub fn position_for(&self, vehicle_id: i64) -> Position {
        let mut rng = StdRng::seed_from_u64(vehicle_id as u64);
        let lat_offset = rng.random::<f64>() * self.spread;
        let lon_offset = rng.random::<f64>() * self.spread;

        Position {
            latitude: self.base_latitude + lat_offset,
            longitude: self.base_longitude + lon_offset,
            source: PositionSource::Fallback,
        }
    }
}

impl Default for FallbackArea {
    fn default() -> Self {
        Self {
            base_latitude: 24.8607,
            base_longitude: 67.0011,
            spread: 2.0,
        }
    }
}

/// Pick the fix to show for each vehicle.
///
/// Only records whose coordinates both parse are considered. The greatest
/// timestamp wins, unparseable timestamps rank lowest, and ties keep the
/// record that appears first.
pub fn latest_fixes(gps: &[GpsLocation]) -> HashMap<i64, (&GpsLocation, Option<DateTime<Utc>>)> {
    let mut best: HashMap<i64, (&GpsLocation, Option<DateTime<Utc>>)> = HashMap::new();

    for record in gps {
        if record.coordinates().is_none() {
            continue;
        }

        let recorded_at = record.recorded_at();
        let newer = best
            .get(&record.vehicle_id)
            .is_none_or(|(_, current)| recorded_at > *current);

        if newer {
            best.insert(record.vehicle_id, (record, recorded_at));
        }
    }

    best
}

/// One output per vehicle, in vehicle order
pub fn reconcile(
    vehicles: &[Vehicle],
    gps: &[GpsLocation],
    routes: &[Route],
    fallback: &FallbackArea,
) -> Vec<TrackedVehicle> {
    let fixes = latest_fixes(gps);
    let route_names: HashMap<i64, &str> = routes
        .iter()
        .map(|r| (r.route_id, r.route_name.as_str()))
        .collect();

    vehicles
        .iter()
        .map(|vehicle| {
            let live = fixes.get(&vehicle.vehicle_id).and_then(|(record, recorded_at)| {
                record.coordinates().map(|(latitude, longitude)| Position {
                    latitude,
                    longitude,
                    source: PositionSource::Live {
                        recorded_at: *recorded_at,
                    },
                })
            });

            let position = live.unwrap_or_else(|| fallback.position_for(vehicle.vehicle_id));
            let route_name = vehicle
                .route_id
                .and_then(|id| route_names.get(&id))
                .map(|name| name.to_string());

            TrackedVehicle {
                vehicle: vehicle.clone(),
                route_name,
                position,
            }
        })
        .collect()
}
