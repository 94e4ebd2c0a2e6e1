use std::sync::Arc;

use crate::{geo::Coordinate, time::Time};

/// Immutable input record. Only `location_type == 0` stops participate in
/// graph construction (§3).
#[derive(Debug, Clone)]
pub struct Stop {
    pub id: Arc<str>,
    pub coordinate: Coordinate,
    pub location_type: u8,
}

impl Stop {
    pub fn is_platform(&self) -> bool {
        self.location_type == 0
    }
}

#[derive(Debug, Clone)]
pub struct Route {
    pub id: Arc<str>,
    pub route_type: i32,
    pub agency_id: Arc<str>,
}

#[derive(Debug, Clone)]
pub struct Trip {
    pub id: Arc<str>,
    pub route_id: Arc<str>,
    pub block_id: Option<Arc<str>>,
    pub service_id: Arc<str>,
}

/// `(trip_id, stop_sequence) -> stop_id, arrival_time, departure_time`.
/// Both times are seconds from service-day noon minus 12h (§3).
#[derive(Debug, Clone)]
pub struct StopTime {
    pub trip_id: Arc<str>,
    pub stop_sequence: u32,
    pub stop_id: Arc<str>,
    pub arrival_time: Time,
    pub departure_time: Time,
}

/// A headway specification generating many trip instances from one
/// template trip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frequency {
    pub start_time: Time,
    pub end_time: Time,
    pub headway_secs: u32,
}

/// An explicit GTFS `transfers.txt` record.
#[derive(Debug, Clone)]
pub struct TransferRecord {
    pub from_stop_id: Arc<str>,
    pub from_route_id: Option<Arc<str>>,
    pub to_stop_id: Arc<str>,
    pub to_route_id: Option<Arc<str>>,
    pub min_transfer_time: crate::time::Duration,
}
