use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use chrono::NaiveDate;

use crate::model::{Frequency, Route, Stop, StopTime, TransferRecord, Trip};

/// Number of bits a validity bitset needs to cover the feed's calendar
/// window: one bit per day in `[start_date, end_date]`, inclusive.
pub fn days_between(start_date: NaiveDate, end_date: NaiveDate) -> usize {
    ((end_date - start_date).num_days() + 1).max(0) as usize
}

/// An in-memory GTFS feed providing already-validated records (§6). The
/// GTFS text parser itself is an external collaborator and stays out of
/// this crate — `VecFeed` is the in-memory shape callers hand the compiler
/// once their own loader has produced it.
pub trait Feed {
    fn stop(&self, stop_id: &str) -> Option<&Stop>;
    fn stops(&self) -> &[Stop];
    fn route(&self, route_id: &str) -> Option<&Route>;
    fn trip(&self, trip_id: &str) -> Option<&Trip>;
    fn trips(&self) -> &[Trip];
    fn agency_timezone(&self, agency_id: &str) -> Option<Arc<str>>;
    fn service_active_on(&self, service_id: &str, date: NaiveDate) -> bool;
    /// Stop-times of one trip, ordered by `stop_sequence` ascending.
    fn stop_times_for_trip(&self, trip_id: &str) -> Vec<&StopTime>;
    fn frequencies_for_trip(&self, trip_id: &str) -> &[Frequency];
    fn start_date(&self) -> NaiveDate;
    fn end_date(&self) -> NaiveDate;

    /// Stop-times with any missing arrival/departure interpolated.
    /// Interpolation itself lives in the parser (out of scope); a feed
    /// whose stop-times are already fully resolved can use this default.
    fn interpolated_stop_times_for_trip(&self, trip_id: &str) -> Vec<StopTime> {
        self.stop_times_for_trip(trip_id)
            .into_iter()
            .cloned()
            .collect()
    }
}

/// `Transfer` lookups keyed by stop and optionally by route (§6).
pub trait Transfers {
    fn has_no_route_specific_departure_transfer_rules(&self, stop_id: &str) -> bool;
    fn get_transfers_to_stop(&self, stop_id: &str, route_id: Option<&str>) -> Vec<&TransferRecord>;
    fn get_transfers_from_stop(
        &self,
        stop_id: &str,
        route_id: Option<&str>,
    ) -> Vec<&TransferRecord>;
}

/// Minimal in-memory [`Feed`] implementation, builder-style, usable
/// directly for small feeds or synthetic tests without a CSV loader.
#[derive(Debug, Default)]
pub struct VecFeed {
    stops: Vec<Stop>,
    stop_lookup: HashMap<Arc<str>, usize>,
    routes: Vec<Route>,
    route_lookup: HashMap<Arc<str>, usize>,
    trips: Vec<Trip>,
    trip_lookup: HashMap<Arc<str>, usize>,
    stop_times: HashMap<Arc<str>, Vec<StopTime>>,
    frequencies: HashMap<Arc<str>, Vec<Frequency>>,
    service_dates: HashMap<Arc<str>, HashSet<NaiveDate>>,
    agency_timezones: HashMap<Arc<str>, Arc<str>>,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl VecFeed {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            ..Default::default()
        }
    }

    pub fn with_stop(mut self, stop: Stop) -> Self {
        self.stop_lookup.insert(stop.id.clone(), self.stops.len());
        self.stops.push(stop);
        self
    }

    pub fn with_route(mut self, route: Route) -> Self {
        self.route_lookup
            .insert(route.id.clone(), self.routes.len());
        self.routes.push(route);
        self
    }

    pub fn with_trip(mut self, trip: Trip) -> Self {
        self.trip_lookup.insert(trip.id.clone(), self.trips.len());
        self.trips.push(trip);
        self
    }

    pub fn with_stop_time(mut self, stop_time: StopTime) -> Self {
        let entry = self.stop_times.entry(stop_time.trip_id.clone()).or_default();
        entry.push(stop_time);
        entry.sort_by_key(|st| st.stop_sequence);
        self
    }

    pub fn with_frequency(mut self, trip_id: Arc<str>, frequency: Frequency) -> Self {
        self.frequencies.entry(trip_id).or_default().push(frequency);
        self
    }

    pub fn with_service_dates(
        mut self,
        service_id: Arc<str>,
        dates: impl IntoIterator<Item = NaiveDate>,
    ) -> Self {
        self.service_dates
            .entry(service_id)
            .or_default()
            .extend(dates);
        self
    }

    pub fn with_agency_timezone(mut self, agency_id: Arc<str>, zone_id: Arc<str>) -> Self {
        self.agency_timezones.insert(agency_id, zone_id);
        self
    }
}

impl Feed for VecFeed {
    fn stop(&self, stop_id: &str) -> Option<&Stop> {
        self.stop_lookup.get(stop_id).map(|&i| &self.stops[i])
    }

    fn stops(&self) -> &[Stop] {
        &self.stops
    }

    fn route(&self, route_id: &str) -> Option<&Route> {
        self.route_lookup.get(route_id).map(|&i| &self.routes[i])
    }

    fn trip(&self, trip_id: &str) -> Option<&Trip> {
        self.trip_lookup.get(trip_id).map(|&i| &self.trips[i])
    }

    fn trips(&self) -> &[Trip] {
        &self.trips
    }

    fn agency_timezone(&self, agency_id: &str) -> Option<Arc<str>> {
        self.agency_timezones.get(agency_id).cloned()
    }

    fn service_active_on(&self, service_id: &str, date: NaiveDate) -> bool {
        self.service_dates
            .get(service_id)
            .is_some_and(|dates| dates.contains(&date))
    }

    fn stop_times_for_trip(&self, trip_id: &str) -> Vec<&StopTime> {
        self.stop_times
            .get(trip_id)
            .map(|v| v.iter().collect())
            .unwrap_or_default()
    }

    fn frequencies_for_trip(&self, trip_id: &str) -> &[Frequency] {
        self.frequencies.get(trip_id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    fn end_date(&self) -> NaiveDate {
        self.end_date
    }
}

/// Minimal in-memory [`Transfers`] implementation.
#[derive(Debug, Default)]
pub struct VecTransfers {
    records: Vec<TransferRecord>,
    route_specific_departure_stops: HashSet<Arc<str>>,
}

impl VecTransfers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transfer(mut self, record: TransferRecord) -> Self {
        if record.to_route_id.is_some() {
            self.route_specific_departure_stops
                .insert(record.to_stop_id.clone());
        }
        self.records.push(record);
        self
    }
}

impl Transfers for VecTransfers {
    fn has_no_route_specific_departure_transfer_rules(&self, stop_id: &str) -> bool {
        !self.route_specific_departure_stops.contains(stop_id)
    }

    fn get_transfers_to_stop(
        &self,
        stop_id: &str,
        route_id: Option<&str>,
    ) -> Vec<&TransferRecord> {
        self.records
            .iter()
            .filter(|t| {
                t.to_stop_id.as_ref() == stop_id
                    && t.to_route_id.as_deref() == route_id
            })
            .collect()
    }

    fn get_transfers_from_stop(
        &self,
        stop_id: &str,
        route_id: Option<&str>,
    ) -> Vec<&TransferRecord> {
        self.records
            .iter()
            .filter(|t| {
                t.from_stop_id.as_ref() == stop_id
                    && t.from_route_id.as_deref() == route_id
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn days_between_is_inclusive() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        assert_eq!(days_between(start, end), 3);
    }
}
