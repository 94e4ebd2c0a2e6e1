use std::{collections::HashMap, sync::Arc, time::Instant};

use chrono::Duration as ChronoDuration;
use tracing::{debug, trace};

use crate::{
    bitset::Validity,
    compiler::GraphCompiler,
    error::Error,
    feed::Feed,
    graph::{EdgeAttributes, EdgeType, Graph, ValidityRef},
    interning::InternId,
    model::{Frequency, Trip},
    platform::PlatformDescriptor,
    sidetables::TripInstanceKey,
    time::Time,
};

/// One block member's last-stop arrival, kept around so the next trip in
/// the block can wire a continuation transfer against it (§4.3.3).
struct BlockArrival {
    arrival_node: u64,
    arrival_time: Time,
    validity: Validity,
}

impl<G: Graph> GraphCompiler<G> {
    /// Materializes every trip in the feed as a chain of HOP/BOARD/ALIGHT/
    /// DWELL edges, grouping trips into blocks, expanding frequency-based
    /// blocks into one instance per headway offset, and wiring in-vehicle
    /// continuation transfers between consecutive block members (§4.2).
    pub fn create_trips(
        &mut self,
        feed: &impl Feed,
        transfers: &impl crate::feed::Transfers,
    ) -> Result<(), Error> {
        let now = Instant::now();
        debug!("Materializing trips...");

        let blocks = group_trips_into_blocks(feed.trips());
        for members in blocks.values() {
            self.materialize_block(feed, transfers, members)?;
        }

        debug!("Materializing trips took {:?}", now.elapsed());
        Ok(())
    }

    fn materialize_block(
        &mut self,
        feed: &impl Feed,
        transfers: &impl crate::feed::Transfers,
        members: &[&Trip],
    ) -> Result<(), Error> {
        let mut members: Vec<&Trip> = members.to_vec();
        members.sort_by_key(|trip| first_departure(feed, &trip.id));

        let block_frequencies = block_frequency_set(feed, &members)?;
        let zone_id = block_zone_id(feed, members[0]);

        if block_frequencies.is_empty() {
            trace!(block_size = members.len(), "emitting unfrequented block");
            self.add_trips(feed, transfers, &members, 0, &zone_id)?;
        } else {
            for frequency in &block_frequencies {
                let mut offset = frequency.start_time.as_seconds();
                let end = frequency.end_time.as_seconds();
                while offset < end {
                    self.add_trips(feed, transfers, &members, offset, &zone_id)?;
                    offset += frequency.headway_secs;
                }
            }
        }
        Ok(())
    }

    fn add_trips(
        &mut self,
        feed: &impl Feed,
        transfers: &impl crate::feed::Transfers,
        members: &[&Trip],
        offset_secs: u32,
        zone_id: &Arc<str>,
    ) -> Result<(), Error> {
        let mut block_arrivals: Vec<BlockArrival> = Vec::new();
        for trip in members {
            self.add_trip(feed, transfers, trip, offset_secs, zone_id, &mut block_arrivals)?;
        }
        Ok(())
    }

    fn add_trip(
        &mut self,
        feed: &impl Feed,
        transfers: &impl crate::feed::Transfers,
        trip: &Trip,
        offset_secs: u32,
        zone_id: &Arc<str>,
        block_arrivals: &mut Vec<BlockArrival>,
    ) -> Result<(), Error> {
        let stop_times = feed.interpolated_stop_times_for_trip(&trip.id);
        if stop_times.is_empty() {
            return Err(Error::UnknownTrip(trip.id.to_string()));
        }

        let route = feed.route(&trip.route_id);
        let route_type = route.map(|r| r.route_type).unwrap_or_default();
        let validity = compute_trip_validity(feed, trip, &stop_times[0], offset_secs);

        let key = TripInstanceKey {
            trip_id: trip.id.clone(),
            offset_secs,
        };

        let mut prev: Option<(u64, Time)> = None;

        for (i, stop_time) in stop_times.iter().enumerate() {
            let stop = feed
                .stop(&stop_time.stop_id)
                .ok_or_else(|| Error::UnknownTrip(stop_time.stop_id.to_string()))?;
            let has_route_specific = !transfers.has_no_route_specific_departure_transfer_rules(&stop.id);
            let platform = PlatformDescriptor::select(
                self.feed_id.clone(),
                stop.id.clone(),
                trip.route_id.clone(),
                route_type,
                has_route_specific,
            );
            self.side_tables
                .set_platform_zone(platform.clone(), zone_id.clone());

            let effective_arrival = shifted(stop_time.arrival_time, offset_secs);
            let effective_departure = shifted(stop_time.departure_time, offset_secs);

            let arrival_node = self.graph.add_node(stop.coordinate);
            let departure_node = self.graph.add_node(stop.coordinate);

            if let Some((prev_departure_node, prev_departure_time)) = prev {
                let prev_stop_id = &stop_times[i - 1].stop_id;
                let prev_coord = feed
                    .stop(prev_stop_id)
                    .map(|s| s.coordinate)
                    .unwrap_or(stop.coordinate);
                let hop_time = (effective_arrival - prev_departure_time).as_seconds();
                let distance = stop.coordinate.haversine_distance(&prev_coord).as_meters();
                let hop_edge = self.graph.create_edge(prev_departure_node, arrival_node);
                self.graph.set_edge_attributes(
                    hop_edge,
                    EdgeAttributes::untyped(EdgeType::Hop, hop_time).with_distance(distance),
                );
                self.side_tables
                    .set_stop_sequence(hop_edge, stop_times[i - 1].stop_sequence);
            }

            let pattern_id = self.operating_day_patterns.intern(
                &validity,
                zone_id.clone(),
                feed.start_date(),
            );

            let arrival_timeline_node = match self
                .timelines
                .arrival_timeline(&platform)
                .and_then(|t| t.get(effective_arrival.second_of_day()))
            {
                Some(node) => node,
                None => {
                    let node = self.graph.add_node(stop.coordinate);
                    self.timelines
                        .arrival_timeline_mut(&platform)
                        .get_or_insert_with(effective_arrival.second_of_day(), || node)
                }
            };
            let alight_edge = self.graph.create_edge(arrival_node, arrival_timeline_node);
            self.graph.set_edge_attributes(
                alight_edge,
                EdgeAttributes::pt(EdgeType::Alight, 0, ValidityRef::Pattern(pattern_id)),
            );
            self.side_tables
                .set_platform_descriptor(alight_edge, platform.clone());
            self.side_tables
                .set_stop_sequence(alight_edge, stop_time.stop_sequence);
            self.side_tables.set_trip_descriptor(
                alight_edge,
                crate::sidetables::TripDescriptor {
                    trip_id: trip.id.clone(),
                    offset_secs,
                },
            );
            self.side_tables
                .set_alight_edge(key.clone(), stop_time.stop_sequence, alight_edge);

            let departure_timeline_node = match self
                .timelines
                .departure_timeline(&platform)
                .and_then(|t| t.get(effective_departure.second_of_day()))
            {
                Some(node) => node,
                None => {
                    let node = self.graph.add_node(stop.coordinate);
                    self.timelines
                        .departure_timeline_mut(&platform)
                        .get_or_insert_with(effective_departure.second_of_day(), || node)
                }
            };
            let board_edge = self.graph.create_edge(departure_timeline_node, departure_node);
            self.graph.set_edge_attributes(
                board_edge,
                EdgeAttributes::pt(EdgeType::Board, 0, ValidityRef::Pattern(pattern_id))
                    .with_transfers(1),
            );
            self.side_tables
                .set_platform_descriptor(board_edge, platform.clone());
            self.side_tables
                .set_stop_sequence(board_edge, stop_time.stop_sequence);
            self.side_tables.set_trip_descriptor(
                board_edge,
                crate::sidetables::TripDescriptor {
                    trip_id: trip.id.clone(),
                    offset_secs,
                },
            );
            self.side_tables
                .set_board_edge(key.clone(), stop_time.stop_sequence, board_edge);

            let dwell_time = (effective_departure - effective_arrival).as_seconds();
            let dwell_edge = self.graph.create_edge(arrival_node, departure_node);
            self.graph
                .set_edge_attributes(dwell_edge, EdgeAttributes::untyped(EdgeType::Dwell, dwell_time));

            if i == 0 {
                self.wire_block_continuation(
                    feed,
                    block_arrivals,
                    &platform,
                    departure_node,
                    effective_departure,
                    &validity,
                    route_type,
                    stop.coordinate,
                    zone_id,
                );
            }

            if i == stop_times.len() - 1 {
                block_arrivals.push(BlockArrival {
                    arrival_node,
                    arrival_time: effective_arrival,
                    validity: validity.clone(),
                });
            }

            prev = Some((departure_node, effective_departure));
        }

        Ok(())
    }

    /// In-vehicle continuation transfers (§4.3.3): at the first stop of a
    /// trip, scan backwards through the block's already-emitted arrivals
    /// and wire a TRANSFER+BOARD pair for every day this trip's validity
    /// overlaps with an earlier trip's, narrowing an accumulator bitset as
    /// matches are found so no day is wired twice.
    fn wire_block_continuation(
        &mut self,
        feed: &impl Feed,
        block_arrivals: &[BlockArrival],
        this_platform: &PlatformDescriptor,
        this_departure_node: u64,
        this_departure_time: Time,
        this_validity: &Validity,
        route_type: i32,
        this_coordinate: crate::geo::Coordinate,
        zone_id: &Arc<str>,
    ) {
        let mut accumulator = this_validity.clone();
        for earlier in block_arrivals.iter().rev() {
            if accumulator.is_empty() {
                break;
            }
            if earlier.arrival_time > this_departure_time {
                continue;
            }
            if !earlier.validity.intersects(&accumulator) {
                continue;
            }

            let intersection = earlier.validity.and(&accumulator);
            let intersection_id: InternId = self.operating_day_patterns.intern(
                &intersection,
                zone_id.clone(),
                feed.start_date(),
            );
            let dwell = (this_departure_time - earlier.arrival_time).as_seconds();

            let intermediate = self.graph.add_node(this_coordinate);
            let transfer_edge = self.graph.create_edge(earlier.arrival_node, intermediate);
            self.graph.set_edge_attributes(
                transfer_edge,
                EdgeAttributes::route_type_tagged(EdgeType::Transfer, dwell, route_type),
            );
            self.side_tables
                .set_platform_descriptor(transfer_edge, this_platform.clone());

            let board_edge = self.graph.create_edge(intermediate, this_departure_node);
            self.graph.set_edge_attributes(
                board_edge,
                EdgeAttributes::pt(EdgeType::Board, 0, ValidityRef::Pattern(intersection_id))
                    .with_transfers(1),
            );
            self.side_tables
                .set_platform_descriptor(board_edge, this_platform.clone());

            accumulator.and_not_in_place(&earlier.validity);
        }
    }
}

/// Evaluates a trip's calendar over `[start_date, end_date]`, applying the
/// day-shift convention (§3, invariant 5) when the (frequency-shifted)
/// first departure lands on the next calendar day.
fn compute_trip_validity(
    feed: &impl Feed,
    trip: &Trip,
    first_stop_time: &crate::model::StopTime,
    offset_secs: u32,
) -> Validity {
    let days = crate::feed::days_between(feed.start_date(), feed.end_date());
    let bools: Vec<bool> = (0..days)
        .map(|k| {
            let date = feed.start_date() + ChronoDuration::days(k as i64);
            feed.service_active_on(&trip.service_id, date)
        })
        .collect();
    let raw = Validity::from_bools(&bools);

    let effective_departure = shifted(first_stop_time.departure_time, offset_secs);
    let day_offset = effective_departure.day_offset() as usize;
    if day_offset > 0 {
        raw.shift_left_by(day_offset)
    } else {
        raw
    }
}

fn shifted(time: Time, offset_secs: u32) -> Time {
    Time::from_seconds(time.as_seconds() + offset_secs)
}

fn first_departure(feed: &impl Feed, trip_id: &str) -> Time {
    feed.stop_times_for_trip(trip_id)
        .first()
        .map(|st| st.departure_time)
        .unwrap_or_default()
}

fn group_trips_into_blocks<'a>(trips: &'a [Trip]) -> HashMap<Arc<str>, Vec<&'a Trip>> {
    let mut blocks: HashMap<Arc<str>, Vec<&Trip>> = HashMap::new();
    for trip in trips {
        let block_key = trip.block_id.clone().unwrap_or_else(|| trip.id.clone());
        blocks.entry(block_key).or_default().push(trip);
    }
    blocks
}

/// Validates that every block member agrees on the same set of frequency
/// windows, returning that shared set (empty if the block isn't frequency-
/// based at all). Fails with [`Error::FrequencyBlockConflict`] when members
/// disagree, since a block is one physical vehicle and can't run two
/// headway schedules at once (§4.2).
fn block_frequency_set(feed: &impl Feed, members: &[&Trip]) -> Result<Vec<Frequency>, Error> {
    let mut shared: Option<Vec<Frequency>> = None;
    for trip in members {
        let frequencies = feed.frequencies_for_trip(&trip.id);
        if frequencies.is_empty() {
            continue;
        }
        match &shared {
            None => shared = Some(frequencies.to_vec()),
            Some(existing) if existing.as_slice() == frequencies => {}
            Some(_) => return Err(Error::FrequencyBlockConflict),
        }
    }
    Ok(shared.unwrap_or_default())
}

fn block_zone_id(feed: &impl Feed, first_trip: &Trip) -> Arc<str> {
    feed.route(&first_trip.route_id)
        .and_then(|route| feed.agency_timezone(&route.agency_id))
        .unwrap_or_else(|| Arc::from("UTC"))
}
