use std::sync::Arc;

use chrono::NaiveDate;
use tracing::trace;

use crate::{
    bitset::Validity,
    compiler::GraphCompiler,
    error::Error,
    feed::{days_between, Feed},
    graph::{EdgeAttributes, EdgeId, EdgeType, Graph, NodeId, ValidityRef},
    platform::PlatformDescriptor,
    time::Time,
};

impl<G: Graph> GraphCompiler<G> {
    /// Patches a single delayed departure into an already-built graph
    /// (§4.4). Unlike the rest of the pipeline this runs post-build, against
    /// one trip on one service day, and is not safe to call concurrently
    /// with [`GraphCompiler::reconstruct`] nor with another call to this
    /// method (§5).
    ///
    /// `zone_id` is the writable time zone the realtime feed reports
    /// `departure_time` in. `departure_node` is the per-stop-time node the
    /// realtime source wants reachable — callers get it the same way
    /// [`crate::trips::GraphCompiler::create_trips`] does, by allocating it
    /// themselves and passing it down.
    pub fn add_delayed_board_edge(
        &mut self,
        feed: &impl Feed,
        zone_id: Arc<str>,
        trip_id: &str,
        stop_sequence: u32,
        departure_time: Time,
        departure_node: NodeId,
        valid_on_day: NaiveDate,
    ) -> Result<EdgeId, Error> {
        let trip = feed
            .trip(trip_id)
            .ok_or_else(|| Error::UnknownTrip(trip_id.to_string()))?;
        let stop_time = feed
            .stop_times_for_trip(trip_id)
            .into_iter()
            .find(|st| st.stop_sequence == stop_sequence)
            .ok_or_else(|| Error::UnknownStopTime {
                trip_id: trip_id.to_string(),
                sequence: stop_sequence,
            })?;
        let stop = feed
            .stop(&stop_time.stop_id)
            .ok_or_else(|| Error::UnknownStopTime {
                trip_id: trip_id.to_string(),
                sequence: stop_sequence,
            })?;

        let platform = PlatformDescriptor::RoutePlatform {
            feed_id: self.feed_id.clone(),
            stop_id: stop.id.clone(),
            route_id: trip.route_id.clone(),
        };

        let key = departure_time.second_of_day();
        let timeline_node = match self
            .timelines
            .departure_timeline(&platform)
            .and_then(|t| t.get(key))
        {
            Some(node) => node,
            None => {
                trace!(trip_id, stop_sequence, "allocating realtime timeline node");
                let node = self.graph.add_node(stop.coordinate);
                self.timelines
                    .departure_timeline_mut(&platform)
                    .get_or_insert_with(key, || node)
            }
        };

        let validity = single_day_validity(feed, departure_time, valid_on_day);
        let pattern_id = self
            .operating_day_patterns
            .intern(&validity, zone_id, feed.start_date());

        let edge = self.graph.create_edge(timeline_node, departure_node);
        self.graph.set_edge_attributes(
            edge,
            EdgeAttributes::pt(EdgeType::Board, 0, ValidityRef::Pattern(pattern_id)).with_transfers(1),
        );
        // No `platform_descriptor_by_edge` entry: realtime-patched BOARD edges
        // are never resolved through that table by reconstruction (§9).

        Ok(edge)
    }
}

/// A validity bitset with exactly one day set, shifted the same way a
/// normally-materialized trip's validity would be when its departure spills
/// onto the next calendar day (§3, invariant 5).
fn single_day_validity(feed: &impl Feed, departure_time: Time, valid_on_day: NaiveDate) -> Validity {
    let days = days_between(feed.start_date(), feed.end_date());
    let mut bools = vec![false; days];
    let day_index = (valid_on_day - feed.start_date()).num_days();
    if day_index >= 0 && (day_index as usize) < days {
        bools[day_index as usize] = true;
    }
    let raw = Validity::from_bools(&bools);

    let day_offset = departure_time.day_offset() as usize;
    if day_offset > 0 {
        raw.shift_left_by(day_offset)
    } else {
        raw
    }
}
