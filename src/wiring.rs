use std::time::Instant;

use tracing::debug;

use crate::{
    compiler::GraphCompiler,
    error::Error,
    feed::Feed,
    graph::{EdgeAttributes, EdgeType, Graph, ValidityRef},
    interning::FeedIdWithTimezone,
    platform::PlatformDescriptor,
};

impl<G: Graph> GraphCompiler<G> {
    /// Wires every platform's departure and arrival timelines to the
    /// stop's street node (§4.3.1, §4.3.2). Must run after
    /// [`GraphCompiler::create_trips`], since it walks the timelines that
    /// step populates.
    pub fn wire_up_stops(&mut self, feed: &impl Feed) -> Result<(), Error> {
        let now = Instant::now();
        debug!("Wiring platforms to the street network...");

        let departure_platforms: Vec<PlatformDescriptor> =
            self.timelines.platforms_with_departures().cloned().collect();
        for platform in departure_platforms {
            self.wire_departure_timeline(feed, &platform)?;
        }

        let arrival_platforms: Vec<PlatformDescriptor> =
            self.timelines.platforms_with_arrivals().cloned().collect();
        for platform in arrival_platforms {
            self.wire_arrival_timeline(feed, &platform)?;
        }

        debug!("Wiring platforms to the street network took {:?}", now.elapsed());
        Ok(())
    }

    /// Chains a platform's departure timeline in descending time order with
    /// WAIT edges, then connects the whole chain to the platform's street
    /// node with ENTER_PT and ENTER_TIME_EXPANDED_NETWORK, closing the loop
    /// with an OVERNIGHT edge from the earliest departure to the latest
    /// (§4.3.1).
    fn wire_departure_timeline(
        &mut self,
        feed: &impl Feed,
        platform: &PlatformDescriptor,
    ) -> Result<(), Error> {
        let street_node = self
            .side_tables
            .station_node(&self.feed_id, platform.stop_id())
            .ok_or_else(|| Error::UnknownStopTime {
                trip_id: platform.stop_id().to_string(),
                sequence: 0,
            })?;

        let zone_id = self
            .side_tables
            .platform_zone(platform)
            .cloned()
            .unwrap_or_else(|| "UTC".into());
        let time_zone_id = self.writable_time_zones.intern(FeedIdWithTimezone {
            feed_id: self.feed_id.clone(),
            zone_id,
        });
        let route_type = platform.route_type(feed);

        let nodes: Vec<(u32, crate::graph::NodeId)> = self
            .timelines
            .departure_timeline(platform)
            .map(|timeline| timeline.iter_descending().collect())
            .unwrap_or_default();
        if nodes.is_empty() {
            return Ok(());
        }

        let coordinate = feed
            .stop(platform.stop_id())
            .map(|s| s.coordinate)
            .unwrap_or_default();
        let enter_network = self.graph.add_node(coordinate);
        let enter_pt = self.graph.create_edge(street_node, enter_network);
        self.graph.set_edge_attributes(
            enter_pt,
            EdgeAttributes::route_type_tagged(EdgeType::EnterPt, 0, route_type),
        );
        self.side_tables
            .set_platform_descriptor(enter_pt, platform.clone());

        for &(t, n) in &nodes {
            let enter_time_expanded = self.graph.create_edge(enter_network, n);
            self.graph.set_edge_attributes(
                enter_time_expanded,
                EdgeAttributes::pt(
                    EdgeType::EnterTimeExpandedNetwork,
                    t,
                    ValidityRef::TimeZone(time_zone_id),
                ),
            );
        }

        // `nodes` is sorted descending; each step pairs the node just
        // visited (larger key) with the next one (smaller key). The WAIT
        // edge runs forward in time, from the smaller key to the larger one
        // already seen (§4.3.1).
        for pair in nodes.windows(2) {
            let (later_key, later_node) = pair[0];
            let (earlier_key, earlier_node) = pair[1];
            let wait_edge = self.graph.create_edge(earlier_node, later_node);
            self.graph.set_edge_attributes(
                wait_edge,
                EdgeAttributes::untyped(EdgeType::Wait, later_key - earlier_key),
            );
        }

        let (earliest_key, earliest_node) = *nodes.last().unwrap();
        let (latest_key, latest_node) = nodes[0];
        let overnight_time = crate::time::SECONDS_PER_DAY - latest_key + earliest_key;
        let overnight_edge = self.graph.create_edge(latest_node, earliest_node);
        self.graph
            .set_edge_attributes(overnight_edge, EdgeAttributes::untyped(EdgeType::Overnight, overnight_time));

        Ok(())
    }

    /// Chains a platform's arrival timeline in descending time order with
    /// WAIT_ARRIVAL edges, exits it to the street via
    /// LEAVE_TIME_EXPANDED_NETWORK and EXIT_PT, and closes the loop with an
    /// OVERNIGHT edge (§4.3.2).
    fn wire_arrival_timeline(
        &mut self,
        feed: &impl Feed,
        platform: &PlatformDescriptor,
    ) -> Result<(), Error> {
        let street_node = self
            .side_tables
            .station_node(&self.feed_id, platform.stop_id())
            .ok_or_else(|| Error::UnknownStopTime {
                trip_id: platform.stop_id().to_string(),
                sequence: 0,
            })?;
        let route_type = platform.route_type(feed);

        let nodes: Vec<(u32, crate::graph::NodeId)> = self
            .timelines
            .arrival_timeline(platform)
            .map(|timeline| timeline.iter_descending().collect())
            .unwrap_or_default();
        if nodes.is_empty() {
            return Ok(());
        }

        let coordinate = feed
            .stop(platform.stop_id())
            .map(|s| s.coordinate)
            .unwrap_or_default();
        let leave_network = self.graph.add_node(coordinate);
        let exit_pt = self.graph.create_edge(leave_network, street_node);
        self.graph.set_edge_attributes(
            exit_pt,
            EdgeAttributes::route_type_tagged(EdgeType::ExitPt, 0, route_type),
        );
        self.side_tables
            .set_platform_descriptor(exit_pt, platform.clone());

        for &(key, n) in &nodes {
            let leave_time_expanded = self.graph.create_edge(n, leave_network);
            self.graph.set_edge_attributes(
                leave_time_expanded,
                EdgeAttributes::untyped(EdgeType::LeaveTimeExpandedNetwork, key),
            );
        }

        for pair in nodes.windows(2) {
            let (later_key, later_node) = pair[0];
            let (earlier_key, earlier_node) = pair[1];
            let wait_edge = self.graph.create_edge(earlier_node, later_node);
            self.graph.set_edge_attributes(
                wait_edge,
                EdgeAttributes::untyped(EdgeType::WaitArrival, later_key - earlier_key),
            );
        }

        let (earliest_key, earliest_node) = *nodes.last().unwrap();
        let (latest_key, latest_node) = nodes[0];
        let overnight_time = crate::time::SECONDS_PER_DAY - latest_key + earliest_key;
        let overnight_edge = self.graph.create_edge(latest_node, earliest_node);
        self.graph
            .set_edge_attributes(overnight_edge, EdgeAttributes::untyped(EdgeType::Overnight, overnight_time));

        Ok(())
    }
}
