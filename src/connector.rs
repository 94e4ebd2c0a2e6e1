use std::time::Instant;

use tracing::{debug, trace};

use crate::{
    compiler::GraphCompiler,
    error::Error,
    feed::Feed,
    graph::{EdgeAttributes, Graph, LocationIndex, NodeFilter},
};

impl<G: Graph> GraphCompiler<G> {
    /// Attaches every `location_type == 0` stop to the pedestrian walk
    /// network (§4.1). Queries the location index for the nearest
    /// foot-accessible node; when none is in range, allocates a fresh
    /// standalone node at the stop's coordinates with a zero-length
    /// foot-access self-loop so the disconnected stop can still be a
    /// search endpoint.
    pub fn connect_stops_to_street_network(
        &mut self,
        feed: &impl Feed,
        location_index: &impl LocationIndex,
    ) -> Result<(), Error> {
        let now = Instant::now();
        debug!("Connecting stops to street network...");

        for stop in feed.stops() {
            if !stop.is_platform() {
                continue;
            }

            let snap = location_index.find_closest(stop.coordinate, NodeFilter::FootAccessible);
            let node = if let Some(node) = snap.closest_node() {
                node
            } else {
                trace!(stop_id = %stop.id, "no nearby walk node, allocating standalone node");
                let node = self.graph.add_node(stop.coordinate);
                let edge = self.graph.create_edge(node, node);
                self.graph
                    .set_edge_attributes(edge, EdgeAttributes::foot_self_loop());
                node
            };

            self.side_tables
                .insert_station_node(self.feed_id.clone(), stop.id.clone(), node)?;
        }

        debug!("Connecting stops to street network took {:?}", now.elapsed());
        Ok(())
    }
}
