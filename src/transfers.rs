use std::time::Instant;

use tracing::debug;

use crate::{
    compiler::GraphCompiler,
    error::Error,
    feed::{Feed, Transfers},
    graph::{EdgeAttributes, EdgeType, Graph},
    model::TransferRecord,
    platform::PlatformDescriptor,
};

impl<G: Graph> GraphCompiler<G> {
    /// Wires explicit `transfers.txt` records and, for every to-platform
    /// they don't mention by stop, implicit zero-cost within-stop
    /// transfers (§4.3.4). Must run after
    /// [`GraphCompiler::wire_up_stops`], since it reads the departure and
    /// arrival timelines that step builds.
    pub fn insert_gtfs_transfers(
        &mut self,
        feed: &impl Feed,
        transfers: &impl Transfers,
    ) -> Result<(), Error> {
        let now = Instant::now();
        debug!("Inserting GTFS transfers...");

        let to_platforms: Vec<PlatformDescriptor> =
            self.timelines.platforms_with_departures().cloned().collect();

        for to_platform in &to_platforms {
            let to_stop = to_platform.stop_id().clone();
            let to_route_id = to_platform.route_id().cloned();
            let records = transfers.get_transfers_to_stop(&to_stop, to_route_id.as_deref());

            let mentions_own_stop = records.iter().any(|t| t.from_stop_id == to_stop);
            for record in &records {
                self.wire_explicit_transfer(feed, to_platform, record);
            }

            if !mentions_own_stop {
                self.wire_implicit_same_stop_transfers(feed, to_platform);
            }
        }

        debug!("Inserting GTFS transfers took {:?}", now.elapsed());
        Ok(())
    }

    /// One explicit transfer record: finds the first arrival-side platform
    /// matching the record's `from` predicate (§9's documented "first match
    /// wins" semantics — multiple candidates are not merged), then for each
    /// of its arrival times wires a TRANSFER to the first to-platform
    /// departure at or after `arrival + min_transfer_time` (§4.3.4).
    fn wire_explicit_transfer(
        &mut self,
        feed: &impl Feed,
        to_platform: &PlatformDescriptor,
        record: &TransferRecord,
    ) {
        let from_platform = self
            .timelines
            .platforms_with_arrivals()
            .find(|p| matches_from_predicate(p, &record.from_stop_id, record.from_route_id.as_deref()))
            .cloned();

        let Some(from_platform) = from_platform else {
            return;
        };

        self.wire_platform_pair(
            feed,
            &from_platform,
            to_platform,
            record.min_transfer_time.as_seconds(),
        );
    }

    /// Zero-cost within-stop transfers for a to-platform that no explicit
    /// `Transfer` record names as its source (§4.3.4, last paragraph;
    /// grounded in scenario S5). Every other platform at the same stop
    /// whose arrival-side descriptor matches the to-platform's selection
    /// rule is wired, not just the first.
    fn wire_implicit_same_stop_transfers(&mut self, feed: &impl Feed, to_platform: &PlatformDescriptor) {
        let stop_id = to_platform.stop_id().clone();
        let to_route_id = to_platform.route_id().cloned();
        let siblings: Vec<PlatformDescriptor> = self
            .timelines
            .platforms_with_arrivals()
            .filter(|p| {
                *p != to_platform
                    && matches_from_predicate(p, &stop_id, to_route_id.as_deref())
            })
            .cloned()
            .collect();

        for from_platform in siblings {
            self.wire_platform_pair(feed, &from_platform, to_platform, 0);
        }
    }

    /// Walks every arrival time of `from_platform` and wires a TRANSFER to
    /// the first `to_platform` departure at or after `arrival +
    /// min_transfer_time`, if one exists (§4.3.4, §8 property 5).
    fn wire_platform_pair(
        &mut self,
        feed: &impl Feed,
        from_platform: &PlatformDescriptor,
        to_platform: &PlatformDescriptor,
        min_transfer_time: u32,
    ) {
        let arrivals: Vec<(u32, crate::graph::NodeId)> = self
            .timelines
            .arrival_timeline(from_platform)
            .map(|t| t.iter_ascending().collect())
            .unwrap_or_default();

        let route_type = to_platform.route_type(feed);

        for (arrival_key, arrival_node) in arrivals {
            let threshold = arrival_key + min_transfer_time;
            let Some((departure_key, departure_node)) = self
                .timelines
                .departure_timeline(to_platform)
                .and_then(|t| t.ceiling(threshold))
            else {
                continue;
            };

            let transfer_edge = self.graph.create_edge(arrival_node, departure_node);
            self.graph.set_edge_attributes(
                transfer_edge,
                EdgeAttributes::route_type_tagged(
                    EdgeType::Transfer,
                    departure_key - arrival_key,
                    route_type,
                ),
            );
            self.side_tables
                .set_platform_descriptor(transfer_edge, to_platform.clone());
        }
    }
}

/// The candidate matching rule shared by explicit and implicit transfer
/// wiring: a platform matches a `(stop, route_id_or_null)` pair when either
/// no route is named and the candidate is a `RouteTypePlatform`, or a route
/// is named and the candidate is the matching `RoutePlatform` (§4.3.4).
fn matches_from_predicate(candidate: &PlatformDescriptor, stop_id: &str, route_id: Option<&str>) -> bool {
    if candidate.stop_id().as_ref() != stop_id {
        return false;
    }
    match route_id {
        None => matches!(candidate, PlatformDescriptor::RouteTypePlatform { .. }),
        Some(route_id) => matches!(
            candidate,
            PlatformDescriptor::RoutePlatform { route_id: r, .. } if r.as_ref() == route_id
        ),
    }
}
