use std::{collections::HashMap, sync::Arc};

use crate::{
    error::Error,
    graph::{EdgeId, NodeId},
    platform::PlatformDescriptor,
};

/// Uniquely identifies one materialized trip instance. Frequency expansion
/// (§4.2) can emit the same template trip many times; `offset` disambiguates
/// the instances so `board_edges_for_trip`/`alight_edges_for_trip` stay
/// per-instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TripInstanceKey {
    pub trip_id: Arc<str>,
    pub offset_secs: u32,
}

/// Trip metadata attached to BOARD/ALIGHT edges (§3).
#[derive(Debug, Clone)]
pub struct TripDescriptor {
    pub trip_id: Arc<str>,
    pub offset_secs: u32,
}

/// The side tables the compiler maintains alongside the graph itself (§3).
/// Owned explicitly by the compiler's storage, never as globals (§9).
#[derive(Debug, Default)]
pub struct SideTables {
    station_nodes: HashMap<(Arc<str>, Arc<str>), NodeId>,
    platform_descriptor_by_edge: HashMap<EdgeId, PlatformDescriptor>,
    stop_sequences: HashMap<EdgeId, u32>,
    trip_descriptors: HashMap<EdgeId, TripDescriptor>,
    board_edges_for_trip: HashMap<TripInstanceKey, Vec<Option<EdgeId>>>,
    alight_edges_for_trip: HashMap<TripInstanceKey, Vec<Option<EdgeId>>>,
    platform_zones: HashMap<PlatformDescriptor, Arc<str>>,
}

impl SideTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new `(feed_id, stop_id) -> street_node` mapping. Fatal on
    /// collision (§4.1, invariant 4).
    pub fn insert_station_node(
        &mut self,
        feed_id: Arc<str>,
        stop_id: Arc<str>,
        node: NodeId,
    ) -> Result<(), Error> {
        let key = (feed_id, stop_id);
        if self.station_nodes.contains_key(&key) {
            return Err(Error::DuplicateStopId);
        }
        self.station_nodes.insert(key, node);
        Ok(())
    }

    pub fn station_node(&self, feed_id: &str, stop_id: &str) -> Option<NodeId> {
        self.station_nodes
            .get(&(feed_id.into(), stop_id.into()))
            .copied()
    }

    pub fn set_platform_descriptor(&mut self, edge: EdgeId, descriptor: PlatformDescriptor) {
        self.platform_descriptor_by_edge.insert(edge, descriptor);
    }

    pub fn platform_descriptor(&self, edge: EdgeId) -> Option<&PlatformDescriptor> {
        self.platform_descriptor_by_edge.get(&edge)
    }

    pub fn set_stop_sequence(&mut self, edge: EdgeId, sequence: u32) {
        self.stop_sequences.insert(edge, sequence);
    }

    pub fn stop_sequence(&self, edge: EdgeId) -> Option<u32> {
        self.stop_sequences.get(&edge).copied()
    }

    pub fn set_trip_descriptor(&mut self, edge: EdgeId, descriptor: TripDescriptor) {
        self.trip_descriptors.insert(edge, descriptor);
    }

    pub fn trip_descriptor(&self, edge: EdgeId) -> Option<&TripDescriptor> {
        self.trip_descriptors.get(&edge)
    }

    pub fn set_board_edge(&mut self, key: TripInstanceKey, sequence: u32, edge: EdgeId) {
        let slots = self.board_edges_for_trip.entry(key).or_default();
        ensure_len(slots, sequence as usize + 1);
        slots[sequence as usize] = Some(edge);
    }

    pub fn board_edge(&self, key: &TripInstanceKey, sequence: u32) -> Option<EdgeId> {
        self.board_edges_for_trip
            .get(key)
            .and_then(|slots| slots.get(sequence as usize).copied().flatten())
    }

    pub fn set_alight_edge(&mut self, key: TripInstanceKey, sequence: u32, edge: EdgeId) {
        let slots = self.alight_edges_for_trip.entry(key).or_default();
        ensure_len(slots, sequence as usize + 1);
        slots[sequence as usize] = Some(edge);
    }

    pub fn alight_edge(&self, key: &TripInstanceKey, sequence: u32) -> Option<EdgeId> {
        self.alight_edges_for_trip
            .get(key)
            .and_then(|slots| slots.get(sequence as usize).copied().flatten())
    }

    /// Records the writable time zone that serves a platform, first writer
    /// wins. Populated during trip materialization (§4.2 step 4) and
    /// consumed by timeline wiring (§4.3.1, §4.3.2), since a platform spans
    /// every block that calls at it but is only ever tagged with one zone.
    pub fn set_platform_zone(&mut self, platform: PlatformDescriptor, zone_id: Arc<str>) {
        self.platform_zones.entry(platform).or_insert(zone_id);
    }

    pub fn platform_zone(&self, platform: &PlatformDescriptor) -> Option<&Arc<str>> {
        self.platform_zones.get(platform)
    }
}

fn ensure_len(slots: &mut Vec<Option<EdgeId>>, len: usize) {
    if slots.len() < len {
        slots.resize(len, None);
    }
}
