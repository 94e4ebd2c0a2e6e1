use std::collections::HashMap;

use crate::{geo::Coordinate, interning::InternId};

pub type NodeId = u64;
pub type EdgeId = u64;

/// Closed enumeration of every edge kind the compiler can emit. Match on
/// this, never on a runtime type test (§9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeType {
    EnterPt,
    ExitPt,
    EnterTimeExpandedNetwork,
    LeaveTimeExpandedNetwork,
    Wait,
    WaitArrival,
    Overnight,
    Board,
    Alight,
    Dwell,
    Hop,
    Transfer,
}

/// Which interning dictionary an edge's `validity_id` points into. Which
/// variant applies is determined entirely by the edge's [`EdgeType`] (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidityRef {
    /// Points into [`crate::interning::OperatingDayPatterns`]. Used by
    /// BOARD, ALIGHT, and TRANSFER (block-continuation board half) edges.
    Pattern(InternId),
    /// Points into [`crate::interning::WritableTimeZones`]. Used by
    /// ENTER/LEAVE_TIME_EXPANDED_NETWORK edges.
    TimeZone(InternId),
    /// The GTFS `route_type` of a platform, stored directly rather than
    /// interned. ENTER_PT, EXIT_PT, and TRANSFER edges are valid every
    /// day — there is no per-day bitset to intern — but still need a mode
    /// discriminator for downstream filtering, so they reuse the
    /// `validity` attribute slot for it (§4.3.1, §4.3.3, §4.3.4).
    RouteType(i32),
}

/// Which traversal modes an edge is open to. PT edges are always
/// forward-only; the walk network's self-loop fallback (§4.1) is the one
/// case the compiler creates a foot edge directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Foot,
    PublicTransport,
}

/// Full attribute set stored on a graph edge (§3).
#[derive(Debug, Clone, Copy)]
pub struct EdgeAttributes {
    pub access: Access,
    pub edge_type: Option<EdgeType>,
    /// Edge weight in seconds. Meaning varies by edge type.
    pub time: u32,
    pub validity: Option<ValidityRef>,
    /// 0 or 1; set to 1 on BOARD edges (and on BOARD edges synthesized by
    /// block-transfer wiring), 0 everywhere else.
    pub transfers: u8,
    /// Meters. Zero on every non-HOP transit edge.
    pub distance_m: f64,
}

impl EdgeAttributes {
    pub fn pt(edge_type: EdgeType, time: u32, validity: ValidityRef) -> Self {
        Self {
            access: Access::PublicTransport,
            edge_type: Some(edge_type),
            time,
            validity: Some(validity),
            transfers: 0,
            distance_m: 0.0,
        }
    }

    pub fn route_type_tagged(edge_type: EdgeType, time: u32, route_type: i32) -> Self {
        Self {
            access: Access::PublicTransport,
            edge_type: Some(edge_type),
            time,
            validity: Some(ValidityRef::RouteType(route_type)),
            transfers: 0,
            distance_m: 0.0,
        }
    }

    pub fn untyped(edge_type: EdgeType, time: u32) -> Self {
        Self {
            access: Access::PublicTransport,
            edge_type: Some(edge_type),
            time,
            validity: None,
            transfers: 0,
            distance_m: 0.0,
        }
    }

    pub fn foot_self_loop() -> Self {
        Self {
            access: Access::Foot,
            edge_type: None,
            time: 0,
            validity: None,
            transfers: 0,
            distance_m: 0.0,
        }
    }

    pub fn with_transfers(mut self, transfers: u8) -> Self {
        self.transfers = transfers;
        self
    }

    pub fn with_distance(mut self, distance_m: f64) -> Self {
        self.distance_m = distance_m;
        self
    }
}

/// The underlying routable-graph store: node table, edge table, edge
/// attribute bitfields. An external collaborator (§1) — this trait is the
/// compiler's entire contract with it.
pub trait Graph {
    /// Pre-existing node count at the start of the build. The compiler's
    /// node counter starts here (§5).
    fn node_count(&self) -> usize;

    /// Allocates a fresh node at the given coordinates, returning its id.
    fn add_node(&mut self, coord: Coordinate) -> NodeId;

    fn create_edge(&mut self, from: NodeId, to: NodeId) -> EdgeId;

    fn set_edge_attributes(&mut self, edge: EdgeId, attrs: EdgeAttributes);

    fn edge_attributes(&self, edge: EdgeId) -> &EdgeAttributes;

    fn edge_endpoints(&self, edge: EdgeId) -> (NodeId, NodeId);

    fn outgoing_edges(&self, node: NodeId) -> Vec<EdgeId>;

    fn incoming_edges(&self, node: NodeId) -> Vec<EdgeId>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeFilter {
    FootAccessible,
}

/// Result of a nearest-neighbor query against the walk network.
#[derive(Debug, Clone, Copy)]
pub struct Snap {
    node: Option<NodeId>,
}

impl Snap {
    pub fn found(node: NodeId) -> Self {
        Self { node: Some(node) }
    }

    pub fn not_found() -> Self {
        Self { node: None }
    }

    pub fn is_valid(&self) -> bool {
        self.node.is_some()
    }

    pub fn closest_node(&self) -> Option<NodeId> {
        self.node
    }
}

/// The pedestrian walk-network location index: nearest-neighbor queries
/// only. An external collaborator (§1).
pub trait LocationIndex {
    fn find_closest(&self, coord: Coordinate, filter: NodeFilter) -> Snap;
}

/// Minimal in-memory [`Graph`] implementation for tests and small
/// embedders who don't have a real routable-graph store wired up yet.
#[derive(Debug, Default)]
pub struct StubGraph {
    node_coords: Vec<Coordinate>,
    edges: Vec<(NodeId, NodeId)>,
    attrs: HashMap<EdgeId, EdgeAttributes>,
}

impl StubGraph {
    pub fn new(pre_existing_nodes: usize) -> Self {
        Self {
            node_coords: vec![Coordinate::default(); pre_existing_nodes],
            edges: Vec::new(),
            attrs: HashMap::new(),
        }
    }

    pub fn node_coordinate(&self, node: NodeId) -> Coordinate {
        self.node_coords[node as usize]
    }
}

impl Graph for StubGraph {
    fn node_count(&self) -> usize {
        self.node_coords.len()
    }

    fn add_node(&mut self, coord: Coordinate) -> NodeId {
        let id = self.node_coords.len() as NodeId;
        self.node_coords.push(coord);
        id
    }

    fn create_edge(&mut self, from: NodeId, to: NodeId) -> EdgeId {
        let id = self.edges.len() as EdgeId;
        self.edges.push((from, to));
        id
    }

    fn set_edge_attributes(&mut self, edge: EdgeId, attrs: EdgeAttributes) {
        self.attrs.insert(edge, attrs);
    }

    fn edge_attributes(&self, edge: EdgeId) -> &EdgeAttributes {
        self.attrs.get(&edge).expect("edge attributes set")
    }

    fn edge_endpoints(&self, edge: EdgeId) -> (NodeId, NodeId) {
        self.edges[edge as usize]
    }

    fn outgoing_edges(&self, node: NodeId) -> Vec<EdgeId> {
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(i, &(from, _))| (from == node).then_some(i as EdgeId))
            .collect()
    }

    fn incoming_edges(&self, node: NodeId) -> Vec<EdgeId> {
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(i, &(_, to))| (to == node).then_some(i as EdgeId))
            .collect()
    }
}

/// Minimal in-memory [`LocationIndex`] for tests: linear nearest-neighbor
/// scan over a fixed set of foot-accessible nodes.
#[derive(Debug, Default)]
pub struct StubLocationIndex {
    nodes: Vec<(NodeId, Coordinate)>,
    max_distance_m: f64,
}

impl StubLocationIndex {
    pub fn new(max_distance_m: f64) -> Self {
        Self {
            nodes: Vec::new(),
            max_distance_m,
        }
    }

    pub fn with_node(mut self, node: NodeId, coord: Coordinate) -> Self {
        self.nodes.push((node, coord));
        self
    }
}

impl LocationIndex for StubLocationIndex {
    fn find_closest(&self, coord: Coordinate, _filter: NodeFilter) -> Snap {
        self.nodes
            .iter()
            .map(|&(node, c)| (node, c.haversine_distance(&coord).as_meters()))
            .filter(|&(_, dist)| dist <= self.max_distance_m)
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
            .map(|(node, _)| Snap::found(node))
            .unwrap_or_else(Snap::not_found)
    }
}
