use std::sync::Arc;

use crate::{
    compiler::GraphCompiler,
    error::Error,
    graph::{EdgeId, EdgeType, Graph, NodeId},
};

/// One step of a search's parent chain: the node reached, the edge that was
/// taken to reach it (`None` only for a chain's very first label), and the
/// index of the label it was reached from.
///
/// Represented as an owned record in a flat slab rather than raw
/// back-pointers (§9), since the chain a search hands back for
/// reconstruction is logically cyclic-shaped (many labels can share a
/// parent) and Rust has no safe way to link that with real pointers.
#[derive(Debug, Clone, Copy)]
pub struct Label {
    pub node: NodeId,
    pub edge: Option<EdgeId>,
    pub parent: Option<usize>,
}

/// A search's label chain, indexed by slab position. Grounded in the
/// teacher's `raptor::Allocator`, which keeps one parent-pointer array per
/// round rather than a linked structure.
#[derive(Debug, Default, Clone)]
pub struct LabelChain {
    labels: Vec<Label>,
}

impl LabelChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: NodeId, edge: Option<EdgeId>, parent: Option<usize>) -> usize {
        self.labels.push(Label { node, edge, parent });
        self.labels.len() - 1
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    fn get(&self, index: usize) -> Option<&Label> {
        self.labels.get(index)
    }
}

/// One resolved hop of a reconstructed itinerary (§4.5). `node` is the
/// label's own node — the sentinel transition at the start of a
/// `arrive_by=false` reconstruction carries the target label's node and no
/// edge.
#[derive(Debug, Clone)]
pub struct Transition {
    pub node: NodeId,
    pub edge: Option<EdgeId>,
    pub edge_type: Option<EdgeType>,
    pub distance_m: f64,
    pub transfers: u8,
    /// Only defined for ENTER_PT and TRANSFER edges (§4.5); read from
    /// `platform_descriptor_by_edge`.
    pub feed_id: Option<Arc<str>>,
}

impl Transition {
    fn sentinel(node: NodeId) -> Self {
        Self {
            node,
            edge: None,
            edge_type: None,
            distance_m: 0.0,
            transfers: 0,
            feed_id: None,
        }
    }
}

impl<G: Graph> GraphCompiler<G> {
    /// Walks a search's label chain back to a full itinerary (§4.5).
    ///
    /// `arrive_by=true` reconstructs a chain built backwards from a fixed
    /// arrival time: transitions are collected child-to-parent then
    /// reversed into chronological order. `arrive_by=false` reconstructs a
    /// chain built forwards from a fixed departure time: a sentinel
    /// transition for the target label is emitted first, then one
    /// transition per ancestor hop, with no reversal.
    pub fn reconstruct(
        &self,
        chain: &LabelChain,
        target: usize,
        arrive_by: bool,
    ) -> Result<Vec<Transition>, Error> {
        let mut transitions = Vec::new();
        if !arrive_by {
            let target_label = chain.get(target).ok_or(Error::UnknownTrip(format!(
                "label index {target} out of range"
            )))?;
            transitions.push(Transition::sentinel(target_label.node));
        }

        let mut current = target;
        while let Some(label) = chain.get(current) {
            let Some(parent_index) = label.parent else {
                break;
            };
            let parent = chain.get(parent_index).ok_or(Error::UnknownTrip(format!(
                "label index {parent_index} out of range"
            )))?;
            let edge = label.edge.ok_or(Error::UnknownTrip(format!(
                "label index {current} has a parent but no edge"
            )))?;
            transitions.push(self.build_transition(edge, parent.node, label.node)?);
            current = parent_index;
        }

        if arrive_by {
            transitions.reverse();
        }

        Ok(transitions)
    }

    /// Resolves one edge's attributes into a [`Transition`], failing if its
    /// real endpoints don't match the `(base, adj)` orientation the walk
    /// expected (§4.5, §7).
    fn build_transition(&self, edge: EdgeId, expected_base: NodeId, expected_adj: NodeId) -> Result<Transition, Error> {
        let (from, to) = self.graph.edge_endpoints(edge);
        if (from, to) != (expected_base, expected_adj) {
            return Err(Error::ReconstructionEndpointMismatch {
                edge,
                expected_base,
                expected_adj,
            });
        }

        let attrs = self.graph.edge_attributes(edge);
        let feed_id = match attrs.edge_type {
            Some(EdgeType::EnterPt) | Some(EdgeType::Transfer) => self
                .side_tables
                .platform_descriptor(edge)
                .map(|p| p.feed_id().clone()),
            _ => None,
        };

        Ok(Transition {
            node: expected_adj,
            edge: Some(edge),
            edge_type: attrs.edge_type,
            distance_m: attrs.distance_m,
            transfers: attrs.transfers,
            feed_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geo::Coordinate,
        graph::{EdgeAttributes, StubGraph},
        platform::PlatformDescriptor,
    };

    #[test]
    fn arrive_by_true_reverses_into_chronological_order() {
        let mut compiler = GraphCompiler::new(StubGraph::new(0), "feed");
        let a = compiler.graph.add_node(Coordinate::new(0.0, 0.0));
        let b = compiler.graph.add_node(Coordinate::new(0.0, 0.01));
        let c = compiler.graph.add_node(Coordinate::new(0.0, 0.02));
        let e_ab = compiler.graph.create_edge(a, b);
        compiler
            .graph
            .set_edge_attributes(e_ab, EdgeAttributes::untyped(EdgeType::Hop, 100));
        let e_bc = compiler.graph.create_edge(b, c);
        compiler
            .graph
            .set_edge_attributes(e_bc, EdgeAttributes::untyped(EdgeType::Hop, 200));

        let mut chain = LabelChain::new();
        let root = chain.push(a, None, None);
        let mid = chain.push(b, Some(e_ab), Some(root));
        let target = chain.push(c, Some(e_bc), Some(mid));

        let transitions = compiler.reconstruct(&chain, target, true).unwrap();
        assert_eq!(transitions.len(), 2);
        assert_eq!(transitions[0].edge, Some(e_ab));
        assert_eq!(transitions[1].edge, Some(e_bc));
    }

    #[test]
    fn arrive_by_false_prefixes_a_sentinel_and_keeps_reverse_order() {
        let mut compiler = GraphCompiler::new(StubGraph::new(0), "feed");
        let a = compiler.graph.add_node(Coordinate::new(0.0, 0.0));
        let b = compiler.graph.add_node(Coordinate::new(0.0, 0.01));
        let e_ab = compiler.graph.create_edge(a, b);
        compiler
            .graph
            .set_edge_attributes(e_ab, EdgeAttributes::untyped(EdgeType::Hop, 100));

        let mut chain = LabelChain::new();
        let root = chain.push(a, None, None);
        let target = chain.push(b, Some(e_ab), Some(root));

        let transitions = compiler.reconstruct(&chain, target, false).unwrap();
        assert_eq!(transitions.len(), 2);
        assert_eq!(transitions[0].edge, None);
        assert_eq!(transitions[0].node, b);
        assert_eq!(transitions[1].edge, Some(e_ab));
    }

    #[test]
    fn endpoint_mismatch_is_fatal() {
        let mut compiler = GraphCompiler::new(StubGraph::new(0), "feed");
        let a = compiler.graph.add_node(Coordinate::new(0.0, 0.0));
        let b = compiler.graph.add_node(Coordinate::new(0.0, 0.01));
        let wrong = compiler.graph.add_node(Coordinate::new(0.0, 0.02));
        let edge = compiler.graph.create_edge(wrong, b);
        compiler
            .graph
            .set_edge_attributes(edge, EdgeAttributes::untyped(EdgeType::Hop, 100));

        let mut chain = LabelChain::new();
        let root = chain.push(a, None, None);
        let target = chain.push(b, Some(edge), Some(root));

        let err = compiler.reconstruct(&chain, target, true);
        assert!(matches!(err, Err(Error::ReconstructionEndpointMismatch { .. })));
    }

    #[test]
    fn enter_pt_transition_carries_feed_id() {
        let mut compiler = GraphCompiler::new(StubGraph::new(0), "feed");
        let station = compiler.graph.add_node(Coordinate::new(0.0, 0.0));
        let platform_enter = compiler.graph.add_node(Coordinate::new(0.0, 0.0));
        let edge = compiler.graph.create_edge(station, platform_enter);
        compiler
            .graph
            .set_edge_attributes(edge, EdgeAttributes::route_type_tagged(EdgeType::EnterPt, 0, 3));
        compiler.side_tables.set_platform_descriptor(
            edge,
            PlatformDescriptor::RouteTypePlatform {
                feed_id: "feed".into(),
                stop_id: "A".into(),
                route_type: 3,
            },
        );

        let mut chain = LabelChain::new();
        let root = chain.push(station, None, None);
        let target = chain.push(platform_enter, Some(edge), Some(root));

        let transitions = compiler.reconstruct(&chain, target, true).unwrap();
        assert_eq!(transitions[0].feed_id.as_deref(), Some("feed"));
    }
}
