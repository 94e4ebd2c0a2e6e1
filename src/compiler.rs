use std::sync::Arc;

use crate::{
    graph::Graph,
    interning::{OperatingDayPatterns, WritableTimeZones},
    sidetables::SideTables,
    timeline::Timelines,
};

/// Extension point for compiler-wide knobs. Every numeric threshold the
/// spec names (e.g. `min_transfer_time`) comes from the feed itself, not
/// from compiler configuration, so this currently carries nothing — it
/// exists so callers have one obvious place to reach for when that
/// changes, the way the reference engine keeps builder scaffolding around
/// search parameters that already have sensible defaults.
#[derive(Debug, Clone, Default)]
pub struct CompilerConfig {}

impl CompilerConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Owns the interning dictionaries and side tables for one feed's build.
/// Explicit "storage" state passed around, never a global (§9).
///
/// A `GraphCompiler` is single-threaded and non-suspending (§5): all
/// mutation of the wrapped [`Graph`] happens from the thread that calls
/// its methods, and the graph is left in an inconsistent state until the
/// whole pipeline (`connect_stops_to_street_network` →
/// `create_trips` → `wire_up_stops` → `insert_gtfs_transfers`) finishes.
pub struct GraphCompiler<G: Graph> {
    pub graph: G,
    pub feed_id: Arc<str>,
    pub config: CompilerConfig,
    pub side_tables: SideTables,
    pub operating_day_patterns: OperatingDayPatterns,
    pub writable_time_zones: WritableTimeZones,
    pub timelines: Timelines,
}

impl<G: Graph> GraphCompiler<G> {
    pub fn new(graph: G, feed_id: impl Into<Arc<str>>) -> Self {
        Self::with_config(graph, feed_id, CompilerConfig::new())
    }

    pub fn with_config(graph: G, feed_id: impl Into<Arc<str>>, config: CompilerConfig) -> Self {
        Self {
            graph,
            feed_id: feed_id.into(),
            config,
            side_tables: SideTables::new(),
            operating_day_patterns: OperatingDayPatterns::new(),
            writable_time_zones: WritableTimeZones::new(),
            timelines: Timelines::new(),
        }
    }
}
