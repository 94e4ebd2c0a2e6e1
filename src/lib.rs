//! Compiles a static GTFS feed and a pedestrian street network into a
//! time-expanded multi-modal routing graph.
//!
//! The pipeline runs as a fixed sequence of [`compiler::GraphCompiler`]
//! methods, each in its own module: [`connector`] attaches stops to the
//! street network, [`trips`] materializes every trip as a chain of graph
//! edges, [`wiring`] chains each platform's timelines to the street, and
//! [`transfers`] wires GTFS and implicit same-stop transfers between them.
//! [`realtime`] patches individual delayed departures into an already-built
//! graph, and [`reconstruct`] turns a search's label chain back into an
//! itinerary. The underlying [`graph::Graph`] store, [`graph::LocationIndex`],
//! and GTFS parser are external collaborators — this crate only defines the
//! traits it needs from them.

pub mod bitset;
pub mod compiler;
pub mod connector;
pub mod error;
pub mod feed;
pub mod geo;
pub mod graph;
pub mod interning;
pub mod model;
pub mod platform;
pub mod realtime;
pub mod reconstruct;
pub mod sidetables;
pub mod time;
pub mod timeline;
pub mod transfers;
pub mod trips;
pub mod wiring;

pub use compiler::{CompilerConfig, GraphCompiler};
pub use error::Error;
