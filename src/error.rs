use thiserror::Error;

/// Fatal conditions the compiler can raise.
///
/// Everything else documented as an "expected-absent lookup" in the spec
/// (no nearby walk node, no explicit transfer, no static platform match
/// during a realtime patch) is not an error: it takes a fallback branch and
/// never reaches this type.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Duplicate stop id")]
    DuplicateStopId,
    #[error("Found a block with frequency-based trips. Not supported.")]
    FrequencyBlockConflict,
    #[error("Unknown trip id: {0}")]
    UnknownTrip(String),
    #[error("Unknown stop-time at trip {trip_id} sequence {sequence}")]
    UnknownStopTime { trip_id: String, sequence: u32 },
    #[error("Reconstruction endpoint mismatch on edge {edge}: expected ({expected_base}, {expected_adj})")]
    ReconstructionEndpointMismatch {
        edge: u64,
        expected_base: u64,
        expected_adj: u64,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
