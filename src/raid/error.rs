//! Error types for the RAID erasure-coding core.

use thiserror::Error;

use crate::raid::code::Mode;

/// Errors returned by the erasure-coding core.
///
/// Usage violations (malformed `nd`/`np`/`size`, unsorted indices, mode/parity-count
/// mismatches) are distinguished from algebraic recovery failure so callers can tell
/// "you called this wrong" apart from "the data could not be reconstructed".
#[derive(Debug, Error)]
pub enum RaidError {
    /// Block size must be a positive multiple of 64.
    #[error("block size {size} is not a positive multiple of 64")]
    InvalidBlockSize { size: usize },

    /// `nd` is zero or exceeds `RAID_DATA_MAX`.
    #[error("data block count {nd} exceeds the maximum of {max}")]
    TooManyDataBlocks { nd: usize, max: usize },

    /// `np` is zero or exceeds `RAID_PARITY_MAX`.
    #[error("parity block count {np} exceeds the maximum of {max}")]
    TooManyParityBlocks { np: usize, max: usize },

    /// The caller's buffer vector is shorter than `nd + np`.
    #[error("buffer vector has {actual} slots, expected at least {expected}")]
    BufferVectorTooShort { expected: usize, actual: usize },

    /// A block slice's length did not match the declared block size.
    #[error("block {index} has length {actual}, expected {expected}")]
    BlockLengthMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    /// Failure indices were not strictly ascending.
    #[error("failure indices must be strictly ascending")]
    UnsortedFailureIndices,

    /// A failure index fell outside `[0, nd + np)`.
    #[error("failure index {index} is out of range [0, {bound})")]
    FailureIndexOutOfRange { index: usize, bound: usize },

    /// More failures were named than there are parity blocks to recover from.
    #[error("{nr} failures exceed the {np} available parity blocks")]
    TooManyFailures { nr: usize, np: usize },

    /// `id` and `ip` had different lengths in `raid_rec_dataonly`.
    #[error("id has {id_len} entries but ip has {ip_len}")]
    MismatchedSelectionLengths { id_len: usize, ip_len: usize },

    /// Vandermonde mode was asked for more parity blocks than it supports.
    #[error("mode {mode:?} supports at most {max} parity blocks, got {np}")]
    VandermondeParityLimit { mode: Mode, np: usize, max: usize },

    /// The recovery system's coefficient matrix was singular.
    #[error("recovery matrix is singular for the given failure/parity selection")]
    SingularMatrix,

    /// Recovery required a scratch block but no zero buffer was bound.
    #[error("recovery requires a bound zero buffer")]
    ZeroBufferUnbound,

    /// `raid_selftest` found a round-trip mismatch.
    #[error("self-test failure: {0}")]
    SelfTestFailed(String),
}

pub type Result<T> = std::result::Result<T, RaidError>;
