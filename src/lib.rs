//! raidcore - RAID-style GF(2^8) erasure-coding core.
//!
//! Computes and repairs redundancy across fixed-size data blocks using up to
//! six parity blocks, under either a Cauchy or Vandermonde code family.
//! SIMD-accelerated block kernels (PSHUFB on x86_64, NEON on aarch64, and an
//! opt-in portable `std::simd` path) back the same scalar contract.

#![cfg_attr(feature = "portable-simd", feature(portable_simd))]

pub mod raid;

pub use raid::{Mode as RaidMode, RaidEngine, RaidError};
