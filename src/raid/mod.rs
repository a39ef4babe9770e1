//! RAID-style GF(2^8) erasure-coding core: computes and repairs redundancy
//! across fixed-size data blocks using up to six parity blocks.

pub mod code;
pub mod engine;
pub mod error;
pub mod galois;
pub mod gen;
pub mod invert;
pub mod kernel;
pub mod rec;
pub mod selftest;
pub mod validate;

pub use code::{Mode, DATA_MAX, PARITY_MAX, VANDERMONDE_PARITY_MAX};
pub use engine::RaidEngine;
pub use error::{RaidError, Result};
pub use rec::raid_sort;
