//! `raid_gen`: computes all parity blocks from data blocks.

use log::trace;

use crate::raid::code::CodeMatrix;
use crate::raid::error::Result;
use crate::raid::kernel::{self, KernelLevel};
use crate::raid::validate::{validate_common, validate_block_lengths};

/// Computes `v[nd..nd+np)` from `v[0..nd)`.
///
/// Iterates data blocks in the outer loop and parity rows in the inner loop, so
/// each data block is read exactly once and fanned out to every parity
/// accumulator, rather than re-reading every data block once per parity row.
pub fn raid_gen(
    matrix: &CodeMatrix,
    level: KernelLevel,
    table_for: impl Fn(u8) -> [u8; 256],
    nd: usize,
    np: usize,
    size: usize,
    v: &mut [&mut [u8]],
) -> Result<()> {
    validate_common(nd, np, size, v.len())?;
    validate_block_lengths(v, size)?;

    let (data, parity) = v.split_at_mut(nd);

    for p in 0..np {
        parity[p].fill(0);
    }

    for d in 0..nd {
        let src: &[u8] = data[d];
        for p in 0..np {
            let c = matrix.entry(p, d);
            if c == 0 {
                continue;
            }
            if c == 1 {
                kernel::block_xor(parity[p], src);
            } else {
                let table = table_for(c);
                kernel::block_madd(level, parity[p], src, &table);
            }
        }
    }

    trace!("raid_gen: nd={nd} np={np} size={size}");
    Ok(())
}
