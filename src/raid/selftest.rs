//! `raid_selftest`: exhaustive small-scale round-trip verification of parity
//! generation and recovery, across both code families. Regression coverage
//! for the code matrix and the recovery path together, rather than a proof
//! substitute: it generates parity, fails every reachable subset of blocks up
//! to `SELFTEST_ND`/the mode's parity limit, recovers, and compares.

use log::debug;

use crate::raid::code::Mode;
use crate::raid::engine::RaidEngine;
use crate::raid::error::{RaidError, Result};

const SELFTEST_ND: usize = 8;
const SELFTEST_SIZE: usize = 64;

/// All `k`-combinations of `0..n`, in ascending order within each combination.
fn combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    if k == 0 {
        return vec![Vec::new()];
    }
    if k > n {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut combo = Vec::with_capacity(k);
    fn recurse(start: usize, n: usize, k: usize, combo: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        if combo.len() == k {
            out.push(combo.clone());
            return;
        }
        for i in start..n {
            combo.push(i);
            recurse(i + 1, n, k, combo, out);
            combo.pop();
        }
    }
    recurse(0, n, k, &mut combo, &mut out);
    out
}

fn check_mixed_recovery(
    engine: &RaidEngine,
    nd: usize,
    np: usize,
    size: usize,
    original_data: &[Vec<u8>],
    original_parity: &[Vec<u8>],
) -> Result<()> {
    for r in 1..=np {
        for combo in combinations(nd + np, r) {
            let mut data = original_data.to_vec();
            let mut parity = original_parity.to_vec();
            for &idx in &combo {
                if idx < nd {
                    data[idx].fill(0);
                } else {
                    parity[idx - nd].fill(0);
                }
            }
            {
                let mut v: Vec<&mut [u8]> = data
                    .iter_mut()
                    .map(|b| b.as_mut_slice())
                    .chain(parity.iter_mut().map(|b| b.as_mut_slice()))
                    .collect();
                engine.rec(&combo, nd, np, size, &mut v)?;
            }
            if data != original_data || parity != original_parity {
                return Err(RaidError::SelfTestFailed(format!(
                    "mode={:?} mixed recovery mismatch for failure set {combo:?}",
                    engine.mode()
                )));
            }
        }
    }
    Ok(())
}

fn check_dataonly_recovery(
    engine: &RaidEngine,
    nd: usize,
    np: usize,
    size: usize,
    original_data: &[Vec<u8>],
    original_parity: &[Vec<u8>],
) -> Result<()> {
    let max_r = nd.min(np);
    for r in 1..=max_r {
        for id in combinations(nd, r) {
            for ip in combinations(np, r) {
                let mut data = original_data.to_vec();
                let parity = original_parity.to_vec();
                for &d in &id {
                    data[d].fill(0);
                }
                let mut parity_copy = parity.clone();
                {
                    let mut v: Vec<&mut [u8]> = data
                        .iter_mut()
                        .map(|b| b.as_mut_slice())
                        .chain(parity_copy.iter_mut().map(|b| b.as_mut_slice()))
                        .collect();
                    engine.rec_dataonly(&id, &ip, nd, size, &mut v)?;
                }
                if data != original_data {
                    return Err(RaidError::SelfTestFailed(format!(
                        "mode={:?} data-only recovery mismatch for id={id:?} ip={ip:?}",
                        engine.mode()
                    )));
                }
            }
        }
    }
    Ok(())
}

fn check_mode(engine: &mut RaidEngine, mode: Mode) -> Result<()> {
    engine.set_mode(mode);
    let nd = SELFTEST_ND;
    let np = mode.parity_max();
    let size = SELFTEST_SIZE;

    let zero = vec![0u8; size];
    engine.bind_zero(&zero);

    let mut data: Vec<Vec<u8>> = (0..nd).map(|i| vec![0x11u8.wrapping_mul(i as u8 + 1); size]).collect();
    let mut parity: Vec<Vec<u8>> = vec![vec![0u8; size]; np];
    {
        let mut v: Vec<&mut [u8]> = data
            .iter_mut()
            .map(|b| b.as_mut_slice())
            .chain(parity.iter_mut().map(|b| b.as_mut_slice()))
            .collect();
        engine.gen(nd, np, size, &mut v)?;
    }

    check_mixed_recovery(engine, nd, np, size, &data, &parity)?;
    check_dataonly_recovery(engine, nd, np, size, &data, &parity)?;
    Ok(())
}

/// Runs an exhaustive small-scale round-trip check (generate, fail every
/// reachable subset, recover, compare) for both Cauchy and Vandermonde modes,
/// then restores `engine`'s original mode regardless of outcome.
pub fn raid_selftest(engine: &mut RaidEngine) -> Result<()> {
    let original_mode = engine.mode();

    let result = check_mode(engine, Mode::Cauchy).and_then(|_| check_mode(engine, Mode::Vandermonde));

    engine.set_mode(original_mode);

    match &result {
        Ok(()) => debug!("raid_selftest: passed"),
        Err(e) => debug!("raid_selftest: failed: {e}"),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combinations_counts_match_binomial() {
        assert_eq!(combinations(5, 0).len(), 1);
        assert_eq!(combinations(5, 1).len(), 5);
        assert_eq!(combinations(5, 2).len(), 10);
        assert_eq!(combinations(5, 5).len(), 1);
        assert_eq!(combinations(5, 6).len(), 0);
    }

    #[test]
    fn selftest_passes() {
        let mut engine = RaidEngine::new();
        raid_selftest(&mut engine).unwrap();
    }

    #[test]
    fn selftest_restores_original_mode() {
        let mut engine = RaidEngine::new();
        engine.set_mode(Mode::Vandermonde);
        raid_selftest(&mut engine).unwrap();
        assert_eq!(engine.mode(), Mode::Vandermonde);
    }
}
