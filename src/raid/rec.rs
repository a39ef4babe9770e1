//! `raid_rec` and `raid_rec_dataonly`: reconstructing missing blocks from
//! surviving data and parity, plus the small index-sorting helper both rely on.

use log::trace;

use crate::raid::code::CodeMatrix;
use crate::raid::error::{RaidError, Result};
use crate::raid::invert::invert;
use crate::raid::kernel::{self, KernelLevel};
use crate::raid::validate::{validate_block_lengths, validate_common, validate_failure_indices};

/// Insertion sort for the small (`<= RAID_PARITY_MAX`) index lists this module works with.
pub fn raid_sort(v: &mut [usize]) {
    for i in 1..v.len() {
        let mut j = i;
        while j > 0 && v[j - 1] > v[j] {
            v.swap(j - 1, j);
            j -= 1;
        }
    }
}

fn apply(level: KernelLevel, dst: &mut [u8], src: &[u8], c: u8, table_for: &impl Fn(u8) -> [u8; 256]) {
    if c == 1 {
        kernel::block_xor(dst, src);
    } else {
        let table = table_for(c);
        kernel::block_madd(level, dst, src, &table);
    }
}

/// Recovers any mix of failed data and parity blocks named by `ir` (sorted, over
/// `[0, nd+np)`), given the surviving blocks in `v` and a bound zero buffer.
pub fn raid_rec(
    matrix: &CodeMatrix,
    level: KernelLevel,
    table_for: impl Fn(u8) -> [u8; 256],
    zero: &[u8],
    nd: usize,
    np: usize,
    size: usize,
    ir: &[usize],
    v: &mut [&mut [u8]],
) -> Result<()> {
    validate_common(nd, np, size, v.len())?;
    validate_block_lengths(v, size)?;
    validate_failure_indices(ir, nd + np, np)?;
    debug_assert_eq!(zero.len(), size);

    let failed_data: Vec<usize> = ir.iter().copied().filter(|&i| i < nd).collect();
    let failed_parity: Vec<usize> = ir.iter().copied().filter(|&i| i >= nd).map(|i| i - nd).collect();
    let k = failed_data.len();

    let chosen_rows: Vec<usize> = (0..np).filter(|p| !failed_parity.contains(p)).take(k).collect();
    debug_assert_eq!(chosen_rows.len(), k);

    let a: Vec<Vec<u8>> = chosen_rows
        .iter()
        .map(|&p| failed_data.iter().map(|&d| matrix.entry(p, d)).collect())
        .collect();
    let inv = if k > 0 { Some(invert(&a)?) } else { None };

    let (data, parity) = v.split_at_mut(nd);

    for &d in &failed_data {
        data[d].fill(0);
    }

    if let Some(inv) = &inv {
        let mut scratch = vec![0u8; size];
        for (i, &p) in chosen_rows.iter().enumerate() {
            scratch.copy_from_slice(parity[p]);
            for d in 0..nd {
                let c = matrix.entry(p, d);
                if c == 0 {
                    continue;
                }
                let src: &[u8] = if failed_data.contains(&d) { zero } else { data[d] };
                apply(level, &mut scratch, src, c, &table_for);
            }
            for (j, &fd) in failed_data.iter().enumerate() {
                let coeff = inv[j][i];
                if coeff == 0 {
                    continue;
                }
                apply(level, data[fd], &scratch, coeff, &table_for);
            }
        }
    }

    for &p in &failed_parity {
        parity[p].fill(0);
        for d in 0..nd {
            let c = matrix.entry(p, d);
            if c == 0 {
                continue;
            }
            apply(level, parity[p], data[d], c, &table_for);
        }
    }

    trace!("raid_rec: nd={nd} np={np} size={size} failed={ir:?}");
    Ok(())
}

/// Recovers only the data blocks named in `id`, consuming exactly the parity
/// rows named in `ip` (both sorted, same length). `waste`, if bound, receives
/// the intermediate syndrome computation instead of an internally-owned
/// scratch buffer; either way every real parity block in `v` is left
/// untouched.
pub fn raid_rec_dataonly(
    matrix: &CodeMatrix,
    level: KernelLevel,
    table_for: impl Fn(u8) -> [u8; 256],
    zero: &[u8],
    waste: Option<&mut [u8]>,
    nd: usize,
    size: usize,
    id: &[usize],
    ip: &[usize],
    v: &mut [&mut [u8]],
) -> Result<()> {
    if id.len() != ip.len() {
        return Err(RaidError::MismatchedSelectionLengths {
            id_len: id.len(),
            ip_len: ip.len(),
        });
    }
    let nr = id.len();
    if size == 0 || size % 64 != 0 {
        return Err(RaidError::InvalidBlockSize { size });
    }
    if nd == 0 || nd > crate::raid::code::DATA_MAX {
        return Err(RaidError::TooManyDataBlocks {
            nd,
            max: crate::raid::code::DATA_MAX,
        });
    }
    if v.len() < nd {
        return Err(RaidError::BufferVectorTooShort {
            expected: nd,
            actual: v.len(),
        });
    }
    let total_parity_slots = v.len() - nd;
    if total_parity_slots == 0 || total_parity_slots > crate::raid::code::PARITY_MAX {
        return Err(RaidError::TooManyParityBlocks {
            np: total_parity_slots,
            max: crate::raid::code::PARITY_MAX,
        });
    }
    validate_block_lengths(v, size)?;
    validate_failure_indices(id, nd, total_parity_slots)?;
    validate_failure_indices(ip, total_parity_slots, total_parity_slots)?;
    if nr > total_parity_slots {
        return Err(RaidError::TooManyFailures {
            nr,
            np: total_parity_slots,
        });
    }
    debug_assert_eq!(zero.len(), size);

    let a: Vec<Vec<u8>> = ip
        .iter()
        .map(|&p| id.iter().map(|&d| matrix.entry(p, d)).collect())
        .collect();
    let inv = if nr > 0 { Some(invert(&a)?) } else { None };

    let (data, parity) = v.split_at_mut(nd);

    for &d in id {
        data[d].fill(0);
    }

    let mut owned_scratch;
    let scratch: &mut [u8] = match waste {
        Some(w) => {
            debug_assert_eq!(w.len(), size);
            w
        }
        None => {
            owned_scratch = vec![0u8; size];
            &mut owned_scratch
        }
    };

    if let Some(inv) = &inv {
        for (i, &p) in ip.iter().enumerate() {
            scratch.copy_from_slice(parity[p]);
            for d in 0..nd {
                let c = matrix.entry(p, d);
                if c == 0 {
                    continue;
                }
                let src: &[u8] = if id.contains(&d) { zero } else { data[d] };
                apply(level, scratch, src, c, &table_for);
            }
            for (j, &fd) in id.iter().enumerate() {
                let coeff = inv[j][i];
                if coeff == 0 {
                    continue;
                }
                apply(level, data[fd], scratch, coeff, &table_for);
            }
        }
    }

    trace!("raid_rec_dataonly: nd={nd} size={size} id={id:?} ip={ip:?}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raid::code::Mode;
    use crate::raid::galois::galois_table;
    use crate::raid::gen::raid_gen;

    fn matrix_and_tables() -> (CodeMatrix, KernelLevel) {
        (CodeMatrix::build(Mode::Cauchy), KernelLevel::Scalar)
    }

    #[test]
    fn raid_sort_sorts_small_lists() {
        let mut v = vec![4, 1, 3, 0, 2];
        raid_sort(&mut v);
        assert_eq!(v, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn round_trip_single_data_failure() {
        let (matrix, level) = matrix_and_tables();
        let gf = galois_table();
        let size = 64;

        let mut d0 = vec![0x01u8; size];
        let mut d1 = vec![0x02u8; size];
        let mut d2 = vec![0x04u8; size];
        let mut p0 = vec![0u8; size];
        {
            let mut v: Vec<&mut [u8]> = vec![&mut d0, &mut d1, &mut d2, &mut p0];
            raid_gen(&matrix, level, |c| gf.mul_table(c), 3, 1, size, &mut v).unwrap();
        }

        let original_d1 = d1.clone();
        d1.fill(0);
        let zero = vec![0u8; size];
        {
            let mut v: Vec<&mut [u8]> = vec![&mut d0, &mut d1, &mut d2, &mut p0];
            raid_rec(&matrix, level, |c| gf.mul_table(c), &zero, 3, 1, size, &[1], &mut v).unwrap();
        }
        assert_eq!(d1, original_d1);
    }

    #[test]
    fn round_trip_data_and_parity_failure() {
        let (matrix, level) = matrix_and_tables();
        let gf = galois_table();
        let size = 64;

        let mut data: Vec<Vec<u8>> = (0..5).map(|i| vec![(0x11 * (i + 1)) as u8; size]).collect();
        let mut p0 = vec![0u8; size];
        let mut p1 = vec![0u8; size];
        let mut p2 = vec![0u8; size];
        {
            let mut v: Vec<&mut [u8]> = data
                .iter_mut()
                .map(|b| b.as_mut_slice())
                .chain([p0.as_mut_slice(), p1.as_mut_slice(), p2.as_mut_slice()])
                .collect();
            raid_gen(&matrix, level, |c| gf.mul_table(c), 5, 3, size, &mut v).unwrap();
        }
        let expected_data = data.clone();
        let expected_p1 = p1.clone();

        data[2].fill(0);
        p1.fill(0);
        let zero = vec![0u8; size];
        {
            let mut v: Vec<&mut [u8]> = data
                .iter_mut()
                .map(|b| b.as_mut_slice())
                .chain([p0.as_mut_slice(), p1.as_mut_slice(), p2.as_mut_slice()])
                .collect();
            raid_rec(&matrix, level, |c| gf.mul_table(c), &zero, 5, 3, size, &[2, 6], &mut v).unwrap();
        }
        assert_eq!(data[2], expected_data[2]);
        assert_eq!(p1, expected_p1);
    }

    #[test]
    fn dataonly_recovery_with_waste_preserves_real_parity() {
        let (matrix, level) = matrix_and_tables();
        let gf = galois_table();
        let size = 64;

        let mut data: Vec<Vec<u8>> = (0..4).map(|i| vec![(0x10 * (i + 1)) as u8; size]).collect();
        let mut p0 = vec![0u8; size];
        let mut p1 = vec![0u8; size];
        let mut p2 = vec![0u8; size];
        {
            let mut v: Vec<&mut [u8]> = data
                .iter_mut()
                .map(|b| b.as_mut_slice())
                .chain([p0.as_mut_slice(), p1.as_mut_slice(), p2.as_mut_slice()])
                .collect();
            raid_gen(&matrix, level, |c| gf.mul_table(c), 4, 3, size, &mut v).unwrap();
        }
        let expected_p0 = p0.clone();
        let expected_p1 = p1.clone();
        let expected_p2 = p2.clone();
        let expected_d0 = data[0].clone();
        let expected_d2 = data[2].clone();

        data[0].fill(0);
        data[2].fill(0);
        let zero = vec![0u8; size];
        let mut waste = vec![0u8; size];
        {
            let mut v: Vec<&mut [u8]> = data
                .iter_mut()
                .map(|b| b.as_mut_slice())
                .chain([p0.as_mut_slice(), p1.as_mut_slice(), p2.as_mut_slice()])
                .collect();
            raid_rec_dataonly(
                &matrix,
                level,
                |c| gf.mul_table(c),
                &zero,
                Some(&mut waste),
                4,
                size,
                &[0, 2],
                &[0, 1],
                &mut v,
            )
            .unwrap();
        }
        assert_eq!(data[0], expected_d0);
        assert_eq!(data[2], expected_d2);
        assert_eq!(p0, expected_p0);
        assert_eq!(p1, expected_p1);
        assert_eq!(p2, expected_p2);
    }

    #[test]
    fn dataonly_recovery_choice_of_parities_is_invariant() {
        let (matrix, level) = matrix_and_tables();
        let gf = galois_table();
        let size = 64;

        let mut data: Vec<Vec<u8>> = (0..4).map(|i| vec![(0x20 * (i + 1)) as u8; size]).collect();
        let mut p0 = vec![0u8; size];
        let mut p1 = vec![0u8; size];
        let mut p2 = vec![0u8; size];
        {
            let mut v: Vec<&mut [u8]> = data
                .iter_mut()
                .map(|b| b.as_mut_slice())
                .chain([p0.as_mut_slice(), p1.as_mut_slice(), p2.as_mut_slice()])
                .collect();
            raid_gen(&matrix, level, |c| gf.mul_table(c), 4, 3, size, &mut v).unwrap();
        }
        let zero = vec![0u8; size];

        let mut via_01 = data.clone();
        via_01[1].fill(0);
        {
            let mut v: Vec<&mut [u8]> = via_01
                .iter_mut()
                .map(|b| b.as_mut_slice())
                .chain([p0.as_mut_slice(), p1.as_mut_slice(), p2.as_mut_slice()])
                .collect();
            raid_rec_dataonly(&matrix, level, |c| gf.mul_table(c), &zero, None, 4, size, &[1], &[0], &mut v).unwrap();
        }

        let mut via_2 = data.clone();
        via_2[1].fill(0);
        {
            let mut v: Vec<&mut [u8]> = via_2
                .iter_mut()
                .map(|b| b.as_mut_slice())
                .chain([p0.as_mut_slice(), p1.as_mut_slice(), p2.as_mut_slice()])
                .collect();
            raid_rec_dataonly(&matrix, level, |c| gf.mul_table(c), &zero, None, 4, size, &[1], &[2], &mut v).unwrap();
        }

        assert_eq!(via_01[1], data[1]);
        assert_eq!(via_2[1], data[1]);
    }
}
