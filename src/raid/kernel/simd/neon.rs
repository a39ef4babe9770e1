//! aarch64 NEON vector kernel using `vqtbl1q_u8` as a 16-entry table lookup.

#![cfg(target_arch = "aarch64")]

use std::arch::aarch64::*;

use super::common::NibbleTable;

const LANES: usize = 16;

/// # Safety
/// NEON is mandatory on aarch64, so this has no runtime feature gate, but the
/// caller must still ensure `dst`/`src` are valid for the lengths given.
#[target_feature(enable = "neon")]
pub unsafe fn madd(dst: &mut [u8], src: &[u8], nt: &NibbleTable) {
    debug_assert_eq!(dst.len(), src.len());
    let lo_tbl = vld1q_u8(nt.lo.as_ptr());
    let hi_tbl = vld1q_u8(nt.hi.as_ptr());
    let low_mask = vdupq_n_u8(0x0F);

    let n = dst.len();
    let chunks = n / LANES;
    for i in 0..chunks {
        let off = i * LANES;
        let s = vld1q_u8(src.as_ptr().add(off));
        let d = vld1q_u8(dst.as_ptr().add(off));

        let lo_nib = vandq_u8(s, low_mask);
        let hi_nib = vandq_u8(vshrq_n_u8(s, 4), low_mask);

        let lo_res = vqtbl1q_u8(lo_tbl, lo_nib);
        let hi_res = vqtbl1q_u8(hi_tbl, hi_nib);
        let res = veorq_u8(lo_res, hi_res);

        let out = veorq_u8(d, res);
        vst1q_u8(dst.as_mut_ptr().add(off), out);
    }

    let tail = chunks * LANES;
    if tail < n {
        let table = super::nibble_table_to_full(nt);
        super::super::scalar::madd(&mut dst[tail..], &src[tail..], &table);
    }
}

/// # Safety
/// See [`madd`].
#[target_feature(enable = "neon")]
pub unsafe fn mul(dst: &mut [u8], src: &[u8], nt: &NibbleTable) {
    debug_assert_eq!(dst.len(), src.len());
    let lo_tbl = vld1q_u8(nt.lo.as_ptr());
    let hi_tbl = vld1q_u8(nt.hi.as_ptr());
    let low_mask = vdupq_n_u8(0x0F);

    let n = dst.len();
    let chunks = n / LANES;
    for i in 0..chunks {
        let off = i * LANES;
        let s = vld1q_u8(src.as_ptr().add(off));

        let lo_nib = vandq_u8(s, low_mask);
        let hi_nib = vandq_u8(vshrq_n_u8(s, 4), low_mask);

        let lo_res = vqtbl1q_u8(lo_tbl, lo_nib);
        let hi_res = vqtbl1q_u8(hi_tbl, hi_nib);
        let res = veorq_u8(lo_res, hi_res);

        vst1q_u8(dst.as_mut_ptr().add(off), res);
    }

    let tail = chunks * LANES;
    if tail < n {
        let table = super::nibble_table_to_full(nt);
        super::super::scalar::mul(&mut dst[tail..], &src[tail..], &table);
    }
}
