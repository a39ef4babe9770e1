//! Portable `std::simd` vector kernel, for platforms without a hand-written
//! intrinsics path. Opt-in via the `portable-simd` Cargo feature since it
//! requires a nightly toolchain.

#![cfg(feature = "portable-simd")]

use std::simd::prelude::*;

use super::common::NibbleTable;

const LANES: usize = 16;

pub fn madd(dst: &mut [u8], src: &[u8], nt: &NibbleTable) {
    debug_assert_eq!(dst.len(), src.len());
    let lo_tbl = u8x16::from_array(nt.lo);
    let hi_tbl = u8x16::from_array(nt.hi);
    let low_mask = u8x16::splat(0x0F);

    let n = dst.len();
    let chunks = n / LANES;
    for i in 0..chunks {
        let off = i * LANES;
        let s = u8x16::from_slice(&src[off..off + LANES]);
        let d = u8x16::from_slice(&dst[off..off + LANES]);

        let lo_nib = s & low_mask;
        let hi_nib = (s >> 4) & low_mask;

        let lo_res = lo_tbl.swizzle_dyn(lo_nib);
        let hi_res = hi_tbl.swizzle_dyn(hi_nib);
        let res = lo_res ^ hi_res;

        (d ^ res).copy_to_slice(&mut dst[off..off + LANES]);
    }

    let tail = chunks * LANES;
    if tail < n {
        let table = super::nibble_table_to_full(nt);
        super::super::scalar::madd(&mut dst[tail..], &src[tail..], &table);
    }
}

pub fn mul(dst: &mut [u8], src: &[u8], nt: &NibbleTable) {
    debug_assert_eq!(dst.len(), src.len());
    let lo_tbl = u8x16::from_array(nt.lo);
    let hi_tbl = u8x16::from_array(nt.hi);
    let low_mask = u8x16::splat(0x0F);

    let n = dst.len();
    let chunks = n / LANES;
    for i in 0..chunks {
        let off = i * LANES;
        let s = u8x16::from_slice(&src[off..off + LANES]);

        let lo_nib = s & low_mask;
        let hi_nib = (s >> 4) & low_mask;

        let lo_res = lo_tbl.swizzle_dyn(lo_nib);
        let hi_res = hi_tbl.swizzle_dyn(hi_nib);
        let res = lo_res ^ hi_res;

        res.copy_to_slice(&mut dst[off..off + LANES]);
    }

    let tail = chunks * LANES;
    if tail < n {
        let table = super::nibble_table_to_full(nt);
        super::super::scalar::mul(&mut dst[tail..], &src[tail..], &table);
    }
}
