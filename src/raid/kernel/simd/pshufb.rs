//! x86_64 SSSE3 vector kernel using `PSHUFB` as a 16-entry table lookup.
//!
//! Nibble-split technique from James Plank's "Screaming Fast Galois Field
//! Arithmetic" and the `galois_2p8` crate, applied per-byte instead of
//! per-word since GF(2^8) multiplication output is a single byte.

#![cfg(target_arch = "x86_64")]

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use super::common::NibbleTable;

const LANES: usize = 16;

/// # Safety
/// Caller must have verified `is_x86_feature_detected!("ssse3")`.
#[target_feature(enable = "ssse3")]
pub unsafe fn madd(dst: &mut [u8], src: &[u8], nt: &NibbleTable) {
    debug_assert_eq!(dst.len(), src.len());
    let lo_tbl = _mm_loadu_si128(nt.lo.as_ptr() as *const __m128i);
    let hi_tbl = _mm_loadu_si128(nt.hi.as_ptr() as *const __m128i);
    let low_mask = _mm_set1_epi8(0x0F);

    let n = dst.len();
    let chunks = n / LANES;
    for i in 0..chunks {
        let off = i * LANES;
        let s = _mm_loadu_si128(src.as_ptr().add(off) as *const __m128i);
        let d = _mm_loadu_si128(dst.as_ptr().add(off) as *const __m128i);

        let lo_nib = _mm_and_si128(s, low_mask);
        let hi_nib = _mm_and_si128(_mm_srli_epi16(s, 4), low_mask);

        let lo_res = _mm_shuffle_epi8(lo_tbl, lo_nib);
        let hi_res = _mm_shuffle_epi8(hi_tbl, hi_nib);
        let res = _mm_xor_si128(lo_res, hi_res);

        let out = _mm_xor_si128(d, res);
        _mm_storeu_si128(dst.as_mut_ptr().add(off) as *mut __m128i, out);
    }

    let tail = chunks * LANES;
    if tail < n {
        let table = super::nibble_table_to_full(nt);
        super::super::scalar::madd(&mut dst[tail..], &src[tail..], &table);
    }
}

/// # Safety
/// Caller must have verified `is_x86_feature_detected!("ssse3")`.
#[target_feature(enable = "ssse3")]
pub unsafe fn mul(dst: &mut [u8], src: &[u8], nt: &NibbleTable) {
    debug_assert_eq!(dst.len(), src.len());
    let lo_tbl = _mm_loadu_si128(nt.lo.as_ptr() as *const __m128i);
    let hi_tbl = _mm_loadu_si128(nt.hi.as_ptr() as *const __m128i);
    let low_mask = _mm_set1_epi8(0x0F);

    let n = dst.len();
    let chunks = n / LANES;
    for i in 0..chunks {
        let off = i * LANES;
        let s = _mm_loadu_si128(src.as_ptr().add(off) as *const __m128i);

        let lo_nib = _mm_and_si128(s, low_mask);
        let hi_nib = _mm_and_si128(_mm_srli_epi16(s, 4), low_mask);

        let lo_res = _mm_shuffle_epi8(lo_tbl, lo_nib);
        let hi_res = _mm_shuffle_epi8(hi_tbl, hi_nib);
        let res = _mm_xor_si128(lo_res, hi_res);

        _mm_storeu_si128(dst.as_mut_ptr().add(off) as *mut __m128i, res);
    }

    let tail = chunks * LANES;
    if tail < n {
        let table = super::nibble_table_to_full(nt);
        super::super::scalar::mul(&mut dst[tail..], &src[tail..], &table);
    }
}
