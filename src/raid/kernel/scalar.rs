//! Scalar baseline block kernels.
//!
//! GF(2^8) maps a byte to a byte, so no pointer-cast reinterpretation of the
//! buffer as wider words is needed: a table lookup per byte is already the
//! natural unit of work, and the loop below is plain safe Rust.

#[inline]
pub fn xor(dst: &mut [u8], src: &[u8]) {
    debug_assert_eq!(dst.len(), src.len());
    for (d, s) in dst.iter_mut().zip(src.iter()) {
        *d ^= *s;
    }
}

#[inline]
pub fn madd(dst: &mut [u8], src: &[u8], table: &[u8; 256]) {
    debug_assert_eq!(dst.len(), src.len());
    for (d, s) in dst.iter_mut().zip(src.iter()) {
        *d ^= table[*s as usize];
    }
}

#[inline]
pub fn mul(dst: &mut [u8], src: &[u8], table: &[u8; 256]) {
    debug_assert_eq!(dst.len(), src.len());
    for (d, s) in dst.iter_mut().zip(src.iter()) {
        *d = table[*s as usize];
    }
}
