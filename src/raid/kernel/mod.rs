//! Block kernel dispatch: picks the fastest available `block_xor`/`block_mul`/
//! `block_madd` implementation for the running CPU, once, at engine construction.

pub mod scalar;
pub mod simd;

use log::debug;

use simd::common::build_nibble_table;

/// Which vector implementation (if any) this process will use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelLevel {
    Scalar,
    #[cfg(target_arch = "x86_64")]
    Ssse3,
    #[cfg(target_arch = "aarch64")]
    Neon,
    #[cfg(feature = "portable-simd")]
    Portable,
}

/// Probes CPU features once to pick the kernel level for this process.
pub fn detect() -> KernelLevel {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("ssse3") {
            debug!("raid kernel dispatch: using x86_64 SSSE3 (PSHUFB)");
            return KernelLevel::Ssse3;
        }
    }
    #[cfg(target_arch = "aarch64")]
    {
        debug!("raid kernel dispatch: using aarch64 NEON");
        return KernelLevel::Neon;
    }
    #[cfg(all(feature = "portable-simd", not(target_arch = "x86_64"), not(target_arch = "aarch64")))]
    {
        debug!("raid kernel dispatch: using portable std::simd");
        return KernelLevel::Portable;
    }
    #[allow(unreachable_code)]
    {
        debug!("raid kernel dispatch: using scalar baseline");
        KernelLevel::Scalar
    }
}

/// `dst ^= src`, byte-wise. Plain XOR has no per-constant table, so there is
/// nothing for a vector path to accelerate beyond what auto-vectorization
/// already gives the scalar loop; kept as a single scalar implementation.
#[inline]
pub fn block_xor(dst: &mut [u8], src: &[u8]) {
    scalar::xor(dst, src);
}

/// `dst ^= c * src`, dispatched to the selected kernel level.
pub fn block_madd(level: KernelLevel, dst: &mut [u8], src: &[u8], table: &[u8; 256]) {
    match level {
        #[cfg(target_arch = "x86_64")]
        KernelLevel::Ssse3 => {
            let nt = build_nibble_table(table);
            // SAFETY: KernelLevel::Ssse3 is only ever produced by `detect()`
            // after a successful `is_x86_feature_detected!("ssse3")` check.
            unsafe { simd::pshufb::madd(dst, src, &nt) };
        }
        #[cfg(target_arch = "aarch64")]
        KernelLevel::Neon => {
            let nt = build_nibble_table(table);
            // SAFETY: NEON is a baseline aarch64 feature.
            unsafe { simd::neon::madd(dst, src, &nt) };
        }
        #[cfg(feature = "portable-simd")]
        KernelLevel::Portable => {
            let nt = build_nibble_table(table);
            simd::portable::madd(dst, src, &nt);
        }
        KernelLevel::Scalar => scalar::madd(dst, src, table),
    }
}

/// `dst = c * src`, dispatched to the selected kernel level.
pub fn block_mul(level: KernelLevel, dst: &mut [u8], src: &[u8], table: &[u8; 256]) {
    match level {
        #[cfg(target_arch = "x86_64")]
        KernelLevel::Ssse3 => {
            let nt = build_nibble_table(table);
            unsafe { simd::pshufb::mul(dst, src, &nt) };
        }
        #[cfg(target_arch = "aarch64")]
        KernelLevel::Neon => {
            let nt = build_nibble_table(table);
            unsafe { simd::neon::mul(dst, src, &nt) };
        }
        #[cfg(feature = "portable-simd")]
        KernelLevel::Portable => {
            let nt = build_nibble_table(table);
            simd::portable::mul(dst, src, &nt);
        }
        KernelLevel::Scalar => scalar::mul(dst, src, table),
    }
}
