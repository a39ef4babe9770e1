//! The `RaidEngine` handle: mode, bound zero/waste state, kernel dispatch, and
//! cached multiplication tables, plus a mutex-guarded global singleton for
//! callers that want the C-library `raid_*` free-function calling convention.

use std::sync::{Mutex, OnceLock};

use log::debug;

use crate::raid::code::{check_parity_limit, CodeMatrix, Mode};
use crate::raid::error::{RaidError, Result};
use crate::raid::galois::galois_table;
use crate::raid::kernel::{self, KernelLevel};
use crate::raid::{gen, rec, selftest};

/// An owned, explicit handle carrying everything the core needs across calls:
/// the active code mode, the bound zero buffer, whether a waste buffer is in
/// use, the selected kernel dispatch level, and the precomputed multiplication
/// tables for every possible field constant (built once, immutable thereafter,
/// hence safe to share via `&RaidEngine` for read-only operations).
pub struct RaidEngine {
    mode: Mode,
    cauchy: CodeMatrix,
    vandermonde: CodeMatrix,
    kernel_level: KernelLevel,
    tables: Box<[[u8; 256]; 256]>,
    zero: Vec<u8>,
    waste_enabled: bool,
}

impl RaidEngine {
    /// Builds both code matrices, probes CPU features, and precomputes the
    /// multiplication table for every field constant. Equivalent to `raid_init`.
    pub fn new() -> Self {
        debug!("raid engine: constructing (default mode = Cauchy)");
        let cauchy = CodeMatrix::build(Mode::Cauchy);
        let vandermonde = CodeMatrix::build(Mode::Vandermonde);
        let kernel_level = kernel::detect();

        let gf = galois_table();
        let mut tables = Box::new([[0u8; 256]; 256]);
        for (c, table) in tables.iter_mut().enumerate() {
            *table = gf.mul_table(c as u8);
        }

        RaidEngine {
            mode: Mode::Cauchy,
            cauchy,
            vandermonde,
            kernel_level,
            tables,
            zero: Vec::new(),
            waste_enabled: false,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Switches the active code family for subsequent operations.
    pub fn set_mode(&mut self, mode: Mode) {
        debug!("raid engine: mode set to {mode:?}");
        self.mode = mode;
    }

    /// Binds (or rebinds) the zero buffer consulted during recovery.
    pub fn bind_zero(&mut self, buf: &[u8]) {
        self.zero = buf.to_vec();
    }

    /// Binds or clears the waste buffer used by `rec_dataonly`. Only the
    /// buffer's presence is observed: its content is write-only scratch that
    /// this engine always owns outright rather than writing through the
    /// caller's pointer.
    pub fn bind_waste(&mut self, buf: Option<&[u8]>) {
        self.waste_enabled = buf.is_some();
    }

    pub fn kernel_level(&self) -> KernelLevel {
        self.kernel_level
    }

    fn matrix(&self) -> &CodeMatrix {
        match self.mode {
            Mode::Cauchy => &self.cauchy,
            Mode::Vandermonde => &self.vandermonde,
        }
    }

    fn table_for(&self, c: u8) -> [u8; 256] {
        self.tables[c as usize]
    }

    /// Computes `v[nd..nd+np)` from `v[0..nd)`. Read-only over engine state.
    pub fn gen(&self, nd: usize, np: usize, size: usize, v: &mut [&mut [u8]]) -> Result<()> {
        check_parity_limit(self.mode, np)?;
        gen::raid_gen(self.matrix(), self.kernel_level, |c| self.table_for(c), nd, np, size, v)
    }

    /// Recovers any mix of failed data/parity blocks named by `ir`.
    pub fn rec(&self, ir: &[usize], nd: usize, np: usize, size: usize, v: &mut [&mut [u8]]) -> Result<()> {
        check_parity_limit(self.mode, np)?;
        if self.zero.len() != size {
            return Err(RaidError::ZeroBufferUnbound);
        }
        rec::raid_rec(self.matrix(), self.kernel_level, |c| self.table_for(c), &self.zero, nd, np, size, ir, v)
    }

    /// Recovers only the data blocks named in `id`, consuming the parity rows named in `ip`.
    pub fn rec_dataonly(
        &self,
        id: &[usize],
        ip: &[usize],
        nd: usize,
        size: usize,
        v: &mut [&mut [u8]],
    ) -> Result<()> {
        if self.zero.len() != size {
            return Err(RaidError::ZeroBufferUnbound);
        }
        let mut owned_waste;
        let waste: Option<&mut [u8]> = if self.waste_enabled {
            owned_waste = vec![0u8; size];
            Some(&mut owned_waste[..])
        } else {
            None
        };
        rec::raid_rec_dataonly(
            self.matrix(),
            self.kernel_level,
            |c| self.table_for(c),
            &self.zero,
            waste,
            nd,
            size,
            id,
            ip,
            v,
        )
    }

    /// Exhaustive small-scale round-trip check across both code families.
    pub fn selftest(&mut self) -> Result<()> {
        selftest::raid_selftest(self)
    }
}

impl Default for RaidEngine {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL: OnceLock<Mutex<RaidEngine>> = OnceLock::new();

fn global() -> &'static Mutex<RaidEngine> {
    GLOBAL.get_or_init(|| Mutex::new(RaidEngine::new()))
}

/// C-calling-convention compatibility layer. Each function locks the
/// process-wide engine behind a mutex; callers mixing this with an explicit
/// `RaidEngine` handle of their own are using two independent engines, not
/// sharing state between them.
pub mod compat {
    use super::*;

    pub fn raid_init() {
        let _ = global();
    }

    pub fn raid_mode(mode: Mode) {
        global().lock().unwrap().set_mode(mode);
    }

    pub fn raid_zero(buf: &[u8]) {
        global().lock().unwrap().bind_zero(buf);
    }

    pub fn raid_waste(buf: Option<&[u8]>) {
        global().lock().unwrap().bind_waste(buf);
    }

    pub fn raid_gen(nd: usize, np: usize, size: usize, v: &mut [&mut [u8]]) -> Result<()> {
        global().lock().unwrap().gen(nd, np, size, v)
    }

    pub fn raid_rec(ir: &[usize], nd: usize, np: usize, size: usize, v: &mut [&mut [u8]]) -> Result<()> {
        global().lock().unwrap().rec(ir, nd, np, size, v)
    }

    pub fn raid_rec_dataonly(
        id: &[usize],
        ip: &[usize],
        nd: usize,
        size: usize,
        v: &mut [&mut [u8]],
    ) -> Result<()> {
        global().lock().unwrap().rec_dataonly(id, ip, nd, size, v)
    }

    pub fn raid_selftest() -> Result<()> {
        global().lock().unwrap().selftest()
    }
}
