//! The symmetry seam: everything the engine needs to know about the
//! conserved quantum numbers, behind one capability interface.
//!
//! The set of symmetries is closed: a run picks one of [`U1`](../sym_u1/),
//! [`QSZ`](../sym_qsz/), or [`QS`](../sym_qs/) by name at configuration
//! time.  All physics specific to a symmetry lives in its module; the
//! drivers only ever talk to [`SymmetryOps`].
use super::coeffs::{self, CoefTables};
use super::errors::Error;
use super::invar::Invar;
use super::sym_qs::QsSym;
use super::sym_qsz::QszSym;
use super::sym_u1::U1Sym;

/// Classification of a tracked operator, fixing its SU(2) rank and the
/// quantum-number shifts of its blocks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpKind {
    /// Scalar under the symmetry; blocks are diagonal in `Invar`.
    Singlet,
    /// Charge-raising spin-doublet component (e.g. `d†_σ`).
    Doublet,
    /// Spin-triplet component (e.g. a local spin density).
    Triplet,
    /// An additive conserved observable known to the symmetry by name.
    Global(String),
}

impl OpKind {
    /// Twice the SU(2) rank.
    pub fn trank(&self) -> i32 {
        match *self {
            OpKind::Singlet | OpKind::Global(_) => 0,
            OpKind::Doublet => 1,
            OpKind::Triplet => 2,
        }
    }
}

/// Per-subspace expectation values used by the thermodynamic traces,
/// averaged over the multiplet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TdWeights {
    pub q: f64,
    pub q2: f64,
    /// `⟨S_z²⟩`; absent when the symmetry does not resolve it.
    pub sz2: Option<f64>,
}

pub trait SymmetryOps: Send + Sync {
    fn name(&self) -> &'static str;
    fn channels(&self) -> usize;
    /// Number of components in an `Invar`.
    fn qn_len(&self) -> usize;
    /// Number of ancestor combinations per new subspace.
    fn nr_combs(&self) -> usize;
    /// Number of chain-extension operators per channel.
    fn f_ops_per_channel(&self) -> usize;
    /// Degeneracy of one subspace level.
    fn mult(&self, i: &Invar) -> usize;
    /// Whether the tuple is representable at all.
    fn invar_allowed(&self, i: &Invar) -> bool;
    /// Quantum numbers the site state of combination `comb` adds, i.e.
    /// `I_new − I_ancestor`.
    fn comb_shift(&self, comb: usize) -> Invar;
    /// Possible `I1 − Ip` shifts of the `fnr`-th chain-extension operator.
    fn f_shifts(&self, fnr: usize) -> Vec<Invar>;
    /// Coupling test for a tensor operator carrying quantum numbers
    /// `iop`: additive equality for additive components, the SU(2)
    /// triangle rule for multiplet components.
    fn triangle_inequality(&self, i1: &Invar, ip: &Invar, iop: &Invar)
                           -> bool;
    /// Selection rule: can `f†` connect subspace `ip` to `i1` at all?
    /// Equivalent to `triangle_inequality` against the quantum numbers of
    /// the chain-extension operator.
    fn recalc_f_coupled(&self, i1: &Invar, ip: &Invar) -> bool;
    /// Possible `I1 − Ip` shifts of a tracked operator.
    fn op_shifts(&self, kind: &OpKind) -> Vec<Invar>;
    /// Exceptional cancellations in the hopping rows; the listed entries
    /// are skipped during Hamiltonian assembly.
    fn offdiag_exception(&self, _i1: usize, _ip: usize, _i: &Invar) -> bool {
        false
    }
    fn td_weights(&self, i: &Invar) -> TdWeights;
    /// Labels of the zero-site chain (the diagonalization seed).
    fn vacuum_invar(&self) -> Invar;
    fn build_tables(&self) -> CoefTables;
}

/// Table-driven lookup backing `offdiag_exception` implementations.
pub fn exception_listed(
    list: &[(usize, usize, Invar)],
    i1: usize,
    ip: usize,
    i: &Invar,
) -> bool {
    list.iter().any(|&(a, b, inv)| a == i1 && b == ip && inv == *i)
}

/// The closed set of supported symmetries.
pub enum Symmetry {
    U1(U1Sym),
    Qsz(QszSym),
    Qs(QsSym),
}

impl Symmetry {
    pub fn new(symtype: &str, channels: usize) -> Result<Self, Error> {
        match symtype {
            "U1" => U1Sym::new(channels).map(Symmetry::U1),
            "QSZ" => QszSym::new(channels).map(Symmetry::Qsz),
            "QS" => QsSym::new(channels).map(Symmetry::Qs),
            _ => Err(Error::UnknownSymmetry(symtype.to_owned())),
        }
    }

    pub fn ops(&self) -> &dyn SymmetryOps {
        match *self {
            Symmetry::U1(ref s) => s,
            Symmetry::Qsz(ref s) => s,
            Symmetry::Qs(ref s) => s,
        }
    }

    /// The cached coefficient tables for this symmetry and channel count.
    pub fn tables(&self) -> &'static CoefTables {
        let ops = self.ops();
        coeffs::cached((ops.name(), ops.channels()), || ops.build_tables())
    }

    /// Ancestor subspace of combination `comb` under subspace `i`.
    pub fn ancestor(&self, i: &Invar, comb: usize) -> Invar {
        *i - self.ops().comb_shift(comb)
    }

    pub fn name(&self) -> &'static str {
        self.ops().name()
    }

    pub fn channels(&self) -> usize {
        self.ops().channels()
    }

    pub fn qn_len(&self) -> usize {
        self.ops().qn_len()
    }

    pub fn nr_combs(&self) -> usize {
        self.ops().nr_combs()
    }

    pub fn f_ops_per_channel(&self) -> usize {
        self.ops().f_ops_per_channel()
    }

    pub fn mult(&self, i: &Invar) -> usize {
        self.ops().mult(i)
    }

    pub fn invar_allowed(&self, i: &Invar) -> bool {
        self.ops().invar_allowed(i)
    }

    pub fn f_shifts(&self, fnr: usize) -> Vec<Invar> {
        self.ops().f_shifts(fnr)
    }

    pub fn triangle_inequality(&self, i1: &Invar, ip: &Invar,
                               iop: &Invar) -> bool {
        self.ops().triangle_inequality(i1, ip, iop)
    }

    pub fn recalc_f_coupled(&self, i1: &Invar, ip: &Invar) -> bool {
        self.ops().recalc_f_coupled(i1, ip)
    }

    pub fn op_shifts(&self, kind: &OpKind) -> Vec<Invar> {
        self.ops().op_shifts(kind)
    }

    pub fn offdiag_exception(&self, i1: usize, ip: usize, i: &Invar) -> bool {
        self.ops().offdiag_exception(i1, ip, i)
    }

    pub fn td_weights(&self, i: &Invar) -> TdWeights {
        self.ops().td_weights(i)
    }

    pub fn vacuum_invar(&self) -> Invar {
        self.ops().vacuum_invar()
    }
}
