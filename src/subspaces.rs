//! Per-iteration subspace registries.
//!
//! A `DiagInfo` owns the eigenproblem solutions of one iteration, keyed by
//! `Invar`.  Ordered maps keep every walk over the registry (and therefore
//! every checkpoint byte stream) deterministic.  Each iteration owns its
//! registry outright; the driver drops the previous one wholesale once its
//! matrix elements have been projected forward.
use std::collections::BTreeMap;
use super::invar::Invar;
use super::linalg::Scalar;
use super::mat::Mat;
use super::symmetry::Symmetry;

/// Eigenproblem solution of one invariant subspace.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Eigen<T> {
    /// Eigenvalues in ascending order, shifted so the ground state of the
    /// whole iteration sits at zero.
    pub values: Vec<f64>,
    /// The same eigenvalues without the ground-state shift.
    pub absvalues: Vec<f64>,
    /// Eigenstates stored as rows over the concatenated ancestor basis.
    pub vectors: Mat<T>,
    /// Ancestor block dimensions in combination order (0 where the
    /// ancestor subspace does not exist).
    pub rmax: Vec<usize>,
    /// Rows surviving truncation.
    pub nrkept: usize,
    /// Rows the recalculation kernels project through (`≥ nrkept` under
    /// the `all` strategy).
    pub nrstored: usize,
}

impl<T> Eigen<T> {
    pub fn nrcomputed(&self) -> usize {
        self.values.len()
    }

    /// Dimension of the combination basis.
    pub fn dim(&self) -> usize {
        self.rmax.iter().sum()
    }

    /// Column offset of one combination within the basis.
    pub fn offset(&self, comb: usize) -> usize {
        self.rmax[.. comb].iter().sum()
    }
}

impl<T: Scalar> Eigen<T> {
    /// The `nrows × rmax[comb]` eigenvector block of one combination.
    pub fn block(&self, comb: usize, nrows: usize) -> Mat<T> {
        let off = self.offset(comb);
        self.vectors.slice(0 .. nrows, off .. off + self.rmax[comb])
    }
}

/// Operator blocks between subspaces: `(bra, ket) → matrix`.
pub type MatrixElements<T> = BTreeMap<(Invar, Invar), Mat<T>>;

/// Chain-extension operator blocks, indexed `[channel][operator]`.
pub type Opch<T> = Vec<Vec<MatrixElements<T>>>;

pub fn empty_opch<T>(sym: &Symmetry) -> Opch<T> {
    (0 .. sym.channels())
        .map(|_| {
            (0 .. sym.f_ops_per_channel())
                .map(|_| MatrixElements::new())
                .collect()
        })
        .collect()
}

/// Ancestor links of every subspace of one iteration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubspaceStructure {
    pub ancestors: BTreeMap<Invar, Vec<Invar>>,
}

impl SubspaceStructure {
    /// Enumerate the subspaces reachable from the kept part of `old` and
    /// record their ancestors per combination.
    pub fn from_kept<T>(sym: &Symmetry, old: &DiagInfo<T>) -> Self {
        let mut ancestors = BTreeMap::new();
        for (inv, eigen) in &old.subspaces {
            if eigen.nrkept == 0 {
                continue;
            }
            for comb in 0 .. sym.nr_combs() {
                let new = *inv + sym.ops().comb_shift(comb);
                if !sym.invar_allowed(&new) {
                    continue;
                }
                ancestors.entry(new).or_insert_with(|| {
                    (0 .. sym.nr_combs())
                        .map(|c| sym.ancestor(&new, c))
                        .collect()
                });
            }
        }
        SubspaceStructure { ancestors }
    }

    pub fn ancestors(&self, i: &Invar) -> &[Invar] {
        match self.ancestors.get(i) {
            Some(ancs) => ancs,
            None => panic!("no ancestor record for subspace {}", i),
        }
    }
}

/// The subspace registry of one iteration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiagInfo<T> {
    pub subspaces: BTreeMap<Invar, Eigen<T>>,
}

impl<T: Scalar> DiagInfo<T> {
    /// The zero-site chain: a single state with no quantum numbers, from
    /// which the first real site is grown.
    pub fn vacuum(sym: &Symmetry) -> Self {
        let mut vectors = Mat::zero(1, 1);
        vectors[(0, 0)] = T::from_re(1.0);
        let mut subspaces = BTreeMap::new();
        subspaces.insert(
            sym.vacuum_invar(),
            Eigen {
                values: vec![0.0],
                absvalues: vec![0.0],
                vectors,
                rmax: vec![1],
                nrkept: 1,
                nrstored: 1,
            },
        );
        DiagInfo { subspaces }
    }

    pub fn get(&self, i: &Invar) -> Option<&Eigen<T>> {
        self.subspaces.get(i)
    }

    /// Basis dimension the subspace contributes to the next iteration.
    pub fn kept_dim(&self, i: &Invar) -> usize {
        self.subspaces.get(i).map(|e| e.nrkept).unwrap_or(0)
    }

    /// Number of computed levels (not multiplicity-weighted).
    pub fn total_computed(&self) -> usize {
        self.subspaces.values().map(Eigen::nrcomputed).sum()
    }

    pub fn total_kept(&self) -> usize {
        self.subspaces.values().map(|e| e.nrkept).sum()
    }

    /// Shift all eigenvalues so the lowest one sits at zero; returns the
    /// shift.  `absvalues` are left untouched.
    pub fn shift_to_ground(&mut self) -> f64 {
        let mut gs = std::f64::INFINITY;
        for eigen in self.subspaces.values() {
            if let Some(&e0) = eigen.values.first() {
                gs = gs.min(e0);
            }
        }
        if !gs.is_finite() {
            return 0.0;
        }
        for eigen in self.subspaces.values_mut() {
            for v in &mut eigen.values {
                *v -= gs;
            }
        }
        gs
    }
}
