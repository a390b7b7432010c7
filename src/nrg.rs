//! The iteration driver.
//!
//! `Run` owns the full state of one calculation: the current subspace
//! registry, the chain-extension blocks, and any tracked operators.  One
//! call to [`Run::step`] grows the chain by one site: enumerate the new
//! subspaces, assemble and diagonalize their Hamiltonian blocks in
//! parallel, truncate, and project every operator into the new eigenbases.
use std::collections::BTreeMap;
use rayon::prelude::*;
use super::errors::Error;
use super::invar::Invar;
use super::linalg::{EigenvalueRange, Part, Scalar, heevr};
use super::params::Params;
use super::recalc;
use super::stats::{self, TdPoint};
use super::step::{ChainCoefs, Step};
use super::subspaces::{DiagInfo, Eigen, MatrixElements, Opch,
                       SubspaceStructure, empty_opch};
use super::symmetry::{OpKind, Symmetry};
use super::truncation;
use super::utils::RangeInclusive;
use super::utils::cast;

const MAX_RESTARTS: usize = 10;

/// An operator whose matrix elements are carried through the iterations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackedOp<T> {
    pub kind: OpKind,
    pub elements: MatrixElements<T>,
}

pub struct Run<T: Scalar> {
    pub sym: Symmetry,
    pub params: Params,
    pub coefs: ChainCoefs,
    /// Index of the next site to add.
    pub n: usize,
    pub diag: DiagInfo<T>,
    pub opch: Opch<T>,
    pub ops: BTreeMap<String, TrackedOp<T>>,
    pub td: Vec<TdPoint>,
    /// Accumulated ground-state shift in rescaled units of the current
    /// iteration.
    pub egs: f64,
}

impl<T: Scalar> Run<T> {
    pub fn new(params: Params, coefs: ChainCoefs) -> Result<Self, Error> {
        params.validate()?;
        if coefs.channels() != params.channels {
            return Err(Error::InvalidParam(
                "coefs",
                format!("{} channel(s) of coefficients for {} channel(s)",
                        coefs.channels(), params.channels),
            ));
        }
        if coefs.len() <= params.nmax {
            return Err(Error::InvalidParam(
                "coefs",
                format!("{} coefficient(s) for nmax = {}",
                        coefs.len(), params.nmax),
            ));
        }
        let sym = Symmetry::new(&params.symtype, params.channels)?;
        let diag = DiagInfo::vacuum(&sym);
        let opch = empty_opch(&sym);
        Ok(Run {
            sym,
            params,
            coefs,
            n: 0,
            diag,
            opch,
            ops: BTreeMap::new(),
            td: Vec::new(),
            egs: 0.0,
        })
    }

    /// Register an operator to be projected through every iteration.
    /// `elements` are its blocks over the *current* registry; tracking
    /// must therefore be set up before the first step (or right after a
    /// checkpoint reload).
    pub fn track(&mut self, name: &str, kind: OpKind,
                 elements: MatrixElements<T>) {
        self.ops.insert(name.to_owned(), TrackedOp { kind, elements });
    }

    pub fn finished(&self) -> bool {
        self.n > self.params.nmax
    }

    /// Add site `n` to the chain.
    pub fn step(&mut self) -> Result<(), Error> {
        let step = Step { n: self.n, nmax: self.params.nmax };
        let structure = SubspaceStructure::from_kept(&self.sym, &self.diag);
        let keep_all = self.n < self.params.ninit
            || (step.last() && self.params.lastall);
        let mut ratio = if keep_all { 1.0 } else { self.params.diagratio };
        let mut restarts = 0;
        let (mut diag_new, kept) = loop {
            let mut diag_new = self.diagonalize(&structure, ratio)?;
            self.egs = diag_new.shift_to_ground();
            let levels = truncation::collect_levels(&self.sym, &diag_new);
            if keep_all {
                let kept = levels.len();
                truncation::apply(&mut diag_new, &levels, kept,
                                  self.params.strategy);
                break (diag_new, kept);
            }
            let partial = ratio < 1.0;
            let decision = truncation::decide(&levels, &self.params,
                                              partial)
                .and_then(|kept| {
                    truncation::apply(&mut diag_new, &levels, kept,
                                      self.params.strategy);
                    // with a partial spectrum the boundary is only valid
                    // if every truncated band extends past it
                    if partial {
                        truncation::bracketed(&diag_new)?;
                    }
                    Ok(kept)
                });
            match decision {
                Ok(kept) => break (diag_new, kept),
                Err(short) => {
                    if !(self.params.restart && restarts < MAX_RESTARTS
                         && ratio < 1.0) {
                        return Err(Error::TruncationShortfall(
                            short.wanted, short.computed));
                    }
                    ratio = (ratio * self.params.restartfactor).min(1.0);
                    restarts += 1;
                }
            }
        };

        let scale = step.scale(self.params.lambda);
        self.td.push(stats::measure(&self.sym, &diag_new,
                                    self.params.betabar, self.n, scale));

        let opch_new = recalc::recalc_f(&self.sym, &diag_new, &structure);
        for op in self.ops.values_mut() {
            op.elements = match op.kind {
                OpKind::Global(ref name) => recalc::recalc_global(
                    &self.sym, &diag_new, &structure,
                    &op.elements, name),
                ref kind => recalc::recalc_general(
                    &self.sym, &diag_new, &structure,
                    &op.elements, kind),
            };
        }

        if self.params.verbose {
            println!("n: {}", self.n);
            println!("  scale: {:e}", scale);
            println!("  egs: {}", self.egs);
            println!("  subspaces: {}", diag_new.subspaces.len());
            println!("  kept: {} / {}",
                     kept, diag_new.total_computed());
            if restarts > 0 {
                println!("  restarts: {}", restarts);
            }
        }

        self.diag = diag_new;
        self.opch = opch_new;
        self.n += 1;
        Ok(())
    }

    /// Run the remaining iterations to the end of the chain.
    pub fn run(&mut self) -> Result<(), Error> {
        while !self.finished() {
            self.step()?;
        }
        Ok(())
    }

    fn diagonalize(
        &self,
        structure: &SubspaceStructure,
        ratio: f64,
    ) -> Result<DiagInfo<T>, Error> {
        let solved = structure
            .ancestors
            .par_iter()
            .map(|(inv, ancestors)| {
                let mut h = recalc::hamiltonian(
                    &self.sym, inv, ancestors, &self.diag, &self.opch,
                    &self.coefs, self.n, self.params.lambda);
                let dim = h.num_rows();
                if dim == 0 {
                    return Ok(None);
                }
                let range = if ratio < 1.0 {
                    let m = ((ratio * dim as f64).ceil() as usize)
                        .max(1)
                        .min(dim);
                    EigenvalueRange::Indices(RangeInclusive {
                        start: 1,
                        end: cast(m),
                    })
                } else {
                    EigenvalueRange::All
                };
                let (values, vectors) =
                    heevr(range, Part::Upper, &mut h)
                        .map_err(Error::Diag)?;
                let rmax = ancestors
                    .iter()
                    .map(|a| self.diag.kept_dim(a))
                    .collect();
                let nr = values.len();
                Ok(Some((*inv, Eigen {
                    absvalues: values.clone(),
                    values,
                    vectors,
                    rmax,
                    nrkept: nr,
                    nrstored: nr,
                })))
            })
            .collect::<Result<Vec<_>, Error>>()?;
        let mut subspaces = BTreeMap::new();
        for entry in solved {
            if let Some((inv, eigen)) = entry {
                subspaces.insert(inv, eigen);
            }
        }
        Ok(DiagInfo { subspaces })
    }
}
