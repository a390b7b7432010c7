//! A symmetry-resolved numerical renormalization group engine for quantum
//! impurity models.
//!
//! The chain is grown one site at a time.  At each iteration the
//! Hamiltonian decomposes into blocks labeled by conserved quantum numbers
//! ([`invar::Invar`]); the blocks are assembled from the previous
//! iteration's eigenvalues and chain-end matrix elements, diagonalized
//! independently, truncated by the policy in [`truncation`], and every
//! operator of interest is projected into the new eigenbases by the
//! kernels in [`recalc`].  The supported symmetries are `U1`, `QSZ`, and
//! `QS`; everything symmetry-specific is table-driven (see [`coeffs`]).
extern crate bincode;
extern crate cblas;
extern crate conv;
extern crate fnv;
extern crate lapacke;
#[macro_use]
extern crate lazy_static;
extern crate netlib_src;
extern crate num;
#[macro_use]
extern crate quick_error;
extern crate rayon;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate wigner_symbols;

#[macro_use]
pub mod macros;

pub mod coeffs;
pub mod errors;
pub mod half;
pub mod invar;
pub mod io;
pub mod linalg;
pub mod mat;
pub mod nrg;
pub mod params;
pub mod recalc;
pub mod site;
pub mod stats;
pub mod step;
pub mod subspaces;
pub mod sym_qs;
pub mod sym_qsz;
pub mod sym_u1;
pub mod symmetry;
pub mod truncation;
pub mod utils;
