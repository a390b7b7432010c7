//! The recalculation engine: Hamiltonian assembly and projection of
//! operator matrix elements into each new eigenbasis.
//!
//! Everything here is driven by the coefficient tables of the active
//! symmetry.  A table row names a pair of ancestor combinations `(i1, ip)`
//! and a scalar factor; the corresponding contribution is the contraction
//! of the bra eigenvector block (conjugated), the old operator block, and
//! the ket eigenvector block.  The kernels never consult the symmetry
//! beyond the tables, so a new symmetry is only ever a new table builder.
use cblas::Transpose;
use super::invar::Invar;
use super::linalg::{Scalar, gemm};
use super::mat::Mat;
use super::step::ChainCoefs;
use super::subspaces::{DiagInfo, Eigen, MatrixElements, Opch,
                       SubspaceStructure};
use super::symmetry::{OpKind, Symmetry};

/// `cn += factor · conj(U1 block) · old · (Up block)ᵀ`, with `old`
/// understood as the identity when absent.  The old block is sliced down to
/// the kept dimensions of the two ancestors before the contraction.
fn project_block<T: Scalar>(
    factor: f64,
    eig1: &Eigen<T>,
    comb1: usize,
    eigp: &Eigen<T>,
    combp: usize,
    old: Option<&Mat<T>>,
    cn: &mut Mat<T>,
) {
    let rm1 = eig1.rmax[comb1];
    let rmp = eigp.rmax[combp];
    if rm1 == 0 || rmp == 0 {
        return;
    }
    let u1c = eig1.block(comb1, cn.num_rows()).conj();
    let up = eigp.block(combp, cn.num_cols());
    let alpha = T::from_re(factor);
    match old {
        Some(old) => {
            let old_kept = old.slice(0 .. rm1, 0 .. rmp);
            let mut tmp = Mat::zero(rm1, cn.num_cols());
            gemm(Transpose::None, Transpose::Ordinary,
                 T::from_re(1.0), &old_kept, &up, T::zero(), &mut tmp);
            gemm(Transpose::None, Transpose::None,
                 alpha, &u1c, &tmp, T::from_re(1.0), cn);
        }
        None => {
            gemm(Transpose::None, Transpose::Ordinary,
                 alpha, &u1c, &up, T::from_re(1.0), cn);
        }
    }
}

/// Assemble the Hamiltonian block of subspace `i` at iteration `n` in the
/// combination basis spanned by the kept ancestor states.
///
/// The diagonal carries the rescaled ancestor eigenvalues `√Λ · E_old` plus
/// the on-site energies `ζ_ch(n)`; the hopping rows add
/// `ξ_ch(n−1) · factor(I) · F_old` with the explicit Hermitian mirror.  At
/// `n = 0` there is no previous site, so the hopping rows are skipped.
pub fn hamiltonian<T: Scalar>(
    sym: &Symmetry,
    i: &Invar,
    ancestors: &[Invar],
    old: &DiagInfo<T>,
    opch: &Opch<T>,
    coefs: &ChainCoefs,
    n: usize,
    lambda: f64,
) -> Mat<T> {
    let tables = sym.tables();
    let rmax: Vec<usize> =
        ancestors.iter().map(|a| old.kept_dim(a)).collect();
    let mut offs = Vec::with_capacity(rmax.len());
    let mut dim = 0;
    for &rm in &rmax {
        offs.push(dim);
        dim += rm;
    }
    let mut h = Mat::zero(dim, dim);

    let scale = lambda.sqrt();
    for comb in 0 .. rmax.len() {
        if rmax[comb] == 0 {
            continue;
        }
        let eigen = &old.subspaces[&ancestors[comb]];
        for r in 0 .. rmax[comb] {
            h[(offs[comb] + r, offs[comb] + r)] =
                T::from_re(scale * eigen.values[r]);
        }
    }

    for d in &tables.diag {
        if rmax[d.comb] == 0 {
            continue;
        }
        let zeta = coefs.zeta(n, d.ch);
        if zeta == 0.0 {
            continue;
        }
        for r in 0 .. rmax[d.comb] {
            let k = offs[d.comb] + r;
            h[(k, k)] = h[(k, k)] + T::from_re(zeta * d.number);
        }
    }

    if n > 0 {
        for od in &tables.offdiag {
            if rmax[od.i1] == 0 || rmax[od.ip] == 0 {
                continue;
            }
            if sym.offdiag_exception(od.i1, od.ip, i) {
                continue;
            }
            let factor = (od.factor)(i);
            if factor == 0.0 {
                continue;
            }
            let xi = coefs.xi(n - 1, od.ch);
            if xi == 0.0 {
                continue;
            }
            let key = (ancestors[od.i1], ancestors[od.ip]);
            let fblk = match opch[od.ch][od.fnr].get(&key) {
                Some(m) => m,
                None => continue,
            };
            let alpha = T::from_re(xi * factor);
            for r in 0 .. rmax[od.i1] {
                for c in 0 .. rmax[od.ip] {
                    let v = alpha * fblk[(r, c)];
                    let (a, b) = (offs[od.i1] + r, offs[od.ip] + c);
                    h[(a, b)] = h[(a, b)] + v;
                    h[(b, a)] = h[(b, a)] + v.conj();
                }
            }
        }
    }

    h
}

/// Construct the chain-extension operator blocks of the freshly
/// diagonalized iteration.  No old operator enters: `f†` acts on the new
/// site, so a rule contributes exactly when both combinations descend from
/// the *same* ancestor subspace.
pub fn recalc_f<T: Scalar>(
    sym: &Symmetry,
    diag: &DiagInfo<T>,
    structure: &SubspaceStructure,
) -> Opch<T> {
    let tables = sym.tables();
    let mut opch = Vec::with_capacity(sym.channels());
    for ch in 0 .. sym.channels() {
        let mut per_ch = Vec::with_capacity(sym.f_ops_per_channel());
        for fnr in 0 .. sym.f_ops_per_channel() {
            let rules = &tables.recalc_f[ch][fnr];
            let mut elements = MatrixElements::new();
            for (i1, eig1) in &diag.subspaces {
                if eig1.nrstored == 0 {
                    continue;
                }
                let anc1 = structure.ancestors(i1);
                for shift in sym.f_shifts(fnr) {
                    let ip = *i1 - shift;
                    let eigp = match diag.subspaces.get(&ip) {
                        Some(e) if e.nrstored > 0 => e,
                        _ => continue,
                    };
                    debug_assert!(sym.recalc_f_coupled(i1, &ip));
                    let ancp = structure.ancestors(&ip);
                    let mut cn =
                        Mat::zero(eig1.nrstored, eigp.nrstored);
                    let mut touched = false;
                    for rule in rules {
                        if anc1[rule.i1] != ancp[rule.ip] {
                            continue;
                        }
                        if eig1.rmax[rule.i1] == 0 {
                            continue;
                        }
                        let factor = (rule.factor)(i1, &ip);
                        if factor == 0.0 {
                            continue;
                        }
                        project_block(factor, eig1, rule.i1,
                                      eigp, rule.ip, None, &mut cn);
                        touched = true;
                    }
                    if touched {
                        elements.insert((*i1, ip), cn);
                    }
                }
            }
            per_ch.push(elements);
        }
        opch.push(per_ch);
    }
    opch
}

/// Project the blocks of a tracked operator into the new eigenbases.  The
/// operator acts on the accumulated chain, so each rule pulls in the old
/// block between the two ancestors.
pub fn recalc_general<T: Scalar>(
    sym: &Symmetry,
    diag: &DiagInfo<T>,
    structure: &SubspaceStructure,
    old: &MatrixElements<T>,
    kind: &OpKind,
) -> MatrixElements<T> {
    let rules = sym.tables().recalc_rules(kind.trank());
    let shifts = sym.op_shifts(kind);
    let mut out = MatrixElements::new();
    for (i1, eig1) in &diag.subspaces {
        if eig1.nrstored == 0 {
            continue;
        }
        let anc1 = structure.ancestors(i1);
        for shift in &shifts {
            let ip = *i1 - *shift;
            let eigp = match diag.subspaces.get(&ip) {
                Some(e) if e.nrstored > 0 => e,
                _ => continue,
            };
            let ancp = structure.ancestors(&ip);
            let mut cn = Mat::zero(eig1.nrstored, eigp.nrstored);
            let mut touched = false;
            for rule in rules {
                if eig1.rmax[rule.i1] == 0 || eigp.rmax[rule.ip] == 0 {
                    continue;
                }
                let oldblk =
                    match old.get(&(anc1[rule.i1], ancp[rule.ip])) {
                        Some(m) => m,
                        None => continue,
                    };
                let factor = (rule.factor)(i1, &ip);
                if factor == 0.0 {
                    continue;
                }
                project_block(factor, eig1, rule.i1,
                              eigp, rule.ip, Some(oldblk), &mut cn);
                touched = true;
            }
            if touched {
                out.insert((*i1, ip), cn);
            }
        }
    }
    out
}

/// Project an additive conserved observable: the inherited chain part plus
/// the site contribution of each combination (both diagonal in `Invar` and
/// in the combination index).
pub fn recalc_global<T: Scalar>(
    sym: &Symmetry,
    diag: &DiagInfo<T>,
    structure: &SubspaceStructure,
    old: &MatrixElements<T>,
    name: &str,
) -> MatrixElements<T> {
    let rules = sym.tables().global_rules(name);
    let mut out = MatrixElements::new();
    for (i, eigen) in &diag.subspaces {
        if eigen.nrstored == 0 {
            continue;
        }
        let anc = structure.ancestors(i);
        let mut cn = Mat::zero(eigen.nrstored, eigen.nrstored);
        let mut touched = false;
        for comb in 0 .. eigen.rmax.len() {
            if eigen.rmax[comb] == 0 {
                continue;
            }
            if let Some(oldblk) = old.get(&(anc[comb], anc[comb])) {
                project_block(1.0, eigen, comb, eigen, comb,
                              Some(oldblk), &mut cn);
                touched = true;
            }
        }
        for rule in rules {
            if eigen.rmax[rule.comb] == 0 || rule.value == 0.0 {
                continue;
            }
            project_block(rule.value, eigen, rule.comb,
                          eigen, rule.comb, None, &mut cn);
            touched = true;
        }
        if touched {
            out.insert((*i, *i), cn);
        }
    }
    out
}
