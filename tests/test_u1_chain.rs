//! Cross-checks of the U1 engine against brute-force exact
//! diagonalization of the same rescaled chain Hamiltonian in the full
//! Fock space, with Jordan–Wigner signs spelled out by hand.
extern crate kondo;
extern crate rand;
extern crate rand_xorshift;

use std::collections::BTreeMap;
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;
use kondo::invar::Invar;
use kondo::linalg::{EigenvalueRange, Part, Transpose, gemm, heevr};
use kondo::mat::Mat;
use kondo::nrg::Run;
use kondo::params::Params;
use kondo::step::ChainCoefs;
use kondo::symmetry::OpKind;
use kondo::truncation;

const TOLER: f64 = 1e-8;

fn identity(n: usize) -> Mat<f64> {
    let mut id = Mat::zero(n, n);
    for i in 0 .. n {
        id[(i, i)] = 1.0;
    }
    id
}

fn kron(a: &Mat<f64>, b: &Mat<f64>) -> Mat<f64> {
    let (ar, ac) = a.dims();
    let (br, bc) = b.dims();
    let mut out = Mat::zero(ar * br, ac * bc);
    for i in 0 .. ar {
        for j in 0 .. ac {
            if a[(i, j)] == 0.0 {
                continue;
            }
            for k in 0 .. br {
                for l in 0 .. bc {
                    out[(i * br + k, j * bc + l)] = a[(i, j)] * b[(k, l)];
                }
            }
        }
    }
    out
}

/// `c†_σ` on one spinful orbital over `{|0⟩, |↑⟩, |↓⟩, |↑↓⟩}`.
fn local_cre(spin: usize) -> Mat<f64> {
    let mut c = Mat::zero(4, 4);
    if spin == 0 {
        c[(1, 0)] = 1.0;
        c[(3, 2)] = 1.0;
    } else {
        c[(2, 0)] = 1.0;
        c[(3, 1)] = -1.0;
    }
    c
}

fn local_parity() -> Mat<f64> {
    Mat::from_rows(vec![
        vec![1.0, 0.0, 0.0, 0.0],
        vec![0.0, -1.0, 0.0, 0.0],
        vec![0.0, 0.0, -1.0, 0.0],
        vec![0.0, 0.0, 0.0, 1.0],
    ])
}

/// Creation operators of a one-channel chain of `sites` spinful orbitals,
/// indexed `[site][spin]`, over the `4^sites` Fock space.
fn chain_cre(sites: usize) -> Vec<Vec<Mat<f64>>> {
    let parity = local_parity();
    (0 .. sites)
        .map(|j| {
            (0 .. 2)
                .map(|spin| {
                    let mut op = identity(1);
                    for _ in 0 .. j {
                        op = kron(&op, &parity);
                    }
                    op = kron(&op, &local_cre(spin));
                    for _ in j + 1 .. sites {
                        op = kron(&op, &identity(4));
                    }
                    op
                })
                .collect()
        })
        .collect()
}

/// `out += s · a bᵀ`
fn acc_ab_t(out: &mut Mat<f64>, s: f64, a: &Mat<f64>, b: &Mat<f64>) {
    gemm(Transpose::None, Transpose::Ordinary, s, a, b, 1.0, out);
}

/// Spectrum (shifted to ground zero) of the recursively rescaled chain
/// Hamiltonian on `sites` sites.
fn ed_spectrum(
    lambda: f64,
    xi: &[f64],
    zeta: &[f64],
    sites: usize,
) -> Vec<f64> {
    let cre = chain_cre(sites);
    let dim = 4usize.pow(sites as u32);
    let mut h = Mat::zero(dim, dim);
    for n in 0 .. sites {
        if n > 0 {
            let s = lambda.sqrt();
            for v in h.as_slice_mut() {
                *v *= s;
            }
        }
        for spin in 0 .. 2 {
            acc_ab_t(&mut h, zeta[n], &cre[n][spin], &cre[n][spin]);
            if n > 0 {
                acc_ab_t(&mut h, xi[n - 1],
                         &cre[n - 1][spin], &cre[n][spin]);
                acc_ab_t(&mut h, xi[n - 1],
                         &cre[n][spin], &cre[n - 1][spin]);
            }
        }
    }
    let (mut w, _) =
        heevr(EigenvalueRange::All, Part::Upper, &mut h).unwrap();
    let gs = w[0];
    for v in &mut w {
        *v -= gs;
    }
    w
}

/// The merged iteration spectrum, multiplicity-expanded and sorted.
fn nrg_levels(run: &Run<f64>) -> Vec<f64> {
    truncation::collect_levels(&run.sym, &run.diag)
        .iter()
        .flat_map(|l| std::iter::repeat(l.energy).take(l.mult))
        .collect()
}

fn untruncated_params(symtype: &str, channels: usize, lambda: f64,
                      nmax: usize) -> Params {
    let mut p = Params::default();
    p.symtype = symtype.to_owned();
    p.channels = channels;
    p.lambda = lambda;
    p.nmax = nmax;
    p.keep = 1_000_000;
    p
}

#[test]
fn single_channel_matches_exact_diagonalization() {
    let mut rng = XorShiftRng::seed_from_u64(0xd03e_57a1);
    let lambda = 2.5;
    let xi: Vec<f64> =
        (0 .. 4).map(|_| rng.gen_range(0.5 .. 1.5)).collect();
    let zeta: Vec<f64> =
        (0 .. 4).map(|_| rng.gen_range(-0.3 .. 0.3)).collect();
    let coefs =
        ChainCoefs::new(vec![xi.clone()], vec![zeta.clone()]).unwrap();
    let mut run: Run<f64> =
        Run::new(untruncated_params("U1", 1, lambda, 2), coefs).unwrap();
    for sites in 1 ..= 3 {
        run.step().unwrap();
        let got = nrg_levels(&run);
        let want = ed_spectrum(lambda, &xi, &zeta, sites);
        assert_eq!(got.len(), want.len());
        for (k, (g, w)) in got.iter().zip(&want).enumerate() {
            assert!((g - w).abs() < TOLER,
                    "{} site(s), level {}: {} vs {}", sites, k, g, w);
        }
    }
}

#[test]
fn two_channels_match_exact_diagonalization() {
    let mut rng = XorShiftRng::seed_from_u64(0x2cb1_94ee);
    let lambda = 3.0;
    let xi: Vec<Vec<f64>> = (0 .. 2)
        .map(|_| (0 .. 3).map(|_| rng.gen_range(0.5 .. 1.5)).collect())
        .collect();
    let zeta: Vec<Vec<f64>> = (0 .. 2)
        .map(|_| (0 .. 3).map(|_| rng.gen_range(-0.3 .. 0.3)).collect())
        .collect();
    let coefs = ChainCoefs::new(xi.clone(), zeta.clone()).unwrap();
    let mut run: Run<f64> =
        Run::new(untruncated_params("U1", 2, lambda, 1), coefs).unwrap();

    // reference: two sites of two channels each; orbital order is
    // (site, channel), parity strings over whole preceding sites
    let parity4 = local_parity();
    let site_parity = kron(&parity4, &parity4);
    let site_cre = |ch: usize, spin: usize| -> Mat<f64> {
        if ch == 0 {
            kron(&local_cre(spin), &identity(4))
        } else {
            kron(&parity4, &local_cre(spin))
        }
    };
    let cre = |sites: usize, site: usize, ch: usize, spin: usize|
            -> Mat<f64> {
        let mut op = identity(1);
        for _ in 0 .. site {
            op = kron(&op, &site_parity);
        }
        op = kron(&op, &site_cre(ch, spin));
        for _ in site + 1 .. sites {
            op = kron(&op, &identity(16));
        }
        op
    };
    for sites in 1 ..= 2 {
        run.step().unwrap();
        let dim = 16usize.pow(sites as u32);
        let mut h = Mat::zero(dim, dim);
        for n in 0 .. sites {
            if n > 0 {
                let s = lambda.sqrt();
                for v in h.as_slice_mut() {
                    *v *= s;
                }
            }
            for ch in 0 .. 2 {
                for spin in 0 .. 2 {
                    let cn = cre(sites, n, ch, spin);
                    acc_ab_t(&mut h, zeta[ch][n], &cn, &cn);
                    if n > 0 {
                        let cp = cre(sites, n - 1, ch, spin);
                        acc_ab_t(&mut h, xi[ch][n - 1], &cp, &cn);
                        acc_ab_t(&mut h, xi[ch][n - 1], &cn, &cp);
                    }
                }
            }
        }
        let (mut want, _) =
            heevr(EigenvalueRange::All, Part::Upper, &mut h).unwrap();
        let gs = want[0];
        for v in &mut want {
            *v -= gs;
        }
        let got = nrg_levels(&run);
        assert_eq!(got.len(), want.len());
        for (k, (g, w)) in got.iter().zip(&want).enumerate() {
            assert!((g - w).abs() < TOLER,
                    "{} site(s), level {}: {} vs {}", sites, k, g, w);
        }
    }
}

#[test]
fn tracked_global_charge_stays_diagonal() {
    let lambda = 2.0;
    let coefs = ChainCoefs::flat_band(lambda, 1, 8);
    let mut p = untruncated_params("U1", 1, lambda, 5);
    p.keep = 12;
    let mut run: Run<f64> = Run::new(p, coefs).unwrap();
    let mut seed = BTreeMap::new();
    seed.insert((Invar::new(&[0]), Invar::new(&[0])), Mat::zero(1, 1));
    run.track("Qtot", OpKind::Global("Qtot".to_owned()), seed);
    run.run().unwrap();

    let op = run.ops.get("Qtot").unwrap();
    for (&(i1, ip), blk) in &op.elements {
        assert_eq!(i1, ip);
        let q = f64::from(i1[0]);
        for r in 0 .. blk.num_rows() {
            for c in 0 .. blk.num_cols() {
                let want = if r == c { q } else { 0.0 };
                assert!((blk[(r, c)] - want).abs() < 1e-9,
                        "Qtot[{}][({}, {})] = {}", i1, r, c, blk[(r, c)]);
            }
        }
    }
    // every surviving subspace carries its block
    for (inv, eigen) in &run.diag.subspaces {
        if eigen.nrstored > 0 {
            assert!(op.elements.contains_key(&(*inv, *inv)),
                    "missing Qtot block for {}", inv);
        }
    }
}
