//! Truncation and restart behavior of whole runs.
extern crate kondo;

use kondo::errors::Error;
use kondo::invar::Invar;
use kondo::linalg::{EigenvalueRange, Part, heevr};
use kondo::mat::Mat;
use kondo::nrg::Run;
use kondo::params::Params;
use kondo::step::ChainCoefs;
use kondo::truncation;

const TOLER: f64 = 1e-9;

fn params(nmax: usize) -> Params {
    let mut p = Params::default();
    p.symtype = "U1".to_owned();
    p.channels = 1;
    p.lambda = 2.0;
    p.nmax = nmax;
    p.keep = 1_000_000;
    p
}

fn levels(run: &Run<f64>) -> Vec<f64> {
    truncation::collect_levels(&run.sym, &run.diag)
        .iter()
        .map(|l| l.energy)
        .collect()
}

#[test]
fn restart_recovers_the_full_spectrum() {
    let coefs = ChainCoefs::flat_band(2.0, 1, 5);
    let mut full: Run<f64> = Run::new(params(3), coefs.clone()).unwrap();
    let mut partial: Run<f64> = {
        let mut p = params(3);
        p.diagratio = 0.3;
        p.restart = true;
        p.restartfactor = 2.0;
        Run::new(p, coefs).unwrap()
    };
    for _ in 0 ..= 3 {
        full.step().unwrap();
        partial.step().unwrap();
        // everything must be kept, the shortfalls having been resolved
        // by restarting at a larger diagonalization ratio
        let a = levels(&full);
        let b = levels(&partial);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < TOLER, "{} vs {}", x, y);
        }
    }
}

#[test]
fn shortfall_without_restart_is_an_error() {
    let coefs = ChainCoefs::flat_band(2.0, 1, 5);
    let mut p = params(3);
    p.diagratio = 0.2;
    p.restart = false;
    let mut run: Run<f64> = Run::new(p, coefs).unwrap();
    match run.step() {
        Err(Error::TruncationShortfall(wanted, computed)) => {
            assert!(wanted > computed);
        }
        other => panic!("expected TruncationShortfall, got {:?}",
                        other.err()),
    }
}

#[test]
fn consumed_partial_band_triggers_a_shortfall() {
    // after the untruncated first site, half of each block is computed;
    // the 8 kept levels then consume some block's band entirely, so the
    // boundary is unproven even though computed levels remain globally
    let coefs = ChainCoefs::flat_band(2.0, 1, 5);
    let mut p = params(3);
    p.keep = 8;
    p.safeguard = 0.0;
    p.ninit = 1;
    p.diagratio = 0.5;
    p.restart = false;
    let mut run: Run<f64> = Run::new(p, coefs).unwrap();
    run.step().unwrap();
    match run.step() {
        Err(Error::TruncationShortfall(wanted, computed)) => {
            assert!(wanted > computed);
        }
        other => panic!("expected TruncationShortfall, got {:?}",
                        other.err()),
    }
}

#[test]
fn uniform_chain_keeps_exactly_four_states() {
    let coefs =
        ChainCoefs::new(vec![vec![1.0; 4]], vec![vec![0.0; 4]]).unwrap();
    let mut p = params(3);
    p.keep = 4;
    p.safeguard = 0.0;
    let mut run: Run<f64> = Run::new(p, coefs).unwrap();
    run.run().unwrap();
    assert_eq!(run.diag.total_kept(), 4);
    // chain-extension blocks pair surviving subspaces and carry their
    // stored dimensions
    let mut blocks = 0;
    for fnr in 0 .. 2 {
        for (&(i1, ip), blk) in &run.opch[0][fnr] {
            let e1 = run.diag.get(&i1).unwrap();
            let ep = run.diag.get(&ip).unwrap();
            assert_eq!(blk.dims(), (e1.nrstored, ep.nrstored));
            blocks += 1;
        }
    }
    assert!(blocks > 0);
}

#[test]
fn truncated_f_blocks_match_the_orbital_projection() {
    // four sites, unit hopping fed in, truncation deferred to the last
    // iteration so the 4 survivors are eigenstates of the exact chain
    let lambda: f64 = 2.0;
    let coefs =
        ChainCoefs::new(vec![vec![1.0; 4]], vec![vec![0.0; 4]]).unwrap();
    let mut p = params(3);
    p.keep = 4;
    p.safeguard = 0.0;
    p.ninit = 3;
    let mut run: Run<f64> = Run::new(p, coefs).unwrap();
    run.run().unwrap();
    assert_eq!(run.diag.total_kept(), 4);

    // the recursive rescaling turns the unit couplings into
    // single-particle hoppings (Λ, √Λ, 1) by the last iteration
    let mut t = Mat::zero(4, 4);
    let hop = [lambda, lambda.sqrt(), 1.0];
    for j in 0 .. 3 {
        t[(j, j + 1)] = hop[j];
        t[(j + 1, j)] = hop[j];
    }
    let (eps, orbitals) =
        heevr(EigenvalueRange::All, Part::Upper, &mut t).unwrap();
    assert!(eps[1] < 0.0 && eps[2] > 0.0);
    // survivors: the half-filled ground state plus three of the four
    // degenerate frontier excitations, so one frontier doublet is kept
    // whole and the other loses a state; the chain-extension elements
    // are the last-site weights of the frontier orbitals
    let c2 = orbitals[(1, 3)].powi(2);
    let keys = [(Invar::new(&[0]), Invar::new(&[-1])),
                (Invar::new(&[1]), Invar::new(&[0]))];
    let mut norms = Vec::new();
    for key in &keys {
        let mut norm = 0.0;
        for fnr in 0 .. 2 {
            if let Some(blk) = run.opch[0][fnr].get(key) {
                for r in 0 .. blk.num_rows() {
                    for c in 0 .. blk.num_cols() {
                        norm += blk[(r, c)].powi(2);
                    }
                }
            }
        }
        norms.push(norm);
    }
    norms.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert!((norms[0] - c2).abs() < 1e-8,
            "{} vs {}", norms[0], c2);
    assert!((norms[1] - 2.0 * c2).abs() < 1e-8,
            "{} vs {}", norms[1], 2.0 * c2);
}

#[test]
fn last_iteration_can_keep_everything() {
    let coefs = ChainCoefs::flat_band(2.0, 1, 5);
    let mut p = params(3);
    p.keep = 10;
    p.lastall = true;
    let mut run: Run<f64> = Run::new(p, coefs).unwrap();
    run.run().unwrap();
    // no truncation on the final iteration
    for eigen in run.diag.subspaces.values() {
        assert_eq!(eigen.nrkept, eigen.nrcomputed());
    }
    assert!(run.diag.total_kept() > 10);
}

#[test]
fn ninit_defers_truncation() {
    let coefs = ChainCoefs::flat_band(2.0, 1, 5);
    let mut p = params(3);
    p.keep = 4;
    p.ninit = 2;
    let mut run: Run<f64> = Run::new(p, coefs).unwrap();
    run.step().unwrap();
    assert_eq!(run.diag.total_kept(), run.diag.total_computed());
    run.step().unwrap();
    assert_eq!(run.diag.total_kept(), run.diag.total_computed());
    // now the cap bites
    run.step().unwrap();
    assert!(run.diag.total_kept() < run.diag.total_computed());
}
