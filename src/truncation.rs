//! Truncation policy.
//!
//! The decision works on the merged, globally sorted level list of one
//! iteration and is a pure function of that list and the parameters, so it
//! can be unit-tested without running any diagonalization.  Applying a
//! decision only ever adjusts the kept and stored counters of each
//! subspace; no eigenvalues or eigenvectors are discarded here.
use super::invar::Invar;
use super::linalg::Scalar;
use super::params::{Params, Strategy};
use super::subspaces::DiagInfo;
use super::symmetry::Symmetry;

/// One energy level of the merged spectrum.  For SU(2) symmetries a level
/// stands for a whole multiplet and `mult` counts its states.
#[derive(Clone, Debug, PartialEq)]
pub struct Level {
    pub invar: Invar,
    /// Position within the subspace.
    pub index: usize,
    pub energy: f64,
    pub mult: usize,
}

/// Truncation demanded more states than the partial diagonalization
/// computed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Shortfall {
    pub wanted: usize,
    pub computed: usize,
}

/// Merge the spectra of all subspaces into one list sorted by energy.
/// Ties are broken by subspace label so the outcome never depends on map
/// iteration details.
pub fn collect_levels<T: Scalar>(
    sym: &Symmetry,
    diag: &DiagInfo<T>,
) -> Vec<Level> {
    let mut levels = Vec::with_capacity(diag.total_computed());
    for (inv, eigen) in &diag.subspaces {
        let mult = sym.mult(inv);
        for (index, &energy) in eigen.values.iter().enumerate() {
            levels.push(Level { invar: *inv, index, energy, mult });
        }
    }
    levels.sort_by(|a, b| {
        a.energy
            .partial_cmp(&b.energy)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.invar.cmp(&b.invar))
            .then(a.index.cmp(&b.index))
    });
    levels
}

/// Decide how many levels of the sorted list survive.
///
/// The energy cutoff `keepenergy` takes precedence when set; `keep` caps
/// and `keepmin` floors the multiplicity-weighted state count.  The ground
/// level always survives, even when its multiplet alone overflows `keep`.
/// The degeneracy safeguard then extends the kept set while the gap at the
/// boundary stays below `safeguard`, spending at most `safeguardmax` extra
/// states, so a (near-)degenerate multiplet is never split.  With a
/// partial spectrum (`partial`), running out of computed levels before the
/// decision settles is a [`Shortfall`].
pub fn decide(
    levels: &[Level],
    p: &Params,
    partial: bool,
) -> Result<usize, Shortfall> {
    let mut kept = 0;
    let mut states = 0;
    for (idx, level) in levels.iter().enumerate() {
        let within_energy =
            p.keepenergy <= 0.0 || level.energy < p.keepenergy;
        if !within_energy && states >= p.keepmin {
            break;
        }
        if kept > 0 && states + level.mult > p.keep {
            break;
        }
        kept = idx + 1;
        states += level.mult;
    }
    if p.safeguard > 0.0 {
        let mut extra = 0;
        while kept > 0 && kept < levels.len() {
            let gap = levels[kept].energy - levels[kept - 1].energy;
            if gap >= p.safeguard {
                break;
            }
            if extra + levels[kept].mult > p.safeguardmax {
                break;
            }
            extra += levels[kept].mult;
            kept += 1;
        }
    }
    if partial && kept == levels.len() {
        // the boundary may lie beyond the computed spectrum
        Err(Shortfall {
            wanted: kept + 1,
            computed: levels.len(),
        })
    } else {
        Ok(kept)
    }
}

/// Check an applied decision against the computed bands.  A partially
/// diagonalized subspace whose computed states were all kept cannot prove
/// that its band reaches past the truncation boundary; states below the
/// boundary may be missing from it, so the decision must be redone with a
/// larger band.
pub fn bracketed<T: Scalar>(diag: &DiagInfo<T>) -> Result<(), Shortfall> {
    for eigen in diag.subspaces.values() {
        let computed = eigen.nrcomputed();
        if computed < eigen.dim() && eigen.nrkept == computed {
            return Err(Shortfall {
                wanted: computed + 1,
                computed,
            });
        }
    }
    Ok(())
}

/// Record a decision in the registry: the first `kept` levels of the
/// sorted list survive, everything else is truncated away.  Under the
/// `all` strategy the stored counts remain at the computed size.
pub fn apply<T: Scalar>(
    diag: &mut DiagInfo<T>,
    levels: &[Level],
    kept: usize,
    strategy: Strategy,
) {
    for eigen in diag.subspaces.values_mut() {
        eigen.nrkept = 0;
    }
    for level in &levels[.. kept] {
        if let Some(eigen) = diag.subspaces.get_mut(&level.invar) {
            // levels are sorted, so per subspace this grows contiguously
            eigen.nrkept = eigen.nrkept.max(level.index + 1);
        }
    }
    for eigen in diag.subspaces.values_mut() {
        eigen.nrstored = match strategy {
            Strategy::Kept => eigen.nrkept,
            Strategy::All => eigen.nrcomputed(),
        };
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use super::super::mat::Mat;
    use super::super::subspaces::Eigen;
    use super::*;

    fn level(q: i32, index: usize, energy: f64) -> Level {
        Level { invar: Invar::new(&[q]), index, energy, mult: 1 }
    }

    fn params() -> Params {
        let mut p = Params::default();
        p.symtype = "U1".to_owned();
        p.keep = 1000;
        p.keepenergy = 0.0;
        p.keepmin = 0;
        p.safeguard = 0.0;
        p
    }

    #[test]
    fn keep_caps_state_count() {
        let levels: Vec<_> =
            (0 .. 10).map(|k| level(0, k, k as f64)).collect();
        let mut p = params();
        p.keep = 4;
        assert_eq!(decide(&levels, &p, false), Ok(4));
    }

    #[test]
    fn energy_cutoff_takes_precedence() {
        let levels: Vec<_> =
            (0 .. 10).map(|k| level(0, k, 0.2 * k as f64)).collect();
        let mut p = params();
        p.keepenergy = 1.0;
        // levels 0.0 .. 0.8 lie below the cutoff
        assert_eq!(decide(&levels, &p, false), Ok(5));
    }

    #[test]
    fn keepmin_overrides_cutoff() {
        let levels: Vec<_> =
            (0 .. 10).map(|k| level(0, k, 1.0 + k as f64)).collect();
        let mut p = params();
        p.keepenergy = 0.5;
        p.keepmin = 3;
        assert_eq!(decide(&levels, &p, false), Ok(3));
    }

    #[test]
    fn safeguard_does_not_split_near_degeneracies() {
        let levels = vec![
            level(0, 0, 0.0),
            level(1, 0, 0.49999999),
            level(-1, 0, 0.50000003),
            level(0, 1, 0.9),
        ];
        let mut p = params();
        p.keepenergy = 0.5;
        p.safeguard = 1e-5;
        p.safeguardmax = 10;
        // the cutoff would cut between the two nearly degenerate levels;
        // the safeguard pulls the upper one in but stops at the 0.4 gap
        assert_eq!(decide(&levels, &p, false), Ok(3));
    }

    #[test]
    fn safeguard_budget_is_bounded() {
        let levels: Vec<_> =
            (0 .. 10).map(|k| level(0, k, 1e-9 * k as f64)).collect();
        let mut p = params();
        p.keep = 2;
        p.safeguard = 1e-5;
        p.safeguardmax = 3;
        assert_eq!(decide(&levels, &p, false), Ok(5));
    }

    #[test]
    fn multiplets_are_weighted() {
        let levels = vec![
            Level { invar: Invar::new(&[0]), index: 0,
                    energy: 0.0, mult: 1 },
            Level { invar: Invar::new(&[1]), index: 0,
                    energy: 0.1, mult: 4 },
            Level { invar: Invar::new(&[2]), index: 0,
                    energy: 0.2, mult: 1 },
        ];
        let mut p = params();
        p.keep = 4;
        // the quadruplet would overflow the cap
        assert_eq!(decide(&levels, &p, false), Ok(1));
    }

    #[test]
    fn ground_multiplet_survives_a_tiny_cap() {
        let levels = vec![
            Level { invar: Invar::new(&[0, 3]), index: 0,
                    energy: 0.0, mult: 4 },
            Level { invar: Invar::new(&[1, 1]), index: 0,
                    energy: 1.0, mult: 1 },
        ];
        let mut p = params();
        p.keep = 1;
        // the cap cannot empty the registry
        assert_eq!(decide(&levels, &p, false), Ok(1));
    }

    fn partial_eigen(computed: usize, dim: usize,
                     nrkept: usize) -> Eigen<f64> {
        Eigen {
            values: (0 .. computed).map(|k| k as f64).collect(),
            absvalues: (0 .. computed).map(|k| k as f64).collect(),
            vectors: Mat::zero(computed, dim),
            rmax: vec![dim],
            nrkept,
            nrstored: nrkept,
        }
    }

    #[test]
    fn consumed_partial_band_is_a_shortfall() {
        let mut subspaces = BTreeMap::new();
        // 2 of 3 states computed, both kept: the band may stop short
        // of the boundary
        subspaces.insert(Invar::new(&[0]), partial_eigen(2, 3, 2));
        subspaces.insert(Invar::new(&[1]), partial_eigen(2, 4, 1));
        let diag = DiagInfo { subspaces };
        assert_eq!(bracketed(&diag),
                   Err(Shortfall { wanted: 3, computed: 2 }));
    }

    #[test]
    fn bands_that_reach_past_the_boundary_are_fine() {
        let mut subspaces = BTreeMap::new();
        // each truncated band has an unkept computed state above the
        // boundary, and fully diagonalized subspaces may keep everything
        subspaces.insert(Invar::new(&[0]), partial_eigen(3, 5, 2));
        subspaces.insert(Invar::new(&[1]), partial_eigen(2, 2, 2));
        let diag = DiagInfo { subspaces };
        assert_eq!(bracketed(&diag), Ok(()));
    }

    #[test]
    fn partial_spectrum_shortfall() {
        let levels: Vec<_> =
            (0 .. 5).map(|k| level(0, k, k as f64)).collect();
        let mut p = params();
        p.keep = 10;
        assert_eq!(
            decide(&levels, &p, true),
            Err(Shortfall { wanted: 6, computed: 5 })
        );
        // a full spectrum with the same data simply keeps everything
        assert_eq!(decide(&levels, &p, false), Ok(5));
    }

    #[test]
    fn decision_is_idempotent() {
        let levels: Vec<_> =
            (0 .. 10).map(|k| level(0, k, 0.3 * k as f64)).collect();
        let p = {
            let mut p = params();
            p.keep = 6;
            p.safeguard = 1e-5;
            p
        };
        let kept = decide(&levels, &p, false).unwrap();
        assert_eq!(decide(&levels[.. kept].to_vec(), &p, false), Ok(kept));
    }
}
