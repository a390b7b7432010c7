//! Thermodynamic traces over the computed spectrum of each iteration.
//!
//! All averages are taken at the dimensionless inverse temperature
//! `betabar` with Boltzmann weights over the *shifted* eigenvalues, so the
//! partition function stays finite far down the chain.  Multiplet levels
//! enter with their full degeneracy.
use super::linalg::Scalar;
use super::subspaces::DiagInfo;
use super::symmetry::Symmetry;

/// One row of the thermodynamic output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TdPoint {
    pub n: usize,
    /// Energy scale of the iteration in units of the half bandwidth.
    pub scale: f64,
    /// Partition function at `betabar`.
    pub z: f64,
    /// `⟨H⟩` in rescaled units.
    pub e_avg: f64,
    pub q_avg: f64,
    pub q2_avg: f64,
    /// `⟨S_z²⟩`; absent when the symmetry does not resolve it.
    pub sz2_avg: Option<f64>,
}

pub fn measure<T: Scalar>(
    sym: &Symmetry,
    diag: &DiagInfo<T>,
    betabar: f64,
    n: usize,
    scale: f64,
) -> TdPoint {
    let mut z = 0.0;
    let mut e = 0.0;
    let mut q = 0.0;
    let mut q2 = 0.0;
    let mut sz2 = 0.0;
    let mut sz2_known = true;
    for (inv, eigen) in &diag.subspaces {
        let mult = sym.mult(inv) as f64;
        let tw = sym.td_weights(inv);
        for &energy in &eigen.values {
            let w = mult * (-betabar * energy).exp();
            z += w;
            e += w * energy;
            q += w * tw.q;
            q2 += w * tw.q2;
            match tw.sz2 {
                Some(v) => sz2 += w * v,
                None => sz2_known = false,
            }
        }
    }
    if z > 0.0 {
        e /= z;
        q /= z;
        q2 /= z;
        if sz2_known {
            sz2 /= z;
        }
    }
    TdPoint {
        n,
        scale,
        z,
        e_avg: e,
        q_avg: q,
        q2_avg: q2,
        sz2_avg: if sz2_known { Some(sz2) } else { None },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::invar::Invar;
    use super::super::mat::Mat;
    use super::super::subspaces::Eigen;
    use std::collections::BTreeMap;

    const TOLER: f64 = 1e-12;

    fn eigen(values: Vec<f64>) -> Eigen<f64> {
        let n = values.len();
        Eigen {
            absvalues: values.clone(),
            values,
            vectors: Mat::zero(n, n),
            rmax: vec![n],
            nrkept: n,
            nrstored: n,
        }
    }

    #[test]
    fn free_orbital_charge_fluctuations() {
        // one spinful site at the particle-hole symmetric point: states
        // Q = −1, 0 (twice), 1 all at the same energy
        let sym = Symmetry::new("U1", 1).unwrap();
        let mut subspaces = BTreeMap::new();
        subspaces.insert(Invar::new(&[-1]), eigen(vec![0.0]));
        subspaces.insert(Invar::new(&[0]), eigen(vec![0.0, 0.0]));
        subspaces.insert(Invar::new(&[1]), eigen(vec![0.0]));
        let diag = DiagInfo { subspaces };
        let td = measure(&sym, &diag, 1.0, 0, 1.0);
        assert!((td.z - 4.0).abs() < TOLER);
        assert!(td.q_avg.abs() < TOLER);
        assert!((td.q2_avg - 0.5).abs() < TOLER);
        assert_eq!(td.sz2_avg, None);
    }

    #[test]
    fn boltzmann_weighting() {
        let sym = Symmetry::new("QSZ", 1).unwrap();
        let mut subspaces = BTreeMap::new();
        subspaces.insert(Invar::new(&[0, 0]), eigen(vec![0.0]));
        subspaces.insert(Invar::new(&[1, 1]), eigen(vec![1.0]));
        let diag = DiagInfo { subspaces };
        let td = measure(&sym, &diag, 2.0, 3, 0.25);
        let w = (-2.0f64).exp();
        assert!((td.z - (1.0 + w)).abs() < TOLER);
        assert!((td.e_avg - w / (1.0 + w)).abs() < TOLER);
        assert!((td.q_avg - w / (1.0 + w)).abs() < TOLER);
        let sz2 = td.sz2_avg.unwrap();
        assert!((sz2 - 0.25 * w / (1.0 + w)).abs() < TOLER);
    }

    #[test]
    fn multiplets_carry_their_degeneracy() {
        // QS: a spin doublet (SS = 2) against a singlet
        let sym = Symmetry::new("QS", 1).unwrap();
        let mut subspaces = BTreeMap::new();
        subspaces.insert(Invar::new(&[0, 1]), eigen(vec![0.0]));
        subspaces.insert(Invar::new(&[1, 2]), eigen(vec![0.0]));
        let diag = DiagInfo { subspaces };
        let td = measure(&sym, &diag, 1.0, 0, 1.0);
        assert!((td.z - 3.0).abs() < TOLER);
        // ⟨S_z²⟩ of the doublet is 1/4, weighted 2 of 3 states
        let sz2 = td.sz2_avg.unwrap();
        assert!((sz2 - 2.0 / 3.0 * 0.25).abs() < TOLER);
    }
}
