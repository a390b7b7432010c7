//! `U(1)_charge × U(1)_spin` symmetry: `Invar = (Q, SSZ)` with `SSZ` twice
//! the total `S_z`.  Spin-resolved selection rules, single channel.
use super::coeffs::{self, CoefTables};
use super::errors::Error;
use super::invar::Invar;
use super::site::Site;
use super::symmetry::{OpKind, SymmetryOps, TdWeights, exception_listed};

const EXCEPTIONS: &[(usize, usize, Invar)] = &[];

pub struct QszSym {
    site: Site,
}

impl QszSym {
    pub fn new(channels: usize) -> Result<Self, Error> {
        if channels != 1 {
            return Err(Error::UnsupportedChannels("QSZ", channels));
        }
        Ok(QszSym {
            site: Site::new(1),
        })
    }
}

impl SymmetryOps for QszSym {
    fn name(&self) -> &'static str {
        "QSZ"
    }

    fn channels(&self) -> usize {
        1
    }

    fn qn_len(&self) -> usize {
        2
    }

    fn nr_combs(&self) -> usize {
        self.site.dim()
    }

    fn f_ops_per_channel(&self) -> usize {
        2
    }

    fn mult(&self, _i: &Invar) -> usize {
        1
    }

    fn invar_allowed(&self, _i: &Invar) -> bool {
        true
    }

    fn comb_shift(&self, comb: usize) -> Invar {
        Invar::new(&[self.site.charge(comb), self.site.tsz(comb)])
    }

    fn f_shifts(&self, fnr: usize) -> Vec<Invar> {
        match fnr {
            0 => vec![Invar::new(&[1, 1])],
            1 => vec![Invar::new(&[1, -1])],
            _ => unreachable!(),
        }
    }

    fn triangle_inequality(&self, i1: &Invar, ip: &Invar,
                           iop: &Invar) -> bool {
        *i1 == *ip + *iop
    }

    fn recalc_f_coupled(&self, i1: &Invar, ip: &Invar) -> bool {
        i1[0] - ip[0] == 1 && (i1[1] - ip[1]).abs() == 1
    }

    fn op_shifts(&self, kind: &OpKind) -> Vec<Invar> {
        match *kind {
            OpKind::Singlet | OpKind::Global(_) => vec![Invar::new(&[0, 0])],
            OpKind::Doublet => {
                vec![Invar::new(&[1, 1]), Invar::new(&[1, -1])]
            }
            OpKind::Triplet => vec![
                Invar::new(&[0, 2]),
                Invar::new(&[0, 0]),
                Invar::new(&[0, -2]),
            ],
        }
    }

    fn offdiag_exception(&self, i1: usize, ip: usize, i: &Invar) -> bool {
        exception_listed(EXCEPTIONS, i1, ip, i)
    }

    fn td_weights(&self, i: &Invar) -> TdWeights {
        let q = f64::from(i[0]);
        let sz = f64::from(i[1]) / 2.0;
        TdWeights {
            q,
            q2: q * q,
            sz2: Some(sz * sz),
        }
    }

    fn vacuum_invar(&self) -> Invar {
        Invar::new(&[0, 0])
    }

    fn build_tables(&self) -> CoefTables {
        coeffs::build_abelian(
            &self.site,
            &|site, s| Invar::new(&[site.charge(s), site.tsz(s)]),
            &[
                ("Qtot", &|site, s| f64::from(site.charge(s))),
                ("SZtot", &|site, s| f64::from(site.tsz(s)) / 2.0),
            ],
        )
    }
}
