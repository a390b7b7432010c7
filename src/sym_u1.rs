//! Charge-only `U(1)` symmetry: `Invar = (Q)` with `Q` the total charge
//! relative to half filling.  The site is spinful; one or two channels are
//! supported.  All coefficients are site matrix elements times fermionic
//! parity signs, so the tables come straight out of the generic abelian
//! builder.
use super::coeffs::{self, CoefTables};
use super::errors::Error;
use super::invar::Invar;
use super::site::Site;
use super::symmetry::{OpKind, SymmetryOps, TdWeights, exception_listed};

const EXCEPTIONS: &[(usize, usize, Invar)] = &[];

pub struct U1Sym {
    channels: usize,
    site: Site,
}

impl U1Sym {
    pub fn new(channels: usize) -> Result<Self, Error> {
        if channels < 1 || channels > 2 {
            return Err(Error::UnsupportedChannels("U1", channels));
        }
        Ok(U1Sym {
            channels,
            site: Site::new(channels),
        })
    }
}

impl SymmetryOps for U1Sym {
    fn name(&self) -> &'static str {
        "U1"
    }

    fn channels(&self) -> usize {
        self.channels
    }

    fn qn_len(&self) -> usize {
        1
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
        Invar::new(&[self.site.charge(comb)])
    }

    fn f_shifts(&self, _fnr: usize) -> Vec<Invar> {
        vec![Invar::new(&[1])]
    }

    fn triangle_inequality(&self, i1: &Invar, ip: &Invar,
                           iop: &Invar) -> bool {
        i1[0] == ip[0] + iop[0]
    }

    fn recalc_f_coupled(&self, i1: &Invar, ip: &Invar) -> bool {
        i1[0] - ip[0] == 1
    }

    fn op_shifts(&self, kind: &OpKind) -> Vec<Invar> {
        match *kind {
            OpKind::Singlet | OpKind::Triplet | OpKind::Global(_) => {
                vec![Invar::new(&[0])]
            }
            OpKind::Doublet => vec![Invar::new(&[1])],
        }
    }

    fn offdiag_exception(&self, i1: usize, ip: usize, i: &Invar) -> bool {
        exception_listed(EXCEPTIONS, i1, ip, i)
    }

    fn td_weights(&self, i: &Invar) -> TdWeights {
        let q = f64::from(i[0]);
        TdWeights {
            q,
            q2: q * q,
            sz2: None,
        }
    }

    fn vacuum_invar(&self) -> Invar {
        Invar::new(&[0])
    }

    fn build_tables(&self) -> CoefTables {
        coeffs::build_abelian(
            &self.site,
            &|site, s| Invar::new(&[site.charge(s)]),
            &[
                ("Qtot", &|site, s| f64::from(site.charge(s))),
                ("SZtot", &|site, s| f64::from(site.tsz(s)) / 2.0),
            ],
        )
    }
}
