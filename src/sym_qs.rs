//! `U(1)_charge × SU(2)_spin` symmetry: `Invar = (Q, SS)` with
//! `SS = 2S + 1` the spin multiplicity.  Single channel.
//!
//! Subspace levels are `SS`-fold degenerate multiplets and every stored
//! matrix element is a reduced matrix element in the Clebsch–Gordan
//! convention `⟨j1 m1 | T^k_q | j2 m2⟩ = ⟨j2 m2; k q | j1 m1⟩ ⟨j1‖T‖j2⟩`.
//! The recoupling factors are evaluated from explicit Clebsch–Gordan
//! contractions of the site algebra at a stretched projection rather than
//! from closed-form expressions; the contraction is exact, so the factors
//! are bit-for-bit reproducible.
use super::coeffs::{self, CoefTables, DiagEntry, GlobalEntry, Offdiag,
                    Recalc, RecalcF};
use super::coeffs::{cg, parity_sign};
use super::errors::Error;
use super::half::Half;
use super::invar::Invar;
use super::site::{Site, Spin};
use super::symmetry::{OpKind, SymmetryOps, TdWeights, exception_listed};

const EXCEPTIONS: &[(usize, usize, Invar)] = &[];

/// `(ΔQ, ΔSS)` between a subspace and its ancestor, per combination:
/// empty site, site electron raising `S`, site electron lowering `S`,
/// doubly occupied site.
const COMB_SHIFTS: [(i32, i32); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];

/// Site charge per combination.
const SITE_Q: [i32; 4] = [-1, 0, 0, 1];

/// Twice the site spin per combination.
const SITE_TS: [i32; 4] = [0, 1, 1, 0];

/// Combination pairs `(i1, ip)` whose site multiplets coincide, i.e. the
/// pairs through which an operator acting on the old chain can connect.
const SAME_SITE_PAIRS: [(usize, usize); 6] =
    [(0, 0), (1, 1), (1, 2), (2, 1), (2, 2), (3, 3)];

lazy_static! {
    static ref SITE: Site = Site::new(1);
}

/// Site basis state of multiplet member `(comb, μ)`, with `μ` twice the
/// site spin projection.
fn site_state(comb: usize, tmu: i32) -> usize {
    match (comb, tmu) {
        (0, 0) => 0,
        (1, 1) | (2, 1) => 1,
        (1, -1) | (2, -1) => 2,
        (3, 0) => 3,
        _ => unreachable!(),
    }
}

fn spin_of(tsigma: i32) -> Spin {
    if tsigma > 0 {
        Spin::Up
    } else {
        Spin::Dn
    }
}

/// Twice the ancestor spin of combination `comb` under subspace `i`, or
/// `None` if no such multiplet exists.
fn anc_ts(comb: usize, i: &Invar) -> Option<i32> {
    let ts = i[1] - COMB_SHIFTS[comb].1 - 1;
    if ts >= 0 {
        Some(ts)
    } else {
        None
    }
}

/// Hopping factor for row `(i1, ip)` of subspace `i`: the spin contraction
/// `Σ_σ ⟨·| f†_σ f_{site,σ} |·⟩` between the stretched states, normalized
/// to the reduced matrix element of the chain-end operator, times the
/// fermionic parity of the ket ancestor.
fn offdiag_factor(i1: usize, ip: usize, i: &Invar) -> f64 {
    let ts = i[1] - 1;
    if ts < 0 {
        return 0.0;
    }
    let (tsa1, tsap) = match (anc_ts(i1, i), anc_ts(ip, i)) {
        (Some(a), Some(b)) => (a, b),
        _ => return 0.0,
    };
    let (tss1, tssp) = (SITE_TS[i1], SITE_TS[ip]);
    let mut total = 0.0;
    for &tsigma in &[1, -1] {
        let cre = SITE.cre(0, spin_of(tsigma));
        for tmap in Half(tsap).multiplet() {
            let tmap = tmap.twice();
            let tma1 = tmap + tsigma;
            if tma1.abs() > tsa1 {
                continue;
            }
            let cf = cg(tsap, tmap, 1, tsigma, tsa1, tma1);
            if cf == 0.0 {
                continue;
            }
            let tmup = ts - tmap;
            let tmu1 = ts - tma1;
            if tmup.abs() > tssp || tmu1.abs() > tss1 {
                continue;
            }
            let cket = cg(tsap, tmap, tssp, tmup, ts, ts);
            let cbra = cg(tsa1, tma1, tss1, tmu1, ts, ts);
            if cket == 0.0 || cbra == 0.0 {
                continue;
            }
            // ⟨s_{i1} μ1 | c_σ | s_{ip} μp⟩
            let amp = cre[(site_state(ip, tmup), site_state(i1, tmu1))];
            total += cf * cket * cbra * amp;
        }
    }
    total * parity_sign(i[0] - COMB_SHIFTS[ip].0)
}

/// Chain-extension factor for row `(i1, ip)` between subspaces `(I1, Ip)`
/// sharing the ancestor reached through `i1` resp. `ip`.
fn recalc_f_factor(i1: usize, ip: usize, inv1: &Invar, invp: &Invar) -> f64 {
    let ts1 = inv1[1] - 1;
    let tsp = invp[1] - 1;
    if ts1 < 0 || tsp < 0 {
        return 0.0;
    }
    let tsa = match anc_ts(i1, inv1) {
        Some(a) => a,
        None => return 0.0,
    };
    let (tss1, tssp) = (SITE_TS[i1], SITE_TS[ip]);
    for &tq in &[1, -1] {
        let tm1 = ts1;
        let tmp = tm1 - tq;
        if tmp.abs() > tsp {
            continue;
        }
        let den = cg(tsp, tmp, 1, tq, ts1, tm1);
        if den == 0.0 {
            continue;
        }
        let cre = SITE.cre(0, spin_of(tq));
        let mut num = 0.0;
        for tma in Half(tsa).multiplet() {
            let tma = tma.twice();
            let tmu1 = tm1 - tma;
            let tmup = tmp - tma;
            if tmu1.abs() > tss1 || tmup.abs() > tssp {
                continue;
            }
            let c1 = cg(tsa, tma, tss1, tmu1, ts1, tm1);
            let cp = cg(tsa, tma, tssp, tmup, tsp, tmp);
            if c1 == 0.0 || cp == 0.0 {
                continue;
            }
            let amp = cre[(site_state(i1, tmu1), site_state(ip, tmup))];
            num += c1 * cp * amp;
        }
        return num / den * parity_sign(inv1[0] - COMB_SHIFTS[i1].0);
    }
    0.0
}

/// Recoupling ratio for an operator of twice-rank `trank` acting on the
/// old chain, for row `(i1, ip)` between subspaces `(I1, Ip)`.
fn recalc_factor(
    trank: i32,
    i1: usize,
    ip: usize,
    inv1: &Invar,
    invp: &Invar,
) -> f64 {
    let ts1 = inv1[1] - 1;
    let tsp = invp[1] - 1;
    if ts1 < 0 || tsp < 0 {
        return 0.0;
    }
    let (tsa1, tsap) = match (anc_ts(i1, inv1), anc_ts(ip, invp)) {
        (Some(a), Some(b)) => (a, b),
        _ => return 0.0,
    };
    let tss = SITE_TS[i1];
    let mut tq = trank;
    while tq >= -trank {
        let tm1 = ts1;
        let tmp = tm1 - tq;
        if tmp.abs() <= tsp {
            let den = cg(tsp, tmp, trank, tq, ts1, tm1);
            if den != 0.0 {
                let mut num = 0.0;
                for tmap in Half(tsap).multiplet() {
                    let tmap = tmap.twice();
                    let tma1 = tmap + tq;
                    if tma1.abs() > tsa1 {
                        continue;
                    }
                    let tmu = tmp - tmap;
                    if tmu.abs() > tss {
                        continue;
                    }
                    num += cg(tsap, tmap, trank, tq, tsa1, tma1)
                        * cg(tsa1, tma1, tss, tmu, ts1, tm1)
                        * cg(tsap, tmap, tss, tmu, tsp, tmp);
                }
                return num / den;
            }
        }
        tq -= 2;
    }
    0.0
}

pub struct QsSym {
    _channels: (),
}

impl QsSym {
    pub fn new(channels: usize) -> Result<Self, Error> {
        if channels != 1 {
            return Err(Error::UnsupportedChannels("QS", channels));
        }
        Ok(QsSym { _channels: () })
    }
}

impl SymmetryOps for QsSym {
    fn name(&self) -> &'static str {
        "QS"
    }

    fn channels(&self) -> usize {
        1
    }

    fn qn_len(&self) -> usize {
        2
    }

    fn nr_combs(&self) -> usize {
        4
    }

    fn f_ops_per_channel(&self) -> usize {
        1
    }

    fn mult(&self, i: &Invar) -> usize {
        assert!(i[1] >= 1, "multiplicity of forbidden subspace {}", i);
        i[1] as usize
    }

    fn invar_allowed(&self, i: &Invar) -> bool {
        i[1] >= 1
    }

    fn comb_shift(&self, comb: usize) -> Invar {
        let (dq, dss) = COMB_SHIFTS[comb];
        Invar::new(&[dq, dss])
    }

    fn f_shifts(&self, _fnr: usize) -> Vec<Invar> {
        vec![Invar::new(&[1, 1]), Invar::new(&[1, -1])]
    }

    fn triangle_inequality(&self, i1: &Invar, ip: &Invar,
                           iop: &Invar) -> bool {
        if i1[0] != ip[0] + iop[0] {
            return false;
        }
        // SU(2) triangle rule on twice the spins
        let (tj1, tjp, tjop) = (i1[1] - 1, ip[1] - 1, iop[1] - 1);
        tj1 >= (tjp - tjop).abs()
            && tj1 <= tjp + tjop
            && (tj1 + tjp + tjop) % 2 == 0
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
        let ts = i[1] - 1;
        // multiplet average of S_z²: S(S+1)/3
        let sz2 = f64::from(ts * (ts + 2)) / 12.0;
        TdWeights {
            q,
            q2: q * q,
            sz2: Some(sz2),
        }
    }

    fn vacuum_invar(&self) -> Invar {
        Invar::new(&[0, 1])
    }

    fn build_tables(&self) -> CoefTables {
        let mut offdiag = Vec::new();
        let mut f_rules = Vec::new();
        for i1 in 0 .. 4 {
            for ip in 0 .. 4 {
                if SITE_Q[i1] + 1 == SITE_Q[ip] {
                    offdiag.push(Offdiag {
                        i1,
                        ip,
                        ch: 0,
                        fnr: 0,
                        factor: Box::new(move |i: &Invar| {
                            offdiag_factor(i1, ip, i)
                        }),
                    });
                }
                if SITE_Q[i1] == SITE_Q[ip] + 1 {
                    f_rules.push(RecalcF {
                        i1,
                        ip,
                        factor: Box::new(move |a: &Invar, b: &Invar| {
                            recalc_f_factor(i1, ip, a, b)
                        }),
                    });
                }
            }
        }

        let diag = vec![
            DiagEntry { comb: 1, ch: 0, number: 1.0 },
            DiagEntry { comb: 2, ch: 0, number: 1.0 },
            DiagEntry { comb: 3, ch: 0, number: 2.0 },
        ];

        let rank_rules = |trank: i32| -> Vec<Recalc> {
            SAME_SITE_PAIRS
                .iter()
                .map(|&(i1, ip)| Recalc {
                    i1,
                    ip,
                    factor: Box::new(move |a: &Invar, b: &Invar| {
                        recalc_factor(trank, i1, ip, a, b)
                    }),
                })
                .collect()
        };
        let recalc =
            vec![(0, rank_rules(0)), (1, rank_rules(1)), (2, rank_rules(2))];

        let global = vec![(
            "Qtot",
            (0 .. 4)
                .map(|comb| GlobalEntry {
                    comb,
                    value: f64::from(SITE_Q[comb]),
                })
                .collect(),
        )];

        CoefTables {
            combs: 4,
            offdiag,
            diag,
            recalc_f: vec![vec![f_rules]],
            recalc,
            global,
        }
    }
}
