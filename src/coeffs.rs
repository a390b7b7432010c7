//! Coupling-coefficient tables.
//!
//! Each symmetry contributes one [`CoefTables`] per channel count,
//! constructed once and cached for the lifetime of the process.  A table row
//! names a pair of ancestor combinations and carries the scalar factor that
//! multiplies the corresponding eigenvector-block contraction; the factors
//! are functions of the subspace labels so a single table serves every
//! iteration.  Rows whose factor evaluates to exactly zero are skipped
//! silently by the recalculation engine; asking for a table that was never
//! built is a bug and panics.
use std::sync::Mutex;
use fnv::FnvHashMap;
use wigner_symbols::ClebschGordan;
use super::invar::Invar;
use super::site::{Site, Spin};

/// Factor depending on the subspace being assembled.
pub type InvarFn = Box<dyn Fn(&Invar) -> f64 + Send + Sync>;
/// Factor depending on the bra and ket subspaces of an operator block.
pub type PairFn = Box<dyn Fn(&Invar, &Invar) -> f64 + Send + Sync>;

/// Clebsch–Gordan coefficient `⟨j1 m1; j2 m2 | j12 m12⟩` with every
/// argument stored as twice its value.
pub fn cg(tj1: i32, tm1: i32, tj2: i32, tm2: i32, tj12: i32, tm12: i32) -> f64 {
    f64::from(ClebschGordan {
        tj1,
        tm1,
        tj2,
        tm2,
        tj12,
        tm12,
    }.value())
}

/// `(−1)^q`
#[inline]
pub fn parity_sign(q: i32) -> f64 {
    if q % 2 == 0 {
        1.0
    } else {
        -1.0
    }
}

/// Hopping row: `H += ξ_ch · factor(I) · F_old[(anc_{i1}, anc_{ip})]`.
pub struct Offdiag {
    pub i1: usize,
    pub ip: usize,
    pub ch: usize,
    pub fnr: usize,
    pub factor: InvarFn,
}

/// On-site energy row: the diagonal of combination `comb` picks up
/// `ζ_ch · number`.
pub struct DiagEntry {
    pub comb: usize,
    pub ch: usize,
    pub number: f64,
}

/// Chain-extension row:
/// `F_new += factor(I1, Ip) · conj(U1_{i1}) · Upᵀ_{ip}`.
pub struct RecalcF {
    pub i1: usize,
    pub ip: usize,
    pub factor: PairFn,
}

/// Operator-recalculation row:
/// `O_new += factor(I1, Ip) · conj(U1_{i1}) · O_old · Upᵀ_{ip}`.
pub struct Recalc {
    pub i1: usize,
    pub ip: usize,
    pub factor: PairFn,
}

/// Site contribution of a named global operator on combination `comb`.
pub struct GlobalEntry {
    pub comb: usize,
    pub value: f64,
}

pub struct CoefTables {
    /// Number of ancestor combinations.
    pub combs: usize,
    pub offdiag: Vec<Offdiag>,
    pub diag: Vec<DiagEntry>,
    /// Indexed `[ch][fnr]`.
    pub recalc_f: Vec<Vec<Vec<RecalcF>>>,
    /// Keyed by twice the SU(2) rank of the operator (0, 1, or 2).
    pub recalc: Vec<(i32, Vec<Recalc>)>,
    pub global: Vec<(&'static str, Vec<GlobalEntry>)>,
}

impl CoefTables {
    pub fn recalc_rules(&self, trank: i32) -> &[Recalc] {
        match self.recalc.iter().find(|&&(t, _)| t == trank) {
            Some(&(_, ref rules)) => rules,
            None => panic!("no recalculation table for rank {}/2", trank),
        }
    }

    pub fn global_rules(&self, name: &str) -> &[GlobalEntry] {
        match self.global.iter().find(|&&(n, _)| n == name) {
            Some(&(_, ref rules)) => rules,
            None => panic!("unknown global operator {:?}", name),
        }
    }
}

lazy_static! {
    static ref CACHE: Mutex<FnvHashMap<(&'static str, usize),
                                       &'static CoefTables>> =
        Default::default();
}

/// Fetch the tables for `(symmetry name, channels)`, building them on first
/// use.  Built tables are retained for the lifetime of the process so that
/// no generation happens on the per-iteration path.
pub fn cached<F>(key: (&'static str, usize), build: F) -> &'static CoefTables
    where F: FnOnce() -> CoefTables
{
    let mut cache = match CACHE.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if let Some(&tables) = cache.get(&key) {
        return tables;
    }
    let tables: &'static CoefTables = Box::leak(Box::new(build()));
    cache.insert(key, tables);
    tables
}

/// Build the tables of an abelian symmetry directly from the site algebra.
///
/// Every ancestor combination is one site basis state; `shift_of` maps a
/// site state to its quantum-number contribution.  Hopping and
/// chain-extension factors are site matrix elements times the fermionic
/// parity `(−1)^Q` of the ancestor the annihilated or created electron has
/// to anticommute past; operator recalculation leaves the site untouched,
/// so its rows are the unit diagonal for every rank.
pub fn build_abelian(
    site: &Site,
    shift_of: &dyn Fn(&Site, usize) -> Invar,
    globals: &[(&'static str, &dyn Fn(&Site, usize) -> f64)],
) -> CoefTables {
    let combs = site.dim();
    let channels = site.channels();

    let mut offdiag = Vec::new();
    let mut recalc_f = Vec::with_capacity(channels);
    for ch in 0 .. channels {
        let mut per_ch = Vec::with_capacity(2);
        for &spin in &Spin::BOTH {
            let fnr = spin.idx();
            let cre = site.cre(ch, spin);
            let mut f_rules = Vec::new();
            for i1 in 0 .. combs {
                for ip in 0 .. combs {
                    // hopping: ⟨s_{i1}| c_{ch,σ} |s_{ip}⟩ pairs with the
                    // chain-end creation block F[(anc_{i1}, anc_{ip})]
                    let ann = cre[(ip, i1)];
                    if ann != 0.0 {
                        let shift_q = shift_of(site, ip)[0];
                        offdiag.push(Offdiag {
                            i1,
                            ip,
                            ch,
                            fnr,
                            factor: Box::new(move |i: &Invar| {
                                ann * parity_sign(i[0] - shift_q)
                            }),
                        });
                    }
                    // chain extension: ⟨s_{i1}| c†_{ch,σ} |s_{ip}⟩ over a
                    // shared ancestor
                    let amp = cre[(i1, ip)];
                    if amp != 0.0 {
                        let shift_q = shift_of(site, i1)[0];
                        f_rules.push(RecalcF {
                            i1,
                            ip,
                            factor: Box::new(move |i1inv: &Invar, _: &Invar| {
                                amp * parity_sign(i1inv[0] - shift_q)
                            }),
                        });
                    }
                }
            }
            per_ch.push(f_rules);
        }
        recalc_f.push(per_ch);
    }

    let mut diag = Vec::new();
    for comb in 0 .. combs {
        for ch in 0 .. channels {
            let number = f64::from(site.occupation_in(comb, ch));
            if number != 0.0 {
                diag.push(DiagEntry { comb, ch, number });
            }
        }
    }

    let unit_rules = || -> Vec<Recalc> {
        (0 .. combs)
            .map(|comb| Recalc {
                i1: comb,
                ip: comb,
                factor: Box::new(|_: &Invar, _: &Invar| 1.0),
            })
            .collect()
    };
    let recalc = vec![(0, unit_rules()), (1, unit_rules()), (2, unit_rules())];

    let global = globals
        .iter()
        .map(|&(name, value_of)| {
            let rules = (0 .. combs)
                .map(|comb| GlobalEntry {
                    comb,
                    value: value_of(site, comb),
                })
                .collect();
            (name, rules)
        })
        .collect();

    CoefTables {
        combs,
        offdiag,
        diag,
        recalc_f,
        recalc,
        global,
    }
}
