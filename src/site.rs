//! Exact Fock algebra of one Wilson-chain site.
//!
//! A site carries one spinful fermionic orbital per channel, so its Hilbert
//! space is the `4^channels`-dimensional product of `{|0⟩, |↑⟩, |↓⟩, |↑↓⟩}`
//! factors, with `|↑↓⟩ = c†_↑ c†_↓ |0⟩`.  Creation operators between site
//! states are represented as explicit matrices with the Jordan–Wigner signs
//! built in; everything the coefficient tables need (hopping amplitudes,
//! charges, spin projections, occupancies) is read off these matrices
//! rather than hardcoded per symmetry.
use super::mat::Mat;

/// Dimension of a single spinful orbital.
pub const LOCAL_DIM: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Spin {
    Up,
    Dn,
}

impl Spin {
    pub const BOTH: [Spin; 2] = [Spin::Up, Spin::Dn];

    #[inline]
    pub fn idx(self) -> usize {
        match self {
            Spin::Up => 0,
            Spin::Dn => 1,
        }
    }

    /// Twice the spin projection.
    #[inline]
    pub fn tsz(self) -> i32 {
        match self {
            Spin::Up => 1,
            Spin::Dn => -1,
        }
    }
}

/// Kronecker product, `(a ⊗ b)[(i k), (j l)] = a[i, j] b[k, l]`.
fn kron(a: &Mat<f64>, b: &Mat<f64>) -> Mat<f64> {
    let (ar, ac) = a.dims();
    let (br, bc) = b.dims();
    let mut out = Mat::zero(ar * br, ac * bc);
    for i in 0 .. ar {
        for j in 0 .. ac {
            let aij = a[(i, j)];
            if aij == 0.0 {
                continue;
            }
            for k in 0 .. br {
                for l in 0 .. bc {
                    out[(i * br + k, j * bc + l)] = aij * b[(k, l)];
                }
            }
        }
    }
    out
}

fn identity(n: usize) -> Mat<f64> {
    let mut id = Mat::zero(n, n);
    for i in 0 .. n {
        id[(i, i)] = 1.0;
    }
    id
}

/// Basis order within one orbital: `|0⟩, |↑⟩, |↓⟩, |↑↓⟩`.
fn local_cre(spin: Spin) -> Mat<f64> {
    let mut c = Mat::zero(LOCAL_DIM, LOCAL_DIM);
    match spin {
        Spin::Up => {
            c[(1, 0)] = 1.0;
            c[(3, 2)] = 1.0;
        }
        Spin::Dn => {
            c[(2, 0)] = 1.0;
            // c†_↓ |↑⟩ = −|↑↓⟩ given |↑↓⟩ = c†_↑ c†_↓ |0⟩
            c[(3, 1)] = -1.0;
        }
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

fn local_occupation(state: usize) -> u32 {
    match state {
        0 => 0,
        1 | 2 => 1,
        3 => 2,
        _ => unreachable!(),
    }
}

fn local_tsz(state: usize) -> i32 {
    match state {
        1 => 1,
        2 => -1,
        _ => 0,
    }
}

/// The full site algebra for a given number of channels.
pub struct Site {
    channels: usize,
    dim: usize,
    cre: Vec<[Mat<f64>; 2]>,
}

impl Site {
    pub fn new(channels: usize) -> Self {
        assert!(channels >= 1);
        let dim = LOCAL_DIM.pow(channels as u32);
        let parity = local_parity();
        let embed = |ch: usize, spin: Spin| {
            // string of parities on the orbitals preceding `ch`
            let mut op = identity(1);
            for _ in 0 .. ch {
                op = kron(&op, &parity);
            }
            op = kron(&op, &local_cre(spin));
            for _ in ch + 1 .. channels {
                op = kron(&op, &identity(LOCAL_DIM));
            }
            op
        };
        let mut cre = Vec::with_capacity(channels);
        for ch in 0 .. channels {
            cre.push([embed(ch, Spin::Up), embed(ch, Spin::Dn)]);
        }
        Site { channels, dim, cre }
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Matrix of `c†_{ch,σ}` over the site basis.
    #[inline]
    pub fn cre(&self, ch: usize, spin: Spin) -> &Mat<f64> {
        &self.cre[ch][spin.idx()]
    }

    fn local_states(&self, state: usize) -> impl Iterator<Item = usize> {
        let channels = self.channels;
        let mut rest = state;
        let mut div = self.dim;
        (0 .. channels).map(move |_| {
            div /= LOCAL_DIM;
            let s = rest / div;
            rest %= div;
            s
        })
    }

    /// Total occupation of a basis state.
    pub fn occupation(&self, state: usize) -> u32 {
        self.local_states(state).map(local_occupation).sum()
    }

    /// Occupation within one channel.
    pub fn occupation_in(&self, state: usize, ch: usize) -> u32 {
        local_occupation(
            self.local_states(state).nth(ch)
                .unwrap_or_else(|| unreachable!()))
    }

    /// Charge relative to half filling, `n − channels`.
    pub fn charge(&self, state: usize) -> i32 {
        self.occupation(state) as i32 - self.channels as i32
    }

    /// Twice the spin projection.
    pub fn tsz(&self, state: usize) -> i32 {
        self.local_states(state).map(local_tsz).sum()
    }
}
