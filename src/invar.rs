//! Quantum-number tuples labeling invariant subspaces.
use std::fmt;
use std::ops::{Add, Index, Sub};

/// Largest number of simultaneously conserved quantum numbers.
pub const MAX_QN: usize = 3;

/// An ordered tuple of conserved quantum numbers, e.g. `(Q)` or `(Q, SS)`.
///
/// Which components mean what is fixed by the active
/// [`Symmetry`](../symmetry/enum.Symmetry.html); every `Invar` within a run
/// has the same length.  Half-integer quantities are stored as twice their
/// value, so all components are integers.  The derived lexicographic `Ord`
/// makes `BTreeMap<Invar, _>` registries deterministic.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
         Serialize, Deserialize)]
pub struct Invar {
    len: u8,
    qn: [i32; MAX_QN],
}

impl Invar {
    pub fn new(qn: &[i32]) -> Self {
        assert!(qn.len() >= 1 && qn.len() <= MAX_QN,
                "invar must have 1 to {} components", MAX_QN);
        let mut store = [0; MAX_QN];
        store[.. qn.len()].copy_from_slice(qn);
        Invar {
            len: qn.len() as u8,
            qn: store,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn components(&self) -> &[i32] {
        &self.qn[.. self.len()]
    }
}

impl Index<usize> for Invar {
    type Output = i32;
    #[inline]
    fn index(&self, i: usize) -> &i32 {
        &self.components()[i]
    }
}

impl Add for Invar {
    type Output = Invar;
    fn add(self, other: Invar) -> Invar {
        assert_eq!(self.len, other.len);
        let mut qn = self.qn;
        for i in 0 .. self.len() {
            qn[i] += other.qn[i];
        }
        Invar { len: self.len, qn }
    }
}

impl Sub for Invar {
    type Output = Invar;
    fn sub(self, other: Invar) -> Invar {
        assert_eq!(self.len, other.len);
        let mut qn = self.qn;
        for i in 0 .. self.len() {
            qn[i] -= other.qn[i];
        }
        Invar { len: self.len, qn }
    }
}

impl fmt::Display for Invar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(")?;
        for (i, q) in self.components().iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", q)?;
        }
        write!(f, ")")
    }
}

impl fmt::Debug for Invar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic() {
        let a = Invar::new(&[1, 2]);
        let b = Invar::new(&[0, -1]);
        assert_eq!(a + b, Invar::new(&[1, 1]));
        assert_eq!(a - b, Invar::new(&[1, 3]));
        assert_eq!(a[0], 1);
        assert_eq!(a[1], 2);
    }

    #[test]
    fn ordering() {
        let a = Invar::new(&[-1, 2]);
        let b = Invar::new(&[0, 0]);
        assert!(a < b);
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", Invar::new(&[1, -2])), "(1,-2)");
    }
}
