//! Miscellaneous utilities.
use std::mem;
use std::ops::Add;
use conv::ValueInto;
use num::One;

/// Shorthand for casting numbers.  Panics if out of range.
pub fn cast<T: ValueInto<U>, U>(x: T) -> U {
    x.value_into().expect("integer conversion failure")
}

/// Swap the pair if `cond` is true.
#[inline]
pub fn swap_if<T>(cond: bool, (x, y): (T, T)) -> (T, T) {
    if cond {
        (y, x)
    } else {
        (x, y)
    }
}

/// An inclusive range.  Unlike `std::ops::RangeInclusive` the endpoints
/// remain accessible after construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RangeInclusive<T> {
    pub start: T,
    pub end: T,
}

impl<T> Iterator for RangeInclusive<T>
    where T: Add<Output = T> + One + PartialOrd + Clone
{
    type Item = T;
    fn next(&mut self) -> Option<Self::Item> {
        if self.start <= self.end {
            let next = self.start.clone() + One::one();
            Some(mem::replace(&mut self.start, next))
        } else {
            None
        }
    }
}

/// Absolute and relative error tolerance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Toler {
    pub relerr: f64,
    pub abserr: f64,
}

impl Default for Toler {
    fn default() -> Self {
        Toler {
            relerr: 1e-12,
            abserr: 1e-12,
        }
    }
}

impl Toler {
    /// Check whether `|x − y| ≤ abserr + relerr × max(|x|, |y|)`.
    pub fn is_eq(&self, x: f64, y: f64) -> bool {
        (x - y).abs() <= self.abserr + self.relerr * f64::max(x.abs(), y.abs())
    }
}
