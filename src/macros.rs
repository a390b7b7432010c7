/// Check whether two `f64` numbers are equal within the given
/// [`Toler`](utils/struct.Toler.html).
///
/// ```
/// #[macro_use]
/// extern crate kondo;
///
/// use kondo::utils::Toler;
///
/// fn main() {
///     toler_assert_eq!(Toler { abserr: 1e-2, relerr: 1e-3 }, 10.0, 10.02);
/// }
/// ```
#[macro_export]
macro_rules! toler_assert_eq {
    ($toler:expr, $left:expr, $right:expr) => {
        let toler = &$toler;
        let left = $left;
        let right = $right;
        assert!(toler.is_eq(left, right),
                "{} does not equal to {} within {:?}",
                left, right, toler)
    }
}

/// Build an [`Invar`](invar/struct.Invar.html) from a list of quantum
/// numbers.
///
/// ```
/// #[macro_use]
/// extern crate kondo;
///
/// fn main() {
///     let i = invar![1, -2];
///     assert_eq!(i.len(), 2);
///     assert_eq!(i[1], -2);
/// }
/// ```
#[macro_export]
macro_rules! invar {
    ($($q:expr),+ $(,)*) => {
        $crate::invar::Invar::new(&[$($q as i32),+])
    }
}
