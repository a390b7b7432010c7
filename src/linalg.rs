//! Linear algebra: the seam to the external BLAS/LAPACK backend.
//!
//! The dense kernels used by the engine are matrix products (`gemm`) for
//! eigenbasis projections and the Hermitian eigensolver (`heevr`) for the
//! per-subspace diagonalizations.  Both are exposed behind traits so the
//! whole engine is generic over real (`f64`) and complex (`Complex<f64>`)
//! arithmetic; the scalar type is chosen once and never mixed.
use std::cmp::max;
use std::fmt;
use std::ops::{Add, Mul, Range, Sub};
use cblas;
use lapacke;
use num::{Complex, Zero};
use serde::Serialize;
use serde::de::DeserializeOwned;
use super::mat::Mat;
use super::utils::{RangeInclusive, cast};

pub use cblas::{Part, Transpose};

pub mod lamch {
    //! Floating-point constants following the LAPACK convention, i.e.
    //! anything you would otherwise obtain using `lamch`.

    pub mod f64 {
        pub use std::f64::RADIX as BASE;
        pub use std::f64::EPSILON as PREC;
        pub use std::f64::MIN_POSITIVE as RMIN;
        pub use std::f64::MAX as RMAX;

        /// Relative machine epsilon according to the LAPACK convention.
        /// Equal to half of `std::f64::EPSILON`.
        pub const EPS: f64 = PREC / (BASE as f64);

        /// Safe minimum such that `1.0 / SFMIN` does not overflow.
        pub const SFMIN: f64 = RMIN;
    }
}

pub trait Conj {
    fn conj(&self) -> Self;
}

impl Conj for f64 {
    fn conj(&self) -> Self {
        *self
    }
}

impl Conj for Complex<f64> {
    fn conj(&self) -> Self {
        Complex::conj(self)
    }
}

/// Desired range of eigenvalues.
#[derive(Clone, Debug)]
pub enum EigenvalueRange<T> {
    All,
    /// Half-open range of desired eigenvalues.
    Values(Range<T>),
    /// 1-indexed indices of the desired eigenvalues in ascending order.
    Indices(RangeInclusive<i32>),
}

impl<T> Default for EigenvalueRange<T> {
    fn default() -> Self {
        EigenvalueRange::All
    }
}

impl<T: PartialOrd + Zero> EigenvalueRange<T> {
    /// Returns `(range, all, max_m)` where `all` indicates whether every
    /// eigenvalue is requested and `max_m` bounds the number found.
    pub fn to_raw(
        self,
        n: i32,
        vl: &mut T,
        vu: &mut T,
        il: &mut i32,
        iu: &mut i32,
    ) -> (u8, bool, i32) {
        match self {
            EigenvalueRange::All => (b'A', true, n),
            EigenvalueRange::Values(Range { start, end }) => {
                assert!(start < end);
                *vl = start;
                *vu = end;
                (b'V', false, n)
            }
            EigenvalueRange::Indices(RangeInclusive { start, end }) => {
                assert!(1 <= start);
                assert!(start <= end);
                assert!(end <= n);
                *il = start;
                *iu = end;
                let max_m = end - start + 1;
                (b'I', max_m == n, max_m)
            }
        }
    }
}

pub fn part_to_u8(part: Part) -> u8 {
    match part {
        Part::Upper => b'U',
        Part::Lower => b'L',
    }
}

pub trait Gemm: Copy {
    unsafe fn gemm(
        layout: cblas::Layout,
        transa: Transpose,
        transb: Transpose,
        m: i32,
        n: i32,
        k: i32,
        alpha: Self,
        a: &[Self],
        lda: i32,
        b: &[Self],
        ldb: i32,
        beta: Self,
        c: &mut [Self],
        ldc: i32,
    );
}

impl Gemm for f64 {
    unsafe fn gemm(
        layout: cblas::Layout,
        transa: Transpose,
        transb: Transpose,
        m: i32,
        n: i32,
        k: i32,
        alpha: Self,
        a: &[Self],
        lda: i32,
        b: &[Self],
        ldb: i32,
        beta: Self,
        c: &mut [Self],
        ldc: i32,
    ) {
        cblas::dgemm(layout, transa, transb, m, n, k,
                     alpha, a, lda, b, ldb, beta, c, ldc)
    }
}

impl Gemm for Complex<f64> {
    unsafe fn gemm(
        layout: cblas::Layout,
        transa: Transpose,
        transb: Transpose,
        m: i32,
        n: i32,
        k: i32,
        alpha: Self,
        a: &[Self],
        lda: i32,
        b: &[Self],
        ldb: i32,
        beta: Self,
        c: &mut [Self],
        ldc: i32,
    ) {
        cblas::zgemm(layout, transa, transb, m, n, k,
                     alpha, a, lda, b, ldb, beta, c, ldc)
    }
}

/// A thin wrapper over `Gemm::gemm` that panics if the sizes don't match.
pub fn gemm<T: Gemm>(
    transa: Transpose,
    transb: Transpose,
    alpha: T,
    a: &Mat<T>,
    b: &Mat<T>,
    beta: T,
    c: &mut Mat<T>,
) {
    let (ma, ka) = super::utils::swap_if(transa != Transpose::None, a.dims());
    let (kb, nb) = super::utils::swap_if(transb != Transpose::None, b.dims());
    let (mc, nc) = c.dims();
    assert_eq!(ma, mc);
    assert_eq!(nb, nc);
    assert_eq!(ka, kb);
    let lda = cast(a.stride());
    let ldb = cast(b.stride());
    let ldc = cast(c.stride());
    unsafe {
        T::gemm(
            cblas::Layout::RowMajor,
            transa,
            transb,
            cast(ma),
            cast(nb),
            cast(ka),
            alpha,
            a.as_slice(),
            lda,
            b.as_slice(),
            ldb,
            beta,
            c.as_slice_mut(),
            ldc,
        );
    }
}

pub trait Heevr: Copy {
    type Real: PartialOrd;

    unsafe fn heevr(
        layout: lapacke::Layout,
        jobz: u8,
        range: u8,
        uplo: u8,
        n: i32,
        a: &mut [Self],
        lda: i32,
        vl: Self::Real,
        vu: Self::Real,
        il: i32,
        iu: i32,
        abstol: Self::Real,
        m: &mut i32,
        w: &mut [Self::Real],
        z: &mut [Self],
        ldz: i32,
        isuppz: &mut [i32],
    ) -> i32;
}

impl Heevr for f64 {
    type Real = f64;

    unsafe fn heevr(
        layout: lapacke::Layout,
        jobz: u8,
        range: u8,
        uplo: u8,
        n: i32,
        a: &mut [Self],
        lda: i32,
        vl: Self::Real,
        vu: Self::Real,
        il: i32,
        iu: i32,
        abstol: Self::Real,
        m: &mut i32,
        w: &mut [Self::Real],
        z: &mut [Self],
        ldz: i32,
        isuppz: &mut [i32],
    ) -> i32 {
        lapacke::dsyevr(
            layout, jobz, range, uplo, n, a, lda, vl, vu, il, iu,
            abstol, m, w, z, ldz, isuppz,
        )
    }
}

impl Heevr for Complex<f64> {
    type Real = f64;

    unsafe fn heevr(
        layout: lapacke::Layout,
        jobz: u8,
        range: u8,
        uplo: u8,
        n: i32,
        a: &mut [Self],
        lda: i32,
        vl: Self::Real,
        vu: Self::Real,
        il: i32,
        iu: i32,
        abstol: Self::Real,
        m: &mut i32,
        w: &mut [Self::Real],
        z: &mut [Self],
        ldz: i32,
        isuppz: &mut [i32],
    ) -> i32 {
        lapacke::zheevr(
            layout, jobz, range, uplo, n, a, lda, vl, vu, il, iu,
            abstol, m, w, z, ldz, isuppz,
        )
    }
}

/// Diagonalize the Hermitian matrix `a`, destroying its contents.
///
/// Returns the eigenvalues in ascending order along with the corresponding
/// eigenvectors stored as *rows* of the returned matrix (row `k`, column `i`
/// holds the component of eigenvector `k` along basis state `i`).  With a
/// partial `range`, only the requested eigenpairs are returned.
pub fn heevr<T: Heevr<Real = f64> + Zero>(
    range: EigenvalueRange<f64>,
    uplo: Part,
    a: &mut Mat<T>,
) -> Result<(Vec<f64>, Mat<T>), i32> {
    let n = a.num_rows();
    assert_eq!(n, a.num_cols());
    let lda: i32 = cast(max(1, n));
    let mut vl = 0.0;
    let mut vu = 0.0;
    let mut il = 0;
    let mut iu = 0;
    let (range, all, max_m) =
        range.to_raw(cast(n), &mut vl, &mut vu, &mut il, &mut iu);
    let max_m: usize = cast(max_m);
    let mut w = vec![0.0; max(1, n)];
    // eigenvectors come back as columns; transposed into rows below
    let mut z = Mat::<T>::zero(n, max(1, max_m));
    let ldz: i32 = cast(max(1, max_m));
    let mut isuppz = vec![0; if all { 2 * max(1, n) } else { 0 }];
    let mut m = 0;
    let e = unsafe {
        T::heevr(
            lapacke::Layout::RowMajor,
            b'V',
            range,
            part_to_u8(uplo),
            cast(n),
            a.as_slice_mut(),
            lda,
            vl,
            vu,
            il,
            iu,
            lamch::f64::SFMIN,
            &mut m,
            &mut w,
            z.as_slice_mut(),
            ldz,
            &mut isuppz,
        )
    };
    if e != 0 {
        return Err(e);
    }
    let m: usize = cast(m);
    w.truncate(m);
    let vectors = z.slice(0 .. n, 0 .. m).transpose();
    Ok((w, vectors))
}

/// The scalar types the engine runs on: double-precision real or complex.
/// The mode is fixed by the type parameter at the top of the stack and is
/// never mixed within a run.
pub trait Scalar:
    Gemm
    + Heevr<Real = f64>
    + Conj
    + Zero
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + PartialEq
    + Send
    + Sync
    + fmt::Debug
    + Serialize
    + DeserializeOwned
    + 'static
{
    fn from_re(x: f64) -> Self;
    fn re(&self) -> f64;
}

impl Scalar for f64 {
    #[inline]
    fn from_re(x: f64) -> Self {
        x
    }
    #[inline]
    fn re(&self) -> f64 {
        *self
    }
}

impl Scalar for Complex<f64> {
    #[inline]
    fn from_re(x: f64) -> Self {
        Complex::new(x, 0.0)
    }
    #[inline]
    fn re(&self) -> f64 {
        self.re
    }
}
