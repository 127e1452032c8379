//! Single-precision complex scalars and split (planar) signal storage.
//!
//! The pipeline keeps real and imaginary parts in two parallel `f32`
//! sequences for the whole transform; [`SplitSignal`] owns such a pair and
//! guarantees both halves have the same length.

use alloc::vec;
use alloc::vec::Vec;

use crate::error::ConfigError;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Complex32 {
    pub re: f32,
    pub im: f32,
}

impl Complex32 {
    #[inline(always)]
    pub const fn new(re: f32, im: f32) -> Self {
        Self { re, im }
    }

    #[inline(always)]
    pub const fn zero() -> Self {
        Self { re: 0.0, im: 0.0 }
    }

    /// Complex conjugate.
    #[inline(always)]
    pub fn conj(self) -> Self {
        Self {
            re: self.re,
            im: -self.im,
        }
    }
}

impl core::ops::Neg for Complex32 {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        Self {
            re: -self.re,
            im: -self.im,
        }
    }
}

impl core::ops::Add for Complex32 {
    type Output = Self;
    #[inline(always)]
    fn add(self, other: Self) -> Self {
        Self {
            re: self.re + other.re,
            im: self.im + other.im,
        }
    }
}

impl core::ops::Sub for Complex32 {
    type Output = Self;
    #[inline(always)]
    fn sub(self, other: Self) -> Self {
        Self {
            re: self.re - other.re,
            im: self.im - other.im,
        }
    }
}

impl core::ops::Mul for Complex32 {
    type Output = Self;
    #[inline(always)]
    fn mul(self, other: Self) -> Self {
        crate::butterfly::complex_multiply(self, other)
    }
}

/// Planar complex signal: `re[i] + j·im[i]`.
///
/// The two halves are always the same length. The buffer is allocated once
/// and moved between pipeline stages rather than reallocated.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SplitSignal {
    re: Vec<f32>,
    im: Vec<f32>,
}

impl SplitSignal {
    pub fn new(re: Vec<f32>, im: Vec<f32>) -> Result<Self, ConfigError> {
        if re.len() != im.len() {
            return Err(ConfigError::LengthMismatch {
                expected: re.len(),
                actual: im.len(),
            });
        }
        Ok(Self { re, im })
    }

    pub fn zeros(len: usize) -> Self {
        Self {
            re: vec![0.0; len],
            im: vec![0.0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.re.len()
    }

    pub fn is_empty(&self) -> bool {
        self.re.is_empty()
    }

    pub fn from_complex(samples: &[Complex32]) -> Self {
        let mut re = Vec::with_capacity(samples.len());
        let mut im = Vec::with_capacity(samples.len());
        for c in samples {
            re.push(c.re);
            im.push(c.im);
        }
        Self { re, im }
    }

    pub fn to_complex(&self) -> Vec<Complex32> {
        self.re
            .iter()
            .zip(self.im.iter())
            .map(|(&re, &im)| Complex32::new(re, im))
            .collect()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<Complex32> {
        match (self.re.get(index), self.im.get(index)) {
            (Some(&re), Some(&im)) => Some(Complex32::new(re, im)),
            _ => None,
        }
    }

    /// Store `value` at `index`. Returns `false` when `index` is out of range.
    #[inline]
    pub fn set(&mut self, index: usize, value: Complex32) -> bool {
        match (self.re.get_mut(index), self.im.get_mut(index)) {
            (Some(re), Some(im)) => {
                *re = value.re;
                *im = value.im;
                true
            }
            _ => false,
        }
    }

    pub fn re(&self) -> &[f32] {
        &self.re
    }

    pub fn im(&self) -> &[f32] {
        &self.im
    }

    pub fn as_slices(&self) -> (&[f32], &[f32]) {
        (&self.re, &self.im)
    }

    pub fn as_mut_slices(&mut self) -> (&mut [f32], &mut [f32]) {
        (&mut self.re, &mut self.im)
    }

    /// Overwrite this signal with the contents of `re`/`im`.
    pub fn copy_from_slices(&mut self, re: &[f32], im: &[f32]) -> Result<(), ConfigError> {
        if re.len() != self.len() || im.len() != self.len() {
            return Err(ConfigError::LengthMismatch {
                expected: self.len(),
                actual: if re.len() != self.len() {
                    re.len()
                } else {
                    im.len()
                },
            });
        }
        self.re.copy_from_slice(re);
        self.im.copy_from_slice(im);
        Ok(())
    }

    pub fn into_parts(self) -> (Vec<f32>, Vec<f32>) {
        (self.re, self.im)
    }
}

impl From<Vec<Complex32>> for SplitSignal {
    fn from(v: Vec<Complex32>) -> Self {
        Self::from_complex(&v)
    }
}

impl From<SplitSignal> for Vec<Complex32> {
    fn from(signal: SplitSignal) -> Self {
        signal.to_complex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_signal_rejects_uneven_halves() {
        let err = SplitSignal::new(vec![0.0; 4], vec![0.0; 3]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::LengthMismatch {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn complex_conversion_keeps_order() {
        let samples = vec![Complex32::new(1.0, -1.0), Complex32::new(2.0, 0.5)];
        let split = SplitSignal::from(samples.clone());
        assert_eq!(split.re(), &[1.0, 2.0]);
        assert_eq!(split.im(), &[-1.0, 0.5]);
        let back: Vec<Complex32> = split.into();
        assert_eq!(back, samples);
    }

    #[test]
    fn get_and_set_are_bounds_checked() {
        let mut s = SplitSignal::zeros(2);
        assert!(s.set(1, Complex32::new(3.0, 4.0)));
        assert!(!s.set(2, Complex32::zero()));
        assert_eq!(s.get(1), Some(Complex32::new(3.0, 4.0)));
        assert_eq!(s.get(2), None);
    }

    #[test]
    fn complex_arithmetic() {
        let a = Complex32::new(1.0, -2.0);
        let b = Complex32::new(3.0, 4.0);
        let c = a * b;
        assert_eq!(c, Complex32::new(1.0 * 3.0 - (-2.0) * 4.0, 1.0 * 4.0 + (-2.0) * 3.0));
        assert_eq!(-a, Complex32::new(-1.0, 2.0));
        assert_eq!(a.conj(), Complex32::new(1.0, 2.0));
        assert_eq!(a + b - b, a);
    }
}
