//! Per-domain twiddle factor table.
//!
//! `W[k] = exp(-2πi·k/N) = (cos θ, -sin θ)` with `θ = 2πk/N`, for
//! `k = 0..N/2`. Angles are evaluated in double precision through `libm`
//! and rounded once to `f32`, so the table is identical with or without `std`.

use alloc::vec::Vec;
use core::f64::consts::PI;

use crate::error::ConfigError;
use crate::num::Complex32;

/// Immutable table of `N/2` twiddle factors stored as planar `f32`.
#[derive(Clone, Debug, PartialEq)]
pub struct TwiddleTable {
    domain_size: usize,
    re: Vec<f32>,
    im: Vec<f32>,
}

impl TwiddleTable {
    /// Build the table for a domain of `n` points.
    ///
    /// # Errors
    /// [`ConfigError::InvalidTwiddleDomain`] if `n` is zero or odd.
    pub fn build(n: usize) -> Result<Self, ConfigError> {
        if n == 0 || n % 2 != 0 {
            return Err(ConfigError::InvalidTwiddleDomain(n));
        }
        let half = n / 2;
        let mut re = Vec::with_capacity(half);
        let mut im = Vec::with_capacity(half);
        for k in 0..half {
            let theta = (2.0 * PI * k as f64) / n as f64;
            re.push(libm::cos(theta) as f32);
            im.push(-libm::sin(theta) as f32);
        }
        Ok(Self {
            domain_size: n,
            re,
            im,
        })
    }

    pub fn domain_size(&self) -> usize {
        self.domain_size
    }

    /// Number of entries, `N/2`.
    pub fn len(&self) -> usize {
        self.re.len()
    }

    pub fn is_empty(&self) -> bool {
        self.re.is_empty()
    }

    #[inline]
    pub fn get(&self, k: usize) -> Option<Complex32> {
        match (self.re.get(k), self.im.get(k)) {
            (Some(&re), Some(&im)) => Some(Complex32::new(re, im)),
            _ => None,
        }
    }

    pub fn re(&self) -> &[f32] {
        &self.re
    }

    pub fn im(&self) -> &[f32] {
        &self.im
    }
}
