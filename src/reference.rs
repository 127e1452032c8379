//! Serial in-place radix-2 DIT transform.
//!
//! Walks the same steps, index sequence and butterfly arithmetic as the
//! streaming pipeline without any staging, which makes it a bit-exact oracle
//! for the pipeline and a baseline for benchmarks.

use alloc::format;

use crate::bitrev::permute_in_place;
use crate::butterfly::butterfly;
use crate::config::Direction;
use crate::error::{ConfigError, InvariantViolation, PipelineError};
use crate::indexer::{indices_for, num_steps, ButterflyIndex};
use crate::num::SplitSignal;
use crate::twiddle::TwiddleTable;

/// Transform `signal` in place.
///
/// `Direction::Backward` conjugates the input before the first step; the
/// result still needs [`crate::post::descale`] to become an inverse transform.
///
/// # Errors
/// [`PipelineError::Configuration`] if the length is not a power of two of
/// at least 2 or does not match the twiddle table;
/// [`PipelineError::Invariant`] if a butterfly addresses a sample or twiddle
/// outside the domain.
pub fn reference_fft(
    signal: &mut SplitSignal,
    twiddles: &TwiddleTable,
    direction: Direction,
) -> Result<(), PipelineError> {
    let n = signal.len();
    if n < 2 {
        return Err(ConfigError::DomainTooSmall(n).into());
    }
    if !n.is_power_of_two() {
        return Err(ConfigError::NotPowerOfTwo(n).into());
    }
    if twiddles.domain_size() != n {
        return Err(ConfigError::LengthMismatch {
            expected: n,
            actual: twiddles.domain_size(),
        }
        .into());
    }

    {
        let (re, im) = signal.as_mut_slices();
        permute_in_place(re, im);
    }
    if direction == Direction::Backward {
        conjugate(signal);
    }

    let steps = num_steps(n);
    for step in 0..=steps {
        apply_step(signal, twiddles, step, indices_for(step, steps, n))?;
    }
    Ok(())
}

fn apply_step(
    signal: &mut SplitSignal,
    twiddles: &TwiddleTable,
    step: u32,
    indices: impl IntoIterator<Item = ButterflyIndex>,
) -> Result<(), InvariantViolation> {
    let n = signal.len();
    for idx in indices {
        let violation = |what: &str, at: usize| {
            InvariantViolation::new(
                step,
                idx.spectra,
                idx.point,
                format!("{} index {} outside domain of {}", what, at, n),
            )
        };
        let a = signal.get(idx.d0).ok_or_else(|| violation("d0", idx.d0))?;
        let b = signal.get(idx.d1).ok_or_else(|| violation("d1", idx.d1))?;
        let w = twiddles
            .get(idx.twiddle)
            .ok_or_else(|| violation("twiddle", idx.twiddle))?;
        let (x0, x1) = butterfly(a, b, w);
        if !(signal.set(idx.d0, x0) && signal.set(idx.d1, x1)) {
            return Err(violation("write-back", idx.d1));
        }
    }
    Ok(())
}

/// Conjugate every sample of `signal`.
pub fn conjugate(signal: &mut SplitSignal) {
    for v in signal.as_mut_slices().1.iter_mut() {
        *v = -*v;
    }
}

/// Test input used by the validation harness: zero everywhere except index
/// `N/2`, which holds `(N, 2N)`.
pub fn golden_impulse(n: usize) -> SplitSignal {
    let mut s = SplitSignal::zeros(n);
    let (re, im) = s.as_mut_slices();
    if let (Some(r), Some(i)) = (re.get_mut(n / 2), im.get_mut(n / 2)) {
        *r = n as f32;
        *i = (2 * n) as f32;
    }
    s
}
