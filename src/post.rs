//! Post-processing passes applied outside the transform core.
//!
//! Running FORWARD and then BACKWARD leaves the signal scaled by `N` and
//! conjugated. [`descale`] undoes both. [`move_origin`] multiplies each sample
//! by `(-1)^index`, an origin shift in the frequency domain.

use crate::num::SplitSignal;

/// Multiply sample `i` by `(-1)^i`.
pub fn move_origin(signal: &mut SplitSignal) {
    let (re, im) = signal.as_mut_slices();
    for (r, i) in re.iter_mut().zip(im.iter_mut()).skip(1).step_by(2) {
        *r = -*r;
        *i = -*i;
    }
}

/// Divide by `N` and negate the imaginary part.
pub fn descale(signal: &mut SplitSignal) {
    let n = signal.len() as f32;
    let (re, im) = signal.as_mut_slices();
    for r in re.iter_mut() {
        *r /= n;
    }
    for i in im.iter_mut() {
        *i = -(*i / n);
    }
}
