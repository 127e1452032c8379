//! Radix-2 decimation-in-time butterfly arithmetic.
//!
//! The compute stage and the serial reference both go through these
//! functions, which keeps their results bit-identical.

use crate::num::Complex32;

/// `b * w` with four real multiplies and two real adds.
#[inline(always)]
pub fn complex_multiply(b: Complex32, w: Complex32) -> Complex32 {
    Complex32 {
        re: (b.re * w.re) - (b.im * w.im),
        im: (b.re * w.im) + (b.im * w.re),
    }
}

/// `a + b * w`.
#[inline(always)]
pub fn complex_multiply_add(a: Complex32, b: Complex32, w: Complex32) -> Complex32 {
    complex_add(a, complex_multiply(b, w))
}

#[inline(always)]
pub fn complex_add(a: Complex32, f: Complex32) -> Complex32 {
    Complex32 {
        re: a.re + f.re,
        im: a.im + f.im,
    }
}

#[inline(always)]
pub fn complex_subtract(a: Complex32, f: Complex32) -> Complex32 {
    Complex32 {
        re: a.re - f.re,
        im: a.im - f.im,
    }
}

/// Conjugate a sample; used on ingest of a backward transform.
#[inline(always)]
pub fn negate_imaginary(c: Complex32) -> Complex32 {
    Complex32 {
        re: c.re,
        im: -c.im,
    }
}

/// One butterfly: returns `(a + b·w, a - b·w)`.
#[inline(always)]
pub fn butterfly(a: Complex32, b: Complex32, w: Complex32) -> (Complex32, Complex32) {
    let f = complex_multiply(b, w);
    (complex_add(a, f), complex_subtract(a, f))
}

/// Planar operands of a run of butterflies: `data0`, `data1` and `twiddle`
/// streams, each split into real and imaginary scalars.
#[derive(Clone, Copy, Debug)]
pub struct ButterflyInputs<'a> {
    pub d0_re: &'a [f32],
    pub d0_im: &'a [f32],
    pub d1_re: &'a [f32],
    pub d1_im: &'a [f32],
    pub tw_re: &'a [f32],
    pub tw_im: &'a [f32],
}

impl ButterflyInputs<'_> {
    /// Common length of all six streams, or `None` if they disagree.
    pub fn len(&self) -> Option<usize> {
        let n = self.d0_re.len();
        let lens = [
            self.d0_im.len(),
            self.d1_re.len(),
            self.d1_im.len(),
            self.tw_re.len(),
            self.tw_im.len(),
        ];
        if lens.iter().all(|&l| l == n) {
            Some(n)
        } else {
            None
        }
    }
}

/// Planar destinations for the `data0` and `data1` results.
#[derive(Debug)]
pub struct ButterflyOutputs<'a> {
    pub out0_re: &'a mut [f32],
    pub out0_im: &'a mut [f32],
    pub out1_re: &'a mut [f32],
    pub out1_im: &'a mut [f32],
}

/// Apply [`butterfly`] element-wise. Processes the first `len` elements,
/// where `len` is the shortest of the output slices and `inputs.len()`.
pub fn butterfly_run(inputs: &ButterflyInputs<'_>, outputs: &mut ButterflyOutputs<'_>) -> usize {
    let len = inputs
        .len()
        .unwrap_or(0)
        .min(outputs.out0_re.len())
        .min(outputs.out0_im.len())
        .min(outputs.out1_re.len())
        .min(outputs.out1_im.len());
    for i in 0..len {
        let a = Complex32::new(inputs.d0_re[i], inputs.d0_im[i]);
        let b = Complex32::new(inputs.d1_re[i], inputs.d1_im[i]);
        let w = Complex32::new(inputs.tw_re[i], inputs.tw_im[i]);
        let (x0, x1) = butterfly(a, b, w);
        outputs.out0_re[i] = x0.re;
        outputs.out0_im[i] = x0.im;
        outputs.out1_re[i] = x1.re;
        outputs.out1_im[i] = x1.im;
    }
    len
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiply_by_unit_twiddle_is_identity() {
        let b = Complex32::new(3.0, -7.0);
        assert_eq!(complex_multiply(b, Complex32::new(1.0, 0.0)), b);
    }

    #[test]
    fn multiply_by_minus_j_rotates() {
        let b = Complex32::new(2.0, 5.0);
        // (2 + 5j)(-j) = 5 - 2j
        assert_eq!(
            complex_multiply(b, Complex32::new(0.0, -1.0)),
            Complex32::new(5.0, -2.0)
        );
    }

    #[test]
    fn butterfly_sum_and_difference() {
        let a = Complex32::new(1.0, 2.0);
        let b = Complex32::new(3.0, 4.0);
        let w = Complex32::new(1.0, 0.0);
        let (x0, x1) = butterfly(a, b, w);
        assert_eq!(x0, Complex32::new(4.0, 6.0));
        assert_eq!(x1, Complex32::new(-2.0, -2.0));
        assert_eq!(x0, complex_multiply_add(a, b, w));
    }

    #[test]
    fn run_rejects_ragged_inputs() {
        let one = [1.0f32];
        let two = [1.0f32, 2.0];
        let inputs = ButterflyInputs {
            d0_re: &one,
            d0_im: &one,
            d1_re: &two,
            d1_im: &one,
            tw_re: &one,
            tw_im: &one,
        };
        assert_eq!(inputs.len(), None);
        let mut o = [[0.0f32; 1]; 4];
        let [o0, o1, o2, o3] = &mut o;
        let mut outputs = ButterflyOutputs {
            out0_re: o0,
            out0_im: o1,
            out1_re: o2,
            out1_im: o3,
        };
        assert_eq!(butterfly_run(&inputs, &mut outputs), 0);
    }

    #[test]
    fn negate_imaginary_conjugates() {
        assert_eq!(
            negate_imaginary(Complex32::new(1.5, -2.5)),
            Complex32::new(1.5, 2.5)
        );
    }
}
