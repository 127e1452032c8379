//! Butterfly index generation.
//!
//! For step `s` of an `N`-point transform the butterflies are visited spectra
//! first, then point:
//!
//! ```text
//! for spectra in 0..num_spectra        // 2^s
//!     for point in (0..N).step_by(stride)   // stride = 2^(s+1)
//!         d0 = spectra + point
//!         d1 = d0 + stride / 2
//!         twiddle = spectra << (num_steps - s)
//! ```
//!
//! The reorder stage scatters inputs and the writeback stage gathers outputs
//! with this exact sequence, so chunk positions line up between the two.

/// Index of the last butterfly step, `log2(N) - 1`.
///
/// Steps run from `0` to `num_steps` inclusive, i.e. `log2(N)` passes. The
/// twiddle shift `num_steps - step` relies on this convention.
pub fn num_steps(domain_size: usize) -> u32 {
    let mut n = domain_size >> 1;
    let mut log = 0u32;
    loop {
        n >>= 1;
        if n == 0 {
            break;
        }
        log += 1;
    }
    log
}

/// Number of chunks needed to carry one step's `N/2` butterflies. Zero for
/// a zero chunk size.
pub fn number_of_chunks(domain_size: usize, chunk_size: usize) -> usize {
    if chunk_size == 0 {
        return 0;
    }
    (domain_size / 2).div_ceil(chunk_size)
}

/// Shape of one butterfly step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepGeometry {
    pub step: u32,
    pub num_steps: u32,
    pub domain_size: usize,
    pub num_spectra: usize,
    /// Distance between consecutive points of the same spectra.
    pub stride: usize,
    /// Distance between `d0` and `d1`.
    pub half_stride: usize,
}

impl StepGeometry {
    pub fn new(step: u32, num_steps: u32, domain_size: usize) -> Self {
        let num_spectra = if step == 0 { 1 } else { 2usize << (step - 1) };
        let stride = 2usize << step;
        Self {
            step,
            num_steps,
            domain_size,
            num_spectra,
            stride,
            half_stride: stride / 2,
        }
    }

    #[inline]
    pub fn twiddle_index(&self, spectra: usize) -> usize {
        spectra << (self.num_steps - self.step)
    }

    /// Butterflies in this step; always `N/2`.
    pub fn butterflies(&self) -> usize {
        self.num_spectra * self.domain_size.div_ceil(self.stride)
    }

    pub fn indices(&self) -> ButterflyIndexer {
        ButterflyIndexer {
            geometry: *self,
            spectra: 0,
            point: 0,
            remaining: self.butterflies(),
        }
    }
}

/// One butterfly: its position in the traversal and the indices it touches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ButterflyIndex {
    pub spectra: usize,
    pub point: usize,
    pub d0: usize,
    pub d1: usize,
    pub twiddle: usize,
}

/// Finite, restartable iterator over a step's butterflies.
#[derive(Clone, Debug)]
pub struct ButterflyIndexer {
    geometry: StepGeometry,
    spectra: usize,
    point: usize,
    remaining: usize,
}

impl ButterflyIndexer {
    pub fn geometry(&self) -> &StepGeometry {
        &self.geometry
    }
}

impl Iterator for ButterflyIndexer {
    type Item = ButterflyIndex;

    fn next(&mut self) -> Option<ButterflyIndex> {
        let g = &self.geometry;
        if self.spectra >= g.num_spectra {
            return None;
        }
        let d0 = self.spectra + self.point;
        let item = ButterflyIndex {
            spectra: self.spectra,
            point: self.point,
            d0,
            d1: d0 + g.half_stride,
            twiddle: g.twiddle_index(self.spectra),
        };
        self.point += g.stride;
        if self.point >= g.domain_size {
            self.point = 0;
            self.spectra += 1;
        }
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for ButterflyIndexer {}

/// Butterflies of `step`, in the order shared by scatter and gather.
pub fn indices_for(step: u32, num_steps: u32, domain_size: usize) -> ButterflyIndexer {
    StepGeometry::new(step, num_steps, domain_size).indices()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    #[test]
    fn num_steps_is_log2_minus_one() {
        assert_eq!(num_steps(2), 0);
        assert_eq!(num_steps(4), 1);
        assert_eq!(num_steps(8), 2);
        assert_eq!(num_steps(1024), 9);
    }

    #[test]
    fn chunk_count_rounds_up() {
        assert_eq!(number_of_chunks(16, 4), 2);
        assert_eq!(number_of_chunks(16, 3), 3);
        assert_eq!(number_of_chunks(16, 8), 1);
        assert_eq!(number_of_chunks(16, 100), 1);
        assert_eq!(number_of_chunks(16, 0), 0);
    }

    #[test]
    fn eight_point_step_one() {
        let got: Vec<(usize, usize, usize)> = indices_for(1, 2, 8)
            .map(|b| (b.d0, b.d1, b.twiddle))
            .collect();
        assert_eq!(got, vec![(0, 2, 0), (4, 6, 0), (1, 3, 2), (5, 7, 2)]);
    }

    #[test]
    fn last_step_uses_every_twiddle() {
        let n = 16;
        let ns = num_steps(n);
        let twiddles: Vec<usize> = indices_for(ns, ns, n).map(|b| b.twiddle).collect();
        assert_eq!(twiddles, (0..n / 2).collect::<Vec<_>>());
    }

    #[test]
    fn restartable_and_exact_size() {
        let it = indices_for(2, 3, 16);
        assert_eq!(it.len(), 8);
        let first: Vec<ButterflyIndex> = it.clone().collect();
        let second: Vec<ButterflyIndex> = it.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn two_point_domain() {
        let all: Vec<ButterflyIndex> = indices_for(0, 0, 2).collect();
        assert_eq!(
            all,
            vec![ButterflyIndex {
                spectra: 0,
                point: 0,
                d0: 0,
                d1: 1,
                twiddle: 0
            }]
        );
    }
}
