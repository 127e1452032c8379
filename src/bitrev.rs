//! Bit-reversal permutation applied once before the first butterfly step.

/// Visit every swap `(i, j)` with `i < j` of the bit-reversal permutation of
/// `n` elements, in ascending `i`.
///
/// `j` tracks the bit-reversed counterpart of `i`: each iteration performs a
/// binary increment on `j` in reversed bit order by clearing the leading run
/// of set bits (starting from `n >> 1`) and setting the next one.
fn for_each_swap(n: usize, mut swap: impl FnMut(usize, usize)) {
    if n < 2 {
        return;
    }
    let mut j = 0usize;
    for i in 0..n - 1 {
        if i < j {
            swap(i, j);
        }
        let mut k = n >> 1;
        while k <= j {
            j -= k;
            k >>= 1;
        }
        j += k;
    }
}

/// Bit-reverse a single array in place.
pub fn bit_reverse_in_place<T>(data: &mut [T]) {
    for_each_swap(data.len(), |i, j| data.swap(i, j));
}

/// Bit-reverse a planar complex signal in place.
///
/// Both arrays are permuted with the same swaps so each real part stays paired
/// with its imaginary part.
///
/// # Panics
/// If `re` and `im` differ in length.
pub fn permute_in_place(re: &mut [f32], im: &mut [f32]) {
    assert_eq!(re.len(), im.len());
    for_each_swap(re.len(), |i, j| {
        re.swap(i, j);
        im.swap(i, j);
    });
}

/// Bit-reversed value of `index` over `bits` bits.
pub fn reversed_index(index: usize, bits: u32) -> usize {
    if bits == 0 {
        return 0;
    }
    index.reverse_bits() >> (usize::BITS - bits)
}
