//! Sorting the records by their packed keys.

pub use super::*;

use rayon::iter::ParallelIterator;
use rayon::slice::ParallelSlice;
use std::mem::swap;

/// Arguments.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct Arguments {
    /// `|Key|`, the count of significant key bits to sort on.
    pub key_bit_count: u32,
}

/// Inputs.
#[derive(Clone, Debug)]
pub struct Inputs {
    /// `[N]`, the keys of records to sort.
    pub keys: Vec<u64>,
    /// `[N]`, the values of records to sort.
    pub values: Vec<u32>,
}

/// Outputs.
#[derive(Clone, Debug)]
pub struct Outputs {
    /// `[N]`, the keys of sorted records.
    pub keys: Vec<u64>,
    /// `[N]`, the values of sorted records.
    pub values: Vec<u32>,
}

/// `N / N'`
pub const GROUP_SIZE: usize = 1 << 14;
/// `R`
pub const RADIX_COUNT: usize = 1 << RADIX_COUNT_SHIFT;
/// `log2(R)`
pub const RADIX_COUNT_SHIFT: u32 = 8;

/// Sorting the records by their packed keys, stably and ascending.
///
/// A least-significant-digit pass per [`RADIX_COUNT_SHIFT`] key bits:
/// per-group digit histograms, one digit-major exclusive scan turning
/// them into scatter offsets, then a stable scatter. The pass ping-pongs
/// between two buffers; the swap at the end of every pass leaves the
/// latest result in the input buffer, which the last pass hands out.
pub fn main(
    arguments: Arguments,
    inputs: Inputs,
) -> Outputs {
    let count = inputs.keys.len();

    let mut keys_input = inputs.keys;
    let mut values_input = inputs.values;
    // [N]
    let mut keys_output = vec![0_u64; count];
    // [N]
    let mut values_output = vec![0_u32; count];

    for radix_shift in
        (0..arguments.key_bit_count).step_by(RADIX_COUNT_SHIFT as usize)
    {
        let digit_of = |key: u64| {
            ((key >> radix_shift) as usize) & (RADIX_COUNT - 1)
        };

        // [N', R]
        let mut counts_radix_group = keys_input
            .par_chunks(GROUP_SIZE)
            .map(|group| {
                let mut counts = [0_u32; RADIX_COUNT];
                for &key in group {
                    counts[digit_of(key)] += 1;
                }
                counts
            })
            .collect::<Vec<_>>();

        // The digit-major scan turns each (group, radix) count into the
        // group's first output slot for that digit.
        let mut offset = 0;
        for radix in 0..RADIX_COUNT {
            for counts in &mut counts_radix_group {
                let count = counts[radix];
                counts[radix] = offset;
                offset += count;
            }
        }

        for ((keys_group, values_group), cursors) in keys_input
            .chunks(GROUP_SIZE)
            .zip(values_input.chunks(GROUP_SIZE))
            .zip(&mut counts_radix_group)
        {
            for (&key, &value) in keys_group.iter().zip(values_group) {
                let slot = cursors[digit_of(key)] as usize;
                cursors[digit_of(key)] += 1;
                keys_output[slot] = key;
                values_output[slot] = value;
            }
        }

        swap(&mut keys_input, &mut keys_output);
        swap(&mut values_input, &mut values_output);
    }

    Outputs {
        keys: keys_input,
        values: values_input,
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn sort_stable_small() {
        use super::*;

        let keys_source = vec![
            0x221a707e, 0x404673dd, 0x08f23dac, 0x79dc4824, 0x60986a48,
            0x6f358f8e, 0x61f1a696, 0x2255a70e, 0x3009911f, 0x3628f9f4,
            0x3c95798b, 0x561b9e2e, 0x41c02344, 0x168ff8d5,
        ];
        let values_source =
            (0..keys_source.len() as u32 * 10).step_by(10).collect();

        let keys_target = vec![
            0x08f23dac, 0x168ff8d5, 0x221a707e, 0x2255a70e, 0x3009911f,
            0x3628f9f4, 0x3c95798b, 0x404673dd, 0x41c02344, 0x561b9e2e,
            0x60986a48, 0x61f1a696, 0x6f358f8e, 0x79dc4824,
        ];
        let values_target =
            vec![20, 130, 0, 70, 80, 90, 100, 10, 120, 110, 40, 60, 50, 30];

        let Outputs { keys, values } = main(
            Arguments { key_bit_count: 32 },
            Inputs {
                keys: keys_source,
                values: values_source,
            },
        );

        assert_eq!(keys, keys_target);
        assert_eq!(values, values_target);
    }

    #[test]
    fn sort_stable_equal_keys() {
        use super::*;

        let keys_source = vec![7, 3, 7, 3, 7, 3];
        let values_source = vec![0, 1, 2, 3, 4, 5];

        let keys_target = vec![3, 3, 3, 7, 7, 7];
        let values_target = vec![1, 3, 5, 0, 2, 4];

        let Outputs { keys, values } = main(
            Arguments { key_bit_count: 40 },
            Inputs {
                keys: keys_source,
                values: values_source,
            },
        );

        assert_eq!(keys, keys_target);
        assert_eq!(values, values_target);
    }

    #[test]
    fn sort_stable_random() {
        use super::*;
        use rand::{rngs::StdRng, Rng, SeedableRng};

        let count = (GROUP_SIZE << 2) - 1;
        let key_bit_count = 48;
        let keys_source = StdRng::seed_from_u64(0)
            .sample_iter(rand::distributions::Uniform::new(
                0,
                1_u64 << key_bit_count,
            ))
            .take(count)
            .collect::<Vec<_>>();
        let values_source = (0..count as u32).collect::<Vec<_>>();

        let (keys_target, values_target) = {
            let mut records_source = keys_source
                .iter()
                .zip(&values_source)
                .map(|(&key, &value)| (key, value))
                .collect::<Vec<_>>();
            records_source.sort_by_key(|record| record.0);
            records_source.into_iter().unzip::<_, _, Vec<_>, Vec<_>>()
        };

        let Outputs { keys, values } = main(
            Arguments {
                key_bit_count: key_bit_count as u32,
            },
            Inputs {
                keys: keys_source,
                values: values_source,
            },
        );

        keys.iter().zip(&keys_target).enumerate().for_each(
            |(index, (output, target))| {
                assert_eq!(output, target, "key index: {index}");
            },
        );
        values.iter().zip(&values_target).enumerate().for_each(
            |(index, (output, target))| {
                assert_eq!(output, target, "value index: {index}");
            },
        );
    }
}
