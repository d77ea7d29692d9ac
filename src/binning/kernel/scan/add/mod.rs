//! Scanning the values exclusively.

pub use super::*;

use rayon::iter::{
    IndexedParallelIterator, IntoParallelIterator, ParallelIterator,
};
use rayon::slice::{ParallelSlice, ParallelSliceMut};

/// Inputs.
#[derive(Clone, Copy, Debug)]
pub struct Inputs<'a> {
    /// `[N]`, the values to scan.
    pub values: &'a [u32],
}

/// Outputs.
#[derive(Clone, Debug)]
pub struct Outputs {
    /// `[N]`, the exclusively scanned values.
    pub values: Vec<u32>,
    /// The total of scanned values.
    pub total: u32,
}

/// `N / N'`
pub const GROUP_SIZE: usize = 1 << 14;

/// Scanning the values exclusively.
///
/// Each group of [`GROUP_SIZE`] values reduces to a partial sum; the
/// scanned partials then seed one sequential scan per group.
pub fn main(inputs: Inputs) -> Outputs {
    let values = inputs.values;

    // [N']
    let mut totals_group = values
        .par_chunks(GROUP_SIZE)
        .map(|group| group.iter().sum::<u32>())
        .collect::<Vec<_>>();

    let mut total = 0;
    for total_group in &mut totals_group {
        let sum = *total_group;
        *total_group = total;
        total += sum;
    }

    // [N]
    let mut values_output = vec![0; values.len()];
    values_output
        .par_chunks_mut(GROUP_SIZE)
        .zip(values.par_chunks(GROUP_SIZE))
        .zip(totals_group.into_par_iter())
        .for_each(|((group_output, group), mut state)| {
            for (output, &value) in group_output.iter_mut().zip(group) {
                *output = state;
                state += value;
            }
        });

    Outputs {
        values: values_output,
        total,
    }
}
