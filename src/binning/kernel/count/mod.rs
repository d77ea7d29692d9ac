//! Counting the tiles touched by each splat.

pub use super::*;

use rayon::iter::{
    IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator,
};

/// Arguments.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct Arguments {
    /// `T_s`
    pub tile_size: u32,
    /// `I_x / T_s`
    pub tile_count_x: u32,
    /// `I_y / T_s`
    pub tile_count_y: u32,
}

/// Inputs.
#[derive(Clone, Copy, Debug)]
pub struct Inputs<'a> {
    /// `[P, 2]`
    pub centers: &'a [[f32; 2]],
    /// `[P]`
    pub radii: &'a [f32],
}

/// Outputs.
#[derive(Clone, Debug)]
pub struct Outputs {
    /// `[P]`
    pub tile_touched_counts: Vec<u32>,
}

/// Counting the tiles touched by each splat.
///
/// A splat with `radius <= 0` is culled and touches zero tiles. Each
/// count lands at its own splat's index, so the pass is purely local.
pub fn main(
    arguments: Arguments,
    inputs: Inputs,
) -> Outputs {
    let tile_touched_counts = inputs
        .centers
        .par_iter()
        .zip(inputs.radii)
        .map(|(&center, &radius)| {
            if radius <= 0.0 {
                return 0;
            }
            TileBounds::new(
                center,
                radius,
                arguments.tile_size,
                arguments.tile_count_x,
                arguments.tile_count_y,
            )
            .area()
        })
        .collect();

    Outputs {
        tile_touched_counts,
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn count_culled_and_straddling() {
        use super::*;

        let arguments = Arguments {
            tile_size: 16,
            tile_count_x: 2,
            tile_count_y: 2,
        };
        // One splat inside a single tile, one culled, one on the tile
        // crossing, and one off the grid.
        let centers_source =
            [[8.0, 8.0], [24.0, 24.0], [16.0, 16.0], [-40.0, 8.0]];
        let radii_source = [4.0, 0.0, 6.0, 4.0];

        let counts_target = [1, 0, 4, 0];

        let Outputs {
            tile_touched_counts,
        } = main(
            arguments,
            Inputs {
                centers: &centers_source,
                radii: &radii_source,
            },
        );

        tile_touched_counts
            .iter()
            .zip(&counts_target)
            .enumerate()
            .for_each(|(index, (output, target))| {
                assert_eq!(output, target, "index: {index}");
            });
    }

    #[test]
    fn count_empty() {
        use super::*;

        let Outputs {
            tile_touched_counts,
        } = main(
            Arguments {
                tile_size: 16,
                tile_count_x: 4,
                tile_count_y: 4,
            },
            Inputs {
                centers: &[],
                radii: &[],
            },
        );

        assert!(tile_touched_counts.is_empty());
    }
}
