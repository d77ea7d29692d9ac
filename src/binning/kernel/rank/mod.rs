//! Ranking the splats into camera, tile, and depth order.

pub use super::*;

use rayon::iter::{IntoParallelIterator, ParallelIterator};

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
    /// Bit width of the tile field in a record key.
    pub tile_bits: u32,
    /// `P / C` for the dense camera layout. Unused when explicit camera
    /// ids are supplied.
    pub splats_per_camera: u32,
}

/// Inputs.
#[derive(Clone, Copy, Debug)]
pub struct Inputs<'a> {
    /// `[P, 2]`
    pub centers: &'a [[f32; 2]],
    /// `[P]`
    pub depths: &'a [f32],
    /// `[P]`
    pub radii: &'a [f32],
    /// `[P]`, explicit camera ids for the ragged layout.
    pub camera_ids: Option<&'a [u32]>,
    /// `[P]`, exclusive scan of the tile-touched counts.
    pub tile_touched_offsets: &'a [u32],
    /// Total of the tile-touched counts.
    pub tile_touched_total: u32,
}

/// Outputs.
#[derive(Clone, Debug)]
pub struct Outputs {
    /// `[T]`, packed record keys.
    pub splat_orders: Vec<u64>,
    /// `[T]`, the owning splat's index per record.
    pub splat_indices: Vec<u32>,
}

/// Ranking the splats into camera, tile, and depth order.
///
/// Each splat emits one record per touched tile, walking its clamped
/// tile rectangle in row-major order. The tile rectangle is recomputed
/// rather than carried over from the counting pass. The exclusive scan
/// partitions the record array, so every splat owns one consecutive
/// output span and the spans never collide.
pub fn main(
    arguments: Arguments,
    inputs: Inputs,
) -> Outputs {
    let splat_count = inputs.radii.len();
    let total = inputs.tile_touched_total as usize;

    // [T]
    let mut splat_orders = vec![0_u64; total];
    // [T]
    let mut splat_indices = vec![0_u32; total];

    // Handing out each splat's own span of the record arrays.
    let mut spans = Vec::with_capacity(splat_count);
    {
        let mut orders_rest = splat_orders.as_mut_slice();
        let mut indices_rest = splat_indices.as_mut_slice();
        for index in 0..splat_count {
            let start = inputs.tile_touched_offsets[index] as usize;
            let end = inputs
                .tile_touched_offsets
                .get(index + 1)
                .map_or(total, |&offset| offset as usize);
            let (orders, rest) = orders_rest.split_at_mut(end - start);
            orders_rest = rest;
            let (indices, rest) = indices_rest.split_at_mut(end - start);
            indices_rest = rest;
            spans.push((index, orders, indices));
        }
    }

    spans.into_par_iter().for_each(|(index, orders, indices)| {
        let radius = inputs.radii[index];
        if radius <= 0.0 {
            return;
        }
        let bounds = TileBounds::new(
            inputs.centers[index],
            radius,
            arguments.tile_size,
            arguments.tile_count_x,
            arguments.tile_count_y,
        );
        let camera_id = match inputs.camera_ids {
            Some(camera_ids) => camera_ids[index],
            None => index as u32 / arguments.splats_per_camera,
        };
        let depth = inputs.depths[index];

        let mut cursor = 0;
        for tile_y in bounds.min_y..bounds.max_y {
            for tile_x in bounds.min_x..bounds.max_x {
                let tile_id = tile_y * arguments.tile_count_x + tile_x;
                orders[cursor] =
                    pack_key(camera_id, tile_id, depth, arguments.tile_bits);
                indices[cursor] = index as u32;
                cursor += 1;
            }
        }
    });

    Outputs {
        splat_orders,
        splat_indices,
    }
}
