//! Segmenting the sorted records into per-tile ranges.

pub use super::*;

use rayon::iter::{IntoParallelIterator, ParallelIterator};

/// Arguments.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct Arguments {
    /// `C`
    pub camera_count: u32,
    /// `I_x / T_s`
    pub tile_count_x: u32,
    /// `I_y / T_s`
    pub tile_count_y: u32,
    /// Bit width of the tile field in a record key.
    pub tile_bits: u32,
}

/// Inputs.
#[derive(Clone, Copy, Debug)]
pub struct Inputs<'a> {
    /// `[T]`, sorted record keys.
    pub splat_orders: &'a [u64],
}

/// Outputs.
#[derive(Clone, Debug)]
pub struct Outputs {
    /// `[C * I_y / T_s * I_x / T_s]`, start of each tile's record
    /// range, camera-major then row-major; the end of a tile's range is
    /// the next entry, or the record total for the last tile.
    pub tile_offsets: Vec<u32>,
}

/// Segmenting the sorted records into per-tile ranges.
///
/// Tile transitions are detected over the sorted keys in parallel; the
/// fill spans they imply are ordered and disjoint, so applying them is
/// a walk over the table. Tiles without records inherit the start of
/// the next occupied tile, which keeps the table monotone.
pub fn main(
    arguments: Arguments,
    inputs: Inputs,
) -> Outputs {
    let splat_orders = inputs.splat_orders;
    let tile_count =
        (arguments.tile_count_x * arguments.tile_count_y) as usize;
    let table_len = arguments.camera_count as usize * tile_count;
    let total = splat_orders.len() as u32;

    // [C * I_y / T_s * I_x / T_s]
    let mut tile_offsets = vec![0; table_len];
    if splat_orders.is_empty() {
        return Outputs { tile_offsets };
    }

    let table_index = |key: u64| {
        let (camera_id, tile_id) = unpack_key(key, arguments.tile_bits);
        camera_id as usize * tile_count + tile_id as usize
    };

    // [(record index, previous table index, table index)]
    let transitions = (1..splat_orders.len())
        .into_par_iter()
        .filter_map(|index| {
            let this = table_index(splat_orders[index]);
            let previous = table_index(splat_orders[index - 1]);
            (this != previous).then_some((index as u32, previous, this))
        })
        .collect::<Vec<_>>();

    // Every tile at or before the first occupied one starts at record
    // zero, which the zero fill above already covers.
    for (index, previous, this) in transitions {
        tile_offsets[previous + 1..=this].fill(index);
    }
    let last = table_index(splat_orders[splat_orders.len() - 1]);
    tile_offsets[last + 1..].fill(total);

    Outputs { tile_offsets }
}
