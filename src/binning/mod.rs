//! Binning projected splats into screen-space tiles.
//!
//! The pipeline turns a batch of projected disks into one depth-sorted
//! record list per tile of every camera:
//!
//! 1. [`kernel::count`]: tiles touched per splat.
//! 2. [`kernel::scan::add`]: exclusive scan of the counts.
//! 3. [`kernel::rank`]: one packed `(key, splat index)` record per
//!    touched tile.
//! 4. [`kernel::sort::radix`]: ascending stable sort of the records.
//! 5. [`kernel::segment`]: per-tile ranges over the sorted records.
//!
//! Every stage is a data-parallel pass; stage boundaries are the only
//! synchronization points, and all arrays are written by exactly one
//! owner before the next stage reads them.

pub mod kernel;

pub use crate::error::Error;
pub use kernel::{ceil_log2, TileBounds, DEPTH_BIT_COUNT};

use kernel::{count, rank, scan, segment, sort};
use std::ops::Range;

/// Projected splats, in columns of one entry per splat.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Splats {
    /// `[P, 2]`, screen-space centers in pixels.
    pub centers: Vec<[f32; 2]>,
    /// `[P]`, screen-space radii in pixels. A splat with `radius <= 0`
    /// is culled.
    pub radii: Vec<f32>,
    /// `[P]`, camera-space depths, used only for ordering. Record keys
    /// embed the raw IEEE-754 bit pattern, so the order within a tile
    /// is only defined for non-negative depths.
    pub depths: Vec<f32>,
}

impl Splats {
    /// `P`
    pub fn splat_count(&self) -> usize {
        self.centers.len()
    }
}

/// How splats map to cameras.
#[derive(Clone, Debug, PartialEq)]
pub enum CameraLayout {
    /// `[P]`, one explicit camera id per splat.
    PerSplat(Vec<u32>),
    /// `camera_id = splat_index / splats_per_camera`
    Dense {
        /// `P / C`
        splats_per_camera: u32,
    },
}

/// The tile grid shared by every camera of a batch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileGrid {
    /// `T_s`, pixels per tile edge.
    pub tile_size: u32,
    /// `I_x / T_s`
    pub tile_count_x: u32,
    /// `I_y / T_s`
    pub tile_count_y: u32,
    /// `C`
    pub camera_count: u32,
}

impl TileGrid {
    /// A grid covering an `image_size_x` by `image_size_y` image.
    pub fn for_image(
        image_size_x: u32,
        image_size_y: u32,
        tile_size: u32,
        camera_count: u32,
    ) -> Self {
        Self {
            tile_size,
            tile_count_x: image_size_x.div_ceil(tile_size),
            tile_count_y: image_size_y.div_ceil(tile_size),
            camera_count,
        }
    }

    /// `I_y / T_s * I_x / T_s`
    pub const fn tile_count(&self) -> u64 {
        self.tile_count_x as u64 * self.tile_count_y as u64
    }

    /// Bit width of the tile field in a record key.
    pub const fn tile_bits(&self) -> u32 {
        ceil_log2(self.tile_count())
    }

    /// Bit width of the camera field in a record key.
    pub fn camera_bits(&self) -> u32 {
        ceil_log2(self.camera_count as u64).max(1)
    }

    /// Significant bits of a record key.
    pub fn key_bit_count(&self) -> u32 {
        DEPTH_BIT_COUNT + self.tile_bits() + self.camera_bits()
    }
}

/// The depth-sorted binning of one splat batch.
#[derive(Clone, Debug)]
pub struct BinningOutput {
    /// The grid the batch was binned against.
    pub grid: TileGrid,
    /// `[C * I_y / T_s * I_x / T_s]`, start of each tile's record
    /// range, camera-major then row-major, monotone non-decreasing.
    pub tile_offsets: Vec<u32>,
    /// `[T]`, splat indices grouped by camera, then tile, then
    /// ascending depth.
    pub splat_indices: Vec<u32>,
}

impl BinningOutput {
    /// `T`
    pub fn record_count(&self) -> usize {
        self.splat_indices.len()
    }

    /// The half-open range of [`Self::splat_indices`] belonging to one
    /// tile. Empty for tiles no splat touches. The camera id and tile
    /// coordinates should lie on the grid, or the flattened index
    /// aliases into a neighboring tile's range.
    pub fn tile_range(
        &self,
        camera_id: u32,
        tile_y: u32,
        tile_x: u32,
    ) -> Range<usize> {
        debug_assert!(camera_id < self.grid.camera_count);
        debug_assert!(tile_x < self.grid.tile_count_x);
        debug_assert!(tile_y < self.grid.tile_count_y);

        let index = camera_id as usize * self.grid.tile_count() as usize
            + (tile_y * self.grid.tile_count_x + tile_x) as usize;
        let start = self.tile_offsets[index] as usize;
        let end = self
            .tile_offsets
            .get(index + 1)
            .map_or(self.record_count(), |&offset| offset as usize);
        start..end
    }

    /// The splat indices of one tile, front to back.
    pub fn tile_splats(
        &self,
        camera_id: u32,
        tile_y: u32,
        tile_x: u32,
    ) -> &[u32] {
        &self.splat_indices[self.tile_range(camera_id, tile_y, tile_x)]
    }
}

/// Binning the splats of one batch into depth-sorted per-tile ranges.
///
/// ## Errors
///
/// Precondition violations fail before any pass launches:
/// mismatched column lengths, a zero tile size or camera count, a
/// camera layout that does not cover the batch, and a key bit budget
/// overflow (`camera_bits + tile_bits` past the 31 bits that the packed
/// key leaves next to the depth field).
pub fn bin(
    splats: &Splats,
    layout: &CameraLayout,
    grid: &TileGrid,
) -> Result<BinningOutput, Error> {
    validate(splats, layout, grid)?;

    #[cfg(debug_assertions)]
    log::debug!(target: "splatbin::binning", "start");

    let tile_bits = grid.tile_bits();
    let (camera_ids, splats_per_camera) = match layout {
        CameraLayout::PerSplat(camera_ids) => (Some(camera_ids.as_slice()), 0),
        CameraLayout::Dense { splats_per_camera } => (None, *splats_per_camera),
    };

    let outputs_count = count::main(
        count::Arguments {
            tile_size: grid.tile_size,
            tile_count_x: grid.tile_count_x,
            tile_count_y: grid.tile_count_y,
        },
        count::Inputs {
            centers: &splats.centers,
            radii: &splats.radii,
        },
    );
    #[cfg(debug_assertions)]
    log::debug!(target: "splatbin::binning", "count");

    let outputs_scan = scan::add::main(scan::add::Inputs {
        values: &outputs_count.tile_touched_counts,
    });
    #[cfg(debug_assertions)]
    log::debug!(target: "splatbin::binning", "scan");

    let outputs_rank = rank::main(
        rank::Arguments {
            tile_size: grid.tile_size,
            tile_count_x: grid.tile_count_x,
            tile_count_y: grid.tile_count_y,
            tile_bits,
            splats_per_camera,
        },
        rank::Inputs {
            centers: &splats.centers,
            depths: &splats.depths,
            radii: &splats.radii,
            camera_ids,
            tile_touched_offsets: &outputs_scan.values,
            tile_touched_total: outputs_scan.total,
        },
    );
    #[cfg(debug_assertions)]
    log::debug!(target: "splatbin::binning", "rank");

    let outputs_sort = sort::radix::main(
        sort::radix::Arguments {
            key_bit_count: grid.key_bit_count(),
        },
        sort::radix::Inputs {
            keys: outputs_rank.splat_orders,
            values: outputs_rank.splat_indices,
        },
    );
    #[cfg(debug_assertions)]
    log::debug!(target: "splatbin::binning", "sort");

    let outputs_segment = segment::main(
        segment::Arguments {
            camera_count: grid.camera_count,
            tile_count_x: grid.tile_count_x,
            tile_count_y: grid.tile_count_y,
            tile_bits,
        },
        segment::Inputs {
            splat_orders: &outputs_sort.keys,
        },
    );
    #[cfg(debug_assertions)]
    log::debug!(target: "splatbin::binning", "segment");

    Ok(BinningOutput {
        grid: *grid,
        tile_offsets: outputs_segment.tile_offsets,
        splat_indices: outputs_sort.values,
    })
}

fn validate(
    splats: &Splats,
    layout: &CameraLayout,
    grid: &TileGrid,
) -> Result<(), Error> {
    let splat_count = splats.splat_count();
    if splats.radii.len() != splat_count || splats.depths.len() != splat_count
    {
        return Err(Error::validation(
            "The lengths of the splat columns",
            format!("all {splat_count}"),
        ));
    }
    if grid.tile_size == 0 {
        return Err(Error::validation("The tile size", "more than 0"));
    }
    if grid.camera_count == 0 {
        return Err(Error::validation("The camera count", "more than 0"));
    }
    let key_bit_count =
        DEPTH_BIT_COUNT + grid.tile_bits() + grid.camera_bits();
    if key_bit_count > 63 {
        return Err(Error::validation(
            format!("The key bit count {key_bit_count}"),
            "no more than 63",
        ));
    }
    match layout {
        CameraLayout::PerSplat(camera_ids) => {
            if camera_ids.len() != splat_count {
                return Err(Error::validation(
                    "The length of the camera ids",
                    splat_count.to_string(),
                ));
            }
            if camera_ids
                .iter()
                .any(|&camera_id| camera_id >= grid.camera_count)
            {
                return Err(Error::validation(
                    "The camera ids",
                    format!("less than {}", grid.camera_count),
                ));
            }
        },
        CameraLayout::Dense { splats_per_camera } => {
            let covered =
                *splats_per_camera as u64 * grid.camera_count as u64;
            if covered != splat_count as u64 {
                return Err(Error::validation(
                    format!("The dense camera layout covering {covered}"),
                    format!("{splat_count} splats"),
                ));
            }
        },
    }

    Ok(())
}
