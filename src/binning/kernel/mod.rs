//! Binning kernels.

pub mod count;
pub mod rank;
pub mod scan;
pub mod segment;
pub mod sort;

pub use bytemuck::{Pod, Zeroable};

/// `|D|`, bit count of the depth field in a record key.
pub const DEPTH_BIT_COUNT: u32 = 32;

/// `ceil(log2(value))`, where `value <= 1` maps to `0`.
pub const fn ceil_log2(value: u64) -> u32 {
    if value <= 1 {
        0
    } else {
        u64::BITS - (value - 1).leading_zeros()
    }
}

/// Packing one record key.
///
/// From most- to least-significant: camera id, tile id, then the raw
/// IEEE-754 bit pattern of the depth. Raw float bits only order
/// correctly as unsigned integers for non-negative depths.
pub fn pack_key(
    camera_id: u32,
    tile_id: u32,
    depth: f32,
    tile_bits: u32,
) -> u64 {
    (((camera_id as u64) << tile_bits) | tile_id as u64) << DEPTH_BIT_COUNT
        | depth.to_bits() as u64
}

/// Decoding `(camera_id, tile_id)` from a record key.
pub const fn unpack_key(
    key: u64,
    tile_bits: u32,
) -> (u32, u32) {
    let tile_key = key >> DEPTH_BIT_COUNT;
    (
        (tile_key >> tile_bits) as u32,
        (tile_key & ((1 << tile_bits) - 1)) as u32,
    )
}

/// The tile rectangle touched by one splat.
///
/// `min_*` is inclusive and `max_*` is exclusive. Both are clamped to
/// `[0, tile_count_*]`, so a footprint fully outside the grid yields an
/// empty rectangle.
#[repr(C)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Pod, Zeroable)]
pub struct TileBounds {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl TileBounds {
    /// The clamped tile rectangle of a disk footprint.
    ///
    /// The radius should be positive. Malformed centers collapse to an
    /// empty rectangle through the clamps.
    pub fn new(
        center: [f32; 2],
        radius: f32,
        tile_size: u32,
        tile_count_x: u32,
        tile_count_y: u32,
    ) -> Self {
        let tile_size = tile_size as f32;
        let bound =
            |value: f32, tile_count: u32| value.clamp(0.0, tile_count as f32) as u32;
        Self {
            min_x: bound(((center[0] - radius) / tile_size).floor(), tile_count_x),
            min_y: bound(((center[1] - radius) / tile_size).floor(), tile_count_y),
            max_x: bound(((center[0] + radius) / tile_size).ceil(), tile_count_x),
            max_y: bound(((center[1] + radius) / tile_size).ceil(), tile_count_y),
        }
    }

    /// The count of tiles in the rectangle.
    pub const fn area(&self) -> u32 {
        (self.max_x - self.min_x) * (self.max_y - self.min_y)
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn ceil_log2_boundaries() {
        use super::*;

        let cases_source =
            [(0, 0), (1, 0), (2, 1), (3, 2), (4, 2), (5, 3), (1 << 16, 16)];
        cases_source.iter().for_each(|&(value, target)| {
            assert_eq!(ceil_log2(value), target, "value: {value}");
        });
    }

    #[test]
    fn pack_then_unpack() {
        use super::*;

        let tile_bits = 11;
        let key = pack_key(5, 1234, 7.25, tile_bits);

        assert_eq!(unpack_key(key, tile_bits), (5, 1234));
        assert_eq!(key as u32, 7.25_f32.to_bits());
    }

    #[test]
    fn tile_bounds_clamped() {
        use super::*;

        // The footprint pokes over the left and top grid edges.
        let bounds = TileBounds::new([2.0, 2.0], 20.0, 16, 4, 4);
        assert_eq!(
            bounds,
            TileBounds {
                min_x: 0,
                min_y: 0,
                max_x: 2,
                max_y: 2,
            },
        );
        assert_eq!(bounds.area(), 4);

        // Fully off-grid footprints collapse to an empty rectangle.
        let bounds = TileBounds::new([-100.0, 8.0], 4.0, 16, 4, 4);
        assert_eq!(bounds.area(), 0);
    }
}
