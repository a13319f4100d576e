// Copyright (c) 2024 The swimage developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Image storage (1D, 2D, 3D, arrays, etc.) and image views.
//!
//! An *image* is a region of memory whose purpose is to store multi-dimensional texel data. Each
//! image has one or more mip levels, one or more array layers and one or more aspects; a
//! *subresource* is one (aspect, mip level, array layer) triple.
//!
//! # Images and image views
//!
//! There is a distinction between *images* and *image views*. As its name suggests, an image
//! view describes how an image must be interpreted: which of its subresources are visible, with
//! which shape (1D, 2D array, cube, ...) and with which format.
//!
//! Anything that owns texel storage can be viewed, as long as it implements [`ImageAccess`]. The
//! [`Image`] type of this module is a plain in-memory implementation with a linear layout.
//!
//! [`ImageView`]: crate::image::view::ImageView

pub use self::{
    aspect::{ImageAspect, ImageAspects},
    sys::{Image, ImageCreateInfo},
    traits::ImageAccess,
};
use crate::macros::{vulkan_bitflags, vulkan_enum};
use std::{cmp::max, ops::Range};

mod aspect;
pub mod sampler;
pub mod sys;
mod traits;
pub mod view;

vulkan_enum! {
    /// The basic dimensionality of an image.
    ImageType = ImageType(i32);

    Dim1d = TYPE_1D,

    Dim2d = TYPE_2D,

    Dim3d = TYPE_3D,
}

vulkan_bitflags! {
    /// Flags specifying additional properties of an image.
    ImageCreateFlags = ImageCreateFlags(u32);

    /// For 2D images, allows creation of an image view of type `Cube` or `CubeArray`.
    CUBE_COMPATIBLE = CUBE_COMPATIBLE,
}

/// Returns the maximum number of mipmap levels for the given image extent.
///
/// The returned value is always at least 1.
///
/// # Examples
///
/// ```
/// use swimage::image::max_mip_levels;
///
/// assert_eq!(max_mip_levels([32, 50, 1]), 6);
/// ```
#[inline]
pub fn max_mip_levels(extent: [u32; 3]) -> u32 {
    // This calculates `floor(log2(max(width, height, depth))) + 1` using fast integer operations.
    32 - (extent[0] | extent[1] | extent[2]).leading_zeros()
}

/// Returns the extent of the `level`th mipmap level.
/// If `level` is 0, then it returns `extent` back unchanged.
///
/// Returns `None` if `level` is not less than `max_mip_levels(extent)`.
///
/// # Examples
///
/// ```
/// use swimage::image::mip_level_extent;
///
/// let extent = [963, 256, 1];
///
/// assert_eq!(mip_level_extent(extent, 0), Some(extent));
/// assert_eq!(mip_level_extent(extent, 1), Some([481, 128, 1]));
/// assert_eq!(mip_level_extent(extent, 6), Some([15, 4, 1]));
/// assert_eq!(mip_level_extent(extent, 9), Some([1, 1, 1]));
/// assert_eq!(mip_level_extent(extent, 11), None);
/// ```
///
/// # Panics
///
/// - In debug mode, panics if `extent` contains 0.
///   In release, returns an unspecified value.
#[inline]
pub fn mip_level_extent(extent: [u32; 3], level: u32) -> Option<[u32; 3]> {
    if level == 0 {
        return Some(extent);
    }

    if level >= max_mip_levels(extent) {
        return None;
    }

    Some(extent.map(|x| {
        debug_assert!(x != 0);
        max(1, x >> level)
    }))
}

/// One or more subresources of an image that should be accessed by an operation.
///
/// When describing the range of a view, `level_count` and `layer_count` may hold
/// [`REMAINING_MIP_LEVELS`] and [`REMAINING_ARRAY_LAYERS`] to select everything from the base
/// level or layer to the end of the image. Views replace these values with concrete counts when
/// they are created.
///
/// [`REMAINING_MIP_LEVELS`]: crate::REMAINING_MIP_LEVELS
/// [`REMAINING_ARRAY_LAYERS`]: crate::REMAINING_ARRAY_LAYERS
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageSubresourceRange {
    /// Selects the aspects that will be included.
    pub aspects: ImageAspects,

    /// The first mip level that will be included.
    pub base_mip_level: u32,

    /// The number of mip levels, or `REMAINING_MIP_LEVELS`.
    pub level_count: u32,

    /// The first array layer that will be included.
    pub base_array_layer: u32,

    /// The number of array layers, or `REMAINING_ARRAY_LAYERS`.
    pub layer_count: u32,
}

impl ImageSubresourceRange {
    /// Returns the range of mip levels.
    ///
    /// # Panics
    ///
    /// - Panics if `level_count` is still `REMAINING_MIP_LEVELS`.
    #[inline]
    pub fn mip_levels(&self) -> Range<u32> {
        assert_ne!(self.level_count, crate::REMAINING_MIP_LEVELS, "unresolved level count");
        self.base_mip_level..self.base_mip_level + self.level_count
    }

    /// Returns the range of array layers.
    ///
    /// # Panics
    ///
    /// - Panics if `layer_count` is still `REMAINING_ARRAY_LAYERS`.
    #[inline]
    pub fn array_layers(&self) -> Range<u32> {
        assert_ne!(self.layer_count, crate::REMAINING_ARRAY_LAYERS, "unresolved layer count");
        self.base_array_layer..self.base_array_layer + self.layer_count
    }
}

impl From<ImageSubresourceRange> for ash::vk::ImageSubresourceRange {
    #[inline]
    fn from(val: ImageSubresourceRange) -> Self {
        Self {
            aspect_mask: val.aspects.into(),
            base_mip_level: val.base_mip_level,
            level_count: val.level_count,
            base_array_layer: val.base_array_layer,
            layer_count: val.layer_count,
        }
    }
}

impl From<ash::vk::ImageSubresourceRange> for ImageSubresourceRange {
    #[inline]
    fn from(val: ash::vk::ImageSubresourceRange) -> Self {
        Self {
            aspects: val.aspect_mask.into(),
            base_mip_level: val.base_mip_level,
            level_count: val.level_count,
            base_array_layer: val.base_array_layer,
            layer_count: val.layer_count,
        }
    }
}

/// One or more subresources of an image, spanning a single mip level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageSubresourceLayers {
    /// Selects the aspects that will be included.
    pub aspects: ImageAspects,

    /// Selects mip level that will be included.
    pub mip_level: u32,

    /// The first array layer that will be included.
    pub base_array_layer: u32,

    /// The number of array layers that will be included.
    pub layer_count: u32,
}

impl From<ImageSubresourceLayers> for ash::vk::ImageSubresourceLayers {
    #[inline]
    fn from(val: ImageSubresourceLayers) -> Self {
        Self {
            aspect_mask: val.aspects.into(),
            mip_level: val.mip_level,
            base_array_layer: val.base_array_layer,
            layer_count: val.layer_count,
        }
    }
}

/// A two-dimensional area, in texels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect2D {
    pub offset: [i32; 2],
    pub extent: [u32; 2],
}

impl From<Rect2D> for ash::vk::Rect2D {
    #[inline]
    fn from(val: Rect2D) -> Self {
        Self {
            offset: ash::vk::Offset2D {
                x: val.offset[0],
                y: val.offset[1],
            },
            extent: ash::vk::Extent2D {
                width: val.extent[0],
                height: val.extent[1],
            },
        }
    }
}

impl From<ash::vk::Rect2D> for Rect2D {
    #[inline]
    fn from(val: ash::vk::Rect2D) -> Self {
        Self {
            offset: [val.offset.x, val.offset.y],
            extent: [val.extent.width, val.extent.height],
        }
    }
}

/// An area of a view to clear, together with the layers of the view it applies to.
///
/// `base_array_layer` is relative to the first layer of the view, not to the image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ClearRect {
    pub rect: Rect2D,
    pub base_array_layer: u32,
    pub layer_count: u32,
}

impl From<ClearRect> for ash::vk::ClearRect {
    #[inline]
    fn from(val: ClearRect) -> Self {
        Self {
            rect: val.rect.into(),
            base_array_layer: val.base_array_layer,
            layer_count: val.layer_count,
        }
    }
}

impl From<ash::vk::ClearRect> for ClearRect {
    #[inline]
    fn from(val: ash::vk::ClearRect) -> Self {
        Self {
            rect: val.rect.into(),
            base_array_layer: val.base_array_layer,
            layer_count: val.layer_count,
        }
    }
}

/// A region of data to copy between images.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageCopy {
    /// The subresource of the source image to copy from.
    pub src_subresource: ImageSubresourceLayers,

    /// The offset from the zero coordinate of the source image that copying will start from.
    pub src_offset: [u32; 3],

    /// The subresource of the destination image to copy to.
    pub dst_subresource: ImageSubresourceLayers,

    /// The offset from the zero coordinate of the destination image that copying will start
    /// from.
    pub dst_offset: [u32; 3],

    /// The extent of texels to copy.
    pub extent: [u32; 3],
}

impl From<ImageCopy> for ash::vk::ImageCopy {
    #[inline]
    fn from(val: ImageCopy) -> Self {
        let offset = |[x, y, z]: [u32; 3]| ash::vk::Offset3D {
            x: x as i32,
            y: y as i32,
            z: z as i32,
        };

        Self {
            src_subresource: val.src_subresource.into(),
            src_offset: offset(val.src_offset),
            dst_subresource: val.dst_subresource.into(),
            dst_offset: offset(val.dst_offset),
            extent: ash::vk::Extent3D {
                width: val.extent[0],
                height: val.extent[1],
                depth: val.extent[2],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        max_mip_levels, ImageAspects, ImageCreateFlags, ImageSubresourceRange, ImageType,
    };
    use crate::{REMAINING_ARRAY_LAYERS, REMAINING_MIP_LEVELS};

    #[test]
    fn max_mip_levels_of_non_square() {
        assert_eq!(max_mip_levels([1, 1, 1]), 1);
        assert_eq!(max_mip_levels([8, 2, 1]), 4);
        assert_eq!(max_mip_levels([4, 4, 16]), 5);
    }

    #[test]
    fn subresource_range_helpers() {
        let range = ImageSubresourceRange {
            aspects: ImageAspects::COLOR,
            base_mip_level: 1,
            level_count: 2,
            base_array_layer: 3,
            layer_count: 4,
        };
        assert_eq!(range.mip_levels(), 1..3);
        assert_eq!(range.array_layers(), 3..7);

        let raw = ash::vk::ImageSubresourceRange::from(range);
        assert_eq!(ImageSubresourceRange::from(raw), range);
    }

    #[test]
    fn unresolved_range_panics() {
        let range = ImageSubresourceRange {
            aspects: ImageAspects::COLOR,
            base_mip_level: 0,
            level_count: REMAINING_MIP_LEVELS,
            base_array_layer: 0,
            layer_count: REMAINING_ARRAY_LAYERS,
        };

        assert_should_panic!("unresolved level count", {
            range.mip_levels();
        });
        assert_should_panic!("unresolved layer count", {
            range.array_layers();
        });
    }

    #[test]
    fn raw_image_type() {
        assert_eq!(ImageType::try_from(ash::vk::ImageType::TYPE_3D), Ok(ImageType::Dim3d));
        assert_eq!(ImageType::try_from(ash::vk::ImageType::from_raw(42)), Err(()));
        assert_eq!(ImageType::COUNT, 3);
        assert_eq!(
            ash::vk::ImageCreateFlags::from(ImageCreateFlags::CUBE_COMPATIBLE),
            ash::vk::ImageCreateFlags::CUBE_COMPATIBLE,
        );
    }

    #[test]
    fn only_cube_compatible_create_flag() {
        assert_eq!(ImageCreateFlags::all(), ImageCreateFlags::CUBE_COMPATIBLE);

        // Flags the software image has no behavior for are dropped on conversion.
        let raw = ash::vk::ImageCreateFlags::CUBE_COMPATIBLE
            | ash::vk::ImageCreateFlags::MUTABLE_FORMAT
            | ash::vk::ImageCreateFlags::TYPE_2D_ARRAY_COMPATIBLE;
        assert_eq!(ImageCreateFlags::from(raw), ImageCreateFlags::CUBE_COMPATIBLE);
    }
}
