// Copyright (c) 2024 The swimage developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! In-memory implementation of images.
//!
//! An [`Image`] keeps all of its texels in one contiguous buffer in host memory. The buffer is
//! split into one plane per aspect of the format. Each plane holds the array layers one after the
//! other, each layer holds its mip levels in order, and each mip level is a tightly packed block
//! of `depth` slices of `height` rows of `width` texels.

use super::{
    max_mip_levels, mip_level_extent, ImageAccess, ImageAspect, ImageCopy, ImageCreateFlags,
    ImageSubresourceLayers, ImageSubresourceRange, ImageType, Rect2D,
};
use crate::{
    format::{ClearValue, Format},
    DeviceSize, NonExhaustive,
};
use parking_lot::Mutex;
use smallvec::SmallVec;
use std::ops::Range;

/// A multi-dimensioned storage for texel data, backed by host memory.
#[derive(Debug)]
pub struct Image {
    image_type: ImageType,
    format: Format,
    extent: [u32; 3],
    mip_levels: u32,
    array_layers: u32,
    flags: ImageCreateFlags,

    aspect_list: SmallVec<[AspectLayout; 2]>,
    memory: Mutex<Vec<u8>>,
}

#[derive(Debug)]
struct AspectLayout {
    aspect: ImageAspect,
    texel_size: DeviceSize,
    offset: DeviceSize,
    layer_size: DeviceSize,
    mip_level_offsets: SmallVec<[DeviceSize; 16]>,
}

impl Image {
    /// Creates a new `Image` with zero-initialized storage.
    ///
    /// # Panics
    ///
    /// - Panics if `create_info.extent` contains zero, or doesn't fit `create_info.image_type`.
    /// - Panics if `create_info.mip_levels` is zero or greater than
    ///   [`max_mip_levels`]`(create_info.extent)`.
    /// - Panics if `create_info.array_layers` is zero, or isn't 1 for a 3D image.
    /// - Panics if `create_info.flags` contains `CUBE_COMPATIBLE`, but the image is not a 2D
    ///   image with a square extent and at least 6 array layers.
    pub fn new(create_info: ImageCreateInfo) -> Image {
        create_info.validate();

        let ImageCreateInfo {
            image_type,
            format,
            extent,
            mip_levels,
            array_layers,
            flags,
            _ne: _,
        } = create_info;

        let mut size = 0;
        let aspect_list: SmallVec<[AspectLayout; 2]> = format
            .aspects()
            .iter()
            .map(|aspect| {
                // `aspects` only lists aspects that have a texel size.
                let texel_size = format.texel_size(aspect).unwrap();
                let mut layer_size = 0;
                let mip_level_offsets = (0..mip_levels)
                    .map(|level| {
                        let [width, height, depth] = mip_level_extent(extent, level).unwrap();
                        let level_offset = layer_size;
                        layer_size += width as DeviceSize
                            * height as DeviceSize
                            * depth as DeviceSize
                            * texel_size;
                        level_offset
                    })
                    .collect();

                let layout = AspectLayout {
                    aspect,
                    texel_size,
                    offset: size,
                    layer_size,
                    mip_level_offsets,
                };
                size += layer_size * array_layers as DeviceSize;
                layout
            })
            .collect();

        log::trace!(
            "created {:?} image {:?} of extent {:?}, {} levels, {} layers ({} bytes)",
            image_type,
            format,
            extent,
            mip_levels,
            array_layers,
            size,
        );

        Image {
            image_type,
            format,
            extent,
            mip_levels,
            array_layers,
            flags,
            aspect_list,
            memory: Mutex::new(vec![0; size as usize]),
        }
    }

    /// Returns the extent of the first mip level.
    #[inline]
    pub fn extent(&self) -> [u32; 3] {
        self.extent
    }

    /// Returns the flags the image was created with.
    #[inline]
    pub fn flags(&self) -> ImageCreateFlags {
        self.flags
    }

    /// Returns the size in bytes of the image's storage.
    #[inline]
    pub fn size(&self) -> DeviceSize {
        self.memory.lock().len() as DeviceSize
    }

    /// Returns the bytes of the texel at `offset` in `aspect` of the given subresource.
    ///
    /// # Panics
    ///
    /// - Panics if the image doesn't have `aspect`, or if `mip_level` or `array_layer` are out of
    ///   range.
    pub fn read_texel(
        &self,
        offset: [u32; 3],
        aspect: ImageAspect,
        mip_level: u32,
        array_layer: u32,
    ) -> SmallVec<[u8; 16]> {
        let layout = self.aspect_layout(aspect);
        let start = self.offset_in(layout, offset, mip_level, array_layer) as usize;
        let memory = self.memory.lock();

        SmallVec::from_slice(&memory[start..start + layout.texel_size as usize])
    }

    fn aspect_layout(&self, aspect: ImageAspect) -> &AspectLayout {
        self.aspect_list
            .iter()
            .find(|layout| layout.aspect == aspect)
            .unwrap_or_else(|| {
                panic!(
                    "an image of format {:?} doesn't have the {:?} aspect",
                    self.format, aspect,
                )
            })
    }

    fn offset_in(
        &self,
        layout: &AspectLayout,
        offset: [u32; 3],
        mip_level: u32,
        array_layer: u32,
    ) -> DeviceSize {
        assert!(
            mip_level < self.mip_levels,
            "mip level {} is out of range for an image with {} levels",
            mip_level,
            self.mip_levels,
        );
        assert!(
            array_layer < self.array_layers,
            "array layer {} is out of range for an image with {} layers",
            array_layer,
            self.array_layers,
        );

        let [width, height, depth] = self.mip_level_extent(mip_level);
        debug_assert!(offset[0] < width && offset[1] < height && offset[2] < depth);

        let [x, y, z] = offset.map(DeviceSize::from);
        let texel_index = (z * height as DeviceSize + y) * width as DeviceSize + x;

        layout.offset
            + array_layer as DeviceSize * layout.layer_size
            + layout.mip_level_offsets[mip_level as usize]
            + texel_index * layout.texel_size
    }

    /// Returns `(src, dst, len)` byte ranges for every row that `region` copies into `dst`.
    fn copy_rows(&self, dst: &Image, region: &ImageCopy) -> Vec<(usize, usize, usize)> {
        let ImageCopy {
            src_subresource,
            src_offset,
            dst_subresource,
            dst_offset,
            extent,
        } = *region;

        assert_eq!(
            src_subresource.layer_count, dst_subresource.layer_count,
            "the source and destination of a copy must have the same number of layers",
        );
        assert_eq!(
            src_subresource.aspects.count(),
            dst_subresource.aspects.count(),
            "the source and destination of a copy must have the same number of aspects",
        );

        let src_extent = self.mip_level_extent(src_subresource.mip_level);
        let dst_extent = dst.mip_level_extent(dst_subresource.mip_level);
        let [width, height, depth]: [u32; 3] = std::array::from_fn(|i| {
            extent[i]
                .min(src_extent[i].saturating_sub(src_offset[i]))
                .min(dst_extent[i].saturating_sub(dst_offset[i]))
        });

        let mut rows = Vec::new();

        if width == 0 || height == 0 || depth == 0 {
            return rows;
        }

        for (src_aspect, dst_aspect) in src_subresource
            .aspects
            .iter()
            .zip(dst_subresource.aspects.iter())
        {
            let src_layout = self.aspect_layout(src_aspect);
            let dst_layout = dst.aspect_layout(dst_aspect);
            assert_eq!(
                src_layout.texel_size, dst_layout.texel_size,
                "cannot copy between aspects of different texel sizes",
            );
            let len = (width as DeviceSize * src_layout.texel_size) as usize;

            for layer in 0..src_subresource.layer_count {
                for z in 0..depth {
                    for y in 0..height {
                        let src_start = self.offset_in(
                            src_layout,
                            [src_offset[0], src_offset[1] + y, src_offset[2] + z],
                            src_subresource.mip_level,
                            src_subresource.base_array_layer + layer,
                        );
                        let dst_start = dst.offset_in(
                            dst_layout,
                            [dst_offset[0], dst_offset[1] + y, dst_offset[2] + z],
                            dst_subresource.mip_level,
                            dst_subresource.base_array_layer + layer,
                        );
                        rows.push((src_start as usize, dst_start as usize, len));
                    }
                }
            }
        }

        rows
    }
}

impl ImageAccess for Image {
    #[inline]
    fn image_type(&self) -> ImageType {
        self.image_type
    }

    #[inline]
    fn format(&self) -> Format {
        self.format
    }

    #[inline]
    fn mip_levels(&self) -> u32 {
        self.mip_levels
    }

    #[inline]
    fn array_layers(&self) -> u32 {
        self.array_layers
    }

    #[inline]
    fn is_cube_compatible(&self) -> bool {
        self.flags.intersects(ImageCreateFlags::CUBE_COMPATIBLE)
    }

    #[inline]
    fn mip_level_extent(&self, level: u32) -> [u32; 3] {
        mip_level_extent(self.extent, level).unwrap_or_else(|| {
            panic!(
                "mip level {} is out of range for an image of extent {:?}",
                level, self.extent,
            )
        })
    }

    fn texel_offset(
        &self,
        offset: [u32; 3],
        aspect: ImageAspect,
        subresource: &ImageSubresourceLayers,
    ) -> DeviceSize {
        let layout = self.aspect_layout(aspect);
        self.offset_in(
            layout,
            offset,
            subresource.mip_level,
            subresource.base_array_layer,
        )
    }

    fn clear(
        &self,
        value: ClearValue,
        format: Format,
        area: Rect2D,
        subresource_range: &ImageSubresourceRange,
    ) {
        let mip_levels = subresource_range.mip_levels();
        let array_layers = subresource_range.array_layers();
        assert!(
            mip_levels.end <= self.mip_levels && array_layers.end <= self.array_layers,
            "subresource range {:?} is out of range for an image with {} levels and {} layers",
            subresource_range,
            self.mip_levels,
            self.array_layers,
        );

        let mut memory = self.memory.lock();

        for aspect in subresource_range.aspects.iter() {
            let layout = self.aspect_layout(aspect);
            let texel = format.encode_clear_value(value, aspect);
            assert_eq!(
                texel.len() as DeviceSize,
                layout.texel_size,
                "format {:?} doesn't have the texel size of the image's {:?} aspect",
                format,
                aspect,
            );

            for mip_level in mip_levels.clone() {
                let [width, height, depth] = self.mip_level_extent(mip_level);
                let (Some(columns), Some(rows)) = (
                    clip(area.offset[0], area.extent[0], width),
                    clip(area.offset[1], area.extent[1], height),
                ) else {
                    continue;
                };

                for array_layer in array_layers.clone() {
                    for z in 0..depth {
                        for y in rows.clone() {
                            let start = self
                                .offset_in(layout, [columns.start, y, z], mip_level, array_layer)
                                as usize;
                            let end = start + columns.len() * texel.len();

                            for dst in memory[start..end].chunks_exact_mut(texel.len()) {
                                dst.copy_from_slice(&texel);
                            }
                        }
                    }
                }
            }
        }
    }

    fn copy_to(&self, dst: &Image, region: &ImageCopy) {
        let rows = self.copy_rows(dst, region);

        if std::ptr::eq(self, dst) {
            let mut memory = self.memory.lock();

            for (src_start, dst_start, len) in rows {
                memory.copy_within(src_start..src_start + len, dst_start);
            }

            return;
        }

        // Always lock in the same order, whichever way the copy goes.
        let (src_memory, mut dst_memory) =
            if std::ptr::from_ref(self) < std::ptr::from_ref(dst) {
                let src_memory = self.memory.lock();
                (src_memory, dst.memory.lock())
            } else {
                let dst_memory = dst.memory.lock();
                (self.memory.lock(), dst_memory)
            };

        for (src_start, dst_start, len) in rows {
            dst_memory[dst_start..dst_start + len]
                .copy_from_slice(&src_memory[src_start..src_start + len]);
        }
    }
}

/// Clips `offset..offset + extent` to `0..limit`. Returns `None` if nothing is left.
fn clip(offset: i32, extent: u32, limit: u32) -> Option<Range<u32>> {
    let start = i64::from(offset).clamp(0, i64::from(limit));
    let end = (i64::from(offset) + i64::from(extent)).clamp(0, i64::from(limit));

    (start < end).then(|| start as u32..end as u32)
}

/// Parameters to create a new `Image`.
#[derive(Clone, Debug)]
pub struct ImageCreateInfo {
    /// The basic dimensionality of the image.
    ///
    /// The default value is [`ImageType::Dim2d`].
    pub image_type: ImageType,

    /// The format used to store texels in the image.
    ///
    /// The default value is [`Format::R8G8B8A8_UNORM`].
    pub format: Format,

    /// The width, height and depth of the image.
    ///
    /// The default value is `[1, 1, 1]`.
    pub extent: [u32; 3],

    /// The number of mip levels.
    ///
    /// The default value is `1`.
    pub mip_levels: u32,

    /// The number of array layers.
    ///
    /// The default value is `1`.
    pub array_layers: u32,

    /// Additional properties of the image.
    ///
    /// The default value is empty.
    pub flags: ImageCreateFlags,

    pub _ne: NonExhaustive,
}

impl Default for ImageCreateInfo {
    #[inline]
    fn default() -> Self {
        Self {
            image_type: ImageType::Dim2d,
            format: Format::R8G8B8A8_UNORM,
            extent: [1, 1, 1],
            mip_levels: 1,
            array_layers: 1,
            flags: ImageCreateFlags::empty(),
            _ne: NonExhaustive(()),
        }
    }
}

impl ImageCreateInfo {
    fn validate(&self) {
        let &Self {
            image_type,
            format: _,
            extent,
            mip_levels,
            array_layers,
            flags,
            _ne: _,
        } = self;

        assert!(
            extent.iter().all(|&x| x != 0),
            "`extent` must not contain zero, got {:?}",
            extent,
        );

        match image_type {
            ImageType::Dim1d => assert!(
                extent[1] == 1 && extent[2] == 1,
                "a 1D image must have a height and depth of 1",
            ),
            ImageType::Dim2d => assert!(extent[2] == 1, "a 2D image must have a depth of 1"),
            ImageType::Dim3d => {
                assert!(array_layers == 1, "a 3D image must have exactly one array layer")
            }
        }

        assert!(
            mip_levels != 0 && mip_levels <= max_mip_levels(extent),
            "`mip_levels` must be between 1 and {}, got {}",
            max_mip_levels(extent),
            mip_levels,
        );
        assert!(array_layers != 0, "`array_layers` must not be zero");

        if flags.intersects(ImageCreateFlags::CUBE_COMPATIBLE) {
            assert!(
                image_type == ImageType::Dim2d && extent[0] == extent[1] && array_layers >= 6,
                "a cube compatible image must be a square 2D image with at least 6 array layers",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Image, ImageCreateInfo};
    use crate::{
        format::{ClearValue, Format},
        image::{
            ImageAccess, ImageAspect, ImageAspects, ImageCopy, ImageCreateFlags,
            ImageSubresourceLayers, ImageSubresourceRange, ImageType, Rect2D,
        },
    };

    fn color_layers(
        mip_level: u32,
        base_array_layer: u32,
        layer_count: u32,
    ) -> ImageSubresourceLayers {
        ImageSubresourceLayers {
            aspects: ImageAspects::COLOR,
            mip_level,
            base_array_layer,
            layer_count,
        }
    }

    #[test]
    fn layout_of_mips_and_layers() {
        let image = image!(extent: [4, 2, 1], mip_levels: 3, array_layers: 2);

        // Levels are 4x2, 2x1 and 1x1 texels of 4 bytes.
        assert_eq!(image.size(), 2 * (32 + 8 + 4));
        assert_eq!(image.texel_offset([0, 0, 0], ImageAspect::Color, &color_layers(0, 0, 1)), 0);
        assert_eq!(image.texel_offset([1, 1, 0], ImageAspect::Color, &color_layers(0, 0, 1)), 20);
        assert_eq!(image.texel_offset([0, 0, 0], ImageAspect::Color, &color_layers(2, 0, 1)), 40);
        assert_eq!(image.texel_offset([1, 0, 0], ImageAspect::Color, &color_layers(1, 1, 1)), 80);
    }

    #[test]
    fn depth_stencil_planes() {
        let image = image!(format: Format::D24_UNORM_S8_UINT, extent: [2, 2, 1]);

        assert_eq!(image.size(), 16 + 4);
        assert_eq!(image.texel_offset([0, 0, 0], ImageAspect::Stencil, &color_layers(0, 0, 1)), 16);
        assert_should_panic!("doesn't have the Color aspect", {
            image.texel_offset([0, 0, 0], ImageAspect::Color, &color_layers(0, 0, 1));
        });
    }

    #[test]
    fn creation_checks() {
        assert_should_panic!("must not contain zero", {
            image!(extent: [0, 1, 1]);
        });
        assert_should_panic!("mip_levels", {
            image!(extent: [4, 4, 1], mip_levels: 4);
        });
        assert_should_panic!("exactly one array layer", {
            image!(image_type: ImageType::Dim3d, extent: [2, 2, 2], array_layers: 2);
        });
        assert_should_panic!("cube compatible", {
            image!(flags: ImageCreateFlags::CUBE_COMPATIBLE, extent: [4, 4, 1], array_layers: 4);
        });
        assert_should_panic!("height and depth", {
            image!(image_type: ImageType::Dim1d, extent: [4, 2, 1]);
        });

        let cube = image!(
            flags: ImageCreateFlags::CUBE_COMPATIBLE,
            extent: [4, 4, 1],
            array_layers: 6,
        );
        assert!(cube.is_cube_compatible());
    }

    #[test]
    fn clear_is_clipped_to_the_level() {
        let image = image!(extent: [4, 4, 1], mip_levels: 2);
        let range = ImageSubresourceRange {
            aspects: ImageAspects::COLOR,
            base_mip_level: 0,
            level_count: 2,
            base_array_layer: 0,
            layer_count: 1,
        };
        let area = Rect2D {
            offset: [-1, 1],
            extent: [3, 8],
        };

        image.clear(ClearValue::Float([1.0; 4]), Format::R8G8B8A8_UNORM, area, &range);

        let white = [255u8; 4];
        let black = [0u8; 4];
        assert_eq!(image.read_texel([0, 0, 0], ImageAspect::Color, 0, 0).as_slice(), &black);
        assert_eq!(image.read_texel([0, 1, 0], ImageAspect::Color, 0, 0).as_slice(), &white);
        assert_eq!(image.read_texel([1, 3, 0], ImageAspect::Color, 0, 0).as_slice(), &white);
        assert_eq!(image.read_texel([2, 3, 0], ImageAspect::Color, 0, 0).as_slice(), &black);
        // Level 1 is 2x2.
        assert_eq!(image.read_texel([1, 1, 0], ImageAspect::Color, 1, 0).as_slice(), &white);
        assert_eq!(image.read_texel([1, 0, 0], ImageAspect::Color, 1, 0).as_slice(), &black);
    }

    #[test]
    fn clear_fills_every_depth_slice() {
        let image = image!(
            image_type: ImageType::Dim3d,
            format: Format::R32_UINT,
            extent: [2, 2, 3],
        );
        let range = ImageSubresourceRange {
            aspects: ImageAspects::COLOR,
            base_mip_level: 0,
            level_count: 1,
            base_array_layer: 0,
            layer_count: 1,
        };

        image.clear(
            ClearValue::Uint([7, 0, 0, 0]),
            Format::R32_UINT,
            Rect2D {
                offset: [0, 0],
                extent: [2, 2],
            },
            &range,
        );

        for z in 0..3 {
            assert_eq!(
                image.read_texel([1, 1, z], ImageAspect::Color, 0, 0).as_slice(),
                bytemuck::bytes_of(&7u32),
            );
        }
    }

    #[test]
    fn clear_only_touches_requested_aspects() {
        let image = image!(format: Format::D32_SFLOAT_S8_UINT, extent: [2, 2, 1]);
        let range = ImageSubresourceRange {
            aspects: ImageAspects::STENCIL,
            base_mip_level: 0,
            level_count: 1,
            base_array_layer: 0,
            layer_count: 1,
        };

        image.clear(
            ClearValue::DepthStencil((1.0, 3)),
            Format::D32_SFLOAT_S8_UINT,
            Rect2D {
                offset: [0, 0],
                extent: [2, 2],
            },
            &range,
        );

        assert_eq!(image.read_texel([1, 0, 0], ImageAspect::Stencil, 0, 0).as_slice(), &[3]);
        assert_eq!(
            image.read_texel([1, 0, 0], ImageAspect::Depth, 0, 0).as_slice(),
            &[0, 0, 0, 0],
        );
    }

    #[test]
    fn copy_between_images() {
        let src = image!(extent: [4, 4, 1], array_layers: 2);
        let dst = image!(extent: [2, 2, 1], array_layers: 3);
        let all = ImageSubresourceRange {
            aspects: ImageAspects::COLOR,
            base_mip_level: 0,
            level_count: 1,
            base_array_layer: 1,
            layer_count: 1,
        };
        src.clear(
            ClearValue::Float([0.0, 1.0, 0.0, 1.0]),
            Format::R8G8B8A8_UNORM,
            Rect2D {
                offset: [0, 0],
                extent: [4, 4],
            },
            &all,
        );

        src.copy_to(
            &dst,
            &ImageCopy {
                src_subresource: color_layers(0, 0, 2),
                src_offset: [0, 0, 0],
                dst_subresource: color_layers(0, 1, 2),
                dst_offset: [0, 0, 0],
                extent: [4, 4, 1],
            },
        );

        let green = [0u8, 255, 0, 255];
        assert_eq!(dst.read_texel([0, 0, 0], ImageAspect::Color, 0, 1).as_slice(), &[0; 4]);
        assert_eq!(dst.read_texel([1, 1, 0], ImageAspect::Color, 0, 2).as_slice(), &green);
        assert_eq!(dst.read_texel([1, 1, 0], ImageAspect::Color, 0, 0).as_slice(), &[0; 4]);
    }

    #[test]
    fn copy_within_one_image() {
        let image = image!(extent: [2, 2, 1], array_layers: 2);
        let first = ImageSubresourceRange {
            aspects: ImageAspects::COLOR,
            base_mip_level: 0,
            level_count: 1,
            base_array_layer: 0,
            layer_count: 1,
        };
        image.clear(
            ClearValue::Float([1.0; 4]),
            Format::R8G8B8A8_UNORM,
            Rect2D {
                offset: [0, 0],
                extent: [2, 2],
            },
            &first,
        );

        image.copy_to(
            &image,
            &ImageCopy {
                src_subresource: color_layers(0, 0, 1),
                src_offset: [0, 0, 0],
                dst_subresource: color_layers(0, 1, 1),
                dst_offset: [1, 0, 0],
                extent: [2, 2, 1],
            },
        );

        assert_eq!(image.read_texel([0, 1, 0], ImageAspect::Color, 0, 1).as_slice(), &[0; 4]);
        assert_eq!(image.read_texel([1, 1, 0], ImageAspect::Color, 0, 1).as_slice(), &[255; 4]);
    }

    #[test]
    fn default_create_info() {
        let image = Image::new(ImageCreateInfo::default());

        assert_eq!(image.image_type(), ImageType::Dim2d);
        assert_eq!(image.format(), Format::R8G8B8A8_UNORM);
        assert_eq!(image.extent(), [1, 1, 1]);
        assert_eq!(image.mip_levels(), 1);
        assert_eq!(image.array_layers(), 1);
        assert!(!image.is_cube_compatible());
    }
}
