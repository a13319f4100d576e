// Copyright (c) 2024 The swimage developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Image views.
//!
//! This module contains types related to image views. An image view wraps around an image and
//! describes how it must be interpreted: which mip levels, array layers and aspects are visible,
//! with which shape and which format. It is what clears and resolves of attachments operate on.
//!
//! A view borrows its image. It never owns texel storage of its own, and releasing a view has no
//! effect on the image.

use super::{
    sampler::ComponentMapping, ImageAccess, ImageAspect, ImageAspects, ImageCopy,
    ImageSubresourceLayers, ImageSubresourceRange, ImageType, Rect2D,
};
use crate::{
    format::{ClearValue, Format},
    image::ClearRect,
    macros::{unsupported, vulkan_enum},
    DeviceSize, NonExhaustive, REMAINING_ARRAY_LAYERS, REMAINING_MIP_LEVELS,
};
use std::{
    fmt,
    hash::{Hash, Hasher},
    num::NonZeroU64,
    sync::atomic::{AtomicU64, Ordering},
};

/// A typed window onto a subset of the subresources of an image.
///
/// The identity swizzles of the component mapping and the "remaining" level and layer counts of
/// the subresource range are resolved when the view is created; the view never changes after
/// that.
pub struct ImageView<'a, I>
where
    I: ImageAccess,
{
    image: &'a I,
    id: NonZeroU64,

    view_type: ImageViewType,
    format: Format,
    component_mapping: ComponentMapping,
    subresource_range: ImageSubresourceRange,
}

impl<'a, I> ImageView<'a, I>
where
    I: ImageAccess,
{
    /// Creates a new `ImageView` of `image`.
    ///
    /// The shape of the view is not checked against the image here. An incompatible view can be
    /// created, and only fails when it is cleared.
    ///
    /// # Panics
    ///
    /// - Panics if `create_info.subresource_range.base_mip_level` is not less than the number of
    ///   mip levels of `image`.
    /// - Panics if `create_info.subresource_range.base_array_layer` is not less than the number
    ///   of array layers of `image`.
    pub fn new(
        image: &'a I,
        create_info: ImageViewCreateInfo,
        ids: &ImageViewIdAllocator,
    ) -> ImageView<'a, I> {
        let ImageViewCreateInfo {
            view_type,
            format,
            component_mapping,
            subresource_range,
            _ne: _,
        } = create_info;

        let view = ImageView {
            image,
            id: ids.next_id(),
            view_type,
            format: format.unwrap_or_else(|| image.format()),
            component_mapping: component_mapping.resolve_identity(),
            subresource_range: resolve_remaining_levels_layers(subresource_range, image),
        };

        log::trace!(
            "created image view {} of type {:?}, format {:?}, range {:?}",
            view.id,
            view.view_type,
            view.format,
            view.subresource_range,
        );

        view
    }

    /// Returns the number of bytes that must be allocated for a view created with `create_info`.
    ///
    /// Views own no storage, so this is always zero.
    #[inline]
    pub fn required_allocation_size(_create_info: &ImageViewCreateInfo) -> DeviceSize {
        0
    }

    /// Releases the view. The image is left untouched.
    #[inline]
    pub fn destroy(self) {
        log::trace!("destroyed image view {}", self.id);
    }

    /// Returns the image that the view was created from.
    #[inline]
    pub fn image(&self) -> &'a I {
        self.image
    }

    /// Returns the identifier the view was given when created.
    #[inline]
    pub fn id(&self) -> NonZeroU64 {
        self.id
    }

    /// Returns the [`ImageViewType`] of the view.
    #[inline]
    pub fn view_type(&self) -> ImageViewType {
        self.view_type
    }

    /// Returns the format of the view. This can be different from the image's format.
    #[inline]
    pub fn format(&self) -> Format {
        self.format
    }

    /// Returns the component mapping of the view. It never contains `Identity`.
    #[inline]
    pub fn component_mapping(&self) -> ComponentMapping {
        self.component_mapping
    }

    /// Returns the subresources of the image covered by the view, with concrete counts.
    #[inline]
    pub fn subresource_range(&self) -> &ImageSubresourceRange {
        &self.subresource_range
    }

    /// Returns whether the type of the view can be used over the image it was created from.
    #[inline]
    pub fn is_compatible(&self) -> bool {
        self.view_type.is_compatible_with(
            self.image.image_type(),
            self.image.array_layers(),
            self.image.is_cube_compatible(),
            self.subresource_range.layer_count,
        )
    }

    /// Clears `render_area` of every subresource of the view, in the aspects `aspects`.
    ///
    /// The component mapping of the view is ignored.
    ///
    /// # Panics
    ///
    /// - Panics if the view type is not compatible with the image.
    /// - Panics if the view format is not compatible with the image format.
    pub fn clear(&self, value: ClearValue, aspects: ImageAspects, render_area: Rect2D) {
        let subresource_range = ImageSubresourceRange {
            aspects,
            ..self.subresource_range
        };

        self.clear_subresource_range(value, render_area, subresource_range);
    }

    /// Clears `clear_rect.rect` of the layers of the view selected by `clear_rect`, in the
    /// aspects `aspects`.
    ///
    /// `clear_rect.base_array_layer` is relative to the first layer of the view.
    ///
    /// # Panics
    ///
    /// - Panics if the view type is not compatible with the image.
    /// - Panics if the view format is not compatible with the image format.
    pub fn clear_rect(&self, value: ClearValue, aspects: ImageAspects, clear_rect: &ClearRect) {
        let subresource_range = ImageSubresourceRange {
            aspects,
            base_mip_level: self.subresource_range.base_mip_level,
            level_count: self.subresource_range.level_count,
            base_array_layer: self.subresource_range.base_array_layer
                + clear_rect.base_array_layer,
            layer_count: clear_rect.layer_count,
        };

        self.clear_subresource_range(value, clear_rect.rect, subresource_range);
    }

    fn clear_subresource_range(
        &self,
        value: ClearValue,
        area: Rect2D,
        subresource_range: ImageSubresourceRange,
    ) {
        if !self.is_compatible() {
            unsupported!(
                "imageTypesMatch",
                "{:?} view of {} layers over a {:?} image",
                self.view_type,
                self.subresource_range.layer_count,
                self.image.image_type(),
            );
        }

        if !self.format.is_compatible(self.image.format()) {
            unsupported!(
                "incompatible formats",
                "{:?} view over a {:?} image",
                self.format,
                self.image.format(),
            );
        }

        log::trace!(
            "clearing {:?} of {:?} through image view {}",
            area,
            subresource_range,
            self.id,
        );

        self.image.clear(value, self.format, area, &subresource_range);
    }

    /// Copies the subresources of the view into those of `resolve_attachment`.
    ///
    /// The whole extent of the view's base mip level is copied. Each side keeps its own aspects
    /// and layers.
    ///
    /// # Panics
    ///
    /// - Panics if either view covers more than one mip level.
    pub fn resolve(&self, resolve_attachment: &ImageView<'_, I>) {
        if self.subresource_range.level_count != 1
            || resolve_attachment.subresource_range.level_count != 1
        {
            unsupported!(
                "levelCount",
                "resolving {} levels into {} levels",
                self.subresource_range.level_count,
                resolve_attachment.subresource_range.level_count,
            );
        }

        let region = ImageCopy {
            src_subresource: self.subresource_layers(),
            src_offset: [0; 3],
            dst_subresource: resolve_attachment.subresource_layers(),
            dst_offset: [0; 3],
            extent: self
                .image
                .mip_level_extent(self.subresource_range.base_mip_level),
        };

        log::trace!(
            "resolving image view {} into image view {}: {:?}",
            self.id,
            resolve_attachment.id,
            region,
        );

        self.image.copy_to(resolve_attachment.image, &region);
    }

    /// Returns the offset in bytes, within the storage of the image, of the texel at `offset`
    /// in `aspect` of mip level `mip_level` of the view.
    ///
    /// `mip_level` is relative to the first level of the view.
    ///
    /// # Panics
    ///
    /// - Panics if `mip_level` is not less than the number of levels of the view.
    pub fn texel_offset(
        &self,
        offset: [u32; 3],
        aspect: ImageAspect,
        mip_level: u32,
    ) -> DeviceSize {
        assert!(
            mip_level < self.subresource_range.level_count,
            "mip level {} is out of range for a view of {} levels",
            mip_level,
            self.subresource_range.level_count,
        );

        let subresource = ImageSubresourceLayers {
            aspects: aspect.into(),
            mip_level: self.subresource_range.base_mip_level + mip_level,
            base_array_layer: self.subresource_range.base_array_layer,
            layer_count: self.subresource_range.layer_count,
        };

        self.image.texel_offset(offset, aspect, &subresource)
    }

    fn subresource_layers(&self) -> ImageSubresourceLayers {
        ImageSubresourceLayers {
            aspects: self.subresource_range.aspects,
            mip_level: self.subresource_range.base_mip_level,
            base_array_layer: self.subresource_range.base_array_layer,
            layer_count: self.subresource_range.layer_count,
        }
    }
}

/// Replaces the "remaining" counts of `range` with the number of levels or layers left in
/// `image` after the base level or layer.
fn resolve_remaining_levels_layers(
    range: ImageSubresourceRange,
    image: &impl ImageAccess,
) -> ImageSubresourceRange {
    let mip_levels = image.mip_levels();
    let array_layers = image.array_layers();

    assert!(
        range.base_mip_level < mip_levels,
        "base mip level {} is out of range for an image with {} levels",
        range.base_mip_level,
        mip_levels,
    );
    assert!(
        range.base_array_layer < array_layers,
        "base array layer {} is out of range for an image with {} layers",
        range.base_array_layer,
        array_layers,
    );

    ImageSubresourceRange {
        level_count: if range.level_count == REMAINING_MIP_LEVELS {
            mip_levels - range.base_mip_level
        } else {
            range.level_count
        },
        layer_count: if range.layer_count == REMAINING_ARRAY_LAYERS {
            array_layers - range.base_array_layer
        } else {
            range.layer_count
        },
        ..range
    }
}

impl<I> fmt::Debug for ImageView<'_, I>
where
    I: ImageAccess,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageView")
            .field("id", &self.id)
            .field("view_type", &self.view_type)
            .field("format", &self.format)
            .field("component_mapping", &self.component_mapping)
            .field("subresource_range", &self.subresource_range)
            .finish_non_exhaustive()
    }
}

impl<I> PartialEq for ImageView<'_, I>
where
    I: ImageAccess,
{
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<I> Eq for ImageView<'_, I> where I: ImageAccess {}

impl<I> Hash for ImageView<'_, I>
where
    I: ImageAccess,
{
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Hands out the identifiers of image views.
///
/// Identifiers are unique among the views created with the same allocator. Whatever layer
/// creates views owns the allocator and passes it to [`ImageView::new`].
#[derive(Debug)]
pub struct ImageViewIdAllocator {
    next: AtomicU64,
}

impl ImageViewIdAllocator {
    /// Creates an allocator whose first identifier is 1.
    #[inline]
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Returns a new identifier, greater than all the ones returned before.
    pub fn next_id(&self) -> NonZeroU64 {
        NonZeroU64::new(self.next.fetch_add(1, Ordering::Relaxed)).unwrap_or_else(|| {
            log::error!("the image view ID counter has overflown");
            std::process::abort();
        })
    }
}

impl Default for ImageViewIdAllocator {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// Parameters to create a new `ImageView`.
#[derive(Clone, Debug)]
pub struct ImageViewCreateInfo {
    /// The image view type.
    ///
    /// The view type is not checked against the image when the view is created, only when it is
    /// used.
    ///
    /// The default value is [`ImageViewType::Dim2d`].
    pub view_type: ImageViewType,

    /// The format of the image view.
    ///
    /// If set to `None`, the format of the image is used.
    ///
    /// The default value is `None`.
    pub format: Option<Format>,

    /// How to map components of each pixel.
    ///
    /// The default value is [`ComponentMapping::identity()`].
    pub component_mapping: ComponentMapping,

    /// The subresource range of the image that the view should cover.
    ///
    /// `level_count` and `layer_count` may be [`REMAINING_MIP_LEVELS`] and
    /// [`REMAINING_ARRAY_LAYERS`].
    ///
    /// The default value is the color aspect with all mip levels and array layers.
    pub subresource_range: ImageSubresourceRange,

    pub _ne: NonExhaustive,
}

impl Default for ImageViewCreateInfo {
    #[inline]
    fn default() -> Self {
        Self {
            view_type: ImageViewType::Dim2d,
            format: None,
            component_mapping: ComponentMapping::identity(),
            subresource_range: ImageSubresourceRange {
                aspects: ImageAspects::COLOR,
                base_mip_level: 0,
                level_count: REMAINING_MIP_LEVELS,
                base_array_layer: 0,
                layer_count: REMAINING_ARRAY_LAYERS,
            },
            _ne: NonExhaustive(()),
        }
    }
}

impl ImageViewCreateInfo {
    /// Returns an `ImageViewCreateInfo` covering the whole of `image`.
    ///
    /// The view type is derived from the image type and number of array layers. Cube compatible
    /// images with exactly 6 layers get a `Cube` view. All aspects of the image format are
    /// selected, except the planes of multi-planar formats.
    pub fn from_image(image: &impl ImageAccess) -> Self {
        let array_layers = image.array_layers();

        Self {
            view_type: match image.image_type() {
                ImageType::Dim1d if array_layers == 1 => ImageViewType::Dim1d,
                ImageType::Dim1d => ImageViewType::Dim1dArray,
                ImageType::Dim2d if image.is_cube_compatible() && array_layers == 6 => {
                    ImageViewType::Cube
                }
                ImageType::Dim2d if array_layers == 1 => ImageViewType::Dim2d,
                ImageType::Dim2d => ImageViewType::Dim2dArray,
                ImageType::Dim3d => ImageViewType::Dim3d,
            },
            subresource_range: ImageSubresourceRange {
                aspects: image.format().aspects()
                    - (ImageAspects::PLANE_0 | ImageAspects::PLANE_1 | ImageAspects::PLANE_2),
                base_mip_level: 0,
                level_count: REMAINING_MIP_LEVELS,
                base_array_layer: 0,
                layer_count: REMAINING_ARRAY_LAYERS,
            },
            ..Default::default()
        }
    }
}

vulkan_enum! {
    /// The geometry type of an image view.
    ImageViewType impl {
        /// Returns whether a view of this type, covering `layer_count` layers, can be used over
        /// an image of type `image_type` with `image_array_layers` layers.
        ///
        /// Views of type `Cube` and `CubeArray` are accepted over any cube compatible image with
        /// enough layers, and the layer count of `Cube` views must be exactly 6.
        pub fn is_compatible_with(
            self,
            image_type: ImageType,
            image_array_layers: u32,
            image_cube_compatible: bool,
            layer_count: u32,
        ) -> bool {
            let is_2d_or_single_layer_3d = image_type == ImageType::Dim2d
                || (image_type == ImageType::Dim3d && image_array_layers == 1);

            match self {
                ImageViewType::Dim1d => image_type == ImageType::Dim1d && layer_count == 1,
                ImageViewType::Dim1dArray => image_type == ImageType::Dim1d,
                ImageViewType::Dim2d => is_2d_or_single_layer_3d && layer_count == 1,
                ImageViewType::Dim2dArray => is_2d_or_single_layer_3d,
                ImageViewType::Cube => {
                    image_cube_compatible && image_array_layers >= layer_count && layer_count == 6
                }
                ImageViewType::CubeArray => {
                    image_cube_compatible && image_array_layers >= layer_count && layer_count >= 6
                }
                ImageViewType::Dim3d => {
                    image_type == ImageType::Dim3d && image_array_layers == 1 && layer_count == 1
                }
            }
        }
    }
    = ImageViewType(i32);

    Dim1d = TYPE_1D,

    Dim2d = TYPE_2D,

    Dim3d = TYPE_3D,

    Cube = CUBE,

    Dim1dArray = TYPE_1D_ARRAY,

    Dim2dArray = TYPE_2D_ARRAY,

    CubeArray = CUBE_ARRAY,
}
