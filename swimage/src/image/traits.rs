// Copyright (c) 2024 The swimage developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

use super::{
    ImageAspect, ImageCopy, ImageSubresourceLayers, ImageSubresourceRange, ImageType, Rect2D,
};
use crate::{
    format::{ClearValue, Format},
    DeviceSize,
};

/// Trait for types that own texel storage and can be looked at through an
/// [`ImageView`](crate::image::view::ImageView).
///
/// Views only ever hold a shared reference to the image, so the operations that write texels
/// take `&self`. Implementations are expected to serialize access to their storage themselves;
/// the view layer adds no locking of its own.
pub trait ImageAccess {
    /// Returns the dimensionality of the image.
    fn image_type(&self) -> ImageType;

    /// Returns the format of the image.
    fn format(&self) -> Format;

    /// Returns the number of mip levels of the image.
    fn mip_levels(&self) -> u32;

    /// Returns the number of array layers of the image.
    fn array_layers(&self) -> u32;

    /// Returns whether views of type `Cube` and `CubeArray` may be created from the image.
    fn is_cube_compatible(&self) -> bool;

    /// Returns the extent of mip level `level`.
    fn mip_level_extent(&self, level: u32) -> [u32; 3];

    /// Returns the offset in bytes, from the start of the image's storage, of the texel at
    /// `offset` in `aspect` of the first layer and the mip level of `subresource`.
    fn texel_offset(
        &self,
        offset: [u32; 3],
        aspect: ImageAspect,
        subresource: &ImageSubresourceLayers,
    ) -> DeviceSize;

    /// Writes `value`, encoded in `format`, over `area` of every subresource of
    /// `subresource_range`.
    ///
    /// The counts of `subresource_range` must be concrete.
    fn clear(
        &self,
        value: ClearValue,
        format: Format,
        area: Rect2D,
        subresource_range: &ImageSubresourceRange,
    );

    /// Copies the texels of `region` from `self` into `dst`.
    fn copy_to(&self, dst: &Self, region: &ImageCopy)
    where
        Self: Sized;
}
