// Copyright (c) 2024 The swimage developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

use crate::macros::vulkan_bitflags;

/// An individual data type within an image.
///
/// Most images have only the `Color` aspect, but some may have several.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum ImageAspect {
    Color = ash::vk::ImageAspectFlags::COLOR.as_raw(),
    Depth = ash::vk::ImageAspectFlags::DEPTH.as_raw(),
    Stencil = ash::vk::ImageAspectFlags::STENCIL.as_raw(),
    Metadata = ash::vk::ImageAspectFlags::METADATA.as_raw(),
    Plane0 = ash::vk::ImageAspectFlags::PLANE_0.as_raw(),
    Plane1 = ash::vk::ImageAspectFlags::PLANE_1.as_raw(),
    Plane2 = ash::vk::ImageAspectFlags::PLANE_2.as_raw(),
}

impl From<ImageAspect> for ash::vk::ImageAspectFlags {
    #[inline]
    fn from(val: ImageAspect) -> Self {
        Self::from_raw(val as u32)
    }
}

impl From<ImageAspect> for ImageAspects {
    #[inline]
    fn from(val: ImageAspect) -> Self {
        Self(val as u32)
    }
}

vulkan_bitflags! {
    /// A mask specifying one or more `ImageAspect`s.
    ImageAspects impl {
        /// Returns the aspects in `self`, in ascending bit order.
        pub fn iter(self) -> impl Iterator<Item = ImageAspect> {
            [
                self.intersects(Self::COLOR).then_some(ImageAspect::Color),
                self.intersects(Self::DEPTH).then_some(ImageAspect::Depth),
                self.intersects(Self::STENCIL).then_some(ImageAspect::Stencil),
                self.intersects(Self::METADATA).then_some(ImageAspect::Metadata),
                self.intersects(Self::PLANE_0).then_some(ImageAspect::Plane0),
                self.intersects(Self::PLANE_1).then_some(ImageAspect::Plane1),
                self.intersects(Self::PLANE_2).then_some(ImageAspect::Plane2),
            ]
            .into_iter()
            .flatten()
        }
    }
    = ImageAspectFlags(u32);

    /// The single color aspect of a non-planar color image.
    COLOR = COLOR,

    DEPTH = DEPTH,

    STENCIL = STENCIL,

    METADATA = METADATA,

    PLANE_0 = PLANE_0,

    PLANE_1 = PLANE_1,

    PLANE_2 = PLANE_2,
}
