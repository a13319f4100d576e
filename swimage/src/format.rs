// Copyright (c) 2024 The swimage developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! The texel formats understood by the software images.
//!
//! A format describes how the texels of an image are laid out in memory. Only a subset of the
//! Vulkan formats is implemented: the common color formats used for attachments, plus the
//! depth/stencil formats.
//!
//! # Depth/stencil formats
//!
//! Depth and stencil are separate *aspects* of an image. The software images store each aspect as
//! its own plane, so a `D24_UNORM_S8_UINT` image holds a plane of 32-bit depth words followed by a
//! plane of 8-bit stencil values. A depth/stencil format is not compatible with any other format,
//! only with itself.
//!
//! # Compatibility
//!
//! A view may use a format other than the one of its image, provided both formats are
//! [compatible](Format::is_compatible). Color formats are compatible when their texels have the
//! same size, which lets a view reinterpret the bits of an image without converting them.

use crate::{
    image::{ImageAspect, ImageAspects},
    DeviceSize,
};
use half::f16;
use smallvec::SmallVec;

/// Describes the memory layout of a texel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(non_camel_case_types)]
#[repr(i32)]
pub enum Format {
    R8_UNORM = ash::vk::Format::R8_UNORM.as_raw(),
    R8G8B8A8_UNORM = ash::vk::Format::R8G8B8A8_UNORM.as_raw(),
    R8G8B8A8_SRGB = ash::vk::Format::R8G8B8A8_SRGB.as_raw(),
    B8G8R8A8_UNORM = ash::vk::Format::B8G8R8A8_UNORM.as_raw(),
    B8G8R8A8_SRGB = ash::vk::Format::B8G8R8A8_SRGB.as_raw(),
    R8G8B8A8_UINT = ash::vk::Format::R8G8B8A8_UINT.as_raw(),
    R8G8B8A8_SINT = ash::vk::Format::R8G8B8A8_SINT.as_raw(),
    R16G16B16A16_SFLOAT = ash::vk::Format::R16G16B16A16_SFLOAT.as_raw(),
    R32_UINT = ash::vk::Format::R32_UINT.as_raw(),
    R32_SFLOAT = ash::vk::Format::R32_SFLOAT.as_raw(),
    R32G32B32A32_UINT = ash::vk::Format::R32G32B32A32_UINT.as_raw(),
    R32G32B32A32_SINT = ash::vk::Format::R32G32B32A32_SINT.as_raw(),
    R32G32B32A32_SFLOAT = ash::vk::Format::R32G32B32A32_SFLOAT.as_raw(),
    D16_UNORM = ash::vk::Format::D16_UNORM.as_raw(),
    D32_SFLOAT = ash::vk::Format::D32_SFLOAT.as_raw(),
    S8_UINT = ash::vk::Format::S8_UINT.as_raw(),
    D24_UNORM_S8_UINT = ash::vk::Format::D24_UNORM_S8_UINT.as_raw(),
    D32_SFLOAT_S8_UINT = ash::vk::Format::D32_SFLOAT_S8_UINT.as_raw(),
}

impl Format {
    /// Returns the aspects that images of this format have.
    pub fn aspects(self) -> ImageAspects {
        match self {
            Format::D16_UNORM | Format::D32_SFLOAT => ImageAspects::DEPTH,
            Format::S8_UINT => ImageAspects::STENCIL,
            Format::D24_UNORM_S8_UINT | Format::D32_SFLOAT_S8_UINT => {
                ImageAspects::DEPTH | ImageAspects::STENCIL
            }
            _ => ImageAspects::COLOR,
        }
    }

    /// Returns the numeric representation of the color components, or `None` for depth/stencil
    /// formats.
    pub fn numeric_type(self) -> Option<NumericType> {
        Some(match self {
            Format::R8_UNORM | Format::R8G8B8A8_UNORM | Format::B8G8R8A8_UNORM => {
                NumericType::UNORM
            }
            Format::R8G8B8A8_SRGB | Format::B8G8R8A8_SRGB => NumericType::SRGB,
            Format::R8G8B8A8_UINT | Format::R32_UINT | Format::R32G32B32A32_UINT => {
                NumericType::UINT
            }
            Format::R8G8B8A8_SINT | Format::R32G32B32A32_SINT => NumericType::SINT,
            Format::R16G16B16A16_SFLOAT | Format::R32_SFLOAT | Format::R32G32B32A32_SFLOAT => {
                NumericType::SFLOAT
            }
            Format::D16_UNORM
            | Format::D32_SFLOAT
            | Format::S8_UINT
            | Format::D24_UNORM_S8_UINT
            | Format::D32_SFLOAT_S8_UINT => return None,
        })
    }

    /// Returns the size in bytes of one texel of `aspect`, or `None` if the format doesn't have
    /// that aspect.
    pub fn texel_size(self, aspect: ImageAspect) -> Option<DeviceSize> {
        match aspect {
            ImageAspect::Color => Some(match self {
                Format::R8_UNORM => 1,
                Format::R8G8B8A8_UNORM
                | Format::R8G8B8A8_SRGB
                | Format::B8G8R8A8_UNORM
                | Format::B8G8R8A8_SRGB
                | Format::R8G8B8A8_UINT
                | Format::R8G8B8A8_SINT
                | Format::R32_UINT
                | Format::R32_SFLOAT => 4,
                Format::R16G16B16A16_SFLOAT => 8,
                Format::R32G32B32A32_UINT
                | Format::R32G32B32A32_SINT
                | Format::R32G32B32A32_SFLOAT => 16,
                _ => return None,
            }),
            ImageAspect::Depth => match self {
                Format::D16_UNORM => Some(2),
                Format::D32_SFLOAT | Format::D24_UNORM_S8_UINT | Format::D32_SFLOAT_S8_UINT => {
                    Some(4)
                }
                _ => None,
            },
            ImageAspect::Stencil => match self {
                Format::S8_UINT | Format::D24_UNORM_S8_UINT | Format::D32_SFLOAT_S8_UINT => {
                    Some(1)
                }
                _ => None,
            },
            _ => None,
        }
    }

    /// Returns whether a view of format `self` can be used over an image of format `other`.
    ///
    /// Identical formats are always compatible. Otherwise both formats must be color formats
    /// whose texels have the same size.
    pub fn is_compatible(self, other: Format) -> bool {
        if self == other {
            return true;
        }

        self.aspects() == ImageAspects::COLOR
            && other.aspects() == ImageAspects::COLOR
            && self.texel_size(ImageAspect::Color) == other.texel_size(ImageAspect::Color)
    }

    /// Converts `value` into the bytes of one texel of `aspect`, as stored in an image of this
    /// format.
    ///
    /// # Panics
    ///
    /// - Panics if the format doesn't have `aspect`.
    /// - Panics if the kind of `value` doesn't match the aspect or the numeric type of the format.
    pub fn encode_clear_value(self, value: ClearValue, aspect: ImageAspect) -> SmallVec<[u8; 16]> {
        assert!(
            self.aspects().contains(aspect.into()),
            "format {:?} doesn't have the {:?} aspect",
            self,
            aspect,
        );

        match aspect {
            ImageAspect::Color => self.encode_color(value),
            ImageAspect::Depth => {
                let depth = match value {
                    ClearValue::Depth(depth) | ClearValue::DepthStencil((depth, _)) => depth,
                    _ => panic!("clear value {:?} can't be used for a depth aspect", value),
                };
                let depth = depth.clamp(0.0, 1.0);

                match self {
                    Format::D16_UNORM => {
                        let raw = (depth * u16::MAX as f32).round() as u16;
                        SmallVec::from_slice(bytemuck::bytes_of(&raw))
                    }
                    Format::D24_UNORM_S8_UINT => {
                        let raw = (depth * 0x00ff_ffff as f32).round() as u32;
                        SmallVec::from_slice(bytemuck::bytes_of(&raw))
                    }
                    _ => SmallVec::from_slice(bytemuck::bytes_of(&depth)),
                }
            }
            ImageAspect::Stencil => {
                let stencil = match value {
                    ClearValue::Stencil(stencil) | ClearValue::DepthStencil((_, stencil)) => {
                        stencil
                    }
                    _ => panic!("clear value {:?} can't be used for a stencil aspect", value),
                };

                SmallVec::from_slice(&[stencil as u8])
            }
            _ => unreachable!(),
        }
    }

    fn encode_color(self, value: ClearValue) -> SmallVec<[u8; 16]> {
        let numeric_type = self.numeric_type();
        assert!(
            matches!(
                (numeric_type, value),
                (
                    Some(NumericType::UNORM | NumericType::SRGB | NumericType::SFLOAT),
                    ClearValue::Float(_),
                ) | (Some(NumericType::UINT), ClearValue::Uint(_))
                    | (Some(NumericType::SINT), ClearValue::Int(_)),
            ),
            "clear value {:?} doesn't match the numeric type {:?} of format {:?}",
            value,
            numeric_type,
            self,
        );

        match (self, value) {
            (Format::R8_UNORM, ClearValue::Float([r, ..])) => SmallVec::from_slice(&[unorm8(r)]),
            (Format::R8G8B8A8_UNORM, ClearValue::Float(rgba)) => {
                SmallVec::from_slice(&rgba.map(unorm8))
            }
            (Format::R8G8B8A8_SRGB, ClearValue::Float([r, g, b, a])) => SmallVec::from_slice(
                &[linear_to_srgb(r), linear_to_srgb(g), linear_to_srgb(b), a].map(unorm8),
            ),
            (Format::B8G8R8A8_UNORM, ClearValue::Float([r, g, b, a])) => {
                SmallVec::from_slice(&[b, g, r, a].map(unorm8))
            }
            (Format::B8G8R8A8_SRGB, ClearValue::Float([r, g, b, a])) => SmallVec::from_slice(
                &[linear_to_srgb(b), linear_to_srgb(g), linear_to_srgb(r), a].map(unorm8),
            ),
            (Format::R16G16B16A16_SFLOAT, ClearValue::Float(rgba)) => {
                let halves = rgba.map(f16::from_f32);
                SmallVec::from_slice(bytemuck::cast_slice(&halves))
            }
            (Format::R32_SFLOAT, ClearValue::Float([r, ..])) => {
                SmallVec::from_slice(bytemuck::bytes_of(&r))
            }
            (Format::R32G32B32A32_SFLOAT, ClearValue::Float(rgba)) => {
                SmallVec::from_slice(bytemuck::cast_slice(&rgba))
            }
            (Format::R8G8B8A8_UINT, ClearValue::Uint(rgba)) => {
                SmallVec::from_slice(&rgba.map(|c| c.min(u8::MAX as u32) as u8))
            }
            (Format::R32_UINT, ClearValue::Uint([r, ..])) => {
                SmallVec::from_slice(bytemuck::bytes_of(&r))
            }
            (Format::R32G32B32A32_UINT, ClearValue::Uint(rgba)) => {
                SmallVec::from_slice(bytemuck::cast_slice(&rgba))
            }
            (Format::R8G8B8A8_SINT, ClearValue::Int(rgba)) => {
                let clamped = rgba.map(|c| c.clamp(i8::MIN as i32, i8::MAX as i32) as i8);
                SmallVec::from_slice(bytemuck::cast_slice(&clamped))
            }
            (Format::R32G32B32A32_SINT, ClearValue::Int(rgba)) => {
                SmallVec::from_slice(bytemuck::cast_slice(&rgba))
            }
            _ => unreachable!(),
        }
    }
}

fn unorm8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * u8::MAX as f32).round() as u8
}

fn linear_to_srgb(value: f32) -> f32 {
    let value = value.clamp(0.0, 1.0);

    if value <= 0.003_130_8 {
        value * 12.92
    } else {
        1.055 * value.powf(1.0 / 2.4) - 0.055
    }
}

impl From<Format> for ash::vk::Format {
    #[inline]
    fn from(val: Format) -> Self {
        ash::vk::Format::from_raw(val as i32)
    }
}

impl TryFrom<ash::vk::Format> for Format {
    type Error = ();

    fn try_from(val: ash::vk::Format) -> Result<Self, Self::Error> {
        Ok(match val {
            ash::vk::Format::R8_UNORM => Format::R8_UNORM,
            ash::vk::Format::R8G8B8A8_UNORM => Format::R8G8B8A8_UNORM,
            ash::vk::Format::R8G8B8A8_SRGB => Format::R8G8B8A8_SRGB,
            ash::vk::Format::B8G8R8A8_UNORM => Format::B8G8R8A8_UNORM,
            ash::vk::Format::B8G8R8A8_SRGB => Format::B8G8R8A8_SRGB,
            ash::vk::Format::R8G8B8A8_UINT => Format::R8G8B8A8_UINT,
            ash::vk::Format::R8G8B8A8_SINT => Format::R8G8B8A8_SINT,
            ash::vk::Format::R16G16B16A16_SFLOAT => Format::R16G16B16A16_SFLOAT,
            ash::vk::Format::R32_UINT => Format::R32_UINT,
            ash::vk::Format::R32_SFLOAT => Format::R32_SFLOAT,
            ash::vk::Format::R32G32B32A32_UINT => Format::R32G32B32A32_UINT,
            ash::vk::Format::R32G32B32A32_SINT => Format::R32G32B32A32_SINT,
            ash::vk::Format::R32G32B32A32_SFLOAT => Format::R32G32B32A32_SFLOAT,
            ash::vk::Format::D16_UNORM => Format::D16_UNORM,
            ash::vk::Format::D32_SFLOAT => Format::D32_SFLOAT,
            ash::vk::Format::S8_UINT => Format::S8_UINT,
            ash::vk::Format::D24_UNORM_S8_UINT => Format::D24_UNORM_S8_UINT,
            ash::vk::Format::D32_SFLOAT_S8_UINT => Format::D32_SFLOAT_S8_UINT,
            _ => return Err(()),
        })
    }
}

/// The numeric representation of the color components of a format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum NumericType {
    SFLOAT,
    SINT,
    SRGB,
    UINT,
    UNORM,
}

/// Describes a uniform value that will be used to fill an image.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ClearValue {
    /// Value for floating-point formats, including `UNORM`, `SRGB` and `SFLOAT`.
    Float([f32; 4]),
    /// Value for signed integer formats.
    Int([i32; 4]),
    /// Value for unsigned integer formats.
    Uint([u32; 4]),
    /// Value for the depth aspect.
    Depth(f32),
    /// Value for the stencil aspect.
    Stencil(u32),
    /// Value for the depth and stencil aspects.
    DepthStencil((f32, u32)),
}

impl From<[f32; 4]> for ClearValue {
    #[inline]
    fn from(val: [f32; 4]) -> ClearValue {
        ClearValue::Float(val)
    }
}

impl From<[u32; 4]> for ClearValue {
    #[inline]
    fn from(val: [u32; 4]) -> ClearValue {
        ClearValue::Uint(val)
    }
}

impl From<[i32; 4]> for ClearValue {
    #[inline]
    fn from(val: [i32; 4]) -> ClearValue {
        ClearValue::Int(val)
    }
}

impl From<f32> for ClearValue {
    #[inline]
    fn from(val: f32) -> ClearValue {
        ClearValue::Depth(val)
    }
}

impl From<u32> for ClearValue {
    #[inline]
    fn from(val: u32) -> ClearValue {
        ClearValue::Stencil(val)
    }
}

impl From<(f32, u32)> for ClearValue {
    #[inline]
    fn from(val: (f32, u32)) -> ClearValue {
        ClearValue::DepthStencil(val)
    }
}

impl From<ClearValue> for ash::vk::ClearValue {
    #[inline]
    fn from(val: ClearValue) -> Self {
        match val {
            ClearValue::Float(float32) => Self {
                color: ash::vk::ClearColorValue { float32 },
            },
            ClearValue::Int(int32) => Self {
                color: ash::vk::ClearColorValue { int32 },
            },
            ClearValue::Uint(uint32) => Self {
                color: ash::vk::ClearColorValue { uint32 },
            },
            ClearValue::Depth(depth) => Self {
                depth_stencil: ash::vk::ClearDepthStencilValue { depth, stencil: 0 },
            },
            ClearValue::Stencil(stencil) => Self {
                depth_stencil: ash::vk::ClearDepthStencilValue {
                    depth: 0.0,
                    stencil,
                },
            },
            ClearValue::DepthStencil((depth, stencil)) => Self {
                depth_stencil: ash::vk::ClearDepthStencilValue { depth, stencil },
            },
        }
    }
}
