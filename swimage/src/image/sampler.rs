// Copyright (c) 2024 The swimage developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! How the components of a view are presented to the sampling stage.

use crate::macros::vulkan_enum;

/// A mapping between components of a source format and components read by a shader.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ComponentMapping {
    /// First component.
    pub r: ComponentSwizzle,
    /// Second component.
    pub g: ComponentSwizzle,
    /// Third component.
    pub b: ComponentSwizzle,
    /// Fourth component.
    pub a: ComponentSwizzle,
}

impl ComponentMapping {
    /// Creates a `ComponentMapping` with all components identity swizzled.
    #[inline]
    pub fn identity() -> Self {
        Self::default()
    }

    /// Returns `true` if all components are identity swizzled,
    /// meaning that all the members are `Identity` or the name of that member.
    #[inline]
    pub fn is_identity(&self) -> bool {
        self.r_is_identity() && self.g_is_identity() && self.b_is_identity() && self.a_is_identity()
    }

    /// Returns `true` if the red component mapping is identity swizzled.
    #[inline]
    pub fn r_is_identity(&self) -> bool {
        matches!(self.r, ComponentSwizzle::Identity | ComponentSwizzle::Red)
    }

    /// Returns `true` if the green component mapping is identity swizzled.
    #[inline]
    pub fn g_is_identity(&self) -> bool {
        matches!(self.g, ComponentSwizzle::Identity | ComponentSwizzle::Green)
    }

    /// Returns `true` if the blue component mapping is identity swizzled.
    #[inline]
    pub fn b_is_identity(&self) -> bool {
        matches!(self.b, ComponentSwizzle::Identity | ComponentSwizzle::Blue)
    }

    /// Returns `true` if the alpha component mapping is identity swizzled.
    #[inline]
    pub fn a_is_identity(&self) -> bool {
        matches!(self.a, ComponentSwizzle::Identity | ComponentSwizzle::Alpha)
    }

    /// Returns a mapping where every `Identity` component is replaced with the component it
    /// stands for. Other components are kept as they are.
    ///
    /// The returned mapping never contains `Identity`.
    #[inline]
    pub fn resolve_identity(self) -> Self {
        let resolve = |swizzle: ComponentSwizzle, own: ComponentSwizzle| match swizzle {
            ComponentSwizzle::Identity => own,
            swizzle => swizzle,
        };

        Self {
            r: resolve(self.r, ComponentSwizzle::Red),
            g: resolve(self.g, ComponentSwizzle::Green),
            b: resolve(self.b, ComponentSwizzle::Blue),
            a: resolve(self.a, ComponentSwizzle::Alpha),
        }
    }

    /// Returns the component indices that each component reads from. The index is `None` if the
    /// component has a fixed value and is not read from anywhere (`Zero` or `One`).
    #[inline]
    pub fn component_map(&self) -> [Option<usize>; 4] {
        let resolved = self.resolve_identity();

        [resolved.r, resolved.g, resolved.b, resolved.a].map(|swizzle| match swizzle {
            ComponentSwizzle::Zero | ComponentSwizzle::One => None,
            ComponentSwizzle::Red => Some(0),
            ComponentSwizzle::Green => Some(1),
            ComponentSwizzle::Blue => Some(2),
            ComponentSwizzle::Alpha => Some(3),
            ComponentSwizzle::Identity => unreachable!(),
        })
    }
}

impl From<ComponentMapping> for ash::vk::ComponentMapping {
    #[inline]
    fn from(value: ComponentMapping) -> Self {
        Self {
            r: value.r.into(),
            g: value.g.into(),
            b: value.b.into(),
            a: value.a.into(),
        }
    }
}

impl TryFrom<ash::vk::ComponentMapping> for ComponentMapping {
    type Error = ();

    #[inline]
    fn try_from(value: ash::vk::ComponentMapping) -> Result<Self, Self::Error> {
        Ok(Self {
            r: value.r.try_into()?,
            g: value.g.try_into()?,
            b: value.b.try_into()?,
            a: value.a.try_into()?,
        })
    }
}

vulkan_enum! {
    /// Describes the value that an individual component must return when being accessed.
    ComponentSwizzle = ComponentSwizzle(i32);

    /// Returns the value that this component should normally have.
    ///
    /// This is the `Default` value.
    Identity = IDENTITY,

    /// Always return zero.
    Zero = ZERO,

    /// Always return one.
    One = ONE,

    /// Returns the value of the first component.
    Red = R,

    /// Returns the value of the second component.
    Green = G,

    /// Returns the value of the third component.
    Blue = B,

    /// Returns the value of the fourth component.
    Alpha = A,
}

impl Default for ComponentSwizzle {
    #[inline]
    fn default() -> ComponentSwizzle {
        ComponentSwizzle::Identity
    }
}
