// Copyright (c) 2024 The swimage developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Image views for a software implementation of the Vulkan pipeline.
//!
//! # Brief summary
//!
//! - An [*image*](crate::image) owns texel storage. Any type implementing
//!   [`ImageAccess`](crate::image::ImageAccess) can act as one; [`Image`](crate::image::Image)
//!   is a plain in-memory implementation.
//!
//! - An [*image view*](crate::image::view) is a typed window onto a subset of an image's mip
//!   levels, array layers and aspects. Views are created from an
//!   [`ImageViewCreateInfo`](crate::image::view::ImageViewCreateInfo) and never own the image
//!   they look at: they borrow it, so the image always outlives its views.
//!
//! - Views resolve identity swizzles and "remaining" level/layer counts once, when they are
//!   created. Clears, resolves and texel address lookups afterwards only read that resolved
//!   state.
//!
//! # Errors
//!
//! Nothing in this crate returns a recoverable error. Inputs that break an invariant (an index
//! out of range, a raw value outside a closed enumeration) panic, and so do combinations that are
//! valid Vulkan usage but that this implementation doesn't handle, after logging a diagnostic
//! through [`log`].
//!
//! # Threading
//!
//! Every operation runs to completion on the calling thread. Views are immutable after creation
//! and can be shared freely; ordering writes to the underlying image is the caller's job.

pub use ash::vk::{REMAINING_ARRAY_LAYERS, REMAINING_MIP_LEVELS};
pub use half;

pub mod format;
pub mod image;
mod macros;

/// Represents memory size and offset values.
/// Analogous to the Rust `usize` type on the host.
pub use ash::vk::DeviceSize;

/// Used in `*CreateInfo` structs to prevent them from being constructed without
/// `..Default::default()`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NonExhaustive(pub(crate) ());
