//! `vkc` bootstraps a Vulkan compute context.
//!
//! The instance layers and extensions the platform exposes are
//! enumerated into a [`CapabilitySet`], the names the application asks
//! for are matched against it into a [`CapabilityMatch`], and the
//! matches are used to create a [`Context`]. With the `compute` feature,
//! a [`device::ComputeDevice`] with one compute queue and
//! [`device::ShaderModule`]s can be created from the context.
//!
//! ```no_run
//! let entry = vkc::platform::load()?;
//! let config = vkc::ContextConfig::builder()
//!     .layer("VK_LAYER_KHRONOS_validation")
//!     .build()
//!     .unwrap();
//! let context = vkc::Context::from_config(&entry, &config, None)?;
//! # Ok::<(), vkc::Error>(())
//! ```

#![warn(missing_docs)]

pub mod error;
pub use error::*;
pub mod platform;
pub use platform::Platform;
pub mod instance;
pub use instance::*;
pub mod device;

#[cfg(test)]
pub(crate) mod testing;
