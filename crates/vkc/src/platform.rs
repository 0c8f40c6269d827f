//! The seam between the crate and the Vulkan loader.
//!
//! Everything in [`crate::instance`] talks to the platform through the
//! [`Platform`] trait, so the enumeration, matching and context
//! creation logic runs the same way against [`ash::Entry`] and against
//! a scripted implementation.

use std::ffi::CStr;

use ash::{prelude::VkResult, vk};

use crate::{Error, Result};

/// The instance-level entry points the crate uses.
///
/// The enumeration methods follow the Vulkan two-call idiom: with `out`
/// being [`None`] they write the number of available entries into
/// `count`; otherwise they write at most `count` entries into `out`,
/// update `count` with the number written and return
/// [`vk::Result::INCOMPLETE`] if not everything fit.
pub trait Platform {
    /// The created instance object.
    type Instance;

    /// `vkEnumerateInstanceLayerProperties`.
    fn enumerate_layer_properties(
        &self,
        count: &mut u32,
        out: Option<&mut [vk::LayerProperties]>,
    ) -> vk::Result;

    /// `vkEnumerateInstanceExtensionProperties`. With `layer` being
    /// [`None`] only the extensions provided by the implementation and
    /// the implicitly enabled layers are reported.
    fn enumerate_extension_properties(
        &self,
        layer: Option<&CStr>,
        count: &mut u32,
        out: Option<&mut [vk::ExtensionProperties]>,
    ) -> vk::Result;

    /// Returns the instance-level API version supported by the loader.
    fn instance_version(&self) -> VkResult<u32>;

    /// Creates the instance.
    ///
    /// # Safety
    ///
    /// All the pointers in `info` must be valid for the duration of the
    /// call.
    unsafe fn create_instance(
        &self,
        info: &vk::InstanceCreateInfo<'_>,
        callbacks: Option<&vk::AllocationCallbacks<'_>>,
    ) -> VkResult<Self::Instance>;

    /// Destroys an instance created by [`Platform::create_instance`].
    ///
    /// # Safety
    ///
    /// `callbacks` must be compatible with the ones used for creation and
    /// the instance must not be used afterwards.
    unsafe fn destroy_instance(
        &self,
        instance: &Self::Instance,
        callbacks: Option<&vk::AllocationCallbacks<'_>>,
    );

    /// Returns the raw handle of the instance.
    fn instance_handle(instance: &Self::Instance) -> vk::Instance;
}

/// Loads the Vulkan library of the system.
pub fn load() -> Result<ash::Entry> {
    unsafe { ash::Entry::load() }.map_err(Error::from)
}

fn out_pointer<T>(count: &mut u32, out: Option<&mut [T]>) -> *mut T {
    match out {
        Some(out) => {
            *count = (*count).min(u32::try_from(out.len()).unwrap_or(u32::MAX));
            out.as_mut_ptr()
        }
        None => std::ptr::null_mut(),
    }
}

impl Platform for ash::Entry {
    type Instance = ash::Instance;

    fn enumerate_layer_properties(
        &self,
        count: &mut u32,
        out: Option<&mut [vk::LayerProperties]>,
    ) -> vk::Result {
        let out = out_pointer(count, out);
        unsafe { (self.fp_v1_0().enumerate_instance_layer_properties)(count, out) }
    }

    fn enumerate_extension_properties(
        &self,
        layer: Option<&CStr>,
        count: &mut u32,
        out: Option<&mut [vk::ExtensionProperties]>,
    ) -> vk::Result {
        let layer = layer.map_or(std::ptr::null(), CStr::as_ptr);
        let out = out_pointer(count, out);
        unsafe { (self.fp_v1_0().enumerate_instance_extension_properties)(layer, count, out) }
    }

    fn instance_version(&self) -> VkResult<u32> {
        // A 1.0 loader doesn't expose vkEnumerateInstanceVersion.
        unsafe { self.try_enumerate_instance_version() }
            .map(|version| version.unwrap_or(vk::API_VERSION_1_0))
    }

    unsafe fn create_instance(
        &self,
        info: &vk::InstanceCreateInfo<'_>,
        callbacks: Option<&vk::AllocationCallbacks<'_>>,
    ) -> VkResult<Self::Instance> {
        ash::Entry::create_instance(self, info, callbacks)
    }

    unsafe fn destroy_instance(
        &self,
        instance: &Self::Instance,
        callbacks: Option<&vk::AllocationCallbacks<'_>>,
    ) {
        instance.destroy_instance(callbacks)
    }

    fn instance_handle(instance: &Self::Instance) -> vk::Instance {
        instance.handle()
    }
}
