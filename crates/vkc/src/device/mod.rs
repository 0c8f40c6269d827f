//! Physical device selection and a logical device with one compute queue.
#![cfg(feature = "compute")]

use std::ffi::CStr;

use ash::vk;

use crate::{
    instance::{CapabilityMatch, CapabilitySet},
    Context, Error, Result,
};

pub mod shader;
pub use shader::*;

/// Picks the first discrete GPU, or the first device if there is none.
pub fn select_physical_device(
    candidates: &[(vk::PhysicalDevice, vk::PhysicalDeviceProperties)],
) -> Result<vk::PhysicalDevice> {
    let (first, _) = candidates.first().ok_or_else(|| {
        log::error!("No GPUs with Vulkan support found.");
        Error::Empty("physical devices")
    })?;
    let selected = candidates
        .iter()
        .find(|(_, properties)| properties.device_type == vk::PhysicalDeviceType::DISCRETE_GPU)
        .map_or(*first, |(device, _)| *device);
    Ok(selected)
}

/// Returns the index of the first queue family supporting compute.
/// Falls back to the first family if none advertises it.
pub fn compute_queue_family_index(families: &[vk::QueueFamilyProperties]) -> Result<u32> {
    if families.is_empty() {
        log::error!("The physical device reports no queue families.");
        return Err(Error::Empty("queue families"));
    }
    match families
        .iter()
        .position(|family| family.queue_flags.contains(vk::QueueFlags::COMPUTE))
    {
        Some(index) => Ok(index as u32),
        None => {
            log::warn!("No queue family supports compute, falling back to the first one.");
            Ok(0)
        }
    }
}

/// Matches the `requested` device extensions against the ones a physical
/// device reports. A device reporting no extensions at all is a failure
/// of the platform rather than of the request.
pub fn match_device_extensions<S: AsRef<CStr>>(
    available: Vec<vk::ExtensionProperties>,
    requested: &[S],
) -> Result<CapabilityMatch> {
    if available.is_empty() {
        log::error!("The physical device reports no device extensions.");
        return Err(Error::Empty("device extensions"));
    }
    CapabilityMatch::new(&CapabilitySet::new(available), requested)
}

/// A logical device created on the selected physical device, with one
/// queue from a compute-capable family.
///
/// The device borrows the [`Context`] it was created from, so the
/// instance can't be destroyed first:
///
/// ```compile_fail
/// let entry = vkc::platform::load().unwrap();
/// let context = vkc::Context::from_config(&entry, &vkc::ContextConfig::default(), None).unwrap();
/// let none: [&std::ffi::CStr; 0] = [];
/// let device = vkc::device::ComputeDevice::new(&context, &none, None).unwrap();
/// drop(context);
/// drop(device);
/// ```
///
/// Dropping the device first is fine:
///
/// ```no_run
/// let entry = vkc::platform::load().unwrap();
/// let context = vkc::Context::from_config(&entry, &vkc::ContextConfig::default(), None).unwrap();
/// let none: [&std::ffi::CStr; 0] = [];
/// let device = vkc::device::ComputeDevice::new(&context, &none, None).unwrap();
/// drop(device);
/// drop(context);
/// ```
pub struct ComputeDevice<'a> {
    instance: &'a ash::Instance,
    physical_device: vk::PhysicalDevice,
    properties: vk::PhysicalDeviceProperties,
    device: ash::Device,
    queue_family_index: u32,
    queue: vk::Queue,
    extensions: Option<CapabilityMatch>,
    callbacks: Option<&'a vk::AllocationCallbacks<'a>>,
}

impl std::fmt::Debug for ComputeDevice<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComputeDevice")
            .field("physical_device", &self.physical_device)
            .field("name", &self.name())
            .field("device", &self.device.handle())
            .field("queue_family_index", &self.queue_family_index)
            .field("queue", &self.queue)
            .field("extensions", &self.extensions)
            .finish()
    }
}

impl<'a> ComputeDevice<'a> {
    /// Selects a physical device of the instance of `context`, enables
    /// the requested device extensions it supports and creates the
    /// logical device.
    ///
    /// An empty `extensions` request enables none; a non-empty one of
    /// which nothing is supported is a failure.
    pub fn new<S: AsRef<CStr>>(
        context: &'a Context<'_, ash::Entry>,
        extensions: &[S],
        callbacks: Option<&'a vk::AllocationCallbacks<'a>>,
    ) -> Result<Self> {
        let instance = context.instance();
        let physical_devices = unsafe { instance.enumerate_physical_devices() }
            .map_err(Error::platform("vkEnumeratePhysicalDevices"))?;
        let candidates: Vec<_> = physical_devices
            .into_iter()
            .map(|device| (device, unsafe { instance.get_physical_device_properties(device) }))
            .collect();
        let physical_device = select_physical_device(&candidates)?;
        let properties = candidates
            .iter()
            .find(|(device, _)| *device == physical_device)
            .map(|(_, properties)| *properties)
            .unwrap_or_default();
        log::debug!(
            "Selected the physical device {:?} ({:?}).",
            properties.device_name_as_c_str().unwrap_or_default(),
            properties.device_type
        );

        let families =
            unsafe { instance.get_physical_device_queue_family_properties(physical_device) };
        let queue_family_index = compute_queue_family_index(&families)?;

        let extensions = if extensions.is_empty() {
            None
        } else {
            let available =
                unsafe { instance.enumerate_device_extension_properties(physical_device) }
                    .map_err(Error::platform("vkEnumerateDeviceExtensionProperties"))?;
            Some(match_device_extensions(available, extensions)?)
        };
        let extension_names = extensions
            .as_ref()
            .map(CapabilityMatch::as_ptrs)
            .unwrap_or_default();

        let priorities = [1.0];
        let queue_info = vk::DeviceQueueCreateInfo::default()
            .queue_family_index(queue_family_index)
            .queue_priorities(&priorities);
        let device_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(std::slice::from_ref(&queue_info))
            .enabled_extension_names(&extension_names);

        let device = unsafe { instance.create_device(physical_device, &device_info, callbacks) }
            .map_err(|result| {
                log::error!("Couldn't create the logical device ({result}).");
                Error::Platform {
                    call: "vkCreateDevice",
                    result,
                }
            })?;
        let queue = unsafe { device.get_device_queue(queue_family_index, 0) };

        Ok(Self {
            instance,
            physical_device,
            properties,
            device,
            queue_family_index,
            queue,
            extensions,
            callbacks,
        })
    }

    /// The name of the physical device.
    pub fn name(&self) -> &CStr {
        self.properties.device_name_as_c_str().unwrap_or_default()
    }

    /// The instance the device was created from.
    pub fn instance(&self) -> &'a ash::Instance {
        self.instance
    }

    /// The selected physical device.
    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    /// The properties of the selected physical device.
    pub fn properties(&self) -> &vk::PhysicalDeviceProperties {
        &self.properties
    }

    /// The logical device.
    pub fn device(&self) -> &ash::Device {
        &self.device
    }

    /// The family of [`ComputeDevice::queue`].
    pub fn queue_family_index(&self) -> u32 {
        self.queue_family_index
    }

    /// The compute queue.
    pub fn queue(&self) -> vk::Queue {
        self.queue
    }

    /// The enabled device extensions, if any were requested.
    pub fn extensions(&self) -> Option<&CapabilityMatch> {
        self.extensions.as_ref()
    }

    /// The allocation callbacks the device was created with.
    pub fn callbacks(&self) -> Option<&'a vk::AllocationCallbacks<'a>> {
        self.callbacks
    }

    /// Creates a shader module from the SPIR-V file at `path` with the
    /// callbacks of the device.
    pub fn create_shader_module(
        &self,
        path: impl AsRef<std::path::Path>,
    ) -> Result<ShaderModule<'_>> {
        ShaderModule::from_file(&self.device, path, self.callbacks)
    }
}

impl Drop for ComputeDevice<'_> {
    fn drop(&mut self) {
        unsafe {
            if let Err(e) = self.device.device_wait_idle() {
                log::error!("Couldn't wait for the device {self:?} to become idle: {e}");
            }
            self.device.destroy_device(self.callbacks);
        }
    }
}
