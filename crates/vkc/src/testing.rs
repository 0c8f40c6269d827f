//! A scripted [`Platform`] for the unit tests.

use std::{
    cell::{Cell, RefCell},
    ffi::{c_char, CStr, CString},
};

use ash::{
    prelude::VkResult,
    vk::{self, Handle},
};

use crate::{instance::Capability, platform::Platform};

fn write_name(destination: &mut [c_char], name: &str) {
    assert!(name.len() < destination.len(), "{name} is too long");
    for (d, s) in destination.iter_mut().zip(name.bytes()) {
        *d = s as c_char;
    }
    destination[name.len()] = 0;
}

/// Builds a layer record.
pub(crate) fn layer(name: &str) -> vk::LayerProperties {
    let mut property = vk::LayerProperties {
        spec_version: vk::API_VERSION_1_3,
        implementation_version: 1,
        ..Default::default()
    };
    write_name(&mut property.layer_name, name);
    write_name(&mut property.description, "fake layer");
    property
}

/// Builds an extension record.
pub(crate) fn extension(name: &str, spec_version: u32) -> vk::ExtensionProperties {
    let mut property = vk::ExtensionProperties {
        spec_version,
        ..Default::default()
    };
    write_name(&mut property.extension_name, name);
    property
}

/// What an instance was created with.
#[derive(Debug, Clone)]
pub(crate) struct CreatedInstance {
    pub handle: vk::Instance,
    pub application_name: CString,
    pub application_version: u32,
    pub engine_name: CString,
    pub engine_version: u32,
    pub api_version: u32,
    pub layers: Vec<CString>,
    pub extensions: Vec<CString>,
    pub callbacks: Option<usize>,
}

fn callbacks_address(callbacks: Option<&vk::AllocationCallbacks<'_>>) -> Option<usize> {
    callbacks.map(|c| c as *const _ as usize)
}

unsafe fn names(pointer: *const *const c_char, count: u32) -> Vec<CString> {
    if count == 0 {
        return Vec::new();
    }
    std::slice::from_raw_parts(pointer, count as usize)
        .iter()
        .map(|&name| CStr::from_ptr(name).to_owned())
        .collect()
}

fn fill<T: Copy>(available: &[T], count: &mut u32, out: Option<&mut [T]>) -> vk::Result {
    let Some(out) = out else {
        *count = available.len() as u32;
        return vk::Result::SUCCESS;
    };
    let written = (*count as usize).min(out.len()).min(available.len());
    out[..written].copy_from_slice(&available[..written]);
    *count = written as u32;
    if written < available.len() {
        vk::Result::INCOMPLETE
    } else {
        vk::Result::SUCCESS
    }
}

/// A platform reporting a fixed list of layers and extensions.
#[derive(Debug)]
pub(crate) struct FakePlatform {
    pub layers: Vec<vk::LayerProperties>,
    pub extensions: Vec<vk::ExtensionProperties>,
    /// Returned by the counting queries.
    pub count_result: vk::Result,
    /// Overrides the count reported by the counting queries.
    pub reported_count: Option<u32>,
    /// Overrides the result of the filling queries.
    pub fill_result: Option<vk::Result>,
    pub version: VkResult<u32>,
    /// Returned by instance creation, unless `SUCCESS`.
    pub create_result: vk::Result,
    layer_queries: Cell<u32>,
    next_handle: Cell<u64>,
    created: RefCell<Vec<CreatedInstance>>,
    destroyed: RefCell<Vec<(vk::Instance, Option<usize>)>>,
}

impl FakePlatform {
    pub fn new<L, E>(
        layers: impl IntoIterator<Item = L>,
        extensions: impl IntoIterator<Item = E>,
    ) -> Self
    where
        L: AsRef<str>,
        E: AsRef<str>,
    {
        Self {
            layers: layers.into_iter().map(|l| layer(l.as_ref())).collect(),
            extensions: extensions
                .into_iter()
                .map(|e| extension(e.as_ref(), 1))
                .collect(),
            count_result: vk::Result::SUCCESS,
            reported_count: None,
            fill_result: None,
            version: Ok(vk::API_VERSION_1_3),
            create_result: vk::Result::SUCCESS,
            layer_queries: Cell::new(0),
            next_handle: Cell::new(0x1000),
            created: RefCell::new(Vec::new()),
            destroyed: RefCell::new(Vec::new()),
        }
    }

    /// A platform reporting nothing.
    pub fn empty() -> Self {
        Self::new(Vec::<&str>::new(), Vec::<&str>::new())
    }

    /// The number of layer enumeration calls made.
    pub fn layer_queries(&self) -> u32 {
        self.layer_queries.get()
    }

    pub fn created(&self) -> Vec<CreatedInstance> {
        self.created.borrow().clone()
    }

    pub fn destroyed(&self) -> Vec<(vk::Instance, Option<usize>)> {
        self.destroyed.borrow().clone()
    }

    fn query<T: Copy>(&self, available: &[T], count: &mut u32, out: Option<&mut [T]>) -> vk::Result {
        match out {
            None if self.count_result != vk::Result::SUCCESS => self.count_result,
            None => {
                let result = fill(available, count, None);
                if let Some(reported) = self.reported_count {
                    *count = reported;
                }
                result
            }
            out => match self.fill_result {
                Some(result) => result,
                None => fill(available, count, out),
            },
        }
    }
}

impl Platform for FakePlatform {
    type Instance = vk::Instance;

    fn enumerate_layer_properties(
        &self,
        count: &mut u32,
        out: Option<&mut [vk::LayerProperties]>,
    ) -> vk::Result {
        self.layer_queries.set(self.layer_queries.get() + 1);
        self.query(&self.layers, count, out)
    }

    fn enumerate_extension_properties(
        &self,
        layer: Option<&CStr>,
        count: &mut u32,
        out: Option<&mut [vk::ExtensionProperties]>,
    ) -> vk::Result {
        if let Some(layer) = layer {
            let present = self
                .layers
                .iter()
                .any(|l| l.capability_name() == layer);
            if !present {
                return vk::Result::ERROR_LAYER_NOT_PRESENT;
            }
        }
        self.query(&self.extensions, count, out)
    }

    fn instance_version(&self) -> VkResult<u32> {
        self.version
    }

    unsafe fn create_instance(
        &self,
        info: &vk::InstanceCreateInfo<'_>,
        callbacks: Option<&vk::AllocationCallbacks<'_>>,
    ) -> VkResult<Self::Instance> {
        if self.create_result != vk::Result::SUCCESS {
            return Err(self.create_result);
        }
        let application = &*info.p_application_info;
        let handle = vk::Instance::from_raw(self.next_handle.get());
        self.next_handle.set(self.next_handle.get() + 1);
        self.created.borrow_mut().push(CreatedInstance {
            handle,
            application_name: CStr::from_ptr(application.p_application_name).to_owned(),
            application_version: application.application_version,
            engine_name: CStr::from_ptr(application.p_engine_name).to_owned(),
            engine_version: application.engine_version,
            api_version: application.api_version,
            layers: names(info.pp_enabled_layer_names, info.enabled_layer_count),
            extensions: names(info.pp_enabled_extension_names, info.enabled_extension_count),
            callbacks: callbacks_address(callbacks),
        });
        Ok(handle)
    }

    unsafe fn destroy_instance(
        &self,
        instance: &Self::Instance,
        callbacks: Option<&vk::AllocationCallbacks<'_>>,
    ) {
        self.destroyed
            .borrow_mut()
            .push((*instance, callbacks_address(callbacks)));
    }

    fn instance_handle(instance: &Self::Instance) -> vk::Instance {
        *instance
    }
}
