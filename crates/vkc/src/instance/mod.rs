//! Instance creation from validated layer and extension matches.

use std::ffi::CString;

use ash::vk;

use crate::{platform::Platform, Error, Result};

pub mod capability;
pub use capability::*;
pub mod matching;
pub use matching::*;

use matching::convert_slice_of_strings_to_cstrings;

/// The parameters of a [`Context`].
#[derive(Debug, Clone, PartialEq, Eq, derive_builder::Builder)]
#[builder(setter(into))]
pub struct ContextConfig {
    /// The name of the application.
    #[builder(default = "\"vkc\".to_owned()")]
    pub application_name: String,
    /// The name of the engine.
    #[builder(default = "\"vkc engine\".to_owned()")]
    pub engine_name: String,
    /// The version of the application. Defaults to the API version.
    #[builder(default, setter(strip_option))]
    pub application_version: Option<u32>,
    /// The version of the engine. Defaults to the API version.
    #[builder(default, setter(strip_option))]
    pub engine_version: Option<u32>,
    /// The highest API version to request. The version reported by the
    /// platform is used if it is lower.
    #[builder(default, setter(strip_option))]
    pub max_api_version: Option<u32>,
    /// The instance layers to enable.
    #[builder(default, setter(each(name = "layer", into)))]
    pub layers: Vec<String>,
    /// The instance extensions to enable.
    #[builder(default, setter(each(name = "extension", into)))]
    pub extensions: Vec<String>,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            application_name: "vkc".to_owned(),
            engine_name: "vkc engine".to_owned(),
            application_version: None,
            engine_version: None,
            max_api_version: None,
            layers: Vec::new(),
            extensions: Vec::new(),
        }
    }
}

impl ContextConfig {
    /// Returns a builder for the config.
    pub fn builder() -> ContextConfigBuilder {
        ContextConfigBuilder::default()
    }
}

fn format_version(version: u32) -> String {
    format!(
        "{}.{}.{}",
        vk::api_version_major(version),
        vk::api_version_minor(version),
        vk::api_version_patch(version)
    )
}

/// A created instance, together with the allocation callbacks it was
/// created with. The instance is destroyed with the same callbacks when
/// the context is dropped.
///
/// The layer and extension matches used to create the context are not
/// owned by it and may be dropped as soon as it is created.
pub struct Context<'a, P: Platform> {
    platform: &'a P,
    instance: P::Instance,
    callbacks: Option<&'a vk::AllocationCallbacks<'a>>,
    api_version: u32,
}

impl<'a, P: Platform> std::fmt::Debug for Context<'a, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("instance", &P::instance_handle(&self.instance))
            .field("callbacks", &self.callbacks.map(|c| c as *const _))
            .field("api_version", &format_version(self.api_version))
            .finish()
    }
}

impl<'a, P: Platform> Context<'a, P> {
    /// Creates an instance enabling the matched layers and extensions.
    /// A [`None`] match enables nothing of its kind.
    pub fn new(
        platform: &'a P,
        config: &ContextConfig,
        layers: Option<&CapabilityMatch>,
        extensions: Option<&CapabilityMatch>,
        callbacks: Option<&'a vk::AllocationCallbacks<'a>>,
    ) -> Result<Self> {
        let reported = platform.instance_version().map_err(|result| {
            log::error!("Couldn't enumerate the instance API version ({result}).");
            Error::Platform {
                call: "vkEnumerateInstanceVersion",
                result,
            }
        })?;
        let api_version = config
            .max_api_version
            .map_or(reported, |max| max.min(reported));

        let application_name = CString::new(config.application_name.as_str())
            .map_err(|_| Error::InvalidName(config.application_name.clone()))?;
        let engine_name = CString::new(config.engine_name.as_str())
            .map_err(|_| Error::InvalidName(config.engine_name.clone()))?;
        let application_version = config.application_version.unwrap_or(api_version);
        let engine_version = config.engine_version.unwrap_or(api_version);

        log::debug!("Name: {application_name:?}");
        log::debug!("Version: {}", format_version(application_version));
        log::debug!("Engine Name: {engine_name:?}");
        log::debug!("Engine Version: {}", format_version(engine_version));
        log::debug!("API Version: {}", format_version(api_version));

        let application_info = vk::ApplicationInfo::default()
            .application_name(&application_name)
            .application_version(application_version)
            .engine_name(&engine_name)
            .engine_version(engine_version)
            .api_version(api_version);

        let layer_names = layers.map(CapabilityMatch::as_ptrs).unwrap_or_default();
        let extension_names = extensions.map(CapabilityMatch::as_ptrs).unwrap_or_default();
        let create_info = vk::InstanceCreateInfo::default()
            .application_info(&application_info)
            .enabled_layer_names(&layer_names)
            .enabled_extension_names(&extension_names);

        let instance = unsafe { platform.create_instance(&create_info, callbacks) }.map_err(
            |result| {
                log::error!("Couldn't create the instance ({result}).");
                Error::Platform {
                    call: "vkCreateInstance",
                    result,
                }
            },
        )?;
        log::debug!(
            "Successfully created the instance {:?}.",
            P::instance_handle(&instance)
        );

        Ok(Self {
            platform,
            instance,
            callbacks,
            api_version,
        })
    }

    /// Enumerates the platform's layers and extensions, matches the names
    /// requested by `config` against them and creates the instance.
    /// An empty request list enables nothing of its kind; a non-empty
    /// one of which nothing is available is a failure.
    pub fn from_config(
        platform: &'a P,
        config: &ContextConfig,
        callbacks: Option<&'a vk::AllocationCallbacks<'a>>,
    ) -> Result<Self> {
        let layers = if config.layers.is_empty() {
            None
        } else {
            let set = LayerSet::enumerate(platform)?;
            let requested = convert_slice_of_strings_to_cstrings(&config.layers)?;
            Some(CapabilityMatch::new(&set, &requested)?)
        };

        let extensions = if config.extensions.is_empty() {
            None
        } else {
            let set = ExtensionSet::enumerate(platform)?;
            let requested = convert_slice_of_strings_to_cstrings(&config.extensions)?;
            Some(CapabilityMatch::new(&set, &requested)?)
        };

        Self::new(
            platform,
            config,
            layers.as_ref(),
            extensions.as_ref(),
            callbacks,
        )
    }

    /// The created instance.
    pub fn instance(&self) -> &P::Instance {
        &self.instance
    }

    /// The raw handle of the instance.
    pub fn handle(&self) -> vk::Instance {
        P::instance_handle(&self.instance)
    }

    /// The allocation callbacks the instance was created with.
    pub fn callbacks(&self) -> Option<&'a vk::AllocationCallbacks<'a>> {
        self.callbacks
    }

    /// The API version the instance was created with.
    pub fn api_version(&self) -> u32 {
        self.api_version
    }
}

impl<'a, P: Platform> Drop for Context<'a, P> {
    fn drop(&mut self) {
        if P::instance_handle(&self.instance) == vk::Instance::null() {
            log::warn!("Not destroying a null instance.");
            return;
        }
        unsafe { self.platform.destroy_instance(&self.instance, self.callbacks) };
    }
}
