//! Enumeration of the instance layers and extensions the platform exposes.

use std::ffi::CStr;

use ash::vk;

use crate::{platform::Platform, Error, Result};

/// The kind of an instance capability.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CapabilityKind {
    /// A layer, like `VK_LAYER_KHRONOS_validation`.
    Layer,
    /// An extension, like `VK_KHR_portability_enumeration`.
    Extension,
}

impl std::fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Layer => "layer",
            Self::Extension => "extension",
        })
    }
}

/// A record the platform reports for a capability.
///
/// The methods are named apart from the builder setters `ash` generates
/// for the records, which would otherwise win method resolution.
pub trait Capability: Copy + Default {
    /// The kind of the capability.
    const KIND: CapabilityKind;

    /// The name of the capability. A name lacking the nul terminator
    /// within its fixed-size array is empty.
    fn capability_name(&self) -> &CStr;

    /// The version of the specification the capability implements.
    fn capability_version(&self) -> u32;
}

impl Capability for vk::LayerProperties {
    const KIND: CapabilityKind = CapabilityKind::Layer;

    fn capability_name(&self) -> &CStr {
        self.layer_name_as_c_str().unwrap_or_default()
    }

    fn capability_version(&self) -> u32 {
        self.spec_version
    }
}

impl Capability for vk::ExtensionProperties {
    const KIND: CapabilityKind = CapabilityKind::Extension;

    fn capability_name(&self) -> &CStr {
        self.extension_name_as_c_str().unwrap_or_default()
    }

    fn capability_version(&self) -> u32 {
        self.spec_version
    }
}

/// Everything the platform reported for one kind of capability, in the
/// order the platform reported it.
#[derive(Debug, Clone)]
pub struct CapabilitySet<T> {
    properties: Vec<T>,
}

/// The instance layers of the platform.
pub type LayerSet = CapabilitySet<vk::LayerProperties>;

/// The instance extensions of the platform.
pub type ExtensionSet = CapabilitySet<vk::ExtensionProperties>;

impl<T: Capability> CapabilitySet<T> {
    /// Wraps records obtained elsewhere, for example the device
    /// extensions of a physical device.
    pub fn new(properties: Vec<T>) -> Self {
        Self { properties }
    }

    /// The kind of the capabilities in the set.
    pub fn kind(&self) -> CapabilityKind {
        T::KIND
    }

    /// The records, in the order the platform reported them.
    pub fn properties(&self) -> &[T] {
        &self.properties
    }

    /// The number of records.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns `true` if the set has no records.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// The names of the records.
    pub fn names(&self) -> impl Iterator<Item = &CStr> + '_ {
        self.properties.iter().map(Capability::capability_name)
    }

    /// Returns `true` if a record named `name` is in the set.
    pub fn contains(&self, name: &CStr) -> bool {
        self.names().any(|n| n == name)
    }
}

impl LayerSet {
    /// Enumerates the instance layers.
    pub fn enumerate<P: Platform + ?Sized>(platform: &P) -> Result<Self> {
        enumerate(
            "vkEnumerateInstanceLayerProperties",
            "instance layers",
            |count, out| platform.enumerate_layer_properties(count, out),
        )
    }
}

impl ExtensionSet {
    /// Enumerates the instance extensions provided by the implementation
    /// and the implicitly enabled layers.
    pub fn enumerate<P: Platform + ?Sized>(platform: &P) -> Result<Self> {
        Self::enumerate_for_layer(platform, None)
    }

    /// Enumerates the instance extensions provided by `layer`, or by the
    /// implementation if [`None`].
    pub fn enumerate_for_layer<P: Platform + ?Sized>(
        platform: &P,
        layer: Option<&CStr>,
    ) -> Result<Self> {
        enumerate(
            "vkEnumerateInstanceExtensionProperties",
            "instance extensions",
            |count, out| platform.enumerate_extension_properties(layer, count, out),
        )
    }
}

/// Queries the count, sizes a buffer to it and fills it. The count
/// reported by the second query must be the same as the first, and the
/// buffer must have been large enough.
fn enumerate<T, F>(call: &'static str, what: &'static str, mut query: F) -> Result<CapabilitySet<T>>
where
    T: Capability,
    F: FnMut(&mut u32, Option<&mut [T]>) -> vk::Result,
{
    let mut count = 0u32;
    let result = query(&mut count, None);
    if result != vk::Result::SUCCESS {
        log::error!("Couldn't query the number of {what} ({call}: {result}).");
        return Err(Error::Platform { call, result });
    }
    if count == 0 {
        log::error!("The platform reports no {what}.");
        return Err(Error::Empty(what));
    }

    let mut properties = Vec::new();
    properties
        .try_reserve_exact(count as usize)
        .map_err(|source| {
            log::error!("Couldn't allocate {count} {what}: {source}");
            Error::Allocation { what, source }
        })?;
    properties.resize(count as usize, T::default());

    let first = count;
    let result = query(&mut count, Some(properties.as_mut_slice()));
    match result {
        vk::Result::SUCCESS if count == first => {}
        vk::Result::INCOMPLETE => {
            log::error!("The buffer for {first} {what} was too small, more appeared after counting ({call}).");
            return Err(Error::Incomplete { call, capacity: first });
        }
        vk::Result::SUCCESS => {
            log::error!("The number of {what} changed between queries ({call}: {first}, then {count}).");
            return Err(Error::CountChanged {
                call,
                first,
                second: count,
            });
        }
        result => {
            log::error!("Couldn't populate {first} {what} ({call}: {result}).");
            return Err(Error::Platform { call, result });
        }
    }

    log::debug!("Found {count} {what}.");
    for (i, property) in properties.iter().enumerate() {
        log::debug!(
            "i={i}, name={:?}, spec_version={}",
            property.capability_name(),
            property.capability_version()
        );
    }

    Ok(CapabilitySet { properties })
}
