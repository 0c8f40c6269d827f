//! Compute shader modules loaded from SPIR-V files.

use std::path::Path;

use ash::vk;

use crate::{Error, Result};

/// Reads the SPIR-V words from `reader`. The size must be a multiple of
/// four and the stream must start with the SPIR-V magic number.
pub fn read_spirv<R: std::io::Read + std::io::Seek>(reader: &mut R) -> std::io::Result<Vec<u32>> {
    ash::util::read_spv(reader)
}

/// A shader module, destroyed with the device callbacks on drop.
pub struct ShaderModule<'a> {
    device: &'a ash::Device,
    module: vk::ShaderModule,
    callbacks: Option<&'a vk::AllocationCallbacks<'a>>,
}

impl std::fmt::Debug for ShaderModule<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaderModule")
            .field("device", &self.device.handle())
            .field("module", &self.module)
            .finish()
    }
}

impl<'a> ShaderModule<'a> {
    /// Creates a shader module from SPIR-V words.
    pub fn new(
        device: &'a ash::Device,
        code: &[u32],
        callbacks: Option<&'a vk::AllocationCallbacks<'a>>,
    ) -> Result<Self> {
        if code.is_empty() {
            return Err(Error::InvalidArgument("the shader code is empty"));
        }
        let info = vk::ShaderModuleCreateInfo::default().code(code);
        let module = unsafe { device.create_shader_module(&info, callbacks) }.map_err(|result| {
            log::error!("Couldn't create the shader module ({result}).");
            Error::Platform {
                call: "vkCreateShaderModule",
                result,
            }
        })?;
        log::debug!("Created the shader module {module:?} ({} words).", code.len());
        Ok(Self {
            device,
            module,
            callbacks,
        })
    }

    /// Reads the SPIR-V file at `path` and creates a shader module from it.
    pub fn from_file(
        device: &'a ash::Device,
        path: impl AsRef<Path>,
        callbacks: Option<&'a vk::AllocationCallbacks<'a>>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let code = std::fs::File::open(path)
            .and_then(|mut file| read_spirv(&mut file))
            .map_err(|source| {
                log::error!("Couldn't read the SPIR-V file {path:?}: {source}");
                Error::Shader {
                    path: path.to_owned(),
                    source,
                }
            })?;
        Self::new(device, &code, callbacks)
    }

    /// The module handle.
    pub fn handle(&self) -> vk::ShaderModule {
        self.module
    }
}

impl Drop for ShaderModule<'_> {
    fn drop(&mut self) {
        unsafe { self.device.destroy_shader_module(self.module, self.callbacks) };
    }
}
