use std::{fs::File, ops::Deref, path::Path};

use ash::{
    util::read_spv,
    vk::{self, ShaderModuleCreateInfo},
};
use tracing::debug;

use crate::error::{RenderError, VkContext};

/// A SPIR-V module loaded from disk. Only needed while the pipeline is being
/// built, so it is usually dropped at the end of that scope.
pub struct ShaderModule {
    device: ash::Device,
    shader_module: vk::ShaderModule,
}

impl ShaderModule {
    pub fn from_file(device: &ash::Device, path: &Path) -> Result<Self, RenderError> {
        let code = load_spirv(path)?;
        let create_info = ShaderModuleCreateInfo::default().code(&code);
        let shader_module = unsafe { device.create_shader_module(&create_info, None) }
            .vk_context("vkCreateShaderModule")?;
        debug!("Loaded shader module {}", path.display());
        Ok(Self {
            device: device.clone(),
            shader_module,
        })
    }
}

/// Reads a SPIR-V binary as aligned words, fixing up byte order if needed.
/// Files whose length is not a multiple of four are rejected.
pub fn load_spirv(path: &Path) -> Result<Vec<u32>, RenderError> {
    let shader_error = |source| RenderError::Shader {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::open(path).map_err(shader_error)?;
    read_spv(&mut file).map_err(shader_error)
}

impl Drop for ShaderModule {
    fn drop(&mut self) {
        unsafe {
            self.device
                .destroy_shader_module(self.shader_module, None)
        }
    }
}

impl Deref for ShaderModule {
    type Target = vk::ShaderModule;

    fn deref(&self) -> &Self::Target {
        &self.shader_module
    }
}
