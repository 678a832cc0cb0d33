use std::ops::Deref;

use ash::vk::{self, PipelineLayoutCreateInfo};

use crate::error::{RenderError, VkContext};

/// Layout with no descriptor sets and no push constants; the triangle's shaders
/// take no external inputs.
pub struct PipelineLayout {
    device: ash::Device,
    layout: vk::PipelineLayout,
}

impl PipelineLayout {
    pub fn new(device: &ash::Device) -> Result<Self, RenderError> {
        let pipeline_layout_create_info = PipelineLayoutCreateInfo::default();
        let layout = unsafe { device.create_pipeline_layout(&pipeline_layout_create_info, None) }
            .vk_context("vkCreatePipelineLayout")?;

        Ok(Self {
            device: device.clone(),
            layout,
        })
    }
}

impl Drop for PipelineLayout {
    fn drop(&mut self) {
        unsafe { self.device.destroy_pipeline_layout(self.layout, None) }
    }
}

impl Deref for PipelineLayout {
    type Target = vk::PipelineLayout;

    fn deref(&self) -> &Self::Target {
        &self.layout
    }
}
