use std::ops::Deref;

use ash::vk::{self, Extent2D, FramebufferCreateInfo};

use crate::error::{RenderError, VkContext};

use super::{image_view::ImageView, render_pass::RenderPass};

pub struct Framebuffer {
    device: ash::Device,
    framebuffer: vk::Framebuffer,
}

impl Framebuffer {
    pub fn new(
        device: &ash::Device,
        render_pass: &RenderPass,
        extent: Extent2D,
        image_view: &ImageView,
    ) -> Result<Self, RenderError> {
        let attachments = [**image_view];
        let create_info = FramebufferCreateInfo::default()
            .render_pass(**render_pass)
            .attachments(&attachments)
            .height(extent.height)
            .width(extent.width)
            .layers(1);
        let framebuffer = unsafe { device.create_framebuffer(&create_info, None) }
            .vk_context("vkCreateFramebuffer")?;

        Ok(Self {
            device: device.clone(),
            framebuffer,
        })
    }
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        unsafe { self.device.destroy_framebuffer(self.framebuffer, None) }
    }
}

impl Deref for Framebuffer {
    type Target = vk::Framebuffer;

    fn deref(&self) -> &Self::Target {
        &self.framebuffer
    }
}
