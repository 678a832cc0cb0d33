use std::ops::Deref;

use ash::vk::{
    self, ComponentMapping, ComponentSwizzle, Format, Image, ImageAspectFlags,
    ImageSubresourceRange, ImageViewCreateInfo, ImageViewType,
};

use crate::error::{RenderError, VkContext};

/// A 2D color view onto one swapchain image. The image itself belongs to the
/// swapchain and is not destroyed here.
pub struct ImageView {
    device: ash::Device,
    image_view: vk::ImageView,
}

impl ImageView {
    pub fn new(device: &ash::Device, format: Format, image: Image) -> Result<Self, RenderError> {
        let image_view_create_info = ImageViewCreateInfo::default()
            .image(image)
            // 2D images
            .view_type(ImageViewType::TYPE_2D)
            .format(format)
            // no swizzling
            .components(
                ComponentMapping::default()
                    .a(ComponentSwizzle::IDENTITY)
                    .b(ComponentSwizzle::IDENTITY)
                    .g(ComponentSwizzle::IDENTITY)
                    .r(ComponentSwizzle::IDENTITY),
            )
            // color images with no mipmapping or layers
            .subresource_range(
                ImageSubresourceRange::default()
                    .aspect_mask(ImageAspectFlags::COLOR)
                    .base_mip_level(0)
                    .level_count(1)
                    .base_array_layer(0)
                    .layer_count(1),
            );
        let image_view = unsafe { device.create_image_view(&image_view_create_info, None) }
            .vk_context("vkCreateImageView")?;

        Ok(Self {
            device: device.clone(),
            image_view,
        })
    }
}

impl Drop for ImageView {
    fn drop(&mut self) {
        unsafe { self.device.destroy_image_view(self.image_view, None) }
    }
}

impl Deref for ImageView {
    type Target = vk::ImageView;

    fn deref(&self) -> &Self::Target {
        &self.image_view
    }
}
