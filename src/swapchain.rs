mod framebuffer;
mod image_view;
mod render_pass;

use ash::{
    khr::swapchain,
    vk::{
        self, CompositeAlphaFlagsKHR, Extent2D, Fence, ImageUsageFlags, PresentInfoKHR, Queue,
        Semaphore, SharingMode, SurfaceFormatKHR, SwapchainCreateInfoKHR, SwapchainKHR,
    },
};
use tracing::debug;

use crate::{
    error::{RenderError, VkContext},
    frame::{AcquiredImage, PresentStatus},
    ImageSharing, Instance, LogicalDevice, Surface, SwapchainSupportDetails,
};

pub use self::{framebuffer::Framebuffer, image_view::ImageView, render_pass::RenderPass};

/// The chain of presentable images plus everything needed to render into them:
/// one view and one framebuffer per image and the render pass they share.
///
/// Fields drop top to bottom, so framebuffers go before the render pass and
/// views, and the swapchain itself goes last.
pub struct Swapchain {
    framebuffers: Vec<Framebuffer>,
    render_pass: RenderPass,
    image_views: Vec<ImageView>,
    extent: Extent2D,
    surface_format: SurfaceFormatKHR,
    handle: SwapchainHandle,
}

struct SwapchainHandle {
    swapchain_fn: swapchain::Device,
    swapchain_ptr: SwapchainKHR,
}

impl Drop for SwapchainHandle {
    fn drop(&mut self) {
        debug!("Dropping Swapchain");
        unsafe {
            self.swapchain_fn
                .destroy_swapchain(self.swapchain_ptr, None)
        }
    }
}

impl Swapchain {
    /// Builds the chain for `surface` at the host's `drawable_size`. When `old` is
    /// given it is handed to the driver so in-flight images can be reused; it stays
    /// owned by the caller and must outlive this call only.
    pub fn new(
        instance: &Instance,
        logical_device: &LogicalDevice,
        surface: &Surface,
        drawable_size: (u32, u32),
        old: Option<&Swapchain>,
    ) -> Result<Self, RenderError> {
        let support = SwapchainSupportDetails::query(surface, logical_device.physical_device())?;
        let surface_format = support
            .choose_surface_format()
            .ok_or(RenderError::NoSurfaceFormat)?;
        let present_mode = support.choose_present_mode();
        let extent = support.choose_extent(drawable_size);
        let image_count = support.image_count();
        debug!(
            "Creating swapchain: {:?} {:?} {}x{} with {} images",
            surface_format.format, present_mode, extent.width, extent.height, image_count
        );

        let sharing = logical_device.queue_family_indices().image_sharing();
        let queue_family_indices = match &sharing {
            ImageSharing::Exclusive => &[][..],
            ImageSharing::Concurrent(indices) => &indices[..],
        };

        let swapchain_create_info = SwapchainCreateInfoKHR::default()
            .surface(**surface)
            .min_image_count(image_count)
            .image_format(surface_format.format)
            .image_color_space(surface_format.color_space)
            .image_extent(extent)
            .present_mode(present_mode)
            // always 1 unless doing sterioscopic 3D
            .image_array_layers(1)
            // use images as color attachments for drawing color pictures to
            .image_usage(ImageUsageFlags::COLOR_ATTACHMENT)
            .image_sharing_mode(sharing_mode(sharing))
            .queue_family_indices(queue_family_indices)
            // no transform
            .pre_transform(support.capabilities.current_transform)
            // ignore alpha channel
            .composite_alpha(CompositeAlphaFlagsKHR::OPAQUE)
            // enable clipping, to discard pixels that aren't visible
            .clipped(true)
            .old_swapchain(old.map_or(SwapchainKHR::null(), |old| old.handle.swapchain_ptr));

        let swapchain_fn = swapchain::Device::new(instance, logical_device);
        let swapchain_ptr = unsafe { swapchain_fn.create_swapchain(&swapchain_create_info, None) }
            .vk_context("vkCreateSwapchainKHR")?;
        // from here on any early return destroys what was built so far
        let handle = SwapchainHandle {
            swapchain_fn,
            swapchain_ptr,
        };

        let images = unsafe { handle.swapchain_fn.get_swapchain_images(swapchain_ptr) }
            .vk_context("vkGetSwapchainImagesKHR")?;
        let image_views = images
            .into_iter()
            .map(|image| ImageView::new(logical_device, surface_format.format, image))
            .collect::<Result<Vec<_>, _>>()?;

        let render_pass = RenderPass::new(logical_device, surface_format.format)?;
        let framebuffers = image_views
            .iter()
            .map(|image_view| Framebuffer::new(logical_device, &render_pass, extent, image_view))
            .collect::<Result<Vec<_>, _>>()?;
        debug!("Swapchain created with {} images", image_views.len());

        Ok(Self {
            framebuffers,
            render_pass,
            image_views,
            extent,
            surface_format,
            handle,
        })
    }

    /// Aquires the index of the next image to use from the swapchain, and registers the
    /// signal semaphore to be signaled when its ready for use. Only the GPU waits on
    /// that semaphore; this call does not block on it.
    pub fn acquire_next_image(
        &self,
        signal_semaphore: Semaphore,
    ) -> Result<AcquiredImage, RenderError> {
        let result = unsafe {
            self.handle.swapchain_fn.acquire_next_image(
                self.handle.swapchain_ptr,
                u64::MAX,
                signal_semaphore,
                Fence::null(),
            )
        };
        match result {
            Ok((index, suboptimal)) => Ok(AcquiredImage::Ready { index, suboptimal }),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(AcquiredImage::OutOfDate),
            Err(result) => Err(RenderError::Vulkan {
                operation: "vkAcquireNextImageKHR",
                result,
            }),
        }
    }

    /// Queues `image_index` for display once `wait_semaphore` is signaled.
    pub fn present(
        &self,
        present_queue: Queue,
        image_index: u32,
        wait_semaphore: Semaphore,
    ) -> Result<PresentStatus, RenderError> {
        let wait_semaphores = [wait_semaphore];
        let swapchains = [self.handle.swapchain_ptr];
        let image_indices = [image_index];
        let present_info = PresentInfoKHR::default()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);
        let result = unsafe {
            self.handle
                .swapchain_fn
                .queue_present(present_queue, &present_info)
        };
        match result {
            Ok(false) => Ok(PresentStatus::Presented),
            Ok(true) => Ok(PresentStatus::Suboptimal),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(PresentStatus::OutOfDate),
            Err(result) => Err(RenderError::Vulkan {
                operation: "vkQueuePresentKHR",
                result,
            }),
        }
    }

    pub fn extent(&self) -> Extent2D {
        self.extent
    }

    pub fn surface_format(&self) -> SurfaceFormatKHR {
        self.surface_format
    }

    pub fn render_pass(&self) -> &RenderPass {
        &self.render_pass
    }

    pub fn image_count(&self) -> usize {
        self.image_views.len()
    }

    pub fn framebuffer(&self, image_index: u32) -> Option<&Framebuffer> {
        self.framebuffers.get(image_index as usize)
    }
}

fn sharing_mode(sharing: ImageSharing) -> SharingMode {
    match sharing {
        ImageSharing::Exclusive => SharingMode::EXCLUSIVE,
        // two families touch the same images without ownership transfers
        ImageSharing::Concurrent(_) => SharingMode::CONCURRENT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QueueFamilyIndices;

    #[test]
    fn shared_family_uses_exclusive_mode() {
        let indices = QueueFamilyIndices {
            graphics_family: 0,
            present_family: 0,
        };
        assert_eq!(sharing_mode(indices.image_sharing()), SharingMode::EXCLUSIVE);
    }

    #[test]
    fn distinct_families_use_concurrent_mode_naming_both() {
        let indices = QueueFamilyIndices {
            graphics_family: 0,
            present_family: 3,
        };
        let sharing = indices.image_sharing();
        assert_eq!(sharing_mode(sharing), SharingMode::CONCURRENT);
        assert_eq!(sharing, ImageSharing::Concurrent([0, 3]));
    }
}
