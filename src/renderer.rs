use ash::vk::Extent2D;
use tracing::{debug, info, warn};

use crate::{
    command_pool::CommandPool,
    error::RenderError,
    frame::{self, FrameContext, FrameOutcome, FrameSync},
    pick_physical_device, GraphicsPipeline, Instance, LogicalDevice, RendererConfig, Surface,
    SurfaceTarget, Swapchain,
};

/// Owns the whole Vulkan stack for drawing the triangle.
///
/// Fields are declared in reverse creation order, so dropping a `Renderer`
/// tears everything down in exactly the reverse of how it was built.
pub struct Renderer {
    frame_sync: FrameSync,
    command_pool: CommandPool,
    pipeline: GraphicsPipeline,
    swapchain: Swapchain,
    device: LogicalDevice,
    surface: Surface,
    instance: Instance,
    config: RendererConfig,
    drawable_size: (u32, u32),
    swapchain_stale: bool,
}

impl Renderer {
    pub fn new(config: RendererConfig, target: &impl SurfaceTarget) -> Result<Self, RenderError> {
        let instance = Instance::new(&config)?;
        let surface = Surface::new(&instance, target)?;
        let physical_device =
            pick_physical_device(&instance, &surface, &config.device_extensions)?;
        let device = LogicalDevice::new(
            &instance,
            &surface,
            physical_device,
            &config.device_extensions,
        )?;

        let drawable_size = target.drawable_size();
        let swapchain = Swapchain::new(&instance, &device, &surface, drawable_size, None)?;
        let pipeline = GraphicsPipeline::new(
            &device,
            swapchain.render_pass(),
            &config.vertex_shader,
            &config.fragment_shader,
        )?;
        let command_pool =
            CommandPool::new(&device, device.queue_family_indices().graphics_family)?;
        let frame_sync = FrameSync::new(&device)?;

        let extent = swapchain.extent();
        info!(
            "Renderer ready: {} swapchain images at {}x{}",
            swapchain.image_count(),
            extent.width,
            extent.height
        );

        Ok(Self {
            frame_sync,
            command_pool,
            pipeline,
            swapchain,
            device,
            surface,
            instance,
            config,
            drawable_size,
            swapchain_stale: false,
        })
    }

    /// Draws one frame. Returns [`FrameOutcome::Skipped`] while the drawable has no
    /// area, and rebuilds the swapchain first if the last frame reported it stale.
    pub fn draw_frame(&mut self) -> Result<FrameOutcome, RenderError> {
        let (width, height) = self.drawable_size;
        if width == 0 || height == 0 {
            return Ok(FrameOutcome::Skipped);
        }
        if self.swapchain_stale {
            self.rebuild_swapchain()?;
        }

        let outcome = frame::draw_frame(&FrameContext {
            device: &self.device,
            swapchain: &self.swapchain,
            pipeline: &self.pipeline,
            command_pool: &self.command_pool,
            sync: &self.frame_sync,
            clear_color: self.config.clear_color,
        })?;
        if outcome == FrameOutcome::SwapchainOutOfDate {
            self.swapchain_stale = true;
        }
        Ok(outcome)
    }

    /// Records the host's new drawable size; the swapchain is rebuilt before the
    /// next frame.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.drawable_size != (width, height) {
            debug!("Drawable resized to {}x{}", width, height);
            self.drawable_size = (width, height);
            self.swapchain_stale = true;
        }
    }

    pub fn extent(&self) -> Extent2D {
        self.swapchain.extent()
    }

    pub fn wait_idle(&self) -> Result<(), RenderError> {
        self.device.wait_idle()
    }

    fn rebuild_swapchain(&mut self) -> Result<(), RenderError> {
        self.device.wait_idle()?;

        let swapchain = Swapchain::new(
            &self.instance,
            &self.device,
            &self.surface,
            self.drawable_size,
            Some(&self.swapchain),
        )?;
        // a compatible render pass only needs the same attachment format
        if swapchain.surface_format().format != self.swapchain.surface_format().format {
            self.pipeline = GraphicsPipeline::new(
                &self.device,
                swapchain.render_pass(),
                &self.config.vertex_shader,
                &self.config.fragment_shader,
            )?;
        }
        self.swapchain = swapchain;
        self.swapchain_stale = false;

        let extent = self.swapchain.extent();
        info!("Swapchain rebuilt at {}x{}", extent.width, extent.height);
        Ok(())
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        info!("Shutting down renderer");
        // nothing may be destroyed while the device still uses it
        if let Err(err) = self.device.wait_idle() {
            warn!("Device did not go idle before teardown: {}", err);
        }
    }
}
