use ash::vk::{
    self, ClearColorValue, ClearValue, CommandBuffer, CommandBufferAllocateInfo,
    CommandBufferBeginInfo, CommandBufferLevel, CommandBufferResetFlags, CommandPoolCreateFlags,
    CommandPoolCreateInfo, Extent2D, Offset2D, Pipeline, PipelineBindPoint, Rect2D,
    RenderPassBeginInfo, SubpassContents, Viewport,
};
use tracing::debug;

use crate::error::{RenderError, VkContext};

/// Everything one recording of the triangle needs.
#[derive(Debug, Clone, Copy)]
pub struct TriangleDraw {
    pub render_pass: vk::RenderPass,
    pub framebuffer: vk::Framebuffer,
    pub pipeline: Pipeline,
    pub extent: Extent2D,
    pub clear_color: [f32; 4],
}

/// A command pool on the graphics family holding the single, resettable command
/// buffer the frame loop re-records every frame.
pub struct CommandPool {
    device: ash::Device,
    command_pool: vk::CommandPool,
    command_buffer: CommandBuffer,
}

impl CommandPool {
    pub fn new(device: &ash::Device, queue_family_index: u32) -> Result<Self, RenderError> {
        debug!("Creating command pool...");

        let command_pool_create_info = CommandPoolCreateInfo::default()
            .flags(CommandPoolCreateFlags::RESET_COMMAND_BUFFER)
            .queue_family_index(queue_family_index);
        let command_pool = unsafe { device.create_command_pool(&command_pool_create_info, None) }
            .vk_context("vkCreateCommandPool")?;

        let command_buffer_allocate_info = CommandBufferAllocateInfo::default()
            .command_pool(command_pool)
            .level(CommandBufferLevel::PRIMARY)
            .command_buffer_count(1);
        let command_buffers =
            match unsafe { device.allocate_command_buffers(&command_buffer_allocate_info) } {
                Ok(command_buffers) => command_buffers,
                Err(result) => {
                    unsafe { device.destroy_command_pool(command_pool, None) };
                    return Err(RenderError::Vulkan {
                        operation: "vkAllocateCommandBuffers",
                        result,
                    });
                }
            };

        debug!("Command pool created");
        Ok(Self {
            device: device.clone(),
            command_pool,
            command_buffer: command_buffers[0],
        })
    }

    pub fn command_buffer(&self) -> CommandBuffer {
        self.command_buffer
    }

    /// Resets the command buffer and records one pass drawing the triangle into
    /// `draw.framebuffer`. The buffer must not be pending on the device.
    pub fn record_triangle(&self, draw: &TriangleDraw) -> Result<(), RenderError> {
        unsafe {
            self.device
                .reset_command_buffer(self.command_buffer, CommandBufferResetFlags::empty())
        }
        .vk_context("vkResetCommandBuffer")?;

        let command_buffer_begin_info = CommandBufferBeginInfo::default();
        unsafe {
            self.device
                .begin_command_buffer(self.command_buffer, &command_buffer_begin_info)
        }
        .vk_context("vkBeginCommandBuffer")?;

        let render_area = Rect2D::default()
            .offset(Offset2D::default())
            .extent(draw.extent);
        let clear_values = [ClearValue {
            color: ClearColorValue {
                float32: draw.clear_color,
            },
        }];
        let render_pass_begin_info = RenderPassBeginInfo::default()
            .render_pass(draw.render_pass)
            .framebuffer(draw.framebuffer)
            .render_area(render_area)
            .clear_values(&clear_values);

        let viewports = [Viewport::default()
            .x(0.0)
            .y(0.0)
            .width(draw.extent.width as f32)
            .height(draw.extent.height as f32)
            .min_depth(0.0)
            .max_depth(1.0)];
        let scissors = [render_area];

        unsafe {
            self.device.cmd_begin_render_pass(
                self.command_buffer,
                &render_pass_begin_info,
                SubpassContents::INLINE,
            );
            self.device.cmd_bind_pipeline(
                self.command_buffer,
                PipelineBindPoint::GRAPHICS,
                draw.pipeline,
            );
            self.device
                .cmd_set_viewport(self.command_buffer, 0, &viewports);
            self.device.cmd_set_scissor(self.command_buffer, 0, &scissors);
            self.device.cmd_draw(self.command_buffer, 3, 1, 0, 0);
            self.device.cmd_end_render_pass(self.command_buffer);
            self.device.end_command_buffer(self.command_buffer)
        }
        .vk_context("vkEndCommandBuffer")
    }
}

impl Drop for CommandPool {
    fn drop(&mut self) {
        debug!("Dropping CommandPool");
        // frees the command buffer along with the pool
        unsafe { self.device.destroy_command_pool(self.command_pool, None) }
    }
}
