mod pipeline_layout;
mod shader_module;

use std::{ffi::CStr, ops::Deref, path::Path};

use ash::vk::{
    self, ColorComponentFlags, CullModeFlags, DynamicState, FrontFace, GraphicsPipelineCreateInfo,
    PipelineCache, PipelineColorBlendAttachmentState, PipelineColorBlendStateCreateInfo,
    PipelineDynamicStateCreateInfo, PipelineInputAssemblyStateCreateInfo,
    PipelineMultisampleStateCreateInfo, PipelineRasterizationStateCreateInfo,
    PipelineShaderStageCreateInfo, PipelineVertexInputStateCreateInfo,
    PipelineViewportStateCreateInfo, PolygonMode, PrimitiveTopology, SampleCountFlags,
    ShaderStageFlags,
};
use tracing::debug;

use crate::{
    error::{RenderError, VkContext},
    swapchain::RenderPass,
};

pub use self::{
    pipeline_layout::PipelineLayout,
    shader_module::{load_spirv, ShaderModule},
};

const SHADER_ENTRY_POINT: &CStr = c"main";

/// Viewport and scissor are set while recording each frame instead of being
/// baked in, so the pipeline survives swapchain rebuilds of a different size.
pub const DYNAMIC_STATES: [DynamicState; 2] = [DynamicState::VIEWPORT, DynamicState::SCISSOR];

/// The fixed-function state and shaders used to draw the triangle. The
/// vertices live in the vertex shader, so there is no vertex input.
pub struct GraphicsPipeline {
    device: ash::Device,
    pipeline: vk::Pipeline,
    // must outlive the pipeline
    _layout: PipelineLayout,
}

impl GraphicsPipeline {
    pub fn new(
        device: &ash::Device,
        render_pass: &RenderPass,
        vertex_shader: &Path,
        fragment_shader: &Path,
    ) -> Result<Self, RenderError> {
        debug!("Creating graphics pipeline...");

        // released when this function returns, whether or not the pipeline was built
        let vertex_shader_module = ShaderModule::from_file(device, vertex_shader)?;
        let fragment_shader_module = ShaderModule::from_file(device, fragment_shader)?;
        let shader_stages = [
            PipelineShaderStageCreateInfo::default()
                .stage(ShaderStageFlags::VERTEX)
                .module(*vertex_shader_module)
                .name(SHADER_ENTRY_POINT),
            PipelineShaderStageCreateInfo::default()
                .stage(ShaderStageFlags::FRAGMENT)
                .module(*fragment_shader_module)
                .name(SHADER_ENTRY_POINT),
        ];

        // we're not using vertex buffers, so just an empty object
        let vertex_input_state = PipelineVertexInputStateCreateInfo::default();

        // configure the vertexes to be interpreted as a list of triangles
        let input_assembly_state = PipelineInputAssemblyStateCreateInfo::default()
            .topology(PrimitiveTopology::TRIANGLE_LIST)
            .primitive_restart_enable(false);

        // one of each, with the actual rectangles supplied at record time
        let viewport_state = PipelineViewportStateCreateInfo::default()
            .viewport_count(1)
            .scissor_count(1);
        let dynamic_state = PipelineDynamicStateCreateInfo::default().dynamic_states(&DYNAMIC_STATES);

        let rasterization_state = PipelineRasterizationStateCreateInfo::default()
            // setting this to false discards points before the near plane or after the far plane
            .depth_clamp_enable(false)
            // setting this to true would disable the rasterizer
            .rasterizer_discard_enable(false)
            // create filled polygons, instead of lines or points
            .polygon_mode(PolygonMode::FILL)
            .line_width(1.0f32)
            .cull_mode(CullModeFlags::BACK)
            .front_face(FrontFace::CLOCKWISE)
            // mainly used for shadow mapping
            .depth_bias_enable(false);

        let multisample_state = PipelineMultisampleStateCreateInfo::default()
            .sample_shading_enable(false)
            .rasterization_samples(SampleCountFlags::TYPE_1);

        // blending disabled, fragment output overwrites the attachment
        let color_blend_attachment_state = [PipelineColorBlendAttachmentState::default()
            .blend_enable(false)
            .color_write_mask(ColorComponentFlags::RGBA)];
        let color_blend_state = PipelineColorBlendStateCreateInfo::default()
            .logic_op_enable(false)
            .attachments(&color_blend_attachment_state);

        let layout = PipelineLayout::new(device)?;

        let graphics_pipeline_create_info = [GraphicsPipelineCreateInfo::default()
            .stages(&shader_stages)
            .vertex_input_state(&vertex_input_state)
            .input_assembly_state(&input_assembly_state)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterization_state)
            .multisample_state(&multisample_state)
            .color_blend_state(&color_blend_state)
            .dynamic_state(&dynamic_state)
            .layout(*layout)
            .render_pass(**render_pass)
            .subpass(0)];

        let pipelines = unsafe {
            device.create_graphics_pipelines(
                PipelineCache::null(),
                &graphics_pipeline_create_info,
                None,
            )
        }
        .map_err(|(_, result)| result)
        .vk_context("vkCreateGraphicsPipelines")?;

        debug!("Graphics pipeline created");
        Ok(Self {
            device: device.clone(),
            pipeline: pipelines[0],
            _layout: layout,
        })
    }
}

impl Drop for GraphicsPipeline {
    fn drop(&mut self) {
        debug!("Dropping GraphicsPipeline");
        unsafe { self.device.destroy_pipeline(self.pipeline, None) }
    }
}

impl Deref for GraphicsPipeline {
    type Target = vk::Pipeline;

    fn deref(&self) -> &Self::Target {
        &self.pipeline
    }
}
