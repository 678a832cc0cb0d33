use std::{ffi::CStr, path::PathBuf};

use ash::khr::swapchain;

/// Everything the renderer needs to know up front. Passed by value into
/// [`crate::Renderer::new`]; nothing is read from global state.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    pub application_name: String,
    /// Enables the Khronos validation layer and routes its messages into the log
    pub enable_validations: bool,
    /// Instance extensions needed by the host's windowing system
    pub instance_extensions: Vec<&'static CStr>,
    /// Device extensions every adapter must support to be picked
    pub device_extensions: Vec<&'static CStr>,
    pub vertex_shader: PathBuf,
    pub fragment_shader: PathBuf,
    pub clear_color: [f32; 4],
}

impl RendererConfig {
    pub fn with_instance_extensions(mut self, extensions: Vec<&'static CStr>) -> Self {
        self.instance_extensions = extensions;
        self
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            application_name: env!("CARGO_PKG_NAME").to_owned(),
            enable_validations: cfg!(feature = "enable_validations"),
            instance_extensions: vec![],
            device_extensions: vec![swapchain::NAME],
            vertex_shader: PathBuf::from("target/shaders/vert.spv"),
            fragment_shader: PathBuf::from("target/shaders/frag.spv"),
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}
