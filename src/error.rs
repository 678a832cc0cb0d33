use std::{ffi::NulError, io, path::PathBuf};

use ash::vk;
use thiserror::Error;
use winit::raw_window_handle::HandleError;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to load the Vulkan library: {0}")]
    Loading(#[from] ash::LoadingError),

    #[error("no suitable graphics adapter found")]
    NoSuitableAdapter,

    /// The adapter has no graphics queue family, or none able to present to the surface
    #[error("adapter is missing a graphics or present queue family")]
    IncompleteQueueFamilies,

    #[error("surface reports no pixel formats")]
    NoSurfaceFormat,

    #[error("{operation} failed: {result}")]
    Vulkan {
        operation: &'static str,
        result: vk::Result,
    },

    #[error("swapchain returned image index {0} it has no framebuffer for")]
    InvalidImageIndex(u32),

    #[error("failed to load shader {}: {source}", .path.display())]
    Shader {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("window handle unavailable: {0}")]
    WindowHandle(#[from] HandleError),

    #[error("invalid name: {0}")]
    InvalidName(#[from] NulError),
}

/// Attaches the name of the failed Vulkan call to a raw `vk::Result`.
pub trait VkContext<T> {
    fn vk_context(self, operation: &'static str) -> Result<T, RenderError>;
}

impl<T> VkContext<T> for Result<T, vk::Result> {
    fn vk_context(self, operation: &'static str) -> Result<T, RenderError> {
        self.map_err(|result| RenderError::Vulkan { operation, result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vk_context_names_the_failed_call() {
        let result: Result<(), vk::Result> = Err(vk::Result::ERROR_DEVICE_LOST);
        let err = result.vk_context("vkQueueSubmit").unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("vkQueueSubmit failed: {}", vk::Result::ERROR_DEVICE_LOST)
        );
        assert!(matches!(
            err,
            RenderError::Vulkan {
                operation: "vkQueueSubmit",
                result: vk::Result::ERROR_DEVICE_LOST
            }
        ));
    }

    #[test]
    fn successful_calls_pass_through() {
        let result: Result<u32, vk::Result> = Ok(3);
        assert_eq!(result.vk_context("vkAcquireNextImageKHR").unwrap(), 3);
    }

    #[test]
    fn shader_errors_name_the_file() {
        let err = RenderError::Shader {
            path: PathBuf::from("shaders/vert.spv"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(
            err.to_string(),
            "failed to load shader shaders/vert.spv: missing"
        );
    }
}
