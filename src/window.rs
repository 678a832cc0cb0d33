use std::ffi::CStr;

use ash::vk::SurfaceKHR;
use winit::{
    raw_window_handle::{HasDisplayHandle, HasWindowHandle},
    window::Window,
};

use crate::{
    error::{RenderError, VkContext},
    Instance, SurfaceTarget,
};

impl SurfaceTarget for Window {
    fn create_surface(&self, instance: &Instance) -> Result<SurfaceKHR, RenderError> {
        unsafe {
            ash_window::create_surface(
                instance.entry(),
                instance,
                self.display_handle()?.as_raw(),
                self.window_handle()?.as_raw(),
                None,
            )
        }
        .vk_context("vkCreateSurfaceKHR")
    }

    fn drawable_size(&self) -> (u32, u32) {
        let size = self.inner_size();
        (size.width, size.height)
    }
}

/// Instance extensions the native windowing system needs to present to `display`.
pub fn required_extensions(
    display: &impl HasDisplayHandle,
) -> Result<Vec<&'static CStr>, RenderError> {
    let extensions = ash_window::enumerate_required_extensions(display.display_handle()?.as_raw())
        .vk_context("vkEnumerateInstanceExtensionProperties")?;
    Ok(extensions
        .iter()
        // the loader hands back pointers into static name tables
        .map(|extension| unsafe { CStr::from_ptr(*extension) })
        .collect())
}
