use std::ops::Deref;

use ash::{
    khr::surface,
    vk::{PhysicalDevice, PresentModeKHR, SurfaceCapabilitiesKHR, SurfaceFormatKHR, SurfaceKHR},
};
use tracing::debug;

use crate::{
    error::{RenderError, VkContext},
    Instance,
};

/// What the renderer needs from its host: a drawable surface for a given
/// instance, and the current size of that drawable in pixels.
pub trait SurfaceTarget {
    fn create_surface(&self, instance: &Instance) -> Result<SurfaceKHR, RenderError>;

    fn drawable_size(&self) -> (u32, u32);
}

/// Owns a presentation surface. Must be dropped after everything built on
/// the device and before the instance.
pub struct Surface {
    surface_fn: surface::Instance,
    surface_ptr: SurfaceKHR,
}

impl Surface {
    pub fn new(instance: &Instance, target: &impl SurfaceTarget) -> Result<Self, RenderError> {
        let surface_fn = surface::Instance::new(instance.entry(), instance);
        let surface_ptr = target.create_surface(instance)?;
        debug!("Surface created");
        Ok(Self {
            surface_fn,
            surface_ptr,
        })
    }

    pub(crate) fn get_physical_device_surface_capabilities(
        &self,
        physical_device: PhysicalDevice,
    ) -> Result<SurfaceCapabilitiesKHR, RenderError> {
        unsafe {
            self.surface_fn
                .get_physical_device_surface_capabilities(physical_device, self.surface_ptr)
        }
        .vk_context("vkGetPhysicalDeviceSurfaceCapabilitiesKHR")
    }

    pub(crate) fn get_physical_device_surface_formats(
        &self,
        physical_device: PhysicalDevice,
    ) -> Result<Vec<SurfaceFormatKHR>, RenderError> {
        unsafe {
            self.surface_fn
                .get_physical_device_surface_formats(physical_device, self.surface_ptr)
        }
        .vk_context("vkGetPhysicalDeviceSurfaceFormatsKHR")
    }

    pub(crate) fn get_physical_device_surface_present_modes(
        &self,
        physical_device: PhysicalDevice,
    ) -> Result<Vec<PresentModeKHR>, RenderError> {
        unsafe {
            self.surface_fn
                .get_physical_device_surface_present_modes(physical_device, self.surface_ptr)
        }
        .vk_context("vkGetPhysicalDeviceSurfacePresentModesKHR")
    }

    pub(crate) fn get_physical_device_surface_support(
        &self,
        physical_device: PhysicalDevice,
        queue_family_index: u32,
    ) -> Result<bool, RenderError> {
        unsafe {
            self.surface_fn.get_physical_device_surface_support(
                physical_device,
                queue_family_index,
                self.surface_ptr,
            )
        }
        .vk_context("vkGetPhysicalDeviceSurfaceSupportKHR")
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        debug!("Dropping Surface");
        unsafe { self.surface_fn.destroy_surface(self.surface_ptr, None) }
    }
}

impl Deref for Surface {
    type Target = SurfaceKHR;

    fn deref(&self) -> &Self::Target {
        &self.surface_ptr
    }
}
