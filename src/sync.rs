use std::ops::Deref;

use ash::vk::{self, FenceCreateFlags, FenceCreateInfo, SemaphoreCreateInfo};

use crate::error::{RenderError, VkContext};

/// GPU-side ordering signal between queue operations.
pub struct Semaphore {
    device: ash::Device,
    semaphore: vk::Semaphore,
}

impl Semaphore {
    pub fn new(device: &ash::Device) -> Result<Self, RenderError> {
        let create_info = SemaphoreCreateInfo::default();
        let semaphore = unsafe { device.create_semaphore(&create_info, None) }
            .vk_context("vkCreateSemaphore")?;
        Ok(Self {
            device: device.clone(),
            semaphore,
        })
    }
}

impl Drop for Semaphore {
    fn drop(&mut self) {
        unsafe { self.device.destroy_semaphore(self.semaphore, None) }
    }
}

impl Deref for Semaphore {
    type Target = vk::Semaphore;

    fn deref(&self) -> &Self::Target {
        &self.semaphore
    }
}

/// CPU-observable completion signal.
pub struct Fence {
    device: ash::Device,
    fence: vk::Fence,
}

impl Fence {
    pub fn new(device: &ash::Device, start_signaled: bool) -> Result<Self, RenderError> {
        let mut create_info = FenceCreateInfo::default();
        if start_signaled {
            create_info = create_info.flags(FenceCreateFlags::SIGNALED);
        }
        let fence =
            unsafe { device.create_fence(&create_info, None) }.vk_context("vkCreateFence")?;
        Ok(Self {
            device: device.clone(),
            fence,
        })
    }

    /// Blocks the calling thread, without timeout, until the fence is signaled.
    pub fn wait(&self) -> Result<(), RenderError> {
        unsafe { self.device.wait_for_fences(&[self.fence], true, u64::MAX) }
            .vk_context("vkWaitForFences")
    }

    pub fn reset(&self) -> Result<(), RenderError> {
        unsafe { self.device.reset_fences(&[self.fence]) }.vk_context("vkResetFences")
    }
}

impl Drop for Fence {
    fn drop(&mut self) {
        unsafe { self.device.destroy_fence(self.fence, None) }
    }
}

impl Deref for Fence {
    type Target = vk::Fence;

    fn deref(&self) -> &Self::Target {
        &self.fence
    }
}
