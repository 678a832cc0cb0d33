pub mod physical_device;
pub mod queue_families;

use std::{ffi::CStr, ops::Deref};

use ash::vk::{
    DeviceCreateInfo, DeviceQueueCreateInfo, PhysicalDevice, PhysicalDeviceFeatures, Queue,
};
use tracing::{debug, warn};

use crate::{
    error::{RenderError, VkContext},
    Instance, Surface,
};

use self::queue_families::QueueFamilyIndices;

/// Holds handles to the queues created as part of the logical
/// device initialization.
#[derive(Debug, Clone, Copy)]
pub struct Queues {
    pub graphics: Queue,
    pub present: Queue,
}

/// The logical device for interfacing with the selected physical device. Each
/// distinct queue family gets one queue.
pub struct LogicalDevice {
    device: ash::Device,
    physical_device: PhysicalDevice,
    queue_family_indices: QueueFamilyIndices,
    queues: Queues,
}

impl LogicalDevice {
    pub fn new(
        instance: &Instance,
        surface: &Surface,
        physical_device: PhysicalDevice,
        device_extensions: &[&CStr],
    ) -> Result<Self, RenderError> {
        let queue_family_indices = QueueFamilyIndices::find(instance, surface, physical_device)?;
        debug!("Queue families: {:?}", queue_family_indices);

        let queue_priorities = [1.0f32];
        let queue_create_infos = queue_family_indices
            .unique()
            .into_iter()
            .map(|queue_family_index| {
                DeviceQueueCreateInfo::default()
                    .queue_family_index(queue_family_index)
                    .queue_priorities(&queue_priorities)
            })
            .collect::<Vec<_>>();

        let physical_device_features = PhysicalDeviceFeatures::default();

        let extension_names = device_extensions
            .iter()
            .map(|extension_name| extension_name.as_ptr())
            .collect::<Vec<_>>();

        let device_create_info = DeviceCreateInfo::default()
            .queue_create_infos(&queue_create_infos)
            .enabled_features(&physical_device_features)
            .enabled_extension_names(&extension_names);

        let device = unsafe { instance.create_device(physical_device, &device_create_info, None) }
            .vk_context("vkCreateDevice")?;

        let queues = unsafe {
            Queues {
                graphics: device.get_device_queue(queue_family_indices.graphics_family, 0),
                present: device.get_device_queue(queue_family_indices.present_family, 0),
            }
        };

        debug!("Logical device created");
        Ok(Self {
            device,
            physical_device,
            queue_family_indices,
            queues,
        })
    }

    pub fn physical_device(&self) -> PhysicalDevice {
        self.physical_device
    }

    pub fn queue_family_indices(&self) -> &QueueFamilyIndices {
        &self.queue_family_indices
    }

    pub fn queues(&self) -> &Queues {
        &self.queues
    }

    /// Blocks until every queue on the device has drained.
    pub fn wait_idle(&self) -> Result<(), RenderError> {
        unsafe { self.device.device_wait_idle() }.vk_context("vkDeviceWaitIdle")
    }
}

impl Drop for LogicalDevice {
    fn drop(&mut self) {
        debug!("Dropping LogicalDevice");
        if let Err(err) = self.wait_idle() {
            warn!("Destroying device that did not go idle: {}", err);
        }
        unsafe { self.device.destroy_device(None) }
    }
}

impl Deref for LogicalDevice {
    type Target = ash::Device;

    fn deref(&self) -> &Self::Target {
        &self.device
    }
}
