use ash::vk::{PhysicalDevice, QueueFlags};

use crate::{error::RenderError, Instance, Surface};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilyIndices {
    /// family capable of runing graphics related commands
    pub graphics_family: u32,
    /// family capable of displaying results on the surface
    pub present_family: u32,
}

/// How swapchain images are shared between the queue families touching them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSharing {
    Exclusive,
    Concurrent([u32; 2]),
}

impl QueueFamilyIndices {
    /// Scans the queue families once, recording the first family with graphics
    /// support and, independently, the first one able to present. Both may be
    /// the same index.
    pub fn resolve(
        queue_flags: &[QueueFlags],
        mut supports_present: impl FnMut(u32) -> Result<bool, RenderError>,
    ) -> Result<Self, RenderError> {
        let mut graphics_family = None;
        let mut present_family = None;
        for (index, flags) in queue_flags.iter().enumerate() {
            let index = index as u32;
            if graphics_family.is_none() && flags.contains(QueueFlags::GRAPHICS) {
                graphics_family = Some(index);
            }
            if present_family.is_none() && supports_present(index)? {
                present_family = Some(index);
            }
            if graphics_family.is_some() && present_family.is_some() {
                break;
            }
        }

        match (graphics_family, present_family) {
            (Some(graphics_family), Some(present_family)) => Ok(Self {
                graphics_family,
                present_family,
            }),
            _ => Err(RenderError::IncompleteQueueFamilies),
        }
    }

    /// Queries the queue families of `physical_device` against `surface`.
    pub fn find(
        instance: &Instance,
        surface: &Surface,
        physical_device: PhysicalDevice,
    ) -> Result<Self, RenderError> {
        let queue_flags =
            unsafe { instance.get_physical_device_queue_family_properties(physical_device) }
                .iter()
                .map(|properties| properties.queue_flags)
                .collect::<Vec<_>>();
        Self::resolve(&queue_flags, |index| {
            surface.get_physical_device_surface_support(physical_device, index)
        })
    }

    /// Distinct family indices, graphics first.
    pub fn unique(&self) -> Vec<u32> {
        if self.graphics_family == self.present_family {
            vec![self.graphics_family]
        } else {
            vec![self.graphics_family, self.present_family]
        }
    }

    pub fn image_sharing(&self) -> ImageSharing {
        if self.graphics_family == self.present_family {
            ImageSharing::Exclusive
        } else {
            ImageSharing::Concurrent([self.graphics_family, self.present_family])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graphics_and_present_may_share_a_family() {
        let flags = [QueueFlags::TRANSFER, QueueFlags::GRAPHICS | QueueFlags::COMPUTE];
        let indices = QueueFamilyIndices::resolve(&flags, |index| Ok(index == 1)).unwrap();
        assert_eq!(
            indices,
            QueueFamilyIndices {
                graphics_family: 1,
                present_family: 1
            }
        );
        assert_eq!(indices.unique(), vec![1]);
        assert_eq!(indices.image_sharing(), ImageSharing::Exclusive);
    }

    #[test]
    fn first_matching_family_wins_for_each_role() {
        let flags = [
            QueueFlags::COMPUTE,
            QueueFlags::GRAPHICS,
            QueueFlags::GRAPHICS,
            QueueFlags::TRANSFER,
        ];
        let indices = QueueFamilyIndices::resolve(&flags, |index| Ok(index >= 2)).unwrap();
        assert_eq!(indices.graphics_family, 1);
        assert_eq!(indices.present_family, 2);
    }

    #[test]
    fn distinct_families_share_images_concurrently() {
        let flags = [QueueFlags::GRAPHICS, QueueFlags::TRANSFER, QueueFlags::COMPUTE];
        let indices = QueueFamilyIndices::resolve(&flags, |index| Ok(index == 2)).unwrap();
        assert_eq!(indices.unique(), vec![0, 2]);
        assert_eq!(indices.image_sharing(), ImageSharing::Concurrent([0, 2]));
    }

    #[test]
    fn missing_present_support_is_incomplete() {
        let flags = [QueueFlags::GRAPHICS, QueueFlags::COMPUTE];
        let err = QueueFamilyIndices::resolve(&flags, |_| Ok(false)).unwrap_err();
        assert!(matches!(err, RenderError::IncompleteQueueFamilies));
    }

    #[test]
    fn missing_graphics_support_is_incomplete() {
        let flags = [QueueFlags::COMPUTE, QueueFlags::TRANSFER];
        let err = QueueFamilyIndices::resolve(&flags, |_| Ok(true)).unwrap_err();
        assert!(matches!(err, RenderError::IncompleteQueueFamilies));
    }

    #[test]
    fn present_query_errors_propagate() {
        let flags = [QueueFlags::GRAPHICS];
        let err = QueueFamilyIndices::resolve(&flags, |_| {
            Err(RenderError::Vulkan {
                operation: "vkGetPhysicalDeviceSurfaceSupportKHR",
                result: ash::vk::Result::ERROR_SURFACE_LOST_KHR,
            })
        })
        .unwrap_err();
        assert!(matches!(err, RenderError::Vulkan { .. }));
    }
}
