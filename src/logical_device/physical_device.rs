use std::{
    collections::HashSet,
    ffi::{CStr, CString},
};

use ash::vk::PhysicalDevice;
use tracing::{debug, info};

use crate::{
    error::{RenderError, VkContext},
    Instance, QueueFamilyIndices, Surface, SwapchainSupportDetails,
};

/// What an adapter offers for a particular surface, gathered before deciding
/// whether to use it.
#[derive(Debug, Clone)]
pub struct AdapterReport {
    pub queue_families: Option<QueueFamilyIndices>,
    pub extensions: HashSet<CString>,
    /// Only queried once the required extensions are known to be present
    pub swapchain_support: Option<SwapchainSupportDetails>,
}

impl AdapterReport {
    pub fn query(
        instance: &Instance,
        surface: &Surface,
        physical_device: PhysicalDevice,
        required_extensions: &[&CStr],
    ) -> Result<Self, RenderError> {
        let queue_families = match QueueFamilyIndices::find(instance, surface, physical_device) {
            Ok(queue_families) => Some(queue_families),
            Err(RenderError::IncompleteQueueFamilies) => None,
            Err(err) => return Err(err),
        };

        let extension_properties =
            unsafe { instance.enumerate_device_extension_properties(physical_device) }
                .vk_context("vkEnumerateDeviceExtensionProperties")?;
        let extensions = extension_properties
            .iter()
            .filter_map(|properties| properties.extension_name_as_c_str().ok())
            .map(CStr::to_owned)
            .collect::<HashSet<_>>();

        let mut report = Self {
            queue_families,
            extensions,
            swapchain_support: None,
        };
        if report.supports_extensions(required_extensions) {
            report.swapchain_support = Some(SwapchainSupportDetails::query(surface, physical_device)?);
        }
        Ok(report)
    }

    pub fn supports_extensions(&self, required_extensions: &[&CStr]) -> bool {
        required_extensions
            .iter()
            .all(|extension| self.extensions.contains(*extension))
    }

    pub fn is_suitable(&self, required_extensions: &[&CStr]) -> bool {
        self.queue_families.is_some()
            && self.supports_extensions(required_extensions)
            && self
                .swapchain_support
                .as_ref()
                .is_some_and(SwapchainSupportDetails::is_adequate)
    }
}

/// Returns the first candidate, in the order given, whose report is suitable.
/// Candidates after the first match are never inspected.
pub fn pick_first_suitable<T>(
    candidates: impl IntoIterator<Item = Result<(T, AdapterReport), RenderError>>,
    required_extensions: &[&CStr],
) -> Result<T, RenderError> {
    for candidate in candidates {
        let (adapter, report) = candidate?;
        if report.is_suitable(required_extensions) {
            return Ok(adapter);
        }
    }
    Err(RenderError::NoSuitableAdapter)
}

/// Queries the system for the available physical devices, and picks the first one
/// able to render to and present on `surface`.
pub fn pick_physical_device(
    instance: &Instance,
    surface: &Surface,
    required_extensions: &[&CStr],
) -> Result<PhysicalDevice, RenderError> {
    let physical_devices = unsafe { instance.enumerate_physical_devices() }
        .vk_context("vkEnumeratePhysicalDevices")?;
    debug!("Found {} physical devices", physical_devices.len());

    let candidates = physical_devices.into_iter().map(|physical_device| {
        let report = AdapterReport::query(instance, surface, physical_device, required_extensions)?;
        Ok((physical_device, report))
    });
    let physical_device = pick_first_suitable(candidates, required_extensions)?;

    let properties = unsafe { instance.get_physical_device_properties(physical_device) };
    if let Ok(name) = properties.device_name_as_c_str() {
        info!("Using physical device {:?}", name);
    }
    Ok(physical_device)
}

#[cfg(test)]
mod tests {
    use ash::{
        khr::swapchain,
        vk::{ColorSpaceKHR, Format, PresentModeKHR, SurfaceCapabilitiesKHR, SurfaceFormatKHR},
    };

    use super::*;

    fn suitable_report() -> AdapterReport {
        AdapterReport {
            queue_families: Some(QueueFamilyIndices {
                graphics_family: 0,
                present_family: 0,
            }),
            extensions: HashSet::from([swapchain::NAME.to_owned()]),
            swapchain_support: Some(SwapchainSupportDetails {
                capabilities: SurfaceCapabilitiesKHR::default(),
                formats: vec![SurfaceFormatKHR {
                    format: Format::B8G8R8A8_SRGB,
                    color_space: ColorSpaceKHR::SRGB_NONLINEAR,
                }],
                present_modes: vec![PresentModeKHR::FIFO],
            }),
        }
    }

    #[test]
    fn first_suitable_adapter_in_order_wins() {
        let candidates = vec![
            Ok(("first", suitable_report())),
            Ok(("second", suitable_report())),
        ];
        assert_eq!(
            pick_first_suitable(candidates, &[swapchain::NAME]).unwrap(),
            "first"
        );
    }

    #[test]
    fn adapter_missing_required_extension_is_never_picked() {
        let mut lacking = suitable_report();
        lacking.extensions.clear();
        assert!(!lacking.is_suitable(&[swapchain::NAME]));

        let err = pick_first_suitable(vec![Ok(("lacking", lacking.clone()))], &[swapchain::NAME])
            .unwrap_err();
        assert!(matches!(err, RenderError::NoSuitableAdapter));

        let candidates = vec![Ok(("lacking", lacking)), Ok(("complete", suitable_report()))];
        assert_eq!(
            pick_first_suitable(candidates, &[swapchain::NAME]).unwrap(),
            "complete"
        );
    }

    #[test]
    fn adapter_needs_queue_families_formats_and_present_modes() {
        let mut no_queues = suitable_report();
        no_queues.queue_families = None;
        assert!(!no_queues.is_suitable(&[swapchain::NAME]));

        let mut no_formats = suitable_report();
        if let Some(support) = no_formats.swapchain_support.as_mut() {
            support.formats.clear();
        }
        assert!(!no_formats.is_suitable(&[swapchain::NAME]));

        let mut no_present_modes = suitable_report();
        if let Some(support) = no_present_modes.swapchain_support.as_mut() {
            support.present_modes.clear();
        }
        assert!(!no_present_modes.is_suitable(&[swapchain::NAME]));
    }

    #[test]
    fn no_adapters_means_none_suitable() {
        let candidates: Vec<Result<(u32, AdapterReport), RenderError>> = vec![];
        assert!(matches!(
            pick_first_suitable(candidates, &[swapchain::NAME]),
            Err(RenderError::NoSuitableAdapter)
        ));
    }

    #[test]
    fn query_failures_stop_the_search() {
        let candidates = vec![
            Err(RenderError::Vulkan {
                operation: "vkEnumerateDeviceExtensionProperties",
                result: ash::vk::Result::ERROR_INITIALIZATION_FAILED,
            }),
            Ok(("never reached", suitable_report())),
        ];
        assert!(matches!(
            pick_first_suitable(candidates, &[swapchain::NAME]),
            Err(RenderError::Vulkan { .. })
        ));
    }
}
