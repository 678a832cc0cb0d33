use ash::vk::{
    ColorSpaceKHR, Extent2D, Format, PhysicalDevice, PresentModeKHR, SurfaceCapabilitiesKHR,
    SurfaceFormatKHR,
};

use crate::{error::RenderError, Surface};

#[derive(Debug, Clone)]
/// Details about what features the swap chain supports
/// for a given surface
pub struct SwapchainSupportDetails {
    pub capabilities: SurfaceCapabilitiesKHR,
    /// The formats (color depth settings) available to use.
    pub formats: Vec<SurfaceFormatKHR>,
    pub present_modes: Vec<PresentModeKHR>,
}

impl SwapchainSupportDetails {
    /// Queries for the details of what the swap chain supports given
    /// the physical device and surface
    pub fn query(surface: &Surface, physical_device: PhysicalDevice) -> Result<Self, RenderError> {
        Ok(Self {
            capabilities: surface.get_physical_device_surface_capabilities(physical_device)?,
            formats: surface.get_physical_device_surface_formats(physical_device)?,
            present_modes: surface.get_physical_device_surface_present_modes(physical_device)?,
        })
    }

    /// At least one format and one present mode to build a swapchain with
    pub fn is_adequate(&self) -> bool {
        !self.formats.is_empty() && !self.present_modes.is_empty()
    }

    /// 8-bit BGRA in the sRGB non-linear color space if offered, otherwise
    /// whatever the surface lists first.
    pub fn choose_surface_format(&self) -> Option<SurfaceFormatKHR> {
        self.formats
            .iter()
            .find(|format| {
                format.format == Format::B8G8R8A8_SRGB
                    && format.color_space == ColorSpaceKHR::SRGB_NONLINEAR
            })
            .or_else(|| self.formats.first())
            .copied()
    }

    pub fn choose_present_mode(&self) -> PresentModeKHR {
        // prefer mailbox, where if we can render faster than the screen can present
        // and the queue fills up, we'll replace the last image with the most up to
        // date version
        if self.present_modes.contains(&PresentModeKHR::MAILBOX) {
            return PresentModeKHR::MAILBOX;
        }
        // otherwise, use FIFO - basically vertical sync. This is the only setting
        // guaranteed to be available on all systems
        PresentModeKHR::FIFO
    }

    /// Returns the "extent" of the images to draw - the resolution to use *in pixels*.
    pub fn choose_extent(&self, (width, height): (u32, u32)) -> Extent2D {
        match self.capabilities.current_extent.width {
            // the surface leaves the size up to us, so follow the drawable
            // within the allowed bounds
            u32::MAX => Extent2D {
                width: width.clamp(
                    self.capabilities.min_image_extent.width,
                    self.capabilities.max_image_extent.width,
                ),
                height: height.clamp(
                    self.capabilities.min_image_extent.height,
                    self.capabilities.max_image_extent.height,
                ),
            },
            _ => self.capabilities.current_extent,
        }
    }

    /// One more than the minimum, capped at the maximum when there is one
    /// (zero means uncapped).
    pub fn image_count(&self) -> u32 {
        let min_image_count = self.capabilities.min_image_count;
        let max_image_count = self.capabilities.max_image_count;
        let image_count = min_image_count + 1;
        if max_image_count > 0 && image_count > max_image_count {
            max_image_count
        } else {
            image_count
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(min_image_count: u32, max_image_count: u32) -> SwapchainSupportDetails {
        SwapchainSupportDetails {
            capabilities: SurfaceCapabilitiesKHR {
                min_image_count,
                max_image_count,
                current_extent: Extent2D {
                    width: 800,
                    height: 600,
                },
                min_image_extent: Extent2D {
                    width: 1,
                    height: 1,
                },
                max_image_extent: Extent2D {
                    width: 4096,
                    height: 4096,
                },
                ..Default::default()
            },
            formats: vec![SurfaceFormatKHR {
                format: Format::B8G8R8A8_UNORM,
                color_space: ColorSpaceKHR::SRGB_NONLINEAR,
            }],
            present_modes: vec![PresentModeKHR::FIFO],
        }
    }

    #[test]
    fn image_count_is_min_plus_one_within_bounds() {
        for (min, max, expected) in [(2, 8, 3), (2, 0, 3), (3, 3, 3), (1, 2, 2), (4, 16, 5)] {
            assert_eq!(details(min, max).image_count(), expected, "min {min} max {max}");
        }
    }

    #[test]
    fn single_image_surface_gets_exactly_one_image() {
        assert_eq!(details(1, 1).image_count(), 1);
    }

    #[test]
    fn fifo_only_surface_selects_fifo() {
        assert_eq!(details(2, 3).choose_present_mode(), PresentModeKHR::FIFO);
    }

    #[test]
    fn mailbox_is_preferred_when_listed() {
        let mut support = details(2, 3);
        support.present_modes = vec![
            PresentModeKHR::FIFO,
            PresentModeKHR::IMMEDIATE,
            PresentModeKHR::MAILBOX,
        ];
        assert_eq!(support.choose_present_mode(), PresentModeKHR::MAILBOX);
    }

    #[test]
    fn bgra8_srgb_is_preferred_over_the_first_entry() {
        let mut support = details(2, 3);
        let preferred = SurfaceFormatKHR {
            format: Format::B8G8R8A8_SRGB,
            color_space: ColorSpaceKHR::SRGB_NONLINEAR,
        };
        support.formats = vec![
            SurfaceFormatKHR {
                format: Format::R16G16B16A16_SFLOAT,
                color_space: ColorSpaceKHR::SRGB_NONLINEAR,
            },
            preferred,
        ];
        assert_eq!(support.choose_surface_format(), Some(preferred));

        support.formats.reverse();
        assert_eq!(support.choose_surface_format(), Some(preferred));
    }

    #[test]
    fn first_format_is_the_fallback() {
        let mut support = details(2, 3);
        let first = SurfaceFormatKHR {
            format: Format::R8G8B8A8_UNORM,
            color_space: ColorSpaceKHR::SRGB_NONLINEAR,
        };
        support.formats = vec![
            first,
            SurfaceFormatKHR {
                format: Format::B8G8R8A8_SRGB,
                color_space: ColorSpaceKHR::DISPLAY_P3_NONLINEAR_EXT,
            },
        ];
        assert_eq!(support.choose_surface_format(), Some(first));

        support.formats.clear();
        assert_eq!(support.choose_surface_format(), None);
        assert!(!support.is_adequate());
    }

    #[test]
    fn definite_current_extent_is_used_as_is() {
        let support = details(2, 3);
        assert_eq!(
            support.choose_extent((1920, 1080)),
            Extent2D {
                width: 800,
                height: 600
            }
        );
    }

    #[test]
    fn undefined_current_extent_clamps_the_drawable_size() {
        let mut support = details(2, 3);
        support.capabilities.current_extent = Extent2D {
            width: u32::MAX,
            height: u32::MAX,
        };
        support.capabilities.max_image_extent = Extent2D {
            width: 1024,
            height: 768,
        };
        assert_eq!(
            support.choose_extent((1920, 0)),
            Extent2D {
                width: 1024,
                height: 1
            }
        );
        assert_eq!(
            support.choose_extent((640, 480)),
            Extent2D {
                width: 640,
                height: 480
            }
        );
    }
}
