mod command_pool;
mod config;
pub mod error;
pub mod frame;
pub mod graphics_pipeline;
mod instance;
pub mod logging;
mod logical_device;
mod renderer;
mod surface;
pub mod swapchain;
mod swapchain_support;
mod sync;
pub mod window;

pub use command_pool::{CommandPool, TriangleDraw};
pub use config::RendererConfig;
pub use error::RenderError;
pub use frame::{draw_frame, FrameCommands, FrameOutcome, FrameState, FrameSync};
pub use graphics_pipeline::GraphicsPipeline;
pub use instance::Instance;
pub use logical_device::{
    physical_device::{pick_first_suitable, pick_physical_device, AdapterReport},
    queue_families::{ImageSharing, QueueFamilyIndices},
    LogicalDevice, Queues,
};
pub use renderer::Renderer;
pub use surface::{Surface, SurfaceTarget};
pub use swapchain::Swapchain;
pub use swapchain_support::SwapchainSupportDetails;
pub use sync::{Fence, Semaphore};
