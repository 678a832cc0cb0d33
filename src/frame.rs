use ash::vk::{PipelineStageFlags, SubmitInfo};
use tracing::{debug, trace};

use crate::{
    command_pool::{CommandPool, TriangleDraw},
    error::{RenderError, VkContext},
    sync::{Fence, Semaphore},
    GraphicsPipeline, LogicalDevice, Swapchain,
};

/// Where a frame cycle is. Cycles always run in this order and end back at `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    Idle,
    Acquiring,
    Recording,
    Submitted,
    Presenting,
}

impl FrameState {
    pub fn next(self) -> Self {
        match self {
            FrameState::Idle => FrameState::Acquiring,
            FrameState::Acquiring => FrameState::Recording,
            FrameState::Recording => FrameState::Submitted,
            FrameState::Submitted => FrameState::Presenting,
            FrameState::Presenting => FrameState::Idle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquiredImage {
    Ready { index: u32, suboptimal: bool },
    /// The surface changed under the swapchain; nothing was acquired
    OutOfDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentStatus {
    Presented,
    Suboptimal,
    OutOfDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Presented,
    /// The swapchain must be rebuilt before it can present correctly again
    SwapchainOutOfDate,
    /// Nothing to draw into, e.g. the window is minimised
    Skipped,
}

/// The device operations one frame cycle is made of.
pub trait FrameCommands {
    /// Blocks until the previous submission has finished on the device.
    fn wait_for_previous_frame(&self) -> Result<(), RenderError>;

    /// Requests the next image, signaling the image-available semaphore when
    /// it is ready.
    fn acquire_next_image(&self) -> Result<AcquiredImage, RenderError>;

    /// Returns the in-flight fence to unsignaled so the next submission can signal it.
    fn reset_in_flight_fence(&self) -> Result<(), RenderError>;

    fn record(&self, image_index: u32) -> Result<(), RenderError>;

    /// Submits the recorded buffer, waiting on image-available and signaling
    /// render-finished and the in-flight fence.
    fn submit(&self) -> Result<(), RenderError>;

    fn present(&self, image_index: u32) -> Result<PresentStatus, RenderError>;
}

/// Runs one full frame cycle. At most one frame is in flight: the wait at the top
/// does not return until the previous cycle's submission has completed, so the
/// command buffer is never re-recorded while the device may still read it.
///
/// The fence is only reset once an image is in hand. If acquisition reports the
/// swapchain out of date the fence stays signaled and the next call cannot block
/// forever.
pub fn draw_frame(commands: &impl FrameCommands) -> Result<FrameOutcome, RenderError> {
    let mut state = FrameState::Idle;
    commands.wait_for_previous_frame()?;

    state = advance(state);
    let (image_index, acquired_suboptimal) = match commands.acquire_next_image()? {
        AcquiredImage::Ready { index, suboptimal } => (index, suboptimal),
        AcquiredImage::OutOfDate => {
            debug!("Swapchain out of date on acquire");
            return Ok(FrameOutcome::SwapchainOutOfDate);
        }
    };
    commands.reset_in_flight_fence()?;

    state = advance(state);
    commands.record(image_index)?;

    state = advance(state);
    commands.submit()?;

    state = advance(state);
    let present_status = commands.present(image_index)?;
    advance(state);

    match (present_status, acquired_suboptimal) {
        (PresentStatus::Presented, false) => Ok(FrameOutcome::Presented),
        (status, _) => {
            debug!("Swapchain needs rebuilding after present: {:?}", status);
            Ok(FrameOutcome::SwapchainOutOfDate)
        }
    }
}

fn advance(state: FrameState) -> FrameState {
    let next = state.next();
    trace!(from = ?state, to = ?next, "frame state");
    next
}

/// The per-frame synchronization objects. Created once and reused by every cycle.
pub struct FrameSync {
    /// Signaled when the acquired swapchain image can be rendered to
    pub image_available: Semaphore,
    /// Signaled when the frame's commands have finished executing
    pub render_finished: Semaphore,
    /// Signaled when the submission completes; starts signaled so the first
    /// frame does not wait
    pub in_flight: Fence,
}

impl FrameSync {
    pub fn new(device: &ash::Device) -> Result<Self, RenderError> {
        Ok(Self {
            image_available: Semaphore::new(device)?,
            render_finished: Semaphore::new(device)?,
            in_flight: Fence::new(device, true)?,
        })
    }
}

/// Borrows everything a frame cycle touches on the real device.
pub struct FrameContext<'a> {
    pub device: &'a LogicalDevice,
    pub swapchain: &'a Swapchain,
    pub pipeline: &'a GraphicsPipeline,
    pub command_pool: &'a CommandPool,
    pub sync: &'a FrameSync,
    pub clear_color: [f32; 4],
}

impl FrameCommands for FrameContext<'_> {
    fn wait_for_previous_frame(&self) -> Result<(), RenderError> {
        self.sync.in_flight.wait()
    }

    fn acquire_next_image(&self) -> Result<AcquiredImage, RenderError> {
        self.swapchain
            .acquire_next_image(*self.sync.image_available)
    }

    fn reset_in_flight_fence(&self) -> Result<(), RenderError> {
        self.sync.in_flight.reset()
    }

    fn record(&self, image_index: u32) -> Result<(), RenderError> {
        let framebuffer = self
            .swapchain
            .framebuffer(image_index)
            .ok_or(RenderError::InvalidImageIndex(image_index))?;
        self.command_pool.record_triangle(&TriangleDraw {
            render_pass: **self.swapchain.render_pass(),
            framebuffer: **framebuffer,
            pipeline: **self.pipeline,
            extent: self.swapchain.extent(),
            clear_color: self.clear_color,
        })
    }

    fn submit(&self) -> Result<(), RenderError> {
        let wait_semaphores = [*self.sync.image_available];
        // vertex work may start early, only color output waits for the image
        let wait_stages = [PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let command_buffers = [self.command_pool.command_buffer()];
        let signal_semaphores = [*self.sync.render_finished];
        let submit_info = [SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores)];
        unsafe {
            self.device.queue_submit(
                self.device.queues().graphics,
                &submit_info,
                *self.sync.in_flight,
            )
        }
        .vk_context("vkQueueSubmit")
    }

    fn present(&self, image_index: u32) -> Result<PresentStatus, RenderError> {
        self.swapchain.present(
            self.device.queues().present,
            image_index,
            *self.sync.render_finished,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::{
        cell::{Cell, RefCell},
        collections::VecDeque,
    };

    use ash::vk;

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Call {
        Wait,
        Acquire(u32),
        ResetFence,
        Record(u32),
        Submit,
        Present(u32),
    }

    /// Models a device with one queue: submitted work completes only when the
    /// CPU waits on the fence.
    struct FakeDevice {
        calls: RefCell<Vec<Call>>,
        image_count: u32,
        next_image: Cell<u32>,
        fence_signaled: Cell<bool>,
        submission_pending: Cell<bool>,
        acquire_overrides: RefCell<VecDeque<AcquiredImage>>,
        present_overrides: RefCell<VecDeque<PresentStatus>>,
        fail_record: Cell<bool>,
    }

    impl FakeDevice {
        fn new(image_count: u32) -> Self {
            Self {
                calls: RefCell::new(vec![]),
                image_count,
                next_image: Cell::new(0),
                fence_signaled: Cell::new(true),
                submission_pending: Cell::new(false),
                acquire_overrides: RefCell::new(VecDeque::new()),
                present_overrides: RefCell::new(VecDeque::new()),
                fail_record: Cell::new(false),
            }
        }

        fn take_calls(&self) -> Vec<Call> {
            self.calls.take()
        }
    }

    impl FrameCommands for FakeDevice {
        fn wait_for_previous_frame(&self) -> Result<(), RenderError> {
            if self.submission_pending.replace(false) {
                self.fence_signaled.set(true);
            }
            assert!(
                self.fence_signaled.get(),
                "waiting on a fence nothing will signal"
            );
            self.calls.borrow_mut().push(Call::Wait);
            Ok(())
        }

        fn acquire_next_image(&self) -> Result<AcquiredImage, RenderError> {
            if let Some(acquired) = self.acquire_overrides.borrow_mut().pop_front() {
                return Ok(acquired);
            }
            let index = self.next_image.get();
            self.next_image.set((index + 1) % self.image_count);
            self.calls.borrow_mut().push(Call::Acquire(index));
            Ok(AcquiredImage::Ready {
                index,
                suboptimal: false,
            })
        }

        fn reset_in_flight_fence(&self) -> Result<(), RenderError> {
            self.fence_signaled.set(false);
            self.calls.borrow_mut().push(Call::ResetFence);
            Ok(())
        }

        fn record(&self, image_index: u32) -> Result<(), RenderError> {
            assert!(
                !self.submission_pending.get(),
                "command buffer re-recorded while still pending"
            );
            if self.fail_record.get() {
                return Err(RenderError::Vulkan {
                    operation: "vkEndCommandBuffer",
                    result: vk::Result::ERROR_OUT_OF_DEVICE_MEMORY,
                });
            }
            self.calls.borrow_mut().push(Call::Record(image_index));
            Ok(())
        }

        fn submit(&self) -> Result<(), RenderError> {
            assert!(
                !self.fence_signaled.get(),
                "submitting with a fence that is already signaled"
            );
            self.submission_pending.set(true);
            self.calls.borrow_mut().push(Call::Submit);
            Ok(())
        }

        fn present(&self, image_index: u32) -> Result<PresentStatus, RenderError> {
            self.calls.borrow_mut().push(Call::Present(image_index));
            Ok(self
                .present_overrides
                .borrow_mut()
                .pop_front()
                .unwrap_or(PresentStatus::Presented))
        }
    }

    #[test]
    fn each_cycle_waits_acquires_records_submits_and_presents_in_order() {
        let device = FakeDevice::new(3);
        for frame in 0..5u32 {
            assert_eq!(draw_frame(&device).unwrap(), FrameOutcome::Presented);
            let index = frame % 3;
            assert_eq!(
                device.take_calls(),
                vec![
                    Call::Wait,
                    Call::Acquire(index),
                    Call::ResetFence,
                    Call::Record(index),
                    Call::Submit,
                    Call::Present(index),
                ]
            );
        }
    }

    #[test]
    fn single_image_chain_reuses_index_zero() {
        let device = FakeDevice::new(1);
        for _ in 0..3 {
            draw_frame(&device).unwrap();
            assert!(device.take_calls().contains(&Call::Record(0)));
        }
    }

    #[test]
    fn out_of_date_acquire_leaves_the_fence_signaled() {
        let device = FakeDevice::new(2);
        device
            .acquire_overrides
            .borrow_mut()
            .push_back(AcquiredImage::OutOfDate);

        assert_eq!(
            draw_frame(&device).unwrap(),
            FrameOutcome::SwapchainOutOfDate
        );
        assert_eq!(device.take_calls(), vec![Call::Wait]);
        assert!(device.fence_signaled.get());

        // the next cycle must not block
        assert_eq!(draw_frame(&device).unwrap(), FrameOutcome::Presented);
    }

    #[test]
    fn out_of_date_present_still_completes_the_submission() {
        let device = FakeDevice::new(2);
        device
            .present_overrides
            .borrow_mut()
            .push_back(PresentStatus::OutOfDate);

        assert_eq!(
            draw_frame(&device).unwrap(),
            FrameOutcome::SwapchainOutOfDate
        );
        assert!(device.take_calls().contains(&Call::Submit));
        assert_eq!(draw_frame(&device).unwrap(), FrameOutcome::Presented);
    }

    #[test]
    fn suboptimal_images_are_drawn_but_flag_a_rebuild() {
        let device = FakeDevice::new(2);
        device
            .acquire_overrides
            .borrow_mut()
            .push_back(AcquiredImage::Ready {
                index: 1,
                suboptimal: true,
            });

        assert_eq!(
            draw_frame(&device).unwrap(),
            FrameOutcome::SwapchainOutOfDate
        );
        let calls = device.take_calls();
        assert!(calls.contains(&Call::Record(1)));
        assert!(calls.contains(&Call::Present(1)));
    }

    #[test]
    fn recording_failure_is_fatal_and_nothing_is_submitted() {
        let device = FakeDevice::new(2);
        device.fail_record.set(true);

        let err = draw_frame(&device).unwrap_err();
        assert!(matches!(err, RenderError::Vulkan { .. }));
        assert!(!device.take_calls().contains(&Call::Submit));
    }

    #[test]
    fn frame_states_cycle_back_to_idle() {
        let mut state = FrameState::Idle;
        let mut visited = vec![state];
        for _ in 0..5 {
            state = state.next();
            visited.push(state);
        }
        assert_eq!(
            visited,
            vec![
                FrameState::Idle,
                FrameState::Acquiring,
                FrameState::Recording,
                FrameState::Submitted,
                FrameState::Presenting,
                FrameState::Idle,
            ]
        );
    }
}
