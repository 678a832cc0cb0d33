use anyhow::Result;
use hello_triangle::{logging, window, FrameOutcome, Renderer, RendererConfig};
use tracing::{error, info, trace};
use winit::{
    dpi::PhysicalSize,
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::{Window, WindowBuilder},
};

const WINDOW_WIDTH: u32 = 800;
const WINDOW_HEIGHT: u32 = 600;
const WINDOW_TITLE: &str = "Hello, Triangle";

fn main() -> Result<()> {
    logging::init()?;

    let event_loop = EventLoop::new()?;
    let main_window = init_window(&event_loop)?;

    let instance_extensions = window::required_extensions(&event_loop)?;
    let config = RendererConfig::default().with_instance_extensions(instance_extensions);
    let renderer = Renderer::new(config, &main_window)?;

    let app = App {
        renderer,
        _window: main_window,
    };
    app.run(event_loop)
}

/// Creates the window that will interact with the OS to draw the results on the screen
fn init_window(event_loop: &EventLoop<()>) -> Result<Window> {
    let window = WindowBuilder::new()
        .with_inner_size(PhysicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT))
        .with_title(WINDOW_TITLE)
        .with_active(true)
        .build(event_loop)?;
    Ok(window)
}

struct App {
    // dropped before the window it presents to
    renderer: Renderer,
    _window: Window,
}

impl App {
    fn run(mut self, event_loop: EventLoop<()>) -> Result<()> {
        let mut failure = None;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run(|event, elwt| match event {
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => {
                info!("Window closed, shutting down");
                elwt.exit();
            }
            Event::WindowEvent {
                event: WindowEvent::Resized(size),
                ..
            } => self.renderer.resize(size.width, size.height),
            Event::AboutToWait if failure.is_none() => match self.renderer.draw_frame() {
                Ok(FrameOutcome::Presented) => {}
                Ok(outcome) => trace!("Frame not presented: {:?}", outcome),
                Err(err) => {
                    failure = Some(err);
                    elwt.exit();
                }
            },
            Event::LoopExiting => {
                // wait for vulkan to finish up before exiting
                if let Err(err) = self.renderer.wait_idle() {
                    error!("Failed waiting for device: {}", err);
                }
            }
            _ => {}
        })?;

        match failure {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }
}
