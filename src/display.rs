/*!
Interactive window (feature `display`).

A winit application that runs one console frame per redraw, copies the PPU
output into a `pixels` surface and feeds the gamepad from the keyboard:

| key          | button |
|--------------|--------|
| arrows       | d-pad  |
| Left Ctrl    | A      |
| Space        | B      |
| S            | Select |
| Enter        | Start  |

Escape or closing the window ends the loop; so does a fatal console error,
which is then returned from `run`.
*/

use std::sync::Arc;

use log::{info, warn};
use pixels::{Pixels, SurfaceTexture};
use thiserror::Error;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::bus::CpuCore;
use crate::console::{Console, ConsoleError};
use crate::controller::Button;
use crate::ppu::{NES_HEIGHT, NES_WIDTH};

const SCALE: f64 = 2.0;

#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("surface: {0}")]
    Pixels(#[from] pixels::Error),
    #[error("surface resize: {0}")]
    Resize(#[from] pixels::TextureError),
    #[error(transparent)]
    Console(#[from] ConsoleError),
}

fn button_for(code: KeyCode) -> Option<Button> {
    match code {
        KeyCode::ArrowUp => Some(Button::Up),
        KeyCode::ArrowDown => Some(Button::Down),
        KeyCode::ArrowLeft => Some(Button::Left),
        KeyCode::ArrowRight => Some(Button::Right),
        KeyCode::ControlLeft => Some(Button::A),
        KeyCode::Space => Some(Button::B),
        KeyCode::KeyS => Some(Button::Select),
        KeyCode::Enter => Some(Button::Start),
        _ => None,
    }
}

struct App<C: CpuCore> {
    console: Console<C>,
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    error: Option<DisplayError>,
}

impl<C: CpuCore> App<C> {
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: DisplayError) {
        warn!("display: {}", error);
        self.error = Some(error);
        event_loop.exit();
    }

    fn create_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<(), DisplayError> {
        let size = LogicalSize::new(NES_WIDTH as f64 * SCALE, NES_HEIGHT as f64 * SCALE);
        let attributes = Window::default_attributes()
            .with_title("nemu")
            .with_inner_size(size)
            .with_min_inner_size(LogicalSize::new(NES_WIDTH as f64, NES_HEIGHT as f64));
        let window = Arc::new(event_loop.create_window(attributes)?);

        let physical = window.inner_size();
        let surface = SurfaceTexture::new(physical.width, physical.height, window.clone());
        let pixels = Pixels::new(NES_WIDTH as u32, NES_HEIGHT as u32, surface)?;

        info!("display: window {}x{}", physical.width, physical.height);
        self.window = Some(window);
        self.pixels = Some(pixels);
        Ok(())
    }

    fn redraw(&mut self) -> Result<(), DisplayError> {
        self.console.run_frame()?;

        let Some(pixels) = self.pixels.as_mut() else {
            return Ok(());
        };
        let ppu = self.console.ppu();
        let ppu = ppu.borrow();
        let output = ppu.output();
        for (i, rgba) in pixels.frame_mut().chunks_exact_mut(4).enumerate() {
            let rgb = output.pixel(i % NES_WIDTH, i / NES_WIDTH);
            rgba.copy_from_slice(&[(rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8, 0xFF]);
        }
        pixels.render()?;
        Ok(())
    }
}

impl<C: CpuCore> ApplicationHandler for App<C> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.create_surface(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => {
                if code == KeyCode::Escape {
                    event_loop.exit();
                } else if let Some(button) = button_for(code) {
                    let pressed = state == ElementState::Pressed;
                    self.console.gamepad().borrow_mut().set_button(button, pressed);
                }
            }
            WindowEvent::Resized(size) => {
                if let Some(pixels) = self.pixels.as_mut() {
                    if let Err(e) = pixels.resize_surface(size.width, size.height) {
                        self.fail(event_loop, e.into());
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw() {
                    self.fail(event_loop, e);
                } else if self.console.stopped() {
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Open a window and run `console` until the window is closed.
pub fn run<C: CpuCore>(console: Console<C>) -> Result<(), DisplayError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        console,
        window: None,
        pixels: None,
        error: None,
    };
    event_loop.run_app(&mut app)?;

    match app.error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
