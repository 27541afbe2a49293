use crate::{
    config::WindowConfig,
    event::{ApplicationEvent, FrameworkEvent},
    render_surface::{RenderSurface, RenderSurfaceError},
    renderer::{self, RendererBuilder},
};
use log::{debug, error, info, trace, warn};
use std::sync::Arc;
use web_time::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{Key, NamedKey},
    window::{CursorGrabMode, Window, WindowAttributes, WindowId},
};

pub struct Application<Builder: RendererBuilder> {
    window_config: WindowConfig,
    /// consumed when the window gets created for the first time
    renderer_builder: Option<Builder>,
    render_surface: Option<RenderSurface<Builder::Renderer>>,
    /// the error that shut down the event loop, if any
    error: Option<RenderSurfaceError>,
    frame_counter: u32,
    frame_time: Instant,
}

impl<Builder: RendererBuilder> Application<Builder> {
    #[must_use]
    pub fn new(window_config: WindowConfig, renderer_builder: Builder) -> Self {
        Self {
            window_config,
            renderer_builder: Some(renderer_builder),
            render_surface: None,
            error: None,
            frame_counter: 0,
            frame_time: Instant::now(),
        }
    }

    /// Takes the error that made the event loop exit, so the caller can report it after `run_app`.
    pub fn take_error(&mut self) -> Option<RenderSurfaceError> {
        self.error.take()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: RenderSurfaceError) {
        error!("{error}");
        self.error = Some(error);
        event_loop.exit();
    }

    fn update_fps(&mut self) {
        self.frame_counter += 1;
        let span = self.frame_time.elapsed();
        if span >= Duration::from_secs(1) {
            #[expect(
                clippy::cast_precision_loss,
                reason = "frame counts per second are far below f32 precision"
            )]
            let fps = (self.frame_counter as f32 / span.as_secs_f32()).round();
            debug!("{fps} fps");
            self.frame_counter = 0;
            self.frame_time += span;
        }
    }

    fn create_window(
        &self,
        event_loop: &ActiveEventLoop,
    ) -> Result<Arc<Window>, RenderSurfaceError> {
        let config = &self.window_config;
        let attributes = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(LogicalSize::new(config.width, config.height))
            .with_resizable(config.resizable);

        let window = event_loop
            .create_window(attributes)
            .map(Arc::new)
            .map_err(RenderSurfaceError::CreateWindow)?;

        if config.capture_cursor {
            capture_cursor(&window);
        }
        Ok(window)
    }

    fn forward(&mut self, event: FrameworkEvent) {
        if let Some(render_surface) = self.render_surface.as_mut() {
            render_surface.process_event(&event);
        }
    }
}

/// Locks the cursor to the window, falling back to confining it where locking is unsupported.
fn capture_cursor(window: &Window) {
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
    if let Err(err) = grabbed {
        warn!("failed to capture the cursor: {err}");
    }
    window.set_cursor_visible(false);
}

impl<Builder: renderer::RendererBuilder> ApplicationHandler<ApplicationEvent>
    for Application<Builder>
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(render_surface) = self.render_surface.as_ref() {
            trace!("window event loop resumed");
            render_surface.window().request_redraw();
            return;
        }

        let Some(renderer_builder) = self.renderer_builder.take() else {
            return;
        };
        let window = match self.create_window(event_loop) {
            Ok(window) => window,
            Err(err) => return self.fail(event_loop, err),
        };

        match pollster::block_on(RenderSurface::new(Arc::clone(&window), renderer_builder)) {
            Ok(render_surface) => {
                window.request_redraw();
                self.render_surface = Some(render_surface);
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: ApplicationEvent) {
        match event {
            ApplicationEvent::Exit => {
                info!("Window event loop received an ExitEvent. Shutting down event loop.");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::Resized(size) => {
                trace!("WindowEvent::Resized({size:?})");
                if let Some(render_surface) = self.render_surface.as_mut() {
                    render_surface.resize(size);
                }
            }

            WindowEvent::CloseRequested => {
                trace!("WindowEvent::CloseRequested()");
                event_loop.exit();
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                trace!("Escape pressed");
                event_loop.exit();
            }

            WindowEvent::RedrawRequested => {
                // On MacOS, currently redraw requested comes in _before_ Init does.
                // If this happens, just drop the requested redraw on the floor.
                //
                // See https://github.com/rust-windowing/winit/issues/3235 for some discussion
                let Some(render_surface) = self.render_surface.as_mut() else {
                    return;
                };

                if let Err(err) = render_surface.redraw() {
                    return self.fail(event_loop, err);
                }
                self.update_fps();
            }

            event => self.forward(FrameworkEvent::Window { event }),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        match event {
            DeviceEvent::MouseMotion { .. } => {
                // these are super-noisy, so no tracing
                self.forward(FrameworkEvent::Device { event });
            }
            DeviceEvent::Added => {
                trace!("DeviceEvent::Added");
            }
            DeviceEvent::Removed => {
                trace!("DeviceEvent::Removed");
            }
            DeviceEvent::MouseWheel { .. }
            | DeviceEvent::Motion { .. }
            | DeviceEvent::Button { .. }
            | DeviceEvent::Key(_) => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        trace!("window event loop is exiting");
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        trace!("window event loop was suspended");
    }
}
