use crate::{
    event::FrameworkEvent,
    renderer::{self, RendererBuilder},
};
use log::{debug, info, trace, warn};
use std::{
    fmt::{self, Display},
    sync::Arc,
};
use wgpu::PresentMode;
use winit::{dpi::PhysicalSize, window::Window};

/// Reasons why the GPU could not be set up for a window.
#[derive(Debug)]
pub enum RenderSurfaceError {
    CreateWindow(winit::error::OsError),
    CreateSurface(wgpu::CreateSurfaceError),
    NoAdapter,
    RequestDevice(wgpu::RequestDeviceError),
    UnsupportedSurface,
    /// The surface cannot provide any more frames.
    OutOfMemory,
}

impl Display for RenderSurfaceError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateWindow(error) => write!(formatter, "failed to create window: {error}"),
            Self::CreateSurface(error) => write!(formatter, "failed to create surface: {error}"),
            Self::NoAdapter => write!(formatter, "failed to find an appropriate adapter"),
            Self::RequestDevice(error) => write!(formatter, "failed to create device: {error}"),
            Self::UnsupportedSurface => write!(formatter, "surface isn't supported by the adapter"),
            Self::OutOfMemory => write!(formatter, "surface ran out of memory"),
        }
    }
}

impl std::error::Error for RenderSurfaceError {}

pub(crate) struct RenderSurface<Renderer: renderer::Renderer> {
    window: Arc<Window>,
    /// the specific surface of our main window where we want WGPU to draw all content
    surface: wgpu::Surface<'static>,
    /// the current configuration of the shown surface
    /// this may change over time (e.g. for resizing)
    config: wgpu::SurfaceConfiguration,
    /// the logical device used to render on the surface
    device: wgpu::Device,
    /// the the command queue where to schedule the workload
    queue: wgpu::Queue,
    renderer: Renderer,
}

impl<Renderer: renderer::Renderer> RenderSurface<Renderer> {
    /// Create a new render surface for the given window backed by properly set up wgpu-managed resources.
    pub(crate) async fn new(
        window: Arc<Window>,
        renderer_builder: impl RendererBuilder<Renderer = Renderer>,
    ) -> Result<Self, RenderSurfaceError> {
        info!("Creating new render surface");

        // caution: the window size can be (0, 0) as the resizing seems to occur later on some platforms
        let surface_size = window.inner_size();
        debug!("window size: {surface_size:?}");

        debug!("creating new wgpu instance");
        let instance_descriptor = wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            flags: wgpu::InstanceFlags::from_build_config(),
            dx12_shader_compiler: wgpu::Dx12Compiler::default(),
            gles_minor_version: wgpu::Gles3MinorVersion::Automatic,
        };
        let instance = wgpu::Instance::new(instance_descriptor);

        debug!("create wgpu surface for window");
        let surface = instance
            .create_surface(Arc::clone(&window))
            .map_err(RenderSurfaceError::CreateSurface)?;

        debug!("get an adapter responsible for drawing on the surface");
        let request_adapter_options = wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            force_fallback_adapter: false,
            compatible_surface: Some(&surface),
        };
        let adapter = instance
            .request_adapter(&request_adapter_options)
            .await
            .ok_or(RenderSurfaceError::NoAdapter)?;

        let adapter_info = adapter.get_info();
        info!("Using {} ({:?})", adapter_info.name, adapter_info.backend);

        // Make sure we use the texture resolution limits from the adapter, so we can support images the size of the swapchain.
        debug!("get a logical device with queue for the adapter");
        let required_limits =
            wgpu::Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits());
        let device_descriptor = wgpu::DeviceDescriptor {
            label: None,
            required_features: wgpu::Features::empty(),
            required_limits,
            memory_hints: wgpu::MemoryHints::MemoryUsage,
        };
        let (device, queue) = adapter
            .request_device(&device_descriptor, None)
            .await
            .map_err(RenderSurfaceError::RequestDevice)?;

        debug!("create the start configuration of the surface");
        let mut config = surface
            .get_default_config(
                &adapter,
                surface_size.width.max(1),
                surface_size.height.max(1),
            )
            .ok_or(RenderSurfaceError::UnsupportedSurface)?;
        config.present_mode = PresentMode::AutoVsync;
        // the renderers expect their view format to be listed explicitly
        config.view_formats.push(config.format);
        surface.configure(&device, &config);

        debug!("create renderer");
        let renderer = renderer_builder.build(&adapter, &device, &queue, &config);

        Ok(Self {
            window,
            surface,
            config,
            device,
            queue,
            renderer,
        })
    }

    pub(crate) fn window(&self) -> &Window {
        &self.window
    }

    pub(crate) fn process_event(&mut self, event: &FrameworkEvent) {
        self.renderer.process_event(event);
    }

    /// Resize the surface, making sure to not resize to zero.
    pub(crate) fn resize(&mut self, size: PhysicalSize<u32>) {
        debug!("Surface resize {size:?}");
        if size.width == 0 || size.height == 0 {
            trace!("surface would be empty");
            return;
        }

        self.config.width = size.width;
        self.config.height = size.height;
        debug!("setting changed surface configuration: {:?}", self.config);
        self.surface.configure(&self.device, &self.config);

        debug!("notify renderer about the change in size");
        self.renderer.resize(&self.device, &self.queue, &self.config);

        debug!("request redraw after resize");
        self.window.request_redraw();
    }

    pub(crate) fn redraw(&mut self) -> Result<(), RenderSurfaceError> {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(surface_texture) => surface_texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                debug!("surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                self.window.request_redraw();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("timed out waiting for the next frame");
                self.window.request_redraw();
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(RenderSurfaceError::OutOfMemory),
        };

        let texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor {
                format: Some(self.config.format),
                ..wgpu::TextureViewDescriptor::default()
            });

        // advance the simulation by one frame, then draw it
        self.renderer.update();
        self.renderer
            .render(&texture_view, &self.device, &self.queue);

        // make the newly drawn frame visible
        self.window.pre_present_notify();
        surface_texture.present();
        self.window.request_redraw();
        Ok(())
    }
}
