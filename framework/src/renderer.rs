use crate::event::FrameworkEvent;

/// Creates the [`Renderer`] once the GPU resources are available.
pub trait RendererBuilder {
    type Renderer: Renderer;

    fn build(
        self,
        adapter: &wgpu::Adapter,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface: &wgpu::SurfaceConfiguration,
    ) -> Self::Renderer;
}

/// Everything that happens during one frame, driven by the window's event loop.
///
/// Per frame, [`Renderer::update`] is called exactly once right before [`Renderer::render`].
/// All input events that arrived since the last frame have been passed to
/// [`Renderer::process_event`] by then.
pub trait Renderer {
    fn process_event(&mut self, event: &FrameworkEvent);

    fn update(&mut self);

    fn resize(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface: &wgpu::SurfaceConfiguration,
    );

    fn render(
        &mut self,
        texture_view: &wgpu::TextureView,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    );
}
