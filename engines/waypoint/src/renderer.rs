mod plane;
mod skybox;

use std::{borrow::Cow, path::Path};

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};
use lib_gltf_model::{GltfModelRenderer, Model, ObjectUniform, RendererDescriptor};
use log::debug;
use plane::PlaneRenderer;
use skybox::SkyboxRenderer;
use waypoint_framework::{event::FrameworkEvent, renderer};
use wgpu::util::DeviceExt;

use crate::{
    config::SceneConfig,
    game_state::GameState,
    lighting::Lighting,
    render_state::RenderState,
    scene::{self, Hint},
};

/// Declarations shared by all shaders; WGSL has no includes, so it gets prepended.
pub(crate) const COMMON_SHADER: &str = include_str!("../shaders/common.wgsl");
const MODEL_SHADER: &str = include_str!("../shaders/model.wgsl");

const PLANE_COLOR: Vec4 = Vec4::new(0.6, 0.6, 0.6, 1.0);
const HALO_TINT: Vec4 = Vec4::new(1.0, 1.0, 1.0, 0.8);
const HINT_TINT: Vec4 = Vec4::new(1.0, 1.0, 1.0, 0.6);
const TARGET_HINT_TINT: Vec4 = Vec4::new(1.0, 0.8, 0.2, 0.9);

/// Everything the shaders need to know about the current frame, bound at group 0.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug)]
struct FrameUniform {
    view: Mat4,
    projection: Mat4,
    /// projection of the view without translation, for the sky
    sky_view_projection: Mat4,
    camera_position: Vec4,
    lighting: Lighting,
}

impl FrameUniform {
    fn new(state: &RenderState) -> Self {
        let projection = state.projection.matrix();
        Self {
            view: state.camera.matrix(),
            projection,
            sky_view_projection: projection * state.camera.rotation_matrix(),
            camera_position: state.camera.position.extend(1.0),
            lighting: state.lighting,
        }
    }
}

struct Models {
    marker: Model,
    avatar: Model,
    arrow: Model,
}

impl Models {
    fn load(device: &wgpu::Device, config: &SceneConfig) -> Self {
        Self {
            marker: load_model(device, &config.models.marker),
            avatar: load_model(device, &config.models.avatar),
            arrow: load_model(device, &config.models.arrow),
        }
    }
}

fn load_model(device: &wgpu::Device, path: &Path) -> Model {
    let model = Model::load_or_empty(path, device);
    debug!("model {} loaded (empty: {})", model.name(), model.is_empty());
    model
}

pub struct RendererBuilder {
    game_state: GameState,
    config: SceneConfig,
}

impl RendererBuilder {
    #[must_use]
    pub fn new(game_state: GameState, config: SceneConfig) -> Self {
        Self { game_state, config }
    }
}

impl renderer::RendererBuilder for RendererBuilder {
    type Renderer = Renderer;

    fn build(
        self,
        _adapter: &wgpu::Adapter,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface: &wgpu::SurfaceConfiguration,
    ) -> Renderer {
        let Self { game_state, config } = self;
        let view_format = surface.view_formats.first().copied().unwrap_or(surface.format);

        let state = RenderState::new(&config.camera, (surface.width, surface.height), &game_state);
        let depth_map = DepthTexture::create_depth_texture(device, surface, "depth_map");

        let frame_bind_group_layout = create_frame_bind_group_layout(device);
        let frame_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame Uniform Buffer"),
            contents: bytemuck::bytes_of(&FrameUniform::new(&state)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame"),
            layout: &frame_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buf.as_entire_binding(),
            }],
        });

        let plane_renderer = PlaneRenderer::new(device, view_format, &frame_bind_group_layout);
        let skybox_renderer =
            SkyboxRenderer::new(device, queue, view_format, &frame_bind_group_layout, &config.skybox);

        let shader_source: Cow<'_, str> =
            Cow::Owned([COMMON_SHADER, MODEL_SHADER].concat());
        let model_renderer = GltfModelRenderer::new(
            device,
            RendererDescriptor {
                label: "models",
                shader_source: shader_source.clone(),
                fragment_entry_point: "fs_main",
                view_format,
                frame_bind_group_layout: &frame_bind_group_layout,
                depth_stencil_state: DepthTexture::depth_stencil_state(),
                blend: None,
                cull_mode: None,
            },
            // every marker plus the avatar
            game_state.board().len() + 1,
        );
        let hint_renderer = GltfModelRenderer::new(
            device,
            RendererDescriptor {
                label: "hints",
                shader_source,
                fragment_entry_point: "fs_cutout",
                view_format,
                frame_bind_group_layout: &frame_bind_group_layout,
                depth_stencil_state: DepthTexture::depth_stencil_state(),
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                cull_mode: None,
            },
            // the halo plus one arrow per neighbour
            game_state
                .board()
                .waypoints()
                .iter()
                .map(|waypoint| waypoint.neighbour_count())
                .max()
                .unwrap_or_default()
                + 1,
        );

        let [red, green, blue] = config.clear_color;
        let clear_color = wgpu::Color {
            r: red,
            g: green,
            b: blue,
            a: 1.0,
        };

        Renderer {
            game_state,
            state,
            models: Models::load(device, &config),
            plane_transform: scene::plane_transform(config.plane_size),
            clear_color,
            depth_map,
            frame_buf,
            frame_bind_group,
            plane_renderer,
            model_renderer,
            skybox_renderer,
            hint_renderer,
        }
    }
}

fn create_frame_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("frame"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(size_of::<FrameUniform>() as u64),
            },
            count: None,
        }],
    })
}

pub struct Renderer {
    game_state: GameState,
    state: RenderState,
    models: Models,
    plane_transform: Mat4,
    clear_color: wgpu::Color,
    depth_map: DepthTexture,
    frame_buf: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    plane_renderer: PlaneRenderer,
    model_renderer: GltfModelRenderer,
    skybox_renderer: SkyboxRenderer,
    hint_renderer: GltfModelRenderer,
}

impl Renderer {
    /// Ground plane, markers and the avatar.
    fn render_opaque(
        &mut self,
        texture_view: &wgpu::TextureView,
        encoder: &mut wgpu::CommandEncoder,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) {
        self.plane_renderer
            .prepare(queue, self.plane_transform, PLANE_COLOR);

        let avatar = self.game_state.avatar();
        let draws = scene::marker_transforms(self.game_state.board())
            .map(|transform| (&self.models.marker, ObjectUniform::new(transform, Vec4::ONE)))
            .chain([(
                &self.models.avatar,
                ObjectUniform::new(scene::avatar_transform(avatar), Vec4::ONE),
            )])
            .collect::<Vec<_>>();
        self.model_renderer.prepare(device, queue, &draws);

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("opaque"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: texture_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(self.depth_map.attachment(wgpu::LoadOp::Clear(1.0))),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        self.plane_renderer
            .render(&mut render_pass, &self.frame_bind_group);
        self.model_renderer
            .draw(&mut render_pass, &self.frame_bind_group, &draws);
    }

    fn render_skybox(&self, texture_view: &wgpu::TextureView, encoder: &mut wgpu::CommandEncoder) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("skybox"),
            color_attachments: &[Some(load_attachment(texture_view))],
            depth_stencil_attachment: Some(self.depth_map.attachment(wgpu::LoadOp::Load)),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        self.skybox_renderer
            .render(&mut render_pass, &self.frame_bind_group);
    }

    /// The halo below the avatar and the arrows pointing to where it can go.
    fn render_hints(
        &mut self,
        texture_view: &wgpu::TextureView,
        encoder: &mut wgpu::CommandEncoder,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) {
        let halo = ObjectUniform::new(scene::halo_transform(self.game_state.avatar()), HALO_TINT);
        let arrows = scene::hints(&self.game_state).into_iter().map(
            |Hint {
                 transform,
                 highlighted,
             }| {
                let tint = if highlighted { TARGET_HINT_TINT } else { HINT_TINT };
                (&self.models.arrow, ObjectUniform::new(transform, tint))
            },
        );
        let draws = [(&self.models.marker, halo)]
            .into_iter()
            .chain(arrows)
            .collect::<Vec<_>>();
        self.hint_renderer.prepare(device, queue, &draws);

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("hints"),
            color_attachments: &[Some(load_attachment(texture_view))],
            depth_stencil_attachment: Some(self.depth_map.attachment(wgpu::LoadOp::Load)),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        self.hint_renderer
            .draw(&mut render_pass, &self.frame_bind_group, &draws);
    }
}

fn load_attachment(texture_view: &wgpu::TextureView) -> wgpu::RenderPassColorAttachment<'_> {
    wgpu::RenderPassColorAttachment {
        view: texture_view,
        resolve_target: None,
        ops: wgpu::Operations {
            load: wgpu::LoadOp::Load,
            store: wgpu::StoreOp::Store,
        },
    }
}

impl renderer::Renderer for Renderer {
    fn process_event(&mut self, event: &FrameworkEvent) {
        self.state.process_event(event);
    }

    fn update(&mut self) {
        self.state.update(&mut self.game_state);
    }

    fn resize(
        &mut self,
        device: &wgpu::Device,
        _queue: &wgpu::Queue,
        surface: &wgpu::SurfaceConfiguration,
    ) {
        self.state
            .projection
            .set_surface_dimensions((surface.width, surface.height));
        self.depth_map = DepthTexture::create_depth_texture(device, surface, "depth_map");
    }

    fn render(
        &mut self,
        texture_view: &wgpu::TextureView,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) {
        queue.write_buffer(
            &self.frame_buf,
            0,
            bytemuck::bytes_of(&FrameUniform::new(&self.state)),
        );

        let mut encoder =
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });

        self.render_opaque(texture_view, &mut encoder, device, queue);
        self.render_skybox(texture_view, &mut encoder);
        self.render_hints(texture_view, &mut encoder, device, queue);

        queue.submit(Some(encoder.finish()));
    }
}

pub(crate) struct DepthTexture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl DepthTexture {
    pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    pub(crate) fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        };
        let desc = wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        };
        let texture = device.create_texture(&desc);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            _texture: texture,
            view,
        }
    }

    fn attachment(&self, load: wgpu::LoadOp<f32>) -> wgpu::RenderPassDepthStencilAttachment<'_> {
        wgpu::RenderPassDepthStencilAttachment {
            view: &self.view,
            depth_ops: Some(wgpu::Operations {
                load,
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }
    }

    pub(crate) fn depth_stencil_state() -> wgpu::DepthStencilState {
        wgpu::DepthStencilState {
            format: DepthTexture::DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_uniform_matches_shader_layout() {
        // three mat4x4, one vec4 and the lights
        assert_eq!(
            size_of::<FrameUniform>(),
            3 * 64 + 16 + size_of::<Lighting>()
        );
        assert_eq!(size_of::<FrameUniform>() % 16, 0);
    }

    #[test]
    fn shaders_share_the_frame_declarations() {
        assert!(COMMON_SHADER.contains("var<uniform> frame: Frame"));
        for source in [
            MODEL_SHADER,
            include_str!("../shaders/plane.wgsl"),
            include_str!("../shaders/skybox.wgsl"),
        ] {
            assert!(
                !source.contains("struct Frame"),
                "frame declarations are only in the common shader"
            );
        }
        assert!(MODEL_SHADER.contains("fn vs_main"), "entry point of the model renderer");
        assert!(MODEL_SHADER.contains("fn fs_cutout"));
    }
}
