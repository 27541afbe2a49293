use std::borrow::Cow;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};
use wgpu::{util::DeviceExt, PipelineCompilationOptions, Queue, RenderPass, TextureFormat};

use crate::renderer::{DepthTexture, COMMON_SHADER};

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug)]
struct PlaneUniform {
    model: Mat4,
    color: Vec4,
}

/// The ground plane, lit by the sun and the spot light above the avatar.
pub(super) struct PlaneRenderer {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    uniform_buf: wgpu::Buffer,
}

impl PlaneRenderer {
    #[must_use]
    pub(super) fn new(
        device: &wgpu::Device,
        view_format: TextureFormat,
        frame_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let bind_group_layout = Self::create_bind_group_layout(device);
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("plane"),
            bind_group_layouts: &[frame_bind_group_layout, &bind_group_layout],
            push_constant_ranges: &[],
        });

        let uniform_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Plane Uniform Buffer"),
            contents: bytemuck::bytes_of(&PlaneUniform::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buf.as_entire_binding(),
            }],
            label: Some("plane"),
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("plane"),
            source: wgpu::ShaderSource::Wgsl(Cow::Owned(
                [COMMON_SHADER, include_str!("../../shaders/plane.wgsl")].concat(),
            )),
        });

        let pipeline = Self::create_pipeline(device, &pipeline_layout, &shader, view_format);

        Self {
            pipeline,
            bind_group,
            uniform_buf,
        }
    }

    pub(super) fn prepare(&self, queue: &Queue, model: Mat4, color: Vec4) {
        let uniform = PlaneUniform { model, color };
        queue.write_buffer(&self.uniform_buf, 0, bytemuck::bytes_of(&uniform));
    }

    pub(super) fn render(&self, render_pass: &mut RenderPass<'_>, frame_bind_group: &wgpu::BindGroup) {
        render_pass.push_debug_group("plane");
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, frame_bind_group, &[]);
        render_pass.set_bind_group(1, &self.bind_group, &[]);
        render_pass.draw(0..4, 0..1);
        render_pass.pop_debug_group();
    }

    fn create_pipeline(
        device: &wgpu::Device,
        pipeline_layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        view_format: TextureFormat,
    ) -> wgpu::RenderPipeline {
        let vertex = wgpu::VertexState {
            module: shader,
            entry_point: "vs_plane",
            compilation_options: PipelineCompilationOptions::default(),
            buffers: &[],
        };

        let fragment_state = wgpu::FragmentState {
            module: shader,
            entry_point: "fs_plane",
            compilation_options: PipelineCompilationOptions::default(),
            targets: &[Some(view_format.into())],
        };

        // the plane is the only geometry with back faces culled
        let primitive = wgpu::PrimitiveState {
            cull_mode: Some(wgpu::Face::Back),
            topology: wgpu::PrimitiveTopology::TriangleStrip,
            ..Default::default()
        };

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("plane"),
            layout: Some(pipeline_layout),
            vertex,
            fragment: Some(fragment_state),
            primitive,
            depth_stencil: Some(DepthTexture::depth_stencil_state()),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    fn create_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("plane"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(size_of::<PlaneUniform>() as u64),
                },
                count: None,
            }],
        })
    }
}
