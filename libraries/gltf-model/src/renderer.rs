use std::borrow::Cow;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};
use log::debug;

use crate::model::{Model, Vertex};

/// Per-object data, bound at group 1 with a dynamic offset.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
pub struct ObjectUniform {
    pub model: Mat4,
    /// inverse transpose of `model`, used to transform normals
    pub normal: Mat4,
    /// multiplied with the vertex color
    pub tint: Vec4,
}

impl ObjectUniform {
    #[must_use]
    pub fn new(model: Mat4, tint: Vec4) -> Self {
        Self {
            model,
            normal: model.inverse().transpose(),
            tint,
        }
    }
}

/// Everything needed to build the pipeline of a [`Renderer`].
pub struct RendererDescriptor<'desc> {
    pub label: &'desc str,
    pub shader_source: Cow<'desc, str>,
    pub fragment_entry_point: &'desc str,
    pub view_format: wgpu::TextureFormat,
    /// layout of bind group 0, shared by all pipelines of a frame (camera, lights, ...)
    pub frame_bind_group_layout: &'desc wgpu::BindGroupLayout,
    pub depth_stencil_state: wgpu::DepthStencilState,
    pub blend: Option<wgpu::BlendState>,
    pub cull_mode: Option<wgpu::Face>,
}

/// Draws [`Model`]s with one draw call per object.
///
/// Object uniforms live side by side in a single buffer and are selected with dynamic offsets,
/// so all of them can be written before the render pass starts.
pub struct Renderer {
    label: String,
    pipeline: wgpu::RenderPipeline,
    object_bind_group_layout: wgpu::BindGroupLayout,
    object_buf: wgpu::Buffer,
    object_bind_group: wgpu::BindGroup,
    stride: wgpu::BufferAddress,
    capacity: usize,
    staging: Vec<u8>,
}

impl Renderer {
    /// Creates a new [`Renderer`] with room for `capacity` objects per frame.
    #[must_use]
    pub fn new(device: &wgpu::Device, descriptor: RendererDescriptor<'_>, capacity: usize) -> Self {
        let object_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(descriptor.label),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: wgpu::BufferSize::new(size_of::<ObjectUniform>() as u64),
                    },
                    count: None,
                }],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(descriptor.label),
            bind_group_layouts: &[descriptor.frame_bind_group_layout, &object_bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(descriptor.label),
            source: wgpu::ShaderSource::Wgsl(descriptor.shader_source.clone()),
        });

        let pipeline = Self::create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            &[Vertex::buffer_layout()],
            &descriptor,
        );

        let alignment = u64::from(device.limits().min_uniform_buffer_offset_alignment);
        let stride = wgpu::util::align_to(size_of::<ObjectUniform>() as u64, alignment);
        let capacity = capacity.max(1);
        let (object_buf, object_bind_group) = Self::create_object_buffer(
            device,
            descriptor.label,
            &object_bind_group_layout,
            stride,
            capacity,
        );

        Self {
            label: descriptor.label.to_owned(),
            pipeline,
            object_bind_group_layout,
            object_buf,
            object_bind_group,
            stride,
            capacity,
            staging: Vec::new(),
        }
    }

    /// Uploads the object uniforms of this frame. Must be called before [`Self::draw`].
    ///
    /// The object buffer grows if there are more objects than anticipated.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        draws: &[(&Model, ObjectUniform)],
    ) {
        if draws.is_empty() {
            return;
        }
        if draws.len() > self.capacity {
            let capacity = draws.len().next_power_of_two();
            debug!(
                "{}: growing object buffer from {} to {capacity} objects",
                self.label, self.capacity
            );
            (self.object_buf, self.object_bind_group) = Self::create_object_buffer(
                device,
                &self.label,
                &self.object_bind_group_layout,
                self.stride,
                capacity,
            );
            self.capacity = capacity;
        }

        self.staging.clear();
        for (_, uniform) in draws {
            self.staging.extend_from_slice(bytemuck::bytes_of(uniform));
            // pad every slot to the dynamic offset alignment
            #[expect(
                clippy::cast_possible_truncation,
                reason = "the stride is a few hundred bytes"
            )]
            let slot_end = self.staging.len().next_multiple_of(self.stride as usize);
            self.staging.resize(slot_end, 0);
        }
        queue.write_buffer(&self.object_buf, 0, &self.staging);
    }

    /// Issues one draw call per object (and mesh) of the previously prepared `draws`.
    pub fn draw(
        &self,
        render_pass: &mut wgpu::RenderPass<'_>,
        frame_bind_group: &wgpu::BindGroup,
        draws: &[(&Model, ObjectUniform)],
    ) {
        render_pass.push_debug_group(&self.label);
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, frame_bind_group, &[]);

        for (slot, (model, _)) in (0..self.capacity).zip(draws) {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "offsets are bounded by the buffer size which fits into u32"
            )]
            let offset = (slot as u64 * self.stride) as u32;
            render_pass.set_bind_group(1, &self.object_bind_group, &[offset]);
            for mesh in model.meshes() {
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }
        render_pass.pop_debug_group();
    }

    fn create_object_buffer(
        device: &wgpu::Device,
        label: &str,
        layout: &wgpu::BindGroupLayout,
        stride: wgpu::BufferAddress,
        capacity: usize,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let object_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label} object uniform buffer")),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let object_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &object_buf,
                    offset: 0,
                    size: wgpu::BufferSize::new(size_of::<ObjectUniform>() as u64),
                }),
            }],
        });

        (object_buf, object_bind_group)
    }

    fn create_pipeline(
        device: &wgpu::Device,
        pipeline_layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        vertex_buffers: &[wgpu::VertexBufferLayout<'_>; 1],
        descriptor: &RendererDescriptor<'_>,
    ) -> wgpu::RenderPipeline {
        let vertex = wgpu::VertexState {
            module: shader,
            entry_point: "vs_main",
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            buffers: vertex_buffers,
        };

        let fragment_state = wgpu::FragmentState {
            module: shader,
            entry_point: descriptor.fragment_entry_point,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: descriptor.view_format,
                blend: descriptor.blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        };

        let primitive = wgpu::PrimitiveState {
            cull_mode: descriptor.cull_mode,
            ..Default::default()
        };

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(descriptor.label),
            layout: Some(pipeline_layout),
            vertex,
            fragment: Some(fragment_state),
            primitive,
            depth_stencil: Some(descriptor.depth_stencil_state.clone()),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }
}
