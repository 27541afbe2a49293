use std::{borrow::Cow, path::Path};

use image::RgbaImage;
use log::{debug, error};
use wgpu::{util::DeviceExt, PipelineCompilationOptions, RenderPass, TextureFormat};

use crate::{
    config::SkyboxConfig,
    renderer::{DepthTexture, COMMON_SHADER},
};

/// Used for faces that fail to load.
const FALLBACK_COLOR: [u8; 4] = [90, 130, 200, 255];

const CUBE_VERTEX_COUNT: u32 = 36;

#[rustfmt::skip]
const CUBE_VERTICES: [[f32; 3]; CUBE_VERTEX_COUNT as usize] = [
    [-1.0,  1.0, -1.0], [-1.0, -1.0, -1.0], [ 1.0, -1.0, -1.0],
    [ 1.0, -1.0, -1.0], [ 1.0,  1.0, -1.0], [-1.0,  1.0, -1.0],

    [-1.0, -1.0,  1.0], [-1.0, -1.0, -1.0], [-1.0,  1.0, -1.0],
    [-1.0,  1.0, -1.0], [-1.0,  1.0,  1.0], [-1.0, -1.0,  1.0],

    [ 1.0, -1.0, -1.0], [ 1.0, -1.0,  1.0], [ 1.0,  1.0,  1.0],
    [ 1.0,  1.0,  1.0], [ 1.0,  1.0, -1.0], [ 1.0, -1.0, -1.0],

    [-1.0, -1.0,  1.0], [-1.0,  1.0,  1.0], [ 1.0,  1.0,  1.0],
    [ 1.0,  1.0,  1.0], [ 1.0, -1.0,  1.0], [-1.0, -1.0,  1.0],

    [-1.0,  1.0, -1.0], [ 1.0,  1.0, -1.0], [ 1.0,  1.0,  1.0],
    [ 1.0,  1.0,  1.0], [-1.0,  1.0,  1.0], [-1.0,  1.0, -1.0],

    [-1.0, -1.0, -1.0], [-1.0, -1.0,  1.0], [ 1.0, -1.0, -1.0],
    [ 1.0, -1.0, -1.0], [-1.0, -1.0,  1.0], [ 1.0, -1.0,  1.0],
];

/// Decoded RGBA pixels of the six cube faces, all of them `size` x `size`.
#[derive(Debug)]
pub(super) struct CubeFaces {
    size: u32,
    faces: Vec<RgbaImage>,
}

impl CubeFaces {
    /// Loads all faces; faces that are missing, unreadable or of a different size than the first
    /// square face are logged and replaced by a flat color.
    pub(super) fn load(paths: [&Path; 6]) -> Self {
        let loaded = paths.map(|path| match image::open(path) {
            Ok(image) => Some(image.into_rgba8()),
            Err(err) => {
                error!("cube map face failed to load at {}: {err}", path.display());
                None
            }
        });

        let size = loaded
            .iter()
            .flatten()
            .map(RgbaImage::width)
            .next()
            .unwrap_or(1);

        let faces = loaded
            .into_iter()
            .zip(paths)
            .map(|(face, path)| match face {
                Some(face) if face.width() == size && face.height() == size => face,
                Some(face) => {
                    error!(
                        "cube map face {} is {}x{}, expected {size}x{size}",
                        path.display(),
                        face.width(),
                        face.height()
                    );
                    RgbaImage::from_pixel(size, size, image::Rgba(FALLBACK_COLOR))
                }
                None => RgbaImage::from_pixel(size, size, image::Rgba(FALLBACK_COLOR)),
            })
            .collect();

        Self { size, faces }
    }
}

/// A cube map drawn behind everything else.
pub(super) struct SkyboxRenderer {
    pipeline: wgpu::RenderPipeline,
    vertex_buf: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl SkyboxRenderer {
    #[must_use]
    pub(super) fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view_format: TextureFormat,
        frame_bind_group_layout: &wgpu::BindGroupLayout,
        config: &SkyboxConfig,
    ) -> Self {
        let faces = CubeFaces::load(config.faces().map(|path| path.as_path()));
        debug!("skybox faces are {0}x{0} pixels", faces.size);
        let texture_view = Self::create_cube_texture(device, queue, &faces);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("skybox"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let bind_group_layout = Self::create_bind_group_layout(device);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("skybox"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let vertex_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Skybox Vertex Buffer"),
            contents: bytemuck::cast_slice(&CUBE_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("skybox"),
            bind_group_layouts: &[frame_bind_group_layout, &bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("skybox"),
            source: wgpu::ShaderSource::Wgsl(Cow::Owned(
                [COMMON_SHADER, include_str!("../../shaders/skybox.wgsl")].concat(),
            )),
        });

        let pipeline = Self::create_pipeline(device, &pipeline_layout, &shader, view_format);

        Self {
            pipeline,
            vertex_buf,
            bind_group,
        }
    }

    pub(super) fn render(&self, render_pass: &mut RenderPass<'_>, frame_bind_group: &wgpu::BindGroup) {
        render_pass.push_debug_group("skybox");
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, frame_bind_group, &[]);
        render_pass.set_bind_group(1, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buf.slice(..));
        render_pass.draw(0..CUBE_VERTEX_COUNT, 0..1);
        render_pass.pop_debug_group();
    }

    fn create_cube_texture(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        faces: &CubeFaces,
    ) -> wgpu::TextureView {
        let size = wgpu::Extent3d {
            width: faces.size,
            height: faces.size,
            depth_or_array_layers: 6,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("skybox"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (layer, face) in (0_u32..).zip(&faces.faces) {
            queue.write_texture(
                wgpu::ImageCopyTexture {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d {
                        x: 0,
                        y: 0,
                        z: layer,
                    },
                    aspect: wgpu::TextureAspect::All,
                },
                face.as_raw(),
                wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * faces.size),
                    rows_per_image: Some(faces.size),
                },
                wgpu::Extent3d {
                    depth_or_array_layers: 1,
                    ..size
                },
            );
        }

        texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("skybox"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        })
    }

    fn create_pipeline(
        device: &wgpu::Device,
        pipeline_layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        view_format: TextureFormat,
    ) -> wgpu::RenderPipeline {
        let vertex_buffers = [wgpu::VertexBufferLayout {
            array_stride: size_of::<[f32; 3]>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![0 => Float32x3],
        }];

        let vertex = wgpu::VertexState {
            module: shader,
            entry_point: "vs_skybox",
            compilation_options: PipelineCompilationOptions::default(),
            buffers: &vertex_buffers,
        };

        let fragment_state = wgpu::FragmentState {
            module: shader,
            entry_point: "fs_skybox",
            compilation_options: PipelineCompilationOptions::default(),
            targets: &[Some(view_format.into())],
        };

        // the sky lies exactly on the far plane, which is where the depth buffer gets cleared to
        let depth_stencil = wgpu::DepthStencilState {
            depth_write_enabled: false,
            depth_compare: wgpu::CompareFunction::LessEqual,
            ..DepthTexture::depth_stencil_state()
        };

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("skybox"),
            layout: Some(pipeline_layout),
            vertex,
            fragment: Some(fragment_state),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: Some(depth_stencil),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    fn create_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("skybox"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::Cube,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_faces_fall_back_to_flat_color() {
        let missing = Path::new("does/not/exist.png");
        let faces = CubeFaces::load([missing; 6]);
        assert_eq!(faces.size, 1);
        assert_eq!(faces.faces.len(), 6);
        assert!(faces
            .faces
            .iter()
            .all(|face| face.as_raw().as_slice() == FALLBACK_COLOR));
    }

    #[test]
    fn faces_share_the_size_of_the_first_loaded_face() {
        let dir = std::env::temp_dir().join(format!("engine-waypoint-skybox-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let good = dir.join("good.png");
        let odd = dir.join("odd.png");
        RgbaImage::from_pixel(4, 4, image::Rgba([1, 2, 3, 255]))
            .save(&good)
            .unwrap();
        RgbaImage::from_pixel(2, 4, image::Rgba([9, 9, 9, 255]))
            .save(&odd)
            .unwrap();
        let missing = dir.join("missing.png");

        let faces = CubeFaces::load(
            [&missing, &good, &odd, &good, &good, &good].map(|path| path.as_path()),
        );

        assert_eq!(faces.size, 4, "size of the first face that loaded");
        assert_eq!(faces.faces[0].get_pixel(3, 3).0, FALLBACK_COLOR, "missing face");
        assert_eq!(faces.faces[1].get_pixel(0, 0).0, [1, 2, 3, 255], "loaded face");
        assert_eq!(faces.faces[2].dimensions(), (4, 4), "odd face replaced");
        assert_eq!(faces.faces[2].get_pixel(0, 0).0, FALLBACK_COLOR);

        fs::remove_dir_all(&dir).unwrap();
    }
}
