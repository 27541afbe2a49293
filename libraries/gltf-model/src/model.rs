use std::{iter::ExactSizeIterator, mem::offset_of, path::Path};

use anyhow::{anyhow, bail, Context};
use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3, Vec4};
use gltf::{buffer, mesh::util::ReadTexCoords, Gltf};
use log::{debug, error};
use wgpu::util::DeviceExt;

pub(crate) struct Mesh {
    pub(crate) vertex_buffer: wgpu::Buffer,
    pub(crate) index_buffer: wgpu::Buffer,
    pub(crate) index_count: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Default, Debug, PartialEq)]
pub struct Vertex {
    // Geometric properties
    pub position: Vec4,
    // ---- 16 byte alignment
    pub normal: Vec4,
    // Material properties
    // ---- 16 byte alignment
    pub base_color_factor: Vec4,
    // ---- 16 byte alignment
    pub base_color_texture_coordinates: Vec2,
    pub _padding: Vec2,
}

impl Vertex {
    pub(crate) fn buffer_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x4,
                    offset: offset_of!(Vertex, position) as wgpu::BufferAddress,
                    shader_location: 0,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x4,
                    offset: offset_of!(Vertex, normal) as wgpu::BufferAddress,
                    shader_location: 1,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x4,
                    offset: offset_of!(Vertex, base_color_factor) as wgpu::BufferAddress,
                    shader_location: 2,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: offset_of!(Vertex, base_color_texture_coordinates)
                        as wgpu::BufferAddress,
                    shader_location: 3,
                },
            ],
        }
    }
}

/// CPU-side geometry of a single glTF primitive.
#[derive(Debug, Default)]
pub(crate) struct MeshData {
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) indices: Vec<u32>,
}

/// All primitives of a glTF file, uploaded to the GPU.
pub struct Model {
    name: String,
    meshes: Vec<Mesh>,
}

impl Model {
    /// Loads every mesh primitive of the glTF file at `model_path`.
    ///
    /// Node transforms are ignored; the model is expected to be modelled around its origin.
    ///
    /// # Errors
    ///
    /// Fails if the file or one of its external buffers cannot be read or parsed.
    pub fn load(model_path: &Path, device: &wgpu::Device) -> anyhow::Result<Self> {
        let meshes = load_mesh_data(model_path)?
            .iter()
            .map(|data| upload(device, model_path, data))
            .collect::<anyhow::Result<_>>()?;

        Ok(Self {
            name: model_path.display().to_string(),
            meshes,
        })
    }

    /// Like [`Self::load`], but logs the error and returns an empty model instead.
    #[must_use]
    pub fn load_or_empty(model_path: &Path, device: &wgpu::Device) -> Self {
        Self::load(model_path, device).unwrap_or_else(|err| {
            error!("failed to load model {}: {err:#}", model_path.display());
            Self::empty(model_path.display().to_string())
        })
    }

    /// A model without any geometry. Drawing it is a no-op.
    #[must_use]
    pub fn empty(name: String) -> Self {
        Self {
            name,
            meshes: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub(crate) fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }
}

fn upload(device: &wgpu::Device, model_path: &Path, data: &MeshData) -> anyhow::Result<Mesh> {
    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{model_path:?} Vertex Buffer")),
        contents: bytemuck::cast_slice(&data.vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });

    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{model_path:?} Index Buffer")),
        contents: bytemuck::cast_slice(&data.indices),
        usage: wgpu::BufferUsages::INDEX,
    });

    Ok(Mesh {
        vertex_buffer,
        index_buffer,
        index_count: data.indices.len().try_into()?,
    })
}

pub(crate) fn load_mesh_data(model_path: &Path) -> anyhow::Result<Vec<MeshData>> {
    let bytes =
        std::fs::read(model_path).with_context(|| format!("reading {}", model_path.display()))?;
    let gltf = Gltf::from_slice(&bytes)?;

    // Load buffers
    let mut buffer_data = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            buffer::Source::Bin => {
                let blob = gltf
                    .blob
                    .clone()
                    .ok_or_else(|| anyhow!("binary chunk referenced but missing"))?;
                buffer_data.push(blob);
            }
            buffer::Source::Uri(uri) => {
                if uri.starts_with("data:") {
                    bail!("embedded data URIs are not supported, use an external .bin file");
                }
                let path = model_path.with_file_name(uri);
                let bin =
                    std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
                buffer_data.push(bin);
            }
        }
    }

    let mut meshes = Vec::new();

    for mesh in gltf.meshes() {
        debug!(
            "{}: mesh {} with {} primitive(s)",
            model_path.display(),
            mesh.name().unwrap_or("<unnamed>"),
            mesh.primitives().len()
        );
        for primitive in mesh.primitives() {
            let reader =
                primitive.reader(|buffer| buffer_data.get(buffer.index()).map(Vec::as_slice));
            let base_color_factor =
                Vec4::from(primitive.material().pbr_metallic_roughness().base_color_factor());

            let mut positions = reader.read_positions();
            let mut normals = reader.read_normals();
            let mut tex_coords = reader.read_tex_coords(0).map(ReadTexCoords::into_f32);

            let vertex_count = [
                positions.as_ref().map(ExactSizeIterator::len),
                normals.as_ref().map(ExactSizeIterator::len),
                tex_coords.as_ref().map(ExactSizeIterator::len),
            ]
            .into_iter()
            .flatten()
            .max()
            .unwrap_or_default();

            let vertices = (0..vertex_count)
                .map(|_| {
                    let position = positions
                        .as_mut()
                        .and_then(Iterator::next)
                        .unwrap_or_default();
                    let normal = normals
                        .as_mut()
                        .and_then(Iterator::next)
                        .unwrap_or([0.0, 1.0, 0.0]);
                    let tex_coord = tex_coords
                        .as_mut()
                        .and_then(Iterator::next)
                        .unwrap_or_default();

                    Vertex {
                        position: (Vec3::from(position), 1.0).into(),
                        normal: (Vec3::from(normal), 0.0).into(),
                        base_color_factor,
                        base_color_texture_coordinates: tex_coord.into(),
                        _padding: Vec2::default(),
                    }
                })
                .collect::<Vec<_>>();

            let indices = match reader.read_indices() {
                Some(indices_raw) => indices_raw.into_u32().collect(),
                // non-indexed geometry: every vertex is used once in order
                None => (0..u32::try_from(vertices.len())?).collect(),
            };

            meshes.push(MeshData { vertices, indices });
        }
    }

    Ok(meshes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const TRIANGLE_GLTF: &str = r#"{
        "asset": { "version": "2.0" },
        "buffers": [ { "uri": "triangle.bin", "byteLength": 44 } ],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 6 }
        ],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
              "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
            { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }
        ],
        "materials": [
            { "pbrMetallicRoughness": { "baseColorFactor": [0.5, 0.25, 1.0, 1.0] } }
        ],
        "meshes": [
            { "name": "triangle",
              "primitives": [ { "attributes": { "POSITION": 0 }, "indices": 1, "material": 0 } ] }
        ]
    }"#;

    fn triangle_bin() -> Vec<u8> {
        let positions: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let indices: [u16; 4] = [0, 1, 2, 0];
        let mut bytes = bytemuck::cast_slice::<f32, u8>(&positions).to_vec();
        bytes.extend_from_slice(bytemuck::cast_slice(&indices));
        bytes
    }

    #[test]
    fn loads_external_buffer_and_material_color() {
        let dir = std::env::temp_dir().join(format!("lib-gltf-model-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("triangle.gltf"), TRIANGLE_GLTF).unwrap();
        fs::write(dir.join("triangle.bin"), triangle_bin()).unwrap();

        let meshes = load_mesh_data(&dir.join("triangle.gltf")).unwrap();

        assert_eq!(meshes.len(), 1, "one primitive");
        let mesh = &meshes[0];
        assert_eq!(mesh.indices, vec![0, 1, 2], "indices");
        assert_eq!(mesh.vertices.len(), 3, "vertices");
        assert_eq!(
            mesh.vertices[1].position,
            Vec4::new(1.0, 0.0, 0.0, 1.0),
            "second vertex"
        );
        assert_eq!(
            mesh.vertices[0].base_color_factor,
            Vec4::new(0.5, 0.25, 1.0, 1.0),
            "material color is copied into every vertex"
        );
        assert_eq!(
            mesh.vertices[2].normal,
            Vec4::new(0.0, 1.0, 0.0, 0.0),
            "missing normals point up"
        );

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = load_mesh_data(Path::new("does/not/exist.gltf"));
        assert!(result.is_err(), "expected an error");
    }
}
