use bytemuck::{Pod, Zeroable};
use thiserror::Error;

use crate::math::sierpinski::MAX_BUILD_LEVEL;
use crate::scene::{CacheKey, MeshObject};

/// Line-list vertices emitted per face, the largest expansion of any pipeline.
pub const WIRE_VERTICES_PER_FACE: u64 = 6;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{label} needs {needed} bytes but the device allows {limit}")]
pub struct BufferTooLarge {
    pub label: &'static str,
    pub needed: u64,
    pub limit: u64,
}

/// Deepest level whose wireframe fits a single vertex buffer of
/// `max_buffer_size` bytes. A level `n` fractal has `4^n` faces.
pub fn max_renderable_level(max_buffer_size: u64) -> u32 {
    let per_face = WIRE_VERTICES_PER_FACE * std::mem::size_of::<GpuVertex>() as u64;
    (1..=MAX_BUILD_LEVEL)
        .take_while(|&level| per_face.saturating_mul(4u64.pow(level)) <= max_buffer_size)
        .last()
        .unwrap_or(0)
}

/// Deepest level the default device limits can draw.
pub fn default_max_renderable_level() -> u32 {
    max_renderable_level(wgpu::Limits::default().max_buffer_size)
}

/// Size to allocate for `needed` bytes: the next power of two, capped at
/// `limit`. `None` when `needed` itself is over the limit.
fn buffer_capacity(needed: u64, limit: u64) -> Option<u64> {
    (needed <= limit).then(|| needed.next_power_of_two().min(limit).max(needed))
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

pub fn gpu_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<GpuVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
        ],
    }
}

/// Three vertices per face, each carrying the face normal, for flat shading.
pub fn flat_triangles(object: &MeshObject) -> Vec<GpuVertex> {
    object
        .mesh
        .triangles()
        .zip(&object.face_normals)
        .flat_map(|(corners, normal)| {
            corners.map(|p| GpuVertex {
                position: p.to_array(),
                normal: normal.to_array(),
            })
        })
        .collect()
}

/// Two vertices per triangle edge, for line-list wireframe drawing.
pub fn wire_edges(object: &MeshObject) -> Vec<GpuVertex> {
    object
        .mesh
        .triangles()
        .zip(&object.face_normals)
        .flat_map(|([a, b, c], normal)| {
            [a, b, b, c, c, a].map(|p| GpuVertex {
                position: p.to_array(),
                normal: normal.to_array(),
            })
        })
        .collect()
}

/// A vertex buffer that grows to the largest upload and is reused otherwise.
struct GrowableBuffer {
    label: &'static str,
    buffer: wgpu::Buffer,
    capacity: u64,
    count: u32,
}

impl GrowableBuffer {
    fn new(device: &wgpu::Device, label: &'static str, capacity: u64) -> Self {
        Self {
            label,
            buffer: create_vertex_buffer(device, label, capacity),
            capacity,
            count: 0,
        }
    }

    fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        vertices: &[GpuVertex],
    ) -> Result<(), BufferTooLarge> {
        let bytes: &[u8] = bytemuck::cast_slice(vertices);
        let needed = bytes.len() as u64;
        let limit = device.limits().max_buffer_size;
        let too_large = BufferTooLarge {
            label: self.label,
            needed,
            limit,
        };

        let count = u32::try_from(vertices.len()).map_err(|_| too_large.clone())?;
        if needed > self.capacity {
            let capacity = buffer_capacity(needed, limit).ok_or(too_large)?;
            log::debug!("growing {} to {} bytes", self.label, capacity);
            self.buffer = create_vertex_buffer(device, self.label, capacity);
            self.capacity = capacity;
        }

        if !bytes.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytes);
        }
        self.count = count;
        Ok(())
    }
}

fn create_vertex_buffer(device: &wgpu::Device, label: &str, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// GPU copy of the fractal currently on screen.
pub struct FractalBuffers {
    fill: GrowableBuffer,
    wire: GrowableBuffer,
    uploaded: Option<CacheKey>,
}

const INITIAL_VERTICES: u64 = 4096;

impl FractalBuffers {
    pub fn new(device: &wgpu::Device) -> Self {
        let stride = std::mem::size_of::<GpuVertex>() as u64;
        Self {
            fill: GrowableBuffer::new(device, "Fractal Fill Buffer", INITIAL_VERTICES * stride),
            wire: GrowableBuffer::new(device, "Fractal Wire Buffer", INITIAL_VERTICES * 2 * stride),
            uploaded: None,
        }
    }

    /// Uploads `object` unless it is already resident. An object too large
    /// for the device is reported once and then drawn as nothing.
    pub fn sync(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        object: &MeshObject,
    ) -> Result<(), BufferTooLarge> {
        if self.uploaded == Some(object.key) {
            return Ok(());
        }
        self.uploaded = Some(object.key);

        let uploaded = self
            .fill
            .upload(device, queue, &flat_triangles(object))
            .and_then(|()| self.wire.upload(device, queue, &wire_edges(object)));
        if let Err(err) = uploaded {
            self.fill.count = 0;
            self.wire.count = 0;
            return Err(err);
        }

        log::debug!(
            "uploaded level {} fractal, side {} ({} fill, {} wire vertices)",
            object.key.level,
            object.key.side(),
            self.fill.count,
            self.wire.count
        );
        Ok(())
    }

    pub fn fill_buffer(&self) -> &wgpu::Buffer {
        &self.fill.buffer
    }

    pub fn fill_count(&self) -> u32 {
        self.fill.count
    }

    pub fn wire_buffer(&self) -> &wgpu::Buffer {
        &self.wire.buffer
    }

    pub fn wire_count(&self) -> u32 {
        self.wire.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{MeshCache, MeshSource};

    #[test]
    fn flat_triangles_expand_every_face() {
        let mut cache = MeshCache::default();
        let object = cache.get_or_build(2, 100.0).unwrap();
        let vertices = flat_triangles(&object);

        assert_eq!(vertices.len(), object.mesh.face_count() * 3);
        for (face, chunk) in vertices.chunks(3).enumerate() {
            let normal = object.face_normals[face].to_array();
            assert!(chunk.iter().all(|v| v.normal == normal));
        }
        let [a, _, _] = object.mesh.triangle(object.mesh.faces[0]);
        assert_eq!(vertices[0].position, a.to_array());
    }

    #[test]
    fn default_limits_cap_the_drawable_level() {
        let limit = 256 << 20;
        assert_eq!(max_renderable_level(limit), 10);
        assert_eq!(max_renderable_level(150_994_944), 10);
        assert_eq!(max_renderable_level(150_994_943), 9);
        assert_eq!(max_renderable_level(u64::MAX), MAX_BUILD_LEVEL);
        assert_eq!(max_renderable_level(0), 0);
    }

    #[test]
    fn level_eleven_wireframe_does_not_fit() {
        let limit = 256 << 20;
        let stride = std::mem::size_of::<GpuVertex>() as u64;
        let level_ten = WIRE_VERTICES_PER_FACE * stride * 4u64.pow(10);
        let level_eleven = level_ten * 4;

        assert_eq!(buffer_capacity(level_ten, limit), Some(limit));
        assert_eq!(buffer_capacity(level_eleven, limit), None);
    }

    #[test]
    fn capacity_grows_to_power_of_two_within_limit() {
        assert_eq!(buffer_capacity(1000, 4096), Some(1024));
        assert_eq!(buffer_capacity(3000, 3500), Some(3500));
        assert_eq!(buffer_capacity(3500, 3500), Some(3500));
        assert_eq!(buffer_capacity(3501, 3500), None);
    }

    #[test]
    fn wire_edges_close_each_triangle() {
        let mut cache = MeshCache::default();
        let object = cache.get_or_build(1, 100.0).unwrap();
        let lines = wire_edges(&object);

        assert_eq!(lines.len(), 4 * 6);
        assert_eq!(lines[0].position, lines[5].position);
        assert_eq!(lines[1].position, lines[2].position);
        assert_eq!(lines[3].position, lines[4].position);
    }
}
