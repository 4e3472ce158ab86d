// mesh.rs — inverted UV sphere for equirectangular panoramas
//
// Triangles are wound counter-clockwise as seen from the centre, so with
// back-face culling only the interior is drawn.

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SphereVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl SphereVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SphereVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SphereMesh {
    pub vertices: Vec<SphereVertex>,
    pub indices: Vec<u32>,
}

/// `width_segments` run around longitude, `height_segments` from pole to pole.
///
/// u follows longitude (u = 0 at +X, growing toward +Z), v runs from the top
/// row of the image at +Y to the bottom row at -Y.
pub fn build_inverted_sphere(radius: f32, width_segments: u32, height_segments: u32) -> SphereMesh {
    let lat = height_segments.max(2) as usize;
    let lon = width_segments.max(3) as usize;

    let mut vertices = Vec::with_capacity((lat + 1) * (lon + 1));
    let mut indices = Vec::with_capacity(lat * lon * 6);

    for i in 0..=lat {
        let v = i as f32 / lat as f32;
        let theta = std::f32::consts::PI * v;
        let y = radius * theta.cos();
        let sin_t = theta.sin();

        for j in 0..=lon {
            let u = j as f32 / lon as f32;
            let phi = 2.0 * std::f32::consts::PI * u;

            vertices.push(SphereVertex {
                position: [radius * phi.cos() * sin_t, y, radius * phi.sin() * sin_t],
                uv: [u, v],
            });
        }
    }

    for i in 0..lat {
        for j in 0..lon {
            let a = (i * (lon + 1) + j) as u32;
            let b = a + (lon + 1) as u32;

            // skip the zero-area triangle at each pole
            if i != 0 {
                indices.extend_from_slice(&[a, b, a + 1]);
            }
            if i != lat - 1 {
                indices.extend_from_slice(&[b, b + 1, a + 1]);
            }
        }
    }

    SphereMesh { vertices, indices }
}
