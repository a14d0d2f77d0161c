// src/gpu/quad.rs
//! The fixed full-screen quad and a software pass-through shader for it.
//!
//! The whole simulated screen is one textured rectangle. Backends without a
//! real GPU rasterize it with [`draw_strip`], which interpolates texture
//! coordinates across each triangle and samples the nearest texel.

use crate::color::Argb8888;
use crate::gpu::{PipelineDescriptor, PixelFormat};

pub const PASSTHROUGH_VERTEX: &str = "passthrough_vertex";
pub const PASSTHROUGH_FRAGMENT: &str = "passthrough_fragment";

/// Clip-space positions `(x, y, z, w)` of the four strip vertices.
pub const QUAD_POSITIONS: [f32; 16] = [
    -1.0, -1.0, 0.0, 1.0, //
    1.0, -1.0, 0.0, 1.0, //
    -1.0, 1.0, 0.0, 1.0, //
    1.0, 1.0, 0.0, 1.0,
];

/// Texture coordinates `(u, v)` matching [`QUAD_POSITIONS`]. Texture row 0
/// lands at the top of the screen.
pub const QUAD_TEX_COORDS: [f32; 8] = [
    0.0, 1.0, //
    1.0, 1.0, //
    0.0, 0.0, //
    1.0, 0.0,
];

pub const QUAD_VERTEX_COUNT: usize = 4;

pub fn passthrough_pipeline(color_format: PixelFormat) -> PipelineDescriptor {
    PipelineDescriptor {
        label: "RenderPipeline",
        vertex_function: PASSTHROUGH_VERTEX,
        fragment_function: PASSTHROUGH_FRAGMENT,
        color_format,
    }
}

/// Render target for the software path.
pub struct Surface<'a> {
    pub pixels: &'a mut [Argb8888],
    pub width: usize,
    pub height: usize,
}

/// Texture being sampled by the software path.
pub struct TextureView<'a> {
    pub pixels: &'a [Argb8888],
    pub width: usize,
    pub height: usize,
}

#[derive(Clone, Copy)]
struct Vertex {
    x: f32,
    y: f32,
    u: f32,
    v: f32,
}

fn edge(a: &Vertex, b: &Vertex, px: f32, py: f32) -> f32 {
    (b.x - a.x) * (py - a.y) - (b.y - a.y) * (px - a.x)
}

fn vertex(target: &Surface<'_>, positions: &[f32], tex_coords: &[f32], index: usize) -> Option<Vertex> {
    let p = positions.get(index * 4..index * 4 + 4)?;
    let t = tex_coords.get(index * 2..index * 2 + 2)?;
    let w = if p[3] == 0.0 { 1.0 } else { p[3] };
    Some(Vertex {
        x: (p[0] / w + 1.0) * 0.5 * target.width as f32,
        y: (1.0 - p[1] / w) * 0.5 * target.height as f32,
        u: t[0],
        v: t[1],
    })
}

/// Rasterizes a triangle strip of `vertex_count` vertices starting at
/// `vertex_start`, sampling `texture` with nearest filtering.
pub fn draw_strip(
    target: &mut Surface<'_>,
    positions: &[f32],
    tex_coords: &[f32],
    vertex_start: usize,
    vertex_count: usize,
    texture: &TextureView<'_>,
) {
    if texture.width == 0 || texture.height == 0 || texture.pixels.len() < texture.width * texture.height {
        return;
    }
    if target.pixels.len() < target.width * target.height {
        return;
    }
    for i in 0..vertex_count.saturating_sub(2) {
        let first = vertex_start + i;
        let tri = (
            vertex(target, positions, tex_coords, first),
            vertex(target, positions, tex_coords, first + 1),
            vertex(target, positions, tex_coords, first + 2),
        );
        if let (Some(a), Some(b), Some(c)) = tri {
            draw_triangle(target, [a, b, c], texture);
        }
    }
}

fn draw_triangle(target: &mut Surface<'_>, [a, b, c]: [Vertex; 3], texture: &TextureView<'_>) {
    let area = edge(&a, &b, c.x, c.y);
    if area == 0.0 {
        return;
    }

    let min_x = a.x.min(b.x).min(c.x).floor().max(0.0) as usize;
    let min_y = a.y.min(b.y).min(c.y).floor().max(0.0) as usize;
    let max_x = (a.x.max(b.x).max(c.x).ceil() as usize).min(target.width);
    let max_y = (a.y.max(b.y).max(c.y).ceil() as usize).min(target.height);

    for py in min_y..max_y {
        for px in min_x..max_x {
            let (cx, cy) = (px as f32 + 0.5, py as f32 + 0.5);
            let w0 = edge(&b, &c, cx, cy) / area;
            let w1 = edge(&c, &a, cx, cy) / area;
            let w2 = edge(&a, &b, cx, cy) / area;
            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }
            let u = w0 * a.u + w1 * b.u + w2 * c.u;
            let v = w0 * a.v + w1 * b.v + w2 * c.v;
            let tx = ((u * texture.width as f32) as usize).min(texture.width - 1);
            let ty = ((v * texture.height as f32) as usize).min(texture.height - 1);
            target.pixels[py * target.width + px] = texture.pixels[ty * texture.width + tx];
        }
    }
}
