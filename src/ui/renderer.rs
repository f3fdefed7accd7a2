//! Cube rendering system
//!
//! Projects the cube through the same `rotateX(x) rotateY(y)` transform the
//! CSS style describes and rasterises it with tiny-skia. Layout (projection,
//! culling, depth order, shading) is kept apart from drawing so it can be
//! tested without pixels.

use std::path::Path;

use ab_glyph::{point, Font, FontVec, PxScale, ScaleFont};
use tiny_skia::{
    Color, FillRule, LineJoin, Paint, PathBuilder, Pixmap, PremultipliedColorU8, Stroke, Transform,
};
use tracing::debug;

use crate::domain::core::Rect;
use crate::domain::orientation::Orientation;

/// Fonts tried, in order, by [`CubeRenderer::with_system_font`]
const SYSTEM_FONT_PATHS: &[&str] = &[
    "C:\\Windows\\Fonts\\segoeui.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
];

/// Share of the canvas' short side used by the cube's bounding square
const CUBE_FRACTION: f32 = 0.7;

/// Faces whose normal points at least this much toward the viewer get a label
const LABEL_FACING_THRESHOLD: f64 = 0.25;

/// Rendering errors
#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("Failed to create pixmap for rendering")]
    PixmapCreationFailed,

    #[error("Invalid canvas dimensions: {width}x{height}")]
    InvalidCanvasDimensions { width: i32, height: i32 },

    #[error("Font data could not be parsed")]
    InvalidFont,

    #[error("Failed to encode snapshot: {0}")]
    EncodeFailed(String),
}

/// The six cube faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    Front,
    Back,
    Right,
    Left,
    Top,
    Bottom,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::Front,
        Face::Back,
        Face::Right,
        Face::Left,
        Face::Top,
        Face::Bottom,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Face::Front => "Front",
            Face::Back => "Back",
            Face::Right => "Right",
            Face::Left => "Left",
            Face::Top => "Top",
            Face::Bottom => "Bottom",
        }
    }

    fn base_rgb(self) -> [u8; 3] {
        match self {
            Face::Front => [231, 76, 60],
            Face::Back => [52, 152, 219],
            Face::Right => [46, 204, 113],
            Face::Left => [241, 196, 15],
            Face::Top => [155, 89, 182],
            Face::Bottom => [230, 126, 34],
        }
    }

    /// Outward normal and two in-plane axes, CSS axes (y down, z toward viewer)
    fn frame(self) -> (Vec3, Vec3, Vec3) {
        let x = Vec3::new(1.0, 0.0, 0.0);
        let y = Vec3::new(0.0, 1.0, 0.0);
        let z = Vec3::new(0.0, 0.0, 1.0);
        match self {
            Face::Front => (z, x, y),
            Face::Back => (z.scale(-1.0), x, y),
            Face::Right => (x, z, y),
            Face::Left => (x.scale(-1.0), z, y),
            Face::Top => (y.scale(-1.0), x, z),
            Face::Bottom => (y, x, z),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Vec3 {
    x: f64,
    y: f64,
    z: f64,
}

impl Vec3 {
    fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    fn add(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    fn scale(self, factor: f64) -> Vec3 {
        Vec3::new(self.x * factor, self.y * factor, self.z * factor)
    }

    /// Applies `rotateX(x) rotateY(y)`: the Y rotation acts first
    fn rotate(self, orientation: Orientation) -> Vec3 {
        let (sin_y, cos_y) = orientation.y.to_radians().sin_cos();
        let (sin_x, cos_x) = orientation.x.to_radians().sin_cos();

        let x = self.x * cos_y + self.z * sin_y;
        let z = -self.x * sin_y + self.z * cos_y;

        let y = self.y * cos_x - z * sin_x;
        let z = self.y * sin_x + z * cos_x;

        Vec3::new(x, y, z)
    }
}

/// One visible face, already projected to canvas pixels
#[derive(Debug, Clone)]
pub struct ProjectedFace {
    pub face: Face,
    pub corners: [(f32, f32); 4],
    pub center: (f32, f32),
    /// Depth of the face center; larger is closer to the viewer
    pub depth: f64,
    /// How directly the face looks at the viewer, in (0, 1]
    pub facing: f64,
    pub color: Color,
}

/// Pre-calculated layout for one cube frame
#[derive(Debug, Clone)]
pub struct CubeLayout {
    /// Visible faces, farthest first
    pub faces: Vec<ProjectedFace>,
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub edge_width: f32,
    pub edge_color: Color,
    pub background: Color,
    pub label_size: f32,
}

impl CubeLayout {
    /// Square the cube occupies on the canvas; also the pointer hit area
    pub fn cube_bounds(canvas_rect: Rect) -> Rect {
        let side = (canvas_rect.w.min(canvas_rect.h) as f32 * CUBE_FRACTION) as i32;
        canvas_rect.centered_square(side)
    }

    /// Projects the cube for the given orientation
    pub fn from_orientation(orientation: Orientation, canvas_rect: Rect, dpi_scale: f32) -> Self {
        let bounds = Self::cube_bounds(canvas_rect);
        let side = bounds.w.max(1) as f64;
        let half = side * 0.3;
        let perspective = side * 2.5;
        let center = bounds.center();
        let (cx, cy) = (center.x as f64 - canvas_rect.x as f64, center.y as f64 - canvas_rect.y as f64);

        let project = |v: Vec3| -> (f32, f32) {
            let p = v.scale(half).rotate(orientation);
            let scale = perspective / (perspective - p.z);
            ((cx + p.x * scale) as f32, (cy + p.y * scale) as f32)
        };

        let mut faces: Vec<ProjectedFace> = Face::ALL
            .iter()
            .filter_map(|&face| {
                let (normal, u, v) = face.frame();
                let facing = normal.rotate(orientation).z;
                if facing <= 1e-6 {
                    return None;
                }

                let corners = [
                    project(normal.add(u).add(v)),
                    project(normal.add(u.scale(-1.0)).add(v)),
                    project(normal.add(u.scale(-1.0)).add(v.scale(-1.0))),
                    project(normal.add(u).add(v.scale(-1.0))),
                ];
                let depth = normal.scale(half).rotate(orientation).z;

                Some(ProjectedFace {
                    face,
                    corners,
                    center: project(normal),
                    depth,
                    facing,
                    color: shade(face.base_rgb(), facing),
                })
            })
            .collect();

        faces.sort_by(|a, b| a.depth.total_cmp(&b.depth));

        Self {
            faces,
            canvas_width: canvas_rect.w as f32,
            canvas_height: canvas_rect.h as f32,
            edge_width: (2.0 * dpi_scale).max(1.0),
            edge_color: Color::from_rgba8(255, 255, 255, 200),
            background: Color::from_rgba8(18, 20, 28, 255),
            label_size: ((side * 0.1) as f32).max(12.0 * dpi_scale),
        }
    }

    pub fn visible_faces(&self) -> impl Iterator<Item = Face> + '_ {
        self.faces.iter().map(|projected| projected.face)
    }
}

/// Darkens faces turned away from the viewer
fn shade(rgb: [u8; 3], facing: f64) -> Color {
    let factor = 0.45 + 0.55 * facing.clamp(0.0, 1.0);
    let channel = |value: u8| (value as f64 * factor).round().clamp(0.0, 255.0) as u8;
    Color::from_rgba8(channel(rgb[0]), channel(rgb[1]), channel(rgb[2]), 255)
}

/// Cube renderer using tiny-skia, with optional face labels
pub struct CubeRenderer {
    font: Option<FontVec>,
}

impl std::fmt::Debug for CubeRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CubeRenderer")
            .field("has_font", &self.font.is_some())
            .finish()
    }
}

impl CubeRenderer {
    /// Renderer without labels
    pub fn new() -> Self {
        Self { font: None }
    }

    /// Renderer labelling faces with the given TrueType/OpenType data
    pub fn with_font_data(data: Vec<u8>) -> Result<Self, RendererError> {
        let font = FontVec::try_from_vec(data).map_err(|_| RendererError::InvalidFont)?;
        Ok(Self { font: Some(font) })
    }

    /// Uses the first readable system font; labels are skipped if none is found
    pub fn with_system_font() -> Self {
        for path in SYSTEM_FONT_PATHS {
            let Ok(data) = std::fs::read(path) else {
                continue;
            };
            match Self::with_font_data(data) {
                Ok(renderer) => {
                    debug!(path = *path, "loaded label font");
                    return renderer;
                }
                Err(error) => debug!(path = *path, %error, "skipping font"),
            }
        }
        debug!("no label font found, faces will be unlabelled");
        Self::new()
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Render a cube layout to a pixmap
    pub fn render_layout(&self, layout: &CubeLayout) -> Result<Pixmap, RendererError> {
        if layout.canvas_width < 1.0 || layout.canvas_height < 1.0 {
            return Err(RendererError::InvalidCanvasDimensions {
                width: layout.canvas_width as i32,
                height: layout.canvas_height as i32,
            });
        }

        let mut pixmap = Pixmap::new(layout.canvas_width as u32, layout.canvas_height as u32)
            .ok_or(RendererError::PixmapCreationFailed)?;
        pixmap.fill(layout.background);

        for face in &layout.faces {
            self.render_face(&mut pixmap, face, layout);
        }

        if let Some(font) = &self.font {
            for face in layout.faces.iter().filter(|f| f.facing >= LABEL_FACING_THRESHOLD) {
                draw_text(
                    &mut pixmap,
                    font,
                    face.face.label(),
                    face.center,
                    layout.label_size * face.facing as f32,
                    Color::from_rgba8(255, 255, 255, 230),
                );
            }
        }

        Ok(pixmap)
    }

    fn render_face(&self, pixmap: &mut Pixmap, face: &ProjectedFace, layout: &CubeLayout) {
        let mut path_builder = PathBuilder::new();
        let [first, rest @ ..] = face.corners;
        path_builder.move_to(first.0, first.1);
        for (x, y) in rest {
            path_builder.line_to(x, y);
        }
        path_builder.close();

        let Some(path) = path_builder.finish() else {
            return;
        };

        let mut paint = Paint::default();
        paint.set_color(face.color);
        pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);

        paint.set_color(layout.edge_color);
        let stroke = Stroke {
            width: layout.edge_width,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    /// Pixel data as BGRA rows, the layout 32-bit Win32 DIBs expect
    pub fn pixmap_to_bgra(&self, pixmap: &Pixmap) -> Vec<u8> {
        pixmap
            .data()
            .chunks_exact(4)
            .flat_map(|px| [px[2], px[1], px[0], px[3]])
            .collect()
    }

    /// Writes the pixmap as a PNG file
    pub fn save_snapshot(&self, pixmap: &Pixmap, path: &Path) -> Result<(), RendererError> {
        pixmap
            .save_png(path)
            .map_err(|error| RendererError::EncodeFailed(error.to_string()))
    }
}

impl Default for CubeRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Draws `text` centered on `center`
fn draw_text(
    pixmap: &mut Pixmap,
    font: &FontVec,
    text: &str,
    center: (f32, f32),
    size: f32,
    color: Color,
) {
    let scaled = font.as_scaled(PxScale::from(size));
    let width: f32 = text.chars().map(|c| scaled.h_advance(scaled.glyph_id(c))).sum();
    let baseline = center.1 + (scaled.ascent() + scaled.descent()) / 2.0;
    let mut caret = point(center.0 - width / 2.0, baseline);

    for c in text.chars() {
        let mut glyph = scaled.scaled_glyph(c);
        glyph.position = caret;
        caret.x += scaled.h_advance(glyph.id);

        let Some(outlined) = font.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        outlined.draw(|gx, gy, coverage| {
            blend_pixel(
                pixmap,
                bounds.min.x as i32 + gx as i32,
                bounds.min.y as i32 + gy as i32,
                color,
                coverage,
            );
        });
    }
}

/// Source-over blend of `color` at `coverage` into one premultiplied pixel
fn blend_pixel(pixmap: &mut Pixmap, x: i32, y: i32, color: Color, coverage: f32) {
    if x < 0 || y < 0 || x >= pixmap.width() as i32 || y >= pixmap.height() as i32 {
        return;
    }
    let index = y as usize * pixmap.width() as usize + x as usize;
    let pixels = pixmap.pixels_mut();
    let dst = pixels[index];

    let alpha = coverage.clamp(0.0, 1.0) * color.alpha();
    let inv = 1.0 - alpha;
    let a = (alpha * 255.0 + dst.alpha() as f32 * inv).round();
    let channel = |src: f32, dst: u8| (src * alpha * 255.0 + dst as f32 * inv).round().min(a);

    let blended = PremultipliedColorU8::from_rgba(
        channel(color.red(), dst.red()) as u8,
        channel(color.green(), dst.green()) as u8,
        channel(color.blue(), dst.blue()) as u8,
        a as u8,
    );
    if let Some(px) = blended {
        pixels[index] = px;
    }
}
