//! Static image export: SVG, plus PNG and JPG rasterized from the SVG.

use std::path::Path;

use resvg::tiny_skia;
use resvg::usvg;
use tracing::info;

use crate::error::FlowError;
use crate::graph::{FlowGraph, FlowNode, NodeKind, StateGroup};
use crate::positions::{Position, Positions};

// ===========================================================================
// Formats
// ===========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Svg,
    Png,
    Jpg,
}

impl ExportFormat {
    /// Format named by a file extension, case-insensitive.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "svg" => Some(ExportFormat::Svg),
            "png" => Some(ExportFormat::Png),
            "jpg" | "jpeg" => Some(ExportFormat::Jpg),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, FlowError> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| FlowError::UnsupportedFormat(path.to_path_buf()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportOptions {
    /// Pixels per SVG unit for raster formats.
    pub scale: f32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

// ===========================================================================
// SVG
// ===========================================================================

const MARGIN: f64 = 60.0;
const STATE_RADIUS: f64 = 24.0;
const EVENT_SIZE: f64 = 40.0;
const STATION_WIDTH: f64 = 56.0;
const STATION_HEIGHT: f64 = 22.0;

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Distance from a node's center to its outline, used to end edges there.
fn node_extent(node: &FlowNode) -> f64 {
    match node.kind {
        NodeKind::State { .. } => STATE_RADIUS,
        NodeKind::Event { .. } => EVENT_SIZE / 2.0,
        NodeKind::Station => STATION_HEIGHT / 2.0,
    }
}

fn render_node(svg: &mut String, node: &FlowNode, p: Position) {
    let label = escape_xml(&node.label);
    let (shape, text_fill) = match &node.kind {
        NodeKind::State { group, .. } => {
            let style = match group {
                StateGroup::Product | StateGroup::Component => r#"fill="black" stroke="black""#,
                StateGroup::Subassembly => {
                    r#"fill="lightgrey" stroke="darkgrey" stroke-dasharray="2,2""#
                }
            };
            let text = if *group == StateGroup::Subassembly { "black" } else { "white" };
            (
                format!(
                    r#"<circle cx="{:.1}" cy="{:.1}" r="{STATE_RADIUS}" {style}/>"#,
                    p.x, p.y
                ),
                text,
            )
        }
        NodeKind::Event { .. } => (
            format!(
                r#"<rect x="{:.1}" y="{:.1}" width="{EVENT_SIZE}" height="{EVENT_SIZE}" fill="white" stroke="black"/>"#,
                p.x - EVENT_SIZE / 2.0,
                p.y - EVENT_SIZE / 2.0
            ),
            "black",
        ),
        NodeKind::Station => (
            format!(
                r#"<rect x="{:.1}" y="{:.1}" width="{STATION_WIDTH}" height="{STATION_HEIGHT}" fill="white" stroke="black"/>"#,
                p.x - STATION_WIDTH / 2.0,
                p.y - STATION_HEIGHT / 2.0
            ),
            "black",
        ),
    };
    svg.push_str(&format!(
        "<g class=\"node\" id=\"node-{}\">{shape}<text x=\"{:.1}\" y=\"{:.1}\" fill=\"{text_fill}\">{label}</text></g>\n",
        escape_xml(&node.id),
        p.x,
        p.y
    ));
}

/// Render the graph at `positions` as a standalone SVG document. Nodes
/// without a position are left out together with their edges.
pub fn render_svg(graph: &FlowGraph, positions: &Positions) -> String {
    let placed: Vec<(&FlowNode, Position)> = graph
        .nodes()
        .iter()
        .filter_map(|n| positions.get(&n.id).map(|p| (n, *p)))
        .collect();
    let (min_x, min_y, max_x, max_y) = placed.iter().fold(
        (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        |(x0, y0, x1, y1), (_, p)| (x0.min(p.x), y0.min(p.y), x1.max(p.x), y1.max(p.y)),
    );
    let (min_x, min_y, max_x, max_y) = if placed.is_empty() {
        (0.0, 0.0, 0.0, 0.0)
    } else {
        (min_x, min_y, max_x, max_y)
    };
    let width = max_x - min_x + 2.0 * MARGIN;
    let height = max_y - min_y + 2.0 * MARGIN;
    let shift = |p: Position| Position::new(p.x - min_x + MARGIN, p.y - min_y + MARGIN);

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.0}\" height=\"{height:.0}\" viewBox=\"0 0 {width:.0} {height:.0}\" font-family=\"sans-serif\" font-size=\"14\" text-anchor=\"middle\" dominant-baseline=\"central\">\n"
    ));
    svg.push_str(
        "<defs><marker id=\"arrow\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"8\" markerHeight=\"8\" orient=\"auto\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"black\"/></marker></defs>\n",
    );
    svg.push_str(&format!(
        "<rect width=\"{width:.0}\" height=\"{height:.0}\" fill=\"white\"/>\n"
    ));

    for edge in graph.edges() {
        let (Some(source), Some(target)) = (graph.node(&edge.source), graph.node(&edge.target))
        else {
            continue;
        };
        let (Some(from), Some(to)) = (positions.get(&edge.source), positions.get(&edge.target))
        else {
            continue;
        };
        let (from, to) = (shift(*from), shift(*to));
        let (dx, dy) = (to.x - from.x, to.y - from.y);
        let length = dx.hypot(dy).max(f64::EPSILON);
        let (ux, uy) = (dx / length, dy / length);
        let (inset_from, inset_to) = (node_extent(source), node_extent(target));
        let start = Position::new(from.x + ux * inset_from, from.y + uy * inset_from);
        let end = Position::new(to.x - ux * inset_to, to.y - uy * inset_to);
        let marker = if edge.is_directed() { r#" marker-end="url(#arrow)""# } else { "" };
        svg.push_str(&format!(
            "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"black\" stroke-width=\"0.8\"{marker}/>\n",
            start.x, start.y, end.x, end.y
        ));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"12\" fill=\"black\" stroke=\"white\" stroke-width=\"3\" paint-order=\"stroke\">{}</text>\n",
            (start.x + end.x) / 2.0,
            (start.y + end.y) / 2.0,
            edge.count
        ));
    }

    for (node, p) in &placed {
        render_node(&mut svg, node, shift(*p));
    }
    svg.push_str("</svg>\n");
    svg
}

// ===========================================================================
// Raster
// ===========================================================================

/// Largest raster canvas, in pixels (8192 x 8192).
pub const MAX_CANVAS_PIXELS: u64 = 8192 * 8192;

/// Rasterize an SVG document onto a white canvas.
pub fn rasterize(svg: &str, scale: f32) -> Result<tiny_skia::Pixmap, FlowError> {
    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();
    let tree =
        usvg::Tree::from_str(svg, &options).map_err(|e| FlowError::SvgParse(e.to_string()))?;

    // Float to integer casts saturate, so huge or non-finite sizes stay ordered.
    let width = (f64::from(tree.size().width()) * f64::from(scale)).ceil() as u64;
    let height = (f64::from(tree.size().height()) * f64::from(scale)).ceil() as u64;
    if width.saturating_mul(height) > MAX_CANVAS_PIXELS {
        return Err(FlowError::CanvasTooLarge { width, height });
    }
    let (Ok(width), Ok(height)) = (u32::try_from(width), u32::try_from(height)) else {
        return Err(FlowError::CanvasTooLarge { width, height });
    };
    let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or(FlowError::EmptyCanvas)?;
    pixmap.fill(tiny_skia::Color::WHITE);
    resvg::render(&tree, tiny_skia::Transform::from_scale(scale, scale), &mut pixmap.as_mut());
    Ok(pixmap)
}

fn write_jpg(pixmap: &tiny_skia::Pixmap, path: &Path) -> Result<(), FlowError> {
    // The canvas is opaque, so premultiplied RGBA equals straight RGB.
    let rgb: Vec<u8> = pixmap
        .data()
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();
    image::save_buffer_with_format(
        path,
        &rgb,
        pixmap.width(),
        pixmap.height(),
        image::ExtendedColorType::Rgb8,
        image::ImageFormat::Jpeg,
    )
    .map_err(|e| FlowError::Encode {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}

/// Render the graph to `path`, choosing the format from its extension.
pub fn export_image(
    graph: &FlowGraph,
    positions: &Positions,
    path: &Path,
    options: &ExportOptions,
) -> Result<ExportFormat, FlowError> {
    let format = ExportFormat::from_path(path)?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| FlowError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let svg = render_svg(graph, positions);
    match format {
        ExportFormat::Svg => std::fs::write(path, svg).map_err(|source| FlowError::Io {
            path: path.to_path_buf(),
            source,
        })?,
        ExportFormat::Png => rasterize(&svg, options.scale)?
            .save_png(path)
            .map_err(|e| FlowError::Encode {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })?,
        ExportFormat::Jpg => write_jpg(&rasterize(&svg, options.scale)?, path)?,
    }
    info!(path = %path.display(), format = ?format, "Flow graph exported");
    Ok(format)
}
