use crate::chord::Chord;
use crate::error::{Error, Result};
use crate::geometry::{Bezier, Point, to_degrees};
use crate::layout::CircularLayout;
use crate::theme::Theme;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const GRADIENT_ID: &str = "chordGradient";
/// Smallest path height kept after the rotation back onto the x axis.
const MIN_EXTENT: f32 = 0.5;

pub fn render_svg(layout: &CircularLayout, chords: &[Chord], theme: &Theme) -> String {
    let mut svg = String::new();
    let size = layout.canvas_size;

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{size}\" height=\"{size}\" viewBox=\"0 0 {size} {size}\">\n",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>\n",
        theme.background
    ));

    svg.push_str("<defs>\n");
    svg.push_str(&format!(
        "<linearGradient id=\"{GRADIENT_ID}\"><stop offset=\"0%\" stop-color=\"{}\"/><stop offset=\"100%\" stop-color=\"{}\"/></linearGradient>\n",
        theme.gradient_start, theme.gradient_end
    ));
    svg.push_str("</defs>\n");

    svg.push_str("<g id=\"chords\">\n");

    let stroke = format!(
        "stroke:url(#{GRADIENT_ID});stroke-width:{};stroke-opacity:{};stroke-linecap:butt;stroke-linejoin:round;fill:none",
        theme.stroke_width, theme.stroke_opacity
    );
    for chord in chords {
        svg.push_str(&chord_svg(chord, &stroke));
    }

    for (id, labeled) in &layout.positions {
        svg.push_str(&format!(
            "<text fill=\"{}\" font-family=\"{}\" font-size=\"{}em\" dy=\"0.25em\" transform=\"translate({:.2},{:.2}) rotate({:.2})\">{}</text>\n",
            theme.label_color,
            escape_xml(&theme.font_family),
            theme.font_size,
            labeled.point.x,
            labeled.point.y,
            to_degrees(labeled.angle),
            escape_xml(id)
        ));
    }

    svg.push_str("</g>\n</svg>\n");
    svg
}

/// The gradient runs along the x axis only. Each chord is drawn rotated back
/// onto that axis and the path's own transform turns it into place, so one
/// gradient serves every orientation.
fn chord_svg(chord: &Chord, stroke: &str) -> String {
    let angle = chord.curve.orientation();
    let canonical = with_min_extent(chord.curve.rotate(-angle));
    format!(
        "<path style=\"{stroke}\" transform=\"rotate({:.2})\" d=\"{}\"/>\n",
        to_degrees(angle),
        canonical.to_path_data()
    )
}

/// A gradient in `objectBoundingBox` units is not painted on a path whose
/// bounding box has no height, which is what a chord between opposite nodes
/// becomes once rotated onto the x axis. Such chords get their tangents
/// lifted by `MIN_EXTENT`.
fn with_min_extent(canonical: Bezier) -> Bezier {
    let ys = canonical.points().map(|point| point.y);
    let min = ys.iter().copied().fold(f32::INFINITY, f32::min);
    let max = ys.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if max - min >= MIN_EXTENT {
        return canonical;
    }
    let lift = Point::new(0.0, MIN_EXTENT);
    Bezier::new(
        canonical.begin(),
        canonical.begin_tangent() + lift,
        canonical.end_tangent() + lift,
        canonical.end(),
    )
}

/// Write `svg` to `output`.
///
/// A failed write removes whatever part of the file was already written.
pub fn write_output_svg(svg: &str, output: &Path) -> Result<()> {
    write_atomic(output, |writer| writer.write_all(svg.as_bytes()))
}

/// Create `path`, fill it through `write` and flush. On failure a regular
/// file left behind is removed; device files such as `/dev/full` are not.
pub(crate) fn write_atomic(
    path: &Path,
    write: impl FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
) -> Result<()> {
    let to_error = |err| Error::WriteOutput {
        path: path.to_path_buf(),
        source: err,
    };
    let file = File::create(path).map_err(to_error)?;
    let mut writer = BufWriter::new(file);
    let result = write(&mut writer).and_then(|()| writer.flush());
    drop(writer);
    if let Err(err) = result {
        if std::fs::metadata(path).is_ok_and(|meta| meta.is_file()) {
            let _ = std::fs::remove_file(path);
        }
        return Err(to_error(err));
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, size: f32) -> anyhow::Result<()> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    opt.default_size = usvg::Size::from_wh(size, size)
        .ok_or_else(|| anyhow::anyhow!("invalid canvas size {size}"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let pixel_size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(pixel_size.width(), pixel_size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    let png = pixmap.encode_png()?;
    write_atomic(output, |writer| writer.write_all(&png))?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
