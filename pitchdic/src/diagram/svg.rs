//! Reference serializer of [`VectorDiagram`] to SVG markup.
//!
//! The output matches the markup long used by the flashcard templates, so
//! existing cards and stylesheets keep rendering the same way.
use std::fmt::Write;

use crate::diagram::{Glyph, Marker, MarkerStyle, Segment, VectorDiagram};

const BACKGROUND: &str = "#20242b";
const LABEL_FILL: &str = "#fff";
const LINE_STROKE: &str = "#00f";

/// Serializes a diagram to an `<svg>` element.
///
/// Labels come first, then segments, then markers so that markers are drawn
/// on top of the lines.
pub fn to_svg(diagram: &VectorDiagram) -> String {
    let layout = &diagram.layout;
    let mut svg = String::new();
    let _ = write!(
        svg,
        "<svg class=\"pitch\" width=\"{w}px\" height=\"{h}px\" viewBox=\"0 0 {w} {h}\" \
         style=\"background-color:{BACKGROUND}; border-radius:4px; padding:{p}px;\">",
        w = diagram.width,
        h = diagram.height,
        p = layout.padding,
    );
    for label in &diagram.labels {
        for glyph in &label.glyphs {
            write_glyph(&mut svg, glyph, layout.label_y);
        }
    }
    for segment in &diagram.segments {
        write_segment(&mut svg, segment);
    }
    for marker in &diagram.markers {
        write_marker(&mut svg, marker, layout.marker_radius);
    }
    svg.push_str("</svg>");
    svg
}

/// Serializes a diagram wrapped in a `<div>`.
pub fn to_html(diagram: &VectorDiagram) -> String {
    format!("<div>{}</div>", to_svg(diagram))
}

fn write_glyph(out: &mut String, glyph: &Glyph, y: f32) {
    let _ = write!(
        out,
        "<text x=\"{}\" y=\"{}\" style=\"font-size:{}px;font-family:sans-serif;fill:{LABEL_FILL};\">{}</text>",
        glyph.x, y, glyph.font_size, glyph.text,
    );
}

fn write_segment(out: &mut String, segment: &Segment) {
    let (dx, dy) = segment.delta();
    let _ = write!(
        out,
        "<path d=\"m {},{} {},{}\" style=\"fill:none;stroke:{LINE_STROKE};stroke-width:1.5;\" />",
        segment.from.0, segment.from.1, dx, dy,
    );
}

fn write_marker(out: &mut String, marker: &Marker, radius: i32) {
    let style = match marker.style {
        MarkerStyle::Filled => "fill:#000;",
        MarkerStyle::Open => "fill:#fff;stroke:#000;stroke-width:1.5;",
    };
    let _ = write!(
        out,
        "<circle r=\"{radius}\" cx=\"{}\" cy=\"{}\" style=\"{style}\" />",
        marker.x, marker.y,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::diagram::render;

    #[test]
    fn test_to_svg_hashi() {
        let svg = to_svg(&render("はし", "LHL"));
        let expected = concat!(
            "<svg class=\"pitch\" width=\"102px\" height=\"75px\" viewBox=\"0 0 102 75\" ",
            "style=\"background-color:#20242b; border-radius:4px; padding:12px;\">",
            "<text x=\"5\" y=\"67.5\" style=\"font-size:20px;font-family:sans-serif;fill:#fff;\">は</text>",
            "<text x=\"40\" y=\"67.5\" style=\"font-size:20px;font-family:sans-serif;fill:#fff;\">し</text>",
            "<path d=\"m 16,30 35,-25\" style=\"fill:none;stroke:#00f;stroke-width:1.5;\" />",
            "<path d=\"m 51,5 35,25\" style=\"fill:none;stroke:#00f;stroke-width:1.5;\" />",
            "<circle r=\"5\" cx=\"16\" cy=\"30\" style=\"fill:#000;\" />",
            "<circle r=\"5\" cx=\"51\" cy=\"5\" style=\"fill:#000;\" />",
            "<circle r=\"5\" cx=\"86\" cy=\"30\" style=\"fill:#fff;stroke:#000;stroke-width:1.5;\" />",
            "</svg>",
        );
        assert_eq!(svg, expected);
    }

    #[test]
    fn test_to_svg_digraph_and_flat() {
        let svg = to_svg(&render("ちゃ", "HH"));
        assert!(svg.contains(
            "<text x=\"0\" y=\"67.5\" style=\"font-size:20px;font-family:sans-serif;fill:#fff;\">ち</text>\
             <text x=\"17\" y=\"67.5\" style=\"font-size:14px;font-family:sans-serif;fill:#fff;\">ゃ</text>"
        ));
        assert!(svg.contains("<path d=\"m 16,5 35,0\""));
    }

    #[test]
    fn test_to_html() {
        let html = to_html(&render("", "L"));
        assert!(html.starts_with("<div><svg class=\"pitch\" width=\"32px\""));
        assert!(html.ends_with("</svg></div>"));
        assert_eq!(html.matches("<circle").count(), 1);
    }
}
