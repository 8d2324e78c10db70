//! Geometry of pitch-accent diagrams.
pub mod svg;

use crate::mora::{segment, Mora};
use crate::pattern::{align, PitchClass, PitchLevel};

/// Fixed measurements of a diagram.
///
/// Accent diagrams are binary: every marker sits on one of two levels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Layout {
    /// Horizontal distance between consecutive positions.
    pub step_width: i32,
    /// Horizontal margin on both sides of the first and last position.
    pub margin: i32,
    /// Y coordinate of high markers.
    pub high_y: i32,
    /// Y coordinate of low markers.
    pub low_y: i32,
    /// Height of the canvas.
    pub height: i32,
    /// Baseline of the mora labels.
    pub label_y: f32,
    /// Offset from a position center to the start of its label.
    pub label_offset: i32,
    /// Radius of the markers.
    pub marker_radius: i32,
    /// Padding of the background panel.
    pub padding: i32,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            step_width: 35,
            margin: 16,
            high_y: 5,
            low_y: 30,
            height: 75,
            label_y: 67.5,
            label_offset: 11,
            marker_radius: 5,
            padding: 12,
        }
    }
}

impl Layout {
    /// Gets the x coordinate of the center of a position.
    #[inline(always)]
    pub const fn center_x(&self, pos: usize) -> i32 {
        self.margin + pos as i32 * self.step_width
    }

    /// Gets the y coordinate of a pitch level.
    #[inline(always)]
    pub const fn level_y(&self, level: PitchLevel) -> i32 {
        match level {
            PitchLevel::High => self.high_y,
            PitchLevel::Low => self.low_y,
        }
    }

    /// Gets the canvas width needed for `positions` markers.
    #[inline(always)]
    pub fn width(&self, positions: usize) -> i32 {
        0.max((positions as i32 - 1) * self.step_width + self.margin * 2)
    }
}

/// A run of text drawn at one x coordinate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Glyph {
    /// The text of the run.
    pub text: String,
    /// Start x coordinate.
    pub x: i32,
    /// Font size in pixels.
    pub font_size: u32,
}

/// Label of a mora.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Label {
    /// The mora.
    pub mora: Mora,
    /// Start x coordinate of the label.
    pub x: i32,
    /// Runs making up the label.
    pub glyphs: Vec<Glyph>,
}

/// Fill style of a marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerStyle {
    /// A mora position.
    Filled,
    /// The position after the last mora.
    Open,
}

/// A circle marking the pitch of one position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Marker {
    /// Center x coordinate.
    pub x: i32,
    /// Center y coordinate.
    pub y: i32,
    /// Pitch class at this position.
    pub class: PitchClass,
    /// Fill style.
    pub style: MarkerStyle,
}

/// Direction of a segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentKind {
    /// Same level.
    Flat,
    /// From low to high.
    Rising,
    /// From high to low.
    Falling,
}

/// A line joining two consecutive markers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    /// Start point.
    pub from: (i32, i32),
    /// End point.
    pub to: (i32, i32),
    /// Direction.
    pub kind: SegmentKind,
}

impl Segment {
    /// Gets the relative movement from the start to the end point.
    #[inline(always)]
    pub const fn delta(&self) -> (i32, i32) {
        (self.to.0 - self.from.0, self.to.1 - self.from.1)
    }
}

/// Structured description of a pitch-accent diagram.
#[derive(Clone, Debug, PartialEq)]
pub struct VectorDiagram {
    /// Canvas width.
    pub width: i32,
    /// Canvas height.
    pub height: i32,
    /// Labels, one per mora.
    pub labels: Vec<Label>,
    /// Markers, one per position (mora count + 1).
    pub markers: Vec<Marker>,
    /// Segments between consecutive markers.
    pub segments: Vec<Segment>,
    /// Measurements used to lay out the diagram.
    pub layout: Layout,
}

/// Lays out a diagram with the default [`Layout`].
pub fn compose(mora: &[Mora], classes: &[PitchClass]) -> VectorDiagram {
    compose_with_layout(mora, classes, Layout::default())
}

/// Lays out a diagram.
///
/// One marker is produced per pitch class; markers at positions past the last
/// mora are drawn open. An empty `mora` still yields a valid diagram holding
/// the trailing marker alone.
pub fn compose_with_layout(mora: &[Mora], classes: &[PitchClass], layout: Layout) -> VectorDiagram {
    let labels = mora
        .iter()
        .enumerate()
        .map(|(pos, m)| label(m, layout.center_x(pos) - layout.label_offset))
        .collect();

    let markers: Vec<Marker> = classes
        .iter()
        .enumerate()
        .map(|(pos, &class)| Marker {
            x: layout.center_x(pos),
            y: layout.level_y(class.level),
            class,
            style: if pos >= mora.len() {
                MarkerStyle::Open
            } else {
                MarkerStyle::Filled
            },
        })
        .collect();

    let segments = markers
        .windows(2)
        .map(|pair| {
            let (prev, cur) = (&pair[0], &pair[1]);
            let kind = match prev.y.cmp(&cur.y) {
                std::cmp::Ordering::Equal => SegmentKind::Flat,
                std::cmp::Ordering::Less => SegmentKind::Falling,
                std::cmp::Ordering::Greater => SegmentKind::Rising,
            };
            Segment {
                from: (prev.x, prev.y),
                to: (cur.x, cur.y),
                kind,
            }
        })
        .collect();

    VectorDiagram {
        width: layout.width(markers.len()),
        height: layout.height,
        labels,
        markers,
        segments,
        layout,
    }
}

fn label(mora: &Mora, x: i32) -> Label {
    let mut chars = mora.chars();
    let glyphs = match (chars.next(), chars.next()) {
        (Some(base), Some(small)) => vec![
            Glyph { text: base.to_string(), x: x - 5, font_size: 20 },
            Glyph { text: small.to_string(), x: x + 12, font_size: 14 },
        ],
        _ => vec![Glyph { text: mora.to_string(), x, font_size: 20 }],
    };
    Label {
        mora: mora.clone(),
        x,
        glyphs,
    }
}

/// Segments `reading`, aligns `pattern` to it and lays out the diagram.
///
/// # Examples
///
/// ```
/// use pitchdic::diagram::{render, MarkerStyle, SegmentKind};
///
/// let diagram = render("はし", "LHL");
/// assert_eq!(diagram.labels.len(), 2);
/// assert_eq!(diagram.markers.len(), 3);
/// assert_eq!(diagram.markers[2].style, MarkerStyle::Open);
/// assert_eq!(diagram.segments[0].kind, SegmentKind::Rising);
/// ```
pub fn render(reading: &str, pattern: &str) -> VectorDiagram {
    let mora = segment(reading);
    let classes = align(pattern, &mora);
    compose(&mora, &classes)
}

/// Renders a diagram straight to SVG markup.
pub fn render_svg(reading: &str, pattern: &str) -> String {
    svg::to_svg(&render(reading, pattern))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_hashi() {
        let mora = segment("はし");
        let classes = [PitchClass::LOW, PitchClass::HIGH, PitchClass::LOW];
        let diagram = compose(&mora, &classes);

        let ys: Vec<_> = diagram.markers.iter().map(|m| m.y).collect();
        assert_eq!(ys, [30, 5, 30]);
        let kinds: Vec<_> = diagram.segments.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, [SegmentKind::Rising, SegmentKind::Falling]);
        assert_eq!(diagram.markers[0].style, MarkerStyle::Filled);
        assert_eq!(diagram.markers[1].style, MarkerStyle::Filled);
        assert_eq!(diagram.markers[2].style, MarkerStyle::Open);
        assert_eq!(diagram.width, 102);
        assert_eq!(diagram.height, 75);
    }

    #[test]
    fn test_compose_positions() {
        let diagram = render("さくら", "LHHH");
        let xs: Vec<_> = diagram.markers.iter().map(|m| m.x).collect();
        assert_eq!(xs, [16, 51, 86, 121]);
        let label_xs: Vec<_> = diagram.labels.iter().map(|l| l.x).collect();
        assert_eq!(label_xs, [5, 40, 75]);
        assert_eq!(diagram.segments[1].kind, SegmentKind::Flat);
        assert_eq!(diagram.segments[0].delta(), (35, -25));
    }

    #[test]
    fn test_compose_empty() {
        let diagram = compose(&[], &align("H", &[]));
        assert!(diagram.labels.is_empty());
        assert_eq!(diagram.markers.len(), 1);
        assert_eq!(diagram.markers[0].style, MarkerStyle::Open);
        assert!(diagram.segments.is_empty());
        assert_eq!(diagram.width, 32);
    }

    #[test]
    fn test_digraph_label() {
        let diagram = render("しゅ", "HL");
        let label = &diagram.labels[0];
        assert_eq!(label.x, 5);
        assert_eq!(
            label.glyphs,
            [
                Glyph { text: "し".into(), x: 0, font_size: 20 },
                Glyph { text: "ゅ".into(), x: 17, font_size: 14 },
            ]
        );
    }

    #[test]
    fn test_custom_layout() {
        let layout = Layout { step_width: 50, ..Layout::default() };
        let mora = segment("はし");
        let diagram = compose_with_layout(&mora, &align("LHL", &mora), layout);
        assert_eq!(diagram.width, 132);
        assert_eq!(diagram.markers[2].x, 116);
    }
}
