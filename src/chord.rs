use serde::Serialize;
use tracing::warn;

use crate::geometry::{Bezier, Point};
use crate::ir::{DependencyGraph, NodeId};
use crate::layout::CircularLayout;

#[derive(Debug, Clone, Serialize)]
pub struct Chord {
    pub from: NodeId,
    pub to: NodeId,
    pub curve: Bezier,
}

/// Curve between two points on the circle.
///
/// Each tangent point is pulled from its endpoint toward `center` by
/// `distance / (2 * radius)` of the way, so neighbours get an almost straight
/// chord and opposite nodes one that dips through the middle.
pub fn chord_curve(begin: Point, end: Point, center: Point, radius: f32) -> Bezier {
    let pull = begin.distance(end) / (2.0 * radius);
    let begin_tangent = begin + (center - begin) * pull;
    let end_tangent = end + (center - end) * pull;
    Bezier::new(begin, begin_tangent, end_tangent, end)
}

/// One chord per edge, in edge order. Edges with an unplaced endpoint are
/// dropped with a warning.
pub fn synthesize_chords(graph: &DependencyGraph, layout: &CircularLayout) -> Vec<Chord> {
    let mut chords = Vec::with_capacity(graph.edges.len());
    for edge in &graph.edges {
        let (Some(from), Some(to)) = (layout.position(&edge.from), layout.position(&edge.to))
        else {
            warn!(from = %edge.from, to = %edge.to, "edge endpoint has no position, skipping chord");
            continue;
        };
        chords.push(Chord {
            from: edge.from.clone(),
            to: edge.to.clone(),
            curve: chord_curve(from.point, to.point, layout.center, layout.radius),
        });
    }
    chords
}
