use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::f32::consts::PI;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::geometry::Point;
use crate::ir::{DependencyGraph, NodeId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Width and height of the square canvas.
    pub canvas_size: f32,
    /// Circle radius as a fraction of the canvas size.
    pub radius_ratio: f32,
    /// Empty slots inserted after each folder.
    pub folder_spacing: usize,
    pub group_by_folder: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            canvas_size: 2000.0,
            radius_ratio: 0.25,
            folder_spacing: 2,
            group_by_folder: true,
        }
    }
}

/// A node position together with its angle on the circle.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LabeledPoint {
    #[serde(flatten)]
    pub point: Point,
    pub angle: f32,
}

#[derive(Debug, Clone)]
pub struct CircularLayout {
    pub canvas_size: f32,
    pub center: Point,
    pub radius: f32,
    pub positions: BTreeMap<NodeId, LabeledPoint>,
}

impl CircularLayout {
    pub fn position(&self, id: &str) -> Option<&LabeledPoint> {
        self.positions.get(id)
    }

    /// Node sitting at `point`, compared with the epsilon point equality.
    pub fn node_at(&self, point: Point) -> Option<&str> {
        self.positions
            .iter()
            .find(|(_, labeled)| labeled.point == point)
            .map(|(id, _)| id.as_str())
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

struct SlotCursor<'a> {
    center: Point,
    radius: f32,
    total: usize,
    index: usize,
    positions: &'a mut BTreeMap<NodeId, LabeledPoint>,
}

impl SlotCursor<'_> {
    fn place(&mut self, id: &str) {
        if self.positions.contains_key(id) {
            return;
        }
        let angle = 2.0 * PI * self.index as f32 / self.total as f32;
        self.positions.insert(
            id.to_string(),
            LabeledPoint {
                point: Point::on_circle(self.center, self.radius, angle),
                angle,
            },
        );
        self.index += 1;
    }

    fn skip(&mut self, slots: usize) {
        self.index += slots;
    }
}

/// Place every node of `graph` on a circle.
///
/// Scanned files come first, folder by folder with `folder_spacing` empty
/// slots between folders; referenced-only ids follow in lexicographic order.
/// The slot count covers all of them plus one guard slot, so angles stay in
/// `[0, 2π)` and increase strictly in placement order.
pub fn compute_layout(graph: &DependencyGraph, config: &LayoutConfig) -> CircularLayout {
    let canvas_size = config.canvas_size;
    let radius = canvas_size * config.radius_ratio;
    let center = canvas_size / 2.0 * Point::new(1.0, 1.0);
    let mut positions = BTreeMap::new();

    if graph.is_empty() {
        return CircularLayout {
            canvas_size,
            center,
            radius,
            positions,
        };
    }

    let spacing = if config.group_by_folder {
        config.folder_spacing
    } else {
        0
    };
    let total = graph.nodes.len() + spacing * graph.folders.len() + 1;
    let mut cursor = SlotCursor {
        center,
        radius,
        total,
        index: 0,
        positions: &mut positions,
    };

    if config.group_by_folder {
        for ids in graph.folders.values() {
            for id in ids {
                cursor.place(id);
            }
            cursor.skip(spacing);
        }
    } else {
        for id in &graph.own {
            cursor.place(id);
        }
    }
    for id in graph.external_nodes() {
        cursor.place(id);
    }

    let layout = CircularLayout {
        canvas_size,
        center,
        radius,
        positions,
    };
    warn_on_collisions(&layout);
    layout
}

fn warn_on_collisions(layout: &CircularLayout) {
    let mut placed: Vec<(&NodeId, Point)> = layout
        .positions
        .iter()
        .map(|(id, labeled)| (id, labeled.point))
        .collect();
    placed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
    for pair in placed.windows(2) {
        let (first, second) = (&pair[0], &pair[1]);
        if first.1 == second.1 {
            warn!(first = %first.0, second = %second.0, "labels overlap on the circle");
        }
    }
}
