use crate::chord::Chord;
use crate::error::Result;
use crate::geometry::Point;
use crate::ir::DependencyGraph;
use crate::layout::CircularLayout;
use crate::render::write_atomic;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub canvas_size: f32,
    pub center: [f32; 2],
    pub radius: f32,
    pub nodes: Vec<NodeDump>,
    pub chords: Vec<ChordDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub external: bool,
    pub folder: Option<String>,
    pub includes: usize,
    pub included_by: usize,
}

#[derive(Debug, Serialize)]
pub struct ChordDump {
    pub from: String,
    pub to: String,
    pub points: Vec<[f32; 2]>,
}

fn pair(point: Point) -> [f32; 2] {
    [point.x, point.y]
}

impl LayoutDump {
    pub fn from_layout(layout: &CircularLayout, chords: &[Chord], graph: &DependencyGraph) -> Self {
        let mut folder_of: HashMap<&str, String> = HashMap::new();
        for (folder, ids) in &graph.folders {
            for id in ids {
                folder_of
                    .entry(id.as_str())
                    .or_insert_with(|| folder.display().to_string());
            }
        }

        let nodes = layout
            .positions
            .iter()
            .map(|(id, labeled)| NodeDump {
                id: id.clone(),
                x: labeled.point.x,
                y: labeled.point.y,
                angle: labeled.angle,
                external: !graph.is_own(id),
                folder: folder_of.get(id.as_str()).cloned(),
                includes: graph.out_degree(id),
                included_by: graph.in_degree(id),
            })
            .collect();

        let chords = chords
            .iter()
            .map(|chord| ChordDump {
                from: chord.from.clone(),
                to: chord.to.clone(),
                points: chord.curve.points().iter().copied().map(pair).collect(),
            })
            .collect();

        LayoutDump {
            canvas_size: layout.canvas_size,
            center: pair(layout.center),
            radius: layout.radius,
            nodes,
            chords,
        }
    }
}

pub fn write_layout_dump(
    path: &Path,
    layout: &CircularLayout,
    chords: &[Chord],
    graph: &DependencyGraph,
) -> Result<()> {
    let dump = LayoutDump::from_layout(layout, chords, graph);
    write_atomic(path, |writer| {
        serde_json::to_writer_pretty(&mut *writer, &dump).map_err(std::io::Error::from)
    })
}
