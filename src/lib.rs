#[cfg(feature = "cli")]
pub mod cli;
pub mod chord;
pub mod config;
pub mod error;
pub mod geometry;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod scan;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;

pub use chord::{Chord, synthesize_chords};
pub use config::{Config, load_config};
pub use error::{Error, Result};
pub use geometry::{Bezier, Point};
pub use ir::{DependencyGraph, Edge, NodeId, NodeNaming};
pub use layout::{CircularLayout, LabeledPoint, LayoutConfig, compute_layout};
pub use render::render_svg;
pub use scan::{ScanOptions, scan_sources};
pub use theme::Theme;

/// Result of running the whole pipeline on one source tree.
#[derive(Debug, Clone)]
pub struct ChordDiagram {
    pub graph: DependencyGraph,
    pub layout: CircularLayout,
    pub chords: Vec<Chord>,
    pub svg: String,
}

/// Scan, lay out, synthesize chords and render, in that order.
pub fn build_diagram(options: &ScanOptions, config: &Config) -> Result<ChordDiagram> {
    let graph = scan_sources(options)?;
    let layout = compute_layout(&graph, &config.layout);
    let chords = synthesize_chords(&graph, &layout);
    let svg = render_svg(&layout, &chords, &config.theme);
    Ok(ChordDiagram {
        graph,
        layout,
        chords,
        svg,
    })
}
