//! Slot graphs and preset layouts.
//!
//! A `SlotGraph` is the read-only topology of a board: one grid position per
//! slot (for renderers) and an undirected adjacency list. It is produced
//! once by `BoardEngine::init_board` and never changes during a match.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::SlotId;

/// Neighbour list. Preset boards never exceed six neighbours.
pub type Neighbours = SmallVec<[SlotId; 6]>;

/// Board topology: positions plus adjacency.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotGraph {
    positions: Vec<(i32, i32)>,
    adjacency: Vec<Neighbours>,
    edges: Vec<(SlotId, SlotId)>,
}

impl SlotGraph {
    /// Build a graph from positions and an undirected edge list.
    ///
    /// Panics if an edge references a slot outside `positions`.
    #[must_use]
    pub fn from_edges(positions: Vec<(i32, i32)>, edges: &[(u16, u16)]) -> Self {
        let mut adjacency = vec![Neighbours::new(); positions.len()];
        let mut edge_list = Vec::with_capacity(edges.len());
        for &(a, b) in edges {
            assert!(
                (a as usize) < positions.len() && (b as usize) < positions.len(),
                "edge ({}, {}) outside a {}-slot board",
                a,
                b,
                positions.len()
            );
            adjacency[a as usize].push(SlotId(b));
            adjacency[b as usize].push(SlotId(a));
            edge_list.push((SlotId(a), SlotId(b)));
        }
        Self {
            positions,
            adjacency,
            edges: edge_list,
        }
    }

    /// Rectangular grid with 4-neighbour adjacency, slots numbered row-major.
    #[must_use]
    pub fn grid(width: u16, height: u16) -> Self {
        let mut positions = Vec::new();
        let mut edges = Vec::new();
        for row in 0..height {
            for col in 0..width {
                let id = row * width + col;
                positions.push((col as i32, row as i32));
                if col + 1 < width {
                    edges.push((id, id + 1));
                }
                if row + 1 < height {
                    edges.push((id, id + width));
                }
            }
        }
        Self::from_edges(positions, &edges)
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Iterate over all slot ids.
    pub fn slots(&self) -> impl Iterator<Item = SlotId> {
        (0..self.positions.len() as u16).map(SlotId)
    }

    /// Neighbours of a slot.
    #[must_use]
    pub fn neighbours(&self, slot: SlotId) -> &[SlotId] {
        &self.adjacency[slot.index()]
    }

    /// Check whether two slots share an edge.
    #[must_use]
    pub fn adjacent(&self, a: SlotId, b: SlotId) -> bool {
        self.neighbours(a).contains(&b)
    }

    /// Grid position of a slot.
    #[must_use]
    pub fn position(&self, slot: SlotId) -> (i32, i32) {
        self.positions[slot.index()]
    }

    /// All undirected edges, in construction order.
    #[must_use]
    pub fn edges(&self) -> &[(SlotId, SlotId)] {
        &self.edges
    }

    #[must_use]
    pub fn contains(&self, slot: SlotId) -> bool {
        slot.index() < self.positions.len()
    }
}

/// Preset board layouts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layout {
    /// 3×3 grid.
    Grid3,
    /// 4×4 grid.
    Grid4,
    /// Eight slots in a closed loop around an empty centre.
    Ring8,
    /// Plus shape: a centre slot and four arms.
    Cross,
    /// Hexagonal flower: a centre slot ringed by six.
    Hex7,
}

impl Layout {
    /// All presets.
    pub const ALL: [Layout; 5] = [Layout::Grid3, Layout::Grid4, Layout::Ring8, Layout::Cross, Layout::Hex7];

    /// Build the slot graph for this layout.
    #[must_use]
    pub fn graph(self) -> SlotGraph {
        match self {
            Layout::Grid3 => SlotGraph::grid(3, 3),
            Layout::Grid4 => SlotGraph::grid(4, 4),
            Layout::Ring8 => SlotGraph::from_edges(
                vec![(0, 0), (1, 0), (2, 0), (2, 1), (2, 2), (1, 2), (0, 2), (0, 1)],
                &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 6), (6, 7), (7, 0)],
            ),
            Layout::Cross => SlotGraph::from_edges(
                vec![(1, 1), (1, 0), (2, 1), (1, 2), (0, 1)],
                &[(0, 1), (0, 2), (0, 3), (0, 4)],
            ),
            Layout::Hex7 => SlotGraph::from_edges(
                vec![(2, 2), (2, 0), (4, 1), (4, 3), (2, 4), (0, 3), (0, 1)],
                &[
                    (0, 1), (0, 2), (0, 3), (0, 4), (0, 5), (0, 6),
                    (1, 2), (2, 3), (3, 4), (4, 5), (5, 6), (6, 1),
                ],
            ),
        }
    }

    /// Stable name, used by the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Layout::Grid3 => "grid3",
            Layout::Grid4 => "grid4",
            Layout::Ring8 => "ring8",
            Layout::Cross => "cross",
            Layout::Hex7 => "hex7",
        }
    }

    /// Look a layout up by `name()`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|layout| layout.name() == name)
    }
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
