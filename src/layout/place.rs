use std::cmp::Ordering;

use tracing::trace;

use crate::config::LayoutConfig;
use crate::layout::Point;
use crate::network::{Netlist, NodeId};

/// A node waiting for its position in a level
#[derive(Debug, Clone, Copy)]
struct Candidate {
    id: NodeId,
    ideal: f64,
    group: usize,
}

impl Candidate {
    /// Order by ideal position, or by equation when the positions are close
    ///
    /// Not transitive: only usable with a sort that compares neighbours.
    fn order(&self, other: &Candidate, tie_threshold: f64) -> Ordering {
        let diff = self.ideal - other.ideal;
        if diff.abs() < tie_threshold {
            self.group.cmp(&other.group)
        } else if diff < 0.0 {
            Ordering::Less
        } else {
            Ordering::Greater
        }
    }
}

/// Stable insertion sort; works with the non-transitive candidate order
fn sort_candidates(candidates: &mut [Candidate], tie_threshold: f64) {
    for i in 1..candidates.len() {
        let mut j = i;
        while j > 0 && candidates[j - 1].order(&candidates[j], tie_threshold) == Ordering::Greater {
            candidates.swap(j - 1, j);
            j -= 1;
        }
    }
}

/// Compute the origin of every node, indexed by node id
///
/// Inputs are stacked in the first column in creation order. Each following level is
/// placed in order: a node wants the mean position of its children, and is pushed down
/// when too close to the previous node of its level.
pub fn place(net: &Netlist, cfg: &LayoutConfig) -> Vec<Point> {
    let mut positions = vec![Point::default(); net.nb_nodes()];
    let mut levels: Vec<Vec<NodeId>> = vec![Vec::new(); net.max_level() + 1];
    for n in net.nodes() {
        levels[n.level].push(n.id);
    }

    let input_x = cfg.column_x(0);
    for (i, id) in net.inputs().iter().enumerate() {
        positions[id.index()] = Point::new(input_x, cfg.input_top + i as f64 * cfg.input_spacing);
    }

    for (level, ids) in levels.iter().enumerate().skip(1) {
        let x = cfg.column_x(level);
        let mut candidates: Vec<Candidate> = ids
            .iter()
            .map(|id| {
                let node = net.node(*id);
                let ideal = if node.children.is_empty() {
                    cfg.default_y
                } else {
                    let sum: f64 = node.children.iter().map(|c| positions[c.index()].y).sum();
                    sum / node.children.len() as f64
                };
                Candidate {
                    id: *id,
                    ideal,
                    group: node.group,
                }
            })
            .collect();
        sort_candidates(&mut candidates, cfg.tie_threshold);

        let mut previous: Option<f64> = None;
        for c in candidates {
            let y = match previous {
                Some(p) if c.ideal < p + cfg.min_gap => p + cfg.min_gap,
                _ => c.ideal,
            };
            positions[c.id.index()] = Point::new(x, y);
            previous = Some(y);
        }
        trace!(level, nodes = ids.len(), "placed level");
    }
    positions
}
