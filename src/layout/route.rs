use std::fmt;

use serde::{Serialize, Serializer};

use crate::config::RouteConfig;
use crate::layout::Point;

/// An orthogonal wire with two bends, sharing a single vertical segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WirePath {
    /// Output port of the driving node
    pub start: Point,
    /// Horizontal position of the vertical segment
    pub bend_x: f64,
    /// Input port of the driven node
    pub end: Point,
}

impl WirePath {
    /// The four corners of the path, from start to end
    pub fn points(&self) -> [Point; 4] {
        [
            self.start,
            Point::new(self.bend_x, self.start.y),
            Point::new(self.bend_x, self.end.y),
            self.end,
        ]
    }
}

impl fmt::Display for WirePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.points();
        write!(f, "M {} L {} L {} L {}", a, b, c, d)
    }
}

impl Serialize for WirePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Route a wire between two ports
///
/// The vertical segment sits halfway, or in the first gutter after the leftmost end for
/// wires spanning several levels. It is then shifted by a lane offset depending on the
/// wire index, and kept at least `clearance` away from both ends.
pub fn route(start: Point, end: Point, wire_index: usize, cfg: &RouteConfig) -> WirePath {
    let left = start.x.min(end.x);
    let right = start.x.max(end.x);
    let span = right - left;

    let mut bend_x = (start.x + end.x) / 2.0;
    let levels_crossed = (span / cfg.level_width).round();
    if levels_crossed >= 1.0 && span > cfg.long_span_ratio * cfg.level_width {
        bend_x = left + cfg.level_width * cfg.gutter_ratio;
    }

    let lane_count = cfg.lane_count.max(1);
    let lane = (wire_index % lane_count) as f64 - (lane_count - 1) as f64 / 2.0;
    bend_x += lane * cfg.lane_spacing;

    let low = left + cfg.clearance;
    let high = right - cfg.clearance;
    bend_x = if low <= high {
        bend_x.clamp(low, high)
    } else {
        (start.x + end.x) / 2.0
    };

    WirePath { start, bend_x, end }
}
