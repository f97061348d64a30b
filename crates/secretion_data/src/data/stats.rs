use crate::data::cell::Cell;
use crate::data::entity::{DockingState, EntityId};
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Summary of the cell at one recorded tick.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FrameStats {
    pub tick: u64,
    /// Secretions since the start of the run, summed over vesicles.
    pub total_secretions: u64,
    pub open_channels: usize,
    /// Vesicles just docked or counting down.
    pub docked: usize,
    pub counting: usize,
    pub mean_maturation: f64,
    /// Mean center distance between vesicles and the nucleus, Å.
    pub mean_nucleus_distance: f64,
}

impl FrameStats {
    pub fn capture(tick: u64, cell: &Cell) -> Self {
        let n = cell.vesicles.len();
        let (mut docked, mut counting) = (0, 0);
        let (mut maturation, mut distance) = (0.0, 0.0);
        for v in &cell.vesicles {
            if v.docking.is_docked() {
                docked += 1;
            }
            if matches!(v.docking, DockingState::Countdown(_)) {
                counting += 1;
            }
            maturation += v.maturation as f64;
            distance += v.body.position.distance(cell.nucleus.center);
        }
        let mean = |sum: f64| if n > 0 { sum / n as f64 } else { 0.0 };

        Self {
            tick,
            total_secretions: cell.total_secretions(),
            open_channels: cell.open_channel_count(),
            docked,
            counting,
            mean_maturation: mean(maturation),
            mean_nucleus_distance: mean(distance),
        }
    }
}

/// State of one vesicle at a recorded tick.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VesicleFrame {
    pub id: EntityId,
    pub position: DVec3,
    /// Center distance to the nucleus, Å.
    pub nucleus_distance: f64,
    pub maturation: u64,
    /// Raw docking value: 0 undocked, -1 just docked, n counting down.
    pub docking: i64,
}

/// One recorded tick: the summary plus every vesicle. Written as one JSON
/// line with the summary fields at the top level.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Frame {
    #[serde(flatten)]
    pub stats: FrameStats,
    #[serde(default)]
    pub vesicles: Vec<VesicleFrame>,
}

impl Frame {
    pub fn capture(tick: u64, cell: &Cell) -> Self {
        let vesicles = cell
            .vesicles
            .iter()
            .map(|v| VesicleFrame {
                id: v.id,
                position: v.body.position,
                nucleus_distance: v.body.position.distance(cell.nucleus.center),
                maturation: v.maturation,
                docking: v.docking.to_raw(),
            })
            .collect();
        Self {
            stats: FrameStats::capture(tick, cell),
            vesicles,
        }
    }
}
