//! Time Management

use std::time::{Duration, Instant};

use crate::coretypes::{PlyKind, MAX_DEPTH};

/// How long a search may run.
/// `Infinite` runs until its stopper is raised, `Depth` until an iteration
/// depth is completed and `MoveTime` until a wall-clock budget is spent.
/// Either limit may be paired with the other, and `MAX_DEPTH` caps all three.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Mode {
    Infinite,           // Search until told to stop.
    Depth(Depth),       // Search to a given depth.
    MoveTime(MoveTime), // Search for a specified amount of time.
}

impl Mode {
    pub fn infinite() -> Self {
        Self::Infinite
    }

    /// Stop after iteration `ply`, or earlier once `movetime` is spent.
    pub fn depth(ply: PlyKind, movetime: Option<Duration>) -> Self {
        Self::Depth(Depth {
            depth: ply,
            movetime,
        })
    }

    /// Stop once `movetime` is spent, or earlier after iteration `ply`.
    pub fn movetime(movetime: Duration, ply: Option<PlyKind>) -> Self {
        Self::MoveTime(MoveTime {
            movetime,
            depth: ply,
        })
    }

    /// Deepest iteration this mode allows.
    pub fn max_depth(&self) -> PlyKind {
        let depth = match self {
            Mode::Infinite => None,
            Mode::Depth(depth_mode) => Some(depth_mode.depth),
            Mode::MoveTime(movetime_mode) => movetime_mode.depth,
        };
        depth.map_or(MAX_DEPTH, |depth| depth.min(MAX_DEPTH))
    }

    /// Wall-clock instant after which a search started at `start_time` must stop, if any.
    /// A budget reaching past the representable future, such as `Duration::MAX`, has none.
    pub fn deadline(&self, start_time: Instant) -> Option<Instant> {
        let movetime = match self {
            Mode::Infinite => None,
            Mode::Depth(depth_mode) => depth_mode.movetime,
            Mode::MoveTime(movetime_mode) => Some(movetime_mode.movetime),
        };
        movetime.and_then(|movetime| start_time.checked_add(movetime))
    }

    /// Returns true if an iteration at depth `ply` should not be started.
    pub fn stop(&self, ply: PlyKind, start_time: Instant) -> bool {
        if ply > self.max_depth() {
            return true;
        }
        match self.deadline(start_time) {
            Some(deadline) => Instant::now() >= deadline,
            None => false,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Depth {
    pub depth: PlyKind,
    movetime: Option<Duration>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct MoveTime {
    movetime: Duration,
    depth: Option<PlyKind>,
}
