//! Level structure components: placed room and hallway modules.

use super::common::{BoundingBox, Vec3};
use serde::{Deserialize, Serialize};

/// Kinds of modules the generator can place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModuleKind {
    /// Room with a puzzle gating the far door
    PuzzleRoom,
    /// Straight hallway section, one exit
    StraightHall,
    /// Three-way junction: forward, left, right
    BranchingHall,
    /// Two-way junction: forward plus one side exit
    SplitHall,
    /// Terminator with no exits
    DeadEnd,
    /// Final room ending the main path
    EscapeRoom,
}

impl ModuleKind {
    pub fn is_junction(&self) -> bool {
        matches!(self, ModuleKind::BranchingHall | ModuleKind::SplitHall)
    }

    pub fn is_terminator(&self) -> bool {
        matches!(self, ModuleKind::DeadEnd | ModuleKind::EscapeRoom)
    }
}

/// Module component - one placed section of the level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    pub kind: ModuleKind,
    /// World position of the module's entry point
    pub origin: Vec3,
    /// World facing, radians about the vertical axis
    pub yaw: f32,
    /// Walkable floor rectangle, world-space AABB
    pub footprint: BoundingBox,
    /// Placement order across the whole level
    pub sequence: u32,
    /// Whether this module lies on the main path
    pub on_main_path: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_kind_predicates() {
        assert!(ModuleKind::BranchingHall.is_junction());
        assert!(ModuleKind::SplitHall.is_junction());
        assert!(!ModuleKind::StraightHall.is_junction());

        assert!(ModuleKind::DeadEnd.is_terminator());
        assert!(ModuleKind::EscapeRoom.is_terminator());
        assert!(!ModuleKind::PuzzleRoom.is_terminator());
    }
}
