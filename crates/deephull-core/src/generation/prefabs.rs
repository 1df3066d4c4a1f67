//! Prefab catalog - the module shapes the generator assembles levels from.
//!
//! Every prefab is described in its local frame: the entry connector sits at
//! the origin facing +x, the footprint spans x in [0, length] and y centered
//! on the entry axis. Outgoing connectors are sockets; placing a module maps
//! its sockets into world space.

use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;

use super::level::GenError;
use crate::components::{ModuleKind, Vec3};

/// Connector role within a prefab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SocketKind {
    /// Single outgoing connector of rooms and hallways
    Exit,
    /// Junction connector continuing the entry axis
    Forward,
    Left,
    Right,
    /// Lateral connector of a split junction
    Side,
}

/// Outgoing connector in prefab-local space
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SocketDef {
    pub kind: SocketKind,
    /// Connector position relative to the entry
    pub offset: Vec3,
    /// Outgoing direction relative to the entry axis, radians
    pub yaw: f32,
}

impl SocketDef {
    fn new(kind: SocketKind, x: f32, y: f32, yaw: f32) -> Self {
        Self {
            kind,
            offset: Vec3::new(x, y, 0.0),
            yaw,
        }
    }
}

/// A placeable module shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prefab {
    pub name: String,
    pub kind: ModuleKind,
    /// Extent along the entry axis
    pub length: f32,
    /// Extent across the entry axis
    pub width: f32,
    pub sockets: Vec<SocketDef>,
}

impl Prefab {
    fn new(name: &str, kind: ModuleKind, length: f32, width: f32, sockets: Vec<SocketDef>) -> Self {
        Self {
            name: name.to_string(),
            kind,
            length,
            width,
            sockets,
        }
    }

    pub fn socket(&self, kind: SocketKind) -> Option<&SocketDef> {
        self.sockets.iter().find(|s| s.kind == kind)
    }
}

/// The full set of prefabs available to the generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefabCatalog {
    pub puzzle_rooms: Vec<Prefab>,
    pub straight_hall: Prefab,
    pub branching_hall: Prefab,
    pub split_hall: Prefab,
    pub dead_end: Prefab,
    pub escape_room: Prefab,
}

impl PrefabCatalog {
    /// The built-in submarine module set
    pub fn builtin() -> Self {
        let exit_at = |length: f32| vec![SocketDef::new(SocketKind::Exit, length, 0.0, 0.0)];

        Self {
            puzzle_rooms: vec![
                Prefab::new("Ballast Control", ModuleKind::PuzzleRoom, 10.0, 8.0, exit_at(10.0)),
                Prefab::new("Torpedo Bay", ModuleKind::PuzzleRoom, 12.0, 9.0, exit_at(12.0)),
                Prefab::new("Crew Mess", ModuleKind::PuzzleRoom, 9.0, 7.0, exit_at(9.0)),
                Prefab::new("Engine Room", ModuleKind::PuzzleRoom, 11.0, 8.0, exit_at(11.0)),
                Prefab::new("Sonar Suite", ModuleKind::PuzzleRoom, 10.0, 10.0, exit_at(10.0)),
            ],
            straight_hall: Prefab::new(
                "Gangway",
                ModuleKind::StraightHall,
                8.0,
                4.0,
                exit_at(8.0),
            ),
            branching_hall: Prefab::new(
                "Cross Junction",
                ModuleKind::BranchingHall,
                8.0,
                8.0,
                vec![
                    SocketDef::new(SocketKind::Forward, 8.0, 0.0, 0.0),
                    SocketDef::new(SocketKind::Left, 4.0, 4.0, FRAC_PI_2),
                    SocketDef::new(SocketKind::Right, 4.0, -4.0, -FRAC_PI_2),
                ],
            ),
            split_hall: Prefab::new(
                "Side Junction",
                ModuleKind::SplitHall,
                8.0,
                6.0,
                vec![
                    SocketDef::new(SocketKind::Forward, 8.0, 0.0, 0.0),
                    SocketDef::new(SocketKind::Side, 4.0, 3.0, FRAC_PI_2),
                ],
            ),
            dead_end: Prefab::new("Sealed Bulkhead", ModuleKind::DeadEnd, 2.0, 4.0, Vec::new()),
            escape_room: Prefab::new(
                "Escape Trunk",
                ModuleKind::EscapeRoom,
                12.0,
                10.0,
                Vec::new(),
            ),
        }
    }

    pub fn random_puzzle_room(&self, rng: &mut impl rand::Rng) -> &Prefab {
        &self.puzzle_rooms[rng.gen_range(0..self.puzzle_rooms.len())]
    }

    /// Check that every prefab carries the sockets the generator will ask for
    pub fn validate(&self) -> Result<(), GenError> {
        if self.puzzle_rooms.is_empty() {
            return Err(GenError::NoPuzzleRooms);
        }
        for room in &self.puzzle_rooms {
            require_socket(room, SocketKind::Exit)?;
        }
        require_socket(&self.straight_hall, SocketKind::Exit)?;
        require_socket(&self.branching_hall, SocketKind::Forward)?;
        require_socket(&self.branching_hall, SocketKind::Left)?;
        require_socket(&self.branching_hall, SocketKind::Right)?;
        require_socket(&self.split_hall, SocketKind::Forward)?;
        require_socket(&self.split_hall, SocketKind::Side)?;
        Ok(())
    }
}

fn require_socket(prefab: &Prefab, kind: SocketKind) -> Result<(), GenError> {
    if prefab.socket(kind).is_some() {
        Ok(())
    } else {
        Err(GenError::MissingSocket {
            prefab: prefab.name.clone(),
            socket: kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_builtin_catalog_validates() {
        let catalog = PrefabCatalog::builtin();
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn test_junction_sockets_point_sideways() {
        let catalog = PrefabCatalog::builtin();

        let left = catalog.branching_hall.socket(SocketKind::Left).unwrap();
        assert!(left.yaw > 0.0);
        assert!(left.offset.y > 0.0);

        let right = catalog.branching_hall.socket(SocketKind::Right).unwrap();
        assert!(right.yaw < 0.0);
        assert!(right.offset.y < 0.0);

        let side = catalog.split_hall.socket(SocketKind::Side).unwrap();
        assert!(side.yaw > 0.0);
    }

    #[test]
    fn test_missing_socket_fails_validation() {
        let mut catalog = PrefabCatalog::builtin();
        catalog.straight_hall.sockets.clear();

        match catalog.validate() {
            Err(GenError::MissingSocket { prefab, socket }) => {
                assert_eq!(prefab, "Gangway");
                assert_eq!(socket, SocketKind::Exit);
            }
            other => panic!("expected a missing socket error, got {:?}", other),
        }
    }

    #[test]
    fn test_random_puzzle_room_draws_from_catalog() {
        let catalog = PrefabCatalog::builtin();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..20 {
            let room = catalog.random_puzzle_room(&mut rng);
            assert_eq!(room.kind, ModuleKind::PuzzleRoom);
            assert!(room.socket(SocketKind::Exit).is_some());
        }
    }
}
