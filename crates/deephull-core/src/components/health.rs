//! Health component for damageable entities.

use serde::{Deserialize, Serialize};

/// Hit points with a short post-hit invulnerability window
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Health {
    pub max: f32,
    pub current: f32,
    /// Seconds of invulnerability remaining after the last hit
    pub invulnerable_for: f32,
    /// Window granted after each hit that lands
    pub invulnerability_window: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self {
            max,
            current: max,
            invulnerable_for: 0.0,
            invulnerability_window: 1.0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    /// Apply damage unless dead or inside the invulnerability window.
    /// Returns true if the hit landed.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if !self.is_alive() || self.invulnerable_for > 0.0 {
            return false;
        }
        self.current = (self.current - amount).max(0.0);
        self.invulnerable_for = self.invulnerability_window;
        true
    }

    pub fn heal(&mut self, amount: f32) {
        if self.is_alive() {
            self.current = (self.current + amount).min(self.max);
        }
    }

    /// Count down the invulnerability window
    pub fn tick(&mut self, delta_seconds: f32) {
        if self.invulnerable_for > 0.0 {
            self.invulnerable_for = (self.invulnerable_for - delta_seconds).max(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_and_death() {
        let mut health = Health::new(100.0);
        assert!(health.is_alive());

        assert!(health.take_damage(25.0));
        assert_eq!(health.current, 75.0);

        health.invulnerable_for = 0.0;
        assert!(health.take_damage(200.0));
        assert_eq!(health.current, 0.0);
        assert!(!health.is_alive());

        assert!(!health.take_damage(10.0), "dead entities absorb no hits");
    }

    #[test]
    fn test_invulnerability_window() {
        let mut health = Health::new(100.0);
        assert!(health.take_damage(25.0));
        assert!(!health.take_damage(25.0), "window should absorb the second hit");
        assert_eq!(health.current, 75.0);

        health.tick(0.5);
        assert!(!health.take_damage(25.0));

        health.tick(0.6);
        assert!(health.take_damage(25.0));
        assert_eq!(health.current, 50.0);
    }

    #[test]
    fn test_heal_caps_at_max() {
        let mut health = Health::new(100.0);
        health.take_damage(25.0);
        health.heal(50.0);
        assert_eq!(health.current, 100.0);

        health.current = 0.0;
        health.heal(50.0);
        assert_eq!(health.current, 0.0, "the dead stay dead");
    }
}
