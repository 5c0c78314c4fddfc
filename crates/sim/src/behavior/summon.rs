use crate::entity::Entity;
use crate::game::Game;
use hxk_core::*;
use rand::seq::IndexedRandom;

/// Spawns one unit of a fixed template near the owner on each activation.
#[derive(Debug, Clone)]
pub struct Summon {
    pub unit: String,
}

impl Summon {
    pub fn activate(&mut self, owner: &mut Entity, game: &mut Game) -> Result<bool> {
        match game.free_position_near(owner.position) {
            Some(position) => {
                game.add_entity(&self.unit, position, owner.alignment)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Spawns a weighted random mix of units; the number spawned per activation
/// scales with accumulated strength.
#[derive(Debug, Clone)]
pub struct SummonPool {
    /// Template name and relative weight.
    pub units: Vec<(String, f64)>,
    pub strength: Quantity,
}

impl SummonPool {
    pub fn activate(&mut self, owner: &mut Entity, game: &mut Game) -> Result<bool> {
        if self.units.is_empty() {
            return Ok(false);
        }
        let count = (self.strength.floor() as usize).max(1);
        let mut summoned = false;
        for _ in 0..count {
            let (unit, _) = self
                .units
                .choose_weighted(&mut game.rng, |(_, weight)| *weight)
                .expect("summon pool is non-empty");
            let unit = unit.clone();
            match game.free_position_near(owner.position) {
                Some(position) => {
                    game.add_entity(&unit, position, owner.alignment)?;
                    summoned = true;
                }
                None => break,
            }
        }
        Ok(summoned)
    }
}

/// Adds strength to a sibling behavior looked up by label.
///
/// Activation fails when the label is missing or the target carries no
/// strength, so the empowerment retries sooner.
#[derive(Debug, Clone)]
pub struct Empower {
    pub target: String,
    pub strength: Quantity,
}

impl Empower {
    pub fn activate(&mut self, owner: &mut Entity, _game: &mut Game) -> Result<bool> {
        let strength = owner
            .behaviors
            .iter_mut()
            .find(|sibling| sibling.label.as_deref() == Some(self.target.as_str()))
            .and_then(|sibling| sibling.kind.strength_mut());
        match strength {
            Some(strength) => {
                *strength += self.strength;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
