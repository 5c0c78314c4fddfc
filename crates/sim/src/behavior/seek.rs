use crate::behavior::Pathing;
use crate::entity::Entity;
use crate::game::Game;
use hxk_core::*;
use hxk_grid::Position;

/// Closes the distance to hostile entities, stopping within reach so a
/// sibling attack behavior can act.
#[derive(Debug, Clone)]
pub struct SeekEnemy {
    pub path: Pathing,
    /// Distance at which the seeker stops advancing.
    pub reach: i32,
    pub target_entity: Option<ID<Entity>>,
}

impl SeekEnemy {
    pub fn new(reach: i32) -> Self {
        Self {
            path: Pathing::default(),
            reach,
            target_entity: None,
        }
    }
    pub fn activate(&mut self, owner: &mut Entity, game: &mut Game) -> Result<bool> {
        if self.path.step(owner, game)? {
            return Ok(true);
        }
        let quarry = self
            .target_entity
            .and_then(|id| game.entity(id).map(|e| (e.id, e.position)))
            .or_else(|| game.nearest_hostile(owner.position, owner.alignment));
        let Some((id, position)) = quarry else {
            self.target_entity = None;
            return Ok(false);
        };
        self.target_entity = Some(id);
        if owner.position.distance(position) <= self.reach {
            return Ok(false);
        }
        self.path.plan(owner, game, position);
        self.path.step(owner, game)
    }
    pub fn target(&mut self, _owner: &mut Entity, game: &mut Game, position: Position) {
        if let Some(&occupant) = game.map.get(&position) {
            self.target_entity = Some(occupant);
            self.path.steps.clear();
        }
    }
}

/// Marches on the fortress, stopping within reach.
#[derive(Debug, Clone)]
pub struct SeekFortress {
    pub path: Pathing,
    pub reach: i32,
}

impl SeekFortress {
    pub fn new(reach: i32) -> Self {
        Self {
            path: Pathing::default(),
            reach,
        }
    }
    pub fn activate(&mut self, owner: &mut Entity, game: &mut Game) -> Result<bool> {
        if self.path.step(owner, game)? {
            return Ok(true);
        }
        let Some(position) = game.fortress.and_then(|id| game.entity(id)).map(|e| e.position)
        else {
            return Ok(false);
        };
        if owner.position.distance(position) <= self.reach {
            return Ok(false);
        }
        self.path.plan(owner, game, position);
        self.path.step(owner, game)
    }
}
