use crate::behavior::Pathing;
use crate::entity::Entity;
use crate::entity::Tag;
use crate::game::Game;
use hxk_core::*;
use hxk_grid::Position;

/// Gathers from resource nodes, carries the yield, and drops it off at the
/// fortress.
///
/// The movement phase runs first; gathering and depositing only happen on
/// activations where no step was taken. Gathering drains the node's hit
/// points, so an exhausted node is removed through the ordinary death path.
#[derive(Debug, Clone)]
pub struct Worker {
    pub path: Pathing,
    /// Carried amount at which the worker returns to drop off.
    pub capacity: Quantity,
    /// Amount gathered per activation.
    pub rate: Quantity,
    pub carrying: Quantity,
    pub cargo: Option<crate::resource::Resource>,
    pub target_resource: Option<ID<Entity>>,
}

impl Worker {
    pub fn new(capacity: Quantity, rate: Quantity) -> Self {
        Self {
            path: Pathing::default(),
            capacity,
            rate,
            carrying: 0.0,
            cargo: None,
            target_resource: None,
        }
    }
    pub fn activate(&mut self, owner: &mut Entity, game: &mut Game) -> Result<bool> {
        if self.path.step(owner, game)? {
            return Ok(true);
        }
        if self.carrying >= self.capacity {
            return self.dropoff(owner, game);
        }
        match self.gather(owner, game)? {
            true => Ok(true),
            // nothing left to gather; bank any partial load
            false if self.carrying > 0.0 => self.dropoff(owner, game),
            false => Ok(false),
        }
    }
    /// Walk to the tracked resource node and drain it. Fails the
    /// activation when no node is reachable.
    fn gather(&mut self, owner: &mut Entity, game: &mut Game) -> Result<bool> {
        let node = self
            .target_resource
            .and_then(|id| game.entity(id))
            .or_else(|| game.nearest_resource(owner.position))
            .map(|e| (e.id, e.position, e.resource_type, e.hp));
        let Some((id, position, resource_type, hp)) = node else {
            self.target_resource = None;
            return Ok(false);
        };
        self.target_resource = Some(id);
        if owner.position.distance(position) > 1 {
            self.path.target_position = None;
            self.path.plan(owner, game, position);
            return self.path.step(owner, game);
        }
        let Some(resource) = resource_type else {
            self.target_resource = None;
            return Ok(false);
        };
        if self.cargo != Some(resource) {
            // new cargo kind displaces any stale partial load
            self.carrying = 0.0;
            self.cargo = Some(resource);
        }
        let gathered = self.rate.min(self.capacity - self.carrying).min(hp);
        self.carrying += gathered;
        game.attack(owner.id, id, gathered, None);
        Ok(true)
    }
    /// Walk to the fortress and bank the carried load.
    fn dropoff(&mut self, owner: &mut Entity, game: &mut Game) -> Result<bool> {
        let Some(fortress) = game.fortress.and_then(|id| game.entity(id)) else {
            return Ok(false);
        };
        let position = fortress.position;
        if owner.position.distance(position) > 1 {
            self.path.target_position = None;
            self.path.plan(owner, game, position);
            return self.path.step(owner, game);
        }
        let Some(cargo) = self.cargo.take() else {
            self.carrying = 0.0;
            return Ok(false);
        };
        game.add_resource(cargo, self.carrying);
        self.carrying = 0.0;
        Ok(true)
    }
    /// A resource occupant becomes the gather target; a free cell becomes
    /// a move target.
    pub fn target(&mut self, _owner: &mut Entity, game: &mut Game, position: Position) {
        match game.map.get(&position) {
            Some(&occupant) => {
                if let Some(entity) = game.entity(occupant) {
                    if entity.tags.has(Tag::RESOURCE) {
                        self.target_resource = Some(occupant);
                        self.path.steps.clear();
                        self.path.target_position = None;
                    }
                }
            }
            None => {
                self.path.steps.clear();
                self.path.target_position = Some(position);
            }
        }
    }
}
