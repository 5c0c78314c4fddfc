use crate::entity::Entity;
use crate::entity::Tag;
use crate::game::Game;
use hxk_core::*;
use hxk_grid::Position;

/// Strikes a hostile entity in range on each activation.
///
/// A manually targeted entity takes precedence while it remains alive and
/// in range; otherwise the nearest hostile in range is struck.
#[derive(Debug, Clone)]
pub struct Attack {
    pub damage: Quantity,
    pub range: i32,
    pub visual: Option<String>,
    pub manual_target: Option<ID<Entity>>,
}

impl Attack {
    pub fn new(damage: Quantity, range: i32, visual: Option<String>) -> Self {
        Self {
            damage,
            range,
            visual,
            manual_target: None,
        }
    }
    pub fn activate(&mut self, owner: &mut Entity, game: &mut Game) -> Result<bool> {
        let manual = self.manual_target.and_then(|id| {
            game.entity(id)
                .filter(|e| e.position.distance(owner.position) <= self.range)
                .map(|e| e.id)
        });
        if self.manual_target.is_some() && manual.is_none() {
            // fell out of range or died; fall back to automatic targeting
            self.manual_target = None;
        }
        let target = manual.or_else(|| {
            game.nearest_hostile(owner.position, owner.alignment)
                .filter(|(_, position)| position.distance(owner.position) <= self.range)
                .map(|(id, _)| id)
        });
        match target {
            Some(target) => {
                game.attack(owner.id, target, self.damage, self.visual.clone());
                Ok(true)
            }
            None => Ok(false),
        }
    }
    pub fn target(&mut self, _owner: &mut Entity, game: &mut Game, position: Position) {
        if let Some(&occupant) = game.map.get(&position) {
            if let Some(entity) = game.entity(occupant) {
                if !entity.tags.has(Tag::RESOURCE) {
                    self.manual_target = Some(occupant);
                }
            }
        }
    }
}
