use crate::entity::Entity;
use crate::game::Game;

/// Marks an entity the player cannot afford to lose; its removal ends the
/// game in defeat. The fortress carries this, and registers itself as the
/// drop-off point for workers and the march target for enemies.
#[derive(Debug, Clone)]
pub struct Essential;

impl Essential {
    pub fn create(&mut self, owner: &mut Entity, game: &mut Game) {
        game.fortress = Some(owner.id);
    }
}

/// Marks an entity whose destruction ends the game in victory.
#[derive(Debug, Clone)]
pub struct KillObjective;
