use crate::entity::Entity;
use crate::game::Game;
use hxk_core::*;

/// Transient heal-to-complete state of a structure being raised.
///
/// The scaffold entity carries the name of what it will become. It starts
/// at one hit point; when healing brings it to full, the scaffold removes
/// itself and its removal hook adds the finished structure at the same
/// cell. A scaffold removed short of full health (cancelled or destroyed)
/// leaves nothing behind.
#[derive(Debug, Clone)]
pub struct UnderConstruction;

impl UnderConstruction {
    pub fn create(&mut self, owner: &mut Entity, _game: &mut Game) {
        owner.hp = 1.0;
    }
    pub fn heal(&mut self, owner: &mut Entity, _game: &mut Game, _amount: Quantity) {
        if owner.hp >= owner.max_hp {
            owner.removed = true;
        }
    }
    pub fn remove(&mut self, owner: &mut Entity, game: &mut Game) {
        if owner.hp < owner.max_hp {
            return;
        }
        if let Err(error) = game.add_entity(&owner.name, owner.position, owner.alignment) {
            log::error!(
                "[game {}] finishing construction of '{}' failed: {}",
                game.id,
                owner.name,
                error
            );
        }
    }
}
