use crate::entity::Entity;
use crate::entity::Tag;
use crate::game::Game;
use hxk_core::*;

/// Heals the nearest damaged friendly structure or unit in range.
/// Construction scaffolds are raised through the same healing path.
#[derive(Debug, Clone)]
pub struct Repair {
    pub amount: Quantity,
    pub range: i32,
}

impl Repair {
    pub fn activate(&mut self, owner: &mut Entity, game: &mut Game) -> Result<bool> {
        let patient = game
            .entities()
            .filter(|e| e.id != owner.id)
            .filter(|e| e.alignment == owner.alignment)
            .filter(|e| !e.tags.has(Tag::RESOURCE))
            .filter(|e| e.hp < e.max_hp)
            .filter(|e| e.position.distance(owner.position) <= self.range)
            .min_by_key(|e| e.position.distance(owner.position))
            .map(|e| e.id);
        match patient {
            Some(id) => {
                game.heal(id, self.amount);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
