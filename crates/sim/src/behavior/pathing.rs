use crate::entity::Entity;
use crate::game::Game;
use hxk_core::*;
use hxk_grid::Position;

/// Movement state shared by every mover.
///
/// Owns the reserved step stack: planning keeps only the leading
/// `1/PATH_PREFIX_DIVISOR` of the planned path (the weighted search is
/// sloppy, so movers replan every few steps), then one reserved step is
/// executed per activation. A reserved step that has become occupied
/// clears the stack so the next activation replans.
#[derive(Debug, Clone, Default)]
pub struct Pathing {
    pub target_position: Option<Position>,
    /// Reserved steps, next step last.
    pub steps: Vec<Position>,
}

impl Pathing {
    /// Movement phase: execute or replan one step. Returns true when the
    /// owner moved, so layered behaviors skip their own logic this
    /// activation.
    pub fn step(&mut self, owner: &mut Entity, game: &mut Game) -> Result<bool> {
        if let Some(&next) = self.steps.last() {
            if game.map.contains_key(&next) {
                self.steps.clear();
                return Ok(false);
            }
            self.steps.pop();
            game.move_entity(owner, next)?;
            return Ok(true);
        }
        if let Some(target) = self.target_position {
            if owner.position == target {
                self.target_position = None;
                return Ok(false);
            }
            self.plan(owner, game, target);
            if let Some(&next) = self.steps.last() {
                self.steps.pop();
                game.move_entity(owner, next)?;
                return Ok(true);
            }
            // no way forward; abandon the order
            self.target_position = None;
            return Ok(false);
        }
        Ok(false)
    }
    /// Plan toward `target` and reserve the leading stretch of the path.
    pub fn plan(&mut self, owner: &Entity, game: &mut Game, target: Position) {
        let path = game.plan_path(owner.position, target);
        let moves = path.len().saturating_sub(1);
        self.steps.clear();
        if moves == 0 {
            return;
        }
        let keep = moves.div_ceil(PATH_PREFIX_DIVISOR);
        self.steps.extend(path[1..=keep].iter().rev());
    }
    /// Point the mover at a free cell; occupied cells are ignored.
    pub fn target(&mut self, _owner: &mut Entity, game: &mut Game, position: Position) {
        if game.map.contains_key(&position) {
            return;
        }
        self.steps.clear();
        self.target_position = Some(position);
    }
}
