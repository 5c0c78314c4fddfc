use crate::entity::Entity;
use crate::game::Game;
use crate::resource::Resource;
use hxk_core::*;
use hxk_grid::Position;
use serde_json::Value;
use serde_json::json;

/// One structure this builder can raise, with its full cost.
#[derive(Debug, Clone)]
pub struct BuildOption {
    pub name: String,
    pub costs: Vec<(Resource, Quantity)>,
}

/// Handles `build/<unit>` and `cancel/<unit>` on a builder entity.
///
/// Building spends the costs up front, spawns a construction scaffold at
/// the chosen cell, and points the builder's movement at the site so a
/// sibling repair behavior can raise it. Cancelling removes the scaffold
/// and refunds half of each cost.
#[derive(Debug, Clone)]
pub struct Build {
    pub options: Vec<BuildOption>,
    /// Scaffolds raised by this builder, newest last.
    pub pending: Vec<ID<Entity>>,
}

impl Build {
    pub fn new(options: Vec<BuildOption>) -> Self {
        Self {
            options,
            pending: Vec::new(),
        }
    }
    fn option(&self, name: &str) -> Result<&BuildOption> {
        self.options
            .iter()
            .find(|option| option.name == name)
            .ok_or_else(|| Error::client(format!("unknown structure '{}'", name)))
    }
    pub fn command(
        &mut self,
        owner: &mut Entity,
        game: &mut Game,
        key: &str,
        value: &str,
    ) -> Result<()> {
        if let Some(name) = key.strip_prefix("build/") {
            return self.raise(owner, game, name, value);
        }
        if let Some(name) = key.strip_prefix("cancel/") {
            return self.cancel(game, name);
        }
        Ok(())
    }
    fn raise(&mut self, owner: &mut Entity, game: &mut Game, name: &str, value: &str) -> Result<()> {
        let costs = self.option(name)?.costs.clone();
        let site: Position = value.parse()?;
        if game.map.contains_key(&site) {
            return Err(Error::client(format!("cell {} is occupied", site)));
        }
        let blueprint = game
            .templates
            .get(name)
            .ok_or_else(|| Error::client(format!("unknown template '{}'", name)))?;
        let max_hp = blueprint.max_hp;
        game.spend(&costs)?;
        let built_as = name.to_string();
        let scaffold = game.add_entity_with(CONSTRUCTION_TEMPLATE, site, owner.alignment, |e| {
            e.name = built_as;
            e.max_hp = max_hp;
        })?;
        self.pending.push(scaffold);
        if let Some(pathing) = owner.pathing_mut() {
            pathing.steps.clear();
            pathing.target_position = Some(site);
        }
        Ok(())
    }
    fn cancel(&mut self, game: &mut Game, name: &str) -> Result<()> {
        let costs = self.option(name)?.costs.clone();
        let scaffold = self
            .pending
            .iter()
            .rposition(|id| game.entity(*id).is_some_and(|e| e.name == name))
            .map(|index| self.pending.remove(index));
        let Some(scaffold) = scaffold else {
            return Err(Error::client(format!("no pending construction of '{}'", name)));
        };
        game.remove_entity(scaffold);
        for (resource, amount) in costs {
            game.add_resource(resource, amount * CANCEL_REFUND);
        }
        self.pending.retain(|id| game.entity(*id).is_some());
        Ok(())
    }
    pub fn query(&self, _owner: &Entity, _game: &Game) -> Vec<(String, Value)> {
        self.options
            .iter()
            .map(|option| {
                let costs: serde_json::Map<String, Value> = option
                    .costs
                    .iter()
                    .map(|(resource, amount)| (resource.to_string(), json!(amount)))
                    .collect();
                (format!("build/{}", option.name), json!({ "costs": costs }))
            })
            .collect()
    }
}
