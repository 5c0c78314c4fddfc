use hxk_core::*;
use hxk_sim::Entity;
use hxk_sim::Game;
use serde::Deserialize;

/// `game/create`: the dispatcher has already authenticated the owner.
#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    pub user: ID<Owner>,
}

/// `game/get` and `game/subscribe`.
#[derive(Debug, Deserialize)]
pub struct GameRequest {
    pub game: ID<Game>,
}

/// `game/target`: fan a focal position to the selected entities.
/// The position arrives in its wire form `"q,r"`.
#[derive(Debug, Deserialize)]
pub struct TargetRequest {
    pub game: ID<Game>,
    pub selected: Vec<ID<Entity>>,
    pub position: String,
}

/// `game/command`: one key/value pair for one entity's behaviors.
#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub game: ID<Game>,
    pub target: ID<Entity>,
    pub key: String,
    #[serde(default)]
    pub value: String,
}

/// `game/query`: list one entity's command affordances.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub game: ID<Game>,
    pub target: ID<Entity>,
}
