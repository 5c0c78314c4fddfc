use crate::entity::Entity;
use crate::resource::Resource;
use hxk_core::*;
use hxk_grid::Position;
use serde::Serialize;
use serde_json::Value;

/// Messages broadcast to every subscriber of a game.
///
/// Serialization produces the wire shapes directly: a `type` tag plus the
/// variant fields. Within a tick, events for a given entity are globally
/// ordered; the add precedes any update and the remove is terminal.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A new entity became live.
    #[serde(rename = "entity/add")]
    EntityAdd { entity: Value },
    /// Coalesced batch of per-entity refreshes, emitted after all entity
    /// ticks in a simulation tick.
    #[serde(rename = "entity/update")]
    EntityUpdate { entities: Vec<Value> },
    /// Terminal event for an entity, carrying its death visual.
    #[serde(rename = "entity/remove")]
    EntityRemove {
        id: ID<Entity>,
        visual: Option<String>,
    },
    /// One entity struck another.
    #[serde(rename = "entity/attack")]
    EntityAttack {
        source: ID<Entity>,
        target: ID<Entity>,
        visual: Option<String>,
    },
    /// An entity was pointed at a position by its owner.
    #[serde(rename = "entity/target")]
    EntityTarget {
        source: ID<Entity>,
        target: Position,
    },
    /// Production progress changed on a queued-production behavior.
    #[serde(rename = "entity/progress")]
    EntityProgress {
        parent: ID<Entity>,
        event: String,
        queue: usize,
        progress: Seconds,
        duration: Seconds,
    },
    /// Signed change to one resource pool.
    #[serde(rename = "resource")]
    ResourceDelta {
        resource_type: Resource,
        amount: Quantity,
    },
    /// The revealed area grew; carries the serialized boundary rings.
    #[serde(rename = "reveal")]
    Reveal { area: Vec<Vec<[f64; 2]>> },
    /// The game reached a terminal state.
    #[serde(rename = "game/end")]
    GameEnd { success: bool, label: String },
}

impl Event {
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).expect("serialize event")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_carry_type_tags() {
        let event = Event::ResourceDelta {
            resource_type: Resource::Gold,
            amount: -25.0,
        };
        let json = event.to_json();
        assert_eq!(json["type"], "resource");
        assert_eq!(json["resource_type"], "gold");
        assert_eq!(json["amount"], -25.0);
    }
    #[test]
    fn remove_event_shape() {
        let id = ID::<Entity>::default();
        let event = Event::EntityRemove {
            id,
            visual: Some("collapse".into()),
        };
        let json = event.to_json();
        assert_eq!(json["type"], "entity/remove");
        assert_eq!(json["id"], id.to_string());
        assert_eq!(json["visual"], "collapse");
    }
    #[test]
    fn target_event_carries_axial_pair() {
        let event = Event::EntityTarget {
            source: ID::default(),
            target: Position::new(3, -1),
        };
        let json = event.to_json();
        assert_eq!(json["type"], "entity/target");
        assert_eq!(json["target"]["q"], 3);
        assert_eq!(json["target"]["r"], -1);
    }
    #[test]
    fn end_event_shape() {
        let json = Event::GameEnd {
            success: true,
            label: "Portal".into(),
        }
        .to_json();
        assert_eq!(json["type"], "game/end");
        assert_eq!(json["success"], true);
        assert_eq!(json["label"], "Portal");
    }
}
