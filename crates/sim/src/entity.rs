use crate::behavior::Behavior;
use crate::game::Game;
use crate::resource::Resource;
use hxk_core::*;
use hxk_grid::Position;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;

/// Which side an entity fights for.
#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Enemy,
    #[default]
    Neutral,
    Player,
}

impl Alignment {
    /// True when entities of these alignments fight each other.
    pub fn hostile(self, other: Alignment) -> bool {
        matches!(
            (self, other),
            (Alignment::Player, Alignment::Enemy) | (Alignment::Enemy, Alignment::Player)
        )
    }
}

/// Entity category bitmask. Exactly one bit is set on a live entity.
#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag(pub u8);

impl Tag {
    pub const UNIT: Tag = Tag(1);
    pub const RESOURCE: Tag = Tag(2);
    pub const STRUCTURE: Tag = Tag(4);

    pub const fn has(self, tag: Tag) -> bool {
        self.0 & tag.0 != 0
    }
    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl std::ops::BitOr for Tag {
    type Output = Tag;
    fn bitor(self, other: Tag) -> Tag {
        Tag(self.0 | other.0)
    }
}

/// Render descriptor forwarded verbatim to clients.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Visual {
    pub images: Vec<String>,
    pub tint: Option<u32>,
    pub size: i32,
    pub death_visual: Option<String>,
}

/// A single simulated thing on the grid: unit, resource node, or structure.
///
/// Catalog prototypes carry `template = true` and are never inserted into a
/// game; live instances are deep copies with a fresh id. The `removed`
/// tombstone is the single death signal: whoever holds the entity checked
/// out finalizes removal when it is set.
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: ID<Entity>,
    pub name: String,
    pub position: Position,
    pub hp: Quantity,
    pub max_hp: Quantity,
    pub alignment: Alignment,
    pub tags: Tag,
    pub resource_type: Option<Resource>,
    pub vision_size: i32,
    pub visual: Visual,
    pub template: bool,
    pub removed: bool,
    pub time_until_update: Seconds,
    pub behaviors: Vec<Behavior>,
}

impl Unique for Entity {
    fn id(&self) -> ID<Entity> {
        self.id
    }
}

impl Entity {
    /// Construct a catalog prototype. Prototypes are never ticked and never
    /// enter a game's tables; they exist to be instantiated.
    pub fn prototype(
        name: impl Into<String>,
        max_hp: Quantity,
        tags: Tag,
        resource_type: Option<Resource>,
        vision_size: i32,
        visual: Visual,
        behaviors: Vec<Behavior>,
    ) -> Self {
        Self {
            id: ID::default(),
            name: name.into(),
            position: Position::ORIGIN,
            hp: max_hp,
            max_hp,
            alignment: Alignment::Neutral,
            tags,
            resource_type,
            vision_size,
            visual,
            template: true,
            removed: false,
            time_until_update: 0.0,
            behaviors,
        }
    }
    /// Deep-copy this prototype into a live instance.
    pub fn instantiate(&self, position: Position, alignment: Alignment) -> Self {
        let mut entity = self.clone();
        entity.id = ID::default();
        entity.template = false;
        entity.removed = false;
        entity.hp = entity.max_hp;
        entity.position = position;
        entity.alignment = alignment;
        entity
    }
    /// Wire form; internal scheduling state and behaviors stay private.
    pub fn serialized(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "position": self.position,
            "hp": self.hp,
            "max_hp": self.max_hp,
            "alignment": self.alignment,
            "tags": self.tags,
            "resource_type": self.resource_type,
            "vision": self.vision_size,
            "visual": self.visual,
        })
    }

    /// Advance this entity by one tick: restagger the update countdown,
    /// then run every behavior in stored order. Stops early if a behavior
    /// removed the entity.
    pub fn on_tick(&mut self, game: &mut Game, delta: Seconds) -> Result<()> {
        self.time_until_update -= delta;
        if self.time_until_update <= 0.0 {
            game.queue_update(self.id);
        }
        self.each_behavior(|behavior, owner| behavior.on_tick(owner, game, delta))
    }
    /// Fan a new focal position to every behavior.
    pub fn on_target(&mut self, game: &mut Game, position: Position) {
        let _ = self.each_behavior(|behavior, owner| {
            behavior.on_target(owner, game, position);
            Ok(())
        });
    }
    /// Fan a command to every behavior. Each behavior matches its own keys
    /// and ignores the rest; per-behavior failures are logged so one bad
    /// command cannot poison the chain, and the first failure is returned
    /// to the caller.
    pub fn on_command(&mut self, game: &mut Game, key: &str, value: &str) -> Result<()> {
        let mut first = None;
        for index in 0..self.behaviors.len() {
            let mut behavior = std::mem::replace(&mut self.behaviors[index], Behavior::detached());
            let outcome = behavior.on_command(self, game, key, value);
            self.behaviors[index] = behavior;
            if let Err(error) = outcome {
                log::warn!("[entity {}] command {} failed: {}", self.id, key, error);
                first.get_or_insert(error);
            }
            if self.removed {
                break;
            }
        }
        match first {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
    /// Collect UI affordance descriptors from every behavior. Pure.
    pub fn on_query(&self, game: &Game) -> Vec<(String, Value)> {
        self.behaviors
            .iter()
            .flat_map(|behavior| behavior.on_query(self, game))
            .collect()
    }
    /// Fan a heal to every behavior.
    pub fn on_heal(&mut self, game: &mut Game, amount: Quantity) {
        let _ = self.each_behavior(|behavior, owner| {
            behavior.on_heal(owner, game, amount);
            Ok(())
        });
    }
    /// Fan creation to every behavior.
    pub fn on_create(&mut self, game: &mut Game) {
        let _ = self.each_behavior(|behavior, owner| {
            behavior.on_create(owner, game);
            Ok(())
        });
    }

    /// Run a hook over each behavior in stored order. The running behavior
    /// is swapped out for a placeholder so it can reach its siblings
    /// through `self`; errors abandon the remaining behaviors.
    fn each_behavior(
        &mut self,
        mut hook: impl FnMut(&mut Behavior, &mut Entity) -> Result<()>,
    ) -> Result<()> {
        for index in 0..self.behaviors.len() {
            let mut behavior = std::mem::replace(&mut self.behaviors[index], Behavior::detached());
            let outcome = hook(&mut behavior, self);
            self.behaviors[index] = behavior;
            outcome?;
            if self.removed {
                break;
            }
        }
        Ok(())
    }

    /// First behavior offering movement, if any.
    pub fn pathing_mut(&mut self) -> Option<&mut crate::behavior::Pathing> {
        self.behaviors
            .iter_mut()
            .find_map(|behavior| behavior.kind.pathing_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prototype() -> Entity {
        Entity::prototype(
            "Sentry",
            120.0,
            Tag::UNIT,
            None,
            VISION_DEFAULT,
            Visual {
                images: vec!["sentry.png".into()],
                tint: Some(0xFF8800),
                size: 1,
                death_visual: Some("rubble".into()),
            },
            Vec::new(),
        )
    }

    #[test]
    fn tags_are_bitmasks() {
        let tag = Tag::UNIT | Tag::STRUCTURE;
        assert!(tag.has(Tag::UNIT));
        assert!(tag.has(Tag::STRUCTURE));
        assert!(!tag.has(Tag::RESOURCE));
        assert_eq!(tag.bits(), 5);
    }
    #[test]
    fn hostility_is_mutual_and_spares_neutrals() {
        assert!(Alignment::Player.hostile(Alignment::Enemy));
        assert!(Alignment::Enemy.hostile(Alignment::Player));
        assert!(!Alignment::Player.hostile(Alignment::Player));
        assert!(!Alignment::Enemy.hostile(Alignment::Neutral));
        assert!(!Alignment::Neutral.hostile(Alignment::Player));
    }
    #[test]
    fn instantiate_deep_copies_with_fresh_identity() {
        let proto = prototype();
        let live = proto.instantiate(Position::new(2, -1), Alignment::Player);
        assert_ne!(live.id, proto.id);
        assert!(!live.template);
        assert_eq!(live.hp, live.max_hp);
        assert_eq!(live.position, Position::new(2, -1));
        assert_eq!(live.alignment, Alignment::Player);
        assert_eq!(live.name, proto.name);
    }
    #[test]
    fn serialization_is_stable_across_instantiation() {
        let proto = prototype();
        let a = proto.instantiate(Position::new(1, 1), Alignment::Player);
        let b = a.instantiate(Position::new(1, 1), Alignment::Player);
        let mut left = a.serialized();
        let mut right = b.serialized();
        // identical apart from the fresh id
        left["id"] = Value::Null;
        right["id"] = Value::Null;
        assert_eq!(left, right);
    }
    #[test]
    fn serialization_excludes_internals() {
        let live = prototype().instantiate(Position::ORIGIN, Alignment::Player);
        let json = live.serialized();
        assert!(json.get("time_until_update").is_none());
        assert!(json.get("behaviors").is_none());
        assert!(json.get("template").is_none());
        assert!(json.get("removed").is_none());
        assert_eq!(json["visual"]["death_visual"], "rubble");
    }
}
