use crate::entity::Alignment;
use crate::entity::Entity;
use crate::entity::Tag;
use crate::event::Event;
use crate::resource::Pools;
use crate::resource::Resource;
use crate::subscriber::Subscriber;
use crate::vision::Vision;
use hxk_core::*;
use hxk_grid::Position;
use hxk_grid::astar;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use std::collections::HashMap;
use std::collections::HashSet;
use std::collections::VecDeque;
use std::sync::Arc;

/// One-way game lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    Lobby,
    Active,
    Finished,
}

/// Catalog prototypes by name. Shared read-only across games.
#[derive(Debug, Default, Clone)]
pub struct Templates {
    inner: HashMap<String, Entity>,
}

impl Templates {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.inner.get(name)
    }
    pub fn insert(&mut self, prototype: Entity) {
        self.inner.insert(prototype.name.clone(), prototype);
    }
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.inner.keys().map(String::as_str)
    }
    pub fn prototypes(&self) -> impl Iterator<Item = &Entity> {
        self.inner.values()
    }
    pub fn len(&self) -> usize {
        self.inner.len()
    }
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// One independent authoritative simulation.
///
/// All mutation happens on the single scheduler worker; every mutator
/// appends events to the outbox, and the worker flushes the outbox to
/// subscribers at the end of each tick and after each dispatched command.
pub struct Game {
    pub id: ID<Game>,
    pub owner: ID<Owner>,
    pub state: Lifecycle,
    pub inactive: bool,
    pub time_since_active: Seconds,
    pub runtime: Seconds,
    pub pools: Pools,
    pub entities: HashMap<ID<Entity>, Entity>,
    pub units: HashSet<ID<Entity>>,
    pub resources: HashSet<ID<Entity>>,
    pub structures: HashSet<ID<Entity>>,
    pub map: HashMap<Position, ID<Entity>>,
    pub subscribers: Vec<Box<dyn Subscriber>>,
    pub vision: Vision,
    pub fortress: Option<ID<Entity>>,
    pub templates: Arc<Templates>,
    pub rng: SmallRng,
    pub(crate) queued: HashSet<ID<Entity>>,
    pub(crate) outbox: VecDeque<Event>,
}

impl Unique for Game {
    fn id(&self) -> ID<Game> {
        self.id
    }
}

impl Game {
    pub fn new(owner: ID<Owner>, templates: Arc<Templates>, rng: SmallRng) -> Self {
        Self {
            id: ID::default(),
            owner,
            state: Lifecycle::Active,
            inactive: false,
            time_since_active: 0.0,
            runtime: 0.0,
            pools: Pools::starting(),
            entities: HashMap::new(),
            units: HashSet::new(),
            resources: HashSet::new(),
            structures: HashSet::new(),
            map: HashMap::new(),
            subscribers: Vec::new(),
            vision: Vision::new(),
            fortress: None,
            templates,
            rng,
            queued: HashSet::new(),
            outbox: VecDeque::new(),
        }
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------
    /// A live entity by id; absent once removed.
    pub fn entity(&self, id: ID<Entity>) -> Option<&Entity> {
        self.entities.get(&id)
    }
    /// Every live entity, in no particular order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }
    /// The nearest entity hostile to the given alignment.
    pub fn nearest_hostile(
        &self,
        from: Position,
        alignment: Alignment,
    ) -> Option<(ID<Entity>, Position)> {
        self.entities()
            .filter(|e| e.alignment.hostile(alignment))
            .min_by_key(|e| e.position.distance(from))
            .map(|e| (e.id, e.position))
    }
    /// The nearest resource node.
    pub fn nearest_resource(&self, from: Position) -> Option<&Entity> {
        self.entities()
            .filter(|e| e.tags.has(Tag::RESOURCE))
            .min_by_key(|e| e.position.distance(from))
    }
    /// First unoccupied cell found flooding outward from `origin`.
    pub fn free_position_near(&mut self, origin: Position) -> Option<Position> {
        let rng = SmallRng::from_rng(&mut self.rng);
        origin
            .flood(rng)
            .take(SPAWN_SEARCH_LIMIT)
            .find(|cell| !self.map.contains_key(cell))
    }
    /// Weighted A* over the occupancy map.
    pub fn plan_path(&mut self, start: Position, target: Position) -> Vec<Position> {
        let map = &self.map;
        let rng = &mut self.rng;
        astar(
            start,
            target,
            |cell| map.contains_key(cell),
            PATH_EXPANSION_LIMIT,
            rng,
        )
    }

    // ------------------------------------------------------------------
    // Entity lifecycle
    // ------------------------------------------------------------------
    /// Instantiate a template at a free cell and publish the new entity.
    pub fn add_entity(
        &mut self,
        name: &str,
        position: Position,
        alignment: Alignment,
    ) -> Result<ID<Entity>> {
        self.add_entity_with(name, position, alignment, |_| {})
    }
    /// As [`Game::add_entity`], applying `seed` to the instance before it
    /// is published.
    pub fn add_entity_with(
        &mut self,
        name: &str,
        position: Position,
        alignment: Alignment,
        seed: impl FnOnce(&mut Entity),
    ) -> Result<ID<Entity>> {
        if self.map.contains_key(&position) {
            return Err(Error::invariant(format!("cell {} is occupied", position)));
        }
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| Error::client(format!("unknown template '{}'", name)))?;
        let mut entity = template.instantiate(position, alignment);
        seed(&mut entity);
        let id = entity.id;
        self.map.insert(position, id);
        if entity.tags.has(Tag::UNIT) {
            self.units.insert(id);
        }
        if entity.tags.has(Tag::RESOURCE) {
            self.resources.insert(id);
        }
        if entity.tags.has(Tag::STRUCTURE) {
            self.structures.insert(id);
        }
        self.entities.insert(id, entity);
        self.on_new_entity(id);
        Ok(id)
    }
    /// Publication hook: behavior creation, the add broadcast, vision.
    /// Creation hooks run first so the broadcast carries their effects.
    fn on_new_entity(&mut self, id: ID<Entity>) {
        self.with_entity(id, |entity, game| entity.on_create(game));
        let Some(entity) = self.entities.get(&id) else {
            return;
        };
        let event = Event::EntityAdd {
            entity: entity.serialized(),
        };
        let sight = (entity.alignment == Alignment::Player)
            .then(|| (entity.position, entity.vision_size));
        self.broadcast(event);
        if let Some((center, radius)) = sight {
            self.reveal_around(center, radius);
        }
    }
    /// Claim an extra occupancy cell for a multi-cell footprint.
    pub fn claim_cell(&mut self, position: Position, id: ID<Entity>) -> Result<()> {
        if self.map.contains_key(&position) {
            return Err(Error::invariant(format!("cell {} is occupied", position)));
        }
        self.map.insert(position, id);
        Ok(())
    }
    /// Move a checked-out entity to an adjacent free cell, re-indexing the
    /// occupancy map and extending vision for player entities.
    pub fn move_entity(&mut self, entity: &mut Entity, to: Position) -> Result<()> {
        if self.map.contains_key(&to) {
            return Err(Error::invariant(format!("cell {} is occupied", to)));
        }
        self.map.remove(&entity.position);
        self.map.insert(to, entity.id);
        entity.position = to;
        if entity.alignment == Alignment::Player {
            self.reveal_around(to, entity.vision_size);
        }
        self.queued.insert(entity.id);
        Ok(())
    }
    /// Remove an entity: tombstone, clear indices, removal hooks, terminal
    /// event.
    pub fn remove_entity(&mut self, id: ID<Entity>) {
        if let Some(mut entity) = self.entities.remove(&id) {
            entity.removed = true;
            self.bury(entity);
        }
    }
    /// The single finalization path for removed entities. Callers that
    /// hold an entity checked out mark `removed` instead of calling
    /// [`Game::remove_entity`]; the checkout helper routes here.
    fn bury(&mut self, mut entity: Entity) {
        let id = entity.id;
        self.map.retain(|_, occupant| *occupant != id);
        self.units.remove(&id);
        self.resources.remove(&id);
        self.structures.remove(&id);
        self.queued.remove(&id);
        if self.fortress == Some(id) {
            self.fortress = None;
        }
        let mut behaviors = std::mem::take(&mut entity.behaviors);
        for behavior in &mut behaviors {
            behavior.on_remove(&mut entity, self);
        }
        entity.behaviors = behaviors;
        self.broadcast(Event::EntityRemove {
            id,
            visual: entity.visual.death_visual.clone(),
        });
    }
    /// Check an entity out of the table, run `f` with both the entity and
    /// the game mutable, then either restore it or finalize its removal.
    /// Returns `None` when the entity is absent (removed, or already
    /// checked out further up the stack).
    pub fn with_entity<R>(
        &mut self,
        id: ID<Entity>,
        f: impl FnOnce(&mut Entity, &mut Game) -> R,
    ) -> Option<R> {
        let mut entity = self.entities.remove(&id)?;
        let result = f(&mut entity, self);
        if entity.removed {
            self.bury(entity);
        } else {
            self.entities.insert(id, entity);
        }
        Some(result)
    }

    // ------------------------------------------------------------------
    // Combat & healing
    // ------------------------------------------------------------------
    /// Strike `target` for `amount`, clamping at zero and removing the
    /// target in the same tick when it dies.
    pub fn attack(
        &mut self,
        source: ID<Entity>,
        target: ID<Entity>,
        amount: Quantity,
        visual: Option<String>,
    ) {
        self.broadcast(Event::EntityAttack {
            source,
            target,
            visual,
        });
        self.with_entity(target, |entity, game| {
            entity.hp = (entity.hp - amount).max(0.0);
            if entity.hp <= 0.0 {
                entity.removed = true;
            } else {
                game.queued.insert(entity.id);
            }
        });
    }
    /// Heal `target` up to its maximum, fanning the heal to its behaviors
    /// so heal-to-complete states can observe it.
    pub fn heal(&mut self, target: ID<Entity>, amount: Quantity) {
        self.with_entity(target, |entity, game| {
            if entity.hp >= entity.max_hp {
                return;
            }
            entity.hp = (entity.hp + amount).min(entity.max_hp);
            game.queued.insert(entity.id);
            entity.on_heal(game, amount);
        });
    }

    // ------------------------------------------------------------------
    // Resource accounting
    // ------------------------------------------------------------------
    /// Two-phase spend: verify every cost, then debit every cost. Any
    /// single shortfall fails the whole operation without debit.
    pub fn spend(&mut self, costs: &[(Resource, Quantity)]) -> Result<()> {
        for (resource, amount) in costs {
            if self.pools.get(*resource) < *amount {
                return Err(Error::client(format!(
                    "insufficient {}: {} needed, {} held",
                    resource,
                    amount,
                    self.pools.get(*resource)
                )));
            }
        }
        for (resource, amount) in costs {
            self.pools.add(*resource, -amount);
            self.broadcast(Event::ResourceDelta {
                resource_type: *resource,
                amount: -amount,
            });
        }
        Ok(())
    }
    /// Unconditional credit, always broadcasting the delta.
    pub fn add_resource(&mut self, resource: Resource, amount: Quantity) {
        self.pools.add(resource, amount);
        self.broadcast(Event::ResourceDelta {
            resource_type: resource,
            amount,
        });
    }

    // ------------------------------------------------------------------
    // Vision
    // ------------------------------------------------------------------
    /// Union a vision hexagon into the revealed area, broadcasting the new
    /// boundary on growth.
    pub fn reveal_around(&mut self, center: Position, radius: i32) {
        if self.vision.reveal(center, radius) {
            let event = Event::Reveal {
                area: self.vision.outline(),
            };
            self.broadcast(event);
        }
    }

    // ------------------------------------------------------------------
    // Command surface
    // ------------------------------------------------------------------
    /// Fan a new focal position to each player-aligned selected entity.
    pub fn target(&mut self, selected: &[ID<Entity>], position: Position) {
        for &id in selected {
            self.with_entity(id, |entity, game| {
                if entity.alignment != Alignment::Player {
                    return;
                }
                entity.on_target(game, position);
                game.broadcast(Event::EntityTarget {
                    source: entity.id,
                    target: position,
                });
            });
        }
    }
    /// Fan a command to one entity's behaviors.
    pub fn command(&mut self, target: ID<Entity>, key: &str, value: &str) -> Result<()> {
        self.with_entity(target, |entity, game| entity.on_command(game, key, value))
            .ok_or_else(|| Error::client("unknown entity"))?
    }
    /// Collect one entity's UI affordances. Pure.
    pub fn query(&self, target: ID<Entity>) -> Result<Vec<(String, Value)>> {
        self.entity(target)
            .map(|entity| entity.on_query(self))
            .ok_or_else(|| Error::client("unknown entity"))
    }

    // ------------------------------------------------------------------
    // Termination
    // ------------------------------------------------------------------
    /// One-way transition to Finished; ticks keep serving subscribers
    /// until the idle destroy.
    pub fn finish(&mut self, success: bool, label: &str) {
        if self.state == Lifecycle::Finished {
            return;
        }
        self.state = Lifecycle::Finished;
        log::info!(
            "[game {}] finished: success={} label={}",
            self.id,
            success,
            label
        );
        self.broadcast(Event::GameEnd {
            success,
            label: label.to_string(),
        });
    }

    // ------------------------------------------------------------------
    // Ticking
    // ------------------------------------------------------------------
    /// Advance the game by one scheduler tick. Returns true when the game
    /// has been idle long enough to be destroyed.
    pub fn on_tick(&mut self, delta: Seconds) -> bool {
        self.runtime += delta;
        if self.inactive && !self.subscribers.is_empty() {
            self.inactive = false;
        }
        if self.inactive {
            self.time_since_active += delta;
            return self.time_since_active >= IDLE_TIMEOUT;
        }
        if self.subscribers.is_empty() {
            self.inactive = true;
            self.time_since_active = 0.0;
            return false;
        }
        if self.state == Lifecycle::Active {
            self.on_active_tick(delta);
        }
        false
    }
    /// Tick every entity over a snapshot of ids, then flush the coalesced
    /// update batch. One misbehaving entity cannot stall its game.
    pub fn on_active_tick(&mut self, delta: Seconds) {
        let mut ids: Vec<ID<Entity>> = self.entities.keys().copied().collect();
        ids.sort();
        for id in ids {
            if let Some(Err(error)) = self.with_entity(id, |entity, game| entity.on_tick(game, delta))
            {
                log::error!("[game {}] entity {} tick failed: {}", self.id, id, error);
            }
        }
        self.flush_updates();
    }
    /// Mark an entity for inclusion in the next coalesced update batch.
    pub fn queue_update(&mut self, id: ID<Entity>) {
        self.queued.insert(id);
    }
    /// Emit the queued per-entity refreshes as one batch, restaggering
    /// each flushed entity's update countdown.
    fn flush_updates(&mut self) {
        if self.queued.is_empty() {
            return;
        }
        let mut ids: Vec<ID<Entity>> = self.queued.drain().collect();
        ids.sort();
        let mut entities = Vec::new();
        for id in ids {
            let stagger = self.rng.random_range(UPDATE_STAGGER_MIN..UPDATE_STAGGER_MAX);
            if let Some(entity) = self.entities.get_mut(&id) {
                entity.time_until_update = stagger;
                entities.push(entity.serialized());
            }
        }
        if !entities.is_empty() {
            self.broadcast(Event::EntityUpdate { entities });
        }
    }

    // ------------------------------------------------------------------
    // Broadcast
    // ------------------------------------------------------------------
    /// Append an event to the outbox; the worker flushes at tick and
    /// command boundaries.
    pub fn broadcast(&mut self, event: Event) {
        self.outbox.push_back(event);
    }
    /// Drain the outbox to every subscriber, awaiting each send in turn.
    /// A failed subscriber is dropped after the broadcast that failed it,
    /// never mid-iteration.
    pub async fn flush(&mut self) {
        while let Some(event) = self.outbox.pop_front() {
            let message = event.to_json();
            let mut failed = Vec::new();
            for (index, subscriber) in self.subscribers.iter_mut().enumerate() {
                if subscriber.send(&message).await.is_err() {
                    failed.push(index);
                }
            }
            for index in failed.into_iter().rev() {
                self.subscribers.swap_remove(index);
                log::debug!("[game {}] dropped unreachable subscriber", self.id);
            }
        }
    }
    /// Register a subscriber sink.
    pub fn subscribe(&mut self, subscriber: Box<dyn Subscriber>) {
        self.subscribers.push(subscriber);
    }

    // ------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------
    /// Snapshot for `game/get`. Internal indices, the subscriber set, the
    /// update queue, and the occupancy map itself are not serialized.
    pub fn serialized(&self) -> Value {
        let entities: serde_json::Map<String, Value> = self
            .entities
            .values()
            .map(|entity| (entity.id.to_string(), entity.serialized()))
            .collect();
        json!({
            "id": self.id,
            "owner": self.owner,
            "state": self.state,
            "resources": self.pools,
            "entities": entities,
            "revealed_area": self.vision.outline(),
            "runtime": self.runtime,
        })
    }
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("entities", &self.entities.len())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
