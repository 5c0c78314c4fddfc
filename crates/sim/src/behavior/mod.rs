//! Composable per-entity logic.
//!
//! A [`Behavior`] is a cooldown-gated unit of logic attached to an entity;
//! the [`Kind`] sum carries the concrete variants. Behaviors run in stored
//! order each tick. Movers run their pathing phase first and fall through
//! to their own logic only when no step was taken, which is the explicit
//! rendition of layered move → decide → act composition.
mod attack;
mod build;
mod construction;
mod objective;
mod pathing;
mod repair;
mod seek;
mod summon;
mod train;
mod transmute;
mod worker;

pub use attack::*;
pub use build::*;
pub use construction::*;
pub use objective::*;
pub use pathing::*;
pub use repair::*;
pub use seek::*;
pub use summon::*;
pub use train::*;
pub use transmute::*;
pub use worker::*;

use crate::entity::Entity;
use crate::game::Game;
use hxk_core::*;
use hxk_grid::Position;
use rand::Rng;
use rand::rngs::SmallRng;
use serde_json::Value;

/// Activation countdown shared by every behavior.
///
/// The reload is jittered so identical entities drift apart, and failed
/// activations reload at a fraction of the cooldown to retry sooner.
/// A zero cooldown reloads to zero and therefore activates at most once
/// per tick.
#[derive(Debug, Clone)]
pub struct Clock {
    pub cooldown: Seconds,
    pub countdown: Seconds,
}

impl Clock {
    pub fn new(cooldown: Seconds) -> Self {
        Self {
            cooldown,
            countdown: cooldown,
        }
    }
    /// Advance by `delta`; true when the countdown has elapsed.
    pub fn ready(&mut self, delta: Seconds) -> bool {
        self.countdown -= delta;
        self.countdown <= 0.0
    }
    /// Reload after an activation attempt.
    pub fn reload(&mut self, activated: bool, rng: &mut SmallRng) {
        let jitter = rng.random_range(1.0 - COOLDOWN_JITTER..=1.0 + COOLDOWN_JITTER);
        let scale = if activated { 1.0 } else { RETRY_SCALE };
        self.countdown = self.cooldown * jitter * scale;
    }
}

/// The concrete behavior variants.
#[derive(Debug, Clone)]
pub enum Kind {
    Attack(Attack),
    Summon(Summon),
    SummonPool(SummonPool),
    Empower(Empower),
    Worker(Worker),
    SeekEnemy(SeekEnemy),
    SeekFortress(SeekFortress),
    Transmute(Transmute),
    Build(Build),
    Train(Train),
    Repair(Repair),
    UnderConstruction(UnderConstruction),
    Essential(Essential),
    KillObjective(KillObjective),
    Pathing(Pathing),
    /// Placeholder occupying a slot while its behavior is running, so the
    /// running behavior can reach its siblings through the owning entity.
    Detached,
}

impl Kind {
    /// Mutable strength, for variants that carry one.
    pub fn strength_mut(&mut self) -> Option<&mut Quantity> {
        match self {
            Kind::SummonPool(pool) => Some(&mut pool.strength),
            Kind::Empower(empower) => Some(&mut empower.strength),
            _ => None,
        }
    }
    /// Mutable pathing state, for variants that move their owner.
    pub fn pathing_mut(&mut self) -> Option<&mut Pathing> {
        match self {
            Kind::Pathing(pathing) => Some(pathing),
            Kind::Worker(worker) => Some(&mut worker.path),
            Kind::SeekEnemy(seek) => Some(&mut seek.path),
            Kind::SeekFortress(seek) => Some(&mut seek.path),
            _ => None,
        }
    }
}

/// A stateful unit of logic attached to an entity.
#[derive(Debug, Clone)]
pub struct Behavior {
    pub label: Option<String>,
    pub clock: Clock,
    pub kind: Kind,
}

impl Behavior {
    pub fn new(kind: Kind, cooldown: Seconds) -> Self {
        Self {
            label: None,
            clock: Clock::new(cooldown),
            kind,
        }
    }
    pub fn labeled(kind: Kind, cooldown: Seconds, label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            clock: Clock::new(cooldown),
            kind,
        }
    }
    /// The placeholder left in an entity's list while a behavior runs.
    pub fn detached() -> Self {
        Self::new(Kind::Detached, 0.0)
    }
    fn label_or<'a>(&'a self, owner: &'a Entity) -> &'a str {
        self.label.as_deref().unwrap_or(&owner.name)
    }

    /// Called once when the owning entity becomes live.
    pub fn on_create(&mut self, owner: &mut Entity, game: &mut Game) {
        match &mut self.kind {
            Kind::Essential(essential) => essential.create(owner, game),
            Kind::UnderConstruction(construction) => construction.create(owner, game),
            _ => {}
        }
    }
    /// Advance by one tick. The default drives the activation clock;
    /// production behaviors override the tick to run progress counters.
    pub fn on_tick(&mut self, owner: &mut Entity, game: &mut Game, delta: Seconds) -> Result<()> {
        if let Kind::Train(train) = &mut self.kind {
            return train.tick(owner, game, delta);
        }
        if self.clock.ready(delta) {
            let activated = self.on_activate(owner, game)?;
            self.clock.reload(activated, &mut game.rng);
        }
        Ok(())
    }
    /// One activation attempt; true when the behavior did useful work.
    pub fn on_activate(&mut self, owner: &mut Entity, game: &mut Game) -> Result<bool> {
        match &mut self.kind {
            Kind::Attack(attack) => attack.activate(owner, game),
            Kind::Summon(summon) => summon.activate(owner, game),
            Kind::SummonPool(pool) => pool.activate(owner, game),
            Kind::Empower(empower) => empower.activate(owner, game),
            Kind::Worker(worker) => worker.activate(owner, game),
            Kind::SeekEnemy(seek) => seek.activate(owner, game),
            Kind::SeekFortress(seek) => seek.activate(owner, game),
            Kind::Transmute(transmute) => transmute.activate(owner, game),
            Kind::Repair(repair) => repair.activate(owner, game),
            Kind::Pathing(pathing) => pathing.step(owner, game),
            _ => Ok(false),
        }
    }
    /// Called as the owning entity is removed.
    pub fn on_remove(&mut self, owner: &mut Entity, game: &mut Game) {
        match &mut self.kind {
            Kind::Essential(_) => {
                let label = self.label_or(owner).to_string();
                game.finish(false, &label);
            }
            Kind::KillObjective(_) => {
                let label = self.label_or(owner).to_string();
                game.finish(true, &label);
            }
            Kind::UnderConstruction(construction) => construction.remove(owner, game),
            _ => {}
        }
    }
    /// A new focal position arrived from the owning player.
    pub fn on_target(&mut self, owner: &mut Entity, game: &mut Game, position: Position) {
        match &mut self.kind {
            Kind::Attack(attack) => attack.target(owner, game, position),
            Kind::Worker(worker) => worker.target(owner, game, position),
            Kind::SeekEnemy(seek) => seek.target(owner, game, position),
            Kind::Pathing(pathing) => pathing.target(owner, game, position),
            _ => {}
        }
    }
    /// A command key/value pair arrived. Unknown keys are ignored.
    pub fn on_command(
        &mut self,
        owner: &mut Entity,
        game: &mut Game,
        key: &str,
        value: &str,
    ) -> Result<()> {
        match &mut self.kind {
            Kind::Build(build) => build.command(owner, game, key, value),
            Kind::Train(train) => train.command(owner, game, key, value),
            Kind::Transmute(transmute) => transmute.command(owner, game, key, value),
            _ => Ok(()),
        }
    }
    /// UI affordances offered by this behavior. Pure.
    pub fn on_query(&self, owner: &Entity, game: &Game) -> Vec<(String, Value)> {
        match &self.kind {
            Kind::Build(build) => build.query(owner, game),
            Kind::Train(train) => train.query(owner, game),
            Kind::Transmute(transmute) => transmute.query(owner, game),
            _ => Vec::new(),
        }
    }
    /// The owning entity was healed.
    pub fn on_heal(&mut self, owner: &mut Entity, game: &mut Game, amount: Quantity) {
        if let Kind::UnderConstruction(construction) = &mut self.kind {
            construction.heal(owner, game, amount);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn clock_counts_down_and_reloads_with_jitter() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut clock = Clock::new(10.0);
        assert!(!clock.ready(4.0));
        assert!(!clock.ready(4.0));
        assert!(clock.ready(4.0));
        clock.reload(true, &mut rng);
        assert!(clock.countdown >= 10.0 * (1.0 - COOLDOWN_JITTER));
        assert!(clock.countdown <= 10.0 * (1.0 + COOLDOWN_JITTER));
    }
    #[test]
    fn failed_activation_retries_sooner() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut clock = Clock::new(10.0);
        clock.reload(false, &mut rng);
        assert!(clock.countdown <= 10.0 * RETRY_SCALE * (1.0 + COOLDOWN_JITTER));
        assert!(clock.countdown >= 10.0 * RETRY_SCALE * (1.0 - COOLDOWN_JITTER));
    }
    #[test]
    fn zero_cooldown_reloads_to_zero() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut clock = Clock::new(0.0);
        assert!(clock.ready(0.1));
        clock.reload(true, &mut rng);
        assert_eq!(clock.countdown, 0.0);
    }
}
