use crate::entity::Entity;
use crate::event::Event;
use crate::game::Game;
use crate::resource::Resource;
use hxk_core::*;
use serde_json::Value;
use serde_json::json;
use std::collections::VecDeque;

/// One unit this trainer can produce.
#[derive(Debug, Clone)]
pub struct TrainOption {
    pub name: String,
    pub duration: Seconds,
    pub costs: Vec<(Resource, Quantity)>,
}

/// Queued unit production.
///
/// `train/<unit>` spends the costs and enqueues a slot; progress advances
/// by wall time while the queue is non-empty, and each time it crosses the
/// front slot's duration one unit spawns next to the trainer.
/// `cancel/<unit>` dequeues the most recent matching slot and refunds half
/// of each cost. Progress transitions broadcast `entity/progress`.
#[derive(Debug, Clone)]
pub struct Train {
    pub options: Vec<TrainOption>,
    pub queue: VecDeque<String>,
    pub progress: Seconds,
}

impl Train {
    pub fn new(options: Vec<TrainOption>) -> Self {
        Self {
            options,
            queue: VecDeque::new(),
            progress: 0.0,
        }
    }
    fn option(&self, name: &str) -> Result<&TrainOption> {
        self.options
            .iter()
            .find(|option| option.name == name)
            .ok_or_else(|| Error::client(format!("unknown unit '{}'", name)))
    }
    fn announce(&self, owner: &Entity, game: &mut Game, name: &str, duration: Seconds) {
        game.broadcast(Event::EntityProgress {
            parent: owner.id,
            event: format!("train/{}", name),
            queue: self.queue.len(),
            progress: self.progress,
            duration,
        });
    }
    /// Production override of the activation clock: progress runs on wall
    /// time whenever the queue is non-empty.
    pub fn tick(&mut self, owner: &mut Entity, game: &mut Game, delta: Seconds) -> Result<()> {
        let Some(front) = self.queue.front().cloned() else {
            return Ok(());
        };
        let (duration, name) = {
            let option = self.option(&front)?;
            (option.duration, option.name.clone())
        };
        self.progress += delta;
        if self.progress < duration {
            return Ok(());
        }
        let Some(position) = game.free_position_near(owner.position) else {
            // no room to muster; hold at completion and retry next tick
            self.progress = duration;
            return Ok(());
        };
        game.add_entity(&name, position, owner.alignment)?;
        self.queue.pop_front();
        self.progress = 0.0;
        self.announce(owner, game, &name, duration);
        Ok(())
    }
    pub fn command(
        &mut self,
        owner: &mut Entity,
        game: &mut Game,
        key: &str,
        _value: &str,
    ) -> Result<()> {
        if let Some(name) = key.strip_prefix("train/") {
            let (costs, duration, name) = {
                let option = self.option(name)?;
                (option.costs.clone(), option.duration, option.name.clone())
            };
            game.spend(&costs)?;
            self.queue.push_back(name.clone());
            self.announce(owner, game, &name, duration);
            return Ok(());
        }
        if let Some(name) = key.strip_prefix("cancel/") {
            let (costs, duration, name) = {
                let option = self.option(name)?;
                (option.costs.clone(), option.duration, option.name.clone())
            };
            let Some(index) = self.queue.iter().rposition(|queued| *queued == name) else {
                return Err(Error::client(format!("no queued training of '{}'", name)));
            };
            let _ = self.queue.remove(index);
            if index == 0 {
                self.progress = 0.0;
            }
            for (resource, amount) in costs {
                game.add_resource(resource, amount * CANCEL_REFUND);
            }
            self.announce(owner, game, &name, duration);
            return Ok(());
        }
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
                let queued = self.queue.iter().filter(|name| **name == option.name).count();
                let progress = match self.queue.front() {
                    Some(front) if *front == option.name => self.progress,
                    _ => 0.0,
                };
                (
                    format!("train/{}", option.name),
                    json!({
                        "costs": costs,
                        "duration": option.duration,
                        "queue": queued,
                        "progress": progress,
                    }),
                )
            })
            .collect()
    }
}
