use crate::content;
use hxk_core::*;
use hxk_grid::Position;
use hxk_sim::Alignment;
use hxk_sim::Game;
use hxk_sim::Tag;
use hxk_sim::Templates;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Process-wide owner of every live game.
///
/// All game state is mutated on the scheduler worker or under the games
/// lock from a dispatch handler, never both at once; the per-game outbox
/// is flushed before the lock is released, so subscribers observe every
/// mutation in order.
pub struct Engine {
    games: Mutex<HashMap<ID<Game>, Game>>,
    templates: Arc<Templates>,
    seeds: std::sync::Mutex<SmallRng>,
    stop: AtomicBool,
}

impl Engine {
    /// An engine over an explicit catalog. Supplying a seed makes every
    /// game's random stream reproducible.
    pub fn new(templates: Templates, seed: Option<u64>) -> Self {
        let seeds = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Self {
            games: Mutex::new(HashMap::new()),
            templates: Arc::new(templates),
            seeds: std::sync::Mutex::new(seeds),
            stop: AtomicBool::new(false),
        }
    }
    /// An engine over the standard content catalog.
    pub fn standard(seed: Option<u64>) -> Result<Self> {
        Ok(Self::new(hxk_catalog::parse(content::STANDARD)?, seed))
    }
    pub fn templates(&self) -> &Templates {
        &self.templates
    }

    // ------------------------------------------------------------------
    // Game lifecycle
    // ------------------------------------------------------------------
    /// Allocate a game for an owner: fortress and base plate at the
    /// origin, starting workers beside it, resources scattered in an
    /// annulus, and the enemy portal on a distant ring.
    pub async fn create_game(&self, owner: ID<Owner>) -> Result<ID<Game>> {
        let rng = SmallRng::from_rng(&mut *self.seeds.lock().expect("seed lock"));
        let mut game = Game::new(owner, self.templates.clone(), rng);
        self.populate(&mut game)?;
        // nobody is subscribed during creation; drain the outbox
        game.flush().await;
        let id = game.id;
        self.games.lock().await.insert(id, game);
        log::info!("[engine] created game {} for {}", id, owner);
        Ok(id)
    }
    fn populate(&self, game: &mut Game) -> Result<()> {
        let fortress = game.add_entity(content::FORTRESS, Position::ORIGIN, Alignment::Player)?;
        for cell in Position::ORIGIN.neighbors() {
            game.claim_cell(cell, fortress)?;
        }
        for _ in 0..STARTING_WORKERS {
            let cell = game
                .free_position_near(Position::ORIGIN)
                .ok_or_else(|| Error::invariant("no room for starting workers"))?;
            game.add_entity(content::WORKER, cell, Alignment::Player)?;
        }
        let mut nodes: Vec<String> = game
            .templates
            .clone()
            .prototypes()
            .filter(|prototype| prototype.tags.has(Tag::RESOURCE))
            .map(|prototype| prototype.name.clone())
            .collect();
        nodes.sort();
        for node in nodes {
            for _ in 0..SCATTER_PER_TEMPLATE {
                if let Some(cell) = Self::scatter_cell(game) {
                    game.add_entity(&node, cell, Alignment::Neutral)?;
                }
            }
        }
        let mut ring = Position::ORIGIN.ring(PORTAL_DISTANCE);
        ring.shuffle(&mut game.rng);
        let lair = ring
            .into_iter()
            .find(|cell| !game.map.contains_key(cell))
            .ok_or_else(|| Error::invariant("no room for the portal"))?;
        game.add_entity(content::PORTAL, lair, Alignment::Enemy)?;
        Ok(())
    }
    /// A free cell in the resource annulus, or None when crowded out.
    fn scatter_cell(game: &mut Game) -> Option<Position> {
        for _ in 0..32 {
            let radius = game
                .rng
                .random_range(SCATTER_MIN_RADIUS..=SCATTER_MAX_RADIUS);
            let cell = *Position::ORIGIN
                .ring(radius)
                .choose(&mut game.rng)
                .expect("rings are non-empty");
            if !game.map.contains_key(&cell) {
                return Some(cell);
            }
        }
        None
    }
    /// Run `f` under the games lock and flush the outbox before releasing
    /// it, so handler effects reach subscribers immediately.
    pub async fn with_game<R>(
        &self,
        id: ID<Game>,
        f: impl FnOnce(&mut Game) -> R,
    ) -> Result<R> {
        let mut games = self.games.lock().await;
        let game = games
            .get_mut(&id)
            .ok_or_else(|| Error::client(format!("unknown game {}", id)))?;
        let result = f(game);
        game.flush().await;
        Ok(result)
    }
    /// Number of live games.
    pub async fn game_count(&self) -> usize {
        self.games.lock().await.len()
    }

    // ------------------------------------------------------------------
    // Scheduling
    // ------------------------------------------------------------------
    /// One scheduler pass: tick every game, flush its events, and destroy
    /// the games that have idled out. Per-game failures never stop the
    /// pass.
    pub async fn tick_all(&self, delta: Seconds) {
        let mut games = self.games.lock().await;
        let mut retired = Vec::new();
        for (id, game) in games.iter_mut() {
            if game.on_tick(delta) {
                retired.push(*id);
            }
            game.flush().await;
        }
        for id in retired {
            games.remove(&id);
            log::info!("[engine] destroyed idle game {}", id);
        }
    }
    /// Launch the global tick loop: sleep the tick interval, measure the
    /// real elapsed delta, and drive every game. Runs until
    /// [`Engine::shutdown`].
    pub fn spawn(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let engine = self.clone();
        tokio::spawn(async move {
            log::info!("[engine] tick loop started");
            let mut last = Instant::now();
            while !engine.stop.load(Ordering::Relaxed) {
                tokio::time::sleep(std::time::Duration::from_secs_f64(TICK_SECONDS)).await;
                let now = Instant::now();
                let delta = now.duration_since(last).as_secs_f64();
                last = now;
                engine.tick_all(delta).await;
            }
            log::info!("[engine] tick loop drained");
        })
    }
    /// Ask the tick loop to exit after its current pass.
    pub fn shutdown(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hxk_sim::Lifecycle;
    use hxk_sim::Recorder;

    async fn engine() -> (Arc<Engine>, ID<Game>) {
        let engine = Arc::new(Engine::standard(Some(7)).unwrap());
        let game = engine.create_game(ID::default()).await.unwrap();
        (engine, game)
    }

    #[tokio::test]
    async fn created_games_have_a_world() {
        let (engine, id) = engine().await;
        engine
            .with_game(id, |game| {
                assert_eq!(game.state, Lifecycle::Active);
                // fortress owns the origin and its base plate
                let fortress = game.fortress.unwrap();
                assert_eq!(game.map[&Position::ORIGIN], fortress);
                for cell in Position::ORIGIN.neighbors() {
                    assert_eq!(game.map[&cell], fortress);
                }
                // starting workers
                let workers = game
                    .entities()
                    .filter(|e| e.name == content::WORKER)
                    .count();
                assert_eq!(workers, STARTING_WORKERS);
                // scattered resources stay inside the annulus
                let nodes: Vec<_> = game
                    .entities()
                    .filter(|e| e.tags.has(Tag::RESOURCE))
                    .collect();
                assert!(!nodes.is_empty());
                for node in &nodes {
                    let range = node.position.distance(Position::ORIGIN);
                    assert!(range >= SCATTER_MIN_RADIUS && range <= SCATTER_MAX_RADIUS);
                }
                // one portal on the distant ring
                let portal: Vec<_> = game
                    .entities()
                    .filter(|e| e.name == content::PORTAL)
                    .collect();
                assert_eq!(portal.len(), 1);
                assert_eq!(
                    portal[0].position.distance(Position::ORIGIN),
                    PORTAL_DISTANCE
                );
                assert_eq!(portal[0].alignment, Alignment::Enemy);
            })
            .await
            .unwrap();
    }
    #[tokio::test]
    async fn seeded_engines_are_reproducible() {
        let (left, lid) = engine().await;
        let (right, rid) = engine().await;
        let snapshot = |engine: Arc<Engine>, id| async move {
            engine
                .with_game(id, |game| {
                    let mut cells: Vec<String> = game
                        .entities()
                        .map(|e| format!("{}@{}", e.name, e.position))
                        .collect();
                    cells.sort();
                    cells
                })
                .await
                .unwrap()
        };
        assert_eq!(snapshot(left, lid).await, snapshot(right, rid).await);
    }
    #[tokio::test]
    async fn idle_games_are_destroyed_by_the_scheduler() {
        let (engine, id) = engine().await;
        assert_eq!(engine.game_count().await, 1);
        engine.tick_all(1.0).await;
        engine.tick_all(IDLE_TIMEOUT + 1.0).await;
        assert_eq!(engine.game_count().await, 0);
        assert!(engine.with_game(id, |_| ()).await.is_err());
    }
    #[tokio::test]
    async fn subscribed_games_keep_ticking() {
        let (engine, id) = engine().await;
        let recorder = Recorder::new();
        engine
            .with_game(id, |game| game.subscribe(Box::new(recorder.clone())))
            .await
            .unwrap();
        engine.tick_all(1.0).await;
        engine.tick_all(IDLE_TIMEOUT + 1.0).await;
        assert_eq!(engine.game_count().await, 1);
        // entity refresh batches reached the subscriber
        assert!(!recorder.of_type("entity/update").is_empty());
    }
    #[tokio::test]
    async fn tick_loop_runs_and_drains() {
        let (engine, _) = engine().await;
        let handle = engine.spawn();
        tokio::time::sleep(std::time::Duration::from_millis(120)).await;
        engine.shutdown();
        handle.await.unwrap();
    }
    #[tokio::test]
    async fn portal_assault_reaches_the_fortress() {
        // play the simulation forward; the portal's horde must cross the
        // map and the game must end in defeat once the fortress falls
        let (engine, id) = engine().await;
        let recorder = Recorder::new();
        engine
            .with_game(id, |game| {
                game.subscribe(Box::new(recorder.clone()));
                // raze everything that defends the fortress
                let workers: Vec<_> = game
                    .entities()
                    .filter(|e| e.name == content::WORKER)
                    .map(|e| e.id)
                    .collect();
                for worker in workers {
                    game.remove_entity(worker);
                }
            })
            .await
            .unwrap();
        for _ in 0..4000 {
            engine.tick_all(0.5).await;
            let finished = engine
                .with_game(id, |game| game.state == Lifecycle::Finished)
                .await;
            match finished {
                Ok(true) | Err(_) => break,
                Ok(false) => continue,
            }
        }
        let ends = recorder.of_type("game/end");
        assert_eq!(ends.len(), 1);
        assert_eq!(ends[0]["success"], false);
    }
}
