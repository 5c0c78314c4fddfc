//! Dispatch endpoints consumed by the out-of-scope transport layer.
//!
//! Every handler takes a parsed request and returns the JSON response body;
//! errors carry their surface status through [`Error::status`]. Ownership
//! of the addressed game has already been checked by the dispatcher.
use crate::engine::Engine;
use crate::request::*;
use hxk_core::*;
use hxk_grid::Position;
use hxk_sim::Subscriber;
use serde_json::Value;
use serde_json::json;

/// `game/create`: allocate a game and return its id.
pub async fn create(engine: &Engine, request: CreateRequest) -> Result<Value> {
    let game = engine.create_game(request.user).await?;
    Ok(json!({ "game": game }))
}

/// `game/get`: a full serialized snapshot.
pub async fn get(engine: &Engine, request: GameRequest) -> Result<Value> {
    engine.with_game(request.game, |game| game.serialized()).await
}

/// `game/subscribe`: register the caller's sink and return the snapshot
/// it should render first.
pub async fn subscribe(
    engine: &Engine,
    request: GameRequest,
    subscriber: Box<dyn Subscriber>,
) -> Result<Value> {
    engine
        .with_game(request.game, |game| {
            game.subscribe(subscriber);
            game.serialized()
        })
        .await
}

/// `game/target`: fan the position to each selected player entity.
pub async fn target(engine: &Engine, request: TargetRequest) -> Result<Value> {
    let position: Position = request.position.parse()?;
    engine
        .with_game(request.game, |game| {
            game.target(&request.selected, position)
        })
        .await?;
    Ok(json!({}))
}

/// `game/command`: one key/value pair for one entity.
pub async fn command(engine: &Engine, request: CommandRequest) -> Result<Value> {
    engine
        .with_game(request.game, |game| {
            game.command(request.target, &request.key, &request.value)
        })
        .await??;
    Ok(json!({}))
}

/// `game/query`: the entity's command affordances. Pure.
pub async fn query(engine: &Engine, request: QueryRequest) -> Result<Value> {
    let commands = engine
        .with_game(request.game, |game| game.query(request.target))
        .await??;
    Ok(json!({ "commands": commands }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hxk_sim::Game;
    use hxk_sim::Recorder;
    use std::sync::Arc;

    async fn arena() -> (Arc<Engine>, ID<Game>, Recorder) {
        let engine = Arc::new(Engine::standard(Some(11)).unwrap());
        let created = create(
            &engine,
            CreateRequest {
                user: ID::default(),
            },
        )
        .await
        .unwrap();
        let id: ID<Game> = created["game"].as_str().unwrap().parse().unwrap();
        let recorder = Recorder::new();
        subscribe(
            &engine,
            GameRequest { game: id },
            Box::new(recorder.clone()),
        )
        .await
        .unwrap();
        (engine, id, recorder)
    }

    async fn worker_of(engine: &Engine, id: ID<Game>) -> ID<hxk_sim::Entity> {
        engine
            .with_game(id, |game| {
                let mut workers: Vec<_> = game
                    .entities()
                    .filter(|e| e.name == crate::content::WORKER)
                    .map(|e| e.id)
                    .collect();
                workers.sort();
                workers[0]
            })
            .await
            .unwrap()
    }

    /// First unoccupied cell at exactly the given range from the origin.
    async fn free_cell(engine: &Engine, id: ID<Game>, range: i32) -> Position {
        engine
            .with_game(id, |game| {
                Position::ORIGIN
                    .ring(range)
                    .into_iter()
                    .find(|cell| !game.map.contains_key(cell))
                    .expect("an open cell at that range")
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn snapshots_serialize_the_world() {
        let (engine, id, _) = arena().await;
        let snapshot = get(&engine, GameRequest { game: id }).await.unwrap();
        assert_eq!(snapshot["id"], id.to_string());
        assert_eq!(snapshot["state"], "active");
        assert_eq!(snapshot["resources"]["wood"], STARTING_STOCK);
        let entities = snapshot["entities"].as_object().unwrap();
        assert!(entities.len() > STARTING_WORKERS);
        for entity in entities.values() {
            assert!(entity.get("position").is_some());
            assert!(entity.get("behaviors").is_none());
        }
    }
    #[tokio::test]
    async fn unknown_games_surface_client_errors() {
        let engine = Engine::standard(Some(11)).unwrap();
        let error = get(
            &engine,
            GameRequest {
                game: ID::default(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(error, Error::Client(_)));
        assert_eq!(error.status(), 400);
    }
    #[tokio::test]
    async fn building_a_tower_spends_and_stages_construction() {
        let (engine, id, recorder) = arena().await;
        let worker = worker_of(&engine, id).await;
        let site = free_cell(&engine, id, 3).await;
        command(
            &engine,
            CommandRequest {
                game: id,
                target: worker,
                key: "build/Arrow Tower".into(),
                value: site.to_string(),
            },
        )
        .await
        .unwrap();
        engine
            .with_game(id, |game| {
                assert_eq!(game.pools.wood, STARTING_STOCK - 100.0);
                assert_eq!(game.pools.stone, STARTING_STOCK - 100.0);
                let scaffold = game.entity(game.map[&site]).unwrap();
                assert_eq!(scaffold.name, "Arrow Tower");
                assert_eq!(scaffold.hp, 1.0);
            })
            .await
            .unwrap();
        // the subscriber saw the scaffold and both debits
        let adds = recorder.of_type("entity/add");
        assert!(
            adds.iter()
                .any(|m| m["entity"]["name"] == "Arrow Tower" && m["entity"]["hp"] == 1.0)
        );
        assert_eq!(recorder.of_type("resource").len(), 2);
    }
    #[tokio::test]
    async fn insufficient_resources_reject_the_whole_build() {
        let (engine, id, recorder) = arena().await;
        let worker = worker_of(&engine, id).await;
        let site = free_cell(&engine, id, 3).await;
        engine
            .with_game(id, |game| game.pools.gold = 50.0)
            .await
            .unwrap();
        let error = command(
            &engine,
            CommandRequest {
                game: id,
                target: worker,
                key: "build/Alchemy Lab".into(),
                value: site.to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(error, Error::Client(ref r) if r.contains("insufficient")));
        engine
            .with_game(id, |game| {
                assert_eq!(game.pools.wood, STARTING_STOCK);
                assert_eq!(game.pools.gold, 50.0);
                assert!(!game.map.contains_key(&site));
            })
            .await
            .unwrap();
        assert!(recorder.of_type("resource").is_empty());
    }
    #[tokio::test]
    async fn targeting_fans_to_selected_workers() {
        let (engine, id, recorder) = arena().await;
        let worker = worker_of(&engine, id).await;
        let cell = free_cell(&engine, id, 4).await;
        target(
            &engine,
            TargetRequest {
                game: id,
                selected: vec![worker],
                position: cell.to_string(),
            },
        )
        .await
        .unwrap();
        let targets = recorder.of_type("entity/target");
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0]["source"], worker.to_string());
        assert_eq!(targets[0]["target"]["q"], cell.q);
        assert_eq!(targets[0]["target"]["r"], cell.r);
    }
    #[tokio::test]
    async fn malformed_positions_are_client_errors() {
        let (engine, id, _) = arena().await;
        let worker = worker_of(&engine, id).await;
        let error = target(
            &engine,
            TargetRequest {
                game: id,
                selected: vec![worker],
                position: "over there".into(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(error.status(), 400);
    }
    #[tokio::test]
    async fn queries_list_affordances() {
        let (engine, id, _) = arena().await;
        let worker = worker_of(&engine, id).await;
        let response = query(
            &engine,
            QueryRequest {
                game: id,
                target: worker,
            },
        )
        .await
        .unwrap();
        let commands = response["commands"].as_array().unwrap();
        let keys: Vec<&str> = commands
            .iter()
            .map(|pair| pair[0].as_str().unwrap())
            .collect();
        assert!(keys.contains(&"build/Arrow Tower"));
        assert!(keys.contains(&"build/Alchemy Lab"));
        let tower = commands
            .iter()
            .find(|pair| pair[0] == "build/Arrow Tower")
            .unwrap();
        assert_eq!(tower[1]["costs"]["wood"], 100.0);
    }
    #[tokio::test]
    async fn fortress_trains_and_cancels() {
        let (engine, id, recorder) = arena().await;
        let fortress = engine
            .with_game(id, |game| game.fortress.unwrap())
            .await
            .unwrap();
        command(
            &engine,
            CommandRequest {
                game: id,
                target: fortress,
                key: "train/Militia".into(),
                value: String::new(),
            },
        )
        .await
        .unwrap();
        assert_eq!(recorder.of_type("entity/progress").len(), 1);
        command(
            &engine,
            CommandRequest {
                game: id,
                target: fortress,
                key: "cancel/Militia".into(),
                value: String::new(),
            },
        )
        .await
        .unwrap();
        engine
            .with_game(id, |game| {
                // half of food 75 and gold 25 came back
                assert_eq!(game.pools.food, STARTING_STOCK - 75.0 + 37.5);
                assert_eq!(game.pools.gold, STARTING_STOCK - 25.0 + 12.5);
            })
            .await
            .unwrap();
    }
    #[tokio::test]
    async fn subscribers_get_the_snapshot_then_the_stream() {
        let (engine, _id, recorder) = arena().await;
        engine.tick_all(0.1).await;
        // the post-subscribe stream begins with coalesced updates
        assert!(!recorder.of_type("entity/update").is_empty());
    }
    #[tokio::test]
    async fn severed_subscribers_are_dropped_silently() {
        let (engine, id, _) = arena().await;
        engine
            .with_game(id, |game| game.subscribe(Box::new(hxk_sim::Severed)))
            .await
            .unwrap();
        engine.tick_all(0.1).await;
        engine.tick_all(0.1).await;
        let sinks = engine
            .with_game(id, |game| game.subscribers.len())
            .await
            .unwrap();
        assert_eq!(sinks, 1);
    }
}
