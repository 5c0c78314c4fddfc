//! The standard gameplay catalog, loaded through the ordinary catalog
//! pipeline so content and loader cannot drift apart.

/// Template placed at the origin of every new game.
pub const FORTRESS: &str = "Fortress";
/// Starting gatherer template.
pub const WORKER: &str = "Worker";
/// Enemy spawner whose destruction wins the game.
pub const PORTAL: &str = "Portal";

/// The built-in entity catalog.
pub const STANDARD: &str = r#"
Fortress:
  HP: 1500
  Image: fortress.png
  Tint: 0xC8B070
  Size: 3
  Vision: 4
  DeathVisual: fortress_collapse
  Tags: [Structure]
  Behaviours:
    - Type: Essential
    - Type: Train
      Units:
        Worker: { Duration: 8, Food: 50 }
        Militia: { Duration: 12, Food: 75, Gold: 25 }
        Scout: { Duration: 6, Food: 40 }

Worker:
  HP: 60
  Image: "worker.png, worker_laden.png"
  Vision: 2
  DeathVisual: splat
  Tags: [Unit]
  Behaviours:
    - Type: Worker
      Cooldown: 2
      Capacity: 20
      Rate: 4
    - Type: Repair
      Cooldown: 2
      Amount: 10
      Range: 1
    - Type: Build
      Units:
        Arrow Tower: { Wood: 100, Stone: 100 }
        Alchemy Lab: { Wood: 150, Gold: 100 }

Militia:
  HP: 90
  Image: militia.png
  Vision: 2
  DeathVisual: splat
  Tags: [Unit]
  Behaviours:
    - Type: SeekEnemy
      Cooldown: 1.5
      Reach: 1
    - Type: Attack
      Cooldown: 1.5
      Damage: 8
      Range: 1
      Visual: slash

Scout:
  HP: 40
  Image: scout.png
  Vision: 5
  Tags: [Unit]
  Behaviours:
    - Type: Pathing
      Cooldown: 0.75

Arrow Tower:
  HP: 250
  Image: arrow_tower.png
  Size: 2
  Vision: 4
  DeathVisual: rubble
  Tags: [Structure]
  Behaviours:
    - Type: Attack
      Cooldown: 1.5
      Damage: 12
      Range: 4
      Visual: arrow

Alchemy Lab:
  HP: 180
  Image: alchemy_lab.png
  Size: 2
  DeathVisual: rubble
  Tags: [Structure]
  Behaviours:
    - Type: Transmute
      Cooldown: 3
      Rate: 2
      From: food
      To: gold
      Efficiency: 0.8

Under Construction:
  HP: 100
  Image: scaffold.png
  Size: 2
  Vision: 0
  Tags: [Structure]
  Behaviours:
    - Type: UnderConstruction

Berry Grove:
  HP: 400
  Image: berry_grove.png
  Tags: [Resource]
  ResourceType: food

Forest:
  HP: 600
  Image: forest.png
  Tags: [Resource]
  ResourceType: wood

Stone Outcrop:
  HP: 600
  Image: outcrop.png
  Tags: [Resource]
  ResourceType: stone

Gold Vein:
  HP: 500
  Image: gold_vein.png
  Tags: [Resource]
  ResourceType: gold

Aether Shard:
  HP: 200
  Image: aether_shard.png
  Tint: 0x9040FF
  Tags: [Resource]
  ResourceType: aether

Portal:
  HP: 800
  Image: portal.png
  Size: 3
  Vision: 0
  DeathVisual: portal_collapse
  Tags: [Structure]
  Behaviours:
    - Type: SummonPool
      Label: horde
      Cooldown: 15
      Units: { Goblin: 5, Ogre: 1 }
    - Type: Summon
      Cooldown: 90
      Unit: Ogre
    - Type: Empower
      Cooldown: 20
      Target: horde
      Strength: 0.34
    - Type: KillObjective

Goblin:
  HP: 40
  Image: goblin.png
  Vision: 1
  DeathVisual: splat
  Tags: [Unit]
  Behaviours:
    - Type: SeekFortress
      Cooldown: 1.5
      Reach: 2
    - Type: Attack
      Cooldown: 1.5
      Damage: 5
      Range: 2
      Visual: claw

Ogre:
  HP: 160
  Image: ogre.png
  Vision: 1
  DeathVisual: thud
  Tags: [Unit]
  Behaviours:
    - Type: SeekFortress
      Cooldown: 2
      Reach: 2
    - Type: Attack
      Cooldown: 2.5
      Damage: 22
      Range: 2
      Visual: smash
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use hxk_sim::Tag;

    #[test]
    fn standard_catalog_loads_cleanly() {
        let templates = hxk_catalog::parse(STANDARD).unwrap();
        assert_eq!(templates.len(), 15);
        for name in [FORTRESS, WORKER, PORTAL, "Arrow Tower", "Under Construction"] {
            assert!(templates.get(name).is_some(), "missing {}", name);
        }
    }
    #[test]
    fn scatterable_resources_cover_every_kind() {
        let templates = hxk_catalog::parse(STANDARD).unwrap();
        let kinds: std::collections::HashSet<_> = templates
            .prototypes()
            .filter(|p| p.tags.has(Tag::RESOURCE))
            .filter_map(|p| p.resource_type)
            .collect();
        assert_eq!(kinds.len(), 5);
    }
    #[test]
    fn arrow_tower_costs_match_the_build_menu() {
        let templates = hxk_catalog::parse(STANDARD).unwrap();
        let worker = templates.get(WORKER).unwrap();
        let build = worker
            .behaviors
            .iter()
            .find_map(|b| match &b.kind {
                hxk_sim::Kind::Build(build) => Some(build),
                _ => None,
            })
            .unwrap();
        let tower = build
            .options
            .iter()
            .find(|option| option.name == "Arrow Tower")
            .unwrap();
        assert_eq!(tower.costs.len(), 2);
        for (_, amount) in &tower.costs {
            assert_eq!(*amount, 100.0);
        }
    }
}
