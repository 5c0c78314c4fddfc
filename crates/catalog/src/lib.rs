//! Declarative entity catalog loader.
//!
//! Gameplay content is a YAML document mapping entity names to their stats
//! and behavior records. Each record pops the keys it understands from a
//! working copy of its mapping; any leftover key is a config error naming
//! the unused keys, so the schema is covered exactly. A bad entity is
//! logged and skipped without failing the rest of the document.
use hxk_core::*;
use hxk_sim::*;
use serde_yaml::Mapping;
use serde_yaml::Value;

/// Parse a catalog document into simulation prototypes.
///
/// Entities that fail to parse (unknown behavior type, unused keys, missing
/// fields) are skipped with an error log; the remainder load normally. A
/// document that is not a mapping fails outright.
pub fn parse(source: &str) -> Result<Templates> {
    let document: Value =
        serde_yaml::from_str(source).map_err(|e| Error::config(format!("malformed yaml: {}", e)))?;
    let Value::Mapping(document) = document else {
        return Err(Error::config("catalog root must be a mapping"));
    };
    let mut templates = Templates::new();
    for (key, value) in document {
        let Some(name) = key.as_str().map(str::to_string) else {
            log::error!("[catalog] skipping non-string entity name {:?}", key);
            continue;
        };
        match entity_from(&name, value) {
            Ok(prototype) => templates.insert(prototype),
            Err(error) => log::error!("[catalog] skipping '{}': {}", name, error),
        }
    }
    Ok(templates)
}

/// Load a catalog from disk.
pub fn load(path: impl AsRef<std::path::Path>) -> Result<Templates> {
    let source = std::fs::read_to_string(&path)
        .map_err(|e| Error::config(format!("reading {}: {}", path.as_ref().display(), e)))?;
    parse(&source)
}

fn entity_from(name: &str, value: Value) -> Result<Entity> {
    let mut map = mapping(value, name)?;
    let hp = take(&mut map, "HP")
        .ok_or_else(|| Error::config("missing HP"))?
        .as_f64()
        .ok_or_else(|| Error::config("HP must be a number"))?;
    let images = match take(&mut map, "Image") {
        Some(value) => string(value, "Image")?
            .split(',')
            .map(|path| path.trim().to_string())
            .collect(),
        None => Vec::new(),
    };
    let tint = take(&mut map, "Tint")
        .map(|value| {
            value
                .as_u64()
                .map(|tint| tint as u32)
                .ok_or_else(|| Error::config("Tint must be an integer"))
        })
        .transpose()?;
    let size = integer_or(&mut map, "Size", 1)?;
    let death_visual = take(&mut map, "DeathVisual")
        .map(|value| string(value, "DeathVisual"))
        .transpose()?;
    let resource_type = take(&mut map, "ResourceType")
        .map(|value| {
            string(value, "ResourceType")?
                .parse::<Resource>()
                .map_err(|error| Error::config(error.to_string()))
        })
        .transpose()?;
    let vision = integer_or(&mut map, "Vision", VISION_DEFAULT)?;
    let tags = tags_from(take(&mut map, "Tags").ok_or_else(|| Error::config("missing Tags"))?)?;
    if tags.has(Tag::RESOURCE) && resource_type.is_none() {
        return Err(Error::config("resource entities need a ResourceType"));
    }
    let behaviors = match take(&mut map, "Behaviours") {
        Some(Value::Sequence(records)) => records
            .into_iter()
            .map(behavior_from)
            .collect::<Result<Vec<Behavior>>>()?,
        Some(_) => return Err(Error::config("Behaviours must be a list")),
        None => Vec::new(),
    };
    leftover(&map, name)?;
    Ok(Entity::prototype(
        name,
        hp,
        tags,
        resource_type,
        vision,
        Visual {
            images,
            tint,
            size,
            death_visual,
        },
        behaviors,
    ))
}

/// Exactly one of the three category tags must be present.
fn tags_from(value: Value) -> Result<Tag> {
    let Value::Sequence(entries) = value else {
        return Err(Error::config("Tags must be a list"));
    };
    let mut tags = Tag::default();
    for entry in entries {
        tags = tags
            | match string(entry, "Tags")?.as_str() {
                "Unit" => Tag::UNIT,
                "Resource" => Tag::RESOURCE,
                "Structure" => Tag::STRUCTURE,
                other => return Err(Error::config(format!("unknown tag '{}'", other))),
            };
    }
    match tags.bits().count_ones() {
        1 => Ok(tags),
        _ => Err(Error::config(
            "exactly one of Unit, Resource, Structure is required",
        )),
    }
}

fn behavior_from(value: Value) -> Result<Behavior> {
    let mut map = mapping(value, "behavior")?;
    let kind_name = string(
        take(&mut map, "Type").ok_or_else(|| Error::config("behavior missing Type"))?,
        "Type",
    )?;
    let label = take(&mut map, "Label")
        .map(|value| string(value, "Label"))
        .transpose()?;
    let cooldown = number_or(&mut map, "Cooldown", 1.0)?;
    let kind = kind_from(&kind_name, &mut map)?;
    leftover(&map, &kind_name)?;
    Ok(Behavior {
        label,
        clock: Clock::new(cooldown),
        kind,
    })
}

fn kind_from(kind: &str, map: &mut Mapping) -> Result<Kind> {
    match kind {
        "Attack" => Ok(Kind::Attack(Attack::new(
            number(map, "Damage")?,
            integer_or(map, "Range", 1)?,
            take(map, "Visual").map(|v| string(v, "Visual")).transpose()?,
        ))),
        "Summon" => Ok(Kind::Summon(Summon {
            unit: string(
                take(map, "Unit").ok_or_else(|| Error::config("Summon needs a Unit"))?,
                "Unit",
            )?,
        })),
        "SummonPool" => {
            let units = take(map, "Units").ok_or_else(|| Error::config("SummonPool needs Units"))?;
            let Value::Mapping(units) = units else {
                return Err(Error::config("Units must be a mapping"));
            };
            let units = units
                .into_iter()
                .map(|(name, weight)| {
                    let name = name
                        .as_str()
                        .ok_or_else(|| Error::config("unit names must be strings"))?
                        .to_string();
                    let weight = weight
                        .as_f64()
                        .filter(|weight| *weight > 0.0)
                        .ok_or_else(|| Error::config("weights must be positive numbers"))?;
                    Ok((name, weight))
                })
                .collect::<Result<Vec<(String, f64)>>>()?;
            Ok(Kind::SummonPool(SummonPool {
                units,
                strength: number_or(map, "Strength", 1.0)?,
            }))
        }
        "Empower" => Ok(Kind::Empower(Empower {
            target: string(
                take(map, "Target").ok_or_else(|| Error::config("Empower needs a Target"))?,
                "Target",
            )?,
            strength: number_or(map, "Strength", 1.0)?,
        })),
        "Worker" => Ok(Kind::Worker(Worker::new(
            number_or(map, "Capacity", 10.0)?,
            number_or(map, "Rate", 5.0)?,
        ))),
        "SeekEnemy" => Ok(Kind::SeekEnemy(SeekEnemy::new(integer_or(map, "Reach", 1)?))),
        "SeekFortress" => Ok(Kind::SeekFortress(SeekFortress::new(integer_or(
            map, "Reach", 1,
        )?))),
        "Transmute" => Ok(Kind::Transmute(Transmute::new(
            number(map, "Rate")?,
            resource(map, "From")?,
            resource(map, "To")?,
            number_or(map, "Efficiency", 1.0)?,
        ))),
        "Build" => Ok(Kind::Build(Build::new(
            options_from(map)?
                .into_iter()
                .map(|(name, mut fields)| {
                    let costs = costs_from(&mut fields)?;
                    leftover(&fields, &name)?;
                    Ok(BuildOption { name, costs })
                })
                .collect::<Result<Vec<BuildOption>>>()?,
        ))),
        "Train" => Ok(Kind::Train(Train::new(
            options_from(map)?
                .into_iter()
                .map(|(name, mut fields)| {
                    let duration = number(&mut fields, "Duration")?;
                    let costs = costs_from(&mut fields)?;
                    leftover(&fields, &name)?;
                    Ok(TrainOption {
                        name,
                        duration,
                        costs,
                    })
                })
                .collect::<Result<Vec<TrainOption>>>()?,
        ))),
        "Repair" => Ok(Kind::Repair(Repair {
            amount: number(map, "Amount")?,
            range: integer_or(map, "Range", 1)?,
        })),
        "UnderConstruction" => Ok(Kind::UnderConstruction(UnderConstruction)),
        "Essential" => Ok(Kind::Essential(Essential)),
        "KillObjective" => Ok(Kind::KillObjective(KillObjective)),
        "Pathing" => Ok(Kind::Pathing(Pathing::default())),
        other => Err(Error::config(format!("unknown behavior type '{}'", other))),
    }
}

/// The `Units` option table shared by Build and Train.
fn options_from(map: &mut Mapping) -> Result<Vec<(String, Mapping)>> {
    let units = take(map, "Units").ok_or_else(|| Error::config("missing Units"))?;
    let Value::Mapping(units) = units else {
        return Err(Error::config("Units must be a mapping"));
    };
    units
        .into_iter()
        .map(|(name, fields)| {
            let name = name
                .as_str()
                .ok_or_else(|| Error::config("unit names must be strings"))?
                .to_string();
            let Value::Mapping(fields) = fields else {
                return Err(Error::config(format!("'{}' must be a mapping", name)));
            };
            Ok((name, fields))
        })
        .collect()
}

/// Remaining keys of an option mapping are resource costs.
fn costs_from(map: &mut Mapping) -> Result<Vec<(Resource, Quantity)>> {
    let keys: Vec<String> = map
        .keys()
        .filter_map(|key| key.as_str().map(str::to_string))
        .collect();
    let mut costs = Vec::new();
    for key in keys {
        if let Ok(resource) = key.parse::<Resource>() {
            let amount = number(map, &key)?;
            costs.push((resource, amount));
        }
    }
    Ok(costs)
}

fn mapping(value: Value, context: &str) -> Result<Mapping> {
    match value {
        Value::Mapping(map) => Ok(map),
        _ => Err(Error::config(format!("'{}' must be a mapping", context))),
    }
}

fn take(map: &mut Mapping, key: &str) -> Option<Value> {
    map.remove(key)
}

fn resource(map: &mut Mapping, key: &str) -> Result<Resource> {
    string(
        take(map, key).ok_or_else(|| Error::config(format!("missing {}", key)))?,
        key,
    )?
    .parse()
    .map_err(|error: Error| Error::config(error.to_string()))
}

fn string(value: Value, context: &str) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        _ => Err(Error::config(format!("{} must be a string", context))),
    }
}

fn number(map: &mut Mapping, key: &str) -> Result<f64> {
    take(map, key)
        .ok_or_else(|| Error::config(format!("missing {}", key)))?
        .as_f64()
        .ok_or_else(|| Error::config(format!("{} must be a number", key)))
}

fn number_or(map: &mut Mapping, key: &str, fallback: f64) -> Result<f64> {
    match take(map, key) {
        Some(value) => value
            .as_f64()
            .ok_or_else(|| Error::config(format!("{} must be a number", key))),
        None => Ok(fallback),
    }
}

fn integer_or(map: &mut Mapping, key: &str, fallback: i32) -> Result<i32> {
    match take(map, key) {
        Some(value) => value
            .as_i64()
            .map(|n| n as i32)
            .ok_or_else(|| Error::config(format!("{} must be an integer", key))),
        None => Ok(fallback),
    }
}

/// Schema coverage guarantee: anything left in the mapping was not
/// understood by the record that owned it.
fn leftover(map: &Mapping, context: &str) -> Result<()> {
    if map.is_empty() {
        return Ok(());
    }
    let keys: Vec<String> = map
        .keys()
        .map(|key| key.as_str().unwrap_or("<non-string>").to_string())
        .collect();
    Err(Error::config(format!(
        "unused keys in {}: {}",
        context,
        keys.join(", ")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"
Keep:
  HP: 1000
  Image: keep.png
  Size: 2
  Vision: 3
  Tags: [Structure]
  Behaviours:
    - Type: Essential
    - Type: Train
      Units:
        Worker: { Duration: 10, Food: 50 }
Worker:
  HP: 50
  Image: "worker.png, worker_carry.png"
  Tint: 0x88FF88
  DeathVisual: splat
  Tags: [Unit]
  Behaviours:
    - Type: Worker
      Cooldown: 2
      Capacity: 20
    - Type: Build
      Units:
        Watchtower: { Wood: 100, Stone: 100 }
Gold Vein:
  HP: 500
  Tags: [Resource]
  ResourceType: gold
Watchtower:
  HP: 200
  Tags: [Structure]
  Behaviours:
    - Type: Attack
      Damage: 10
      Range: 3
      Cooldown: 1.5
Portal:
  HP: 600
  Tags: [Structure]
  Behaviours:
    - Type: SummonPool
      Label: horde
      Cooldown: 12
      Units: { Imp: 3, Ogre: 1 }
    - Type: Empower
      Target: horde
      Strength: 0.5
      Cooldown: 45
    - Type: KillObjective
"#;

    #[test]
    fn parses_a_full_catalog() {
        let templates = parse(CATALOG).unwrap();
        assert_eq!(templates.len(), 5);
        let keep = templates.get("Keep").unwrap();
        assert!(keep.template);
        assert_eq!(keep.max_hp, 1000.0);
        assert_eq!(keep.vision_size, 3);
        assert_eq!(keep.visual.size, 2);
        assert!(keep.tags.has(Tag::STRUCTURE));
        assert_eq!(keep.behaviors.len(), 2);
    }
    #[test]
    fn image_lists_split_on_commas() {
        let templates = parse(CATALOG).unwrap();
        let worker = templates.get("Worker").unwrap();
        assert_eq!(worker.visual.images, vec!["worker.png", "worker_carry.png"]);
        assert_eq!(worker.visual.tint, Some(0x88FF88));
        assert_eq!(worker.visual.death_visual.as_deref(), Some("splat"));
    }
    #[test]
    fn behavior_fields_reify() {
        let templates = parse(CATALOG).unwrap();
        let worker = templates.get("Worker").unwrap();
        match &worker.behaviors[0].kind {
            Kind::Worker(gatherer) => assert_eq!(gatherer.capacity, 20.0),
            other => panic!("expected Worker, got {:?}", other),
        }
        assert_eq!(worker.behaviors[0].clock.cooldown, 2.0);
        match &worker.behaviors[1].kind {
            Kind::Build(build) => {
                assert_eq!(build.options.len(), 1);
                assert_eq!(build.options[0].name, "Watchtower");
                assert_eq!(build.options[0].costs.len(), 2);
            }
            other => panic!("expected Build, got {:?}", other),
        }
        let portal = templates.get("Portal").unwrap();
        assert_eq!(portal.behaviors[0].label.as_deref(), Some("horde"));
        match &portal.behaviors[0].kind {
            Kind::SummonPool(pool) => assert_eq!(pool.units.len(), 2),
            other => panic!("expected SummonPool, got {:?}", other),
        }
    }
    #[test]
    fn resource_entities_carry_their_type() {
        let templates = parse(CATALOG).unwrap();
        let vein = templates.get("Gold Vein").unwrap();
        assert!(vein.tags.has(Tag::RESOURCE));
        assert_eq!(vein.resource_type, Some(Resource::Gold));
    }
    #[test]
    fn unused_entity_keys_fail_that_entity_only() {
        let source = r#"
Broken:
  HP: 10
  Tags: [Unit]
  Sparkle: true
Fine:
  HP: 10
  Tags: [Unit]
"#;
        let templates = parse(source).unwrap();
        assert!(templates.get("Broken").is_none());
        assert!(templates.get("Fine").is_some());
    }
    #[test]
    fn unused_behavior_keys_fail_the_entity() {
        let source = r#"
Broken:
  HP: 10
  Tags: [Unit]
  Behaviours:
    - Type: Attack
      Damage: 5
      Sharpness: 11
"#;
        let templates = parse(source).unwrap();
        assert!(templates.is_empty());
    }
    #[test]
    fn unknown_behavior_type_fails_the_entity_only() {
        let source = r#"
Broken:
  HP: 10
  Tags: [Unit]
  Behaviours:
    - Type: Moonwalk
Fine:
  HP: 10
  Tags: [Unit]
"#;
        let templates = parse(source).unwrap();
        assert_eq!(templates.len(), 1);
        assert!(templates.get("Fine").is_some());
    }
    #[test]
    fn tags_must_name_exactly_one_category() {
        for tags in ["[]", "[Unit, Structure]"] {
            let source = format!("X:\n  HP: 10\n  Tags: {}\n", tags);
            assert!(parse(&source).unwrap().is_empty());
        }
    }
    #[test]
    fn resource_tag_requires_resource_type() {
        let source = "X:\n  HP: 10\n  Tags: [Resource]\n";
        assert!(parse(source).unwrap().is_empty());
    }
    #[test]
    fn missing_hp_fails() {
        let source = "X:\n  Tags: [Unit]\n";
        assert!(parse(source).unwrap().is_empty());
    }
    #[test]
    fn malformed_documents_fail_outright() {
        assert!(parse("- just\n- a\n- list\n").is_err());
        assert!(parse("{{{{").is_err());
    }
}
