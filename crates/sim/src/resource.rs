use hxk_core::*;
use serde::Deserialize;
use serde::Serialize;

/// The five tradable resource kinds.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Food,
    Gold,
    Stone,
    Wood,
    Aether,
}

impl Resource {
    pub const fn all() -> [Resource; 5] {
        [
            Resource::Food,
            Resource::Gold,
            Resource::Stone,
            Resource::Wood,
            Resource::Aether,
        ]
    }
    /// Canonical exchange value used by transmutation.
    pub const fn value(&self) -> Quantity {
        match self {
            Resource::Food => 0.5,
            Resource::Stone => 0.5,
            Resource::Wood => 0.5,
            Resource::Gold => 1.0,
            Resource::Aether => 5.0,
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resource::Food => write!(f, "food"),
            Resource::Gold => write!(f, "gold"),
            Resource::Stone => write!(f, "stone"),
            Resource::Wood => write!(f, "wood"),
            Resource::Aether => write!(f, "aether"),
        }
    }
}

impl std::str::FromStr for Resource {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "food" => Ok(Resource::Food),
            "gold" => Ok(Resource::Gold),
            "stone" => Ok(Resource::Stone),
            "wood" => Ok(Resource::Wood),
            "aether" => Ok(Resource::Aether),
            _ => Err(Error::client(format!("unknown resource '{}'", s))),
        }
    }
}

/// Per-game resource balances.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize)]
pub struct Pools {
    pub food: Quantity,
    pub gold: Quantity,
    pub stone: Quantity,
    pub wood: Quantity,
    pub aether: Quantity,
}

impl Pools {
    /// Balances granted to a freshly created game.
    pub fn starting() -> Self {
        Self {
            food: STARTING_STOCK,
            gold: STARTING_STOCK,
            stone: STARTING_STOCK,
            wood: STARTING_STOCK,
            aether: 0.0,
        }
    }
    pub fn get(&self, resource: Resource) -> Quantity {
        match resource {
            Resource::Food => self.food,
            Resource::Gold => self.gold,
            Resource::Stone => self.stone,
            Resource::Wood => self.wood,
            Resource::Aether => self.aether,
        }
    }
    pub fn add(&mut self, resource: Resource, amount: Quantity) {
        match resource {
            Resource::Food => self.food += amount,
            Resource::Gold => self.gold += amount,
            Resource::Stone => self.stone += amount,
            Resource::Wood => self.wood += amount,
            Resource::Aether => self.aether += amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_table() {
        assert_eq!(Resource::Food.value(), 0.5);
        assert_eq!(Resource::Stone.value(), 0.5);
        assert_eq!(Resource::Wood.value(), 0.5);
        assert_eq!(Resource::Gold.value(), 1.0);
        assert_eq!(Resource::Aether.value(), 5.0);
    }
    #[test]
    fn parse_roundtrips_display() {
        for resource in Resource::all() {
            assert_eq!(resource.to_string().parse::<Resource>().unwrap(), resource);
        }
        assert!("mithril".parse::<Resource>().is_err());
    }
    #[test]
    fn pools_index_by_kind() {
        let mut pools = Pools::default();
        pools.add(Resource::Wood, 12.5);
        pools.add(Resource::Wood, -2.5);
        pools.add(Resource::Aether, 1.0);
        assert_eq!(pools.get(Resource::Wood), 10.0);
        assert_eq!(pools.get(Resource::Aether), 1.0);
        assert_eq!(pools.get(Resource::Gold), 0.0);
    }
}
