use crate::entity::Entity;
use crate::game::Game;
use crate::resource::Resource;
use hxk_core::*;
use serde_json::json;
use serde_json::Value;

/// Converts one resource into another at the canonical exchange values.
///
/// Each activation sells `rate` of the source resource and buys whole units
/// of the destination; the fractional residue carries to the next
/// activation. An activation with an insufficient source balance fails
/// without debit or credit.
#[derive(Debug, Clone)]
pub struct Transmute {
    pub rate: Quantity,
    pub from: Resource,
    pub to: Resource,
    pub efficiency: f64,
    pub remainder: Quantity,
}

impl Transmute {
    pub fn new(rate: Quantity, from: Resource, to: Resource, efficiency: f64) -> Self {
        Self {
            rate,
            from,
            to,
            efficiency,
            remainder: 0.0,
        }
    }
    pub fn activate(&mut self, _owner: &mut Entity, game: &mut Game) -> Result<bool> {
        if game.pools.get(self.from) < self.rate {
            return Ok(false);
        }
        game.spend(&[(self.from, self.rate)])?;
        let proceeds = self.rate * self.from.value() * self.efficiency + self.remainder;
        let bought = (proceeds / self.to.value()).floor();
        self.remainder = proceeds - bought * self.to.value();
        if bought > 0.0 {
            game.add_resource(self.to, bought);
        }
        Ok(true)
    }
    pub fn command(
        &mut self,
        _owner: &mut Entity,
        _game: &mut Game,
        key: &str,
        value: &str,
    ) -> Result<()> {
        match key {
            "rate" => {
                let rate: Quantity = value
                    .parse()
                    .map_err(|_| Error::client(format!("malformed rate '{}'", value)))?;
                if rate < 0.0 || !rate.is_finite() {
                    return Err(Error::client(format!("malformed rate '{}'", value)));
                }
                self.rate = rate;
            }
            "from_resource" => self.from = value.parse()?,
            "to_resource" => self.to = value.parse()?,
            _ => {}
        }
        Ok(())
    }
    pub fn query(&self, _owner: &Entity, _game: &Game) -> Vec<(String, Value)> {
        vec![
            ("rate".into(), json!({ "value": self.rate })),
            ("from_resource".into(), json!({ "value": self.from })),
            ("to_resource".into(), json!({ "value": self.to })),
        ]
    }
}
