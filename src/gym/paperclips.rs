use std::str::FromStr;

use rand::{rngs::StdRng, SeedableRng};
use rand_distr::{Distribution, LogNormal};
use strum::{AsRefStr, Display, EnumString, VariantArray};

use crate::{
    env::Environment,
    error::{Error, Result},
};

/// Actions available in the [`PaperclipFactory`]
#[derive(AsRefStr, Display, EnumString, VariantArray, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[strum(serialize_all = "snake_case")]
pub enum FactoryAction {
    MakeClip,
    BuyWire,
    RaisePrice,
    LowerPrice,
}

impl FactoryAction {
    /// Ids of every action, as passed to a selector
    pub fn ids() -> Vec<String> {
        Self::VARIANTS.iter().map(ToString::to_string).collect()
    }
}

const WIRE_PER_SPOOL: f64 = 100.0;
const PRICE_STEP: f64 = 0.01;
const MIN_PRICE: f64 = 0.01;

/// A small simulation of an incremental paperclip game
///
/// Clips are made by hand from wire, wire is bought with funds, and unsold clips sell over time
/// at a rate set by demand, which falls as the price rises. The world advances by one tick every
/// time the return (total clips made) is read.
///
/// Features: `clips`, `funds`, `unsold`, `wire`, `price`, `demand`, `wire_cost`.
#[derive(Debug, Clone)]
pub struct PaperclipFactory {
    clips: f64,
    funds: f64,
    unsold: f64,
    wire: f64,
    price: f64,
    wire_cost: f64,
    noise: LogNormal<f64>,
    rng: StdRng,
}

impl PaperclipFactory {
    pub fn new(seed: u64) -> Result<Self> {
        Ok(Self {
            clips: 0.0,
            funds: 0.0,
            unsold: 0.0,
            wire: 1000.0,
            price: 0.25,
            wire_cost: 20.0,
            noise: LogNormal::new(0.0, 0.25).map_err(|e| Error::config(e.to_string()))?,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Clips sold per tick at the current price
    pub fn demand(&self) -> f64 {
        0.8 / self.price
    }

    fn tick(&mut self) {
        let sold = (self.demand() * self.noise.sample(&mut self.rng))
            .floor()
            .min(self.unsold);
        self.unsold -= sold;
        self.funds += sold * self.price;
        self.wire_cost = (self.wire_cost + self.noise.sample(&mut self.rng) - 1.0).clamp(10.0, 30.0);
    }

    fn perform(&mut self, action: FactoryAction) -> std::result::Result<(), &'static str> {
        match action {
            FactoryAction::MakeClip if self.wire < 1.0 => return Err("out of wire"),
            FactoryAction::MakeClip => {
                self.wire -= 1.0;
                self.clips += 1.0;
                self.unsold += 1.0;
            }
            FactoryAction::BuyWire if self.funds < self.wire_cost => return Err("not enough funds"),
            FactoryAction::BuyWire => {
                self.funds -= self.wire_cost;
                self.wire += WIRE_PER_SPOOL;
            }
            FactoryAction::RaisePrice => self.price += PRICE_STEP,
            FactoryAction::LowerPrice => self.price = (self.price - PRICE_STEP).max(MIN_PRICE),
        }
        Ok(())
    }
}

impl Environment for PaperclipFactory {
    fn read_feature(&mut self, name: &str) -> Result<f64> {
        Ok(match name {
            "clips" => self.clips,
            "funds" => self.funds,
            "unsold" => self.unsold,
            "wire" => self.wire,
            "price" => self.price,
            "demand" => self.demand(),
            "wire_cost" => self.wire_cost,
            _ => return Err(Error::unavailable(name, "no such readout")),
        })
    }

    fn read_return(&mut self) -> Result<f64> {
        self.tick();
        Ok(self.clips)
    }

    fn apply_action(&mut self, action_id: &str) -> Result<()> {
        let action = FactoryAction::from_str(action_id)
            .map_err(|_| Error::action_failed(action_id, "no such button"))?;
        self.perform(action)
            .map_err(|reason| Error::action_failed(action_id, reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_ids_are_snake_case() {
        assert_eq!(
            FactoryAction::ids(),
            ["make_clip", "buy_wire", "raise_price", "lower_price"]
        );
    }

    #[test]
    fn making_clips_uses_wire() {
        let mut env = PaperclipFactory::new(0).unwrap();
        env.apply_action("make_clip").unwrap();
        env.apply_action("make_clip").unwrap();
        assert_eq!(env.read_feature("wire"), Ok(998.0));
        assert_eq!(env.read_return(), Ok(2.0));
    }

    #[test]
    fn buying_wire_needs_funds() {
        let mut env = PaperclipFactory::new(0).unwrap();
        assert!(matches!(
            env.apply_action("buy_wire"),
            Err(Error::ActionApplicationFailed { .. })
        ));
        assert!(env.apply_action("paint_clips").is_err());
    }

    #[test]
    fn sales_turn_clips_into_funds() {
        let mut env = PaperclipFactory::new(3).unwrap();
        for _ in 0..20 {
            env.apply_action("make_clip").unwrap();
        }
        for _ in 0..10 {
            env.read_return().unwrap();
        }
        let unsold = env.read_feature("unsold").unwrap();
        let funds = env.read_feature("funds").unwrap();
        assert!(unsold < 20.0);
        assert!((funds - (20.0 - unsold) * 0.25).abs() < 1e-9);
    }

    #[test]
    fn price_has_a_floor() {
        let mut env = PaperclipFactory::new(0).unwrap();
        for _ in 0..100 {
            env.apply_action("lower_price").unwrap();
        }
        assert_eq!(env.read_feature("price"), Ok(MIN_PRICE));
    }
}
