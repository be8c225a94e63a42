use pawn_defence_core::{EconomyConfig, Element, SpendError, UpgradeLevels};

/// Gold, spawn pricing, upgrade levels and player health.
#[derive(Clone, Debug)]
pub(crate) struct Economy {
    gold: u32,
    spawn_cost: u32,
    spawn_cost_step: u32,
    upgrade_cost_multiplier: u32,
    levels: [u32; 6],
    player_health: u32,
}

impl Economy {
    pub(crate) fn new(config: &EconomyConfig) -> Self {
        Self {
            gold: config.starting_gold,
            spawn_cost: config.spawn_cost,
            spawn_cost_step: config.spawn_cost_step.max(1),
            upgrade_cost_multiplier: config.upgrade_cost_multiplier,
            levels: [1; 6],
            player_health: config.player_health,
        }
    }

    pub(crate) fn gold(&self) -> u32 {
        self.gold
    }

    pub(crate) fn spawn_cost(&self) -> u32 {
        self.spawn_cost
    }

    pub(crate) fn player_health(&self) -> u32 {
        self.player_health
    }

    pub(crate) fn levels(&self) -> UpgradeLevels {
        UpgradeLevels::new(self.levels)
    }

    pub(crate) fn upgrade_cost(&self, element: Element) -> u32 {
        self.levels[element.index()].saturating_mul(self.upgrade_cost_multiplier)
    }

    /// Deducts `cost` or leaves the balance untouched.
    pub(crate) fn spend(&mut self, cost: u32) -> Result<(), SpendError> {
        if cost > self.gold {
            return Err(SpendError::InsufficientGold {
                cost,
                gold: self.gold,
            });
        }
        self.gold -= cost;
        Ok(())
    }

    /// Pays the current spawn cost and raises the next one.
    pub(crate) fn try_spend_for_spawn(&mut self) -> Result<u32, SpendError> {
        let cost = self.spawn_cost;
        self.spend(cost)?;
        self.spawn_cost = self.spawn_cost.saturating_add(self.spawn_cost_step);
        Ok(cost)
    }

    pub(crate) fn add_gold(&mut self, amount: u32) {
        self.gold = self.gold.saturating_add(amount);
    }

    /// Buys one level for the element and returns the new level.
    pub(crate) fn upgrade(&mut self, element: Element) -> Result<u32, SpendError> {
        self.spend(self.upgrade_cost(element))?;
        let level = &mut self.levels[element.index()];
        *level = level.saturating_add(1);
        Ok(*level)
    }

    /// Removes one point of player health and returns the remainder.
    pub(crate) fn lose_health(&mut self) -> u32 {
        self.player_health = self.player_health.saturating_sub(1);
        self.player_health
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_spending_never_goes_negative() {
        let mut economy = Economy::new(&EconomyConfig {
            starting_gold: 45,
            ..EconomyConfig::default()
        });

        assert_eq!(economy.try_spend_for_spawn(), Ok(20));
        assert_eq!(economy.spawn_cost(), 25);
        assert_eq!(economy.try_spend_for_spawn(), Ok(25));
        assert_eq!(economy.gold(), 0);
        assert_eq!(
            economy.try_spend_for_spawn(),
            Err(SpendError::InsufficientGold { cost: 30, gold: 0 })
        );
        assert_eq!(economy.spawn_cost(), 30);
    }

    #[test]
    fn spawn_cost_strictly_increases_even_without_a_step() {
        let mut economy = Economy::new(&EconomyConfig {
            spawn_cost_step: 0,
            ..EconomyConfig::default()
        });
        let before = economy.spawn_cost();
        let _ = economy.try_spend_for_spawn();
        assert!(economy.spawn_cost() > before);
    }

    #[test]
    fn upgrades_cost_level_times_multiplier() {
        let mut economy = Economy::new(&EconomyConfig {
            starting_gold: 250,
            ..EconomyConfig::default()
        });

        assert_eq!(economy.upgrade(Element::Wind), Ok(2));
        assert_eq!(economy.gold(), 150);
        assert_eq!(economy.upgrade_cost(Element::Wind), 200);
        assert_eq!(
            economy.upgrade(Element::Wind),
            Err(SpendError::InsufficientGold {
                cost: 200,
                gold: 150
            })
        );
        assert_eq!(economy.levels().level(Element::Wind), 2);
        assert_eq!(economy.levels().level(Element::Ice), 1);
    }

    #[test]
    fn player_health_saturates_at_zero() {
        let mut economy = Economy::new(&EconomyConfig {
            player_health: 1,
            ..EconomyConfig::default()
        });
        assert_eq!(economy.lose_health(), 0);
        assert_eq!(economy.lose_health(), 0);
    }
}
