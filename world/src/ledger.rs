//! Economy counters and the rules that keep them non-negative.

use village_defence_core::{Cost, LedgerSnapshot, Resource};

/// Mutable record of every economy counter.
///
/// All counters are unsigned; decrements saturate at zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceLedger {
    day: u32,
    people: u32,
    population: u32,
    food: u32,
    wood: u32,
    metal: u32,
    stone: u32,
}

/// Result of feeding the population for one day.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FoodOutcome {
    /// Everybody ate; the food store shrank by `eaten`.
    Fed {
        /// Food removed from the store.
        eaten: u32,
    },
    /// The store ran dry and `shortfall` inhabitants were lost.
    Shortfall {
        /// Inhabitants that could not be fed.
        shortfall: u32,
    },
}

impl ResourceLedger {
    /// Creates a ledger seeded from the provided counters.
    ///
    /// A day of zero is raised to one.
    #[must_use]
    pub fn new(start: LedgerSnapshot) -> Self {
        Self {
            day: start.day.max(1),
            people: start.people,
            population: start.population,
            food: start.food,
            wood: start.wood,
            metal: start.metal,
            stone: start.stone,
        }
    }

    /// Copies every counter into a snapshot.
    #[must_use]
    pub const fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            day: self.day,
            people: self.people,
            population: self.population,
            food: self.food,
            wood: self.wood,
            metal: self.metal,
            stone: self.stone,
        }
    }

    /// Current day.
    #[must_use]
    pub const fn day(&self) -> u32 {
        self.day
    }

    /// Idle inhabitants.
    #[must_use]
    pub const fn people(&self) -> u32 {
        self.people
    }

    /// Total inhabitants.
    #[must_use]
    pub const fn population(&self) -> u32 {
        self.population
    }

    /// Stored amount of a resource.
    #[must_use]
    pub const fn amount(&self, resource: Resource) -> u32 {
        match resource {
            Resource::People => self.people,
            Resource::Food => self.food,
            Resource::Wood => self.wood,
            Resource::Metal => self.metal,
            Resource::Stone => self.stone,
        }
    }

    /// Amounts that can be spent on construction, expressed as a [`Cost`].
    #[must_use]
    pub const fn holdings(&self) -> Cost {
        Cost::new(self.people, self.wood, self.metal, self.stone)
    }

    pub(crate) fn debit(&mut self, cost: Cost) {
        self.people = self.people.saturating_sub(cost.people);
        self.wood = self.wood.saturating_sub(cost.wood);
        self.metal = self.metal.saturating_sub(cost.metal);
        self.stone = self.stone.saturating_sub(cost.stone);
    }

    pub(crate) fn credit(&mut self, resource: Resource, amount: u32) {
        let counter = match resource {
            Resource::People => &mut self.people,
            Resource::Food => &mut self.food,
            Resource::Wood => &mut self.wood,
            Resource::Metal => &mut self.metal,
            Resource::Stone => &mut self.stone,
        };
        *counter = counter.saturating_add(amount);
    }

    pub(crate) fn house(&mut self, capacity: u32) {
        self.people = self.people.saturating_add(capacity);
        self.population = self.population.saturating_add(capacity);
    }

    /// Demolishing a house evicts a single inhabitant, not its full capacity.
    pub(crate) fn evict_one(&mut self) {
        self.population = self.population.saturating_sub(1);
        self.people = self.people.saturating_sub(1);
    }

    pub(crate) fn begin_day(&mut self) -> u32 {
        self.day = self.day.saturating_add(1);
        self.day
    }

    /// Feeds the population; `staffed` is the number of inhabitants working in
    /// buildings, which stay employed after a shortfall.
    pub(crate) fn consume_food(&mut self, staffed: u32) -> FoodOutcome {
        if self.food >= self.population {
            let eaten = self.population;
            self.food -= eaten;
            return FoodOutcome::Fed { eaten };
        }

        let shortfall = self.population - self.food;
        self.population = self.food;
        self.people = self.population.saturating_sub(staffed);
        self.food = 0;
        FoodOutcome::Shortfall { shortfall }
    }
}
