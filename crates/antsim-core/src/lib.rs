//! Colony simulation core shared across the antsim workspace.

use rand::{Rng, SeedableRng, rngs::SmallRng};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use thiserror::Error;

const FULL_TURN: f32 = std::f32::consts::TAU;

/// Clamps a scalar coordinate into `[0, extent]`.
fn clamp_position(value: f32, extent: f32) -> f32 {
    value.clamp(0.0, extent)
}

/// High level simulation clock (ticks processed since boot).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tick(pub u64);

impl Tick {
    /// Returns the next sequential tick.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Resets the tick counter back to zero.
    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }
}

/// Axis-aligned 2D position in world coordinates.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    /// Construct a new position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position.
    #[must_use]
    pub fn distance_to(self, other: Self) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Bearing (radians) of the vector from `self` toward `other`.
    #[must_use]
    pub fn bearing_to(self, other: Self) -> f32 {
        (other.y - self.y).atan2(other.x - self.x)
    }
}

/// Caste assigned to an ant when it is spawned.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Role {
    Queen,
    Soldier,
    Worker,
}

impl Role {
    /// Whether ants of this role move at all. Queens hold position for life.
    #[must_use]
    pub const fn is_mobile(self) -> bool {
        !matches!(self, Self::Queen)
    }

    /// Whether ants of this role take part in foraging.
    #[must_use]
    pub const fn forages(self) -> bool {
        matches!(self, Self::Worker)
    }
}

/// Scalar state for a single ant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Ant {
    pub position: Position,
    pub heading: f32,
    pub role: Role,
    pub carrying_food: bool,
}

impl Ant {
    /// Creates an ant of the given role at `position` facing `heading`.
    #[must_use]
    pub const fn new(role: Role, position: Position, heading: f32) -> Self {
        Self {
            position,
            heading,
            role,
            carrying_food: false,
        }
    }
}

/// Depletable point resource scattered across the map at startup.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FoodSource {
    position: Position,
    amount: u32,
}

impl FoodSource {
    /// Creates a source holding `amount` units at `position`.
    #[must_use]
    pub const fn new(position: Position, amount: u32) -> Self {
        Self { position, amount }
    }

    /// Location of the source in world coordinates.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Units left in the source.
    #[must_use]
    pub const fn amount(&self) -> u32 {
        self.amount
    }

    /// Whether the source has been picked clean. Empty sources stay on the
    /// map; they just stop being valid pickup targets.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.amount == 0
    }

    /// Takes one unit from the source. Returns `false` without mutating once
    /// the source is empty.
    pub fn try_harvest(&mut self) -> bool {
        if self.amount == 0 {
            return false;
        }
        self.amount -= 1;
        true
    }

    /// Presentation radius derived from the remaining amount.
    #[must_use]
    pub fn display_radius(&self, min_radius: f32, scale: f32) -> f32 {
        (self.amount as f32 / scale).max(min_radius)
    }
}

/// Events emitted after processing a world tick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TickEvents {
    pub tick: Tick,
    pub pickups: u32,
    pub deliveries: u32,
    pub worker_spawned: bool,
    pub stats_sampled: bool,
}

/// Colony metrics captured at a fixed cadence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatsSample {
    pub tick: Tick,
    pub colony_size: usize,
    pub food_collected: u64,
}

/// Bounded FIFO history of colony metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsTracker {
    capacity: usize,
    samples: VecDeque<StatsSample>,
}

impl StatsTracker {
    /// Creates a tracker retaining at most `capacity` samples.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    /// Appends a sample, evicting the oldest retained one when full.
    pub fn record(&mut self, sample: StatsSample) {
        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Iterate over retained samples, oldest first.
    pub fn samples(&self) -> impl Iterator<Item = &StatsSample> {
        self.samples.iter()
    }

    /// Colony-size series, oldest first.
    pub fn colony_sizes(&self) -> impl Iterator<Item = usize> + '_ {
        self.samples.iter().map(|sample| sample.colony_size)
    }

    /// Cumulative-food series, oldest first.
    pub fn food_totals(&self) -> impl Iterator<Item = u64> + '_ {
        self.samples.iter().map(|sample| sample.food_collected)
    }

    /// Most recent sample, if any has been recorded yet.
    #[must_use]
    pub fn latest(&self) -> Option<&StatsSample> {
        self.samples.back()
    }

    /// Number of retained samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Maximum number of samples retained.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Errors that can occur when constructing world state.
#[derive(Debug, Error)]
pub enum WorldStateError {
    /// Indicates an invalid configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

/// Static configuration for a colony world.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColonyConfig {
    /// Width of the map in world units.
    pub map_width: u32,
    /// Height of the map in world units.
    pub map_height: u32,
    /// Optional RNG seed for reproducible colonies.
    pub rng_seed: Option<u64>,
    /// Nest location; `None` places the nest at the map center.
    pub nest_position: Option<Position>,
    /// Total starting population including the queen and soldiers.
    pub initial_colony_size: usize,
    /// Soldiers spawned at startup.
    pub soldier_count: usize,
    /// Food sources scattered at startup.
    pub food_source_count: usize,
    /// Units of food held by each fresh source.
    pub food_source_amount: u32,
    /// Inset from the map edges inside which food never spawns.
    pub food_margin: f32,
    /// Distance every mobile ant covers per tick.
    pub ant_speed: f32,
    /// Half-range of the uniform heading perturbation per tick (radians).
    pub heading_jitter: f32,
    /// Distance within which a worker can pick from a food source.
    pub pickup_radius: f32,
    /// Distance to the nest within which a carrying worker delivers.
    pub delivery_radius: f32,
    /// Ticks between growth spawns; 0 disables growth.
    pub growth_interval: u32,
    /// Population ceiling enforced on growth spawns.
    pub population_cap: usize,
    /// Ticks between stats samples; 0 disables sampling.
    pub stats_interval: u32,
    /// Maximum number of stats samples retained in-memory.
    pub stats_capacity: usize,
    /// Smallest presentation radius for a food source.
    pub food_min_radius: f32,
    /// Divisor converting remaining food into a presentation radius.
    pub food_radius_scale: f32,
}

impl Default for ColonyConfig {
    fn default() -> Self {
        Self {
            map_width: 1_600,
            map_height: 1_200,
            rng_seed: None,
            nest_position: None,
            initial_colony_size: 50,
            soldier_count: 5,
            food_source_count: 5,
            food_source_amount: 100,
            food_margin: 50.0,
            ant_speed: 2.0,
            heading_jitter: 0.3,
            pickup_radius: 10.0,
            delivery_radius: 10.0,
            growth_interval: 300,
            population_cap: 150,
            stats_interval: 60,
            stats_capacity: 50,
            food_min_radius: 4.0,
            food_radius_scale: 10.0,
        }
    }
}

impl ColonyConfig {
    /// Validates the configuration, returning the resolved nest position.
    fn resolved_nest(&self) -> Result<Position, WorldStateError> {
        if self.map_width == 0 || self.map_height == 0 {
            return Err(WorldStateError::InvalidConfig(
                "map dimensions must be non-zero",
            ));
        }
        let width = self.map_width as f32;
        let height = self.map_height as f32;
        if self.initial_colony_size < self.soldier_count + 1 {
            return Err(WorldStateError::InvalidConfig(
                "initial colony must fit the queen and all soldiers",
            ));
        }
        if self.ant_speed < 0.0 || self.heading_jitter < 0.0 {
            return Err(WorldStateError::InvalidConfig(
                "ant_speed and heading_jitter must be non-negative",
            ));
        }
        if self.pickup_radius <= 0.0 || self.delivery_radius <= 0.0 {
            return Err(WorldStateError::InvalidConfig(
                "pickup and delivery radii must be positive",
            ));
        }
        if self.stats_capacity == 0 {
            return Err(WorldStateError::InvalidConfig(
                "stats_capacity must be non-zero",
            ));
        }
        if self.food_min_radius < 0.0 || self.food_radius_scale <= 0.0 {
            return Err(WorldStateError::InvalidConfig(
                "food radius presentation parameters must be positive",
            ));
        }
        if self.food_margin < 0.0
            || (self.food_source_count > 0
                && (self.food_margin * 2.0 > width || self.food_margin * 2.0 > height))
        {
            return Err(WorldStateError::InvalidConfig(
                "food_margin leaves no room to place food sources",
            ));
        }
        let nest = match self.nest_position {
            Some(nest) => {
                if !(0.0..=width).contains(&nest.x) || !(0.0..=height).contains(&nest.y) {
                    return Err(WorldStateError::InvalidConfig(
                        "nest_position must lie inside the map",
                    ));
                }
                nest
            }
            None => Position::new(width / 2.0, height / 2.0),
        };
        Ok(nest)
    }

    /// Returns the configured RNG, generating a seed from entropy if absent.
    fn seeded_rng(&self) -> SmallRng {
        match self.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => {
                let seed: u64 = rand::random();
                SmallRng::seed_from_u64(seed)
            }
        }
    }
}

/// Scatters the configured batch of food sources across the map.
fn scatter_food(config: &ColonyConfig, rng: &mut SmallRng) -> Vec<FoodSource> {
    let min_x = config.food_margin;
    let max_x = config.map_width as f32 - config.food_margin;
    let min_y = config.food_margin;
    let max_y = config.map_height as f32 - config.food_margin;
    (0..config.food_source_count)
        .map(|_| {
            let x = rng.random_range(min_x..=max_x);
            let y = rng.random_range(min_y..=max_y);
            FoodSource::new(Position::new(x, y), config.food_source_amount)
        })
        .collect()
}

/// Aggregate simulation state advanced once per frame by the driver loop.
pub struct WorldState {
    config: ColonyConfig,
    tick: Tick,
    rng: SmallRng,
    nest: Position,
    ants: Vec<Ant>,
    food: Vec<FoodSource>,
    total_food_collected: u64,
    growth_timer: u32,
    stats_timer: u32,
    stats: StatsTracker,
}

impl fmt::Debug for WorldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorldState")
            .field("tick", &self.tick)
            .field("colony_size", &self.ants.len())
            .field("food_sources", &self.food.len())
            .field("total_food_collected", &self.total_food_collected)
            .finish()
    }
}

impl WorldState {
    /// Instantiate a new world using the supplied configuration.
    pub fn new(config: ColonyConfig) -> Result<Self, WorldStateError> {
        let nest = config.resolved_nest()?;
        let mut rng = config.seeded_rng();
        let food = scatter_food(&config, &mut rng);
        let stats = StatsTracker::new(config.stats_capacity);
        Ok(Self {
            tick: Tick::zero(),
            rng,
            nest,
            ants: Vec::new(),
            food,
            total_food_collected: 0,
            growth_timer: 0,
            stats_timer: 0,
            stats,
            config,
        })
    }

    /// Seeds the colony: one queen, the configured soldiers, workers for the
    /// remainder, all placed at the nest in that order.
    pub fn spawn_initial_population(&mut self) {
        let soldiers = self.config.soldier_count;
        let workers = self.config.initial_colony_size.saturating_sub(soldiers + 1);
        self.spawn_ant(Role::Queen);
        for _ in 0..soldiers {
            self.spawn_ant(Role::Soldier);
        }
        for _ in 0..workers {
            self.spawn_ant(Role::Worker);
        }
    }

    /// Spawns one ant at the nest with a random heading, returning its index.
    pub fn spawn_ant(&mut self, role: Role) -> usize {
        let heading = self.rng.random_range(0.0..FULL_TURN);
        self.ants.push(Ant::new(role, self.nest, heading));
        self.ants.len() - 1
    }

    /// Registers an extra food source, returning its index in scan order.
    pub fn add_food_source(&mut self, position: Position, amount: u32) -> usize {
        self.food.push(FoodSource::new(position, amount));
        self.food.len() - 1
    }

    fn stage_movement(&mut self) {
        let width = self.config.map_width as f32;
        let height = self.config.map_height as f32;
        let speed = self.config.ant_speed;
        let jitter = self.config.heading_jitter;
        for ant in &mut self.ants {
            if !ant.role.is_mobile() {
                continue;
            }
            if jitter > 0.0 {
                ant.heading += self.rng.random_range(-jitter..=jitter);
            }
            ant.position.x = clamp_position(ant.position.x + ant.heading.cos() * speed, width);
            ant.position.y = clamp_position(ant.position.y + ant.heading.sin() * speed, height);
        }
    }

    fn stage_foraging(&mut self) -> (u32, u32) {
        let pickup_radius = self.config.pickup_radius;
        let delivery_radius = self.config.delivery_radius;
        let nest = self.nest;
        let mut pickups = 0;
        let mut deliveries = 0;
        for ant in &mut self.ants {
            if !ant.role.forages() {
                continue;
            }
            if ant.carrying_food {
                ant.heading = ant.position.bearing_to(nest);
                if ant.position.distance_to(nest) < delivery_radius {
                    ant.carrying_food = false;
                    self.total_food_collected += 1;
                    deliveries += 1;
                }
            } else {
                // First source in list order wins; the scan is not
                // distance-sorted, and empty sources are skipped in place.
                for source in &mut self.food {
                    if ant.position.distance_to(source.position) < pickup_radius
                        && source.try_harvest()
                    {
                        ant.carrying_food = true;
                        ant.heading = ant.position.bearing_to(nest);
                        pickups += 1;
                        break;
                    }
                }
            }
        }
        (pickups, deliveries)
    }

    fn stage_growth(&mut self) -> bool {
        let interval = self.config.growth_interval;
        if interval == 0 {
            return false;
        }
        self.growth_timer += 1;
        if self.growth_timer < interval {
            return false;
        }
        self.growth_timer = 0;
        if self.ants.len() >= self.config.population_cap {
            return false;
        }
        self.spawn_ant(Role::Worker);
        true
    }

    fn stage_stats(&mut self, next_tick: Tick) -> bool {
        let interval = self.config.stats_interval;
        if interval == 0 {
            return false;
        }
        self.stats_timer += 1;
        if self.stats_timer < interval {
            return false;
        }
        self.stats_timer = 0;
        self.stats.record(StatsSample {
            tick: next_tick,
            colony_size: self.ants.len(),
            food_collected: self.total_food_collected,
        });
        true
    }

    /// Execute one simulation tick pipeline returning emitted events.
    pub fn step(&mut self) -> TickEvents {
        let next_tick = self.tick.next();

        self.stage_movement();
        let (pickups, deliveries) = self.stage_foraging();
        let worker_spawned = self.stage_growth();
        let stats_sampled = self.stage_stats(next_tick);

        self.tick = next_tick;
        TickEvents {
            tick: next_tick,
            pickups,
            deliveries,
            worker_spawned,
            stats_sampled,
        }
    }

    /// Returns an immutable reference to configuration.
    #[must_use]
    pub fn config(&self) -> &ColonyConfig {
        &self.config
    }

    /// Current simulation tick.
    #[must_use]
    pub const fn tick(&self) -> Tick {
        self.tick
    }

    /// Fixed nest location resolved at construction.
    #[must_use]
    pub const fn nest(&self) -> Position {
        self.nest
    }

    /// Read-only view of the colony, in spawn order.
    #[must_use]
    pub fn ants(&self) -> &[Ant] {
        &self.ants
    }

    /// Mutable view of the colony (for scripted placements).
    #[must_use]
    pub fn ants_mut(&mut self) -> &mut [Ant] {
        &mut self.ants
    }

    /// Read-only view of the food sources, in scan order.
    #[must_use]
    pub fn food(&self) -> &[FoodSource] {
        &self.food
    }

    /// Number of live ants.
    #[must_use]
    pub fn colony_size(&self) -> usize {
        self.ants.len()
    }

    /// Units of food delivered to the nest since boot.
    #[must_use]
    pub const fn total_food_collected(&self) -> u64 {
        self.total_food_collected
    }

    /// Rolling metrics history.
    #[must_use]
    pub fn stats(&self) -> &StatsTracker {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    fn quiet_config() -> ColonyConfig {
        ColonyConfig {
            rng_seed: Some(7),
            food_source_count: 0,
            ant_speed: 0.0,
            heading_jitter: 0.0,
            growth_interval: 0,
            stats_interval: 0,
            ..ColonyConfig::default()
        }
    }

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn clamp_position_pins_to_extent() {
        assert_eq!(clamp_position(-3.0, 100.0), 0.0);
        assert_eq!(clamp_position(42.0, 100.0), 42.0);
        assert_eq!(clamp_position(120.0, 100.0), 100.0);
    }

    #[test]
    fn try_harvest_decrements_until_empty() {
        let mut source = FoodSource::new(Position::new(10.0, 10.0), 2);
        assert!(source.try_harvest());
        assert_eq!(source.amount(), 1);
        assert!(source.try_harvest());
        assert_eq!(source.amount(), 0);
        assert!(source.is_depleted());
        assert!(!source.try_harvest());
        assert_eq!(source.amount(), 0);
    }

    #[test]
    fn display_radius_floors_at_minimum() {
        let full = FoodSource::new(Position::default(), 100);
        assert!(approx_eq(full.display_radius(4.0, 10.0), 10.0));
        let nearly_empty = FoodSource::new(Position::default(), 12);
        assert!(approx_eq(nearly_empty.display_radius(4.0, 10.0), 4.0));
        let empty = FoodSource::new(Position::default(), 0);
        assert!(approx_eq(empty.display_radius(4.0, 10.0), 4.0));
    }

    #[test]
    fn stats_tracker_evicts_oldest() {
        let mut tracker = StatsTracker::new(2);
        for tick in 1..=3_u64 {
            tracker.record(StatsSample {
                tick: Tick(tick),
                colony_size: tick as usize,
                food_collected: tick * 10,
            });
        }
        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.capacity(), 2);
        let ticks: Vec<u64> = tracker.samples().map(|sample| sample.tick.0).collect();
        assert_eq!(ticks, vec![2, 3]);
        let sizes: Vec<usize> = tracker.colony_sizes().collect();
        assert_eq!(sizes, vec![2, 3]);
        let totals: Vec<u64> = tracker.food_totals().collect();
        assert_eq!(totals, vec![20, 30]);
        assert_eq!(tracker.latest().map(|sample| sample.tick), Some(Tick(3)));
    }

    #[test]
    fn config_validation_rejects_bad_geometry() {
        let zero_map = ColonyConfig {
            map_width: 0,
            ..ColonyConfig::default()
        };
        assert!(matches!(
            WorldState::new(zero_map),
            Err(WorldStateError::InvalidConfig(_))
        ));

        let crowded = ColonyConfig {
            initial_colony_size: 3,
            soldier_count: 5,
            ..ColonyConfig::default()
        };
        assert!(matches!(
            WorldState::new(crowded),
            Err(WorldStateError::InvalidConfig(_))
        ));

        let no_radius = ColonyConfig {
            pickup_radius: 0.0,
            ..ColonyConfig::default()
        };
        assert!(matches!(
            WorldState::new(no_radius),
            Err(WorldStateError::InvalidConfig(_))
        ));

        let no_history = ColonyConfig {
            stats_capacity: 0,
            ..ColonyConfig::default()
        };
        assert!(matches!(
            WorldState::new(no_history),
            Err(WorldStateError::InvalidConfig(_))
        ));

        let wide_margin = ColonyConfig {
            map_width: 100,
            map_height: 100,
            food_margin: 60.0,
            ..ColonyConfig::default()
        };
        assert!(matches!(
            WorldState::new(wide_margin),
            Err(WorldStateError::InvalidConfig(_))
        ));

        let stray_nest = ColonyConfig {
            nest_position: Some(Position::new(2_000.0, 600.0)),
            ..ColonyConfig::default()
        };
        assert!(matches!(
            WorldState::new(stray_nest),
            Err(WorldStateError::InvalidConfig(_))
        ));
    }

    #[test]
    fn world_initialises_from_config() {
        let config = ColonyConfig {
            rng_seed: Some(42),
            ..ColonyConfig::default()
        };
        let world = WorldState::new(config).expect("world");
        assert_eq!(world.tick(), Tick::zero());
        assert_eq!(world.colony_size(), 0);
        assert_eq!(world.total_food_collected(), 0);
        assert!(approx_eq(world.nest().x, 800.0));
        assert!(approx_eq(world.nest().y, 600.0));
        assert_eq!(world.food().len(), 5);
        for source in world.food() {
            assert_eq!(source.amount(), 100);
            let position = source.position();
            assert!((50.0..=1_550.0).contains(&position.x));
            assert!((50.0..=1_150.0).contains(&position.y));
        }
    }

    #[test]
    fn initial_population_composition() {
        let config = ColonyConfig {
            rng_seed: Some(3),
            ..ColonyConfig::default()
        };
        let mut world = WorldState::new(config).expect("world");
        world.spawn_initial_population();
        assert_eq!(world.colony_size(), 50);
        assert_eq!(world.ants()[0].role, Role::Queen);
        let soldiers = world
            .ants()
            .iter()
            .filter(|ant| ant.role == Role::Soldier)
            .count();
        let workers = world
            .ants()
            .iter()
            .filter(|ant| ant.role == Role::Worker)
            .count();
        assert_eq!(soldiers, 5);
        assert_eq!(workers, 44);
        for ant in world.ants() {
            assert!(approx_eq(ant.position.x, 800.0));
            assert!(approx_eq(ant.position.y, 600.0));
            assert!(!ant.carrying_food);
            assert!((0.0..FULL_TURN).contains(&ant.heading));
        }
    }

    #[test]
    fn queen_never_moves() {
        let config = ColonyConfig {
            rng_seed: Some(11),
            heading_jitter: 1.5,
            ant_speed: 8.0,
            ..ColonyConfig::default()
        };
        let mut world = WorldState::new(config).expect("world");
        world.spawn_initial_population();
        let queen_before = world.ants()[0];
        for _ in 0..50 {
            world.step();
        }
        let queen_after = world.ants()[0];
        assert_eq!(queen_before.position, queen_after.position);
        assert!(approx_eq(queen_before.heading, queen_after.heading));
        assert!(!queen_after.carrying_food);
    }

    #[test]
    fn movement_advances_along_heading() {
        let mut config = quiet_config();
        config.ant_speed = 2.0;
        let mut world = WorldState::new(config).expect("world");
        let idx = world.spawn_ant(Role::Worker);
        world.ants_mut()[idx].heading = 0.0;
        world.step();
        let ant = world.ants()[idx];
        assert!(approx_eq(ant.position.x, 802.0));
        assert!(approx_eq(ant.position.y, 600.0));
    }

    #[test]
    fn movement_clamps_to_map_bounds() {
        let mut config = quiet_config();
        config.map_width = 100;
        config.map_height = 100;
        config.ant_speed = 5.0;
        let mut world = WorldState::new(config).expect("world");
        let idx = world.spawn_ant(Role::Worker);
        {
            let ant = &mut world.ants_mut()[idx];
            ant.position = Position::new(2.0, 50.0);
            ant.heading = PI;
        }
        world.step();
        let ant = world.ants()[idx];
        assert_eq!(ant.position.x, 0.0);
        assert!(approx_eq(ant.position.y, 50.0));
    }

    #[test]
    fn pickup_prefers_first_listed_source() {
        let mut world = WorldState::new(quiet_config()).expect("world");
        let idx = world.spawn_ant(Role::Worker);
        let far = world.add_food_source(Position::new(800.0, 609.0), 10);
        let near = world.add_food_source(Position::new(800.0, 601.0), 10);
        let events = world.step();
        assert_eq!(events.pickups, 1);
        assert!(world.ants()[idx].carrying_food);
        assert_eq!(world.food()[far].amount(), 9);
        assert_eq!(world.food()[near].amount(), 10);
    }

    #[test]
    fn pickup_aims_worker_at_nest() {
        let mut world = WorldState::new(quiet_config()).expect("world");
        let idx = world.spawn_ant(Role::Worker);
        world.ants_mut()[idx].position = Position::new(790.0, 590.0);
        world.add_food_source(Position::new(795.0, 590.0), 1);
        world.step();
        let ant = world.ants()[idx];
        assert!(ant.carrying_food);
        assert!(approx_eq(ant.heading, FRAC_PI_4));
    }

    #[test]
    fn empty_sources_are_skipped() {
        let mut world = WorldState::new(quiet_config()).expect("world");
        let idx = world.spawn_ant(Role::Worker);
        let empty = world.add_food_source(Position::new(800.0, 603.0), 0);
        let stocked = world.add_food_source(Position::new(800.0, 606.0), 4);
        let events = world.step();
        assert_eq!(events.pickups, 1);
        assert!(world.ants()[idx].carrying_food);
        assert_eq!(world.food()[empty].amount(), 0);
        assert_eq!(world.food()[stocked].amount(), 3);
    }

    #[test]
    fn contested_source_feeds_one_worker_per_unit() {
        let mut world = WorldState::new(quiet_config()).expect("world");
        let first = world.spawn_ant(Role::Worker);
        let second = world.spawn_ant(Role::Worker);
        world.add_food_source(Position::new(800.0, 604.0), 1);
        world.step();
        assert!(world.ants()[first].carrying_food);
        assert!(!world.ants()[second].carrying_food);
        assert!(world.food()[0].is_depleted());
    }

    #[test]
    fn soldiers_never_forage() {
        let mut world = WorldState::new(quiet_config()).expect("world");
        let idx = world.spawn_ant(Role::Soldier);
        world.add_food_source(Position::new(800.0, 600.0), 5);
        for _ in 0..10 {
            world.step();
        }
        assert!(!world.ants()[idx].carrying_food);
        assert_eq!(world.food()[0].amount(), 5);
    }

    #[test]
    fn delivery_increments_total_once() {
        let mut world = WorldState::new(quiet_config()).expect("world");
        let idx = world.spawn_ant(Role::Worker);
        {
            let ant = &mut world.ants_mut()[idx];
            ant.position = Position::new(803.0, 604.0);
            ant.carrying_food = true;
        }
        let events = world.step();
        assert_eq!(events.deliveries, 1);
        assert_eq!(world.total_food_collected(), 1);
        assert!(!world.ants()[idx].carrying_food);

        let events = world.step();
        assert_eq!(events.deliveries, 0);
        assert_eq!(world.total_food_collected(), 1);
    }

    #[test]
    fn carrying_worker_homes_in_on_nest() {
        let mut config = quiet_config();
        config.ant_speed = 2.0;
        let mut world = WorldState::new(config).expect("world");
        let idx = world.spawn_ant(Role::Worker);
        {
            let ant = &mut world.ants_mut()[idx];
            ant.position = Position::new(800.0, 615.0);
            ant.heading = -FRAC_PI_2;
            ant.carrying_food = true;
        }
        world.step();
        let ant = world.ants()[idx];
        assert!(ant.carrying_food);
        assert!(approx_eq(ant.position.y, 613.0));
        assert!(approx_eq(ant.heading, -FRAC_PI_2));
        world.step();
        assert!(world.ants()[idx].carrying_food);
        world.step();
        assert!(!world.ants()[idx].carrying_food);
        assert_eq!(world.total_food_collected(), 1);
    }

    #[test]
    fn growth_waits_for_interval_and_cap() {
        let mut config = quiet_config();
        config.growth_interval = 5;
        config.population_cap = 2;
        let mut world = WorldState::new(config).expect("world");
        world.spawn_ant(Role::Worker);
        for _ in 0..4 {
            let events = world.step();
            assert!(!events.worker_spawned);
        }
        assert_eq!(world.colony_size(), 1);
        let events = world.step();
        assert!(events.worker_spawned);
        assert_eq!(world.colony_size(), 2);
        assert_eq!(world.ants()[1].role, Role::Worker);

        for _ in 0..10 {
            let events = world.step();
            assert!(!events.worker_spawned);
        }
        assert_eq!(world.colony_size(), 2);
    }

    #[test]
    fn stats_sampling_follows_cadence() {
        let mut config = quiet_config();
        config.stats_interval = 2;
        config.stats_capacity = 3;
        let mut world = WorldState::new(config).expect("world");
        world.spawn_ant(Role::Worker);
        for _ in 0..7 {
            world.step();
        }
        let ticks: Vec<u64> = world.stats().samples().map(|sample| sample.tick.0).collect();
        assert_eq!(ticks, vec![2, 4, 6]);
        world.step();
        world.step();
        let ticks: Vec<u64> = world.stats().samples().map(|sample| sample.tick.0).collect();
        assert_eq!(ticks, vec![4, 6, 8]);
        let latest = world.stats().latest().expect("latest sample");
        assert_eq!(latest.colony_size, 1);
        assert_eq!(latest.food_collected, 0);
    }

    #[test]
    fn step_advances_tick_and_reports_it() {
        let mut world = WorldState::new(quiet_config()).expect("world");
        let events = world.step();
        assert_eq!(events.tick, Tick(1));
        assert_eq!(world.tick(), Tick(1));
        let events = world.step();
        assert_eq!(events.tick, Tick(2));
    }

    #[test]
    fn bearing_matches_atan2_quadrants() {
        let origin = Position::new(0.0, 0.0);
        assert!(approx_eq(origin.bearing_to(Position::new(1.0, 0.0)), 0.0));
        assert!(approx_eq(
            origin.bearing_to(Position::new(0.0, 1.0)),
            FRAC_PI_2
        ));
        assert!(approx_eq(
            origin.bearing_to(Position::new(-1.0, 0.0)),
            PI
        ));
        assert!(approx_eq(origin.distance_to(Position::new(3.0, 4.0)), 5.0));
    }
}
