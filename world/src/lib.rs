#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the alien invasion simulator.
//!
//! The world is a directed graph of named cities. Each city owns four
//! directional road slots that reference neighbors by [`CityId`], so the graph
//! lives in a flat arena without cyclic ownership. After loading, destruction
//! is the only mutation the world accepts.

use std::collections::HashMap;

use alien_invasion_core::{CityId, Command, Declaration, DeclarationError, Event, DIRECTION_COUNT};

pub mod map_file;

/// Represents the authoritative invasion world.
#[derive(Clone, Debug, Default)]
pub struct World {
    cities: Vec<City>,
    index: HashMap<String, CityId>,
}

impl World {
    /// Creates an empty world without any cities.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn city_ref(&self, city: CityId) -> Option<&City> {
        self.cities.get(city.get() as usize)
    }

    fn city_mut(&mut self, city: CityId) -> Option<&mut City> {
        self.cities.get_mut(city.get() as usize)
    }

    /// Returns the id registered for `name`, creating a stub city when unknown.
    fn register(&mut self, name: &str) -> CityId {
        if let Some(&id) = self.index.get(name) {
            return id;
        }

        let id = CityId::new(self.cities.len() as u32);
        self.cities.push(City::stub(name));
        let _ = self.index.insert(name.to_owned(), id);
        id
    }

    fn declare(&mut self, declaration: Declaration, out_events: &mut Vec<Event>) {
        let already_declared = self
            .index
            .get(&declaration.name)
            .and_then(|&id| self.city_ref(id))
            .is_some_and(|city| city.declared);
        if already_declared {
            out_events.push(Event::DeclarationRejected {
                name: declaration.name,
                reason: DeclarationError::DuplicateCity,
            });
            return;
        }

        let source = self.register(&declaration.name);
        let mut roads = [None; DIRECTION_COUNT];
        for road in &declaration.roads {
            let slot = road.direction.slot();
            if roads[slot].is_some() {
                continue;
            }
            roads[slot] = Some(self.register(&road.destination));
        }

        if let Some(city) = self.city_mut(source) {
            city.roads = roads;
            city.declared = true;
        }
        out_events.push(Event::CityDeclared { city: source });
    }

    fn destroy(&mut self, city: CityId, out_events: &mut Vec<Event>) {
        let Some(target) = self.city_mut(city) else {
            return;
        };
        if target.destroyed {
            return;
        }
        target.destroyed = true;
        out_events.push(Event::CityDestroyed { city });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::DeclareCity(declaration) => world.declare(declaration, out_events),
        Command::DestroyCity { city } => world.destroy(city, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use alien_invasion_core::{CityId, Direction, DIRECTION_COUNT};
    use rand::Rng;

    use super::{City, World};

    /// Returns the intact city registered under `name`.
    ///
    /// Destroyed cities are invisible to this query even though the world
    /// still remembers them.
    #[must_use]
    pub fn lookup<'w>(world: &'w World, name: &str) -> Option<CityView<'w>> {
        world
            .index
            .get(name)
            .and_then(|&id| city(world, id))
    }

    /// Returns the intact city behind `id`.
    #[must_use]
    pub fn city(world: &World, id: CityId) -> Option<CityView<'_>> {
        world
            .city_ref(id)
            .filter(|city| !city.destroyed)
            .map(|city| CityView { id, city })
    }

    /// Resolves a name to its id, whether or not the city still stands.
    #[must_use]
    pub fn city_id(world: &World, name: &str) -> Option<CityId> {
        world.index.get(name).copied()
    }

    /// Name registered for `id`, including destroyed cities.
    #[must_use]
    pub fn name(world: &World, id: CityId) -> Option<&str> {
        world.city_ref(id).map(|city| city.name.as_str())
    }

    /// Number of cities ever registered.
    #[must_use]
    pub fn city_count(world: &World) -> usize {
        world.cities.len()
    }

    /// Every registered city id in first-seen order.
    pub fn city_ids(world: &World) -> impl Iterator<Item = CityId> + '_ {
        (0..world.cities.len()).map(|index| CityId::new(index as u32))
    }

    /// Every registered city name in first-seen order, destroyed ones included.
    pub fn city_names(world: &World) -> impl Iterator<Item = &str> + '_ {
        world.cities.iter().map(|city| city.name.as_str())
    }

    /// Reports whether `id` refers to a city that has not been destroyed.
    #[must_use]
    pub fn is_standing(world: &World, id: CityId) -> bool {
        city(world, id).is_some()
    }

    /// Reports whether every registered city was destroyed.
    ///
    /// A world without cities is trivially destroyed.
    #[must_use]
    pub fn is_fully_destroyed(world: &World) -> bool {
        world.cities.iter().all(|city| city.destroyed)
    }

    /// Ids of the cities that were destroyed, in first-seen order.
    pub fn destroyed_cities(world: &World) -> impl Iterator<Item = CityId> + '_ {
        city_ids(world).filter(move |&id| !is_standing(world, id))
    }

    /// Roads leaving `id` in slot order, whatever the state of their destination.
    pub fn roads(world: &World, id: CityId) -> impl Iterator<Item = (Direction, CityId)> + '_ {
        let slots = world.city_ref(id).map(|city| city.roads).unwrap_or_default();
        Direction::ALL
            .into_iter()
            .zip(slots)
            .filter_map(|(direction, slot)| slot.map(|destination| (direction, destination)))
    }

    /// Neighbors of `id` that can still be travelled to.
    pub fn reachable_neighbors(world: &World, id: CityId) -> impl Iterator<Item = CityId> + '_ {
        roads(world, id)
            .map(|(_, destination)| destination)
            .filter(move |&destination| is_standing(world, destination))
    }

    /// Picks one reachable neighbor of `id` uniformly at random.
    ///
    /// Returns `None` without consuming randomness when every slot is empty
    /// or leads to a destroyed city.
    pub fn random_reachable_neighbor<R>(world: &World, id: CityId, rng: &mut R) -> Option<CityId>
    where
        R: Rng + ?Sized,
    {
        let mut candidates = [id; DIRECTION_COUNT];
        let mut count = 0;
        for neighbor in reachable_neighbors(world, id) {
            candidates[count] = neighbor;
            count += 1;
        }

        if count == 0 {
            return None;
        }
        Some(candidates[rng.gen_range(0..count)])
    }

    /// Read-only view of a single city.
    #[derive(Clone, Copy, Debug)]
    pub struct CityView<'w> {
        id: CityId,
        city: &'w City,
    }

    impl<'w> CityView<'w> {
        /// Identifier of the city.
        #[must_use]
        pub const fn id(&self) -> CityId {
            self.id
        }

        /// Unique name of the city.
        #[must_use]
        pub fn name(&self) -> &'w str {
            &self.city.name
        }

        /// Neighbor stored in the slot for `direction`, if any.
        #[must_use]
        pub const fn neighbor(&self, direction: Direction) -> Option<CityId> {
            self.city.roads[direction.slot()]
        }

        /// Whether the city was introduced by a primary declaration rather
        /// than only referenced as a neighbor.
        #[must_use]
        pub const fn is_declared(&self) -> bool {
            self.city.declared
        }
    }
}

#[derive(Clone, Debug)]
struct City {
    name: String,
    roads: [Option<CityId>; DIRECTION_COUNT],
    declared: bool,
    destroyed: bool,
}

impl City {
    fn stub(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            roads: [None; DIRECTION_COUNT],
            declared: false,
            destroyed: false,
        }
    }
}
