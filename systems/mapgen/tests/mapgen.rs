use std::collections::BTreeSet;

use alien_invasion_core::Direction;
use alien_invasion_system_mapgen::{generate, to_map_text, Config};
use alien_invasion_world::{map_file, query, World};

fn adjacency(world: &World) -> BTreeSet<(String, Direction, String)> {
    query::city_ids(world)
        .flat_map(|id| {
            query::roads(world, id).map(move |(direction, destination)| {
                (
                    query::name(world, id).expect("source").to_owned(),
                    direction,
                    query::name(world, destination).expect("destination").to_owned(),
                )
            })
        })
        .collect()
}

#[test]
fn generated_map_loads_cleanly() {
    for seed in 0..10 {
        let declarations = generate(Config::new(60, seed)).expect("names available");
        let loaded = map_file::load_str(&to_map_text(&declarations));

        assert!(loaded.diagnostics.is_empty(), "{:?}", loaded.diagnostics);
        assert_eq!(query::city_count(&loaded.world), declarations.len());
    }
}

#[test]
fn city_count_is_approximately_requested() {
    for requested in [1, 2, 3, 4, 5, 9, 25, 100] {
        let declarations = generate(Config::new(requested, 0x5eed)).expect("names available");
        let generated = declarations.len() as u32;
        assert!(
            (requested..=requested + 1).contains(&generated),
            "requested {requested}, generated {generated}"
        );
    }
    assert!(generate(Config::new(0, 1)).expect("empty map").is_empty());
}

#[test]
fn every_road_has_a_way_back() {
    let declarations = generate(Config::new(80, 21)).expect("names available");
    let world = map_file::load_str(&to_map_text(&declarations)).world;
    let roads = adjacency(&world);

    for (source, direction, destination) in &roads {
        assert!(
            roads.contains(&(destination.clone(), direction.opposite(), source.clone())),
            "{source} {direction}={destination} is one-way"
        );
    }
}

#[test]
fn generation_is_deterministic_per_seed() {
    assert_eq!(
        generate(Config::new(40, 8)).expect("names available"),
        generate(Config::new(40, 8)).expect("names available")
    );
}

#[test]
fn printed_generated_map_round_trips() {
    let text = to_map_text(&generate(Config::new(50, 77)).expect("names available"));
    let loaded = map_file::load_str(&text).world;
    let reloaded = map_file::load_str(&map_file::render(&loaded)).world;

    assert_eq!(adjacency(&loaded), adjacency(&reloaded));
    assert_eq!(
        query::city_names(&loaded).collect::<BTreeSet<_>>(),
        query::city_names(&reloaded).collect::<BTreeSet<_>>()
    );
}
