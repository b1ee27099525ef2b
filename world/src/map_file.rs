//! Line-oriented map format shared by the loader and the printer.
//!
//! Every non-blank line declares one city followed by its roads:
//!
//! ```text
//! Foo north=Bar west=Baz south=Qu-ux
//! Bar south=Foo
//! ```
//!
//! Malformed roads are reported as [`MapDiagnostic`] values and dropped while
//! the remainder of the line is kept. Nothing short of an I/O failure aborts a
//! load.

use std::io::Read;

use alien_invasion_core::{Command, Declaration, Direction, Event, Road};
use thiserror::Error;
use tracing::warn;

use crate::{apply, query, World};

/// Errors that abort loading a map.
#[derive(Debug, Error)]
pub enum MapFileError {
    /// The underlying reader failed.
    #[error("failed to read map data")]
    Io(#[from] std::io::Error),
}

/// Non-fatal problems found while loading a map.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MapDiagnostic {
    /// A road token was not of the form `direction=city`.
    #[error("line {line}: malformed road `{token}`, expected direction=city")]
    MalformedRoad {
        /// 1-based line number of the offending token.
        line: usize,
        /// Token as it appeared in the input.
        token: String,
    },
    /// A road used a direction other than north, south, west or east.
    #[error("line {line}: unknown direction `{direction}`")]
    UnknownDirection {
        /// 1-based line number of the offending token.
        line: usize,
        /// Direction token as it appeared in the input.
        direction: String,
    },
    /// The same direction appeared twice for one city; the first road is kept.
    #[error("line {line}: `{city}` already has a {direction} road")]
    DuplicateDirection {
        /// 1-based line number of the offending token.
        line: usize,
        /// City carrying the duplicated slot.
        city: String,
        /// Slot that was declared twice.
        direction: Direction,
    },
    /// A city was declared on more than one line; later lines are ignored.
    #[error("line {line}: duplicate city `{city}` ignored")]
    DuplicateCity {
        /// 1-based line number of the ignored declaration.
        line: usize,
        /// Name of the city.
        city: String,
    },
}

impl MapDiagnostic {
    /// 1-based line number the diagnostic refers to.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::MalformedRoad { line, .. }
            | Self::UnknownDirection { line, .. }
            | Self::DuplicateDirection { line, .. }
            | Self::DuplicateCity { line, .. } => *line,
        }
    }
}

/// Declaration together with the line it was read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapLine {
    /// 1-based line number.
    pub line: usize,
    /// Parsed city declaration.
    pub declaration: Declaration,
}

/// Result of tokenising a map without touching a world.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedMap {
    /// Declarations in input order.
    pub lines: Vec<MapLine>,
    /// Problems encountered while parsing.
    pub diagnostics: Vec<MapDiagnostic>,
}

/// World built from a map together with every diagnostic raised for it.
#[derive(Debug)]
pub struct LoadedMap {
    /// World holding all accepted declarations.
    pub world: World,
    /// Problems encountered while parsing and applying the map.
    pub diagnostics: Vec<MapDiagnostic>,
}

/// Tokenises map text into declarations.
#[must_use]
pub fn parse(text: &str) -> ParsedMap {
    let mut parsed = ParsedMap::default();

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let mut tokens = raw.split_whitespace();
        let Some(name) = tokens.next() else {
            continue;
        };

        let mut declaration = Declaration::new(name);
        let mut filled = [false; alien_invasion_core::DIRECTION_COUNT];
        for token in tokens {
            match parse_road(token, line) {
                Ok(road) => {
                    let slot = road.direction.slot();
                    if filled[slot] {
                        parsed.diagnostics.push(MapDiagnostic::DuplicateDirection {
                            line,
                            city: name.to_owned(),
                            direction: road.direction,
                        });
                        continue;
                    }
                    filled[slot] = true;
                    declaration.roads.push(road);
                }
                Err(diagnostic) => parsed.diagnostics.push(diagnostic),
            }
        }

        parsed.lines.push(MapLine { line, declaration });
    }

    parsed
}

fn parse_road(token: &str, line: usize) -> Result<Road, MapDiagnostic> {
    let malformed = || MapDiagnostic::MalformedRoad {
        line,
        token: token.to_owned(),
    };

    let (direction, destination) = token.split_once('=').ok_or_else(malformed)?;
    if direction.is_empty() || destination.is_empty() || destination.contains('=') {
        return Err(malformed());
    }

    let direction = direction
        .parse::<Direction>()
        .map_err(|error| MapDiagnostic::UnknownDirection {
            line,
            direction: error.token().to_owned(),
        })?;
    Ok(Road::new(direction, destination))
}

/// Builds a world from map text, logging every diagnostic.
#[must_use]
pub fn load_str(text: &str) -> LoadedMap {
    let ParsedMap {
        lines,
        mut diagnostics,
    } = parse(text);

    let mut world = World::new();
    let mut events = Vec::new();
    for MapLine { line, declaration } in lines {
        events.clear();
        apply(&mut world, Command::DeclareCity(declaration), &mut events);
        for event in &events {
            if let Event::DeclarationRejected { name, .. } = event {
                diagnostics.push(MapDiagnostic::DuplicateCity {
                    line,
                    city: name.clone(),
                });
            }
        }
    }

    diagnostics.sort_by_key(MapDiagnostic::line);
    for diagnostic in &diagnostics {
        warn!(%diagnostic, "map diagnostic");
    }

    LoadedMap { world, diagnostics }
}

/// Reads a complete map from `reader` and builds a world from it.
pub fn load<R: Read>(mut reader: R) -> Result<LoadedMap, MapFileError> {
    let mut text = String::new();
    let _ = reader.read_to_string(&mut text)?;
    Ok(load_str(&text))
}

/// Declarations describing the cities that still stand.
///
/// Cities appear in first-seen order and roads in slot order. Roads towards
/// destroyed cities are omitted.
#[must_use]
pub fn surviving_declarations(world: &World) -> Vec<Declaration> {
    query::city_ids(world)
        .filter_map(|id| query::city(world, id))
        .map(|city| {
            let roads = query::roads(world, city.id())
                .filter(|&(_, destination)| query::is_standing(world, destination))
                .filter_map(|(direction, destination)| {
                    query::name(world, destination).map(|name| Road::new(direction, name))
                })
                .collect();
            Declaration {
                name: city.name().to_owned(),
                roads,
            }
        })
        .collect()
}

/// Renders the surviving world in the map file format.
#[must_use]
pub fn render(world: &World) -> String {
    let mut output = String::new();
    for declaration in surviving_declarations(world) {
        output.push_str(&declaration.to_string());
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_directive_keeps_rest_of_line() {
        let parsed = parse("Foo north=Bar bogus south=");

        assert_eq!(parsed.lines.len(), 1);
        assert_eq!(
            parsed.lines[0].declaration,
            Declaration::new("Foo").with_road(Direction::North, "Bar")
        );
        assert_eq!(
            parsed.diagnostics,
            vec![
                MapDiagnostic::MalformedRoad {
                    line: 1,
                    token: "bogus".to_owned()
                },
                MapDiagnostic::MalformedRoad {
                    line: 1,
                    token: "south=".to_owned()
                },
            ]
        );
    }

    #[test]
    fn roads_with_extra_separators_are_malformed() {
        let parsed = parse("Foo north=Bar=Baz =Qux");
        assert!(parsed.lines[0].declaration.roads.is_empty());
        assert_eq!(parsed.diagnostics.len(), 2);
    }

    #[test]
    fn unknown_direction_is_reported_with_line() {
        let parsed = parse("\nFoo\nBar souP=Oops west=Foo");

        assert_eq!(
            parsed.diagnostics,
            vec![MapDiagnostic::UnknownDirection {
                line: 3,
                direction: "souP".to_owned()
            }]
        );
        assert_eq!(parsed.lines[1].line, 3);
        assert_eq!(parsed.lines[1].declaration.roads.len(), 1);
    }

    #[test]
    fn duplicate_slot_is_reported_and_first_road_kept() {
        let parsed = parse("Foo north=Bar north=Baz");

        assert_eq!(
            parsed.lines[0].declaration,
            Declaration::new("Foo").with_road(Direction::North, "Bar")
        );
        assert!(matches!(
            parsed.diagnostics.as_slice(),
            [MapDiagnostic::DuplicateDirection {
                direction: Direction::North,
                ..
            }]
        ));
    }

    #[test]
    fn duplicate_city_becomes_a_diagnostic() {
        let loaded = load_str("Foo north=Bar\nBar south=Foo\nFoo west=Baz");

        assert_eq!(
            loaded.diagnostics,
            vec![MapDiagnostic::DuplicateCity {
                line: 3,
                city: "Foo".to_owned()
            }]
        );
        assert!(query::city_id(&loaded.world, "Baz").is_none());
    }
}
