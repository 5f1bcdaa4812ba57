//! The fixed set of squares and languages the mock serves.

use crate::{Coordinates, Language, Square};

/// Half-height and half-width of a generated square, roughly 3m x 3m at
/// mid-latitudes.
const HALF_LAT: f64 = 0.0000135;
const HALF_LNG: f64 = 0.0000215;

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub words: &'static str,
    pub country: &'static str,
    pub nearest_place: &'static str,
    pub coordinates: Coordinates,
    pub square: Square,
}

impl Entry {
    fn around(
        words: &'static str,
        country: &'static str,
        nearest_place: &'static str,
        lat: f64,
        lng: f64,
    ) -> Self {
        Self {
            words,
            country,
            nearest_place,
            coordinates: Coordinates { lat, lng },
            square: Square {
                southwest: Coordinates {
                    lat: lat - HALF_LAT,
                    lng: lng - HALF_LNG,
                },
                northeast: Coordinates {
                    lat: lat + HALF_LAT,
                    lng: lng + HALF_LNG,
                },
            },
        }
    }

    pub fn contains(&self, c: Coordinates) -> bool {
        let sw = self.square.southwest;
        let ne = self.square.northeast;
        (sw.lat..=ne.lat).contains(&c.lat) && (sw.lng..=ne.lng).contains(&c.lng)
    }
}

/// Known squares. All words are English.
pub fn entries() -> Vec<Entry> {
    vec![
        Entry {
            words: "filled.count.soap",
            country: "GB",
            nearest_place: "Bayswater, London",
            coordinates: Coordinates {
                lat: 51.520847,
                lng: -0.195521,
            },
            square: Square {
                southwest: Coordinates {
                    lat: 51.520833,
                    lng: -0.195543,
                },
                northeast: Coordinates {
                    lat: 51.52086,
                    lng: -0.195499,
                },
            },
        },
        Entry {
            words: "index.home.raft",
            country: "GB",
            nearest_place: "Bayswater, London",
            coordinates: Coordinates {
                lat: 51.521251,
                lng: -0.203586,
            },
            square: Square {
                southwest: Coordinates {
                    lat: 51.521238,
                    lng: -0.203607,
                },
                northeast: Coordinates {
                    lat: 51.521265,
                    lng: -0.203564,
                },
            },
        },
        Entry::around("index.home.rafts", "US", "Prosper, Texas", 33.236351, -96.796562),
        Entry::around("index.home.raged", "FR", "Paris", 48.856613, 2.352222),
        Entry::around("index.home.ramps", "GB", "Kensington, London", 51.501009, -0.193451),
        Entry::around("daring.lion.race", "GB", "Westminster, London", 51.508341, -0.125499),
        Entry::around("limit.broom.flip", "DE", "Berlin", 52.520007, 13.404954),
    ]
}

pub fn find_by_words(words: &str) -> Option<Entry> {
    entries().into_iter().find(|e| e.words == words)
}

/// Languages in the order `/available-languages` returns them.
pub fn languages() -> Vec<Language> {
    [
        ("de", "German", "Deutsch"),
        ("en", "English", "English"),
        ("es", "Spanish", "Español"),
        ("fr", "French", "Français"),
        ("ja", "Japanese", "日本語"),
    ]
    .into_iter()
    .map(|(code, name, native_name)| Language {
        code: code.to_string(),
        name: name.to_string(),
        native_name: native_name.to_string(),
    })
    .collect()
}

pub fn is_supported_language(code: &str) -> bool {
    languages().iter().any(|l| l.code == code)
}
