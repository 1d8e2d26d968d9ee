//! Rules tables: ability-bonus brackets and the injury-location table.
//!
//! Both are held by the resolver as explicit configuration rather than
//! consulted through ambient statics, so a host can swap in variant
//! tables per game. `Default` gives the standard tables.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Bonus Brackets
// ============================================================================

/// One step of the bonus table: totals up to and including `upper`
/// grant `bonus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketStep {
    pub upper: i32,
    pub bonus: i32,
}

/// The ability-total to combat-bonus table.
///
/// Steps are ascending and disjoint; the first step whose `upper`
/// bound is not exceeded wins, and totals above the last step grant
/// `top`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusBrackets {
    pub steps: Vec<BracketStep>,
    /// Bonus for totals above the last step.
    pub top: i32,
}

impl BonusBrackets {
    /// Looks up the bonus for a derived ability total.
    pub fn bonus(&self, total: i32) -> i32 {
        for step in &self.steps {
            if total <= step.upper {
                return step.bonus;
            }
        }
        self.top
    }
}

impl Default for BonusBrackets {
    fn default() -> Self {
        BonusBrackets {
            steps: vec![
                BracketStep { upper: 2, bonus: -3 },
                BracketStep { upper: 5, bonus: -2 },
                BracketStep { upper: 8, bonus: -1 },
                BracketStep { upper: 11, bonus: 0 },
                BracketStep { upper: 14, bonus: 1 },
                BracketStep { upper: 17, bonus: 2 },
                BracketStep { upper: 20, bonus: 3 },
                BracketStep { upper: 23, bonus: 4 },
            ],
            top: 5,
        }
    }
}

// ============================================================================
// Hit Locations
// ============================================================================

/// A location key outside the nine known locations.
#[derive(Debug, Clone, Error)]
#[error("Unknown hit location '{0}'")]
pub struct InvalidLocation(pub String);

/// A hit location on the death & dismemberment table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Arm,
    Leg,
    Torso,
    Head,
    Fire,
    Ice,
    Lightning,
    Venom,
    Magic,
}

impl Location {
    /// The sheet's data key for this location.
    pub fn key(&self) -> &'static str {
        match self {
            Location::Arm => "arm",
            Location::Leg => "leg",
            Location::Torso => "torso",
            Location::Head => "head",
            Location::Fire => "fire",
            Location::Ice => "ice",
            Location::Lightning => "lightning",
            Location::Venom => "venom",
            Location::Magic => "magic",
        }
    }

    pub fn all() -> [Location; 9] {
        [
            Location::Arm,
            Location::Leg,
            Location::Torso,
            Location::Head,
            Location::Fire,
            Location::Ice,
            Location::Lightning,
            Location::Venom,
            Location::Magic,
        ]
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Location {
    type Err = InvalidLocation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "arm" => Ok(Location::Arm),
            "leg" => Ok(Location::Leg),
            "torso" => Ok(Location::Torso),
            "head" => Ok(Location::Head),
            "fire" => Ok(Location::Fire),
            "ice" => Ok(Location::Ice),
            "lightning" => Ok(Location::Lightning),
            "venom" => Ok(Location::Venom),
            "magic" => Ok(Location::Magic),
            _ => Err(InvalidLocation(s.to_string())),
        }
    }
}

/// Either a concrete location or a random draw on the physical table.
///
/// The random draw only reaches arm, leg, torso, and head; the
/// elemental and magical locations are explicit choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationChoice {
    Random,
    Specific(Location),
}

impl FromStr for LocationChoice {
    type Err = InvalidLocation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("random") {
            Ok(LocationChoice::Random)
        } else {
            Location::from_str(s).map(LocationChoice::Specific)
        }
    }
}

impl fmt::Display for LocationChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationChoice::Random => f.write_str("random"),
            LocationChoice::Specific(location) => location.fmt(f),
        }
    }
}

/// The narrative names attached to one hit location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjuryNames {
    /// Injury inflicted below the major-injury threshold.
    pub minor: String,
    /// Injury inflicted at or above it.
    pub major: String,
    /// The flavor line describing the hit itself.
    pub hit_text: String,
}

impl InjuryNames {
    pub fn new(minor: &str, major: &str, hit_text: &str) -> Self {
        InjuryNames {
            minor: minor.to_string(),
            major: major.to_string(),
            hit_text: hit_text.to_string(),
        }
    }
}

impl Default for InjuryNames {
    /// The generic triple used when a custom table omits a location.
    fn default() -> Self {
        InjuryNames::new("Minor injury", "Major injury", "Hit")
    }
}

/// Injury names per hit location.
///
/// Locations omitted from a custom table fall back to the generic
/// [`InjuryNames`] triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationTable {
    #[serde(default)]
    pub arm: InjuryNames,
    #[serde(default)]
    pub leg: InjuryNames,
    #[serde(default)]
    pub torso: InjuryNames,
    #[serde(default)]
    pub head: InjuryNames,
    #[serde(default)]
    pub fire: InjuryNames,
    #[serde(default)]
    pub ice: InjuryNames,
    #[serde(default)]
    pub lightning: InjuryNames,
    #[serde(default)]
    pub venom: InjuryNames,
    #[serde(default)]
    pub magic: InjuryNames,
}

impl LocationTable {
    /// The name triple for a location.
    pub fn names(&self, location: Location) -> &InjuryNames {
        match location {
            Location::Arm => &self.arm,
            Location::Leg => &self.leg,
            Location::Torso => &self.torso,
            Location::Head => &self.head,
            Location::Fire => &self.fire,
            Location::Ice => &self.ice,
            Location::Lightning => &self.lightning,
            Location::Venom => &self.venom,
            Location::Magic => &self.magic,
        }
    }
}

impl Default for LocationTable {
    fn default() -> Self {
        LocationTable {
            arm: InjuryNames::new("Arm disabled", "Arm mangled", "Hit on arm"),
            leg: InjuryNames::new("Leg disabled", "Leg mangled", "Hit on leg"),
            torso: InjuryNames::new("Cracked ribs", "Crushed", "Hit on torso"),
            head: InjuryNames::new("Concussed", "Skull cracked", "Hit on head"),
            fire: InjuryNames::new("Scorched", "Burned", "Burned by fire/acid"),
            ice: InjuryNames::new("Frostbite", "Frozen", "Touched by ice/cold"),
            lightning: InjuryNames::new("Burned", "Fried", "Hit by lightning"),
            venom: InjuryNames::new("Sickened", "Wracked", "Afflicted by venom/toxin"),
            magic: InjuryNames::new("Anathema", "Marked", "Scourged by magic"),
        }
    }
}

// ============================================================================
// Aggregate
// ============================================================================

/// Everything table-driven that resolution consults.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tables {
    #[serde(default)]
    pub brackets: BonusBrackets,
    #[serde(default)]
    pub locations: LocationTable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bracket_boundaries() {
        let brackets = BonusBrackets::default();
        let cases = [
            (-4, -3),
            (0, -3),
            (2, -3),
            (3, -2),
            (5, -2),
            (6, -1),
            (8, -1),
            (9, 0),
            (11, 0),
            (12, 1),
            (14, 1),
            (15, 2),
            (17, 2),
            (18, 3),
            (20, 3),
            (21, 4),
            (23, 4),
            (24, 5),
            (30, 5),
        ];
        for (total, bonus) in cases {
            assert_eq!(brackets.bonus(total), bonus, "total {total}");
        }
    }

    #[test]
    fn test_location_from_str() {
        assert_eq!("arm".parse::<Location>().unwrap(), Location::Arm);
        assert_eq!(" Torso ".parse::<Location>().unwrap(), Location::Torso);
        assert_eq!(
            "random".parse::<LocationChoice>().unwrap(),
            LocationChoice::Random
        );
        assert_eq!(
            "magic".parse::<LocationChoice>().unwrap(),
            LocationChoice::Specific(Location::Magic)
        );

        let err = "knee".parse::<Location>().unwrap_err();
        assert_eq!(err.0, "knee");
        assert!("knee".parse::<LocationChoice>().is_err());
    }

    #[test]
    fn test_location_roundtrip_keys() {
        for location in Location::all() {
            assert_eq!(location.key().parse::<Location>().unwrap(), location);
        }
    }

    #[test]
    fn test_standard_injury_names() {
        let table = LocationTable::default();
        assert_eq!(table.names(Location::Arm).minor, "Arm disabled");
        assert_eq!(table.names(Location::Torso).major, "Crushed");
        assert_eq!(table.names(Location::Venom).hit_text, "Afflicted by venom/toxin");
        assert_eq!(table.names(Location::Lightning).minor, "Burned");
    }

    #[test]
    fn test_partial_table_falls_back() {
        let json = r#"{ "arm": { "minor": "Winged", "major": "Severed", "hit_text": "Clipped" } }"#;
        let table: LocationTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.names(Location::Arm).major, "Severed");
        assert_eq!(table.names(Location::Leg).minor, "Minor injury");
        assert_eq!(table.names(Location::Leg).hit_text, "Hit");
    }

    #[test]
    fn test_custom_brackets() {
        let brackets = BonusBrackets {
            steps: vec![BracketStep { upper: 10, bonus: 0 }],
            top: 1,
        };
        assert_eq!(brackets.bonus(10), 0);
        assert_eq!(brackets.bonus(11), 1);
    }
}
