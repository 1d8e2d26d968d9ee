//! GLOG tabletop rules engine.
//!
//! This crate provides:
//! - Derived attributes: ability totals and their bracket bonuses
//! - Dice expression parsing and evaluation over an injected face source
//! - Test resolution: roll-under, opposed, attack, and spell casting
//! - The four-slot wound track and death & dismemberment resolution
//!
//! Resolution is pure: a check reads the character and returns a
//! verdict record, and the host persists the write-backs through
//! [`apply_outcome`]. Every die face comes from a [`FaceSource`], so
//! any roll can be replayed exactly.
//!
//! # Quick Start
//!
//! ```
//! use glog_core::{apply_outcome, Check, Resolver, Stat};
//! use glog_core::character::create_sample_character;
//! use glog_core::dice::RandomFaces;
//!
//! let resolver = Resolver::new();
//! let mut character = create_sample_character("Vess");
//! let mut faces = RandomFaces(rand::thread_rng());
//!
//! let outcome = resolver
//!     .resolve(
//!         &character,
//!         Check::Stat { stat: Stat::Save, modifier: 0 },
//!         &mut faces,
//!     )
//!     .unwrap();
//! apply_outcome(&mut character, &outcome);
//! ```

pub mod character;
pub mod dice;
pub mod rules;
pub mod tables;
pub mod testing;
pub mod wounds;

// Primary public API
pub use character::{Ability, Character, CharacterId, Stat};
pub use dice::{DiceExpression, FaceSource, RandomFaces, RollOutcome};
pub use rules::{apply_hit_dice, apply_outcome, Check, Outcome, Resolver, RulesError};
pub use tables::{Location, LocationChoice, Tables};
pub use testing::{FixedFaces, TestHarness};
pub use wounds::WoundTrack;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::create_sample_character;

    #[test]
    fn test_outcome_round_trips_through_json() {
        let resolver = Resolver::new();
        let mut character = create_sample_character("Vess");
        character.hit_points.current = -4;

        let outcome = resolver
            .resolve(
                &character,
                Check::DeathAndDismemberment {
                    location: LocationChoice::Specific(Location::Head),
                },
                &mut FixedFaces::new(vec![12]),
            )
            .unwrap();

        let json = serde_json::to_string(&outcome).unwrap();
        let back: Outcome = serde_json::from_str(&json).unwrap();
        assert_eq!(outcome, back);
    }

    #[test]
    fn test_character_round_trips_through_json() {
        let mut character = create_sample_character("Vess");
        character.wounds.add_many(2);
        character.wounds.tick();
        character.abilities.dexterity.prev_roll_mod = -1;

        let json = serde_json::to_string(&character).unwrap();
        let back: Character = serde_json::from_str(&json).unwrap();
        assert_eq!(character, back);
        assert_eq!(back.wounds.slots(), [0, 0, 2, 0]);
    }
}
