//! Character-side records: abilities, primary stats, hit points.
//!
//! These are the rules-facing slices of a character sheet. The crate
//! never persists them; hosts hand them in, resolution reads them, and
//! write-backs go through [`crate::rules::apply_outcome`].

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::tables::BonusBrackets;
use crate::wounds::WoundTrack;

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    pub fn new() -> Self {
        CharacterId(Uuid::new_v4())
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Abilities
// ============================================================================

/// The six abilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    #[serde(rename = "str")]
    Strength,
    #[serde(rename = "dex")]
    Dexterity,
    #[serde(rename = "con")]
    Constitution,
    #[serde(rename = "int")]
    Intelligence,
    #[serde(rename = "wis")]
    Wisdom,
    #[serde(rename = "cha")]
    Charisma,
}

impl Ability {
    /// The sheet's data key for this ability.
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Ability::Strength => "str",
            Ability::Dexterity => "dex",
            Ability::Constitution => "con",
            Ability::Intelligence => "int",
            Ability::Wisdom => "wis",
            Ability::Charisma => "cha",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Ability::Strength => "Strength",
            Ability::Dexterity => "Dexterity",
            Ability::Constitution => "Constitution",
            Ability::Intelligence => "Intelligence",
            Ability::Wisdom => "Wisdom",
            Ability::Charisma => "Charisma",
        }
    }

    pub fn all() -> [Ability; 6] {
        [
            Ability::Strength,
            Ability::Dexterity,
            Ability::Constitution,
            Ability::Intelligence,
            Ability::Wisdom,
            Ability::Charisma,
        ]
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A raw ability score with its flat external modifier.
///
/// The bracket bonus is never stored here: it is recomputed from the
/// derived total on every read so it cannot drift from the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AbilityScore {
    pub value: i32,
    /// Flat modifier from external effects.
    #[serde(rename = "mod")]
    pub modifier: i32,
    /// The last modifier supplied for a test of this ability, kept so
    /// the next test can default to it.
    #[serde(rename = "prevRollMod")]
    pub prev_roll_mod: i32,
}

impl AbilityScore {
    /// A score with no external modifier.
    pub fn new(value: i32) -> Self {
        AbilityScore {
            value,
            modifier: 0,
            prev_roll_mod: 0,
        }
    }

    /// Effective total: raw value plus modifier.
    pub fn total(&self) -> i32 {
        self.value + self.modifier
    }

    /// Derives the roll-under total and its bracket bonus.
    pub fn derive(&self, brackets: &BonusBrackets) -> DerivedAbility {
        let total = self.total();
        DerivedAbility {
            total,
            bonus: brackets.bonus(total),
        }
    }
}

/// A derived ability projection: the roll-under total and the combat
/// bonus it grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedAbility {
    pub total: i32,
    pub bonus: i32,
}

/// The six ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Abilities {
    #[serde(rename = "str")]
    pub strength: AbilityScore,
    #[serde(rename = "dex")]
    pub dexterity: AbilityScore,
    #[serde(rename = "con")]
    pub constitution: AbilityScore,
    #[serde(rename = "int")]
    pub intelligence: AbilityScore,
    #[serde(rename = "wis")]
    pub wisdom: AbilityScore,
    #[serde(rename = "cha")]
    pub charisma: AbilityScore,
}

impl Abilities {
    pub fn new(
        strength: i32,
        dexterity: i32,
        constitution: i32,
        intelligence: i32,
        wisdom: i32,
        charisma: i32,
    ) -> Self {
        Abilities {
            strength: AbilityScore::new(strength),
            dexterity: AbilityScore::new(dexterity),
            constitution: AbilityScore::new(constitution),
            intelligence: AbilityScore::new(intelligence),
            wisdom: AbilityScore::new(wisdom),
            charisma: AbilityScore::new(charisma),
        }
    }

    pub fn get(&self, ability: Ability) -> &AbilityScore {
        match ability {
            Ability::Strength => &self.strength,
            Ability::Dexterity => &self.dexterity,
            Ability::Constitution => &self.constitution,
            Ability::Intelligence => &self.intelligence,
            Ability::Wisdom => &self.wisdom,
            Ability::Charisma => &self.charisma,
        }
    }

    pub fn get_mut(&mut self, ability: Ability) -> &mut AbilityScore {
        match ability {
            Ability::Strength => &mut self.strength,
            Ability::Dexterity => &mut self.dexterity,
            Ability::Constitution => &mut self.constitution,
            Ability::Intelligence => &mut self.intelligence,
            Ability::Wisdom => &mut self.wisdom,
            Ability::Charisma => &mut self.charisma,
        }
    }
}

// ============================================================================
// Primary Stats
// ============================================================================

/// The five primary stats: direct d20 roll-under targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stat {
    Attack,
    Defence,
    Move,
    Save,
    Stealth,
}

impl Stat {
    pub fn name(&self) -> &'static str {
        match self {
            Stat::Attack => "Attack",
            Stat::Defence => "Defence",
            Stat::Move => "Move",
            Stat::Save => "Save",
            Stat::Stealth => "Stealth",
        }
    }

    pub fn all() -> [Stat; 5] {
        [Stat::Attack, Stat::Defence, Stat::Move, Stat::Save, Stat::Stealth]
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A primary stat's value, external modifier, and remembered test
/// modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PrimaryStat {
    pub value: i32,
    /// Flat modifier from external effects.
    #[serde(rename = "mod")]
    pub modifier: i32,
    /// The last modifier supplied for a test of this stat.
    #[serde(rename = "prevRollMod")]
    pub prev_roll_mod: i32,
}

impl PrimaryStat {
    pub fn new(value: i32) -> Self {
        PrimaryStat {
            value,
            modifier: 0,
            prev_roll_mod: 0,
        }
    }

    /// Effective total: the d20 roll-under target before situational
    /// modifiers.
    pub fn total(&self) -> i32 {
        self.value + self.modifier
    }
}

/// The five primary stats of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PrimaryStats {
    pub attack: PrimaryStat,
    pub defence: PrimaryStat,
    #[serde(rename = "move")]
    pub movement: PrimaryStat,
    pub save: PrimaryStat,
    pub stealth: PrimaryStat,
}

impl PrimaryStats {
    pub fn new(attack: i32, defence: i32, movement: i32, save: i32, stealth: i32) -> Self {
        PrimaryStats {
            attack: PrimaryStat::new(attack),
            defence: PrimaryStat::new(defence),
            movement: PrimaryStat::new(movement),
            save: PrimaryStat::new(save),
            stealth: PrimaryStat::new(stealth),
        }
    }

    pub fn get(&self, stat: Stat) -> &PrimaryStat {
        match stat {
            Stat::Attack => &self.attack,
            Stat::Defence => &self.defence,
            Stat::Move => &self.movement,
            Stat::Save => &self.save,
            Stat::Stealth => &self.stealth,
        }
    }

    pub fn get_mut(&mut self, stat: Stat) -> &mut PrimaryStat {
        match stat {
            Stat::Attack => &mut self.attack,
            Stat::Defence => &mut self.defence,
            Stat::Move => &mut self.movement,
            Stat::Save => &mut self.save,
            Stat::Stealth => &mut self.stealth,
        }
    }
}

// ============================================================================
// Hit Points
// ============================================================================

/// Hit points. Current may go below zero; the margin below zero is
/// what death & dismemberment checks key off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HitPoints {
    #[serde(rename = "value")]
    pub current: i32,
    #[serde(rename = "max")]
    pub maximum: i32,
}

impl HitPoints {
    /// Full at `maximum`.
    pub fn new(maximum: i32) -> Self {
        HitPoints {
            current: maximum,
            maximum,
        }
    }

    /// At or below zero.
    pub fn is_down(&self) -> bool {
        self.current <= 0
    }

    /// Applies damage; true if the character is now down.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        self.current -= amount;
        self.is_down()
    }

    /// Restores hit points, capped at the maximum.
    pub fn heal(&mut self, amount: i32) {
        self.current = (self.current + amount).min(self.maximum);
    }
}

// ============================================================================
// Character
// ============================================================================

/// A character sheet's rules-facing state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,

    // Scores
    pub abilities: Abilities,
    pub stats: PrimaryStats,

    // Condition
    pub hit_points: HitPoints,
    /// Count of injury entries on the sheet.
    pub injuries: u32,
    pub wounds: WoundTrack,
}

impl Character {
    /// A blank sheet.
    pub fn new(name: &str) -> Self {
        Character {
            id: CharacterId::new(),
            name: name.to_string(),
            abilities: Abilities::default(),
            stats: PrimaryStats::default(),
            hit_points: HitPoints::default(),
            injuries: 0,
            wounds: WoundTrack::new(),
        }
    }
}

/// A ready-made character for tests and demos.
pub fn create_sample_character(name: &str) -> Character {
    let mut character = Character::new(name);
    character.abilities = Abilities::new(12, 14, 10, 8, 13, 11);
    character.stats = PrimaryStats::new(14, 12, 12, 10, 11);
    character.hit_points = HitPoints::new(8);
    character
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::BonusBrackets;

    #[test]
    fn test_ability_totals_and_derivation() {
        let brackets = BonusBrackets::default();
        let mut score = AbilityScore::new(12);
        assert_eq!(score.total(), 12);
        assert_eq!(score.derive(&brackets), DerivedAbility { total: 12, bonus: 1 });

        score.modifier = -4;
        assert_eq!(score.total(), 8);
        assert_eq!(score.derive(&brackets).bonus, -1);
    }

    #[test]
    fn test_stat_total() {
        let mut stat = PrimaryStat::new(14);
        stat.modifier = 2;
        assert_eq!(stat.total(), 16);
    }

    #[test]
    fn test_container_accessors() {
        let mut character = create_sample_character("Vess");
        assert_eq!(character.abilities.get(Ability::Dexterity).value, 14);
        assert_eq!(character.stats.get(Stat::Attack).value, 14);

        character.abilities.get_mut(Ability::Strength).prev_roll_mod = 3;
        assert_eq!(character.abilities.strength.prev_roll_mod, 3);
        character.stats.get_mut(Stat::Move).modifier = -2;
        assert_eq!(character.stats.movement.total(), 10);
    }

    #[test]
    fn test_hit_points_below_zero() {
        let mut hp = HitPoints::new(8);
        assert!(!hp.take_damage(5));
        assert!(hp.take_damage(5));
        assert_eq!(hp.current, -2);
        hp.heal(20);
        assert_eq!(hp.current, 8);
    }

    #[test]
    fn test_sheet_data_keys() {
        let character = create_sample_character("Vess");
        let json = serde_json::to_value(&character).unwrap();
        assert_eq!(json["abilities"]["str"]["value"], 12);
        assert_eq!(json["abilities"]["str"]["mod"], 0);
        assert_eq!(json["abilities"]["str"]["prevRollMod"], 0);
        assert_eq!(json["stats"]["move"]["value"], 12);
        assert_eq!(json["hit_points"]["value"], 8);
        assert_eq!(json["hit_points"]["max"], 8);
    }

    #[test]
    fn test_character_ids_are_unique() {
        let a = Character::new("A");
        let b = Character::new("B");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_ability_names() {
        assert_eq!(Ability::Strength.abbreviation(), "str");
        assert_eq!(Ability::Strength.to_string(), "Strength");
        assert_eq!(Ability::all().len(), 6);
        assert_eq!(Stat::all().len(), 5);
        assert_eq!(Stat::Defence.to_string(), "Defence");
    }
}
