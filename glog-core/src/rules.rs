//! Test resolution.
//!
//! The five check protocols (ability and stat roll-under, attack,
//! spell casting, death & dismemberment), the sheet-side helpers
//! (opposed evaluation, NPC hit dice), their verdict records, and the
//! caller-side write-back. Everything here is pure given a face
//! source: resolution never mutates the character, and write-backs are
//! an explicit second step.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::character::{Ability, Character, DerivedAbility, HitPoints, Stat};
use crate::dice::{DiceError, DiceExpression, FaceSource};
use crate::tables::{InjuryNames, InvalidLocation, Location, LocationChoice, Tables};

// ============================================================================
// Errors
// ============================================================================

/// Error type for test resolution.
#[derive(Debug, Error)]
pub enum RulesError {
    #[error(transparent)]
    Location(#[from] InvalidLocation),
    #[error(transparent)]
    Dice(#[from] DiceError),
}

/// Permissive modifier parse: input that is not a whole integer
/// coerces to 0 instead of failing.
///
/// Only the attack modifier and the opposed bonus/opposed inputs go
/// through this; typed modifiers stay typed.
pub fn lenient_modifier(input: &str) -> i32 {
    input.trim().parse().unwrap_or(0)
}

// ============================================================================
// Checks
// ============================================================================

/// A test to resolve, as a closed set of protocols. Each variant
/// carries only the fields its protocol needs; everything else comes
/// off the character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Check {
    /// d20 roll-under test of an ability's derived total.
    Ability { ability: Ability, modifier: i32 },
    /// d20 roll-under test of a primary stat's total.
    Stat { stat: Stat, modifier: i32 },
    /// Weapon attack: a hit roll against the attack stat plus a damage
    /// roll.
    Attack {
        /// Situational hit modifier; non-numeric input coerces to 0.
        modifier: String,
        /// The weapon's damage formula, e.g. `1d8`.
        damage: String,
        /// Extra text appended to the damage formula, e.g. `2` or `1d4`.
        damage_modifier: String,
        /// Reload threshold; 0 disables the reload check.
        reload: u32,
    },
    /// Spell casting with `dice` d6.
    Casting { dice: u32 },
    /// Death & dismemberment against current hit points and injuries.
    DeathAndDismemberment { location: LocationChoice },
}

// ============================================================================
// Verdicts
// ============================================================================

/// Outcome of a d20 roll-under test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollUnderOutcome {
    /// The stat or ability total tested against.
    pub target: i32,
    /// The situational modifier applied to the target. Callers persist
    /// this as the tested stat's new `prevRollMod`.
    pub modifier: i32,
    pub effective_target: i32,
    /// The d20 face drawn.
    pub roll: i32,
    pub success: bool,
    /// Display form of the modified target, e.g. `14 + 2`; `None` when
    /// the modifier is zero.
    pub target_breakdown: Option<String>,
}

impl fmt::Display for RollUnderOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.success { "success" } else { "failure" };
        match &self.target_breakdown {
            Some(breakdown) => write!(
                f,
                "{} vs {} ({}): {}",
                self.roll, self.effective_target, breakdown, verdict
            ),
            None => write!(f, "{} vs {}: {}", self.roll, self.effective_target, verdict),
        }
    }
}

/// Outcome of an opposed evaluation: the target number an opposing
/// roller has to meet. No dice are drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpposedOutcome {
    pub total: i32,
    /// Display reconstruction of the arithmetic.
    pub formula: String,
}

impl fmt::Display for OpposedOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.formula, self.total)
    }
}

/// Outcome of a spell-casting roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastingOutcome {
    /// The casting pool, `{n}d6`.
    pub formula: String,
    /// Number of casting dice invested.
    pub dice: u32,
    /// Faces in draw order; repeats among these drive mishap and doom.
    pub faces: Vec<u32>,
    pub total: i32,
    /// Two casting dice showed the same face.
    pub mishap: bool,
    /// Three or more matched; doom supersedes mishap.
    pub doom: bool,
}

impl fmt::Display for CastingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let faces = self
            .faces
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{} = {} ({})", self.formula, self.total, faces)?;
        if self.doom {
            f.write_str(", doom!")?;
        } else if self.mishap {
            f.write_str(", mishap!")?;
        }
        Ok(())
    }
}

/// Outcome of a damage roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageOutcome {
    pub formula: String,
    pub total: i32,
}

/// Outcome of a weapon attack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackOutcome {
    pub hit: RollUnderOutcome,
    /// Rolled whether or not the hit lands; the card always shows it.
    pub damage: DamageOutcome,
    /// Reload threshold in force (0 for none).
    pub reload: u32,
    /// The weapon spends its next action reloading.
    pub reload_required: bool,
}

impl fmt::Display for AttackOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "attack {} | damage {} = {}",
            self.hit, self.damage.formula, self.damage.total
        )?;
        if self.reload_required {
            f.write_str(" | reload required")?;
        }
        Ok(())
    }
}

/// Outcome of an NPC hit-dice roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitDiceOutcome {
    pub formula: String,
    pub total: i32,
    /// Floored at 1: a creature never starts below one hit point.
    pub hit_points: i32,
}

/// Outcome of a death & dismemberment resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DismembermentOutcome {
    /// The severity formula as rolled, e.g. `d12 + 2 + 1`.
    pub formula: String,
    /// The evaluated severity total.
    pub xvalue: i32,
    pub major_injury: bool,
    /// Fatal wounds to add to the track. A pure delta: the resolver
    /// applies nothing.
    pub fatal_wounds: u32,
    pub location: Location,
    pub names: InjuryNames,
}

impl DismembermentOutcome {
    /// The injury actually inflicted at this severity.
    pub fn injury_name(&self) -> &str {
        if self.major_injury {
            &self.names.major
        } else {
            &self.names.minor
        }
    }
}

impl fmt::Display for DismembermentOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.names.hit_text, self.injury_name())?;
        if self.fatal_wounds == 1 {
            f.write_str(" (1 fatal wound)")
        } else if self.fatal_wounds > 1 {
            write!(f, " ({} fatal wounds)", self.fatal_wounds)
        } else {
            Ok(())
        }
    }
}

/// A resolved check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Ability {
        ability: Ability,
        derived: DerivedAbility,
        roll: RollUnderOutcome,
    },
    Stat {
        stat: Stat,
        roll: RollUnderOutcome,
    },
    Attack(AttackOutcome),
    Casting(CastingOutcome),
    DeathAndDismemberment(DismembermentOutcome),
}

// ============================================================================
// Resolver
// ============================================================================

/// Resolves checks against a character using explicit rules tables.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    tables: Tables,
}

impl Resolver {
    /// A resolver over the standard tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// A resolver over custom tables.
    pub fn with_tables(tables: Tables) -> Self {
        Resolver { tables }
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    /// Resolves a check for `character`, drawing dice from `source`.
    ///
    /// The character is only read; persist the verdict's side of the
    /// bargain with [`apply_outcome`].
    pub fn resolve<S: FaceSource>(
        &self,
        character: &Character,
        check: Check,
        source: &mut S,
    ) -> Result<Outcome, RulesError> {
        match check {
            Check::Ability { ability, modifier } => {
                let derived = character
                    .abilities
                    .get(ability)
                    .derive(&self.tables.brackets);
                let roll = self.roll_under(derived.total, modifier, source);
                Ok(Outcome::Ability {
                    ability,
                    derived,
                    roll,
                })
            }
            Check::Stat { stat, modifier } => {
                let roll = self.roll_under(character.stats.get(stat).total(), modifier, source);
                Ok(Outcome::Stat { stat, roll })
            }
            Check::Attack {
                modifier,
                damage,
                damage_modifier,
                reload,
            } => {
                let attack = character.stats.attack.total();
                let outcome =
                    self.attack(attack, &modifier, &damage, &damage_modifier, reload, source)?;
                Ok(Outcome::Attack(outcome))
            }
            Check::Casting { dice } => Ok(Outcome::Casting(self.casting(dice, source)?)),
            Check::DeathAndDismemberment { location } => {
                let outcome = self.death_and_dismemberment(
                    character.hit_points.current,
                    character.injuries,
                    location,
                    source,
                )?;
                Ok(Outcome::DeathAndDismemberment(outcome))
            }
        }
    }

    /// d20 roll-under: success iff the draw is at most
    /// `target + modifier`.
    pub fn roll_under<S: FaceSource>(
        &self,
        target: i32,
        modifier: i32,
        source: &mut S,
    ) -> RollUnderOutcome {
        let roll = DiceExpression::parse("d20").unwrap().roll_with(source).total;
        let effective_target = target + modifier;
        let target_breakdown = if modifier == 0 {
            None
        } else if modifier > 0 {
            Some(format!("{target} + {modifier}"))
        } else {
            Some(format!("{target} - {}", -modifier))
        };
        RollUnderOutcome {
            target,
            modifier,
            effective_target,
            roll,
            success: roll <= effective_target,
            target_breakdown,
        }
    }

    /// Opposed evaluation: `stat + 10 + bonus - opposed`, both textual
    /// inputs through [`lenient_modifier`].
    pub fn opposed(&self, stat: i32, bonus: &str, opposed: &str) -> OpposedOutcome {
        let bonus = lenient_modifier(bonus);
        let opposed = lenient_modifier(opposed);
        let formula = if bonus != 0 {
            format!("({stat} + {bonus}) + (10 - {opposed})")
        } else {
            format!("{stat} + (10 - {opposed})")
        };
        OpposedOutcome {
            total: stat + 10 + bonus - opposed,
            formula,
        }
    }

    /// Spell casting: roll `dice` d6 and flag repeated faces.
    pub fn casting<S: FaceSource>(
        &self,
        dice: u32,
        source: &mut S,
    ) -> Result<CastingOutcome, RulesError> {
        let formula = format!("{dice}d6");
        let outcome = DiceExpression::parse(&formula)?.roll_with(source);
        let faces = outcome.faces();

        let mut mishap = false;
        let mut doom = false;
        for value in 1..=6u32 {
            let repeats = faces.iter().filter(|&&f| f == value).count();
            if repeats >= 2 {
                mishap = true;
            }
            if repeats >= 3 {
                doom = true;
            }
        }
        // Doom supersedes mishap: a cast is never flagged with both.
        if doom {
            mishap = false;
        }

        Ok(CastingOutcome {
            formula,
            dice,
            faces,
            total: outcome.total,
            mishap,
            doom,
        })
    }

    /// Weapon attack: the hit roll first, then the damage roll. Damage
    /// is rolled whether or not the hit lands.
    pub fn attack<S: FaceSource>(
        &self,
        attack: i32,
        modifier: &str,
        damage: &str,
        damage_modifier: &str,
        reload: u32,
        source: &mut S,
    ) -> Result<AttackOutcome, RulesError> {
        let modifier = lenient_modifier(modifier);
        let hit = self.roll_under(attack, modifier, source);
        let damage = self.damage(damage, damage_modifier, source)?;
        let reload_required = reload > 0 && hit.roll >= reload as i32;
        Ok(AttackOutcome {
            hit,
            damage,
            reload,
            reload_required,
        })
    }

    /// A damage roll on its own. A non-empty `damage_modifier` is
    /// appended to the formula as written, so junk text surfaces as a
    /// parse error rather than being dropped.
    pub fn damage<S: FaceSource>(
        &self,
        damage: &str,
        damage_modifier: &str,
        source: &mut S,
    ) -> Result<DamageOutcome, RulesError> {
        let formula = if damage_modifier.is_empty() {
            damage.to_string()
        } else {
            format!("{damage} + {damage_modifier}")
        };
        let outcome = DiceExpression::parse(&formula)?.roll_with(source);
        Ok(DamageOutcome {
            formula,
            total: outcome.total,
        })
    }

    /// NPC hit dice: `{count}d{die_faces}`, floored at one hit point.
    pub fn hit_dice<S: FaceSource>(
        &self,
        count: u32,
        die_faces: u32,
        source: &mut S,
    ) -> Result<HitDiceOutcome, RulesError> {
        let formula = format!("{count}d{die_faces}");
        let outcome = DiceExpression::parse(&formula)?.roll_with(source);
        Ok(HitDiceOutcome {
            formula,
            total: outcome.total,
            hit_points: outcome.total.max(1),
        })
    }

    /// Death & dismemberment: a d12 against the hit-point deficit plus
    /// accumulated injuries, then location and narrative lookup.
    pub fn death_and_dismemberment<S: FaceSource>(
        &self,
        current_hp: i32,
        injuries: u32,
        location: LocationChoice,
        source: &mut S,
    ) -> Result<DismembermentOutcome, RulesError> {
        let formula = format!("d12 + {} + {}", -current_hp, injuries);
        let xvalue = DiceExpression::parse(&formula)?.roll_with(source).total;

        let major_injury = xvalue >= 11;
        // The +1 from crossing 11 and the excess over 15 stack.
        let fatal_wounds = if xvalue >= 16 {
            1 + (xvalue - 15) as u32
        } else if major_injury {
            1
        } else {
            0
        };

        let location = match location {
            LocationChoice::Specific(location) => location,
            LocationChoice::Random => {
                let face = DiceExpression::parse("d6").unwrap().roll_with(source).total;
                match face {
                    1 => Location::Arm,
                    2 => Location::Leg,
                    3 | 4 => Location::Torso,
                    _ => Location::Head,
                }
            }
        };
        let names = self.tables.locations.names(location).clone();

        Ok(DismembermentOutcome {
            formula,
            xvalue,
            major_injury,
            fatal_wounds,
            location,
            names,
        })
    }
}

// ============================================================================
// Write-back
// ============================================================================

/// Writes an outcome's character-side updates onto the sheet: the
/// tested ability or stat's `prevRollMod`, and any fatal-wound delta
/// through the track's add transition.
pub fn apply_outcome(character: &mut Character, outcome: &Outcome) {
    match outcome {
        Outcome::Ability { ability, roll, .. } => {
            character.abilities.get_mut(*ability).prev_roll_mod = roll.modifier;
        }
        Outcome::Stat { stat, roll } => {
            character.stats.get_mut(*stat).prev_roll_mod = roll.modifier;
        }
        Outcome::Attack(attack) => {
            character.stats.attack.prev_roll_mod = attack.hit.modifier;
        }
        Outcome::Casting(_) => {}
        Outcome::DeathAndDismemberment(verdict) => {
            character.wounds.add_many(verdict.fatal_wounds);
        }
    }
}

/// Writes a hit-dice result onto the sheet: current and maximum hit
/// points both become the rolled value.
pub fn apply_hit_dice(character: &mut Character, outcome: &HitDiceOutcome) {
    character.hit_points = HitPoints::new(outcome.hit_points);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::create_sample_character;
    use crate::testing::FixedFaces;

    fn resolver() -> Resolver {
        Resolver::new()
    }

    #[test]
    fn test_roll_under_success_and_failure() {
        let mut source = FixedFaces::new(vec![9, 9]);

        let outcome = resolver().roll_under(14, 0, &mut source);
        assert!(outcome.success);
        assert_eq!(outcome.effective_target, 14);
        assert_eq!(outcome.roll, 9);
        assert_eq!(outcome.target_breakdown, None);

        let outcome = resolver().roll_under(10, -2, &mut source);
        assert!(!outcome.success);
        assert_eq!(outcome.effective_target, 8);
    }

    #[test]
    fn test_roll_under_breakdown_strings() {
        let mut source = FixedFaces::new(vec![5, 5]);
        let outcome = resolver().roll_under(14, 2, &mut source);
        assert_eq!(outcome.target_breakdown.as_deref(), Some("14 + 2"));

        let outcome = resolver().roll_under(14, -2, &mut source);
        assert_eq!(outcome.target_breakdown.as_deref(), Some("14 - 2"));
    }

    #[test]
    fn test_roll_under_boundary() {
        // A draw exactly on the effective target succeeds.
        let outcome = resolver().roll_under(10, 2, &mut FixedFaces::new(vec![12]));
        assert!(outcome.success);
        let outcome = resolver().roll_under(10, 2, &mut FixedFaces::new(vec![13]));
        assert!(!outcome.success);
    }

    #[test]
    fn test_opposed_coerces_junk_to_zero() {
        let outcome = resolver().opposed(10, "3", "abc");
        assert_eq!(outcome.total, 23);
        assert_eq!(outcome.formula, "(10 + 3) + (10 - 0)");
    }

    #[test]
    fn test_opposed_formula_without_bonus() {
        let outcome = resolver().opposed(12, "", "4");
        assert_eq!(outcome.total, 18);
        assert_eq!(outcome.formula, "12 + (10 - 4)");
    }

    #[test]
    fn test_opposed_negative_bonus() {
        let outcome = resolver().opposed(10, "-2", "3");
        assert_eq!(outcome.total, 15);
        assert_eq!(outcome.formula, "(10 + -2) + (10 - 3)");
    }

    #[test]
    fn test_casting_doom_suppresses_mishap() {
        let outcome = resolver()
            .casting(3, &mut FixedFaces::new(vec![4, 4, 4]))
            .unwrap();
        assert!(outcome.doom);
        assert!(!outcome.mishap);
        assert_eq!(outcome.total, 12);
        assert_eq!(outcome.formula, "3d6");
    }

    #[test]
    fn test_casting_pair_is_mishap_only() {
        let outcome = resolver()
            .casting(3, &mut FixedFaces::new(vec![4, 4, 2]))
            .unwrap();
        assert!(outcome.mishap);
        assert!(!outcome.doom);
    }

    #[test]
    fn test_casting_clean_roll() {
        let outcome = resolver()
            .casting(3, &mut FixedFaces::new(vec![1, 3, 5]))
            .unwrap();
        assert!(!outcome.mishap);
        assert!(!outcome.doom);
        assert_eq!(outcome.faces, vec![1, 3, 5]);
    }

    #[test]
    fn test_casting_four_dice_two_pairs() {
        let outcome = resolver()
            .casting(4, &mut FixedFaces::new(vec![2, 5, 2, 5]))
            .unwrap();
        assert!(outcome.mishap);
        assert!(!outcome.doom);
    }

    #[test]
    fn test_casting_zero_dice_is_error() {
        let result = resolver().casting(0, &mut FixedFaces::new(vec![]));
        assert!(matches!(result, Err(RulesError::Dice(_))));
    }

    #[test]
    fn test_attack_hit_and_damage() {
        let outcome = resolver()
            .attack(14, "0", "1d8", "", 0, &mut FixedFaces::new(vec![10, 6]))
            .unwrap();
        assert!(outcome.hit.success);
        assert_eq!(outcome.damage.formula, "1d8");
        assert_eq!(outcome.damage.total, 6);
        assert!(!outcome.reload_required);
    }

    #[test]
    fn test_attack_damage_rolled_on_miss() {
        let outcome = resolver()
            .attack(5, "0", "2d6", "", 0, &mut FixedFaces::new(vec![20, 3, 4]))
            .unwrap();
        assert!(!outcome.hit.success);
        assert_eq!(outcome.damage.total, 7);
    }

    #[test]
    fn test_attack_reload_threshold() {
        // The raw d20 at or over the threshold forces a reload.
        let outcome = resolver()
            .attack(14, "0", "1d8", "", 12, &mut FixedFaces::new(vec![12, 3]))
            .unwrap();
        assert!(outcome.reload_required);

        let outcome = resolver()
            .attack(14, "0", "1d8", "", 12, &mut FixedFaces::new(vec![11, 3]))
            .unwrap();
        assert!(!outcome.reload_required);

        // Zero disables the check entirely.
        let outcome = resolver()
            .attack(14, "0", "1d8", "", 0, &mut FixedFaces::new(vec![20, 3]))
            .unwrap();
        assert!(!outcome.reload_required);
    }

    #[test]
    fn test_attack_modifier_is_lenient() {
        let outcome = resolver()
            .attack(10, "garbage", "1d4", "", 0, &mut FixedFaces::new(vec![10, 2]))
            .unwrap();
        assert_eq!(outcome.hit.modifier, 0);
        assert_eq!(outcome.hit.effective_target, 10);

        let outcome = resolver()
            .attack(10, "3", "1d4", "", 0, &mut FixedFaces::new(vec![13, 2]))
            .unwrap();
        assert_eq!(outcome.hit.effective_target, 13);
        assert!(outcome.hit.success);
    }

    #[test]
    fn test_damage_modifier_appends_raw() {
        let outcome = resolver()
            .damage("1d6", "2", &mut FixedFaces::new(vec![4]))
            .unwrap();
        assert_eq!(outcome.formula, "1d6 + 2");
        assert_eq!(outcome.total, 6);

        let outcome = resolver()
            .damage("1d6", "1d4", &mut FixedFaces::new(vec![4, 3]))
            .unwrap();
        assert_eq!(outcome.total, 7);

        let result = resolver().damage("1d6", "fishbones", &mut FixedFaces::new(vec![4]));
        assert!(matches!(
            result,
            Err(RulesError::Dice(DiceError::MalformedTerm(_)))
        ));
    }

    #[test]
    fn test_hit_dice_sets_floor() {
        let outcome = resolver()
            .hit_dice(2, 8, &mut FixedFaces::new(vec![3, 5]))
            .unwrap();
        assert_eq!(outcome.formula, "2d8");
        assert_eq!(outcome.total, 8);
        assert_eq!(outcome.hit_points, 8);

        let outcome = resolver()
            .hit_dice(1, 4, &mut FixedFaces::new(vec![1]))
            .unwrap();
        assert_eq!(outcome.hit_points, 1);
    }

    #[test]
    fn test_dismemberment_minor() {
        let outcome = resolver()
            .death_and_dismemberment(
                5,
                0,
                LocationChoice::Specific(Location::Torso),
                &mut FixedFaces::new(vec![12]),
            )
            .unwrap();
        assert_eq!(outcome.formula, "d12 + -5 + 0");
        assert_eq!(outcome.xvalue, 7);
        assert!(!outcome.major_injury);
        assert_eq!(outcome.fatal_wounds, 0);
        assert_eq!(outcome.injury_name(), "Cracked ribs");
    }

    #[test]
    fn test_dismemberment_severity_boundaries() {
        let cases = [
            // (current_hp, d12 face, xvalue, major, fatal)
            (0, 10, 10, false, 0),
            (0, 11, 11, true, 1),
            (-3, 12, 15, true, 1),
            (-4, 12, 16, true, 2),
            (-10, 12, 22, true, 8),
        ];
        for (hp, face, xvalue, major, fatal) in cases {
            let outcome = resolver()
                .death_and_dismemberment(
                    hp,
                    0,
                    LocationChoice::Specific(Location::Arm),
                    &mut FixedFaces::new(vec![face]),
                )
                .unwrap();
            assert_eq!(outcome.xvalue, xvalue, "hp {hp} face {face}");
            assert_eq!(outcome.major_injury, major, "hp {hp} face {face}");
            assert_eq!(outcome.fatal_wounds, fatal, "hp {hp} face {face}");
        }
    }

    #[test]
    fn test_dismemberment_counts_injuries() {
        let outcome = resolver()
            .death_and_dismemberment(
                -2,
                3,
                LocationChoice::Specific(Location::Head),
                &mut FixedFaces::new(vec![6]),
            )
            .unwrap();
        assert_eq!(outcome.formula, "d12 + 2 + 3");
        assert_eq!(outcome.xvalue, 11);
        assert_eq!(outcome.injury_name(), "Skull cracked");
    }

    #[test]
    fn test_dismemberment_random_location_table() {
        let cases = [
            (1, Location::Arm),
            (2, Location::Leg),
            (3, Location::Torso),
            (4, Location::Torso),
            (5, Location::Head),
            (6, Location::Head),
        ];
        for (face, expected) in cases {
            let outcome = resolver()
                .death_and_dismemberment(
                    0,
                    0,
                    LocationChoice::Random,
                    &mut FixedFaces::new(vec![3, face]),
                )
                .unwrap();
            assert_eq!(outcome.location, expected, "d6 face {face}");
        }
    }

    #[test]
    fn test_dismemberment_explicit_location_draws_no_d6() {
        let mut source = FixedFaces::new(vec![9]);
        let outcome = resolver()
            .death_and_dismemberment(0, 0, LocationChoice::Specific(Location::Fire), &mut source)
            .unwrap();
        assert_eq!(outcome.location, Location::Fire);
        assert_eq!(outcome.names.hit_text, "Burned by fire/acid");
        assert_eq!(source.remaining(), 0);
    }

    #[test]
    fn test_resolve_reads_but_never_writes() {
        let resolver = Resolver::new();
        let character = create_sample_character("Vess");
        let before = character.clone();

        let check = Check::Ability {
            ability: Ability::Strength,
            modifier: 2,
        };
        let outcome = resolver
            .resolve(&character, check, &mut FixedFaces::new(vec![9]))
            .unwrap();

        assert_eq!(character, before);
        match &outcome {
            Outcome::Ability {
                ability,
                derived,
                roll,
            } => {
                assert_eq!(*ability, Ability::Strength);
                assert_eq!(derived.total, 12);
                assert_eq!(derived.bonus, 1);
                assert!(roll.success);
            }
            other => panic!("expected an ability outcome, got {other:?}"),
        }
    }

    #[test]
    fn test_apply_outcome_persists_prev_roll_mod() {
        let resolver = Resolver::new();
        let mut character = create_sample_character("Vess");

        let outcome = resolver
            .resolve(
                &character,
                Check::Stat {
                    stat: Stat::Save,
                    modifier: -1,
                },
                &mut FixedFaces::new(vec![4]),
            )
            .unwrap();
        apply_outcome(&mut character, &outcome);
        assert_eq!(character.stats.save.prev_roll_mod, -1);

        let outcome = resolver
            .resolve(
                &character,
                Check::Attack {
                    modifier: "2".to_string(),
                    damage: "1d6".to_string(),
                    damage_modifier: String::new(),
                    reload: 0,
                },
                &mut FixedFaces::new(vec![10, 3]),
            )
            .unwrap();
        apply_outcome(&mut character, &outcome);
        assert_eq!(character.stats.attack.prev_roll_mod, 2);
    }

    #[test]
    fn test_apply_outcome_feeds_wound_track() {
        let mut character = create_sample_character("Vess");
        character.hit_points.current = -4;

        let outcome = Resolver::new()
            .resolve(
                &character,
                Check::DeathAndDismemberment {
                    location: LocationChoice::Specific(Location::Leg),
                },
                &mut FixedFaces::new(vec![12]),
            )
            .unwrap();
        apply_outcome(&mut character, &outcome);
        assert_eq!(character.wounds.slots(), [0, 0, 0, 2]);
    }

    #[test]
    fn test_apply_hit_dice() {
        let resolver = Resolver::new();
        let mut character = create_sample_character("Ratling");
        let outcome = resolver
            .hit_dice(3, 6, &mut FixedFaces::new(vec![2, 4, 6]))
            .unwrap();
        apply_hit_dice(&mut character, &outcome);
        assert_eq!(character.hit_points.current, 12);
        assert_eq!(character.hit_points.maximum, 12);
    }

    #[test]
    fn test_unknown_location_composes_into_rules_error() {
        // Hosts parse dialog input into a LocationChoice; the parse
        // error flows into RulesError with `?`.
        let err: RulesError = "knee".parse::<LocationChoice>().unwrap_err().into();
        assert_eq!(err.to_string(), "Unknown hit location 'knee'");
        assert!(matches!(err, RulesError::Location(_)));
    }

    #[test]
    fn test_outcome_serde_shape() {
        let outcome = resolver().roll_under(14, 2, &mut FixedFaces::new(vec![9]));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["target"], 14);
        assert_eq!(json["effective_target"], 16);
        assert_eq!(json["success"], true);
        assert_eq!(json["target_breakdown"], "14 + 2");
    }

    #[test]
    fn test_displays() {
        let roll = resolver().roll_under(14, 2, &mut FixedFaces::new(vec![9]));
        assert_eq!(roll.to_string(), "9 vs 16 (14 + 2): success");

        let cast = resolver()
            .casting(3, &mut FixedFaces::new(vec![4, 4, 4]))
            .unwrap();
        assert_eq!(cast.to_string(), "3d6 = 12 (4, 4, 4), doom!");

        let verdict = resolver()
            .death_and_dismemberment(
                -4,
                0,
                LocationChoice::Specific(Location::Arm),
                &mut FixedFaces::new(vec![12]),
            )
            .unwrap();
        assert_eq!(verdict.to_string(), "Hit on arm: Arm mangled (2 fatal wounds)");
    }
}
