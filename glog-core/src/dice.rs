//! Dice expression parsing and evaluation.
//!
//! Supports `NdM ± k` notation with open-ended die sizes ("d20",
//! "3d6", "d12 + -5 + 2"). Every evaluation draws its faces from an
//! injected [`FaceSource`], so rolls are reproducible in tests.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for dice parsing.
#[derive(Debug, Error)]
pub enum DiceError {
    #[error("Empty dice expression")]
    Empty,
    #[error("Malformed dice term '{0}': expected something like 2d6 or an integer")]
    MalformedTerm(String),
    #[error("Dice term '{0}' rolls zero dice")]
    NoDice(String),
    #[error("Dice term '{0}' needs at least 2 faces")]
    TooFewFaces(String),
}

/// A source of individual die faces.
///
/// This is the crate's randomness boundary: production code draws
/// uniform faces through [`RandomFaces`], while tests script exact
/// sequences with [`crate::testing::FixedFaces`].
pub trait FaceSource {
    /// Draws the next face of a die with `faces` sides, in `1..=faces`.
    fn face(&mut self, faces: u32) -> u32;
}

/// Uniform face draws from any [`Rng`].
#[derive(Debug, Clone)]
pub struct RandomFaces<R>(pub R);

impl<R: Rng> FaceSource for RandomFaces<R> {
    fn face(&mut self, faces: u32) -> u32 {
        self.0.gen_range(1..=faces)
    }
}

/// One term of a dice expression: a handful of identical dice, or a
/// signed integer constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Term {
    Dice { count: u32, faces: u32 },
    Constant(i32),
}

/// A complete dice expression (e.g., 2d6+3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceExpression {
    pub terms: Vec<Term>,
    pub original: String,
}

impl DiceExpression {
    /// Parse a dice notation string.
    ///
    /// A die term without a leading count rolls one die; constants keep
    /// the sign written before them, while die terms always add.
    pub fn parse(notation: &str) -> Result<Self, DiceError> {
        let notation = notation.trim().to_lowercase();
        if notation.is_empty() {
            return Err(DiceError::Empty);
        }

        let mut terms = Vec::new();
        let mut current = String::new();
        let mut sign: i32 = 1;

        for ch in notation.chars() {
            match ch {
                '+' | '-' => {
                    if !current.is_empty() {
                        terms.push(Self::parse_term(&current, sign)?);
                        current.clear();
                    }
                    sign = if ch == '+' { 1 } else { -1 };
                }
                ' ' => continue,
                _ => current.push(ch),
            }
        }

        if !current.is_empty() {
            terms.push(Self::parse_term(&current, sign)?);
        }

        if terms.is_empty() {
            return Err(DiceError::Empty);
        }

        Ok(DiceExpression {
            terms,
            original: notation,
        })
    }

    fn parse_term(s: &str, sign: i32) -> Result<Term, DiceError> {
        if let Some(d_pos) = s.find('d') {
            let count_str = &s[..d_pos];
            let faces_str = &s[d_pos + 1..];

            let count: u32 = if count_str.is_empty() {
                1
            } else {
                count_str
                    .parse()
                    .map_err(|_| DiceError::MalformedTerm(s.to_string()))?
            };
            let faces: u32 = faces_str
                .parse()
                .map_err(|_| DiceError::MalformedTerm(s.to_string()))?;

            if count == 0 {
                return Err(DiceError::NoDice(s.to_string()));
            }
            if faces < 2 {
                return Err(DiceError::TooFewFaces(s.to_string()));
            }

            Ok(Term::Dice { count, faces })
        } else {
            let value: i32 = s
                .parse()
                .map_err(|_| DiceError::MalformedTerm(s.to_string()))?;
            Ok(Term::Constant(sign * value))
        }
    }

    /// Evaluate the expression once against the thread RNG.
    pub fn roll(&self) -> RollOutcome {
        self.roll_with(&mut RandomFaces(rand::thread_rng()))
    }

    /// Evaluate with a specific face source (useful for testing).
    ///
    /// Faces are drawn term by term in expression order, one die at a
    /// time; the draw order is part of the outcome.
    pub fn roll_with<S: FaceSource>(&self, source: &mut S) -> RollOutcome {
        let mut term_rolls = Vec::new();
        let mut modifier: i32 = 0;

        for term in &self.terms {
            match *term {
                Term::Dice { count, faces } => {
                    let rolls: Vec<u32> = (0..count).map(|_| source.face(faces)).collect();
                    let subtotal: u32 = rolls.iter().sum();
                    term_rolls.push(TermRolls {
                        count,
                        faces,
                        rolls,
                        subtotal,
                    });
                }
                Term::Constant(value) => {
                    modifier += value;
                }
            }
        }

        let dice_total: i32 = term_rolls.iter().map(|t| t.subtotal as i32).sum();
        let total = dice_total + modifier;

        RollOutcome {
            expression: self.clone(),
            term_rolls,
            modifier,
            total,
        }
    }
}

impl FromStr for DiceExpression {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiceExpression::parse(s)
    }
}

impl fmt::Display for DiceExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}

/// The rolls produced by a single die term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermRolls {
    pub count: u32,
    pub faces: u32,
    pub rolls: Vec<u32>,
    pub subtotal: u32,
}

/// The materialized result of evaluating a dice expression once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollOutcome {
    pub expression: DiceExpression,
    pub term_rolls: Vec<TermRolls>,
    /// Sum of the expression's constant terms.
    pub modifier: i32,
    pub total: i32,
}

impl RollOutcome {
    /// Every face in the order drawn, across all die terms.
    pub fn faces(&self) -> Vec<u32> {
        self.term_rolls
            .iter()
            .flat_map(|t| t.rolls.iter().copied())
            .collect()
    }

    /// Format the individual dice results for display.
    pub fn dice_display(&self) -> String {
        if self.term_rolls.is_empty() {
            return self.modifier.to_string();
        }

        let dice_parts: Vec<String> = self
            .term_rolls
            .iter()
            .map(|t| {
                format!(
                    "[{}]",
                    t.rolls
                        .iter()
                        .map(|r| r.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
            .collect();

        let dice_str = dice_parts.join(" + ");
        if self.modifier != 0 {
            if self.modifier > 0 {
                format!("{} + {}", dice_str, self.modifier)
            } else {
                format!("{} - {}", dice_str, self.modifier.abs())
            }
        } else {
            dice_str
        }
    }
}

impl fmt::Display for RollOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} = {}", self.expression, self.dice_display(), self.total)
    }
}

/// Convenience function to roll dice from a notation string.
pub fn roll(notation: &str) -> Result<RollOutcome, DiceError> {
    let expr = DiceExpression::parse(notation)?;
    Ok(expr.roll())
}
