//! Testing utilities for the rules engine.
//!
//! This module provides tools for deterministic tests:
//! - `FixedFaces` for scripting exact die faces
//! - `TestHarness` for running checks against a sample character
//! - Assertion helpers for verifying character state

use crate::character::{create_sample_character, Character};
use crate::dice::FaceSource;
use crate::rules::{apply_outcome, Check, Outcome, Resolver, RulesError};
use crate::wounds::WOUND_SLOTS;

/// A face source that yields a scripted sequence of faces.
///
/// Use this for deterministic tests: every draw takes the next scripted
/// value in order, whatever die size is asked for. The script is the
/// test's contract, so running past its end or scripting a face the
/// requested die cannot show panics with a clear message rather than
/// quietly skewing the roll.
#[derive(Debug, Clone)]
pub struct FixedFaces {
    /// Scripted faces to return in order.
    faces: Vec<u32>,
    /// Index of the next face to return.
    cursor: usize,
}

impl FixedFaces {
    /// Creates a source over a scripted face sequence.
    pub fn new(faces: Vec<u32>) -> Self {
        Self { faces, cursor: 0 }
    }

    /// Appends a face to the script.
    pub fn queue(&mut self, face: u32) {
        self.faces.push(face);
    }

    /// Rewinds to the start of the script to replay it.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Scripted faces not yet drawn.
    pub fn remaining(&self) -> usize {
        self.faces.len() - self.cursor
    }
}

impl FaceSource for FixedFaces {
    fn face(&mut self, faces: u32) -> u32 {
        let value = match self.faces.get(self.cursor) {
            Some(&value) => value,
            None => panic!(
                "FixedFaces script exhausted: wanted a d{faces} face but all {} scripted faces were drawn",
                self.faces.len()
            ),
        };
        self.cursor += 1;
        if value < 1 || value > faces {
            panic!("FixedFaces script value {value} cannot come from a d{faces}");
        }
        value
    }
}

/// Test harness for running check scenarios.
pub struct TestHarness {
    /// The resolver, over the standard tables.
    pub resolver: Resolver,
    /// The character every check runs against.
    pub character: Character,
    /// The scripted face source feeding every check.
    pub faces: FixedFaces,
}

impl TestHarness {
    /// Creates a harness around the sample character.
    pub fn new() -> Self {
        Self::with_character(create_sample_character("Test Hero"))
    }

    /// Creates a harness around a custom character.
    pub fn with_character(character: Character) -> Self {
        Self {
            resolver: Resolver::new(),
            character,
            faces: FixedFaces::new(Vec::new()),
        }
    }

    /// Queues faces for the upcoming checks.
    pub fn script_faces(&mut self, faces: Vec<u32>) -> &mut Self {
        for face in faces {
            self.faces.queue(face);
        }
        self
    }

    /// Resolves a check against the character without applying it.
    pub fn check(&mut self, check: Check) -> Result<Outcome, RulesError> {
        self.resolver
            .resolve(&self.character, check, &mut self.faces)
    }

    /// Resolves a check and writes its updates back onto the character.
    pub fn check_and_apply(&mut self, check: Check) -> Result<Outcome, RulesError> {
        let outcome = self.check(check)?;
        apply_outcome(&mut self.character, &outcome);
        Ok(outcome)
    }

    /// Current character HP as (current, max).
    pub fn hp(&self) -> (i32, i32) {
        let hp = &self.character.hit_points;
        (hp.current, hp.maximum)
    }

    /// The character's wound-track snapshot.
    pub fn wounds(&self) -> [u32; WOUND_SLOTS] {
        self.character.wounds.slots()
    }

    /// Scripted faces not yet drawn.
    pub fn remaining_faces(&self) -> usize {
        self.faces.remaining()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert the wound track matches an expected snapshot.
#[track_caller]
pub fn assert_wounds(harness: &TestHarness, expected: [u32; WOUND_SLOTS]) {
    let actual = harness.wounds();
    assert_eq!(
        actual, expected,
        "Expected wound track {expected:?}, got {actual:?}"
    );
}

/// Assert hit points are at expected values.
#[track_caller]
pub fn assert_hp(harness: &TestHarness, current: i32, max: i32) {
    let (actual_current, actual_max) = harness.hp();
    assert_eq!(
        (actual_current, actual_max),
        (current, max),
        "Expected HP {current}/{max}, got {actual_current}/{actual_max}"
    );
}
