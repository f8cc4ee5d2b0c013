use chrono::{DateTime, Utc};
use crate::parser::{ParseError, ParsedExpression};
use crate::roll::{DiceGroup, DieSource};


/// The auditable result of one execution.
///
/// Created once per call and immutable afterwards. A valid record always has
/// `total == Σ group.total + constant_modifier`; an invalid one has no groups,
/// no seed, a total of 0 and an error message.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RollExpression {
    expression: String,
    groups: Vec<DiceGroup>,
    constant_modifier: i32,
    total: i64,
    seed: Option<String>,
    timestamp: DateTime<Utc>,
    is_valid: bool,
    error_message: Option<String>,
}

impl RollExpression {
    /// Rolls `parsed` from `dice` and records the outcome under `seed`.
    ///
    /// Pass a seed only when `dice` is the [`crate::SeededDice`] bound to it,
    /// otherwise the record could not be replayed.
    pub fn rolled(
        expression: impl Into<String>,
        parsed: &ParsedExpression,
        seed: Option<&str>,
        dice: &mut dyn DieSource,
    ) -> Self {
        let groups = parsed.roll(dice);
        let total = groups.iter().map(DiceGroup::total).sum::<i64>()
            + i64::from(parsed.constant_modifier());

        Self {
            expression: expression.into(),
            groups,
            constant_modifier: parsed.constant_modifier(),
            total,
            seed: seed.map(str::to_string),
            timestamp: Utc::now(),
            is_valid: true,
            error_message: None,
        }
    }

    /// A rejected expression carrying the parser's message.
    pub fn invalid(expression: impl Into<String>, error: &ParseError) -> Self {
        Self {
            expression: expression.into(),
            groups: Vec::new(),
            constant_modifier: 0,
            total: 0,
            seed: None,
            timestamp: Utc::now(),
            is_valid: false,
            error_message: Some(error.to_string()),
        }
    }

    /// The expression text as submitted.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Rolled groups, in the order they appear in the expression.
    pub fn groups(&self) -> &[DiceGroup] {
        &self.groups
    }

    /// Trailing constant of the expression.
    pub fn constant_modifier(&self) -> i32 {
        self.constant_modifier
    }

    /// Grand total. May be negative when modifiers dominate; 0 when invalid.
    pub fn total(&self) -> i64 {
        self.total
    }

    /// Seed the roll was executed with. `None` when invalid or rolled from a caller-supplied source.
    pub fn seed(&self) -> Option<&str> {
        self.seed.as_deref()
    }

    /// When the record was created.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Whether the expression parsed and was rolled.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Human-readable parse error for invalid records.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Counts of natural 20s and natural 1s across every d20 rolled, kept or dropped.
    pub fn naturals(&self) -> (usize, usize) {
        self.groups.iter()
            .filter(|group| group.sides() == 20)
            .flat_map(DiceGroup::outcomes)
            .fold((0, 0), |(twenties, ones), outcome| {
                (twenties + usize::from(outcome.is_max()), ones + usize::from(outcome.is_min()))
            })
    }

    /// `true` when both records hold the same expression, seed and dice, ignoring timestamps.
    pub fn same_roll(&self, other: &RollExpression) -> bool {
        self.expression == other.expression
            && self.groups == other.groups
            && self.constant_modifier == other.constant_modifier
            && self.total == other.total
            && self.seed == other.seed
            && self.is_valid == other.is_valid
            && self.error_message == other.error_message
    }
}
