use std::fmt::Display;
use crate::roll::{DiceGroup, DieSource, GroupSpec};


/// A parsed, validated expression: one or more dice groups plus a trailing constant.
///
/// Parsing never rolls; call [`ParsedExpression::roll()`] with a [`DieSource`]
/// to get the rolled groups.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParsedExpression {
    groups: Vec<GroupSpec>,
    constant_modifier: i32,
}

impl ParsedExpression {
    pub(crate) fn new(groups: Vec<GroupSpec>, constant_modifier: i32) -> Self {
        Self { groups, constant_modifier }
    }

    /// Dice clauses in the order they appear in the text.
    pub fn groups(&self) -> &[GroupSpec] {
        &self.groups
    }

    /// Signed constant added after every group.
    pub fn constant_modifier(&self) -> i32 {
        self.constant_modifier
    }

    /// Die labels of every group, e.g. `["d6", "d8"]`.
    pub fn dice_types(&self) -> Vec<String> {
        self.groups.iter().map(|group| format!("d{}", group.sides())).collect()
    }

    /// Rolls every group in order from the same source.
    pub fn roll(&self, dice: &mut dyn DieSource) -> Vec<DiceGroup> {
        self.groups.iter().map(|group| group.roll(dice)).collect()
    }

    /// Smallest and largest totals the expression can produce.
    ///
    /// # Examples
    /// ```
    /// use dicebox::parse;
    ///
    /// let expr = parse("4d6dl1+2").unwrap();
    /// assert_eq!(expr.possible_values(), (5, 20));
    /// ```
    pub fn possible_values(&self) -> (i64, i64) {
        let constant = i64::from(self.constant_modifier);

        self.groups.iter()
            .map(GroupSpec::possible_values)
            .fold((constant, constant), |(min, max), (g_min, g_max)| (min + g_min, max + g_max))
    }
}

impl Display for ParsedExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, group) in self.groups.iter().enumerate() {
            if i > 0 {
                write!(f, "+")?;
            }
            write!(f, "{group}")?;
        }

        if self.constant_modifier != 0 {
            write!(f, "{:+}", self.constant_modifier)?;
        }

        Ok(())
    }
}
