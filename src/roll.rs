use std::fmt::Display;
use crate::Error;


/// Die sizes a group may roll. Anything else is rejected by [`GroupSpecBuilder::build()`].
pub const SUPPORTED_SIDES: [u16; 7] = [4, 6, 8, 10, 12, 20, 100];

/// Upper bound on the number of dice in a single group.
pub const MAX_DICE: u16 = 100;


/// A source of die faces.
///
/// The engine binds a [`crate::SeededDice`] per call; tests and hosts can plug
/// in their own source to force specific faces.
pub trait DieSource {
    /// Returns a face in `1..=sides`.
    fn roll_die(&mut self, sides: u16) -> u16;
}


/// How a group turns its raw dice into kept and dropped dice.
///
/// Every variant that needs a count carries it, so there is no ambiguity about
/// whether a number refers to dice rolled or dice kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Selection {
    /// Every die is kept.
    #[default]
    Normal,
    /// Two dice are rolled and the higher one is kept.
    Advantage,
    /// Two dice are rolled and the lower one is kept.
    Disadvantage,
    /// The `n` lowest dice are dropped.
    DropLowest(u16),
    /// The `n` highest dice are dropped.
    DropHighest(u16),
    /// Only the `n` highest dice are kept.
    KeepHighest(u16),
    /// Only the `n` lowest dice are kept.
    KeepLowest(u16),
}

impl Selection {
    /// Creates a [`Selection::KeepHighest`] keeping `n` dice.
    pub fn kh(n: u16) -> Self {
        Selection::KeepHighest(n)
    }

    /// Creates a [`Selection::KeepLowest`] keeping `n` dice.
    pub fn kl(n: u16) -> Self {
        Selection::KeepLowest(n)
    }

    /// Creates a [`Selection::DropHighest`] dropping `n` dice.
    pub fn dh(n: u16) -> Self {
        Selection::DropHighest(n)
    }

    /// Creates a [`Selection::DropLowest`] dropping `n` dice.
    pub fn dl(n: u16) -> Self {
        Selection::DropLowest(n)
    }

    /// The `n` carried by drop/keep variants, `None` for the others.
    pub fn value(&self) -> Option<u16> {
        match *self {
            Selection::DropLowest(n)
            | Selection::DropHighest(n)
            | Selection::KeepHighest(n)
            | Selection::KeepLowest(n) => Some(n),
            Selection::Normal | Selection::Advantage | Selection::Disadvantage => None,
        }
    }

    /// Stable snake_case name used in result breakdowns.
    pub fn name(&self) -> &'static str {
        match self {
            Selection::Normal => "normal",
            Selection::Advantage => "advantage",
            Selection::Disadvantage => "disadvantage",
            Selection::DropLowest(_) => "drop_lowest",
            Selection::DropHighest(_) => "drop_highest",
            Selection::KeepHighest(_) => "keep_highest",
            Selection::KeepLowest(_) => "keep_lowest",
        }
    }

    /// Number of dice actually rolled for a group of `count` dice.
    ///
    /// Advantage and disadvantage always roll two dice whatever the count says.
    pub const fn dice_to_roll(&self, count: u16) -> u16 {
        match self {
            Selection::Advantage | Selection::Disadvantage => 2,
            _ => count,
        }
    }

    /// Number of dice that end up kept out of a group of `count` dice.
    pub const fn kept_count(&self, count: u16) -> u16 {
        match *self {
            Selection::Normal => count,
            Selection::Advantage | Selection::Disadvantage => 1,
            Selection::DropLowest(n) | Selection::DropHighest(n) => count.saturating_sub(n),
            Selection::KeepHighest(n) | Selection::KeepLowest(n) => if n < count { n } else { count },
        }
    }

    /// Checks that a drop/keep count leaves at least one die on each side of the partition.
    ///
    /// # Errors
    /// Returns [`Error::SelectionCount`] when `n == 0` or `n >= count`.
    fn validate(self, count: u16) -> Result<Self, Error> {
        match self.value() {
            Some(n) if n == 0 || n >= count => Err(Error::SelectionCount { selection: self, count }),
            _ => Ok(self),
        }
    }

    /// Returns one flag per outcome, `true` when that die is kept.
    ///
    /// Among dice tied on the boundary value the earliest rolled one is chosen
    /// first, so the partition only depends on the roll order.
    pub fn partition(&self, outcomes: &[DieOutcome]) -> Vec<bool> {
        match *self {
            Selection::Normal => vec![true; outcomes.len()],
            Selection::Advantage => choose(outcomes, 1, true),
            Selection::Disadvantage => choose(outcomes, 1, false),
            Selection::KeepHighest(n) => choose(outcomes, n, true),
            Selection::KeepLowest(n) => choose(outcomes, n, false),
            Selection::DropLowest(n) => invert(choose(outcomes, n, false)),
            Selection::DropHighest(n) => invert(choose(outcomes, n, true)),
        }
    }
}

impl Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selection::Normal => Ok(()),
            Selection::Advantage => write!(f, "adv"),
            Selection::Disadvantage => write!(f, "dis"),
            Selection::DropLowest(n) => write!(f, "dl{n}"),
            Selection::DropHighest(n) => write!(f, "dh{n}"),
            Selection::KeepHighest(n) => write!(f, "kh{n}"),
            Selection::KeepLowest(n) => write!(f, "kl{n}"),
        }
    }
}


/// The face shown by a single die.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DieOutcome {
    sides: u16,
    result: u16,
    is_max: bool,
    is_min: bool,
}

impl DieOutcome {
    /// Records a face rolled on a die with `sides` sides.
    pub fn new(sides: u16, result: u16) -> Self {
        debug_assert!((1..=sides).contains(&result), "face {result} out of range for d{sides}");
        Self {
            sides,
            result,
            is_max: result == sides,
            is_min: result == 1,
        }
    }

    /// Number of sides of the die.
    pub fn sides(&self) -> u16 {
        self.sides
    }

    /// The rolled face.
    pub fn result(&self) -> u16 {
        self.result
    }

    /// `true` when the die rolled its highest face.
    pub fn is_max(&self) -> bool {
        self.is_max
    }

    /// `true` when the die rolled a 1.
    pub fn is_min(&self) -> bool {
        self.is_min
    }
}


/// A validated dice clause such as `4d6dl1` or `1d20+5`, before rolling.
///
/// Build one with [`GroupSpec::builder()`] or the [`crate::dice!`] macro, then
/// call [`GroupSpec::roll()`] to get a [`DiceGroup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupSpec {
    count: u16,
    sides: u16,
    modifier: i32,
    selection: Selection,
}

impl GroupSpec {
    /// Starts a [`GroupSpecBuilder`] for dice with `sides` sides.
    ///
    /// # Examples
    /// ```
    /// use dicebox::{GroupSpec, Selection};
    ///
    /// let spec = GroupSpec::builder(6)
    ///     .count(4)
    ///     .selection(Selection::dl(1))
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(spec.to_string(), "4d6dl1");
    /// ```
    pub fn builder(sides: u16) -> GroupSpecBuilder {
        GroupSpecBuilder::new(sides)
    }

    /// Number of dice requested. Informational only for advantage and disadvantage.
    pub fn count(&self) -> u16 {
        self.count
    }

    /// Number of sides of each die.
    pub fn sides(&self) -> u16 {
        self.sides
    }

    /// Modifier added to the kept dice.
    pub fn modifier(&self) -> i32 {
        self.modifier
    }

    /// Selection policy of the group.
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Rolls the dice from `dice` and partitions them according to the selection.
    ///
    /// # Examples
    /// ```
    /// use dicebox::{GroupSpec, SeededDice};
    ///
    /// let spec = GroupSpec::builder(20).advantage().build().unwrap();
    /// let group = spec.roll(&mut SeededDice::new("abc"));
    ///
    /// assert_eq!(group.outcomes().len(), 2);
    /// assert_eq!(group.kept().len(), 1);
    /// ```
    pub fn roll(&self, dice: &mut dyn DieSource) -> DiceGroup {
        let outcomes = (0..self.selection.dice_to_roll(self.count))
            .map(|_| DieOutcome::new(self.sides, dice.roll_die(self.sides)))
            .collect();

        DiceGroup::from_outcomes(*self, outcomes)
    }

    /// Smallest total the group can produce, modifier included.
    ///
    /// ```
    /// use dicebox::dice;
    ///
    /// // 3d20dl1: two dice are kept, so the minimum is 1 + 1 = 2
    /// assert_eq!(dice!(20, 3, dl).unwrap().min(), 2);
    /// ```
    pub fn min(&self) -> i64 {
        i64::from(self.selection.kept_count(self.count)) + i64::from(self.modifier)
    }

    /// Largest total the group can produce, modifier included.
    ///
    /// ```
    /// use dicebox::dice;
    ///
    /// // 3d20kh1: only the highest die counts
    /// assert_eq!(dice!(20, 3, kh).unwrap().max(), 20);
    /// ```
    pub fn max(&self) -> i64 {
        i64::from(self.selection.kept_count(self.count)) * i64::from(self.sides)
            + i64::from(self.modifier)
    }

    /// Equivalent to `(self.min(), self.max())`.
    pub fn possible_values(&self) -> (i64, i64) {
        (self.min(), self.max())
    }
}

impl Display for GroupSpec {
    /// Formats the group in canonical notation, e.g. `4d6dl1` or `1d20+5adv`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        if self.modifier != 0 {
            write!(f, "{:+}", self.modifier)?;
        }
        write!(f, "{}", self.selection)
    }
}


/// Fluent builder for [`GroupSpec`], validating ranges on [`GroupSpecBuilder::build()`].
#[derive(Debug, Clone)]
pub struct GroupSpecBuilder {
    sides: u16,
    count: u16,
    modifier: i32,
    selection: Selection,
}

impl GroupSpecBuilder {
    /// Count defaults to 1, modifier to 0 and selection to [`Selection::Normal`].
    fn new(sides: u16) -> Self {
        Self {
            sides,
            count: 1,
            modifier: 0,
            selection: Selection::Normal,
        }
    }

    /// Sets the number of dice.
    pub fn count(mut self, count: u16) -> Self {
        self.count = count;
        self
    }

    /// Sets the group modifier.
    pub fn modifier(mut self, modifier: i32) -> Self {
        self.modifier = modifier;
        self
    }

    /// Sets the selection policy.
    pub fn selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// Shorthand for [`Selection::Advantage`].
    pub fn advantage(self) -> Self {
        self.selection(Selection::Advantage)
    }

    /// Shorthand for [`Selection::Disadvantage`].
    pub fn disadvantage(self) -> Self {
        self.selection(Selection::Disadvantage)
    }

    /// Finalizes the configuration.
    ///
    /// # Errors
    /// - [`Error::UnsupportedDie`] if `sides` is not one of [`SUPPORTED_SIDES`].
    /// - [`Error::DiceCount`] if `count` is outside `1..=MAX_DICE`.
    /// - [`Error::SelectionCount`] if a drop/keep count is 0 or not below `count`.
    ///
    /// # Examples
    /// ```
    /// use dicebox::{GroupSpec, Selection, Error};
    ///
    /// assert!(GroupSpec::builder(6).count(3).build().is_ok());
    /// assert_eq!(GroupSpec::builder(7).build(), Err(Error::UnsupportedDie(7)));
    ///
    /// let keep_all = GroupSpec::builder(6).count(3).selection(Selection::kh(3)).build();
    /// assert!(matches!(keep_all, Err(Error::SelectionCount { .. })));
    /// ```
    pub fn build(self) -> Result<GroupSpec, Error> {
        if !SUPPORTED_SIDES.contains(&self.sides) {
            return Err(Error::UnsupportedDie(u32::from(self.sides)));
        }

        if !(1..=MAX_DICE).contains(&self.count) {
            return Err(Error::DiceCount(u32::from(self.count)));
        }

        let selection = self.selection.validate(self.count)?;

        Ok(GroupSpec {
            count: self.count,
            sides: self.sides,
            modifier: self.modifier,
            selection,
        })
    }
}


/// A rolled group: raw outcomes in roll order plus their kept/dropped partition.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiceGroup {
    #[cfg_attr(feature = "serde", serde(flatten))]
    spec: GroupSpec,
    outcomes: Vec<DieOutcome>,
    kept: Vec<DieOutcome>,
    dropped: Vec<DieOutcome>,
    total: i64,
}

impl DiceGroup {
    /// Applies the selection of `spec` to already rolled `outcomes`.
    ///
    /// # Examples
    /// ```
    /// use dicebox::{dice, DiceGroup, DieOutcome};
    ///
    /// let spec = dice!(6, 4, dl).unwrap();
    /// let faces = [3, 1, 5, 1].map(|face| DieOutcome::new(6, face));
    /// let group = DiceGroup::from_outcomes(spec, faces.to_vec());
    ///
    /// assert_eq!(group.kept_values(), vec![3, 5, 1]);
    /// assert_eq!(group.dropped_values(), vec![1]);
    /// assert_eq!(group.total(), 9);
    /// ```
    pub fn from_outcomes(spec: GroupSpec, outcomes: Vec<DieOutcome>) -> Self {
        let flags = spec.selection.partition(&outcomes);

        let (kept, dropped): (Vec<_>, Vec<_>) = outcomes.iter()
            .zip(flags)
            .partition(|(_, keep)| *keep);

        let kept: Vec<DieOutcome> = kept.into_iter().map(|(outcome, _)| *outcome).collect();
        let dropped: Vec<DieOutcome> = dropped.into_iter().map(|(outcome, _)| *outcome).collect();

        let total = kept.iter()
            .map(|outcome| i64::from(outcome.result))
            .sum::<i64>() + i64::from(spec.modifier);

        Self { spec, outcomes, kept, dropped, total }
    }

    /// The clause this group was rolled from.
    pub fn spec(&self) -> &GroupSpec {
        &self.spec
    }

    /// Number of dice requested by the clause.
    pub fn count(&self) -> u16 {
        self.spec.count
    }

    /// Number of sides of each die.
    pub fn sides(&self) -> u16 {
        self.spec.sides
    }

    /// Group modifier.
    pub fn modifier(&self) -> i32 {
        self.spec.modifier
    }

    /// Selection policy applied to the outcomes.
    pub fn selection(&self) -> Selection {
        self.spec.selection
    }

    /// Die label such as `"d20"`.
    pub fn label(&self) -> String {
        format!("d{}", self.spec.sides)
    }

    /// Raw outcomes in roll order.
    pub fn outcomes(&self) -> &[DieOutcome] {
        &self.outcomes
    }

    /// Outcomes counted towards the total, in roll order.
    pub fn kept(&self) -> &[DieOutcome] {
        &self.kept
    }

    /// Outcomes discarded by the selection, in roll order.
    pub fn dropped(&self) -> &[DieOutcome] {
        &self.dropped
    }

    /// Faces of [`DiceGroup::kept()`].
    pub fn kept_values(&self) -> Vec<u16> {
        self.kept.iter().map(DieOutcome::result).collect()
    }

    /// Faces of [`DiceGroup::dropped()`].
    pub fn dropped_values(&self) -> Vec<u16> {
        self.dropped.iter().map(DieOutcome::result).collect()
    }

    /// Sum of the kept faces plus the group modifier.
    pub fn total(&self) -> i64 {
        self.total
    }
}


fn choose(outcomes: &[DieOutcome], n: u16, highest: bool) -> Vec<bool> {
    let mut order: Vec<usize> = (0..outcomes.len()).collect();

    // stable sorts keep tied dice in roll order
    if highest {
        order.sort_by(|&a, &b| outcomes[b].result.cmp(&outcomes[a].result));
    } else {
        order.sort_by_key(|&i| outcomes[i].result);
    }

    let mut chosen = vec![false; outcomes.len()];
    for &i in order.iter().take(usize::from(n)) {
        chosen[i] = true;
    }

    chosen
}

fn invert(flags: Vec<bool>) -> Vec<bool> {
    flags.into_iter().map(|flag| !flag).collect()
}


/// A macro for conveniently creating [`GroupSpec`] instances.
///
/// # Syntax
/// - `dice!(SIDES)`: one die of `SIDES` sides (e.g., `dice!(20)` for 1d20).
/// - `dice!(SIDES, COUNT)`: `COUNT` dice (e.g., `dice!(6, 3)` for 3d6).
/// - `dice!(SIDES, COUNT, SEL)`: with a drop/keep selection of 1.
///   `SEL` must be one of `kh`, `kl`, `dh`, `dl`.
/// - `dice!(SIDES, COUNT, SEL, N)`: with a drop/keep selection of `N`.
///
/// # Returns
/// `Result<GroupSpec, Error>` - the result of [`GroupSpecBuilder::build()`].
///
/// # Examples
/// ```
/// use dicebox::dice;
///
/// assert_eq!(dice!(20).unwrap().to_string(), "1d20");
/// assert_eq!(dice!(6, 4, dl).unwrap().to_string(), "4d6dl1");
/// assert_eq!(dice!(6, 6, kh, 3).unwrap().to_string(), "6d6kh3");
/// assert!(dice!(7).is_err());
/// ```
#[macro_export]
macro_rules! dice {
    ($sides:literal) => {
        $crate::GroupSpec::builder($sides)
            .build()
    };

    ($sides:literal, $count:literal) => {
        $crate::GroupSpec::builder($sides)
            .count($count)
            .build()
    };

    ($sides:literal, $count:literal, $sel:ident) => {
        $crate::GroupSpec::builder($sides)
            .count($count)
            .selection($crate::Selection::$sel(1))
            .build()
    };

    ($sides:literal, $count:literal, $sel:ident, $n:literal) => {
        $crate::GroupSpec::builder($sides)
            .count($count)
            .selection($crate::Selection::$sel($n))
            .build()
    }
}
