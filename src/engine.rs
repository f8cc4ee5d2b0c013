use std::sync::Arc;
use tracing::{debug, info, warn};
use crate::config::EngineConfig;
use crate::error::Error;
use crate::history::{History, Statistics};
use crate::parser::parse;
use crate::record::RollExpression;
use crate::roll::DieSource;
use crate::seed::{resolve_seed, SeededDice};


const STOCK_SUGGESTIONS: [&str; 10] = [
    "1d20",
    "1d20+5",
    "2d6",
    "1d8+3",
    "4d6dl1",
    "1d20adv",
    "1d20dis",
    "1d4",
    "3d6",
    "1d12+2",
];

const CONTEXT_SUGGESTIONS: [(&[&str], &[&str]); 5] = [
    (&["attack"], &["1d20+5", "1d20adv"]),
    (&["damage"], &["1d8+3", "2d6"]),
    (&["save", "saving"], &["1d20+3"]),
    (&["ability", "stat"], &["4d6dl1"]),
    (&["initiative"], &["1d20+2"]),
];


/// Outcome of [`DiceEngine::validate()`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Validation {
    /// The expression as submitted.
    pub expression: String,
    /// Whether it would roll.
    pub valid: bool,
    /// Parser message when invalid.
    pub error: Option<String>,
    /// Number of dice groups, when valid.
    pub parsed_groups: Option<usize>,
    /// Die labels of the groups, when valid.
    pub dice_types: Option<Vec<String>>,
    /// Smallest and largest possible totals, when valid.
    pub range: Option<(i64, i64)>,
}


/// Parses, rolls and records dice expressions.
///
/// The host builds one engine and shares it (by reference or behind an `Arc`);
/// every method takes `&self` and may be called from any thread. Each call binds
/// its own seeded generator, so only the history is shared.
///
/// # Examples
/// ```
/// use dicebox::DiceEngine;
///
/// let engine = DiceEngine::default();
///
/// let first = engine.execute("4d6dl1", Some("abc"));
/// let second = engine.execute("4d6dl1", Some("abc"));
///
/// assert!(first.is_valid());
/// assert!(first.same_roll(&second));
/// assert_eq!(engine.history_len(), 2);
/// ```
#[derive(Debug)]
pub struct DiceEngine {
    config: EngineConfig,
    history: History,
}

impl DiceEngine {
    /// Creates an engine with an empty history.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] if `config` does not validate.
    pub fn new(config: EngineConfig) -> Result<Self, Error> {
        let config = config.validate()?;
        let history = History::new(config.history_capacity());

        Ok(Self { config, history })
    }

    /// Settings the engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parses and rolls `expression`, recording the result.
    ///
    /// Without a caller seed one is derived and stored in the result. Invalid
    /// expressions come back with `is_valid() == false`, a total of 0 and an
    /// error message; they are never rolled.
    ///
    /// # Examples
    /// ```
    /// use dicebox::DiceEngine;
    ///
    /// let engine = DiceEngine::default();
    ///
    /// let empty = engine.execute("", None);
    /// assert!(!empty.is_valid());
    /// assert_eq!(empty.error_message(), Some("Empty expression"));
    ///
    /// let roll = engine.execute("2d6+3", None);
    /// assert!((5..=15).contains(&roll.total()));
    /// assert_eq!(roll.seed().map(str::len), Some(8));
    /// ```
    pub fn execute(&self, expression: &str, seed: Option<&str>) -> RollExpression {
        let seed = resolve_seed(seed, expression);
        let mut dice = SeededDice::new(&seed);

        self.run(expression, Some(&seed), &mut dice)
    }

    /// Like [`DiceEngine::execute()`] but draws faces from `dice`.
    ///
    /// The result is recorded without a seed, so it can never be replayed.
    ///
    /// # Examples
    /// ```
    /// use dicebox::{DiceEngine, DieSource};
    ///
    /// struct Loaded;
    ///
    /// impl DieSource for Loaded {
    ///     fn roll_die(&mut self, sides: u16) -> u16 {
    ///         sides
    ///     }
    /// }
    ///
    /// let engine = DiceEngine::default();
    /// let roll = engine.execute_with("2d6+1", &mut Loaded);
    ///
    /// assert_eq!(roll.total(), 13);
    /// assert_eq!(roll.seed(), None);
    /// ```
    pub fn execute_with(&self, expression: &str, dice: &mut dyn DieSource) -> RollExpression {
        self.run(expression, None, dice)
    }

    fn run(&self, expression: &str, seed: Option<&str>, dice: &mut dyn DieSource) -> RollExpression {
        let parsed = match parse(expression) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!("Rejected dice expression {:?}: {}", expression, err);

                let rejected = RollExpression::invalid(expression, &err);
                if self.config.record_invalid() {
                    self.history.record(Arc::new(rejected.clone()));
                }
                return rejected;
            }
        };

        let result = RollExpression::rolled(expression, &parsed, seed, dice);

        debug!(
            "Rolled {} with seed {}: total {}",
            parsed,
            result.seed().unwrap_or("<none>"),
            result.total()
        );

        self.history.record(Arc::new(result.clone()));
        result
    }

    /// Checks an expression without rolling it.
    ///
    /// # Examples
    /// ```
    /// use dicebox::DiceEngine;
    ///
    /// let engine = DiceEngine::default();
    ///
    /// let report = engine.validate("2d6+1d8");
    /// assert!(report.valid);
    /// assert_eq!(report.dice_types, Some(vec!["d6".to_string(), "d8".to_string()]));
    /// assert_eq!(report.range, Some((3, 20)));
    ///
    /// assert!(!engine.validate("3d7").valid);
    /// ```
    pub fn validate(&self, expression: &str) -> Validation {
        match parse(expression) {
            Ok(parsed) => Validation {
                expression: expression.to_string(),
                valid: true,
                error: None,
                parsed_groups: Some(parsed.groups().len()),
                dice_types: Some(parsed.dice_types()),
                range: Some(parsed.possible_values()),
            },
            Err(err) => Validation {
                expression: expression.to_string(),
                valid: false,
                error: Some(err.to_string()),
                parsed_groups: None,
                dice_types: None,
                range: None,
            },
        }
    }

    /// Re-executes the oldest stored roll made with `seed`.
    ///
    /// The replay is recorded like any other execution and reproduces the
    /// original dice exactly.
    ///
    /// # Errors
    /// Returns [`Error::SeedNotFound`] if no stored roll used `seed`.
    pub fn replay(&self, seed: &str) -> Result<RollExpression, Error> {
        let Some(original) = self.history.find_by_seed(seed) else {
            warn!("No roll found with seed {}", seed);
            return Err(Error::SeedNotFound(seed.to_string()));
        };

        info!("Replaying {} with seed {}", original.expression(), seed);
        Ok(self.execute(original.expression(), Some(seed)))
    }

    /// Common expressions, with the ones matching `context` first.
    ///
    /// # Examples
    /// ```
    /// use dicebox::DiceEngine;
    ///
    /// let engine = DiceEngine::default();
    ///
    /// assert_eq!(engine.suggest("Damage roll")[..2], ["1d8+3", "2d6"]);
    /// assert_eq!(engine.suggest("").len(), 10);
    /// ```
    pub fn suggest(&self, context: &str) -> Vec<String> {
        let context = context.to_lowercase();

        let preferred: &[&str] = CONTEXT_SUGGESTIONS.iter()
            .find(|(keywords, _)| keywords.iter().any(|keyword| context.contains(*keyword)))
            .map(|&(_, expressions)| expressions)
            .unwrap_or_default();

        preferred.iter()
            .chain(STOCK_SUGGESTIONS.iter())
            .take(self.config.suggestion_limit())
            .map(|expression| expression.to_string())
            .collect()
    }

    /// Up to `limit` stored rolls, most recent first. A `limit` of 0 returns all of them.
    pub fn recent(&self, limit: usize) -> Vec<Arc<RollExpression>> {
        self.history.recent(limit)
    }

    /// Forgets every stored roll.
    pub fn clear_history(&self) {
        let cleared = self.history.len();
        self.history.clear();
        info!("Cleared {} rolls from history", cleared);
    }

    /// Aggregates over the stored rolls.
    pub fn statistics(&self) -> Statistics {
        self.history.statistics()
    }

    /// Number of stored rolls.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

impl Default for DiceEngine {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            history: History::new(EngineConfig::DEFAULT_HISTORY_CAPACITY),
        }
    }
}


#[cfg(test)]
mod test {
    use std::collections::VecDeque;
    use proptest::prelude::*;
    use super::*;
    use crate::parser::str_test_strategies::dice_expression_strategy;


    struct Scripted(VecDeque<u16>);

    impl DieSource for Scripted {
        fn roll_die(&mut self, _sides: u16) -> u16 {
            self.0.pop_front().unwrap()
        }
    }

    fn engine_with(capacity: usize) -> DiceEngine {
        DiceEngine::new(EngineConfig::builder().history_capacity(capacity).build().unwrap()).unwrap()
    }

    proptest! {
        #[test]
        fn test_totals_are_consistent(expr in dice_expression_strategy(), seed in "[a-z0-9]{1,12}") {
            let engine = DiceEngine::default();
            let result = engine.execute(&expr, Some(&seed));

            prop_assert!(result.is_valid(), "{expr}: {:?}", result.error_message());

            let groups_total: i64 = result.groups().iter().map(|group| group.total()).sum();
            prop_assert_eq!(result.total(), groups_total + i64::from(result.constant_modifier()));

            for group in result.groups() {
                let kept: i64 = group.kept_values().iter().map(|&v| i64::from(v)).sum();
                prop_assert_eq!(group.total(), kept + i64::from(group.modifier()));
                prop_assert_eq!(group.kept().len() + group.dropped().len(), group.outcomes().len());
            }
        }

        #[test]
        fn test_execution_is_deterministic(expr in dice_expression_strategy(), seed in "[a-z0-9]{1,12}") {
            let engine = DiceEngine::default();
            let first = engine.execute(&expr, Some(&seed));
            let second = engine.execute(&expr, Some(&seed));

            prop_assert!(first.same_roll(&second));
        }
    }

    #[test]
    fn test_invalid_expressions() {
        let engine = DiceEngine::default();

        let empty = engine.execute("", None);
        assert!(!empty.is_valid());
        assert_eq!(empty.total(), 0);
        assert!(empty.groups().is_empty());
        assert_eq!(empty.error_message(), Some("Empty expression"));

        let too_many = engine.execute("101d6", Some("abc"));
        assert!(!too_many.is_valid());
        assert_eq!(too_many.seed(), None);
        assert!(too_many.error_message().unwrap().contains("Invalid dice count: 101"));

        assert_eq!(engine.history_len(), 0);
    }

    #[test]
    fn test_record_invalid_does_not_skew_statistics() {
        let config = EngineConfig::builder().record_invalid(true).build().unwrap();
        let engine = DiceEngine::new(config).unwrap();

        engine.execute_with("1d20+5", &mut Scripted(VecDeque::from([15])));
        engine.execute("1d7", None);

        let stats = engine.statistics();
        assert_eq!(engine.history_len(), 2);
        assert_eq!(stats.count, 2);
        assert_eq!(stats.valid_count, 1);
        assert_eq!(stats.mean_total, 20.0);
    }

    #[test]
    fn test_forced_natural_twenty() {
        let engine = DiceEngine::default();
        let result = engine.execute_with("1d20+5", &mut Scripted(VecDeque::from([20])));

        assert!(result.groups()[0].outcomes()[0].is_max());
        assert_eq!(result.total(), 25);
        assert_eq!(engine.statistics().natural_20_count, 1);
    }

    #[test]
    fn test_external_dice_are_never_replayed() {
        let engine = DiceEngine::default();
        let forced = engine.execute_with("1d20+5", &mut Scripted(VecDeque::from([20])));
        let seeded = engine.execute("1d20+5", Some("table-1"));

        assert_eq!(forced.seed(), None);
        assert_eq!(engine.history_len(), 2);

        for record in engine.recent(0) {
            if let Some(seed) = record.seed() {
                assert!(record.same_roll(&engine.replay(seed).unwrap()));
            }
        }

        assert!(seeded.same_roll(&engine.replay("table-1").unwrap()));
        assert_eq!(engine.history_len(), 4);
    }

    #[test]
    fn test_seeded_drop_lowest_repeats() {
        let engine = DiceEngine::default();
        let first = engine.execute("4d6dl1", Some("abc"));
        let second = engine.execute("4d6dl1", Some("abc"));

        let (a, b) = (&first.groups()[0], &second.groups()[0]);
        assert_eq!(a.outcomes().len(), 4);
        assert_eq!(a.outcomes(), b.outcomes());
        assert_eq!(a.kept_values(), b.kept_values());
        assert_eq!(a.dropped_values(), b.dropped_values());
        assert_eq!(a.kept().len(), 3);

        let dropped = a.dropped_values()[0];
        assert!(a.kept_values().iter().all(|&v| dropped <= v));
    }

    #[test]
    fn test_known_drop_lowest_roll() {
        let engine = DiceEngine::default();
        let result = engine.execute("4d6dl1", Some("abc"));
        let group = &result.groups()[0];

        let faces: Vec<u16> = group.outcomes().iter().map(|outcome| outcome.result()).collect();
        assert_eq!(faces, vec![4, 2, 6, 2]);
        assert_eq!(group.kept_values(), vec![4, 6, 2]);
        assert_eq!(group.dropped_values(), vec![2]);
        assert_eq!(result.total(), 12);
    }

    #[test]
    fn test_replay() {
        let engine = DiceEngine::default();
        let original = engine.execute("3d8kh2+1", None);
        let seed = original.seed().unwrap().to_string();

        let replayed = engine.replay(&seed).unwrap();
        assert!(original.same_roll(&replayed));
        assert_eq!(engine.history_len(), 2);

        assert_eq!(
            engine.replay("seed-never-used"),
            Err(Error::SeedNotFound("seed-never-used".to_string()))
        );
    }

    #[test]
    fn test_capacity_eviction() {
        let engine = engine_with(3);
        for i in 0..4 {
            engine.execute("1d6", Some(&format!("s{i}")));
        }

        let recent = engine.recent(3);
        assert_eq!(recent.len(), 3);
        assert!(recent.iter().all(|record| record.seed() != Some("s0")));
        assert!(engine.replay("s0").is_err());
    }

    #[test]
    fn test_clear_history() {
        let engine = DiceEngine::default();
        engine.execute("1d20", None);
        engine.clear_history();

        assert_eq!(engine.history_len(), 0);
        assert_eq!(engine.statistics().count, 0);
    }

    #[test]
    fn test_validate() {
        let engine = DiceEngine::default();

        let report = engine.validate("4d6dl1+2");
        assert!(report.valid);
        assert_eq!(report.parsed_groups, Some(1));
        assert_eq!(report.range, Some((5, 20)));

        let report = engine.validate("");
        assert!(!report.valid);
        assert_eq!(report.error.as_deref(), Some("Empty expression"));
        assert_eq!(report.parsed_groups, None);

        assert_eq!(engine.history_len(), 0);
    }

    #[test]
    fn test_suggest() {
        let engine = DiceEngine::default();

        assert_eq!(engine.suggest(""), STOCK_SUGGESTIONS.map(String::from).to_vec());
        assert_eq!(engine.suggest("ATTACK the goblin")[..2], ["1d20+5", "1d20adv"]);
        assert_eq!(engine.suggest("saving throw")[0], "1d20+3");
        assert_eq!(engine.suggest("roll stats")[0], "4d6dl1");
        assert_eq!(engine.suggest("initiative")[0], "1d20+2");
        assert_eq!(engine.suggest("attack").len(), 10);

        let small = DiceEngine::new(EngineConfig::builder().suggestion_limit(3).build().unwrap()).unwrap();
        assert_eq!(small.suggest("damage"), vec!["1d8+3", "2d6", "1d20"]);
    }

    #[test]
    fn test_every_suggestion_is_valid() {
        let engine = DiceEngine::default();

        for context in ["", "attack", "damage", "save", "ability", "initiative"] {
            for expression in engine.suggest(context) {
                assert!(engine.validate(&expression).valid, "{expression}");
            }
        }
    }

    #[test]
    fn test_shared_across_threads() {
        let engine = Arc::new(engine_with(100));

        let handles: Vec<_> = (0..4).map(|t| {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || {
                for i in 0..50 {
                    let result = engine.execute("2d20kh1", Some(&format!("{t}:{i}")));
                    assert!(result.is_valid());
                }
            })
        }).collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(engine.history_len(), 100);
        assert_eq!(engine.statistics().valid_count, 100);
    }
}
