use proptest::prelude::*;
use crate::roll::SUPPORTED_SIDES;


pub(crate) fn sides_strategy() -> impl Strategy<Value = u16> {
    prop::sample::select(SUPPORTED_SIDES.to_vec())
}

pub(crate) fn modifier_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        (1u16..=50).prop_map(|n| format!("+{n}")),
        (1u16..=50).prop_map(|n| format!("-{n}")),
    ]
}

pub(crate) fn suffix_strategy(count: u16) -> BoxedStrategy<String> {
    let fixed = prop_oneof![Just(String::new()), Just("adv".to_string()), Just("dis".to_string())];

    if count <= 1 {
        return fixed.boxed();
    }

    prop_oneof![
        fixed,
        (prop::sample::select(vec!["kh", "kl", "dh", "dl"]), prop::option::of(1..count))
            .prop_map(|(suffix, n)| match n {
                Some(n) => format!("{suffix}{n}"),
                None => suffix.to_string(),
            }),
    ].boxed()
}

pub(crate) fn clause_strategy() -> impl Strategy<Value = String> {
    (1u16..=100, sides_strategy(), any::<bool>())
        .prop_flat_map(|(count, sides, implicit)| {
            (modifier_strategy(), suffix_strategy(count)).prop_map(move |(modifier, suffix)| {
                if implicit && count == 1 {
                    format!("d{sides}{modifier}{suffix}")
                } else {
                    format!("{count}d{sides}{modifier}{suffix}")
                }
            })
        })
}

pub(crate) fn dice_expression_strategy() -> impl Strategy<Value = String> {
    (prop::collection::vec(clause_strategy(), 1..4), prop::option::of(-30i32..=30))
        .prop_map(|(clauses, constant)| {
            let mut expr = clauses.join(" + ");
            if let Some(constant) = constant {
                expr.push_str(&format!(" {constant:+}"));
            }
            expr
        })
}
