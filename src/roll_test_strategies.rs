use proptest::prelude::*;
use crate::roll::{GroupSpec, Selection, SUPPORTED_SIDES};


pub(crate) fn selection_strategy(count: u16) -> impl Strategy<Value = Selection> {
    if count <= 1 {
        return prop_oneof![
            Just(Selection::Normal),
            Just(Selection::Advantage),
            Just(Selection::Disadvantage),
        ].boxed();
    }

    (1u16..count, 0u8..7).prop_map(|(n, kind)| {
        match kind {
            0 => Selection::Normal,
            1 => Selection::Advantage,
            2 => Selection::Disadvantage,
            3 => Selection::kh(n),
            4 => Selection::kl(n),
            5 => Selection::dh(n),
            _ => Selection::dl(n),
        }
    }).boxed()
}

pub(crate) fn group_spec_strategy() -> impl Strategy<Value = GroupSpec> {
    (prop::sample::select(SUPPORTED_SIDES.to_vec()), 1..=100u16, -20..=20i32)
        .prop_flat_map(|(sides, count, modifier)| {
            selection_strategy(count).prop_map(move |selection| {
                GroupSpec::builder(sides)
                    .count(count)
                    .modifier(modifier)
                    .selection(selection)
                    .build()
                    .unwrap()
            })
        })
}

pub(crate) fn faces_strategy(sides: u16, len: std::ops::Range<usize>) -> impl Strategy<Value = Vec<u16>> {
    prop::collection::vec(1..=sides, len)
}
