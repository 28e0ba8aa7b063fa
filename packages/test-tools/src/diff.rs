//! Readable diffs between expected and actual model lists.
//!
//! Comparison is by primary key. The report distinguishes three cases:
//! differing lengths, same keys in the wrong order (only when `ordered` is
//! requested), and missed/extra models, which are rendered field by field
//! so the failure message stands on its own.

use std::fmt::Write as _;

use sea_orm::{EntityName, EntityTrait, IdenStatic, Iterable, ModelTrait, PrimaryKeyToColumn, Value};

type Key = Vec<Value>;

/// Compare two model lists by primary key; `None` when they agree.
pub fn diff_models<E>(expected: &[E::Model], actual: &[E::Model], ordered: bool) -> Option<String>
where
    E: EntityTrait,
{
    let expected_keys: Vec<Key> = expected.iter().map(primary_key::<E>).collect();
    let actual_keys: Vec<Key> = actual.iter().map(primary_key::<E>).collect();

    let mut reason: Option<String> = None;
    if expected_keys.len() != actual_keys.len() {
        reason = Some(format!(
            "Expected {} models but got {}",
            expected.len(),
            actual.len()
        ));
    } else if ordered && same_key_set(&expected_keys, &actual_keys) && expected_keys != actual_keys
    {
        return Some(format!(
            "Wrong order\nExpect: {}\nGot:    {}",
            render_keys(&expected_keys),
            render_keys(&actual_keys)
        ));
    }

    let missed: Vec<&E::Model> = expected
        .iter()
        .zip(&expected_keys)
        .filter(|(_, key)| !actual_keys.contains(key))
        .map(|(model, _)| model)
        .collect();
    let extra: Vec<&E::Model> = actual
        .iter()
        .zip(&actual_keys)
        .filter(|(_, key)| !expected_keys.contains(key))
        .map(|(model, _)| model)
        .collect();

    if reason.is_none() && (!missed.is_empty() || !extra.is_empty()) {
        reason = Some("Expected and actual models differ".to_string());
    }

    reason.map(|reason| {
        let mut message = reason;
        if !missed.is_empty() {
            let _ = write!(message, "\nMissed models:\n{}", render_models::<E>(&missed));
        }
        if !extra.is_empty() {
            let _ = write!(message, "\nExtra models:\n{}", render_models::<E>(&extra));
        }
        message
    })
}

/// Returns true if the two lists disagree (by primary key).
pub fn has_diff<E>(expected: &[E::Model], actual: &[E::Model], ordered: bool) -> bool
where
    E: EntityTrait,
{
    diff_models::<E>(expected, actual, ordered).is_some()
}

fn primary_key<E>(model: &E::Model) -> Key
where
    E: EntityTrait,
{
    E::PrimaryKey::iter()
        .map(|pk| model.get(pk.into_column()))
        .collect()
}

fn same_key_set(expected: &[Key], actual: &[Key]) -> bool {
    expected.iter().all(|key| actual.contains(key))
        && actual.iter().all(|key| expected.contains(key))
}

fn render_keys(keys: &[Key]) -> String {
    keys.iter()
        .map(|key| {
            key.iter()
                .map(|value| format!("{value:?}"))
                .collect::<Vec<_>>()
                .join(":")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_models<E>(models: &[&E::Model]) -> String
where
    E: EntityTrait,
{
    models
        .iter()
        .map(|model| {
            let fields = E::Column::iter()
                .map(|column| format!("{}={:?}", column.as_str(), model.get(column)))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{}({fields})", E::default().table_name())
        })
        .collect::<Vec<_>>()
        .join("\n")
}
