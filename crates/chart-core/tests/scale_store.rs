// Purpose: name-keyed ScaleConfig cache semantics.

use chart_core::{Column, ScaleConfig, ScaleConfigStore};

#[test]
fn get_creates_and_caches_empty_entry() {
    let mut store = ScaleConfigStore::new();
    assert!(store.is_empty());

    let scale = store.get("price");
    assert_eq!(scale, ScaleConfig::empty("price"));
    assert!(store.contains("price"));
    assert_eq!(store.len(), 1);

    store.get("price");
    assert_eq!(store.len(), 1);
}

#[test]
fn get_returns_an_independent_copy() {
    let mut store = ScaleConfigStore::new();
    let mut copy = store.get("price");
    copy.ticks.step_size = Some(10.0);
    assert_eq!(store.get("price").ticks.step_size, None);
}

#[test]
fn update_zips_by_position_and_ignores_the_longer_tail() {
    let mut store = ScaleConfigStore::new();
    let columns = vec![Column::number("a"), Column::number("b")];
    let scales = vec![
        ScaleConfig::empty("stale").with_step_size(1.0),
        ScaleConfig::empty("b").with_rotation(90.0),
        ScaleConfig::empty("c").with_step_size(3.0),
    ];
    store.update(&scales, &columns);

    assert_eq!(store.len(), 2);
    let a = store.get("a");
    assert_eq!(a.column_name, "a");
    assert_eq!(a.ticks.step_size, Some(1.0));
    assert_eq!(store.get("b").ticks.rotation, Some(90.0));
    assert!(!store.contains("c"));
    assert!(!store.contains("stale"));

    store.update(&scales[..1], &[Column::number("x"), Column::number("y")]);
    assert!(store.contains("x"));
    assert!(!store.contains("y"));
}

#[test]
fn put_stores_under_own_name() {
    let mut store = ScaleConfigStore::new();
    store.put(ScaleConfig::empty("v").with_step_size(2.5));
    assert_eq!(store.get("v").ticks.step_size, Some(2.5));
}
