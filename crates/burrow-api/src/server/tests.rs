use super::*;

#[test]
fn pagination_enforces_max_bounds() {
    let (start, end, next_cursor) = paginate(100, Some(10), Some(20)).expect("page should work");
    assert_eq!(start, 10);
    assert_eq!(end, 30);
    assert_eq!(next_cursor, Some(30));

    let out_of_range = paginate(5, Some(10), Some(1));
    assert!(out_of_range.is_err());
}

#[test]
fn event_kind_filter_accepts_both_spellings() {
    let filter = parse_event_kind_filter(&["energy_low".to_string(), "CombatEnded".to_string()])
        .expect("filter should parse")
        .expect("filter should be present");
    assert!(filter.contains(&EventKind::EnergyLow));
    assert!(filter.contains(&EventKind::CombatEnded));

    assert!(parse_event_kind_filter(&["no_such_kind".to_string()]).is_err());
}

#[test]
fn scope_filter_rejects_unknown_values() {
    assert_eq!(
        parse_scope_filter(Some("local")).expect("local parses"),
        Some(EventScope::Local)
    );
    assert_eq!(parse_scope_filter(None).expect("absent is fine"), None);
    assert!(parse_scope_filter(Some("village")).is_err());
}

#[test]
fn require_run_rejects_missing_and_mismatched_runs() {
    let mut inner = ServerInner::default();
    assert!(require_run(&inner, "run_demo_001").is_err());

    inner.engine = Some(EngineApi::from_config(SimConfig::default()));
    let active_run_id = inner
        .engine
        .as_ref()
        .map(|engine| engine.run_id().to_string())
        .expect("engine present");

    assert!(require_run(&inner, &active_run_id).is_ok());
    assert!(require_run(&inner, "run_other").is_err());
}
