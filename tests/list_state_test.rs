use listcrate::{ListConfig, ListError, ListState, Predicate, SortDirective};

/// A spread of states: different page sizes, offsets, facets, searches and sorts.
fn sample_states() -> Vec<ListState> {
    let mut states = Vec::new();
    for limit in [1, 10, 20, 37] {
        let base = ListState::new(limit).unwrap();
        states.push(base.clone());
        states.push(base.set_page(5).unwrap());
        states.push(
            base.set_filter_facet("status", Predicate::equals("status", "VALID"))
                .set_page(3)
                .unwrap(),
        );
        states.push(
            base.set_search("ali")
                .set_sort(vec![SortDirective::desc("hired_at"), SortDirective::asc("name")])
                .set_page(2)
                .unwrap(),
        );
        states.push(
            base.set_filter_facet("team", Predicate::one_of("team", ["backend", "design"]))
                .set_filter_facet("archived", Predicate::equals("is_archived", "false"))
                .set_page(9)
                .unwrap(),
        );
    }
    states
}

#[test]
fn test_clearing_absent_facet_is_noop() {
    for state in sample_states() {
        assert_eq!(state.clear_filter_facet("not_a_facet"), state);
    }
}

#[test]
fn test_search_and_filter_reset_offset() {
    for state in sample_states() {
        assert_eq!(state.set_search("bob").offset(), 0);
        assert_eq!(state.set_search("").offset(), 0);
        assert_eq!(
            state
                .set_filter_facet("team", Predicate::equals("team", "hr"))
                .offset(),
            0
        );
    }
}

#[test]
fn test_sort_preserves_offset() {
    let sequences = vec![
        vec![],
        vec![SortDirective::asc("name")],
        vec![SortDirective::desc("status"), SortDirective::asc("id")],
    ];
    for state in sample_states() {
        for seq in &sequences {
            let sorted = state.set_sort(seq.clone());
            assert_eq!(sorted.offset(), state.offset());
            assert_eq!(sorted.sort_by(), seq.as_slice());
        }
    }
}

#[test]
fn test_largest_pages_keep_page_and_offset_in_step() {
    for limit in [7_u64, 20, 100] {
        let state = ListState::new(limit).unwrap();
        let last = i64::try_from(u64::MAX / limit + 1).unwrap();

        let moved = state.set_page(last).unwrap();
        assert_eq!(moved.page(), last.unsigned_abs());
        assert_eq!(moved.offset(), moved.limit() * (last.unsigned_abs() - 1));

        assert_eq!(
            state.set_page(last + 1),
            Err(ListError::InvalidPage { page: last + 1 })
        );
        assert_eq!(
            state.set_page(i64::MAX),
            Err(ListError::InvalidPage { page: i64::MAX })
        );
    }

    let single = ListState::new(1).unwrap().set_page(i64::MAX).unwrap();
    assert_eq!(single.page(), i64::MAX.unsigned_abs());
}

#[test]
fn test_page_round_trip() {
    for limit in [1, 3, 20, 50] {
        let state = ListState::new(limit).unwrap();
        for page in 1..=200_i64 {
            let moved = state.set_page(page).unwrap();
            assert_eq!(moved.offset() / moved.limit() + 1, page.unsigned_abs());
            assert_eq!(moved.page(), page.unsigned_abs());
        }
    }
}

#[test]
fn test_clear_facet_is_idempotent() {
    for state in sample_states() {
        for key in ["status", "team", "archived", "missing"] {
            let once = state.clear_filter_facet(key);
            assert_eq!(once.clear_filter_facet(key), once);
        }
    }
}

#[test]
fn test_search_reset_scenario() {
    let state = ListState::new(20).unwrap().set_page(3).unwrap();
    assert_eq!(state.offset(), 40);
    assert_eq!(state.search(), "");

    let next = state.set_search("alice");
    assert_eq!(next.offset(), 0);
    assert_eq!(next.limit(), 20);
    assert_eq!(next.search(), "alice");
    assert!(next.filter().is_empty());
    assert!(next.sort_by().is_empty());
}

#[test]
fn test_default_facet_must_be_removed_explicitly() {
    // "only non-archived" is on by default; showing everything means deleting the key
    let state = ListState::new(20)
        .unwrap()
        .set_filter_facet("archived", Predicate::equals("is_archived", "false"));
    let everything = state.clear_filter_facet("archived");
    assert!(everything.facet("archived").is_none());
    assert!(everything.filter().is_empty());
}

#[test]
fn test_invalid_pages_rejected() {
    let state = ListState::new(20).unwrap().set_page(2).unwrap();
    for page in [0, -1, i64::MIN] {
        assert_eq!(state.set_page(page), Err(ListError::InvalidPage { page }));
    }
}

#[test]
fn test_bookmarked_url_restores_state() {
    let config = ListConfig::default();
    for state in sample_states() {
        let restored = ListState::from_query(&state.to_query(), &config).unwrap();
        assert_eq!(restored, state);
    }
}
