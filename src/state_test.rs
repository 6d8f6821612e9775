use super::*;
use crate::params;
use crate::router::{MemoryRouter, ReadyCallback};
use crate::value::ParamValue;

fn recording(state: &ParamsState) -> Rc<RefCell<Vec<ParamsMap>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    state.subscribe(move |params| sink.borrow_mut().push(params.clone()));
    seen
}

/// Router whose navigation always fails, for error-path coverage.
struct RefusingRouter;

impl Router for RefusingRouter {
    fn is_ready(&self) -> bool {
        true
    }

    fn path(&self) -> String {
        "/reports".to_owned()
    }

    fn query(&self) -> ParamsMap {
        ParamsMap::new()
    }

    fn push(&self, target: &str) -> Result<(), RouterError> {
        Err(RouterError::InvalidTarget(target.to_owned()))
    }

    fn on_ready(&self, callback: ReadyCallback) {
        callback();
    }
}

// =============================================================
// Readiness and the initial merge
// =============================================================

#[test]
fn before_readiness_params_equal_sanitized_fallback() {
    let router = Rc::new(MemoryRouter::at("/reports", "page=3"));
    let state = ParamsState::bind(Rc::clone(&router), params! { "page" => 1, "q" => "" });

    assert!(!state.params_loaded());
    let params = state.params();
    assert_eq!(params.get("page"), Some(&ParamValue::Int(1)));
    assert!(!params.contains_key("q"));
}

#[test]
fn readiness_merges_url_query_over_fallback() {
    let router = Rc::new(MemoryRouter::at("/reports", "page=3"));
    let state = ParamsState::bind(Rc::clone(&router), params! { "page" => 1, "q" => "" });
    router.set_ready();

    assert!(state.params_loaded());
    let params = state.params();
    assert_eq!(params.len(), 1);
    // The URL wins and the value stays a raw string; nothing coerces it
    // back to the fallback's integer type.
    assert_eq!(params.get("page"), Some(&ParamValue::Str("3".to_owned())));
    assert!(!params.contains_key("q"));
}

#[test]
fn binding_to_ready_router_loads_immediately() {
    let router = Rc::new(MemoryRouter::ready_at("/reports", "q=alerts"));
    let state = ParamsState::bind(Rc::clone(&router), params! { "page" => 1 });

    assert!(state.params_loaded());
    assert_eq!(state.params().get_str("q"), Some("alerts"));
    assert_eq!(state.params().get_i64("page"), Some(1));
}

#[test]
fn params_loaded_is_monotone() {
    let router = Rc::new(MemoryRouter::at("/", ""));
    let state = ParamsState::bind(Rc::clone(&router), params!());
    assert!(!state.params_loaded());

    router.set_ready();
    assert!(state.params_loaded());

    state.set_fallback(params! { "page" => 1 });
    state.set_params(params!()).expect("push");
    assert!(state.params_loaded());
}

#[test]
fn url_keys_outside_fallback_pass_through() {
    let router = Rc::new(MemoryRouter::ready_at("/reports", "extra=1"));
    let state = ParamsState::bind(Rc::clone(&router), params! { "page" => 2 });

    let params = state.params();
    assert_eq!(params.get_str("extra"), Some("1"));
    assert_eq!(params.get_i64("page"), Some(2));
}

// =============================================================
// set_params
// =============================================================

#[test]
fn set_params_drops_empty_values_before_persisting() {
    let router = Rc::new(MemoryRouter::ready_at("/reports", ""));
    let state = ParamsState::bind(Rc::clone(&router), params!());

    state
        .set_params(params! { "page" => 2, "q" => "", "sort" => Option::<&str>::None })
        .expect("push");

    let params = state.params();
    assert_eq!(params.len(), 1);
    assert_eq!(params.get_i64("page"), Some(2));
    assert_eq!(router.history(), ["/reports?page=2".to_owned()]);
}

#[test]
fn set_params_pushes_current_path_with_encoded_query() {
    let router = Rc::new(MemoryRouter::ready_at("/reports", ""));
    let state = ParamsState::bind(Rc::clone(&router), params!());

    state.set_params(params! { "q" => "two words", "page" => 2 }).expect("push");
    assert_eq!(
        router.history().last().map(String::as_str),
        Some("/reports?page=2&q=two%20words")
    );
}

#[test]
fn set_params_keeps_caller_types_until_reload() {
    let router = Rc::new(MemoryRouter::ready_at("/reports", ""));
    let state = ParamsState::bind(Rc::clone(&router), params!());

    state.set_params(params! { "page" => 2 }).expect("push");
    assert_eq!(state.params().get("page"), Some(&ParamValue::Int(2)));
}

#[test]
fn rapid_sets_are_last_write_wins() {
    let router = Rc::new(MemoryRouter::ready_at("/reports", ""));
    let state = ParamsState::bind(Rc::clone(&router), params!());

    state.set_params(params! { "page" => 1 }).expect("push");
    state.set_params(params! { "page" => 2 }).expect("push");
    state.set_params(params! { "page" => 3 }).expect("push");

    assert_eq!(router.history().len(), 3);
    assert_eq!(router.query().get_str("page"), Some("3"));
}

#[test]
fn router_error_propagates_but_state_still_updates() {
    let state = ParamsState::bind(Rc::new(RefusingRouter), params!());
    assert!(state.params_loaded());

    let err = state.set_params(params! { "page" => 1 }).expect_err("push should fail");
    assert!(matches!(err, RouterError::InvalidTarget(_)));
    assert_eq!(state.params().get_i64("page"), Some(1));
}

// =============================================================
// patch_params
// =============================================================

#[test]
fn patch_params_matches_set_params_with_merged_input() {
    let router_a = Rc::new(MemoryRouter::ready_at("/reports", ""));
    let patched = ParamsState::bind(Rc::clone(&router_a), params!());
    let router_b = Rc::new(MemoryRouter::ready_at("/reports", ""));
    let replaced = ParamsState::bind(Rc::clone(&router_b), params!());

    patched.set_params(params! { "page" => 1, "q" => "alerts" }).expect("push");
    replaced.set_params(params! { "page" => 1, "q" => "alerts" }).expect("push");

    patched.patch_params(params! { "page" => 2 }).expect("push");
    replaced.set_params(params! { "page" => 2, "q" => "alerts" }).expect("push");

    assert_eq!(patched.params(), replaced.params());
    assert_eq!(router_a.history().last(), router_b.history().last());
}

#[test]
fn patch_to_null_removes_the_key() {
    let router = Rc::new(MemoryRouter::ready_at("/reports", ""));
    let state = ParamsState::bind(Rc::clone(&router), params!());

    state.set_params(params! { "page" => 1, "q" => "alerts" }).expect("push");
    state.patch_params(params! { "q" => ParamValue::Null }).expect("push");

    assert!(!state.params().contains_key("q"));
    assert_eq!(router.history().last().map(String::as_str), Some("/reports?page=1"));
}

// =============================================================
// Fallback stabilization
// =============================================================

#[test]
fn set_fallback_with_shallow_equal_map_is_a_noop() {
    let router = Rc::new(MemoryRouter::ready_at("/reports", "page=3"));
    let state = ParamsState::bind(Rc::clone(&router), params! { "page" => 1 });
    let seen = recording(&state);

    state.set_fallback(params! { "page" => 1 });
    assert!(seen.borrow().is_empty());
}

#[test]
fn set_fallback_change_remerges_against_live_query() {
    let router = Rc::new(MemoryRouter::ready_at("/reports", "page=9"));
    let state = ParamsState::bind(Rc::clone(&router), params! { "page" => 1 });
    let pushes_before = router.history().len();

    state.set_fallback(params! { "page" => 1, "size" => 10 });

    let params = state.params();
    assert_eq!(params.get("page"), Some(&ParamValue::Str("9".to_owned())));
    assert_eq!(params.get_i64("size"), Some(10));
    // Re-merging is a local affair; it never navigates.
    assert_eq!(router.history().len(), pushes_before);
}

#[test]
fn set_fallback_before_readiness_defers_the_merge() {
    let router = Rc::new(MemoryRouter::at("/reports", "q=x"));
    let state = ParamsState::bind(Rc::clone(&router), params! { "page" => 1 });

    state.set_fallback(params! { "size" => 10 });
    assert!(!state.params_loaded());
    assert_eq!(state.params().get_i64("page"), Some(1));

    router.set_ready();
    let params = state.params();
    assert!(!params.contains_key("page"));
    assert_eq!(params.get_i64("size"), Some(10));
    assert_eq!(params.get_str("q"), Some("x"));
}

// =============================================================
// Subscriptions
// =============================================================

#[test]
fn subscribers_receive_snapshots_on_load_and_set() {
    let router = Rc::new(MemoryRouter::at("/reports", "page=3"));
    let state = ParamsState::bind(Rc::clone(&router), params! { "page" => 1, "q" => "" });
    let seen = recording(&state);

    router.set_ready();
    state.set_params(params! { "q" => "alerts" }).expect("push");

    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].get_str("page"), Some("3"));
    assert_eq!(seen[1].get_str("q"), Some("alerts"));
}

#[test]
fn unsubscribe_stops_notifications() {
    let router = Rc::new(MemoryRouter::ready_at("/reports", ""));
    let state = ParamsState::bind(Rc::clone(&router), params!());

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let subscription = state.subscribe(move |params| sink.borrow_mut().push(params.clone()));

    state.set_params(params! { "page" => 1 }).expect("push");
    assert_eq!(seen.borrow().len(), 1);

    state.unsubscribe(subscription);
    state.set_params(params! { "page" => 2 }).expect("push");
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn clones_observe_the_same_state() {
    let router = Rc::new(MemoryRouter::ready_at("/reports", ""));
    let state = ParamsState::bind(Rc::clone(&router), params!());
    let other = state.clone();

    state.set_params(params! { "page" => 4 }).expect("push");
    assert_eq!(other.params().get_i64("page"), Some(4));
    assert!(other.params_loaded());
}
