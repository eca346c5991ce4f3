// ABOUTME: Trybuild runner for compile-time type safety tests.
// ABOUTME: Verifies that invalid type usage fails to compile.

#[test]
fn id_types_not_interchangeable() {
    let t = trybuild::TestCases::new();
    t.compile_fail("tests/compile_fail/id_not_interchangeable.rs");
}

#[test]
fn publish_not_available_on_pending() {
    let t = trybuild::TestCases::new();
    t.compile_fail("tests/compile_fail/invalid_transition_publish_on_pending.rs");
}

#[test]
fn build_not_available_on_pushed() {
    let t = trybuild::TestCases::new();
    t.compile_fail("tests/compile_fail/invalid_transition_build_on_pushed.rs");
}
