// ABOUTME: Integration tests for release version resolution.
// ABOUTME: Covers trigger parsing plus property tests over arbitrary inputs.

use gantry::types::{ReleaseRun, TriggerKind};

mod resolution {
    use super::*;

    #[test]
    fn tag_push_versions_with_run_number() {
        let run = ReleaseRun::new(TriggerKind::TagPush, Some("v2.1.0".to_string()), 42).unwrap();
        assert_eq!(run.version().value, "v2.1.0.42");
        assert_eq!(run.version().build_num, 42);
    }

    #[test]
    fn branch_push_is_always_latest() {
        let run = ReleaseRun::new(TriggerKind::BranchPush, Some("main".to_string()), 42).unwrap();
        assert_eq!(run.version().value, "latest");
    }

    #[test]
    fn manual_run_is_always_latest() {
        let run = ReleaseRun::new(TriggerKind::Manual, None, 9).unwrap();
        assert_eq!(run.version().value, "latest");
    }

    #[test]
    fn tag_push_requires_a_ref_name() {
        assert!(ReleaseRun::new(TriggerKind::TagPush, None, 1).is_err());
        assert!(ReleaseRun::new(TriggerKind::TagPush, Some(String::new()), 1).is_err());
    }

    #[test]
    fn unknown_ref_type_is_rejected() {
        let err = TriggerKind::from_ref_type(Some("schedule")).unwrap_err();
        assert!(err.to_string().contains("schedule"));
    }
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Every branch push resolves to `latest`, whatever the branch is
        /// called and whichever run number CI hands over.
        #[test]
        fn branch_pushes_never_produce_a_versioned_tag(
            branch in "[a-zA-Z0-9/_.-]{1,40}",
            run_number in 0u64..1_000_000,
        ) {
            let run = ReleaseRun::new(TriggerKind::BranchPush, Some(branch), run_number).unwrap();
            prop_assert_eq!(run.version().value, "latest");
        }

        /// A tag push always yields `<tag>.<run_number>` verbatim.
        #[test]
        fn tag_pushes_append_exactly_the_run_number(
            tag in "v[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}",
            run_number in 0u64..1_000_000,
        ) {
            let run =
                ReleaseRun::new(TriggerKind::TagPush, Some(tag.clone()), run_number).unwrap();
            prop_assert_eq!(run.version().value, format!("{tag}.{run_number}"));
            prop_assert_eq!(run.version().build_num, run_number);
        }

        /// Resolution is deterministic: the same inputs resolve the same
        /// version, however many times they are asked.
        #[test]
        fn resolution_is_deterministic(
            tag in "v[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}",
            run_number in 0u64..1_000_000,
        ) {
            let first =
                ReleaseRun::new(TriggerKind::TagPush, Some(tag.clone()), run_number).unwrap();
            let second =
                ReleaseRun::new(TriggerKind::TagPush, Some(tag), run_number).unwrap();
            prop_assert_eq!(first.version(), second.version());
        }
    }
}
