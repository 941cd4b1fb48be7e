//! The copy-decision predicate.

use tracing::debug;

use crate::types::{Approval, ChangeKind, LabelType, PatchSetId};

/// Decide whether a candidate approval from the preceding patch set may be
/// copied forward to `target`.
///
/// Rules are evaluated in a fixed priority order; the first rule that
/// fires decides and the rest are skipped:
///
/// 1. no policy (label removed from the project) — never copy
/// 2. `copy_min_score` and the vote is the minimum permitted value
/// 3. `copy_max_score` and the vote is the maximum permitted value
/// 4. `copy_any_score`
/// 5. the value is in the label's explicit `copy_values` set
/// 6. `copy_all_scores_if_list_of_files_did_not_change` and the file lists
///    of the two revisions are equal (`files_unchanged` is `None` when no
///    candidate in the batch has needed the diffs yet)
/// 7. dispatch on the change kind; a rework never copies on kind alone
///
/// The candidate must originate on a different patch set than `target`;
/// direct votes on the target are seeded into the result before any
/// candidate is evaluated and are never displaced.
pub fn can_copy(
    label_type: Option<&LabelType>,
    approval: &Approval,
    target: PatchSetId,
    kind: ChangeKind,
    files_unchanged: Option<bool>,
) -> bool {
    debug_assert_ne!(approval.patch_set, target);

    let Some(label_type) = label_type else {
        debug!(
            label = %approval.label,
            value = approval.value,
            from = %approval.patch_set,
            to = %target,
            "not copying: label no longer configured on project"
        );
        return false;
    };

    if label_type.copy_min_score && label_type.is_min(approval.value) {
        debug!(
            label = %approval.label,
            value = approval.value,
            from = %approval.patch_set,
            to = %target,
            "copying veto vote: copy_min_score is set"
        );
        return true;
    }
    if label_type.copy_max_score && label_type.is_max(approval.value) {
        debug!(
            label = %approval.label,
            value = approval.value,
            from = %approval.patch_set,
            to = %target,
            "copying max vote: copy_max_score is set"
        );
        return true;
    }
    if label_type.copy_any_score {
        debug!(
            label = %approval.label,
            value = approval.value,
            from = %approval.patch_set,
            to = %target,
            "copying vote: copy_any_score is set"
        );
        return true;
    }
    if label_type.copy_values.contains(&approval.value) {
        debug!(
            label = %approval.label,
            value = approval.value,
            from = %approval.patch_set,
            to = %target,
            "copying vote: value is in copy_values"
        );
        return true;
    }
    if label_type.copy_all_scores_if_list_of_files_did_not_change && files_unchanged == Some(true) {
        debug!(
            label = %approval.label,
            value = approval.value,
            from = %approval.patch_set,
            to = %target,
            "copying vote: file list did not change"
        );
        return true;
    }

    let copy = match kind {
        ChangeKind::MergeFirstParentUpdate => {
            label_type.copy_all_scores_on_merge_first_parent_update
        }
        ChangeKind::NoCodeChange => label_type.copy_all_scores_if_no_code_change,
        ChangeKind::TrivialRebase => label_type.copy_all_scores_on_trivial_rebase,
        // Any of the four kind flags permits the copy when nothing
        // changed at all.
        ChangeKind::NoChange => {
            label_type.copy_all_scores_if_no_change
                || label_type.copy_all_scores_on_trivial_rebase
                || label_type.copy_all_scores_on_merge_first_parent_update
                || label_type.copy_all_scores_if_no_code_change
        }
        ChangeKind::Rework => false,
    };
    debug!(
        label = %approval.label,
        value = approval.value,
        from = %approval.patch_set,
        to = %target,
        %kind,
        copy,
        "kind-based copy decision"
    );
    copy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AccountId, LabelName};
    use chrono::{TimeZone, Utc};

    fn approval(value: i16) -> Approval {
        Approval::new(
            LabelName::new("Code-Review").unwrap(),
            AccountId::new(1),
            value,
            PatchSetId::new(1),
            Utc.timestamp_opt(0, 0).unwrap(),
        )
    }

    fn target() -> PatchSetId {
        PatchSetId::new(2)
    }

    #[test]
    fn test_absent_policy_never_copies() {
        assert!(!can_copy(
            None,
            &approval(-2),
            target(),
            ChangeKind::NoChange,
            Some(true)
        ));
    }

    #[test]
    fn test_copy_min_score_only_for_minimum() {
        let mut lt = LabelType::new(-2, 2);
        lt.copy_min_score = true;
        assert!(can_copy(
            Some(&lt),
            &approval(-2),
            target(),
            ChangeKind::Rework,
            None
        ));
        assert!(!can_copy(
            Some(&lt),
            &approval(-1),
            target(),
            ChangeKind::Rework,
            None
        ));
    }

    #[test]
    fn test_copy_max_score_only_for_maximum() {
        let mut lt = LabelType::new(-2, 2);
        lt.copy_max_score = true;
        assert!(can_copy(
            Some(&lt),
            &approval(2),
            target(),
            ChangeKind::Rework,
            None
        ));
        assert!(!can_copy(
            Some(&lt),
            &approval(1),
            target(),
            ChangeKind::Rework,
            None
        ));
    }

    #[test]
    fn test_copy_any_score_copies_everything() {
        let mut lt = LabelType::new(-2, 2);
        lt.copy_any_score = true;
        for value in [-2, -1, 0, 1, 2] {
            assert!(can_copy(
                Some(&lt),
                &approval(value),
                target(),
                ChangeKind::Rework,
                None
            ));
        }
    }

    #[test]
    fn test_copy_values_membership() {
        let mut lt = LabelType::new(-2, 2);
        lt.copy_values.insert(1);
        assert!(can_copy(
            Some(&lt),
            &approval(1),
            target(),
            ChangeKind::Rework,
            None
        ));
        assert!(!can_copy(
            Some(&lt),
            &approval(2),
            target(),
            ChangeKind::Rework,
            None
        ));
    }

    #[test]
    fn test_file_list_rule_requires_equal_lists() {
        let mut lt = LabelType::new(-2, 2);
        lt.copy_all_scores_if_list_of_files_did_not_change = true;
        assert!(can_copy(
            Some(&lt),
            &approval(1),
            target(),
            ChangeKind::Rework,
            Some(true)
        ));
        assert!(!can_copy(
            Some(&lt),
            &approval(1),
            target(),
            ChangeKind::Rework,
            Some(false)
        ));
    }

    #[test]
    fn test_kind_dispatch() {
        let mut lt = LabelType::new(-2, 2);
        lt.copy_all_scores_on_trivial_rebase = true;
        assert!(can_copy(
            Some(&lt),
            &approval(1),
            target(),
            ChangeKind::TrivialRebase,
            None
        ));
        assert!(!can_copy(
            Some(&lt),
            &approval(1),
            target(),
            ChangeKind::NoCodeChange,
            None
        ));
        assert!(!can_copy(
            Some(&lt),
            &approval(1),
            target(),
            ChangeKind::MergeFirstParentUpdate,
            None
        ));
    }

    #[test]
    fn test_no_change_accepts_any_of_the_four_flags() {
        for set_flag in 0..4 {
            let mut lt = LabelType::new(-2, 2);
            match set_flag {
                0 => lt.copy_all_scores_if_no_change = true,
                1 => lt.copy_all_scores_on_trivial_rebase = true,
                2 => lt.copy_all_scores_on_merge_first_parent_update = true,
                _ => lt.copy_all_scores_if_no_code_change = true,
            }
            assert!(
                can_copy(
                    Some(&lt),
                    &approval(1),
                    target(),
                    ChangeKind::NoChange,
                    None
                ),
                "flag {set_flag} should permit copy on no_change"
            );
        }
        let lt = LabelType::new(-2, 2);
        assert!(!can_copy(
            Some(&lt),
            &approval(1),
            target(),
            ChangeKind::NoChange,
            None
        ));
    }

    #[test]
    fn test_rework_never_copies_on_kind_alone() {
        let mut lt = LabelType::new(-2, 2);
        lt.copy_all_scores_if_no_change = true;
        lt.copy_all_scores_on_trivial_rebase = true;
        lt.copy_all_scores_if_no_code_change = true;
        lt.copy_all_scores_on_merge_first_parent_update = true;
        assert!(!can_copy(
            Some(&lt),
            &approval(1),
            target(),
            ChangeKind::Rework,
            None
        ));
    }

    #[test]
    fn test_min_score_wins_before_file_list_rule() {
        // Rule 2 fires before rule 6, so the diff outcome is irrelevant
        // for a veto vote.
        let mut lt = LabelType::new(-2, 2);
        lt.copy_min_score = true;
        lt.copy_all_scores_if_list_of_files_did_not_change = true;
        assert!(can_copy(
            Some(&lt),
            &approval(-2),
            target(),
            ChangeKind::Rework,
            Some(false)
        ));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn any_kind() -> impl Strategy<Value = ChangeKind> {
            prop_oneof![
                Just(ChangeKind::Rework),
                Just(ChangeKind::TrivialRebase),
                Just(ChangeKind::NoCodeChange),
                Just(ChangeKind::NoChange),
                Just(ChangeKind::MergeFirstParentUpdate),
            ]
        }

        proptest! {
            #[test]
            fn copy_any_score_always_copies(
                value in -2i16..=2,
                kind in any_kind(),
                files in proptest::option::of(any::<bool>()),
            ) {
                let mut lt = LabelType::new(-2, 2);
                lt.copy_any_score = true;
                prop_assert!(can_copy(Some(&lt), &approval(value), target(), kind, files));
            }

            #[test]
            fn bare_policy_copies_nothing_on_rework(
                value in -2i16..=2,
                files in proptest::option::of(any::<bool>()),
            ) {
                let lt = LabelType::new(-2, 2);
                prop_assert!(!can_copy(
                    Some(&lt),
                    &approval(value),
                    target(),
                    ChangeKind::Rework,
                    files
                ));
            }

            #[test]
            fn copy_values_membership_decides_for_rework(
                value in -2i16..=2,
                copied in proptest::collection::btree_set(-2i16..=2, 0..4),
            ) {
                let mut lt = LabelType::new(-2, 2);
                lt.copy_values = copied.clone();
                let got = can_copy(
                    Some(&lt),
                    &approval(value),
                    target(),
                    ChangeKind::Rework,
                    None,
                );
                prop_assert_eq!(got, copied.contains(&value));
            }
        }
    }
}
