//! Pure mutation operations over a task collection.
//!
//! Every function takes the current collection by reference and returns the
//! next one. None of them fail: an unknown id or blank text leaves the
//! collection as it was, same tasks in the same order.

use crate::task::{normalise_text, Task};

/// Append `task` after all existing tasks.
///
/// Id uniqueness is the caller's job; a task with blank text is ignored.
pub fn add_task(tasks: &[Task], task: Task) -> Vec<Task> {
    let mut next = tasks.to_vec();
    if let Some(text) = normalise_text(&task.text) {
        next.push(Task { text, ..task });
    }
    next
}

/// Flip `completed` on the task with `id`.
pub fn toggle_task(tasks: &[Task], id: u64) -> Vec<Task> {
    replace_matching(tasks, id, |t| Task {
        completed: !t.completed,
        ..t.clone()
    })
}

/// Replace the text of the task with `id`. Blank text is a no-op.
pub fn edit_task(tasks: &[Task], id: u64, new_text: &str) -> Vec<Task> {
    let Some(text) = normalise_text(new_text) else {
        return tasks.to_vec();
    };
    replace_matching(tasks, id, |t| Task {
        text: text.clone(),
        ..t.clone()
    })
}

/// Remove the task with `id`, keeping the order of the rest.
pub fn delete_task(tasks: &[Task], id: u64) -> Vec<Task> {
    tasks.iter().filter(|t| t.id != id).cloned().collect()
}

/// Replace the task sharing `updated.id` with `updated`, every field included.
pub fn update_task(tasks: &[Task], updated: &Task) -> Vec<Task> {
    let Some(text) = normalise_text(&updated.text) else {
        return tasks.to_vec();
    };
    replace_matching(tasks, updated.id, |_| Task {
        text: text.clone(),
        ..updated.clone()
    })
}

fn replace_matching(tasks: &[Task], id: u64, f: impl Fn(&Task) -> Task) -> Vec<Task> {
    tasks
        .iter()
        .map(|t| if t.id == id { f(t) } else { t.clone() })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use rstest::{fixture, rstest};

    fn task(id: u64, text: &str) -> Task {
        Task::new(id, text, None).unwrap()
    }

    fn ids(tasks: &[Task]) -> Vec<u64> {
        tasks.iter().map(|t| t.id).collect()
    }

    #[fixture]
    fn three() -> Vec<Task> {
        vec![task(1, "Buy milk"), task(2, "Walk dog"), task(3, "File taxes")]
    }

    #[test]
    fn test_toggle_marks_task_completed() {
        let tasks = vec![task(1, "Buy milk")];
        let toggled = toggle_task(&tasks, 1);
        assert_eq!(toggled.len(), 1);
        assert_eq!(toggled[0].id, 1);
        assert_eq!(toggled[0].text, "Buy milk");
        assert!(toggled[0].completed);
    }

    #[rstest]
    fn test_toggle_leaves_other_tasks_alone(three: Vec<Task>) {
        let toggled = toggle_task(&three, 2);
        assert_eq!(ids(&toggled), vec![1, 2, 3]);
        assert!(!toggled[0].completed);
        assert!(toggled[1].completed);
        assert!(!toggled[2].completed);
    }

    #[rstest]
    fn test_add_appends_last(three: Vec<Task>) {
        let added = add_task(&three, task(9, "Read book"));
        assert_eq!(ids(&added), vec![1, 2, 3, 9]);
    }

    #[rstest]
    fn test_add_ignores_blank_text(three: Vec<Task>) {
        let blank = Task {
            id: 9,
            text: "  ".into(),
            completed: false,
            deadline: None,
        };
        assert_eq!(add_task(&three, blank), three);
    }

    #[rstest]
    fn test_add_does_not_deduplicate_ids(three: Vec<Task>) {
        let added = add_task(&three, task(1, "Duplicate"));
        assert_eq!(ids(&added), vec![1, 2, 3, 1]);
    }

    #[rstest]
    fn test_edit_replaces_text_only(three: Vec<Task>) {
        let mut tasks = toggle_task(&three, 1);
        tasks[0].deadline = NaiveDate::from_ymd_opt(2025, 1, 10);
        let edited = edit_task(&tasks, 1, "  Buy oat milk ");
        assert_eq!(edited[0].text, "Buy oat milk");
        assert!(edited[0].completed);
        assert_eq!(edited[0].deadline, NaiveDate::from_ymd_opt(2025, 1, 10));
        assert_eq!(edited[1..], tasks[1..]);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn test_edit_with_blank_text_is_noop(three: Vec<Task>, #[case] text: &str) {
        assert_eq!(edit_task(&three, 1, text), three);
    }

    #[rstest]
    fn test_delete_preserves_order(three: Vec<Task>) {
        assert_eq!(ids(&delete_task(&three, 1)), vec![2, 3]);
        assert_eq!(ids(&delete_task(&three, 2)), vec![1, 3]);
    }

    #[rstest]
    fn test_update_replaces_every_field(three: Vec<Task>) {
        let updated = Task {
            id: 2,
            text: "Walk the dog twice".into(),
            completed: true,
            deadline: NaiveDate::from_ymd_opt(2025, 2, 1),
        };
        let next = update_task(&three, &updated);
        assert_eq!(next[1], updated);
        assert_eq!(next[0], three[0]);
        assert_eq!(next[2], three[2]);
    }

    #[rstest]
    fn test_update_can_clear_deadline(three: Vec<Task>) {
        let mut tasks = three;
        tasks[0].deadline = NaiveDate::from_ymd_opt(2025, 1, 10);
        let cleared = Task {
            deadline: None,
            ..tasks[0].clone()
        };
        assert_eq!(update_task(&tasks, &cleared)[0].deadline, None);
    }

    #[rstest]
    fn test_update_with_blank_text_is_noop(three: Vec<Task>) {
        let blank = Task {
            text: "".into(),
            completed: true,
            ..three[0].clone()
        };
        assert_eq!(update_task(&three, &blank), three);
    }

    fn arb_tasks() -> impl Strategy<Value = Vec<Task>> {
        prop::collection::btree_set(1u64..1_000, 0..12).prop_flat_map(|ids| {
            let ids: Vec<u64> = ids.into_iter().collect();
            let n = ids.len();
            (
                Just(ids),
                prop::collection::vec("[a-z]{1,8}", n),
                prop::collection::vec(any::<bool>(), n),
                prop::collection::vec(prop::option::of(0i64..400), n),
            )
                .prop_map(|(ids, texts, done, offsets)| {
                    let base = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
                    ids.into_iter()
                        .zip(texts)
                        .zip(done)
                        .zip(offsets)
                        .map(|(((id, text), completed), offset)| Task {
                            id,
                            text,
                            completed,
                            deadline: offset.map(|d| base + chrono::Duration::days(d)),
                        })
                        .collect()
                })
        })
    }

    proptest! {
        #[test]
        fn prop_unknown_id_is_noop(tasks in arb_tasks(), id in 1_000u64..2_000) {
            prop_assert_eq!(&toggle_task(&tasks, id), &tasks);
            prop_assert_eq!(&edit_task(&tasks, id, "changed"), &tasks);
            prop_assert_eq!(&delete_task(&tasks, id), &tasks);
            let stranger = Task { id, text: "x".into(), completed: true, deadline: None };
            prop_assert_eq!(&update_task(&tasks, &stranger), &tasks);
        }

        #[test]
        fn prop_double_toggle_is_identity(tasks in arb_tasks(), pick in any::<prop::sample::Index>()) {
            prop_assume!(!tasks.is_empty());
            let id = tasks[pick.index(tasks.len())].id;
            prop_assert_eq!(toggle_task(&toggle_task(&tasks, id), id), tasks);
        }

        #[test]
        fn prop_add_keeps_prior_order(tasks in arb_tasks(), text in "[a-z]{1,8}") {
            let added = add_task(&tasks, Task::new(5_000, &text, None).unwrap());
            prop_assert_eq!(&added[..tasks.len()], &tasks[..]);
            prop_assert_eq!(added.last().map(|t| t.id), Some(5_000));
        }

        #[test]
        fn prop_delete_then_readd_uses_fresh_id(tasks in arb_tasks(), pick in any::<prop::sample::Index>()) {
            prop_assume!(!tasks.is_empty());
            let victim = tasks[pick.index(tasks.len())].clone();
            let mut ids = crate::task::IdAllocator::seeded_from(&tasks);
            let remaining = delete_task(&tasks, victim.id);
            let readded = add_task(&remaining, Task { id: ids.next_id(), ..victim.clone() });
            prop_assert_eq!(readded.iter().filter(|t| t.id == victim.id).count(), 0);
        }
    }
}
