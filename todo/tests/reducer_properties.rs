//! Property tests for the to-do reducer.

#![allow(clippy::unwrap_used)]

use composable_todo_core::reducer::Reducer;
use composable_todo_testing::properties::{arb_distinct_ids, arb_name};
use proptest::collection::vec;
use proptest::prelude::*;
use std::collections::HashSet;
use todo::{TodoAction, TodoEnvironment, TodoId, TodoItem, TodoList, TodoReducer};

fn arb_list() -> impl Strategy<Value = TodoList> {
    arb_distinct_ids(8).prop_flat_map(|ids| {
        let len = ids.len();
        (Just(ids), vec(arb_name(), len), vec(any::<bool>(), len)).prop_map(
            |(ids, names, flags)| {
                TodoList::from_items(ids.into_iter().zip(names).zip(flags).map(
                    |((id, name), complete)| TodoItem {
                        id: TodoId::new(id),
                        name,
                        complete,
                    },
                ))
            },
        )
    })
}

fn arb_action() -> impl Strategy<Value = TodoAction> {
    prop_oneof![
        arb_name().prop_map(|name| TodoAction::Add { name }),
        (1..20_u64).prop_map(|id| TodoAction::Toggle { id: TodoId::new(id) }),
        (1..20_u64).prop_map(|id| TodoAction::Delete { id: TodoId::new(id) }),
        "[a-z-]{1,12}".prop_map(|kind| TodoAction::Unknown { kind }),
    ]
}

/// Picks the id of an item in the list, or an id that is absent
fn pick_id(list: &TodoList, index: usize) -> TodoId {
    if list.is_empty() {
        TodoId::new(0)
    } else {
        list.items()[index % list.len()].id
    }
}

fn absent_id(list: &TodoList) -> TodoId {
    let max = list.iter().map(|todo| todo.id.get()).max().unwrap_or(0);
    TodoId::new(max + 1)
}

proptest! {
    #[test]
    fn add_appends_one_incomplete_item(list in arb_list(), name in arb_name()) {
        let env = TodoEnvironment::default();
        let (next, effects) = TodoReducer::new().transition(&list, TodoAction::Add { name: name.clone() }, &env);

        prop_assert!(effects.is_empty());
        prop_assert_eq!(next.len(), list.len() + 1);
        prop_assert_eq!(&next.items()[..list.len()], list.items());

        let added = next.items().last().unwrap();
        prop_assert_eq!(&added.name, &name);
        prop_assert!(!added.complete);
        prop_assert!(!list.contains(added.id));
    }

    #[test]
    fn toggle_flips_exactly_one_item(list in arb_list(), index in any::<usize>()) {
        prop_assume!(!list.is_empty());
        let id = pick_id(&list, index);
        let env = TodoEnvironment::default();

        let (next, _) = TodoReducer::new().transition(&list, TodoAction::Toggle { id }, &env);

        prop_assert_eq!(next.len(), list.len());
        for (before, after) in list.iter().zip(next.iter()) {
            prop_assert_eq!(before.id, after.id);
            prop_assert_eq!(&before.name, &after.name);
            if before.id == id {
                prop_assert_eq!(after.complete, !before.complete);
            } else {
                prop_assert_eq!(after.complete, before.complete);
            }
        }
    }

    #[test]
    fn toggle_twice_restores_list(list in arb_list(), index in any::<usize>()) {
        let id = pick_id(&list, index);
        let reducer = TodoReducer::new();
        let env = TodoEnvironment::default();

        let (once, _) = reducer.transition(&list, TodoAction::Toggle { id }, &env);
        let (twice, _) = reducer.transition(&once, TodoAction::Toggle { id }, &env);

        prop_assert_eq!(twice, list);
    }

    #[test]
    fn delete_removes_exactly_one_item(list in arb_list(), index in any::<usize>()) {
        prop_assume!(!list.is_empty());
        let id = pick_id(&list, index);
        let env = TodoEnvironment::default();

        let (next, _) = TodoReducer::new().transition(&list, TodoAction::Delete { id }, &env);

        let expected: Vec<TodoItem> = list.iter().filter(|todo| todo.id != id).cloned().collect();
        prop_assert_eq!(next.items(), expected.as_slice());
    }

    #[test]
    fn delete_is_idempotent(list in arb_list(), index in any::<usize>()) {
        let id = pick_id(&list, index);
        let reducer = TodoReducer::new();
        let env = TodoEnvironment::default();

        let (once, _) = reducer.transition(&list, TodoAction::Delete { id }, &env);
        let (twice, _) = reducer.transition(&once, TodoAction::Delete { id }, &env);

        prop_assert_eq!(twice, once);
    }

    #[test]
    fn absent_ids_leave_list_unchanged(list in arb_list()) {
        let id = absent_id(&list);
        let reducer = TodoReducer::new();
        let env = TodoEnvironment::default();

        let (toggled, _) = reducer.transition(&list, TodoAction::Toggle { id }, &env);
        let (deleted, _) = reducer.transition(&list, TodoAction::Delete { id }, &env);

        prop_assert_eq!(&toggled, &list);
        prop_assert_eq!(&deleted, &list);
    }

    #[test]
    fn unknown_actions_are_identity(list in arb_list(), kind in "[a-z-]{1,12}") {
        let env = TodoEnvironment::default();
        let (next, effects) = TodoReducer::new().transition(&list, TodoAction::Unknown { kind }, &env);

        prop_assert!(effects.is_empty());
        prop_assert_eq!(next, list);
    }

    #[test]
    fn ids_stay_unique_across_any_sequence(
        list in arb_list(),
        actions in vec(arb_action(), 0..40),
    ) {
        let reducer = TodoReducer::new();
        let env = TodoEnvironment::default();
        let mut state = list;

        for action in actions {
            let effects = reducer.reduce(&mut state, action, &env);
            prop_assert!(effects.is_empty());

            let ids: HashSet<_> = state.iter().map(|todo| todo.id).collect();
            prop_assert_eq!(ids.len(), state.len());
        }
    }
}
