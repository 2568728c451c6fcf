//! End-to-end tests: input lines through the shell into a live store.

#![allow(clippy::unwrap_used)]

use composable_todo_core::reducer::Reducer;
use composable_todo_testing::ScriptedIdGenerator;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use todo::{
    shell, InputFormat, TodoAction, TodoEnvironment, TodoId, TodoList, TodoReducer, TodoStore,
};

fn store() -> TodoStore {
    TodoStore::new(TodoList::new(), TodoReducer::new(), TodoEnvironment::default())
}

async fn run_text(store: &TodoStore, input: &str) -> String {
    let mut output = Vec::new();
    shell::run(store, InputFormat::Text, input.as_bytes(), &mut output)
        .await
        .unwrap();
    String::from_utf8(output).unwrap()
}

#[tokio::test]
async fn test_store_dispatch_lifecycle() {
    let store = store();

    store
        .send(TodoAction::Add {
            name: "buy milk".to_string(),
        })
        .await
        .unwrap();
    let id = store.state(|list| list.items()[0].id).await;

    store.send(TodoAction::Toggle { id }).await.unwrap();
    assert_eq!(store.state(TodoList::completed_count).await, 1);

    store.send(TodoAction::Delete { id }).await.unwrap();
    assert!(store.state(TodoList::is_empty).await);

    store.shutdown(Duration::from_secs(1)).await.unwrap();
}

#[tokio::test]
async fn test_store_matches_direct_reduction() {
    let actions = [
        TodoAction::Add { name: "a".to_string() },
        TodoAction::Add { name: "b".to_string() },
        TodoAction::Toggle { id: TodoId::new(2) },
        TodoAction::Unknown { kind: "noop".to_string() },
        TodoAction::Delete { id: TodoId::new(1) },
    ];

    let store = store();
    for action in actions.clone() {
        store.send(action).await.unwrap();
    }

    let reducer = TodoReducer::new();
    let env = TodoEnvironment::default();
    let mut direct = TodoList::new();
    for action in actions {
        reducer.reduce(&mut direct, action, &env);
    }

    assert_eq!(store.state(Clone::clone).await, direct);
}

#[tokio::test]
async fn test_text_session_renders_after_each_line() {
    let store = store();
    let output = run_text(&store, "buy milk\nwalk dog\n/toggle 1\n/delete 2\n").await;

    assert_eq!(
        output,
        "[ ] 1: buy milk\n-- 0/1 complete\n\
         [ ] 1: buy milk\n[ ] 2: walk dog\n-- 0/2 complete\n\
         [x] 1: buy milk\n[ ] 2: walk dog\n-- 1/2 complete\n\
         [x] 1: buy milk\n-- 1/1 complete\n"
    );
}

#[tokio::test]
async fn test_text_session_reports_bad_lines_and_continues() {
    let store = store();
    let output = run_text(&store, "/toggle\n/delete x\n/frobnicate\na\n").await;

    let lines: Vec<_> = output.lines().collect();
    assert_eq!(
        lines,
        [
            "error: /toggle needs an item id",
            "error: /delete: \"x\" is not an item id",
            "error: unknown command: /frobnicate",
            "(no todos)",
            "[ ] 1: a",
            "-- 0/1 complete",
        ]
    );
}

#[tokio::test]
async fn test_non_utf8_line_is_reported_and_skipped() {
    let store = store();
    let mut output = Vec::new();

    shell::run(&store, InputFormat::Text, &b"a\n\xff\xfe\nb\n"[..], &mut output)
        .await
        .unwrap();

    let output = String::from_utf8(output).unwrap();
    assert!(output.contains("error: input line is not valid UTF-8"));
    let names: Vec<_> = store
        .state(|list| list.iter().map(|todo| todo.name.clone()).collect())
        .await;
    assert_eq!(names, ["a", "b"]);
}

#[tokio::test]
async fn test_crlf_line_endings_are_stripped() {
    let store = store();
    run_text(&store, "buy milk\r\n/toggle 1\r\n").await;

    let list = store.state(Clone::clone).await;
    assert_eq!(list.items()[0].name, "buy milk");
    assert!(list.items()[0].complete);
}

/// Collects formatted log output
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_dispatch_log_reports_length_after_each_action() {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer({
            let logs = logs.clone();
            move || logs.clone()
        })
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let store = store();
    run_text(&store, "a\nb\n/toggle 1\nc\n").await;

    let logs = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    let dispatched: Vec<_> = logs.lines().filter(|line| line.contains("Dispatched")).collect();
    assert_eq!(dispatched.len(), 4);

    let expected = [
        ("add-todo", 1, 0),
        ("add-todo", 2, 0),
        ("toggle-todo", 2, 1),
        ("add-todo", 3, 1),
    ];
    for (line, (kind, len, completed)) in dispatched.iter().zip(expected) {
        assert!(line.contains(&format!("kind=\"{kind}\"")), "{line}");
        assert!(line.contains(&format!("len={len} ")), "{line}");
        assert!(line.contains(&format!("completed={completed}")), "{line}");
    }
}

#[tokio::test]
async fn test_quit_stops_reading() {
    let store = store();
    let output = run_text(&store, "a\n/quit\nb\n").await;

    assert!(!output.contains("b"));
    assert_eq!(store.state(TodoList::len).await, 1);
}

#[tokio::test]
async fn test_missing_ids_leave_list_alone() {
    let store = store();
    run_text(&store, "a\n/toggle 42\n/delete 42\n").await;

    let list = store.state(Clone::clone).await;
    assert_eq!(list.len(), 1);
    assert!(!list.items()[0].complete);
}

#[tokio::test]
async fn test_json_session_prints_list_arrays() {
    let store = TodoStore::new(
        TodoList::new(),
        TodoReducer::new(),
        TodoEnvironment::new(Arc::new(ScriptedIdGenerator::new([10, 20]))),
    );
    let input = concat!(
        r#"{"type":"add-todo","payload":{"name":"buy milk"}}"#,
        "\n\n",
        r#"{"type":"add-todo","payload":{"name":""}}"#,
        "\n",
        r#"{"type":"toggle-todo","payload":{"id":20}}"#,
        "\n",
        "not json\n",
        r#"{"type":"clear-all"}"#,
        "\n",
        r#"{"type":"delete-todo","payload":{"id":10}}"#,
        "\n",
    );

    let mut output = Vec::new();
    shell::run(&store, InputFormat::Json, input.as_bytes(), &mut output)
        .await
        .unwrap();
    let output = String::from_utf8(output).unwrap();
    let lines: Vec<_> = output.lines().collect();

    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0], r#"[{"id":10,"name":"buy milk","complete":false}]"#);
    assert_eq!(
        lines[2],
        r#"[{"id":10,"name":"buy milk","complete":false},{"id":20,"name":"","complete":true}]"#
    );
    assert!(lines[3].starts_with(r#"{"error":"#));
    assert_eq!(lines[4], lines[2]);
    assert_eq!(lines[5], r#"[{"id":20,"name":"","complete":true}]"#);
}

#[tokio::test]
async fn test_every_dispatch_is_broadcast_in_order() {
    let store = store();
    let mut actions = store.subscribe_actions();

    run_text(&store, "a\n/list\n/toggle 1\n/nope\n").await;

    let mut kinds = Vec::new();
    while let Ok(action) = actions.try_recv() {
        kinds.push(action.kind());
    }
    assert_eq!(kinds, ["add-todo", "toggle-todo", "unknown"]);
}

#[tokio::test]
async fn test_shell_errors_after_shutdown() {
    let store = store();
    store.shutdown(Duration::from_millis(100)).await.unwrap();

    let mut output = Vec::new();
    let result = shell::run(&store, InputFormat::Text, "a\n".as_bytes(), &mut output).await;

    assert!(matches!(result, Err(shell::ShellError::Store(_))));
    assert_eq!(
        store.state(|list| list.get(TodoId::new(1)).cloned()).await,
        None
    );
}
