//! Line-oriented shell around a to-do [`Store`](composable_todo_runtime::Store).
//!
//! The shell holds no state of its own: it turns input lines into actions,
//! dispatches them and renders whatever list the store holds afterwards.
//!
//! Text input:
//!
//! | Line              | Effect                                   |
//! |-------------------|------------------------------------------|
//! | `buy milk`        | add an item named `buy milk`             |
//! | *(empty)*         | add an item with an empty name           |
//! | `//etc`           | add an item named `/etc`                 |
//! | `/toggle 3`       | toggle item 3                            |
//! | `/delete 3`       | delete item 3                            |
//! | `/list`           | render the list without changing it      |
//! | `/quit`, `/exit`  | stop reading                             |
//! | `/anything-else`  | dispatched as an unknown action (no-op)  |
//!
//! JSON input: one wire envelope per line (see [`crate::wire`]); blank lines
//! are skipped and the list is printed as a JSON array after each action.

use crate::config::InputFormat;
use crate::types::{TodoAction, TodoId, TodoList};
use crate::wire::{self, WireError};
use crate::TodoStore;
use composable_todo_runtime::StoreError;
use std::fmt::Write as _;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// A parsed input line
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Send this action to the store
    Dispatch(TodoAction),
    /// Render the current list
    List,
    /// Stop the shell
    Quit,
}

/// Errors in a text command line
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The command needs an item id and none was given
    #[error("/{command} needs an item id")]
    MissingId {
        /// Command name without the slash
        command: String,
    },

    /// The argument is not a valid item id
    #[error("/{command}: {value:?} is not an item id")]
    InvalidId {
        /// Command name without the slash
        command: String,
        /// The rejected argument
        value: String,
    },
}

/// Why a single input line could not be turned into a command
///
/// These are reported and the shell moves on to the next line.
#[derive(Error, Debug)]
pub enum LineError {
    /// Bad text command
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Bad JSON envelope
    #[error(transparent)]
    Wire(#[from] WireError),

    /// The line's bytes are not UTF-8
    #[error("input line is not valid UTF-8: {0}")]
    NotUtf8(#[from] std::str::Utf8Error),
}

/// Errors that stop the shell
#[derive(Error, Debug)]
pub enum ShellError {
    /// Reading input or writing output failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The store refused an action
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The list could not be encoded
    #[error(transparent)]
    Wire(#[from] WireError),
}

/// Parse one line of text input
///
/// # Errors
///
/// Returns [`CommandError`] for `/toggle` and `/delete` without a valid id.
pub fn parse_text_command(line: &str) -> Result<Command, CommandError> {
    if let Some(escaped) = line.strip_prefix("//") {
        return Ok(Command::Dispatch(TodoAction::Add {
            name: format!("/{escaped}"),
        }));
    }

    let Some(body) = line.strip_prefix('/') else {
        return Ok(Command::Dispatch(TodoAction::Add {
            name: line.to_string(),
        }));
    };

    let (word, argument) = body
        .split_once(char::is_whitespace)
        .unwrap_or((body, ""));

    match word {
        "toggle" => parse_id(word, argument).map(|id| Command::Dispatch(TodoAction::Toggle { id })),
        "delete" => parse_id(word, argument).map(|id| Command::Dispatch(TodoAction::Delete { id })),
        "list" => Ok(Command::List),
        "quit" | "exit" => Ok(Command::Quit),
        other => Ok(Command::Dispatch(TodoAction::Unknown {
            kind: other.to_string(),
        })),
    }
}

fn parse_id(command: &str, argument: &str) -> Result<TodoId, CommandError> {
    let argument = argument.trim();
    if argument.is_empty() {
        return Err(CommandError::MissingId {
            command: command.to_string(),
        });
    }
    argument.parse().map_err(|_| CommandError::InvalidId {
        command: command.to_string(),
        value: argument.to_string(),
    })
}

/// Parse one input line in the given format
///
/// Returns `Ok(None)` for lines the format ignores (blank JSON lines).
///
/// # Errors
///
/// Returns [`LineError`] if the line is not a valid command or envelope.
pub fn parse_line(format: InputFormat, line: &str) -> Result<Option<Command>, LineError> {
    match format {
        InputFormat::Text => Ok(Some(parse_text_command(line)?)),
        InputFormat::Json if line.trim().is_empty() => Ok(None),
        InputFormat::Json => Ok(Some(Command::Dispatch(wire::decode_action(line)?))),
    }
}

/// Render the list as human-readable lines
#[must_use]
pub fn render_text(list: &TodoList) -> String {
    if list.is_empty() {
        return "(no todos)\n".to_string();
    }

    let mut out = String::new();
    for todo in list {
        let mark = if todo.complete { 'x' } else { ' ' };
        let _ = writeln!(out, "[{mark}] {}: {}", todo.id, todo.name);
    }
    let _ = writeln!(out, "-- {}/{} complete", list.completed_count(), list.len());
    out
}

/// Read lines from `input` until EOF or a quit command, dispatching each into
/// `store` and writing the rendered list to `output`
///
/// Each dispatch is logged at `info` with the list size it produced.
///
/// # Errors
///
/// Returns [`ShellError`] on I/O failure or if the store stops accepting
/// actions. Malformed lines are reported on `output` and skipped.
pub async fn run<I, O>(
    store: &TodoStore,
    format: InputFormat,
    mut input: I,
    mut output: O,
) -> Result<(), ShellError>
where
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let raw = buf.strip_suffix(b"\n").unwrap_or(&buf);
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);

        let parsed = std::str::from_utf8(raw)
            .map_err(LineError::from)
            .and_then(|line| parse_line(format, line));
        let command = match parsed {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(error) => {
                tracing::warn!(%error, "Skipping input line");
                write_error(&mut output, format, &error.to_string()).await?;
                continue;
            },
        };

        match command {
            Command::Quit => break,
            Command::List => {},
            Command::Dispatch(action) => {
                if let TodoAction::Unknown { kind } = &action {
                    if format == InputFormat::Text {
                        write_error(&mut output, format, &format!("unknown command: /{kind}"))
                            .await?;
                    }
                }
                let kind = action.kind();
                let (len, completed) = store
                    .send_and_inspect(action, |list| (list.len(), list.completed_count()))
                    .await?;
                tracing::info!(kind, len, completed, "Dispatched");
            },
        }

        let rendered = match format {
            InputFormat::Text => store.state(render_text).await,
            InputFormat::Json => {
                let mut encoded = store.state(wire::encode_list).await?;
                encoded.push('\n');
                encoded
            },
        };
        output.write_all(rendered.as_bytes()).await?;
        output.flush().await?;
    }

    output.flush().await?;
    Ok(())
}

async fn write_error<O>(output: &mut O, format: InputFormat, message: &str) -> Result<(), ShellError>
where
    O: AsyncWrite + Unpin,
{
    let line = match format {
        InputFormat::Text => format!("error: {message}\n"),
        InputFormat::Json => format!("{}\n", serde_json::json!({ "error": message })),
    };
    output.write_all(line.as_bytes()).await?;
    Ok(())
}
