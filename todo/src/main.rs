//! Interactive to-do list.
//!
//! Reads commands from stdin and prints the list to stdout after each one.
//! Logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin todo
//! TODO_INPUT_FORMAT=json cargo run --bin todo < actions.jsonl
//! ```

use todo::{shell, Config, TodoEnvironment, TodoList, TodoReducer, TodoStore};
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_new(&config.log_filter)?)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!(
        id_strategy = ?config.id_strategy,
        input_format = ?config.input_format,
        "Configuration loaded"
    );

    let store: TodoStore = TodoStore::new(
        TodoList::new(),
        TodoReducer::new(),
        TodoEnvironment::new(config.id_strategy.build()),
    );

    let result = shell::run(
        &store,
        config.input_format,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await;

    tracing::info!("Shutting down");
    store.shutdown(config.shutdown_timeout).await?;

    result?;
    Ok(())
}
