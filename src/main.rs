//! Demo server for the pipe algebra.
//!
//! ```text
//! GET  /                 → 200 "Hello World!"
//! GET  /users/:id        → 200 "user <id>"
//! POST /echo             → 200 with the request body
//! GET  /search?q=...     → 200 listing the query values
//! *                      → 404
//! ```
//!
//! Configuration is read from the TOML file named by `HTTP_PIPES_CONFIG`,
//! or defaults when the variable is unset.

use std::path::PathBuf;

use http_pipes::config::{load_config, ServerConfig};
use http_pipes::lifecycle::shutdown_on_signal;
use http_pipes::observability::init_logging;
use http_pipes::{
    choose, get, not_found, ok, path, post, query_param, serve_pipe, text, BoxPipe, FieldValue, PatternError, PipeExt,
    Shutdown,
};

fn app() -> Result<BoxPipe, PatternError> {
    let search = query_param("q", |terms: Option<FieldValue>| match terms {
        Some(terms) => ok().body(terms.into_vec().join(",")),
        None => ok().body("nothing to search for"),
    })
    .boxed();

    Ok(choose![
        get(path("/", |_| ok().body("Hello World!"))?),
        get(path("/users/:id", |params| ok().body(format!("user {}", params["id"])))?),
        post(path("/echo", |_| text(|body| ok().body(body)))?),
        get(path("/search", move |_| search.clone())?),
        not_found(),
    ]
    .boxed())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::var_os("HTTP_PIPES_CONFIG") {
        Some(path) => load_config(&PathBuf::from(path))?,
        None => ServerConfig::default(),
    };

    init_logging(&config.observability)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        body_bytes = config.limits.body_bytes,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    tokio::spawn(shutdown_on_signal(shutdown.clone()));

    serve_pipe(app()?, &config, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
