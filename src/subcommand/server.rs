use {
  super::*,
  axum::{
    Json, Router,
    extract::State,
    http::{Method, StatusCode},
    routing::get,
  },
  tokio::{net::TcpListener, runtime::Runtime, task},
  tower_http::cors::{Any, CorsLayer},
};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
  pub started: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct Server {
  #[arg(long, help = "Listen on <ADDRESS> for incoming requests. [default: 0.0.0.0]")]
  pub(crate) address: Option<String>,
  #[arg(long, help = "Listen on <HTTP_PORT> for incoming HTTP requests. [default: 8585]")]
  pub(crate) http_port: Option<u16>,
  #[arg(
    long,
    value_parser = humantime::parse_duration,
    help = "Also start an indexing pass every <POLLING_INTERVAL>."
  )]
  pub(crate) polling_interval: Option<Duration>,
}

impl Server {
  pub(crate) fn run(self, settings: Settings) -> SubcommandResult {
    let index = Arc::new(Index::open(&settings)?);

    Runtime::new()?.block_on(async {
      let address = self.address.as_deref().unwrap_or("0.0.0.0");
      let port = self.http_port.unwrap_or(8585);

      let listener = TcpListener::bind((address, port))
        .await
        .with_context(|| format!("failed to listen on {address}:{port}"))?;

      log::info!("Listening on http://{}", listener.local_addr()?);

      if let Some(polling_interval) = self.polling_interval {
        tokio::spawn(poll(index.clone(), polling_interval));
      }

      start_pass(&index);

      axum::serve(listener, router(index.clone()))
        .with_graceful_shutdown(shutdown())
        .await?;

      anyhow::Ok(())
    })?;

    while index.is_running() {
      thread::sleep(Duration::from_millis(50));
    }

    Ok(None)
  }
}

fn router(index: Arc<Index>) -> Router {
  Router::new()
    .route("/newblock", get(new_block))
    .route("/status", get(status))
    .layer(
      CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_origin(Any),
    )
    .with_state(index)
}

async fn new_block(State(index): State<Arc<Index>>) -> Json<Trigger> {
  log::info!("Received new block notification");

  Json(Trigger {
    started: start_pass(&index),
  })
}

async fn status(State(index): State<Arc<Index>>) -> Result<Json<Status>, (StatusCode, String)> {
  task::block_in_place(|| index.status())
    .map(Json)
    .map_err(|err| (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))
}

async fn poll(index: Arc<Index>, polling_interval: Duration) {
  let mut interval = tokio::time::interval(polling_interval);

  loop {
    interval.tick().await;

    if shutting_down() {
      break;
    }

    start_pass(&index);
  }
}

async fn shutdown() {
  while !shutting_down() {
    tokio::time::sleep(Duration::from_millis(100)).await;
  }
}

/// Start a pass on a background thread. Returns false if one is already running.
fn start_pass(index: &Arc<Index>) -> bool {
  let Some(guard) = index.begin_pass() else {
    log::info!("Indexing pass already running");
    return false;
  };

  let index = index.clone();

  thread::spawn(move || {
    let Err(err) = index.run_pass(guard, false) else {
      return;
    };

    let err = SnafuError::from(err);

    if err.is_fatal() {
      log::error!("Shutting down, index may not be extended after: {err}");
      process::exit(1);
    }

    log::warn!("Indexing pass failed, will resume on next notification: {err}");
  });

  true
}
