use std::collections::HashSet;
use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use reqwest::Url;
use serde::Serialize;
use time::{OffsetDateTime, UtcOffset};
use tokio::net::TcpListener;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use routine_client::replica::Replica;
use routine_client::store::StoreClient;
use routine_engine::admin::{remove_many, suggestions, Record};
use routine_engine::model::{CollectionKey, DayFilter};
use routine_engine::seed::{SCHEDULE, SUBJECTS, TEACHERS};
use routine_engine::{weekday_name, Filters, ALL_DEPARTMENTS};
use routine_store::Store;

use crate::ascii::render;

mod ascii;

#[derive(Parser)]
#[command(author, version, about, long_about)]
struct Args {
  #[arg(long, env = "ROUTINE_MIND_SENTRY_DSN", global = true)]
  sentry_dsn: Option<String>,
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the key-value store behind /api/data and /api/update.
  Serve {
    #[arg(long, short, env = "ROUTINE_MIND_LISTEN", default_value = "0.0.0.0:8787")]
    listen: SocketAddr,
    #[arg(long, short, env = "ROUTINE_MIND_TOKEN")]
    token: String,
    /// Keep collections as json files in this directory instead of memory only.
    #[arg(long, short, env = "ROUTINE_MIND_DATA_DIR")]
    data_dir: Option<PathBuf>,
    /// Fill empty collections with the demo routine.
    #[arg(long)]
    seed: bool,
  },
  /// Print the routine once.
  Show(View),
  /// Keep printing the routine as classes start and end.
  Watch {
    #[command(flatten)]
    view: View,
    #[arg(long, default_value_t = 2)]
    interval_secs: u64,
    /// Fetch the store again every this many ticks.
    #[arg(long, default_value_t = 30)]
    refresh_ticks: u64,
  },
  /// Delete records from a collection.
  Remove {
    #[arg(long, short, env = "ROUTINE_MIND_URL", default_value = "http://localhost:8787/")]
    url: Url,
    #[arg(long, short, env = "ROUTINE_MIND_TOKEN")]
    token: String,
    #[arg(long, short)]
    key: CollectionKey,
    #[arg(long = "id", required = true)]
    ids: Vec<String>,
  },
  /// Print search keyword suggestions.
  Suggest {
    #[arg(long, short, env = "ROUTINE_MIND_URL", default_value = "http://localhost:8787/")]
    url: Url,
    query: String,
  },
}

#[derive(clap::Args)]
struct View {
  #[arg(long, short, env = "ROUTINE_MIND_URL", default_value = "http://localhost:8787/")]
  url: Url,
  /// A weekday or `All`. Defaults to today.
  #[arg(long)]
  day: Option<DayFilter>,
  #[arg(long, default_value = ALL_DEPARTMENTS)]
  department: String,
  #[arg(long, short, default_value = "")]
  search: String,
}

impl View {
  fn filters(&self, now: OffsetDateTime) -> Filters {
    Filters {
      day: self
        .day
        .unwrap_or_else(|| DayFilter::Day(weekday_name(now))),
      department: self.department.clone(),
      search: self.search.clone(),
    }
  }
}

fn main() -> anyhow::Result<()> {
  let offset = routine_engine::local_offset();
  let args = Args::parse();

  let _sentry = args.sentry_dsn.as_deref().map(|dsn| {
    sentry::init((
      dsn,
      sentry::ClientOptions {
        release: sentry::release_name!(),
        ..Default::default()
      },
    ))
  });

  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
    .with(tracing_subscriber::fmt::layer())
    .with(sentry_tracing::layer())
    .init();

  tokio::runtime::Builder::new_multi_thread()
    .enable_all()
    .build()?
    .block_on(run(args.command, offset))
}

async fn run(command: Command, offset: UtcOffset) -> anyhow::Result<()> {
  match command {
    Command::Serve {
      listen,
      token,
      data_dir,
      seed,
    } => serve(listen, &token, data_dir, seed).await,
    Command::Show(view) => {
      let dataset = StoreClient::new(view.url.clone(), None)?.read_all().await?;
      let now = routine_engine::now(offset);
      print!("{}", render(&dataset, now, &view.filters(now)));
      Ok(())
    }
    Command::Watch {
      view,
      interval_secs,
      refresh_ticks,
    } => watch(view, offset, interval_secs, refresh_ticks, shutdown_signal()).await,
    Command::Remove {
      url,
      token,
      key,
      ids,
    } => remove(url, token, key, ids).await,
    Command::Suggest { url, query } => {
      let dataset = StoreClient::new(url, None)?.read_all().await?;
      for suggestion in suggestions(&dataset.teachers, &dataset.subjects, &query) {
        println!("{suggestion}");
      }
      Ok(())
    }
  }
}

async fn serve(
  listen: SocketAddr,
  token: &str,
  data_dir: Option<PathBuf>,
  seed: bool,
) -> anyhow::Result<()> {
  let store = match data_dir {
    Some(data_dir) => Store::open(data_dir).await?,
    None => Store::in_memory(),
  };

  if seed {
    store
      .seed(CollectionKey::Teachers, serde_json::to_value(&*TEACHERS)?)
      .await?;
    store
      .seed(CollectionKey::Subjects, serde_json::to_value(&*SUBJECTS)?)
      .await?;
    store
      .seed(CollectionKey::Schedule, serde_json::to_value(&*SCHEDULE)?)
      .await?;
  }

  let app = routine_store::router(Arc::new(store), token);
  let listener = TcpListener::bind(listen).await?;
  info!("Listening on {}", listener.local_addr()?);

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;

  info!("Store stopped");
  Ok(())
}

async fn watch(
  view: View,
  offset: UtcOffset,
  interval_secs: u64,
  refresh_ticks: u64,
  shutdown: impl Future<Output = ()>,
) -> anyhow::Result<()> {
  let replica = Replica::new(StoreClient::new(view.url.clone(), None)?);

  let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
  interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

  let mut tick = 0u64;
  let mut last = None;

  tokio::pin!(shutdown);

  loop {
    let step = async {
      interval.tick().await;

      if tick % refresh_ticks.max(1) == 0 {
        match replica.update().await {
          Err(err) => {
            error!("Error fetching routine: {:#}", err);
            sentry::integrations::anyhow::capture_anyhow(&err);
          }
          Ok(true) => info!("Routine changed"),
          Ok(false) => {}
        }
      }
      tick += 1;

      if let Some(data) = replica.data().await.as_ref() {
        let now = routine_engine::now(offset);
        let text = render(&data.dataset, now, &view.filters(now));

        if last.as_ref() != Some(&text) {
          println!("{text}");
          last = Some(text);
        }
      }
    };

    tokio::select! {
      _ = &mut shutdown => {
        info!("Stopping watch");
        return Ok(());
      }
      _ = step => {}
    }
  }
}

async fn shutdown_signal() {
  if let Err(err) = tokio::signal::ctrl_c().await {
    error!("Unable to listen for shutdown signal: {}", err);
  }
}

async fn remove(
  url: Url,
  token: String,
  key: CollectionKey,
  ids: Vec<String>,
) -> anyhow::Result<()> {
  let client = StoreClient::new(url, Some(token))?;
  let dataset = client.read_all().await?;
  let ids = ids.into_iter().collect::<HashSet<_>>();

  let removed = match key {
    CollectionKey::Teachers => write_without(&client, key, &dataset.teachers, &ids).await?,
    CollectionKey::Subjects => write_without(&client, key, &dataset.subjects, &ids).await?,
    CollectionKey::Schedule => write_without(&client, key, &dataset.schedule, &ids).await?,
    CollectionKey::Semesters => write_without(&client, key, &dataset.semesters, &ids).await?,
  };

  info!("Removed {} of {} requested records from {}", removed, ids.len(), key);
  Ok(())
}

async fn write_without<T: Record + Serialize>(
  client: &StoreClient,
  key: CollectionKey,
  collection: &[T],
  ids: &HashSet<String>,
) -> anyhow::Result<usize> {
  let next = remove_many(collection, ids);
  let removed = collection.len() - next.len();

  if removed > 0 {
    client.write_collection(key, &next).await?;
  }

  Ok(removed)
}
