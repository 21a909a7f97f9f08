use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use rxstore::{
    Action, ActionChannel, AsyncState, ChannelSettings, Declarations, InitOptions,
    LinkServiceConfig, Store, StoreState,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

/// Run a demo store with one linked "users" service.
#[derive(Debug, Parser)]
#[command(name = "rxstore", version)]
struct Cli {
    /// Number of START actions to dispatch back to back.
    #[arg(long, default_value_t = 3)]
    starts: u32,

    /// Simulated service latency.
    #[arg(long, default_value_t = 50)]
    delay_ms: u64,

    /// Make every service call fail.
    #[arg(long)]
    fail: bool,

    /// TOML file with channel settings.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
struct DemoState {
    users: AsyncState,
    requests: u64,
}

impl StoreState for DemoState {
    fn async_slice(&self, key: &str) -> Option<&AsyncState> {
        (key == "users").then_some(&self.users)
    }

    fn async_slice_mut(&mut self, key: &str) -> Option<&mut AsyncState> {
        (key == "users").then_some(&mut self.users)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => ChannelSettings::load_from(path)?,
        None => ChannelSettings::default(),
    };

    let store: Store<DemoState> = Store::new(
        ActionChannel::new(&settings)?,
        Declarations::new().async_action("fetchUsers"),
        None,
    )?;
    let fetch = store
        .types()
        .async_type("fetchUsers")
        .cloned()
        .context("fetchUsers was not declared")?;

    let delay = Duration::from_millis(cli.delay_ms);
    let fail = cli.fail;
    store.link_service(
        LinkServiceConfig::new("users", &fetch, move |request: Value| async move {
            tokio::time::sleep(delay).await;
            if fail {
                Err(json!({ "message": "service unavailable", "request": request }))
            } else {
                Ok(json!({ "items": ["ada", "grace", "linus"], "request": request }))
            }
        })
        .with_data_selector(|raw| raw["items"].clone())
        .with_error_selector(|raw| raw["message"].clone()),
    );

    let start = fetch.start.clone();
    store.init(InitOptions::new(
        DemoState::default(),
        move |mut state: DemoState, action: &Action| {
            if action.is(&start) {
                state.requests += 1;
            }
            state
        },
    ))?;

    let mut updates = store.state()?;
    let printer = tokio::spawn(async move {
        while let Ok(state) = updates.recv().await {
            match serde_json::to_string(&state) {
                Ok(rendered) => tracing::info!(state = %rendered, "State emitted"),
                Err(error) => tracing::warn!(%error, "Failed to render state"),
            }
        }
    });

    for page in 0..cli.starts {
        store.dispatch(Action::with_payload(fetch.start.clone(), json!({ "page": page })));
    }

    let expected = u64::from(cli.starts);
    let mut settled = store.state()?;
    let last = tokio::time::timeout(
        delay * 4 + Duration::from_secs(1),
        settled.wait_for(|state| state.requests == expected && !state.users.loading),
    )
    .await
    .context("timed out waiting for the service to settle")??;

    tracing::info!(
        data = %last.users.data,
        err = %last.users.err,
        requests = last.requests,
        "Settled"
    );

    store.destroy();
    let _ = printer.await;
    Ok(())
}
