//! `minigen` -- terminal front end for the generation service.
//!
//! Authenticates against the service, submits preset-driven jobs, and
//! watches them through the lifecycle controller.  Session state (auth
//! token, last job id/result) persists in a JSON file between runs.
//!
//! # Environment variables
//!
//! | Variable              | Required | Default                        | Description                          |
//! |-----------------------|----------|--------------------------------|--------------------------------------|
//! | `MINIGEN_API_URL`     | no       | `http://localhost:8000/api/v1` | Service base URL                     |
//! | `MINIGEN_STORE_PATH`  | no       | `.minigen-session.json`        | Session file path                    |
//! | `TELEGRAM_INIT_DATA`  | no       | --                             | Telegram mini-app init data          |
//! | `VK_LAUNCH_PARAMS`    | no       | --                             | VK mini-app launch params            |
//!
//! Without a platform credential, `login` uses the dev bypass (the
//! service must run with dev auth enabled).

use std::sync::Arc;

use anyhow::{bail, Context};
use minigen_client::{AuthContext, HttpApi, JobApi};
use minigen_core::{FieldValue, LifecyclePhase, Preset};
use minigen_lifecycle::{JobLifecycleController, LifecycleState, PollConfig};
use minigen_store::SessionStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";
const DEFAULT_STORE_PATH: &str = ".minigen-session.json";

const USAGE: &str = "usage: minigen <command>

commands:
  login                       exchange the platform credential for a token
  presets                     list available presets
  submit <preset-id> [k=v..]  submit a job and watch it to completion
  watch                       re-attach to the last submitted job
  cancel                      cancel the last submitted job
  history                     list your jobs
  balance                     show credit balance
  topup <amount>              mock top-up";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "minigen=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first().map(String::as_str) else {
        println!("{USAGE}");
        return Ok(());
    };

    let base_url =
        std::env::var("MINIGEN_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    let store_path =
        std::env::var("MINIGEN_STORE_PATH").unwrap_or_else(|_| DEFAULT_STORE_PATH.to_string());

    let store = Arc::new(SessionStore::open(&store_path));
    let api = Arc::new(HttpApi::new(base_url, auth_context(&store)));

    match command {
        "login" => login(&api, &store).await,
        "presets" => presets(&api).await,
        "submit" => submit(&api, &store, &args[1..]).await,
        "watch" => watch_stored(&api, &store).await,
        "cancel" => cancel(&api, &store).await,
        "history" => history(&api).await,
        "balance" => balance(&api).await,
        "topup" => topup(&api, &args[1..]).await,
        other => bail!("unknown command '{other}'\n{USAGE}"),
    }
}

/// Build the auth context from the environment, restoring a previously
/// exchanged token from the session store.
fn auth_context(store: &SessionStore) -> AuthContext {
    let context = if let Ok(init_data) = std::env::var("TELEGRAM_INIT_DATA") {
        AuthContext::telegram(init_data)
    } else if let Ok(launch_params) = std::env::var("VK_LAUNCH_PARAMS") {
        AuthContext::vk(launch_params)
    } else {
        AuthContext::web()
    };

    match store.auth_token() {
        Some(token) => context.with_token(token),
        None => context,
    }
}

async fn login(api: &HttpApi, store: &SessionStore) -> anyhow::Result<()> {
    let token = api.login().await.context("auth exchange failed")?;
    store.set_auth_token(&token).context("failed to persist token")?;
    println!("authenticated");
    Ok(())
}

async fn presets(api: &Arc<HttpApi>) -> anyhow::Result<()> {
    let list = api.list_presets().await.context("failed to fetch presets")?;
    for preset in &list.items {
        let price = preset
            .price
            .map(|p| format!(" ({p} cr)"))
            .unwrap_or_default();
        println!("{} -- {}{price} [{}]", preset.id, preset.label, preset.job_type);
        for field in &preset.fields {
            let required = if field.required { "required" } else { "optional" };
            println!("    {} <{}> {required}", field.name, field.field_type);
        }
    }
    Ok(())
}

async fn submit(api: &Arc<HttpApi>, store: &Arc<SessionStore>, args: &[String]) -> anyhow::Result<()> {
    let Some(preset_id) = args.first() else {
        bail!("usage: minigen submit <preset-id> [key=value..]");
    };

    let list = api.list_presets().await.context("failed to fetch presets")?;
    let preset = list
        .items
        .into_iter()
        .find(|p| &p.id == preset_id)
        .with_context(|| format!("preset '{preset_id}' not found"))?;

    let mut values = preset.initial_values();
    for pair in &args[1..] {
        let (key, raw) = pair
            .split_once('=')
            .with_context(|| format!("expected key=value, got '{pair}'"))?;
        values.insert(key.to_string(), coerce_value(&preset, key, raw));
    }

    let controller = JobLifecycleController::new(
        Arc::clone(api) as Arc<dyn JobApi>,
        Arc::clone(store),
        PollConfig::default(),
    );
    controller
        .submit(&preset, &values)
        .await
        .context("invalid submission")?;
    watch(&controller).await
}

async fn watch_stored(api: &Arc<HttpApi>, store: &Arc<SessionStore>) -> anyhow::Result<()> {
    if store.last_job_id().is_none() {
        bail!("no stored job to watch");
    }
    let controller = JobLifecycleController::new(
        Arc::clone(api) as Arc<dyn JobApi>,
        Arc::clone(store),
        PollConfig::default(),
    );
    controller.resume().await;
    watch(&controller).await
}

/// Print state transitions until the session settles.
async fn watch(controller: &JobLifecycleController) -> anyhow::Result<()> {
    let mut rx = controller.subscribe();
    let mut last_line = String::new();

    loop {
        let state = rx.borrow_and_update().clone();
        let line = render(&state);
        if line != last_line {
            println!("{line}");
            last_line = line;
        }
        if !state.phase.is_active() {
            print_outcome(&state);
            return Ok(());
        }
        if rx.changed().await.is_err() {
            return Ok(());
        }
    }
}

fn render(state: &LifecycleState) -> String {
    let phase = match state.phase {
        LifecyclePhase::Idle => "idle",
        LifecyclePhase::Submitting => "submitting",
        LifecyclePhase::Processing => "processing",
        LifecyclePhase::Done => "done",
        LifecyclePhase::Failed => "failed",
        LifecyclePhase::TimedOut => "timed out",
    };
    let mut line = format!("[{}s] {phase}", state.elapsed_secs);
    if let Some(status) = state.status {
        line.push_str(&format!(" ({status:?})"));
    }
    if let Some(progress) = state.progress {
        line.push_str(&format!(" {:.0}%", progress * 100.0));
    }
    if let Some(remaining) = state.remaining_secs() {
        line.push_str(&format!(" ~{remaining}s remaining"));
    }
    line
}

fn print_outcome(state: &LifecycleState) {
    match state.phase {
        LifecyclePhase::Done => {
            if let Some(result) = &state.result {
                for item in &result.items {
                    if let Some(url) = &item.url {
                        println!("file: {url}");
                    }
                    if let Some(text) = &item.text {
                        println!("text: {text}");
                    }
                }
            }
        }
        LifecyclePhase::Failed => {
            let failure = state
                .failure
                .map(|f| f.to_string())
                .unwrap_or_else(|| "generation failed".into());
            match &state.error {
                Some(message) => println!("failed: {failure} ({message})"),
                None => println!("failed: {failure}"),
            }
        }
        LifecyclePhase::TimedOut => {
            println!("taking too long; run `minigen watch` later to re-check");
        }
        _ => {}
    }
}

/// Coerce a raw CLI value using the preset's declared field type.
fn coerce_value(preset: &Preset, key: &str, raw: &str) -> FieldValue {
    let field_type = preset
        .fields
        .iter()
        .find(|f| f.name == key)
        .map(|f| f.field_type.as_str());

    match field_type {
        Some("boolean") => FieldValue::Bool(raw == "true" || raw == "1"),
        Some("number") => raw
            .parse::<f64>()
            .map(FieldValue::Number)
            .unwrap_or_else(|_| FieldValue::Text(raw.to_string())),
        _ => FieldValue::Text(raw.to_string()),
    }
}

async fn cancel(api: &Arc<HttpApi>, store: &Arc<SessionStore>) -> anyhow::Result<()> {
    let Some(job_id) = store.last_job_id() else {
        bail!("no stored job to cancel");
    };
    let detail = api.cancel_job(&job_id).await.context("cancel failed")?;
    println!("{}  {:?}", detail.id, detail.status);
    Ok(())
}

async fn history(api: &Arc<HttpApi>) -> anyhow::Result<()> {
    let list = api.list_jobs(20, 0).await.context("failed to fetch history")?;
    if list.items.is_empty() {
        println!("no jobs");
        return Ok(());
    }
    for job in &list.items {
        println!("{}  {:<10} {:?}  {}", job.id, job.kind, job.status, job.created_at);
    }
    println!("total: {}", list.total);
    Ok(())
}

async fn balance(api: &Arc<HttpApi>) -> anyhow::Result<()> {
    let balance = api.balance().await.context("failed to fetch balance")?;
    println!("balance: {} cr", balance.balance);
    Ok(())
}

async fn topup(api: &Arc<HttpApi>, args: &[String]) -> anyhow::Result<()> {
    let amount: i64 = args
        .first()
        .context("usage: minigen topup <amount>")?
        .parse()
        .context("amount must be an integer")?;
    let balance = api.topup(amount).await.context("top-up failed")?;
    println!("balance: {} cr", balance.balance);
    Ok(())
}
