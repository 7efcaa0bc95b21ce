mod args;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vidgen_client::dto::{EnhanceFpsRequest, EnhanceResolutionRequest};
use vidgen_client::{ClientConfig, VideoApi, VideoBackend};
use vidgen_core::filters::HistoryFilters;
use vidgen_core::generation::{GenerationRequest, GenerationTask};
use vidgen_core::history::HistoryItem;
use vidgen_stores::poller::PollOutcome;
use vidgen_stores::{GenerationStore, HistoryQuery, HistoryStore, StoreConfig};

use args::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // --- Tracing ---
    // Logs go to stderr so stdout stays machine-readable JSON.
    let default_filter = if cli.verbose { "vidgen=debug" } else { "vidgen=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // --- Configuration ---
    let client_config = ClientConfig::from_env().context("Invalid client configuration")?;
    let store_config = StoreConfig::from_env().context("Invalid store configuration")?;
    tracing::debug!(backend_url = %client_config.backend_url, "Loaded configuration");

    let backend: Arc<dyn VideoBackend> = Arc::new(VideoApi::new(&client_config)?);

    match cli.command {
        Commands::Generate {
            prompt,
            duration,
            resolution,
            fps,
            width,
            height,
            first_frame,
            last_frame,
            seed,
            negative_prompt,
            model_version,
            wait,
        } => {
            let mut request = GenerationRequest::new(prompt, duration)
                .with_resolution(resolution)
                .with_frames(first_frame, last_frame);
            if let Some(fps) = fps {
                request = request.with_fps(fps);
            }
            if let (Some(w), Some(h)) = (width, height) {
                request = request.with_dimensions(w, h);
            }
            if let Some(seed) = seed {
                request = request.with_seed(seed);
            }
            if let Some(negative) = negative_prompt {
                request = request.with_negative_prompt(negative);
            }
            if let Some(version) = model_version {
                request = request.with_version(version);
            }
            generate_command(backend, &store_config, request, wait).await
        }
        Commands::Status { task_id } => print_json(&backend.status(&task_id).await?),
        Commands::History {
            limit,
            offset,
            status,
            time_range,
            start,
            end,
            operation,
        } => {
            let filters = HistoryFilters {
                time_range,
                start,
                end,
                operation_type: operation,
                status,
                ..Default::default()
            };
            history_command(backend, limit, offset, filters).await
        }
        Commands::Show { task_id } => {
            let history = HistoryStore::new(backend);
            print_json(&history.find_by_task_id(&task_id).await?)
        }
        Commands::Favorite { id } => {
            print_json(&HistoryStore::new(backend).toggle_favorite(id).await?)
        }
        Commands::Like { id } => print_json(&HistoryStore::new(backend).toggle_like(id).await?),
        Commands::UltraHd { id } => {
            print_json(&HistoryStore::new(backend).toggle_ultra_hd(id).await?)
        }
        Commands::Delete { id } => {
            let response = HistoryStore::new(backend).delete(id).await?;
            print_json(&response)?;
            if !response.success {
                bail!("Backend declined to delete record {id}");
            }
            Ok(())
        }
        Commands::EnhanceResolution { id, method, scale } => {
            let request = EnhanceResolutionRequest { method, scale };
            print_json(&HistoryStore::new(backend).enhance_resolution(id, &request).await?)
        }
        Commands::EnhanceFps {
            id,
            target_fps,
            method,
            no_auto_switch,
        } => {
            let request = EnhanceFpsRequest {
                target_fps,
                method,
                auto_switch: !no_auto_switch,
            };
            print_json(&HistoryStore::new(backend).enhance_fps(id, &request).await?)
        }
        Commands::Health => print_json(&backend.health().await?),
    }
}

async fn generate_command(
    backend: Arc<dyn VideoBackend>,
    config: &StoreConfig,
    request: GenerationRequest,
    wait: bool,
) -> Result<()> {
    let store = GenerationStore::new(Arc::clone(&backend), config);
    let response = store.generate(request).await?;
    let task_id = response.task_id.clone().unwrap_or_default();

    if !wait {
        store.shutdown().await;
        return print_json(&response);
    }

    tracing::info!(task_id = %task_id, "Waiting for task to conclude");
    let outcome = tokio::select! {
        outcome = store.wait_for(&task_id) => outcome,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, stopping polling");
            None
        }
    };
    store.shutdown().await;

    let state = store.snapshot().await;

    #[derive(Serialize)]
    struct Report<'a> {
        task_id: &'a str,
        outcome: Option<PollOutcome>,
        task: Option<&'a GenerationTask>,
        record: Option<HistoryItem>,
    }

    // The record may lag behind the status endpoint; it is informational.
    let record = match HistoryStore::new(backend).find_by_task_id(&task_id).await {
        Ok(item) => Some(item),
        Err(e) => {
            tracing::warn!(task_id = %task_id, error = %e, "History record not available yet");
            None
        }
    };

    print_json(&Report {
        task_id: &task_id,
        outcome,
        task: state.task(&task_id),
        record,
    })?;

    if let Some(error) = &state.error {
        bail!("{error}");
    }
    Ok(())
}

async fn history_command(
    backend: Arc<dyn VideoBackend>,
    limit: u32,
    offset: u32,
    filters: HistoryFilters,
) -> Result<()> {
    let history = HistoryStore::new(backend);
    history
        .fetch(HistoryQuery {
            limit,
            offset,
            filters: Some(filters),
            silent: false,
        })
        .await;
    let state = history.snapshot().await;

    #[derive(Serialize)]
    struct Listing<'a> {
        total: u64,
        items: &'a [HistoryItem],
    }

    if let Some(error) = &state.error {
        bail!("{error}");
    }
    print_json(&Listing {
        total: state.total,
        items: &state.visible,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
