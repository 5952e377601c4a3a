//! Upload command: wires the API client into the publish orchestrator.

use std::time::Duration;

use anyhow::Context;
use modpub_api::{ApiConfig, Client};
use modpub_publish::{
    Phase, PublishEvent, PublishOrchestrator, PublishReport, PublishRequest, PublishSettings,
};
use tracing::{info, warn};

use crate::cli::UploadArgs;

/// Publishes one mod version. Ctrl-C cancels the session.
pub async fn upload(api: ApiConfig, args: UploadArgs) -> anyhow::Result<()> {
    let client = Client::new(&api).context("failed to build API client")?;

    let mut orchestrator = PublishOrchestrator::new(settings(&args));
    let mut events = orchestrator
        .take_events()
        .context("event receiver already taken")?;

    let cancel = orchestrator.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling upload");
            cancel.cancel();
        }
    });

    let progress = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            log_event(&event);
        }
    });

    let request = PublishRequest {
        mod_id: args.mod_id.clone(),
        file_path: args.file.clone(),
        changelog: args.changelog(),
        chunk_size: args.chunk_size,
        stability: args.stability.clone(),
    };

    let result = orchestrator.publish(&client, request).await;

    // Closes the event channel so the progress task drains and exits.
    drop(orchestrator);
    let _ = progress.await;

    let report = result?;
    log_report(&report);
    Ok(())
}

fn settings(args: &UploadArgs) -> PublishSettings {
    PublishSettings {
        poll_timeout: args.poll_timeout.map(Duration::from_secs),
        upload_concurrency: args.concurrency,
        ..PublishSettings::default()
    }
}

fn log_event(event: &PublishEvent) {
    match event {
        PublishEvent::PhaseChanged { phase } => match phase {
            Phase::Uploading => info!("uploading mod"),
            Phase::Finalizing => info!("finalizing upload"),
            Phase::Polling => info!("waiting for version to be processed"),
            _ => {}
        },
        PublishEvent::ChunkUploaded {
            part,
            sent,
            total,
            bytes,
        } => {
            info!(part, bytes, "uploaded part {sent}/{total}");
        }
        PublishEvent::FinalizeRejected => {
            warn!("server did not confirm finalization; checking upload state anyway");
        }
        PublishEvent::PollPending { attempt } => {
            info!(attempt, "version not processed yet, retrying");
        }
    }
}

fn log_report(report: &PublishReport) {
    info!(
        mod_id = %report.mod_id,
        version_id = %report.version_id,
        parts = report.parts_uploaded,
        bytes = report.bytes_uploaded,
        outcome = %report.outcome,
        "upload finished"
    );
}
