use kanal::AsyncReceiver;
use lernu_types::AppEvent;
use tokio_util::sync::CancellationToken;

/// Headless sink for app notifications. A real frontend takes this loop's
/// place on the `app_to_ui` channel; running standalone we log what the UI
/// would render.
pub async fn ui_loop(
    rx: AsyncReceiver<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            event = rx.recv() => event?,
        };

        match &event {
            AppEvent::Languages(languages) => {
                tracing::info!("{} languages available", languages.len());
            }
            AppEvent::Catalog(view) => {
                let open = view
                    .units
                    .iter()
                    .flat_map(|u| &u.lessons)
                    .filter(|l| !l.locked)
                    .count();
                tracing::info!(
                    "catalog: {} units, {} unlocked lessons, remaining today: {:?}",
                    view.units.len(),
                    open,
                    view.remaining_today
                );
            }
            AppEvent::DownloadProgress { unit_id, progress } => match progress {
                Some(p) => tracing::info!("unit {unit_id}: {}/{} files", p.completed, p.total),
                None => tracing::info!("unit {unit_id}: download finished"),
            },
            AppEvent::Feedback(feedback) => {
                tracing::info!(
                    "question {}: {}",
                    feedback.question_id,
                    feedback.feedback_text
                );
            }
            AppEvent::Celebration { points_awarded } => {
                tracing::info!("lesson complete, +{points_awarded} points");
            }
            AppEvent::Error(message) => tracing::warn!("ui error surface: {message}"),
            other => tracing::debug!("ui event: {:?}", std::mem::discriminant(other)),
        }
    }
}
