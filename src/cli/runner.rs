//! CLI execution runner.
//!
//! Calculates the requested route and, when a recorded trip is given,
//! navigates it until the recording runs out or the user interrupts.

use anyhow::Result;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::runtime::RuntimeEvent;

use super::bootstrap::CliContext;
use super::output::{run_event_loop, OutputMode};

/// Run one trip and wait for its output to drain.
pub async fn execute_trip(ctx: &CliContext) -> Result<()> {
    // Fresh channel so this trip's events flow to a new output loop
    let (event_tx, event_rx) = mpsc::unbounded_channel::<RuntimeEvent>();
    ctx.runtime.replace_event_tx(event_tx);

    let (closed_tx, closed_rx) = oneshot::channel();
    let mode = OutputMode::from_flags(ctx.args.json, ctx.args.quiet);
    let output_handle: JoinHandle<Result<()>> =
        tokio::spawn(async move { run_event_loop(event_rx, mode, Some(closed_tx)).await });

    let result = drive(ctx, closed_rx).await;

    // Swap in a dead sender so the output loop sees the end of the stream
    let (idle_tx, _) = mpsc::unbounded_channel::<RuntimeEvent>();
    ctx.runtime.replace_event_tx(idle_tx);

    match output_handle.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            tracing::warn!("Output handler error: {}", e);
        }
        Err(e) => {
            tracing::warn!("Output handler panicked: {}", e);
        }
    }

    result
}

async fn drive(ctx: &CliContext, source_closed: oneshot::Receiver<()>) -> Result<()> {
    ctx.navigator
        .calculate_route(ctx.args.origin, ctx.args.destination, ctx.mode)
        .await?;

    if ctx.args.replay.is_none() {
        return Ok(());
    }

    let handle = ctx.navigator.start_navigation()?;
    if ctx.args.verbose {
        eprintln!(
            "[cli] Session {} started at {}",
            handle.session_id,
            handle.started_at.to_rfc3339()
        );
    }

    tokio::select! {
        _ = source_closed => {
            tracing::debug!("Replay finished");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::debug!("Interrupted");
        }
    }

    ctx.navigator.stop_navigation()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;
    use crate::directions::{RecordedDirections, TravelMode};
    use crate::error::NavigationError;
    use crate::navigation::{LocationRequest, ReplaySource, SessionState};
    use crate::navigator::Navigator;
    use crate::runtime::CliRuntime;
    use clap::Parser;
    use std::sync::Arc;
    use std::time::Duration;

    const ROUTE: &str = r#"{"code":"Ok","routes":[{"distance":900.0,"duration":60.0,"geometry":"g","legs":[]}]}"#;
    const TRIP: &str = concat!(
        r#"{"type":"progress","sample":{"latitude":37.7,"longitude":-122.4},"snapshot":{"currentStepPoints":[{"latitude":37.71,"longitude":-122.41}],"bannerInstruction":{"primaryText":"Turn right","modifier":"right","remainingStepDistanceMeters":120.0},"legDistanceRemaining":900.0,"legDurationRemaining":60.0}}"#,
        "\n",
        r#"{"type":"off_route","sample":{"latitude":37.72,"longitude":-122.42}}"#,
        "\n"
    );

    fn context(dir: &tempfile::TempDir, argv: &[&str]) -> CliContext {
        let route_path = dir.path().join("route.json");
        let trip_path = dir.path().join("trip.jsonl");
        std::fs::write(&route_path, ROUTE).unwrap();
        std::fs::write(&trip_path, TRIP).unwrap();

        let mut full = vec!["wayfarer-cli", "--quiet"];
        full.extend_from_slice(argv);
        let mut args = Args::parse_from(full);
        args.replay = args.replay.map(|_| trip_path.clone());

        let (tx, _) = mpsc::unbounded_channel();
        let runtime = Arc::new(CliRuntime::new(tx));
        let navigator = Navigator::new(
            runtime.clone(),
            Arc::new(RecordedDirections::new(&route_path)),
            Arc::new(ReplaySource::new(&trip_path).with_pace(Duration::ZERO)),
            LocationRequest::default(),
        );
        navigator.set_credential("pk.test");

        CliContext {
            runtime,
            navigator: Arc::new(navigator),
            mode: TravelMode::Driving,
            args,
        }
    }

    #[tokio::test]
    async fn test_execute_trip_route_only() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir, &["--origin", "37.7,-122.4", "--destination", "37.8,-122.5"]);

        execute_trip(&ctx).await.unwrap();

        assert!(ctx.navigator.active_route().is_some());
        assert_eq!(ctx.navigator.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_execute_trip_replays_and_stops() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(
            &dir,
            &[
                "--origin",
                "37.7,-122.4",
                "--destination",
                "37.8,-122.5",
                "--replay",
                "placeholder",
            ],
        );

        tokio::time::timeout(Duration::from_secs(5), execute_trip(&ctx))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(ctx.navigator.state(), SessionState::Stopped);
    }

    #[tokio::test]
    async fn test_execute_trip_missing_origin() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir, &["--destination", "37.8,-122.5"]);

        let err = execute_trip(&ctx).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<NavigationError>(),
            Some(NavigationError::MissingOrigin)
        ));
    }
}
