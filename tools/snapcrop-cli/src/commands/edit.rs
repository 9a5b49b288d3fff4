//! Crop a capture artifact and dispatch the terminal action.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use snapcrop_actions::{ActionOutcome, ActionPipeline, EditSession};
use snapcrop_common::config::{AppConfig, PreferencesStore, TerminalAction};
use snapcrop_common::temp::TempCache;
use snapcrop_common::timer::TimerKey;
use snapcrop_crop_editor::{parse_aspect, CropConfig};

use crate::collaborators::{ArboardClipboard, DirectoryStorage, StdinChooser, TracingNotifier};
use crate::gesture::parse_gesture;
use crate::EditArgs;

pub async fn run(
    config: &AppConfig,
    prefs: Arc<dyn PreferencesStore>,
    artifact: PathBuf,
    args: EditArgs,
) -> anyhow::Result<()> {
    let action = args
        .action
        .as_deref()
        .map(|name| {
            TerminalAction::parse(name).ok_or_else(|| {
                anyhow::anyhow!("Unknown action: {name}. Use: save, copy, discard")
            })
        })
        .transpose()?;
    let aspect = args.aspect.as_deref().map(parse_aspect).transpose()?;
    let gesture = args
        .gesture
        .as_deref()
        .map(parse_gesture)
        .transpose()?
        .unwrap_or_default();

    let mut session = EditSession::load(&artifact, CropConfig::default()).await?;
    let (width, height) = session.image().dimensions();
    println!("Editing capture: {width}x{height}");

    let geometry = session.geometry_mut();
    if let Some((w, h)) = args.view {
        geometry.set_view_size(w, h);
    }
    if let Some(ratio) = aspect {
        geometry.set_aspect_ratio(ratio);
    }
    if let Some(degrees) = args.rotate {
        geometry.rotate(degrees);
    }
    for event in gesture {
        geometry.handle_pointer(event);
    }

    let region = geometry.export_region()?;
    println!(
        "  Crop: {}x{} at ({}, {})",
        region.width, region.height, region.x, region.y
    );

    let cache = TempCache::from_config(&config.storage);
    let pipeline = ActionPipeline::new(
        Arc::new(DirectoryStorage::new(&config.storage.screenshots_dir)),
        Arc::new(ArboardClipboard::new(cache)),
        prefs,
        Arc::new(TracingNotifier),
    );

    if args.share {
        pipeline.share(&session)?.await?;
    }

    let outcome = match action {
        Some(action) => pipeline.execute(&mut session, action).await?,
        None => match prompt_until_closed(&pipeline, &mut session).await? {
            Some(outcome) => outcome,
            None => {
                println!("Cancelled; the capture is kept for another edit.");
                return Ok(());
            }
        },
    };

    match outcome {
        ActionOutcome::Saved => println!("Screenshot saved"),
        ActionOutcome::Copied { clear_scheduled } => {
            println!("Screenshot copied to clipboard");
            if std::io::stdin().is_terminal() {
                serve_clipboard(&pipeline, clear_scheduled).await?;
            }
        }
        ActionOutcome::Discarded => println!("Screenshot discarded"),
    }
    Ok(())
}

/// Prompt again after storage or clipboard failures, which leave the session open.
async fn prompt_until_closed(
    pipeline: &ActionPipeline,
    session: &mut EditSession,
) -> anyhow::Result<Option<ActionOutcome>> {
    loop {
        match pipeline.complete(session, &StdinChooser).await {
            Ok(outcome) => return Ok(outcome),
            Err(e) if e.keeps_session_open() => println!("{e}; pick another action."),
            Err(e) => return Err(e.into()),
        }
    }
}

/// The clipboard only holds our image while this process runs. Stay up until
/// the auto-clear fires, or until Ctrl+C when there is none.
async fn serve_clipboard(pipeline: &ActionPipeline, clear_scheduled: bool) -> anyhow::Result<()> {
    if clear_scheduled {
        println!("Clipboard will be cleared automatically. Press Ctrl+C to exit now.");
        let timers = pipeline.timers().clone();
        let wait = async move {
            while timers.is_pending(TimerKey::ClipboardClear) {
                tokio::time::sleep(Duration::from_millis(250)).await;
            }
        };
        tokio::select! {
            _ = wait => {}
            _ = tokio::signal::ctrl_c() => {}
        }
    } else {
        println!("Press Ctrl+C to exit; the clipboard keeps the image until then.");
        tokio::signal::ctrl_c().await?;
    }
    Ok(())
}
