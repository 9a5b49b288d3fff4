use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::{Rgba, RgbaImage};

use snapcrop_actions::{
    ActionChooser, ActionOutcome, ActionPipeline, Choice, Clipboard, EditSession, Storage,
};
use snapcrop_common::config::{InMemoryPreferences, Preferences, PreferencesStore, TerminalAction};
use snapcrop_common::error::SnapError;
use snapcrop_common::notify::{Notice, Notifier};
use snapcrop_common::timer::TimerKey;
use snapcrop_crop_editor::CropConfig;
use snapcrop_geometry::RectF;

struct CountingStorage {
    saves: AtomicUsize,
    succeed: AtomicBool,
    last_size: Mutex<Option<(u32, u32)>>,
}

impl CountingStorage {
    fn new(succeed: bool) -> Arc<Self> {
        Arc::new(Self {
            saves: AtomicUsize::new(0),
            succeed: AtomicBool::new(succeed),
            last_size: Mutex::new(None),
        })
    }
}

impl Storage for CountingStorage {
    fn save(&self, image: &RgbaImage) -> bool {
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.last_size.lock().unwrap() = Some(image.dimensions());
        self.succeed.load(Ordering::SeqCst)
    }
}

struct CountingClipboard {
    copies: AtomicUsize,
    clears: AtomicUsize,
    shares: AtomicUsize,
    succeed: AtomicBool,
}

impl CountingClipboard {
    fn new(succeed: bool) -> Arc<Self> {
        Arc::new(Self {
            copies: AtomicUsize::new(0),
            clears: AtomicUsize::new(0),
            shares: AtomicUsize::new(0),
            succeed: AtomicBool::new(succeed),
        })
    }
}

impl Clipboard for CountingClipboard {
    fn copy(&self, _image: &RgbaImage) -> bool {
        self.copies.fetch_add(1, Ordering::SeqCst);
        self.succeed.load(Ordering::SeqCst)
    }

    fn clear(&self) -> bool {
        self.clears.fetch_add(1, Ordering::SeqCst);
        true
    }

    fn share(&self, _image: &RgbaImage) {
        self.shares.fetch_add(1, Ordering::SeqCst);
    }
}

struct ScriptedChooser {
    answer: Option<Choice>,
    asked: AtomicUsize,
    offered_remember: Mutex<Option<bool>>,
}

impl ScriptedChooser {
    fn answering(answer: Option<Choice>) -> Self {
        Self {
            answer,
            asked: AtomicUsize::new(0),
            offered_remember: Mutex::new(None),
        }
    }
}

impl ActionChooser for ScriptedChooser {
    fn choose(&self, offer_remember: bool) -> Option<Choice> {
        self.asked.fetch_add(1, Ordering::SeqCst);
        *self.offered_remember.lock().unwrap() = Some(offer_remember);
        self.answer
    }
}

#[derive(Default)]
struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notice(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

struct Harness {
    storage: Arc<CountingStorage>,
    clipboard: Arc<CountingClipboard>,
    prefs: Arc<InMemoryPreferences>,
    notifier: Arc<RecordingNotifier>,
    pipeline: ActionPipeline,
}

fn harness(storage_ok: bool, clipboard_ok: bool, prefs: Preferences) -> Harness {
    let storage = CountingStorage::new(storage_ok);
    let clipboard = CountingClipboard::new(clipboard_ok);
    let prefs = Arc::new(InMemoryPreferences::new(prefs));
    let notifier = Arc::new(RecordingNotifier::default());
    let pipeline = ActionPipeline::new(
        storage.clone(),
        clipboard.clone(),
        prefs.clone(),
        notifier.clone(),
    );
    Harness {
        storage,
        clipboard,
        prefs,
        notifier,
        pipeline,
    }
}

fn artifact(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("create artifact dir");
    let path = dir.join("temp_1.png");
    RgbaImage::from_pixel(200, 100, Rgba([200, 40, 40, 255]))
        .save(&path)
        .expect("write artifact");
    path
}

fn open(path: &Path) -> EditSession {
    EditSession::open(path, CropConfig::default()).expect("artifact opens")
}

#[tokio::test]
async fn save_stores_crop_once_and_deletes_artifact() {
    let h = harness(true, true, Preferences::default());
    let path = artifact("snapcrop_test_action_save");
    let mut session = open(&path);
    session
        .geometry_mut()
        .set_crop_rect(RectF::new(10.0, 0.0, 130.0, 100.0));

    let outcome = h.pipeline.save(&mut session).await.expect("save succeeds");

    assert_eq!(outcome, ActionOutcome::Saved);
    assert_eq!(h.storage.saves.load(Ordering::SeqCst), 1);
    assert_eq!(*h.storage.last_size.lock().unwrap(), Some((120, 100)));
    assert!(!path.exists());
    assert!(session.is_closed());
    assert_eq!(h.notifier.notices(), vec![Notice::Saved]);

    let again = h.pipeline.save(&mut session).await;
    assert!(matches!(again, Err(SnapError::SessionClosed)));
    assert_eq!(h.storage.saves.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn every_terminal_action_removes_the_artifact() {
    for action in TerminalAction::ALL {
        let h = harness(true, true, Preferences::default());
        let path = artifact(&format!("snapcrop_test_action_each_{}", action.as_str()));
        let mut session = open(&path);

        let outcome = h
            .pipeline
            .execute(&mut session, action)
            .await
            .expect("action succeeds");

        assert_eq!(outcome.action(), action);
        assert_eq!(session.closed_by(), Some(action));
        assert!(!path.exists(), "{action:?} left the artifact behind");
    }
}

#[tokio::test]
async fn failed_save_leaves_session_open() {
    let h = harness(false, true, Preferences::default());
    let path = artifact("snapcrop_test_action_save_fail");
    let mut session = open(&path);

    let err = h.pipeline.save(&mut session).await.unwrap_err();

    assert!(matches!(err, SnapError::StorageIoFailed));
    assert!(err.keeps_session_open());
    assert!(!session.is_closed());
    assert_eq!(session.pending_action(), None);
    assert!(path.exists());
    assert_eq!(h.notifier.notices(), vec![Notice::SaveFailed]);

    let outcome = h.pipeline.discard(&mut session).unwrap();
    assert_eq!(outcome, ActionOutcome::Discarded);
    assert!(!path.exists());
}

#[tokio::test]
async fn failed_copy_leaves_session_open() {
    let prefs = Preferences {
        auto_clear_clipboard: true,
        ..Preferences::default()
    };
    let h = harness(true, false, prefs);
    let path = artifact("snapcrop_test_action_copy_fail");
    let mut session = open(&path);

    let err = h.pipeline.copy_and_discard(&mut session).await.unwrap_err();

    assert!(matches!(err, SnapError::ClipboardIoFailed));
    assert!(!session.is_closed());
    assert!(path.exists());
    assert!(!h.pipeline.timers().is_pending(TimerKey::ClipboardClear));
    assert_eq!(h.notifier.notices(), vec![Notice::CopyFailed]);

    h.clipboard.succeed.store(true, Ordering::SeqCst);
    let outcome = h.pipeline.copy_and_discard(&mut session).await.unwrap();
    assert_eq!(
        outcome,
        ActionOutcome::Copied {
            clear_scheduled: true
        }
    );
    assert_eq!(h.clipboard.copies.load(Ordering::SeqCst), 2);
    assert!(!path.exists());
}

#[tokio::test]
async fn degenerate_crop_fails_without_io() {
    let h = harness(true, true, Preferences::default());
    let path = artifact("snapcrop_test_action_degenerate");
    let mut session = open(&path);
    session.geometry_mut().set_view_size(0.0, 0.0);

    let err = h.pipeline.save(&mut session).await.unwrap_err();

    assert!(matches!(err, SnapError::DegenerateTransform));
    assert_eq!(h.storage.saves.load(Ordering::SeqCst), 0);
    assert!(!session.is_closed());
    assert_eq!(h.notifier.notices(), vec![Notice::CaptureFailed]);
}

#[tokio::test]
async fn remembered_action_skips_the_prompt() {
    let prefs = Preferences {
        remember_action: true,
        remembered_action: Some(TerminalAction::Save),
        ..Preferences::default()
    };
    let h = harness(true, true, prefs);
    let chooser = ScriptedChooser::answering(Some(Choice {
        action: TerminalAction::Discard,
        remember: false,
    }));
    let path = artifact("snapcrop_test_action_remembered");
    let mut session = open(&path);

    let outcome = h.pipeline.complete(&mut session, &chooser).await.unwrap();

    assert_eq!(outcome, Some(ActionOutcome::Saved));
    assert_eq!(chooser.asked.load(Ordering::SeqCst), 0);
    assert_eq!(h.storage.saves.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn prompt_persists_choice_when_remembering_is_enabled() {
    let prefs = Preferences {
        remember_action: true,
        ..Preferences::default()
    };
    let h = harness(true, true, prefs);
    let chooser = ScriptedChooser::answering(Some(Choice {
        action: TerminalAction::CopyDiscard,
        remember: true,
    }));
    let path = artifact("snapcrop_test_action_remember_choice");
    let mut session = open(&path);

    let outcome = h.pipeline.complete(&mut session, &chooser).await.unwrap();

    assert_eq!(
        outcome,
        Some(ActionOutcome::Copied {
            clear_scheduled: false
        })
    );
    assert_eq!(*chooser.offered_remember.lock().unwrap(), Some(true));
    assert_eq!(
        h.prefs.snapshot().remembered_action,
        Some(TerminalAction::CopyDiscard)
    );
}

#[tokio::test]
async fn remember_toggle_is_not_offered_when_disabled() {
    let h = harness(true, true, Preferences::default());
    let chooser = ScriptedChooser::answering(Some(Choice {
        action: TerminalAction::Discard,
        remember: true,
    }));
    let path = artifact("snapcrop_test_action_no_remember");
    let mut session = open(&path);

    h.pipeline.complete(&mut session, &chooser).await.unwrap();

    assert_eq!(*chooser.offered_remember.lock().unwrap(), Some(false));
    assert_eq!(h.prefs.snapshot().remembered_action, None);
}

#[tokio::test]
async fn cancelled_prompt_keeps_session_open() {
    let h = harness(true, true, Preferences::default());
    let chooser = ScriptedChooser::answering(None);
    let path = artifact("snapcrop_test_action_cancel");
    let mut session = open(&path);

    let outcome = h.pipeline.complete(&mut session, &chooser).await.unwrap();

    assert_eq!(outcome, None);
    assert!(!session.is_closed());
    assert!(path.exists());
}

#[tokio::test]
async fn share_is_not_terminal() {
    let h = harness(true, true, Preferences::default());
    let path = artifact("snapcrop_test_action_share");
    let mut session = open(&path);

    h.pipeline
        .share(&session)
        .expect("share dispatches")
        .await
        .expect("share task completes");

    assert_eq!(h.clipboard.shares.load(Ordering::SeqCst), 1);
    assert!(!session.is_closed());
    assert!(path.exists());

    h.pipeline.discard(&mut session).unwrap();
    assert!(matches!(h.pipeline.share(&session), Err(SnapError::SessionClosed)));
}

#[tokio::test(start_paused = true)]
async fn second_copy_supersedes_pending_clear() {
    let prefs = Preferences {
        auto_clear_clipboard: true,
        clear_seconds: 60,
        ..Preferences::default()
    };
    let h = harness(true, true, prefs);

    for name in ["snapcrop_test_action_clear_a", "snapcrop_test_action_clear_b"] {
        let path = artifact(name);
        let mut session = open(&path);
        h.pipeline.copy_and_discard(&mut session).await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
    }

    assert_eq!(h.pipeline.timers().pending_count(), 1);
    assert_eq!(h.clipboard.clears.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_secs(45)).await;
    assert_eq!(h.clipboard.clears.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(h.clipboard.clears.load(Ordering::SeqCst), 1);
    assert!(!h.pipeline.timers().is_pending(TimerKey::ClipboardClear));

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(h.clipboard.clears.load(Ordering::SeqCst), 1);
}
