//! End-to-end tests for the event dispatcher: menu state machine, job
//! spawning, and single-message-mutation discipline, all over mock adapters.

use std::sync::Arc;

use tempfile::TempDir;

use clipmill::adapters::mock::{
    ChatRecord, MockChatAdapter, MockExtractorAdapter, MockResolverAdapter, MockUploaderAdapter,
};
use clipmill::app::JobOrchestrator;
use clipmill::config::Config;
use clipmill::dispatch::{ButtonEvent, Dispatcher, EventKind, InboundEvent};
use clipmill::domain::model::{QualityOption, SourceInfo};

const REFERENCE: &str = "https://example.com/v/abc";

struct Harness {
    dispatcher: Dispatcher,
    orchestrator: Arc<JobOrchestrator>,
    chat: Arc<MockChatAdapter>,
    _base: TempDir,
}

fn harness() -> Harness {
    let base = TempDir::new().unwrap();
    let config = Arc::new(Config {
        per_call_timeout_secs: 5,
        temp_dir: base.path().to_path_buf(),
        ..Config::default()
    });
    let resolver = Arc::new(MockResolverAdapter::new().with_source(
        REFERENCE,
        SourceInfo {
            title: "Demo video".to_string(),
            duration_seconds: 600,
            qualities: vec![
                QualityOption::new("137", 1080, "mp4"),
                QualityOption::new("136", 720, "mp4"),
            ],
        },
    ));
    let chat = Arc::new(MockChatAdapter::new());
    let orchestrator = Arc::new(JobOrchestrator::new(
        resolver.clone(),
        Arc::new(MockExtractorAdapter::new(1024)),
        Arc::new(MockUploaderAdapter::new()),
        chat.clone(),
        config.clone(),
    ));
    let dispatcher = Dispatcher::new(config, resolver, chat.clone(), orchestrator.clone());
    Harness {
        dispatcher,
        orchestrator,
        chat,
        _base: base,
    }
}

async fn send_text(h: &Harness, user: i64, text: &str) {
    h.dispatcher
        .handle_event(InboundEvent {
            user,
            kind: EventKind::Text(text.to_string()),
        })
        .await;
}

async fn press(h: &Harness, user: i64, button: ButtonEvent) {
    h.dispatcher
        .handle_event(InboundEvent {
            user,
            kind: EventKind::Button(button),
        })
        .await;
}

fn menu_message_count(chat: &MockChatAdapter) -> usize {
    chat.records()
        .iter()
        .filter(|r| matches!(r, ChatRecord::MenuSent { .. }))
        .count()
}

#[tokio::test]
async fn test_source_text_renders_menu() {
    let h = harness();
    send_text(&h, 1, REFERENCE).await;

    let records = h.chat.records();
    assert!(records.iter().any(|r| {
        matches!(r, ChatRecord::MenuSent { text, .. } if text.contains("Title: Demo video"))
    }));
    assert!(h.dispatcher.sessions().is_active(1));
}

#[tokio::test]
async fn test_field_events_edit_the_same_menu_message() {
    let h = harness();
    send_text(&h, 1, REFERENCE).await;
    press(&h, 1, ButtonEvent::Duration(10)).await;
    press(&h, 1, ButtonEvent::Quality("137".to_string())).await;
    press(&h, 1, ButtonEvent::Count(2)).await;

    // One menu message, mutated in place for every transition
    assert_eq!(menu_message_count(&h.chat), 1);
    let edits: Vec<_> = h
        .chat
        .records()
        .into_iter()
        .filter_map(|r| match r {
            ChatRecord::Edited { message, text, .. } => Some((message, text)),
            _ => None,
        })
        .collect();
    assert_eq!(edits.len(), 3);
    let first = edits[0].0;
    assert!(edits.iter().all(|(m, _)| *m == first));
    assert!(edits.last().unwrap().1.contains("Ready to go"));
}

#[tokio::test]
async fn test_submit_runs_job_and_returns_session_to_idle() {
    let h = harness();
    send_text(&h, 1, REFERENCE).await;
    press(&h, 1, ButtonEvent::Duration(10)).await;
    press(&h, 1, ButtonEvent::Quality("137".to_string())).await;
    press(&h, 1, ButtonEvent::Count(2)).await;
    press(&h, 1, ButtonEvent::Submit).await;
    h.dispatcher.drain_jobs().await;

    assert_eq!(h.chat.video_captions().len(), 2);
    assert!(h
        .chat
        .sent_texts()
        .iter()
        .any(|t| t.contains("Done: 2/2")));
    // Submitted returned to idle after completion
    assert!(!h.dispatcher.sessions().is_active(1));
}

#[tokio::test]
async fn test_custom_range_flow() {
    let h = harness();
    send_text(&h, 1, REFERENCE).await;
    press(&h, 1, ButtonEvent::CustomRange).await;
    send_text(&h, 1, "2:32-3:23").await;
    press(&h, 1, ButtonEvent::Quality("136".to_string())).await;
    press(&h, 1, ButtonEvent::Submit).await;
    h.dispatcher.drain_jobs().await;

    let captions = h.chat.video_captions();
    assert_eq!(captions.len(), 1);
    assert!(captions[0].contains("2:32-3:23"));
}

#[tokio::test]
async fn test_unparseable_range_reported_inline() {
    let h = harness();
    send_text(&h, 1, REFERENCE).await;
    press(&h, 1, ButtonEvent::CustomRange).await;
    send_text(&h, 1, "no times here").await;

    assert!(h
        .chat
        .sent_texts()
        .iter()
        .any(|t| t.contains("Unrecognized time text")));
    // Session stays alive, still awaiting a correct range
    assert!(h.dispatcher.sessions().is_active(1));
    send_text(&h, 1, "152-203").await;
    assert!(h
        .chat
        .records()
        .iter()
        .any(|r| matches!(r, ChatRecord::Edited { text, .. } if text.contains("2:32-3:23"))));
}

#[tokio::test]
async fn test_overlong_range_rejected() {
    let h = harness();
    send_text(&h, 1, REFERENCE).await;
    press(&h, 1, ButtonEvent::CustomRange).await;
    send_text(&h, 1, "0:00-3:30").await; // 210s > 180s cap

    assert!(h
        .chat
        .sent_texts()
        .iter()
        .any(|t| t.contains("exceeds")));
    assert!(h.dispatcher.sessions().is_active(1));
}

#[tokio::test]
async fn test_second_submit_is_a_noop() {
    let h = harness();
    send_text(&h, 1, REFERENCE).await;
    press(&h, 1, ButtonEvent::Duration(10)).await;
    press(&h, 1, ButtonEvent::Quality("137".to_string())).await;
    press(&h, 1, ButtonEvent::Count(1)).await;
    press(&h, 1, ButtonEvent::Submit).await;
    press(&h, 1, ButtonEvent::Submit).await;
    h.dispatcher.drain_jobs().await;

    assert_eq!(h.orchestrator.completed_jobs(), 1);
}

#[tokio::test]
async fn test_cancel_discards_pending_selection() {
    let h = harness();
    send_text(&h, 1, REFERENCE).await;
    press(&h, 1, ButtonEvent::Cancel).await;

    assert!(!h.dispatcher.sessions().is_active(1));
    // The menu message was deleted with the session
    let menu = h.chat.records().into_iter().find_map(|r| match r {
        ChatRecord::MenuSent { message, .. } => Some(message),
        _ => None,
    });
    assert!(h.chat.was_deleted(menu.unwrap()));
}

#[tokio::test]
async fn test_full_download_without_selections() {
    let h = harness();
    send_text(&h, 1, REFERENCE).await;
    press(&h, 1, ButtonEvent::FullDownload).await;
    h.dispatcher.drain_jobs().await;

    assert!(h
        .chat
        .sent_texts()
        .iter()
        .any(|t| t.contains("Done: 1/1")));
    assert!(!h.dispatcher.sessions().is_active(1));
}

#[tokio::test]
async fn test_non_reference_text_is_ignored() {
    let h = harness();
    send_text(&h, 1, "hello there").await;
    assert!(h.chat.records().is_empty());
    assert!(!h.dispatcher.sessions().is_active(1));
}

#[tokio::test]
async fn test_button_without_session_reports_expired() {
    let h = harness();
    press(&h, 1, ButtonEvent::Duration(10)).await;
    assert!(h
        .chat
        .sent_texts()
        .iter()
        .any(|t| t.contains("No active selection")));
}

#[tokio::test]
async fn test_unresolvable_source_reports_and_clears() {
    let h = harness();
    send_text(&h, 1, "https://example.com/v/unknown").await;
    assert!(h
        .chat
        .sent_texts()
        .iter()
        .any(|t| t.contains("Failed to read the video")));
    assert!(!h.dispatcher.sessions().is_active(1));
}

#[tokio::test]
async fn test_two_users_run_jobs_independently() {
    let h = harness();
    for user in [1, 2] {
        send_text(&h, user, REFERENCE).await;
        press(&h, user, ButtonEvent::Duration(10)).await;
        press(&h, user, ButtonEvent::Quality("137".to_string())).await;
        press(&h, user, ButtonEvent::Count(1)).await;
        press(&h, user, ButtonEvent::Submit).await;
    }
    h.dispatcher.drain_jobs().await;

    assert_eq!(h.orchestrator.completed_jobs(), 2);
    assert!(!h.dispatcher.sessions().is_active(1));
    assert!(!h.dispatcher.sessions().is_active(2));
}

#[tokio::test]
async fn test_replacing_a_pending_session_deletes_its_menu() {
    let h = harness();
    send_text(&h, 1, REFERENCE).await;
    let first_menu = h
        .chat
        .records()
        .into_iter()
        .find_map(|r| match r {
            ChatRecord::MenuSent { message, .. } => Some(message),
            _ => None,
        })
        .unwrap();

    // A second link before submission replaces the session; the old menu
    // must not linger with live buttons
    send_text(&h, 1, REFERENCE).await;
    assert!(h.chat.was_deleted(first_menu));
    assert_eq!(menu_message_count(&h.chat), 2);
    assert!(h.dispatcher.sessions().is_active(1));
}

#[tokio::test]
async fn test_finished_job_handles_are_pruned() {
    let h = harness();
    for _ in 0..3 {
        send_text(&h, 1, REFERENCE).await;
        press(&h, 1, ButtonEvent::Duration(10)).await;
        press(&h, 1, ButtonEvent::Quality("137".to_string())).await;
        press(&h, 1, ButtonEvent::Count(1)).await;
        press(&h, 1, ButtonEvent::Submit).await;

        // Wait for the job to fully settle before the next round
        while h.dispatcher.sessions().is_active(1) {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    // Finished handles are dropped on each spawn, so only the most recent
    // job's handle can remain
    assert!(h.dispatcher.pending_jobs() <= 1);
    assert_eq!(h.orchestrator.completed_jobs(), 3);
    h.dispatcher.drain_jobs().await;
    assert_eq!(h.dispatcher.pending_jobs(), 0);
}

#[tokio::test]
async fn test_new_source_blocked_while_job_runs() {
    let h = harness();
    send_text(&h, 1, REFERENCE).await;
    press(&h, 1, ButtonEvent::Duration(10)).await;
    press(&h, 1, ButtonEvent::Quality("137".to_string())).await;
    press(&h, 1, ButtonEvent::Count(1)).await;
    press(&h, 1, ButtonEvent::Submit).await;

    // Another reference while Submitted is rejected inline
    send_text(&h, 1, REFERENCE).await;
    assert!(h
        .chat
        .sent_texts()
        .iter()
        .any(|t| t.contains("wait for the running job")));
    h.dispatcher.drain_jobs().await;
}
