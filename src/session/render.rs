//! Pure menu rendering
//!
//! `render` maps session state to menu content with no transport calls,
//! so every transition stays independently testable. The dispatcher performs
//! the actual edit of the single menu message.

use crate::domain::model::format_hms;
use crate::domain::rules::suggested_max_clips;
use crate::ports::{Button, MenuView};
use crate::session::{SelectionSession, SessionState};

/// Render the menu for the session's current state
pub fn render(session: &SelectionSession, max_clips: u32) -> MenuView {
    let mut text = format!(
        "Title: {}\nDuration: ~{}\n",
        session.source_title,
        format_hms(session.source_duration)
    );

    match session.state {
        SessionState::AwaitingCustomRange => {
            text.push_str(
                "Send a range as text, e.g. `00H08M10S-00H09M20S`, `2:32-3:23`, or `152-203`.\n",
            );
        }
        SessionState::Submitted => {
            text.push_str("Working on it…\n");
        }
        _ => {
            text.push_str("Pick clip duration, count, and quality:\n");
        }
    }

    text.push_str(&selection_summary(session));
    // Placement is a fixed positional heuristic, never claimed as popularity
    text.push_str(
        "\nClip positions are spread over the video by a fixed rule, not by view counts.",
    );

    MenuView {
        text,
        buttons: button_rows(session, max_clips),
    }
}

fn selection_summary(session: &SelectionSession) -> String {
    let mut lines = String::new();
    if let Some(duration) = session.selected_duration {
        lines.push_str(&format!("Clip length: {}s\n", duration));
    }
    if let Some(range) = session.selected_range {
        lines.push_str(&format!("Range: {} ({}s)\n", range, range.len_seconds()));
    }
    if let Some(count) = session.selected_count {
        lines.push_str(&format!("Clips: {}\n", count));
    }
    if let Some(quality_id) = &session.selected_quality {
        let label = session
            .qualities
            .iter()
            .find(|q| &q.id == quality_id)
            .map(|q| q.label.as_str())
            .unwrap_or(quality_id.as_str());
        lines.push_str(&format!("Quality: {}\n", label));
    }
    if session.state == SessionState::Ready {
        lines.push_str("Ready to go. Press Start.\n");
    }
    lines
}

fn button_rows(session: &SelectionSession, max_clips: u32) -> Vec<Vec<Button>> {
    let mut rows = Vec::new();
    if session.state == SessionState::Submitted {
        return rows;
    }

    // Duration buttons are withheld while a custom range is being typed
    if session.state != SessionState::AwaitingCustomRange {
        rows.push(vec![
            Button::new("5s", "dur:5"),
            Button::new("10s", "dur:10"),
            Button::new("20s", "dur:20"),
            Button::new("30s", "dur:30"),
            Button::new("Custom", "dur:custom"),
        ]);
    }

    for quality in &session.qualities {
        rows.push(vec![Button::new(
            &quality.label,
            format!("fmt:{}", quality.id),
        )]);
    }

    if session.state != SessionState::AwaitingCustomRange {
        let cap = suggested_max_clips(session.source_duration, max_clips);
        let row = (1..=cap)
            .map(|i| {
                let label = if i == 1 {
                    "1 clip".to_string()
                } else {
                    format!("{} clips", i)
                };
                Button::new(label, format!("count:{}", i))
            })
            .collect();
        rows.push(row);
    }

    let mut actions = Vec::new();
    if session.state == SessionState::Ready {
        actions.push(Button::new("Start", "submit"));
    }
    actions.push(Button::new("Download full video", "full"));
    actions.push(Button::new("Cancel", "cancel"));
    rows.push(actions);

    rows
}
