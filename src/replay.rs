//! Scripted replay of recorded input events through an editing session.

use abdraw_session::{InputEvent, Outcome, Session, SessionConfig, Tool};
use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, warn};

/// One step of a recorded session: a tool switch or an input event
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ReplayStep {
    Tool { tool: Tool },
    Event(InputEvent),
}

/// Counts of what a replay did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub events: usize,
    pub committed: usize,
    pub undone: usize,
    pub redone: usize,
    pub cancelled: usize,
}

/// Parse a JSON array of replay steps
pub fn parse_steps(json: &str) -> Result<Vec<ReplayStep>> {
    serde_json::from_str(json).context("Invalid replay script")
}

/// Feed every step through the session. A gesture still open at the end is
/// discarded.
pub fn run(session: &mut Session, config: &mut SessionConfig, steps: &[ReplayStep]) -> ReplaySummary {
    let mut summary = ReplaySummary::default();
    for step in steps {
        let outcome = match step {
            ReplayStep::Tool { tool } => session.set_tool(config, *tool),
            ReplayStep::Event(event) => {
                summary.events += 1;
                session.handle_event(config, *event)
            }
        };
        debug!(?step, ?outcome, "replayed");
        match outcome {
            Outcome::Committed(_) => summary.committed += 1,
            Outcome::Undone(_) => summary.undone += 1,
            Outcome::Redone(_) => summary.redone += 1,
            Outcome::Cancelled => summary.cancelled += 1,
            Outcome::Ignored | Outcome::Updated => {}
        }
    }
    if !session.is_idle() {
        warn!(state = ?session.state(), "replay ended mid-gesture, discarding it");
        session.cancel_gesture();
        summary.cancelled += 1;
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use abdraw_core::ShapeType;

    const SCRIPT: &str = r#"[
        {"tool": "rectangle"},
        {"event": "pointer_down", "position": [0, 0]},
        {"event": "pointer_move", "position": [60, 40]},
        {"event": "pointer_up", "position": [60, 40]},
        {"tool": "orthoarrow"},
        {"event": "click", "position": [100, 100]},
        {"event": "click", "position": [200, 160]},
        {"event": "key_down", "key": "enter"},
        {"event": "key_down", "key": {"char": "z"}, "modifiers": {"ctrl": true}}
    ]"#;

    #[test]
    fn test_parse_mixed_steps() {
        let steps = parse_steps(SCRIPT).unwrap();
        assert_eq!(steps.len(), 9);
        assert_eq!(steps[0], ReplayStep::Tool { tool: Tool::Rectangle });
        assert_eq!(steps[1], ReplayStep::Event(InputEvent::down(0.0, 0.0)));
    }

    #[test]
    fn test_run_script() {
        let steps = parse_steps(SCRIPT).unwrap();
        let mut config = SessionConfig::default();
        let mut session = Session::new(&config);
        let summary = run(&mut session, &mut config, &steps);

        assert_eq!(summary.events, 7);
        assert_eq!(summary.committed, 2);
        assert_eq!(summary.undone, 1);
        assert_eq!(session.document().len(), 1);
        assert_eq!(session.document().shapes()[0].shape_type(), ShapeType::Rectangle);
        assert_eq!(config.tool, Tool::OrthoArrow);
    }

    #[test]
    fn test_open_gesture_is_discarded() {
        let steps = parse_steps(
            r#"[{"tool": "line"}, {"event": "pointer_down", "position": [0, 0]}]"#,
        )
        .unwrap();
        let mut config = SessionConfig::default();
        let mut session = Session::new(&config);
        let summary = run(&mut session, &mut config, &steps);
        assert_eq!(summary.cancelled, 1);
        assert!(session.is_idle());
        assert!(session.document().is_empty());
    }

    #[test]
    fn test_bad_script() {
        assert!(parse_steps(r#"[{"event": "teleport"}]"#).is_err());
    }
}
