//! Session-level tests.
//!
//! These drive [`EditorSession`](super::EditorSession) the way the report
//! view does and check whole-state behavior across store, history and
//! interaction.

mod scenarios;

use super::EditorSession;
use crate::model::{Position, ReportId, Side, Tool};
use crate::persistence::ReportAnnotations;

/// A session with one empty report open.
fn open_session() -> EditorSession {
    let mut session = EditorSession::default();
    session
        .open_report(ReportId::new("report-1"), &ReportAnnotations::default())
        .expect("empty report opens");
    session
}

/// Draw one shape with `tool` from `from` to `to` on `side`, leaving the label pending.
fn draw(session: &mut EditorSession, tool: Tool, side: Side, from: (f64, f64), to: (f64, f64)) {
    session.set_tool(Some(tool));
    assert!(session.pointer_down(side, Position::new(from.0, from.1)));
    session.pointer_move(side, Position::new(to.0, to.1));
    session.pointer_up(side, Position::new(to.0, to.1));
    assert!(session.pending_label().is_some());
}
