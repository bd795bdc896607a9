//! Commands accepted by the editor session.
//!
//! Every UI event the editor reacts to is one [`EditorMessage`]. Messages are
//! serializable so that recorded sessions can be replayed:
//!
//! ```json
//! [
//!   {"command": "set_tool", "tool": "rectangle"},
//!   {"command": "pointer_down", "side": "left", "x": 10, "y": 20},
//!   {"command": "pointer_up", "side": "left", "x": 40, "y": 60},
//!   {"command": "submit_label", "label": "drusen"}
//! ]
//! ```

use serde::{Deserialize, Serialize};

use crate::model::{AnnotationId, AnnotationPatch, Position, ReportId, Side, Tool};
use crate::persistence::SaveToken;

/// Messages that can be sent to update editor state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum EditorMessage {
    // Reports
    /// Make an already loaded report the active one
    SwitchReport { report_id: ReportId },
    /// Drop a report's in-memory state
    CloseReport { report_id: ReportId },

    // Tools
    /// Select a drawing tool; `null` disables drawing
    SetTool { tool: Option<Tool> },
    /// Image size of a side, in image pixels
    SetCanvasBounds { side: Side, width: f64, height: f64 },
    /// Forget a side's image size (image unloaded)
    ClearCanvasBounds { side: Side },

    // Pointer
    /// Pointer pressed over a side's canvas
    PointerDown { side: Side, x: f64, y: f64 },
    /// Pointer moved over a side's canvas
    PointerMove { side: Side, x: f64, y: f64 },
    /// Pointer released over a side's canvas
    PointerUp { side: Side, x: f64, y: f64 },

    // Label entry
    /// Label dialog confirmed
    SubmitLabel { label: String },
    /// Label dialog dismissed
    CancelLabel,

    // Editing
    /// Undo last change on a side
    Undo { side: Side },
    /// Redo previously undone change on a side
    Redo { side: Side },
    /// Clear both sides and all history
    ResetAll,
    /// Patch an annotation's label, style or geometry
    UpdateAnnotation {
        side: Side,
        id: AnnotationId,
        patch: AnnotationPatch,
    },
    /// Remove an annotation
    DeleteAnnotation { side: Side, id: AnnotationId },

    // Saving
    /// The save payload taken at `token` was accepted by the server
    MarkSaved { token: SaveToken },
    /// The save request failed
    MarkSaveFailed { reason: String },
}

impl EditorMessage {
    /// Pointer position carried by pointer messages.
    pub fn position(&self) -> Option<Position> {
        match self {
            EditorMessage::PointerDown { x, y, .. }
            | EditorMessage::PointerMove { x, y, .. }
            | EditorMessage::PointerUp { x, y, .. } => Some(Position::new(*x, *y)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script() {
        let json = r#"[
            {"command": "set_tool", "tool": "oval"},
            {"command": "set_tool", "tool": null},
            {"command": "pointer_move", "side": "right", "x": 1.5, "y": 2},
            {"command": "cancel_label"},
            {"command": "update_annotation", "side": "left", "id": "a",
             "patch": {"label": "cup", "geometry": {"type": "oval", "radiusX": 4}}}
        ]"#;
        let messages: Vec<EditorMessage> = serde_json::from_str(json).expect("valid script");

        assert_eq!(messages[0], EditorMessage::SetTool { tool: Some(Tool::Oval) });
        assert_eq!(messages[1], EditorMessage::SetTool { tool: None });
        assert_eq!(messages[2].position(), Some(Position::new(1.5, 2.0)));
        assert_eq!(messages[3], EditorMessage::CancelLabel);
        assert!(matches!(
            &messages[4],
            EditorMessage::UpdateAnnotation {
                side: Side::Left,
                patch,
                ..
            } if patch.label.as_deref() == Some("cup")
        ));
    }

    #[test]
    fn test_unknown_command_rejected() {
        let result: Result<EditorMessage, _> = serde_json::from_str(r#"{"command": "fly"}"#);
        assert!(result.is_err());
    }
}
