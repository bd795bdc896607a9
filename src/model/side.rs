//! Left/right eye selector.

use serde::{Deserialize, Serialize};

/// One of the two fundus images in a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Left eye image
    Left,
    /// Right eye image
    Right,
}

impl Side {
    /// Get the display name for this side.
    pub fn name(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }

    /// Both sides, left first.
    pub fn all() -> [Side; 2] {
        [Side::Left, Side::Right]
    }

    /// The opposite eye.
    pub fn other(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
