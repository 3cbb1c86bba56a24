// src/world_map/error.rs
use super::rect::ViewRect;
use super::views::ViewId;

/// Why a submitted rectangle was refused.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RectIssue {
    #[error("width and height must be at least 1")]
    NonPositive,
    #[error("width or height exceeds the maximum extent of {max}")]
    TooLarge { max: i32 },
    #[error("rect extends past the i32 coordinate range")]
    Overflow,
}

/// Errors surfaced by the streaming engine. All of them are local to one
/// view; a frame always completes.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("view {view:?} submitted invalid rect {rect:?}: {issue}")]
    InvalidRect {
        view: ViewId,
        rect: ViewRect,
        issue: RectIssue,
    },
    #[error("view {0:?} is not registered")]
    UnknownView(ViewId),
}
