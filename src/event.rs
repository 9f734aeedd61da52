/// Events that can occur in the application.
/// Key handlers return these instead of mutating app state directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    // Navigation
    CursorUp,
    CursorDown,
    PageUp,
    PageDown,
    JumpHead,
    Follow,
    ScrollLeft,
    ScrollRight,
    NextMatch,
    PrevMatch,

    // Marks and filtering
    ToggleMark,
    UnmarkAll,
    MarkMatches,
    FilterMarked,
    FilterUnmarked,
    RestoreOrigin,

    // Detail panel and overlays
    CycleDetail,
    ShowHelp,
    HideHelp,

    // Query mode
    StartSearch,
    QueryChar(char),
    QueryBackspace,
    QueryCaretLeft,
    QueryCaretRight,
    QueryHistoryUp,
    QueryHistoryDown,
    QueryHistoryLast,
    QuerySubmit,

    // Clipboard
    CopyLine,
    CopyMarked,

    // System
    Resize,
    Quit,
}
