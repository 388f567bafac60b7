use aivi_core::buffer::Direction;
use aivi_infrastructure::revision::StepDirection;

/// The abstract command surface of an [`EditorSession`](crate::EditorSession).
///
/// Front ends decode keys or typed input into these; the session never sees
/// raw key codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    InsertChar(char),
    /// Backspace; at column 0 joins with the previous line.
    DeleteChar,
    /// Splits the line; the text before the cursor is queued as a pending
    /// user line.
    Newline,
    Move(Direction),
    SwitchBuffer,
    TriggerExchange,
    AdvanceViewpoint,
    /// Activates a viewpoint by name, hidden ones included.
    SelectViewpoint(String),
    Save,
    Load,
    StepSubrevision(StepDirection),
    ToggleCompare,
    DeleteLine,
    MarkLine,
    MarkAndAdvance,
    YankMarked,
    Paste,
    Search,
    SearchNext,
    SearchPrev,
}
