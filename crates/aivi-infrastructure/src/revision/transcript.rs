use strum::Display;

/// What produced a transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TranscriptAction {
    /// Command lines recorded by an explicit save
    Write,
    /// Text sent to the completion service
    Query,
    /// Text received from it
    Reply,
}

/// Formats `lines` as `NNN<[viewpoint][Action]text`, numbered from 0 like
/// the editor gutter.
pub fn format_transcript<S: AsRef<str>>(
    action: TranscriptAction,
    viewpoint: &str,
    lines: &[S],
) -> Vec<String> {
    lines
        .iter()
        .enumerate()
        .map(|(number, line)| format!("{number:03}<[{viewpoint}][{action}]{}", line.as_ref()))
        .collect()
}
