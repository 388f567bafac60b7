//! Application layer for aivi.
//!
//! [`EditorSession`] applies abstract edit commands to the two buffers and
//! orchestrates AI exchanges between the domain, the revision manager and
//! the completion gateway.

pub mod command;
pub mod editor_session;
pub mod search;
pub mod state;

pub use command::EditCommand;
pub use editor_session::EditorSession;
pub use state::{BufferView, InputMode, SessionSnapshot, StatusMessage};
