//! Revision & session manager.
//!
//! # Module Structure
//!
//! - `naming`: artifact paths derived from the canonical file and the
//!   directory scan that recovers the revision number
//! - `transcript`: append-only `.ctx` line format
//! - `subrevision`: per-exchange snapshots with a wrapping pointer
//! - `manager`: `RevisionManager`, the only component that writes files

mod manager;
mod naming;
mod subrevision;
mod transcript;

pub use manager::{ReadOutcome, ReadStatus, RevisionManager, WriteStatus};
pub use naming::RevisionNaming;
pub use subrevision::{StepDirection, Subrevision, SubrevisionLog};
pub use transcript::{TranscriptAction, format_transcript};
