//! Application use cases for Brouhaha AR sessions.

pub mod ar_view_usecase;
pub mod session_archive;

pub use ar_view_usecase::{ArViewUseCase, EnterOutcome, ResumeCandidate};
pub use session_archive::SessionArchive;
