// ── Domain model ──

pub mod client;
pub mod dial_code;
pub mod draft;

pub use client::{ClientEntry, ClientRecord, CodeStatus};
pub use dial_code::DialCode;
pub use draft::ClientDraft;
