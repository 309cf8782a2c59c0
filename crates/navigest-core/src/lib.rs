// navigest-core: client identity and contact canonicalization engine.
//
// Pure canonicalizers (phone, currency) at the leaves, the sequence
// allocator and reconciler above them, and `ClientDirectory` tying them to
// a `ClientStore`.

pub mod config;
pub mod currency;
pub mod debounce;
pub mod directory;
pub mod error;
pub mod model;
pub mod notify;
pub mod phone;
pub mod reconcile;
pub mod sequence;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{CodeFormat, DirectoryConfig};
pub use currency::{ZERO_CREDIT, format_credit, parse_credit};
pub use directory::{ClientDirectory, CodeAdjustment, LoadOutcome, SaveOutcome};
pub use error::{CoreError, ValidationError};
pub use notify::{CanonicalField, ChangeEvent, ListenerId};
pub use phone::{
    DialCodeCatalog, PhoneSplit, normalize_body, normalize_prefix, split_phone, strip_known_prefix,
};
pub use reconcile::{Reconciler, validate};
pub use sequence::SequenceAllocator;
pub use store::{ClientStore, MemoryStore, StoreError, WriteMode};
pub use stream::{ProjectionStream, ProjectionWatchStream};

pub use model::{ClientDraft, ClientEntry, ClientRecord, CodeStatus, DialCode};
