//! # G2KY Test Suite
//!
//! Cross-capability flows run against a fully composed application.
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── support.rs      # Application fixture and HTTP helpers
//!     ├── speech.rs       # host mic ──▶ backend ──▶ VAD, storage
//!     ├── acquaintance.rs # face id ──▶ G2KY ──▶ chat UI, TTS
//!     └── lifecycle.rs    # Rollback and shutdown behaviour
//! ```
//!
//! ```bash
//! cargo test -p g2ky-tests
//! ```

pub mod integration;
