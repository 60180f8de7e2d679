//! # EHR Vault Test Suite
//!
//! Cross-component scenarios run against the in-process collaborators of
//! `ehr-runtime`.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── harness.rs          # Deployment + patient/doctor fixture
//!     ├── record_flows.rs     # creation, consent, redaction
//!     └── access_flows.rs     # request, approval, expiry, cancellation
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ehr-tests
//! cargo test -p ehr-tests integration::access_flows::
//! ```

pub mod integration;
