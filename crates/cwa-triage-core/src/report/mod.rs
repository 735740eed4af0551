//! Case report composition and export.
//!
//! ```text
//! ReportRequest ──compose──▶ CaseReport ──render_lines──▶ [ReportLine]
//!                                                            │
//!                                          ┌─────────────────┼────────────────┐
//!                                          ▼                 ▼                ▼
//!                                         PDF               text             JSON
//! ```
//!
//! Every format renders from the same ordered line model, so the field order
//! of an exported document is fixed in one place ([`render_lines`]).

mod case_id;
mod composer;
mod document;
mod pdf;

pub use case_id::*;
pub use composer::*;
pub use document::*;
pub use pdf::render_pdf;
