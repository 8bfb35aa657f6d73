//! Attributed-text model adapter
//!
//! The editor core treats the text model as an external collaborator. This
//! module defines the vocabulary shared with it:
//!
//! - **Attributes:** closed tagged union of run attributes ([`TextAttributes`])
//! - **Runs:** the ordered `toDelta` output ([`AttributedRun`])
//! - **Contract:** [`TextModel`] with transactional mutations and observers
//! - **Reference model:** [`SharedText`], rope-backed and single-threaded

mod attributes;
mod memory;
mod run;
mod text;

pub use attributes::{TextAttributes, TextStyle};
pub use memory::SharedText;
pub use run::{
    attributes_at, delta_len, delta_to_string, utf16_len, AttributedRun, ZERO_WIDTH_SPACE,
};
pub use text::{
    ChangeCallback, FormatMode, ModelHandle, ObserverId, Subscription, TextChange, TextModel,
    TextOp,
};
