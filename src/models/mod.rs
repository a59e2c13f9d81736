pub mod artifacts;
pub mod head;
pub mod order;
pub mod order_form;

pub use artifacts::{ArtifactLayout, ReceiptArtifact, SnapshotArtifact, SubmissionOutcome};
pub use head::resolve_head;
pub use order::OrderRecord;
