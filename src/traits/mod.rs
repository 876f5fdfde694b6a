pub mod source;
pub mod store;

pub use source::TaskSource;
pub use store::{StateStore, SubmitOutcome};
