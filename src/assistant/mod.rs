pub mod pipeline;

pub use pipeline::{Assistant, Decision, PreparedCommand};
