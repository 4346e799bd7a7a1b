pub mod sheroot;
pub mod traits;
pub mod types;

pub use sheroot::SherootSource;
pub use traits::DocumentSource;
pub use types::{FetchOutcome, SourceDocument};
