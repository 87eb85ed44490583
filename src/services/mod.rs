pub mod aggregator;
pub mod fanout;
pub mod handoff;
pub mod providers;
pub mod session;
pub mod sort;
pub mod suggestions;

pub use aggregator::aggregate;
pub use handoff::{Handoff, ResultHandoff};
pub use providers::{CatalogProvider, TmdbProvider};
pub use session::{SearchSession, SessionRegistry};
pub use sort::sort_by;
pub use suggestions::{SuggestionController, SuggestionState};
