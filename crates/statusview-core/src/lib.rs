pub mod error;
pub mod health;
pub mod lifecycle;
pub mod metrics;
pub mod normalize;
pub mod record;
pub mod state;
pub mod view;

pub use error::StatusviewError;
pub use health::HealthClass;
pub use record::ProjectRecord;
pub use state::{reduce, ClickOrigin, Effect, TabId, Transition, UiEvent, ViewerState};
pub use view::{build_table, TableView};
