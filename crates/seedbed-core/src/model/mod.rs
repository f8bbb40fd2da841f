pub mod job;
pub mod row;
pub mod saved;
pub mod seed;
pub mod weed;

pub use job::{Job, Payload};
pub use row::{Row, MODEL_KEY};
pub use saved::{SaveStatus, SavedItem};
pub use seed::{SeedContext, SeedOrigin};
pub use weed::Weed;
