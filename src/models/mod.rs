mod item;
mod movie;
mod session;
mod vector;

pub use item::{ExclusionSet, FeedbackEvent, ItemId, Watchlist};
pub use movie::{MovieDetails, MovieRecord};
pub use session::{SessionPhase, SessionSnapshot, SessionSummary};
pub use vector::FeatureVector;
