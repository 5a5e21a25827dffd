pub mod body;
pub mod store;

pub use body::Body;
pub use store::{BodyHandle, BodyStore};
