//! Session domain module.
//!
//! - `model`: sessions, generations and videos
//! - `store`: persistence trait for the whole session mapping

mod model;
mod store;

pub use model::{Generation, Session, Video, VideoStatus, default_session_name, new_id};
pub use store::{SessionMap, SessionStore};
