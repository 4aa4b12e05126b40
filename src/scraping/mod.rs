pub mod browser_manager;
pub mod detail;
pub mod grid;
pub mod parse;
pub mod photo;
pub mod search_form;
pub mod session;

pub use session::{PortalSession, SessionError, SessionOptions};
