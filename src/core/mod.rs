pub mod data_url;
pub mod edit;
pub mod error;
pub mod session;

pub use data_url::DataUrl;
pub use edit::{EditRequest, EditResult, VINTAGE_PROMPT};
pub use error::VintageError;
pub use session::Session;
