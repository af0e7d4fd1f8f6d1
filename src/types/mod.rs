pub mod portal_data;
pub mod response;

pub use portal_data::*;
pub use response::{Page, TokenResponse};
