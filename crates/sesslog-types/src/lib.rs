pub mod error;
pub mod filter;
pub mod record;
pub mod time;

pub use error::{Error, Result};
pub use filter::*;
pub use record::*;
pub use time::*;
