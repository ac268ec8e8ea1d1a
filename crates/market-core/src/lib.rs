pub mod error;
pub mod range;
pub mod traits;
pub mod types;

pub use error::*;
pub use range::*;
pub use traits::*;
pub use types::*;
