pub mod error;
pub mod log;

pub use error::{StyleMountError, StyleMountResult};

pub mod prelude {
    pub use crate::error::{StyleMountError, StyleMountResult};
    pub use crate::log::*;
}
