pub mod models;
pub mod report;
pub mod shared;
pub mod submit;

pub mod prelude {
    pub use crate::models::prelude::*;
    pub use crate::report::prelude::*;
    pub use crate::shared::prelude::*;
    pub use crate::submit::prelude::*;
}
