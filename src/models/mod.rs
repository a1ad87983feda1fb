pub mod fleet;
pub mod flight;
pub mod maintenance;
pub mod time;

pub use fleet::*;
pub use flight::*;
pub use maintenance::*;
pub use time::*;
