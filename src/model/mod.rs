mod contribution;
mod presence;

pub use contribution::*;
pub use presence::*;
