mod outcome;
mod shared_buffer;

pub use outcome::WriteOutcome;
pub use shared_buffer::{CAPACITY, GREETING, SharedBuffer};
