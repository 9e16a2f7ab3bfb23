mod device;
mod session;

pub use chardev_buffer::{CAPACITY, GREETING, SharedBuffer, WriteOutcome};
pub use device::CharDevice;
pub use session::{DeviceSession, SessionId};
