mod controller;
mod device_type;
mod led;
mod mode;
mod zone;

pub use controller::*;
pub use device_type::*;
pub use led::*;
pub use mode::*;
pub use zone::*;
