pub mod device;
pub mod interface;
pub mod pod;

pub use device::{Device, Role};
pub use interface::{Direction, LogicalInterface, PhysicalInterface};
pub use pod::{Pod, PodDescription};
