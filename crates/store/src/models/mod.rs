pub mod lock;
pub mod part;
pub mod transition;

pub use lock::{Lock, LockInfo};
pub use part::{CreatePartRequest, PartRecord, UpdatePartFields};
pub use transition::Transition;
