pub mod gate;
pub mod store;

pub use gate::CooldownGate;
pub use store::JsonStateStore;
