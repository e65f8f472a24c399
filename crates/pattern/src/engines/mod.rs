pub mod engine_a;
pub mod engine_b;
pub mod engine_c;

pub use engine_a::EngineA;
pub use engine_b::EngineB;
pub use engine_c::EngineC;
