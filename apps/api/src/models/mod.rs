pub mod awareness;
pub mod plan;
