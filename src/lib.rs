pub mod config;
pub mod consts;
pub mod context;
pub mod core_types;
pub mod disorder;
pub mod error;
pub mod geometry;
pub mod hamiltonian;
pub mod hopping;
pub mod orchestrator;
pub mod pipeline;
pub mod store;
// cmd and reports belong to the binary (main.rs).
