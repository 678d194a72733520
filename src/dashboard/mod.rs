pub mod assembler;
pub mod pipeline;
pub mod selector;

pub use pipeline::{DashboardPipeline, DashboardView};
pub use selector::{resolve, DashboardQuery};
