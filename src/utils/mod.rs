pub mod history;
pub mod vecops;

pub use history::{History, IterRecord};
