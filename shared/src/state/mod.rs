pub mod collection;
pub mod graph;
pub mod instance;
pub mod value;
