pub mod algorithm;
pub mod nearest;
pub mod types;

pub use algorithm::AssignmentStrategy;
pub use nearest::NearestDriverAssignment;
pub use types::Assignment;
