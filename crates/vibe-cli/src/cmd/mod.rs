pub mod check;
pub mod dashboard;
pub mod progress;
pub mod stats;
pub mod track;
