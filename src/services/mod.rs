pub mod analysis;
pub mod classifier;
pub mod db;
pub mod history;
pub mod verdict;
