pub mod data;
pub mod errors;
pub mod etl;
pub mod path_finder;
