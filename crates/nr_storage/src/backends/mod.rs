pub mod csv_file;
pub mod memory;

pub use csv_file::CsvFeedbackStore;
pub use memory::MemoryFeedbackStore;
