pub mod command_reader;
pub mod directory_reader;
pub mod report_writer;
