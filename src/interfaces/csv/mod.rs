pub mod command_reader;
pub mod rental_writer;
