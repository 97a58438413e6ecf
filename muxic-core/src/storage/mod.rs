pub mod metadata;
pub mod track_writer;
