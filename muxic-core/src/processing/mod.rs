pub mod meter;
pub mod sample_convert;
pub mod visualizer;
pub mod wav_format;
