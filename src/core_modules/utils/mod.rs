pub mod frame_reader;
pub mod image_helper;
pub mod text_mask;
