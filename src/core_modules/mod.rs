pub mod background_model;
pub mod classifier;
pub mod frame_state;
pub mod pmf;
pub mod quantizer;
pub mod smoother;
pub mod utils;
