pub mod capture_worker;
pub mod detection_session;
pub mod frame_overlay;
pub mod infrastructure;
pub mod latest_frame;
pub mod pipeline_logger;
