pub mod cascade_resolver;
pub mod circle;
pub mod constants;
pub mod frame;
pub mod region;
