pub mod threaded_capture;
