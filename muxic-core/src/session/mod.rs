pub mod capture_loop;
pub mod finalize;
pub mod stop_signal;
