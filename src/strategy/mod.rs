//! Pure forecast analysis.

pub mod rain_window;

pub use rain_window::select_peak;
