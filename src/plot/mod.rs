//! Text rendering of assembled trends.

pub mod ascii;

pub use ascii::render_trend_plot;
