pub mod icons;
pub mod output;
pub mod progress;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{degraded, dim, error, header, listing, lookup_result, success, summary_row, warn};
pub use progress::Spinner;
pub use table::stats_table;
pub use theme::{color_enabled, theme, Theme};
