//! Human-readable SKY category paths.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Category paths as shown in the SKY catalogue, mapped to category ids.
pub static CATEGORY_PATHS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([(
        "/Routine/Local Model/COSMO 3 DE/Main Run/Forecast",
        "c3_main_fc_rout",
    )])
});

/// The category id for a catalogue path, if known.
pub fn category_for_path(path: &str) -> Option<&'static str> {
    CATEGORY_PATHS.get(path.trim_end_matches('/')).copied()
}
