// Global app shell: alerts, theme, shared markup helpers.

pub mod alerts;
pub mod markup;
pub mod theme;

pub use alerts::{AlertLevel, AlertSink, GlobalAlerts, InlineAlerts, LogAlerts, RecordingAlerts};
pub use theme::{MemoryThemeStore, Theme, ThemeController, ThemeStore};
