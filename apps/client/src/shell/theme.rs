use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::dom::Document;

pub const ROOT_ELEMENT: &str = "html";
pub const THEME_TOGGLE: &str = "theme-toggle";
pub const THEME_TOGGLE_ICON: &str = "theme-toggle-icon";
const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Anything other than `"dark"` reads as light.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("dark") {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// The one piece of client-side persistence: the theme flag.
pub trait ThemeStore: Send + Sync {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&self, key: &str, value: &str);
}

#[derive(Debug, Default)]
pub struct MemoryThemeStore {
    value: Mutex<Option<String>>,
}

impl ThemeStore for MemoryThemeStore {
    fn load(&self, _key: &str) -> Option<String> {
        self.value.lock().ok().and_then(|v| v.clone())
    }

    fn save(&self, _key: &str, value: &str) {
        if let Ok(mut slot) = self.value.lock() {
            *slot = Some(value.to_string());
        }
    }
}

pub struct ThemeController {
    document: Arc<dyn Document>,
    store: Arc<dyn ThemeStore>,
    current: Mutex<Theme>,
}

impl ThemeController {
    pub fn new(document: Arc<dyn Document>, store: Arc<dyn ThemeStore>) -> Self {
        Self {
            document,
            store,
            current: Mutex::new(Theme::Light),
        }
    }

    /// Applies the saved theme (light when nothing is saved).
    pub fn init(&self) -> Theme {
        let theme = self
            .store
            .load(THEME_KEY)
            .map(|raw| Theme::parse(&raw))
            .unwrap_or(Theme::Light);
        self.apply(theme);
        theme
    }

    pub fn current(&self) -> Theme {
        self.current.lock().map(|t| *t).unwrap_or(Theme::Light)
    }

    pub fn toggle(&self) -> Theme {
        let next = self.current().flipped();
        self.store.save(THEME_KEY, next.as_str());
        self.apply(next);
        debug!("Theme switched to {}", next.as_str());
        next
    }

    fn apply(&self, theme: Theme) {
        if let Ok(mut current) = self.current.lock() {
            *current = theme;
        }
        self.document
            .set_attribute(ROOT_ELEMENT, "data-bs-theme", theme.as_str());

        let dark = theme == Theme::Dark;
        self.document.set_attribute(
            THEME_TOGGLE_ICON,
            "class",
            if dark { "fas fa-sun" } else { "fas fa-moon" },
        );
        self.document
            .set_style(THEME_TOGGLE_ICON, "color", if dark { "#ffa500" } else { "#333" });
        self.document.set_style(
            THEME_TOGGLE,
            "background-color",
            if dark { "#454d55" } else { "#f8f9fa" },
        );
        self.document.set_style(
            THEME_TOGGLE,
            "border-color",
            if dark { "#6c757d" } else { "#dee2e6" },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Element, MemoryDocument};

    fn setup() -> (Arc<MemoryDocument>, Arc<MemoryThemeStore>, ThemeController) {
        let doc = Arc::new(
            MemoryDocument::new()
                .with(ROOT_ELEMENT, Element::new("html"))
                .with(THEME_TOGGLE, Element::new("button"))
                .with(THEME_TOGGLE_ICON, Element::new("i")),
        );
        let store = Arc::new(MemoryThemeStore::default());
        let controller = ThemeController::new(doc.clone(), store.clone());
        (doc, store, controller)
    }

    #[test]
    fn test_init_defaults_to_light() {
        let (doc, _, controller) = setup();
        assert_eq!(controller.init(), Theme::Light);
        assert_eq!(doc.attribute(ROOT_ELEMENT, "data-bs-theme").unwrap(), "light");
        assert_eq!(doc.attribute(THEME_TOGGLE_ICON, "class").unwrap(), "fas fa-moon");
    }

    #[test]
    fn test_init_restores_saved_theme() {
        let (doc, store, controller) = setup();
        store.save(THEME_KEY, "dark");
        assert_eq!(controller.init(), Theme::Dark);
        assert_eq!(doc.attribute(ROOT_ELEMENT, "data-bs-theme").unwrap(), "dark");
    }

    #[test]
    fn test_toggle_persists_and_swaps_icon() {
        let (doc, store, controller) = setup();
        controller.init();

        assert_eq!(controller.toggle(), Theme::Dark);
        assert_eq!(store.load(THEME_KEY).as_deref(), Some("dark"));
        assert_eq!(doc.attribute(THEME_TOGGLE_ICON, "class").unwrap(), "fas fa-sun");

        assert_eq!(controller.toggle(), Theme::Light);
        assert_eq!(store.load(THEME_KEY).as_deref(), Some("light"));
    }

    #[test]
    fn test_unknown_saved_value_reads_as_light() {
        assert_eq!(Theme::parse("solarized"), Theme::Light);
        assert_eq!(Theme::parse(" DARK "), Theme::Dark);
    }
}
