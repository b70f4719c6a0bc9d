//! Document seam. Controllers address elements by id only; a missing element
//! turns every mutation into a silent no-op (the method returns `false`),
//! so one absent section never breaks the rest of the page.

pub mod memory;

pub use memory::{Element, MemoryDocument, MemoryNavigator};

/// The subset of DOM operations the controllers rely on.
pub trait Document: Send + Sync {
    fn exists(&self, id: &str) -> bool;

    /// Creates an element if it does not exist yet. Returns `true` if created.
    fn ensure(&self, id: &str, tag: &str) -> bool;

    fn remove(&self, id: &str) -> bool;

    fn set_html(&self, id: &str, html: &str) -> bool;
    fn html(&self, id: &str) -> Option<String>;

    fn set_text(&self, id: &str, text: &str) -> bool;
    fn text(&self, id: &str) -> Option<String>;

    fn add_class(&self, id: &str, class: &str) -> bool;
    fn remove_class(&self, id: &str, class: &str) -> bool;
    fn has_class(&self, id: &str, class: &str) -> bool;

    fn set_attribute(&self, id: &str, name: &str, value: &str) -> bool;
    fn remove_attribute(&self, id: &str, name: &str) -> bool;
    fn attribute(&self, id: &str, name: &str) -> Option<String>;

    fn set_style(&self, id: &str, property: &str, value: &str) -> bool;
    fn style(&self, id: &str, property: &str) -> Option<String>;

    fn value(&self, id: &str) -> Option<String>;
    fn set_value(&self, id: &str, value: &str) -> bool;
    fn is_checked(&self, id: &str) -> Option<bool>;

    /// Ids of every element carrying `class`, in id order.
    fn ids_with_class(&self, class: &str) -> Vec<String>;

    /// Ids of every element whose attribute `name` equals `value`.
    fn ids_with_attribute(&self, name: &str, value: &str) -> Vec<String>;

    fn show(&self, id: &str) -> bool {
        self.remove_class(id, "d-none")
    }

    fn hide(&self, id: &str) -> bool {
        self.add_class(id, "d-none")
    }

    fn set_disabled(&self, id: &str, disabled: bool) -> bool {
        if disabled {
            self.set_attribute(id, "disabled", "disabled")
        } else {
            self.remove_attribute(id, "disabled")
        }
    }

    /// Trimmed input value; absent elements read as empty.
    fn trimmed_value(&self, id: &str) -> String {
        self.value(id).map(|v| v.trim().to_string()).unwrap_or_default()
    }
}

/// Page navigation: full redirects and the URL fragment.
pub trait Navigator: Send + Sync {
    fn navigate(&self, url: &str);
    fn hash(&self) -> String;
    fn set_hash(&self, hash: &str);
}
