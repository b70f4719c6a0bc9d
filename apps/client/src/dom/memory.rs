use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{Document, Navigator};

/// One element of the in-memory document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub tag: String,
    pub classes: BTreeSet<String>,
    pub attributes: BTreeMap<String, String>,
    pub styles: BTreeMap<String, String>,
    pub text: String,
    pub html: String,
    pub value: String,
    pub checked: bool,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn class(mut self, class: &str) -> Self {
        for c in class.split_whitespace() {
            self.classes.insert(c.to_string());
        }
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }
}

/// A document held entirely in memory. Used by the CLI driver and by tests.
#[derive(Debug, Default)]
pub struct MemoryDocument {
    elements: Mutex<BTreeMap<String, Element>>,
}

/// A panicked writer leaves the data as it was; keep using it.
fn recover<T>(lock: &Mutex<T>) -> MutexGuard<'_, T> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    fn elements(&self) -> MutexGuard<'_, BTreeMap<String, Element>> {
        recover(&self.elements)
    }

    pub fn with(self, id: &str, element: Element) -> Self {
        self.insert(id, element);
        self
    }

    pub fn insert(&self, id: &str, element: Element) {
        self.elements().insert(id.to_string(), element);
    }

    pub fn element(&self, id: &str) -> Option<Element> {
        self.elements().get(id).cloned()
    }

    fn update<F: FnOnce(&mut Element)>(&self, id: &str, f: F) -> bool {
        let mut elements = self.elements();
        match elements.get_mut(id) {
            Some(el) => {
                f(el);
                true
            }
            None => false,
        }
    }

    fn read<T, F: FnOnce(&Element) -> T>(&self, id: &str, f: F) -> Option<T> {
        self.elements().get(id).map(f)
    }
}

impl Document for MemoryDocument {
    fn exists(&self, id: &str) -> bool {
        self.read(id, |_| ()).is_some()
    }

    fn ensure(&self, id: &str, tag: &str) -> bool {
        let mut elements = self.elements();
        if elements.contains_key(id) {
            return false;
        }
        elements.insert(id.to_string(), Element::new(tag));
        true
    }

    fn remove(&self, id: &str) -> bool {
        self.elements().remove(id).is_some()
    }

    fn set_html(&self, id: &str, html: &str) -> bool {
        self.update(id, |el| {
            el.html = html.to_string();
            el.text.clear();
        })
    }

    fn html(&self, id: &str) -> Option<String> {
        self.read(id, |el| el.html.clone())
    }

    fn set_text(&self, id: &str, text: &str) -> bool {
        self.update(id, |el| {
            el.text = text.to_string();
            el.html.clear();
        })
    }

    fn text(&self, id: &str) -> Option<String> {
        self.read(id, |el| el.text.clone())
    }

    fn add_class(&self, id: &str, class: &str) -> bool {
        self.update(id, |el| {
            el.classes.insert(class.to_string());
        })
    }

    fn remove_class(&self, id: &str, class: &str) -> bool {
        self.update(id, |el| {
            el.classes.remove(class);
        })
    }

    fn has_class(&self, id: &str, class: &str) -> bool {
        self.read(id, |el| el.classes.contains(class)).unwrap_or(false)
    }

    fn set_attribute(&self, id: &str, name: &str, value: &str) -> bool {
        self.update(id, |el| {
            el.attributes.insert(name.to_string(), value.to_string());
        })
    }

    fn remove_attribute(&self, id: &str, name: &str) -> bool {
        self.update(id, |el| {
            el.attributes.remove(name);
        })
    }

    fn attribute(&self, id: &str, name: &str) -> Option<String> {
        self.read(id, |el| el.attributes.get(name).cloned()).flatten()
    }

    fn set_style(&self, id: &str, property: &str, value: &str) -> bool {
        self.update(id, |el| {
            el.styles.insert(property.to_string(), value.to_string());
        })
    }

    fn style(&self, id: &str, property: &str) -> Option<String> {
        self.read(id, |el| el.styles.get(property).cloned()).flatten()
    }

    fn value(&self, id: &str) -> Option<String> {
        self.read(id, |el| el.value.clone())
    }

    fn set_value(&self, id: &str, value: &str) -> bool {
        self.update(id, |el| el.value = value.to_string())
    }

    fn is_checked(&self, id: &str) -> Option<bool> {
        self.read(id, |el| el.checked)
    }

    fn ids_with_class(&self, class: &str) -> Vec<String> {
        self.elements()
            .iter()
            .filter(|(_, el)| el.classes.contains(class))
            .map(|(id, _)| id.clone())
            .collect()
    }

    fn ids_with_attribute(&self, name: &str, value: &str) -> Vec<String> {
        self.elements()
            .iter()
            .filter(|(_, el)| el.attributes.get(name).map(String::as_str) == Some(value))
            .map(|(id, _)| id.clone())
            .collect()
    }
}

/// Records redirects instead of performing them.
#[derive(Debug, Default)]
pub struct MemoryNavigator {
    visited: Mutex<Vec<String>>,
    hash: Mutex<String>,
}

impl MemoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at_hash(hash: &str) -> Self {
        let nav = Self::default();
        nav.set_hash(hash);
        nav
    }

    pub fn visited(&self) -> Vec<String> {
        recover(&self.visited).clone()
    }

    pub fn last_visited(&self) -> Option<String> {
        self.visited().last().cloned()
    }
}

impl Navigator for MemoryNavigator {
    fn navigate(&self, url: &str) {
        recover(&self.visited).push(url.to_string());
    }

    fn hash(&self) -> String {
        recover(&self.hash).clone()
    }

    fn set_hash(&self, hash: &str) {
        *recover(&self.hash) = hash.trim_start_matches('#').to_string();
    }
}
