//! In-memory visual surface.
//!
//! The surface is a flat arena of elements with parent links, styled with a
//! small set of inline properties. Effects create, restyle and remove
//! elements; the renderer paints them in creation order. Root attributes
//! can be observed through explicit [`Subscription`]s.

use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

use crate::geometry::Point;

/// Root attribute carrying the current theme.
pub const THEME_ATTRIBUTE: &str = "data-theme";

/// Identifier of an element on a [`Surface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u64);

/// Inline style of an element.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementStyle {
    /// Left edge in pixels.
    pub left: f32,
    /// Top edge in pixels.
    pub top: f32,
    pub width: f32,
    pub height: f32,
    /// Fill or text color, as a CSS-like color string.
    pub color: Option<String>,
    pub border_color: Option<String>,
    /// Opacity (0.0 - 1.0).
    pub opacity: f32,
    /// Translation applied on top of `left` / `top`.
    pub translate: Point,
    pub scale: f32,
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: 0.0,
            height: 0.0,
            color: None,
            border_color: None,
            opacity: 1.0,
            translate: Point::ZERO,
            scale: 1.0,
        }
    }
}

impl ElementStyle {
    /// Center of the element's box after translation.
    pub fn center(&self) -> Point {
        Point::new(
            self.left + self.width / 2.0 + self.translate.x,
            self.top + self.height / 2.0 + self.translate.y,
        )
    }
}

/// A single element.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    id: ElementId,
    parent: Option<ElementId>,
    /// Unique name, the equivalent of an HTML `id` attribute.
    name: Option<String>,
    classes: Vec<String>,
    pub style: ElementStyle,
    pub text: String,
}

impl Element {
    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Add a class if not already present.
    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }
}

/// A change to a root attribute, delivered to subscriptions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub attribute: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

/// Handle to an attribute observation registered on a [`Surface`].
///
/// Records queue up until taken with [`Surface::take_records`]. The
/// subscription must be handed back with [`Surface::detach`] at teardown.
#[derive(Debug, PartialEq, Eq)]
pub struct Subscription {
    id: u64,
}

#[derive(Debug)]
struct Subscriber {
    filter: Vec<String>,
    records: Vec<MutationRecord>,
}

/// The element tree every effect draws into.
#[derive(Debug, Default)]
pub struct Surface {
    next_id: u64,
    elements: BTreeMap<ElementId, Element>,
    /// Parent to direct children, kept in step with `elements`.
    children: BTreeMap<ElementId, BTreeSet<ElementId>>,
    attributes: BTreeMap<String, String>,
    next_subscription: u64,
    subscribers: BTreeMap<u64, Subscriber>,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new element under `parent` (or at top level).
    ///
    /// Returns `None` if the parent does not exist.
    pub fn append(&mut self, parent: Option<ElementId>, classes: &[&str]) -> Option<ElementId> {
        if let Some(p) = parent
            && !self.elements.contains_key(&p)
        {
            return None;
        }

        let id = ElementId(self.next_id);
        self.next_id += 1;
        self.elements.insert(
            id,
            Element {
                id,
                parent,
                name: None,
                classes: classes.iter().map(|c| c.to_string()).collect(),
                style: ElementStyle::default(),
                text: String::new(),
            },
        );
        if let Some(p) = parent {
            self.children.entry(p).or_default().insert(id);
        }
        Some(id)
    }

    /// Append a new element with a unique name.
    ///
    /// Returns `None` if the parent is missing or the name is taken.
    pub fn append_named(
        &mut self,
        parent: Option<ElementId>,
        name: &str,
        classes: &[&str],
    ) -> Option<ElementId> {
        if self.find_by_name(name).is_some() {
            return None;
        }
        let id = self.append(parent, classes)?;
        if let Some(el) = self.elements.get_mut(&id) {
            el.name = Some(name.to_string());
        }
        Some(id)
    }

    /// Remove an element and all of its descendants.
    ///
    /// Returns `false` if the element was already gone.
    pub fn remove(&mut self, id: ElementId) -> bool {
        let Some(element) = self.elements.remove(&id) else {
            return false;
        };
        if let Some(parent) = element.parent
            && let Some(siblings) = self.children.get_mut(&parent)
        {
            siblings.remove(&id);
        }
        let mut pending = vec![id];
        while let Some(parent) = pending.pop() {
            for child in self.children.remove(&parent).unwrap_or_default() {
                self.elements.remove(&child);
                pending.push(child);
            }
        }
        trace!(?id, "element removed");
        true
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(&id)
    }

    /// Find an element by its unique name.
    pub fn find_by_name(&self, name: &str) -> Option<ElementId> {
        self.elements
            .values()
            .find(|el| el.name() == Some(name))
            .map(Element::id)
    }

    /// All elements carrying `class`, in creation order.
    pub fn find_by_class(&self, class: &str) -> Vec<ElementId> {
        self.elements
            .values()
            .filter(|el| el.has_class(class))
            .map(Element::id)
            .collect()
    }

    /// Direct children of `parent`, in creation order.
    pub fn children(&self, parent: ElementId) -> Vec<ElementId> {
        self.children
            .get(&parent)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Every element in paint order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Read a root attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Set a root attribute and notify matching subscriptions.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        let old_value = self.attributes.insert(name.to_string(), value.to_string());
        let record = MutationRecord {
            attribute: name.to_string(),
            old_value,
            new_value: Some(value.to_string()),
        };
        for sub in self.subscribers.values_mut() {
            if sub.filter.iter().any(|f| f == name) {
                sub.records.push(record.clone());
            }
        }
    }

    /// Start observing the given root attributes.
    pub fn observe(&mut self, attributes: &[&str]) -> Subscription {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.subscribers.insert(
            id,
            Subscriber {
                filter: attributes.iter().map(|a| a.to_string()).collect(),
                records: Vec::new(),
            },
        );
        Subscription { id }
    }

    /// Drain the records queued for a subscription.
    pub fn take_records(&mut self, subscription: &Subscription) -> Vec<MutationRecord> {
        self.subscribers
            .get_mut(&subscription.id)
            .map(|sub| std::mem::take(&mut sub.records))
            .unwrap_or_default()
    }

    /// Stop observing. Pending records are dropped.
    pub fn detach(&mut self, subscription: Subscription) {
        self.subscribers.remove(&subscription.id);
    }

    /// Number of live subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.subscribers.len()
    }
}
