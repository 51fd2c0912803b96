//! Selection predicates for list/watch filtering
//!
//! A [`SelectionPredicate`] joins a label selector, a field selector, and a per-kind
//! attribute projection into a single stateless filter.

use crate::error::Result;
use crate::object::Object;
use crate::{fields, labels};

/// Projects an object into its label set and selectable field set
pub type AttrFunc = fn(&dyn Object) -> Result<(labels::Set, fields::Set)>;

/// Label + field selector bound to a kind's attribute projection
#[derive(Debug, Clone)]
pub struct SelectionPredicate {
    pub label: labels::Selector,
    pub field: fields::Selector,
    pub get_attrs: AttrFunc,
}

impl SelectionPredicate {
    pub fn new(label: labels::Selector, field: fields::Selector, get_attrs: AttrFunc) -> Self {
        Self {
            label,
            field,
            get_attrs,
        }
    }

    /// Whether both selectors are unconstrained
    pub fn is_empty(&self) -> bool {
        self.label.is_empty() && self.field.is_empty()
    }

    /// Evaluate the predicate against one object
    ///
    /// An empty predicate matches without projecting the object.
    pub fn matches(&self, obj: &dyn Object) -> Result<bool> {
        if self.is_empty() {
            return Ok(true);
        }
        let (labels, fields) = (self.get_attrs)(obj)?;
        Ok(self.label.matches(&labels) && self.field.matches(&fields))
    }

    /// Object name this predicate is pinned to, if any
    pub fn matches_single(&self) -> Option<&str> {
        self.field.requires_exact_match("metadata.name")
    }

    /// Keep the objects that match, stopping at the first projection error
    pub fn filter<'a, T: Object>(&self, items: &'a [T]) -> Result<Vec<&'a T>> {
        let mut out = Vec::new();
        for item in items {
            if self.matches(item)? {
                out.push(item);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::downcast_ref;
    use crate::object::testing::{Gadget, Widget, widget};

    fn widget_attrs(obj: &dyn Object) -> Result<(labels::Set, fields::Set)> {
        let w = downcast_ref::<Widget>(obj)?;
        let labels = labels::Set::from(w.metadata.labels.as_ref());
        let mut fields = fields::Set::new();
        fields.insert("metadata.name", w.metadata.name.clone().unwrap_or_default());
        fields.insert("size", w.size.to_string());
        Ok((labels, fields))
    }

    #[test]
    fn test_empty_predicate_matches_everything() {
        let p = SelectionPredicate::new(
            labels::Selector::everything(),
            fields::Selector::everything(),
            widget_attrs,
        );
        assert!(p.matches(&widget("ns", "a")).unwrap());
        // No projection happens, so a foreign kind is not rejected
        assert!(p.matches(&Gadget::default()).unwrap());
    }

    #[test]
    fn test_field_predicate_filters() {
        let p = SelectionPredicate::new(
            labels::Selector::everything(),
            fields::Selector::everything().equals("metadata.name", "b"),
            widget_attrs,
        );
        let items = vec![widget("ns", "a"), widget("ns", "b"), widget("ns", "c")];
        let hits = p.filter(&items).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].metadata.name.as_deref(), Some("b"));
        assert_eq!(p.matches_single(), Some("b"));
    }

    #[test]
    fn test_label_predicate_filters() {
        let mut labelled = widget("ns", "a");
        labelled.metadata.labels = Some([("app".to_string(), "web".to_string())].into());
        let p = SelectionPredicate::new(
            labels::Selector::everything().with(labels::Requirement::equals("app", "web")),
            fields::Selector::everything(),
            widget_attrs,
        );
        assert!(p.matches(&labelled).unwrap());
        assert!(!p.matches(&widget("ns", "b")).unwrap());
    }

    #[test]
    fn test_projection_error_propagates() {
        let p = SelectionPredicate::new(
            labels::Selector::everything(),
            fields::Selector::everything().equals("size", "1"),
            widget_attrs,
        );
        let err = p.matches(&Gadget::default()).unwrap_err();
        assert!(matches!(err, crate::ApiError::TypeMismatch { .. }));
    }
}
