use crate::attribute::{Attribute, AttributeChange};

/// Observer attached to a single component. All methods default to no-ops.
///
/// Calls happen synchronously from inside the mutation, after the change is
/// applied (before it, for removal).
pub trait ComponentListener {
    fn attribute_changed(&mut self, _attribute: &Attribute, _change: AttributeChange) {}

    fn attribute_added(&mut self, _attribute: &Attribute, _change: AttributeChange) {}

    fn attribute_about_to_be_removed(&mut self, _attribute: &Attribute, _change: AttributeChange) {}
}
