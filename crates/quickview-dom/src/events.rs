//! Events and mutation records broadcast by a [`Document`](crate::Document).

use indextree::NodeId;

/// Kinds of user events the configurator listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomEventKind {
    /// A form control's selection changed through user interaction.
    Change,
    /// A form was submitted.
    Submit,
}

/// A user event, delivered to document-level (delegated) listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomEvent {
    pub kind: DomEventKind,
    pub target: NodeId,
}

/// A structural or layout change.
///
/// Form-control state (checked, selected) does not produce records, as with
/// browser mutation observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationRecord {
    /// Children were added to or removed from `target`.
    ChildList { target: NodeId },
    /// An attribute of `target` changed.
    Attribute { target: NodeId, name: String },
    /// The document's content height changed.
    Resize { height: u32 },
}
