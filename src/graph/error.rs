//! Typed errors for graph operations.

use thiserror::Error;

/// The relationship field a dangling reference was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefField {
    Spouse,
    ExSpouse,
    Parent,
    Child,
    RootStack,
}

impl RefField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Spouse => "spouseId",
            Self::ExSpouse => "exSpouseIds",
            Self::Parent => "parentIds",
            Self::Child => "children",
            Self::RootStack => "rootIdStack",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A reference points at an id that is not present in the map.
    /// `person` is the record holding the bad reference (or the stack entry
    /// itself for [`RefField::RootStack`]).
    #[error("{person}: {} references missing person {missing}", .field.as_str())]
    Validation {
        person: String,
        field: RefField,
        missing: String,
    },

    /// The founder cannot be deleted.
    #[error("the founder of the tree cannot be removed")]
    ProtectedNode,

    /// An operation referenced an anchor id that does not exist. The UI
    /// never calls operations in this state.
    #[error("no such person: {0}")]
    NotFound(String),

    /// `add_parent` on a person who already has two parents.
    #[error("{0} already has two parents")]
    ParentSlotsFull(String),

    /// `add_sibling` on a person with no recorded parents.
    #[error("{0} has no parents to attach a sibling to")]
    MissingParents(String),
}
