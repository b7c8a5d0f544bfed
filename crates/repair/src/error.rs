use markup::TreePath;

/// Failure modes of the repair pipeline.
///
/// Everything except `FragmentDetached` is scoped to a single fragment piece
/// and ends up in [`crate::engine::Repair::unresolved`] rather than aborting
/// the whole repair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RepairError {
    /// The fragment node does not belong to the old page's tree.
    FragmentDetached,
    /// A fragment leaf has no exact counterpart in the reference tree.
    NoExactMatch { path: TreePath },
    /// No occurrence of the piece's content exists in the new page.
    VanishedContent { path: TreePath },
    /// The assignment left the piece's occurrence without a partner.
    Unassigned { path: TreePath },
    /// A replayed rule's source path does not resolve in the new page.
    MissingTarget { path: TreePath },
    /// A replayed rule's fragment path does not resolve in the fragment,
    /// usually because an earlier rule replaced one of its ancestors.
    DanglingRule { path: TreePath },
}

impl std::fmt::Display for RepairError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepairError::FragmentDetached => {
                write!(f, "fragment node is not part of the old page tree")
            }
            RepairError::NoExactMatch { path } => {
                write!(f, "no exact match for fragment piece at {path:?}")
            }
            RepairError::VanishedContent { path } => {
                write!(f, "content of piece at {path:?} no longer occurs in the new page")
            }
            RepairError::Unassigned { path } => {
                write!(f, "no occurrence assignment for piece at {path:?}")
            }
            RepairError::MissingTarget { path } => {
                write!(f, "rule target {path:?} does not resolve in the new page")
            }
            RepairError::DanglingRule { path } => {
                write!(f, "rule path {path:?} does not resolve in the fragment")
            }
        }
    }
}

impl std::error::Error for RepairError {}
