//! Visibility/depth algebra for scope construction.
//!
//! Every scope carries two independent budgets — one for inherited content,
//! one for imported content. A budget is a [`VisibilityTier`]: a visibility
//! ceiling, a remaining depth at that ceiling, and an optional next tier to
//! switch to when the depth is spent (defaulting to public-only, unlimited).
//! Ceilings only ever tighten as scopes nest: a member can stop being
//! visible at some depth, never start.

use std::rc::Rc;

use crate::model::Visibility;

/// Depth budget; `None` is unlimited.
pub type Depth = Option<u32>;

/// One tier of a visibility budget.
#[derive(Debug, Clone)]
pub struct VisibilityTier {
    /// Members with visibility <= this ceiling are admitted.
    pub visibility: Visibility,
    /// Remaining scope-construction steps at this ceiling.
    pub depth: Depth,
    /// Tier to switch to when `depth` reaches zero.
    pub next: Option<Rc<VisibilityTier>>,
}

impl VisibilityTier {
    pub fn unlimited(visibility: Visibility) -> Self {
        Self {
            visibility,
            depth: None,
            next: None,
        }
    }

    pub fn levels(visibility: Visibility, depth: u32, next: VisibilityTier) -> Self {
        Self {
            visibility,
            depth: Some(depth),
            next: Some(Rc::new(next)),
        }
    }

    /// Does the ceiling admit a member of the given visibility?
    pub fn admits(&self, visibility: Visibility) -> bool {
        visibility <= self.visibility
    }

    /// The budget one scope level down: depth decrements; at zero the tier
    /// switches to `next` (public-only unlimited when absent).
    pub fn step(&self) -> VisibilityTier {
        match self.depth {
            None => self.clone(),
            Some(d) if d > 1 => VisibilityTier {
                visibility: self.visibility,
                depth: Some(d - 1),
                next: self.next.clone(),
            },
            Some(_) => self
                .next
                .as_deref()
                .cloned()
                .unwrap_or_else(|| VisibilityTier::unlimited(Visibility::Public)),
        }
    }
}

/// The visibility configuration of one scope.
#[derive(Debug, Clone)]
pub struct ScopeOptions {
    /// Ceiling for this scope's own members and for selecting which import
    /// edges to expand (a private import is usable from inside its
    /// namespace, invisible from outside).
    pub visibility: Visibility,
    /// Budget for members reached through heritage.
    pub inherited: VisibilityTier,
    /// Budget for members reached through imports.
    pub imported: VisibilityTier,
}

impl ScopeOptions {
    /// Options for a scope queried from inside: own members fully visible,
    /// inherited protected members visible, imported content public-only.
    pub fn local() -> Self {
        Self {
            visibility: Visibility::Private,
            inherited: VisibilityTier::levels(
                Visibility::Protected,
                1,
                VisibilityTier::unlimited(Visibility::Protected),
            ),
            imported: VisibilityTier::unlimited(Visibility::Public),
        }
    }

    /// Options for a scope queried from outside (qualified-name access,
    /// the global index, imported namespaces): public-only everywhere.
    pub fn external() -> Self {
        Self {
            visibility: Visibility::Public,
            inherited: VisibilityTier::unlimited(Visibility::Public),
            imported: VisibilityTier::unlimited(Visibility::Public),
        }
    }

    /// The options of an inherited child scope: the inherited budget becomes
    /// the child's local ceiling and steps down; imported content stays
    /// public-only.
    pub fn step_inherited(&self) -> Self {
        Self {
            visibility: self.inherited.visibility,
            inherited: self.inherited.step(),
            imported: VisibilityTier::unlimited(Visibility::Public),
        }
    }

    /// The options of an imported child scope.
    pub fn step_imported(&self) -> Self {
        Self {
            visibility: self.imported.visibility,
            inherited: VisibilityTier::unlimited(Visibility::Public),
            imported: self.imported.step(),
        }
    }
}
