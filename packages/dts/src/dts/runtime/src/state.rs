use std::fmt;

/// Where one declaration is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationState {
    Pending,
    /// Produced by a resolver.
    Resolved,
    /// Produced by the program's default emission.
    ProgramEmitted,
    Transformed,
    Written,
    RolledUp,
    Finalized,
}

impl DeclarationState {
    pub fn can_transition_to(self, next: DeclarationState) -> bool {
        use DeclarationState::*;
        matches!(
            (self, next),
            (Pending, Resolved)
                | (Pending, ProgramEmitted)
                | (Resolved, Transformed)
                | (ProgramEmitted, Transformed)
                | (Transformed, Written)
                | (Written, RolledUp)
                | (Written, Finalized)
        )
    }

    /// Move to `next`, or stay put when the transition is not allowed.
    pub fn advance(&mut self, next: DeclarationState) -> bool {
        if self.can_transition_to(next) {
            *self = next;
            true
        } else {
            false
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, DeclarationState::RolledUp | DeclarationState::Finalized)
    }
}

impl fmt::Display for DeclarationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeclarationState::Pending => "pending",
            DeclarationState::Resolved => "resolved",
            DeclarationState::ProgramEmitted => "program-emitted",
            DeclarationState::Transformed => "transformed",
            DeclarationState::Written => "written",
            DeclarationState::RolledUp => "rolled-up",
            DeclarationState::Finalized => "finalized",
        };
        f.write_str(name)
    }
}
