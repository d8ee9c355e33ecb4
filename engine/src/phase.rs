use std::collections::HashMap;

use crossing_core::{ControllerKind, Phase};

use crate::EngineError;

/// Declarative mapping from each phase to the controllers it runs, in
/// creation and dispatch order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PhaseTable {
    phases: HashMap<Phase, Vec<ControllerKind>>,
}

impl PhaseTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the controllers of `phase`, replacing any earlier entry.
    #[must_use]
    pub fn with_phase(
        mut self,
        phase: Phase,
        controllers: impl Into<Vec<ControllerKind>>,
    ) -> Self {
        let _ = self.phases.insert(phase, controllers.into());
        self
    }

    /// Controllers of `phase`.
    pub fn controllers(&self, phase: Phase) -> Result<&[ControllerKind], EngineError> {
        self.phases
            .get(&phase)
            .map(Vec::as_slice)
            .ok_or(EngineError::UnknownPhase(phase))
    }

    /// Returns `true` when the table describes `phase`.
    #[must_use]
    pub fn contains(&self, phase: Phase) -> bool {
        self.phases.contains_key(&phase)
    }
}
