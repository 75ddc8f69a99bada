use crate::Fault;

/// Deterministic execution-state machine for host-observable control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RunState {
    /// Ready to execute the next instruction.
    #[default]
    Running,
    /// The committed PC reached the halt sentinel; terminal until reset.
    Halted,
    /// Fault is latched and no further progress is possible without reset.
    Faulted(Fault),
}

impl RunState {
    /// Returns the currently latched fault, if this state is faulted.
    #[must_use]
    pub const fn latched_fault(self) -> Option<Fault> {
        match self {
            Self::Faulted(cause) => Some(cause),
            Self::Running | Self::Halted => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RunState;
    use crate::Fault;

    #[test]
    fn run_state_default_is_running() {
        assert_eq!(RunState::default(), RunState::Running);
    }

    #[test]
    fn latched_fault_accessor_reports_only_faulted_variant() {
        assert_eq!(RunState::Running.latched_fault(), None);
        assert_eq!(RunState::Halted.latched_fault(), None);

        let fault = Fault::MemoryAccess { addr: 0x9000 };
        assert_eq!(RunState::Faulted(fault).latched_fault(), Some(fault));
    }
}
