/// Per-cycle phase definitions for monitored pages
use std::fmt;

/// Result of diffing a page against its baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiffOutcome {
    /// New links (or, during warm-up, a new body) were found
    Changed,
    /// Nothing new this cycle, including failed fetches
    Unchanged,
}

/// Represents where a page is within the current polling cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PagePhase {
    /// Waiting for the next cycle to dispatch a fetch
    Idle,

    /// A fetch for this cycle is in flight
    Fetching,

    /// This cycle's fetch result has been applied
    Diffed(DiffOutcome),
}

impl PagePhase {
    /// Returns true while the page waits on its fetch
    pub fn is_fetching(&self) -> bool {
        matches!(self, Self::Fetching)
    }

    /// Returns true once this cycle's result has been applied
    pub fn is_diffed(&self) -> bool {
        matches!(self, Self::Diffed(_))
    }

    /// Returns true if the last diff found something new
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Diffed(DiffOutcome::Changed))
    }

    /// Checks whether moving from `self` to `next` is allowed
    ///
    /// `Idle -> Fetching -> Diffed -> Idle`. A diffed page may also start the
    /// next cycle's fetch directly, which is how the monitor uses it.
    pub fn can_transition_to(&self, next: PagePhase) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Fetching)
                | (Self::Fetching, Self::Diffed(_))
                | (Self::Diffed(_), Self::Idle)
                | (Self::Diffed(_), Self::Fetching)
        )
    }

    /// Short lowercase name used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Diffed(DiffOutcome::Changed) => "changed",
            Self::Diffed(DiffOutcome::Unchanged) => "unchanged",
        }
    }
}

impl Default for PagePhase {
    fn default() -> Self {
        Self::Idle
    }
}

impl fmt::Display for PagePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_transitions() {
        assert!(PagePhase::Idle.can_transition_to(PagePhase::Fetching));
        assert!(PagePhase::Fetching.can_transition_to(PagePhase::Diffed(DiffOutcome::Changed)));
        assert!(
            PagePhase::Fetching.can_transition_to(PagePhase::Diffed(DiffOutcome::Unchanged))
        );
        assert!(PagePhase::Diffed(DiffOutcome::Changed).can_transition_to(PagePhase::Idle));
        assert!(PagePhase::Diffed(DiffOutcome::Unchanged).can_transition_to(PagePhase::Fetching));
    }

    #[test]
    fn test_rejected_transitions() {
        assert!(!PagePhase::Idle.can_transition_to(PagePhase::Diffed(DiffOutcome::Changed)));
        assert!(!PagePhase::Fetching.can_transition_to(PagePhase::Fetching));
        assert!(!PagePhase::Fetching.can_transition_to(PagePhase::Idle));
        assert!(!PagePhase::Idle.can_transition_to(PagePhase::Idle));
    }

    #[test]
    fn test_predicates() {
        assert!(PagePhase::Fetching.is_fetching());
        assert!(!PagePhase::Idle.is_fetching());
        assert!(PagePhase::Diffed(DiffOutcome::Unchanged).is_diffed());
        assert!(!PagePhase::Diffed(DiffOutcome::Unchanged).is_changed());
        assert!(PagePhase::Diffed(DiffOutcome::Changed).is_changed());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", PagePhase::Idle), "idle");
        assert_eq!(format!("{}", PagePhase::Fetching), "fetching");
        assert_eq!(
            format!("{}", PagePhase::Diffed(DiffOutcome::Changed)),
            "changed"
        );
        assert_eq!(PagePhase::default(), PagePhase::Idle);
    }
}
