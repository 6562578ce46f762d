use std::fmt;
use std::str::FromStr;

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum SessionMode {
    #[default]
    Flat,
    Immersive,
}

/// How select events are judged eligible for painting.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum EligibilityPolicy {
    /// Painting requires a running immersive session.
    #[default]
    SessionDriven,

    /// Any controller connection or session start enables painting until the
    /// session ends.
    ControllerHeuristic,
}

impl EligibilityPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SessionDriven => "session",
            Self::ControllerHeuristic => "controller",
        }
    }
}

impl fmt::Display for EligibilityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPolicy(pub String);

impl fmt::Display for UnknownPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown eligibility policy {:?} (expected \"session\" or \"controller\")", self.0)
    }
}

impl std::error::Error for UnknownPolicy {}

impl FromStr for EligibilityPolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "session" => Ok(Self::SessionDriven),
            "controller" => Ok(Self::ControllerHeuristic),
            _ => Err(UnknownPolicy(s.to_string())),
        }
    }
}

/// Tracks the session mode and decides whether a select may paint.
///
/// Under every policy the emitting controller must be connected; the policy
/// only decides what else is required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionGate {
    policy: EligibilityPolicy,
    mode: SessionMode,
    heuristic_flag: bool,
}

impl InteractionGate {
    pub fn new(policy: EligibilityPolicy) -> Self {
        Self {
            policy,
            mode: SessionMode::Flat,
            heuristic_flag: false,
        }
    }

    #[inline]
    pub fn policy(&self) -> EligibilityPolicy {
        self.policy
    }

    #[inline]
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Returns `true` if the mode changed.
    pub fn on_session_start(&mut self) -> bool {
        self.heuristic_flag = true;
        std::mem::replace(&mut self.mode, SessionMode::Immersive) != SessionMode::Immersive
    }

    /// Returns `true` if the mode changed.
    pub fn on_session_end(&mut self) -> bool {
        self.heuristic_flag = false;
        std::mem::replace(&mut self.mode, SessionMode::Flat) != SessionMode::Flat
    }

    pub fn on_controller_connected(&mut self) {
        self.heuristic_flag = true;
    }

    pub fn is_eligible(&self, controller_connected: bool) -> bool {
        if !controller_connected {
            return false;
        }
        match self.policy {
            EligibilityPolicy::SessionDriven => self.mode == SessionMode::Immersive,
            EligibilityPolicy::ControllerHeuristic => self.heuristic_flag,
        }
    }
}

impl Default for InteractionGate {
    fn default() -> Self {
        Self::new(EligibilityPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── parsing ───────────────────────────────────────────────────────────

    #[test]
    fn policy_parses_case_insensitively() {
        assert_eq!("session".parse(), Ok(EligibilityPolicy::SessionDriven));
        assert_eq!(" Controller ".parse(), Ok(EligibilityPolicy::ControllerHeuristic));
        assert!("always".parse::<EligibilityPolicy>().is_err());
    }

    #[test]
    fn policy_display_round_trips() {
        for p in [EligibilityPolicy::SessionDriven, EligibilityPolicy::ControllerHeuristic] {
            assert_eq!(p.to_string().parse(), Ok(p));
        }
    }

    // ── session driven ────────────────────────────────────────────────────

    #[test]
    fn session_driven_needs_immersive_mode() {
        let mut gate = InteractionGate::new(EligibilityPolicy::SessionDriven);
        gate.on_controller_connected();
        assert!(!gate.is_eligible(true));

        assert!(gate.on_session_start());
        assert!(gate.is_eligible(true));
        assert!(!gate.is_eligible(false));

        assert!(gate.on_session_end());
        assert!(!gate.is_eligible(true));
    }

    #[test]
    fn session_notifications_are_idempotent() {
        let mut gate = InteractionGate::default();
        assert!(gate.on_session_start());
        assert!(!gate.on_session_start());
        assert_eq!(gate.mode(), SessionMode::Immersive);
        assert!(gate.on_session_end());
        assert!(!gate.on_session_end());
        assert_eq!(gate.mode(), SessionMode::Flat);
    }

    // ── controller heuristic ──────────────────────────────────────────────

    #[test]
    fn heuristic_enabled_by_connection() {
        let mut gate = InteractionGate::new(EligibilityPolicy::ControllerHeuristic);
        assert!(!gate.is_eligible(true));
        gate.on_controller_connected();
        assert!(gate.is_eligible(true));
        assert!(!gate.is_eligible(false));
    }

    #[test]
    fn heuristic_cleared_by_session_end() {
        let mut gate = InteractionGate::new(EligibilityPolicy::ControllerHeuristic);
        gate.on_session_start();
        assert!(gate.is_eligible(true));
        gate.on_session_end();
        assert!(!gate.is_eligible(true));
    }
}
