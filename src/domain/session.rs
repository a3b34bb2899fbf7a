//! Session state machine

use std::fmt;
use thiserror::Error;

/// Session states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Starting,
    Active,
    Stopping,
}

impl SessionState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Active => "active",
            Self::Stopping => "stopping",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Invalid state transition: cannot {action} while in {current_state} state")]
pub struct InvalidStateTransition {
    pub current_state: SessionState,
    pub action: String,
}

/// Session entity.
/// Manages state transitions for one playback-and-capture session.
///
/// State machine:
///   IDLE -> STARTING (begin_start)
///   STARTING -> ACTIVE (activate)
///   STARTING -> IDLE (abort_start, playback source failed)
///   STARTING | ACTIVE -> STOPPING (begin_stop)
///   STOPPING -> IDLE (finish_stop)
#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
}

impl Session {
    /// Create a new session in idle state
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
        }
    }

    /// Get the current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Check if currently idle
    pub fn is_idle(&self) -> bool {
        self.state == SessionState::Idle
    }

    /// Check if a session is underway (starting or active)
    pub fn is_running(&self) -> bool {
        matches!(self.state, SessionState::Starting | SessionState::Active)
    }

    /// Transition from IDLE to STARTING
    pub fn begin_start(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != SessionState::Idle {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: "start a session".to_string(),
            });
        }
        self.state = SessionState::Starting;
        Ok(())
    }

    /// Transition from STARTING back to IDLE (playback source failed to open)
    pub fn abort_start(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != SessionState::Starting {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: "abort startup".to_string(),
            });
        }
        self.state = SessionState::Idle;
        Ok(())
    }

    /// Transition from STARTING to ACTIVE
    pub fn activate(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != SessionState::Starting {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: "activate the session".to_string(),
            });
        }
        self.state = SessionState::Active;
        Ok(())
    }

    /// Transition from STARTING or ACTIVE to STOPPING
    pub fn begin_stop(&mut self) -> Result<(), InvalidStateTransition> {
        if !self.is_running() {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: "stop the session".to_string(),
            });
        }
        self.state = SessionState::Stopping;
        Ok(())
    }

    /// Transition from STOPPING to IDLE
    pub fn finish_stop(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != SessionState::Stopping {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: "finish teardown".to_string(),
            });
        }
        self.state = SessionState::Idle;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_idle() {
        let session = Session::new();
        assert!(session.is_idle());
        assert!(!session.is_running());
    }

    #[test]
    fn begin_start_from_idle() {
        let mut session = Session::new();
        assert!(session.begin_start().is_ok());
        assert_eq!(session.state(), SessionState::Starting);
        assert!(session.is_running());
    }

    #[test]
    fn begin_start_while_running_fails() {
        let mut session = Session::new();
        session.begin_start().unwrap();
        session.activate().unwrap();

        let err = session.begin_start().unwrap_err();
        assert_eq!(err.current_state, SessionState::Active);
        assert!(err.action.contains("start"));
        // State untouched by the rejected call
        assert_eq!(session.state(), SessionState::Active);
    }

    #[test]
    fn abort_start_returns_to_idle() {
        let mut session = Session::new();
        session.begin_start().unwrap();
        assert!(session.abort_start().is_ok());
        assert!(session.is_idle());
    }

    #[test]
    fn abort_start_from_idle_fails() {
        let mut session = Session::new();
        assert!(session.abort_start().is_err());
    }

    #[test]
    fn stop_from_idle_fails() {
        let mut session = Session::new();
        let err = session.begin_stop().unwrap_err();
        assert_eq!(err.current_state, SessionState::Idle);
        assert!(session.is_idle());
    }

    #[test]
    fn stop_from_starting_is_allowed() {
        let mut session = Session::new();
        session.begin_start().unwrap();
        assert!(session.begin_stop().is_ok());
        assert_eq!(session.state(), SessionState::Stopping);
    }

    #[test]
    fn stop_from_stopping_fails() {
        let mut session = Session::new();
        session.begin_start().unwrap();
        session.activate().unwrap();
        session.begin_stop().unwrap();

        // A racing second stop loses
        assert!(session.begin_stop().is_err());
    }

    #[test]
    fn full_cycle() {
        let mut session = Session::new();

        session.begin_start().unwrap();
        session.activate().unwrap();
        assert_eq!(session.state(), SessionState::Active);

        session.begin_stop().unwrap();
        session.finish_stop().unwrap();
        assert!(session.is_idle());

        // Can start another cycle
        session.begin_start().unwrap();
        assert!(session.is_running());
    }

    #[test]
    fn state_display() {
        assert_eq!(SessionState::Idle.to_string(), "idle");
        assert_eq!(SessionState::Starting.to_string(), "starting");
        assert_eq!(SessionState::Active.to_string(), "active");
        assert_eq!(SessionState::Stopping.to_string(), "stopping");
    }

    #[test]
    fn error_display() {
        let err = InvalidStateTransition {
            current_state: SessionState::Active,
            action: "start a session".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("start a session"));
        assert!(msg.contains("active"));
    }
}
