//! The per-connection state machine. States and legal transitions are
//! enumerated explicitly rather than inferred from whatever message just
//! arrived, so an illegal message in a given state is rejected before it
//! ever touches the transport.

use crate::error::BoltError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
    Ready,
    Streaming,
    TxReady,
    TxStreaming,
    Failed,
    Interrupted,
    Defunct,
}

/// The event that drives a state transition. Doesn't carry payload — just
/// enough to select the `(from, event) -> to` row in the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    HandshakeOk,
    HelloOk,
    RunAutoCommit,
    Begin,
    Run,
    PullHasMore,
    PullLastOrDiscard,
    CommitOrRollback,
    Failure,
    ResetOk,
    ResetFail,
    Goodbye,
}

impl ConnectionState {
    /// Apply `event`, returning the resulting state or a
    /// [`BoltError::IllegalState`] if the event isn't legal from here.
    pub fn apply(self, event: Event) -> Result<ConnectionState, BoltError> {
        use ConnectionState::*;
        use Event::*;

        // A FAILURE or transport-level GOODBYE is legal from (almost) any
        // state; check those first so the big match below only needs to
        // enumerate the "happy path" rows of the table.
        if matches!(event, Failure) && self != Defunct {
            return Ok(Failed);
        }
        if matches!(event, Goodbye) && !matches!(self, Defunct) {
            return Ok(Disconnected);
        }

        let to = match (self, event) {
            (Disconnected, HandshakeOk) => Connected,
            (Connected, HelloOk) => Ready,
            (Ready, RunAutoCommit) => Streaming,
            (Ready, Begin) => TxReady,
            (TxReady, Run) => TxStreaming,
            (Streaming, PullHasMore) => Streaming,
            (Streaming, PullLastOrDiscard) => Ready,
            (TxStreaming, PullLastOrDiscard) => TxReady,
            (TxReady, CommitOrRollback) => Ready,
            (Failed, ResetOk) => Ready,
            (Failed, ResetFail) => Defunct,
            (from, event) => {
                return Err(BoltError::IllegalState {
                    state: format!("{from:?}"),
                    message: format!("event {event:?} is not legal in this state"),
                })
            }
        };
        Ok(to)
    }

    pub fn is_usable(self) -> bool {
        !matches!(self, ConnectionState::Defunct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_in_failed_is_rejected_without_touching_transport() {
        let state = ConnectionState::Failed;
        assert!(state.apply(Event::RunAutoCommit).is_err());
    }

    #[test]
    fn reset_from_failed_returns_to_ready() {
        assert_eq!(
            ConnectionState::Failed.apply(Event::ResetOk).unwrap(),
            ConnectionState::Ready
        );
    }

    #[test]
    fn goodbye_from_any_state_disconnects() {
        for state in [
            ConnectionState::Ready,
            ConnectionState::Streaming,
            ConnectionState::TxReady,
            ConnectionState::Failed,
        ] {
            assert_eq!(state.apply(Event::Goodbye).unwrap(), ConnectionState::Disconnected);
        }
    }

    #[test]
    fn full_autocommit_cycle() {
        let s = ConnectionState::Disconnected;
        let s = s.apply(Event::HandshakeOk).unwrap();
        let s = s.apply(Event::HelloOk).unwrap();
        let s = s.apply(Event::RunAutoCommit).unwrap();
        assert_eq!(s, ConnectionState::Streaming);
        let s = s.apply(Event::PullLastOrDiscard).unwrap();
        assert_eq!(s, ConnectionState::Ready);
    }
}
