//! Session registry
//!
//! Hosts many concurrent sessions addressed by [`SessionId`]. Each session sits
//! behind its own mutex so a background frame producer and a controlling thread can
//! drive the same session; different sessions never contend.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::config::FocusConfig;
use crate::error::FocusError;
use crate::report::SessionReport;
use crate::session::FocusSession;
use crate::types::{FrameObservation, FrameRecord, RawFrame, SessionId};

/// Shared handle to one hosted session
pub type SessionHandle = Arc<Mutex<FocusSession>>;

/// Registry of concurrently hosted sessions
#[derive(Debug, Default)]
pub struct SessionRegistry {
    config: FocusConfig,
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,
}

impl SessionRegistry {
    /// Create a registry whose sessions use `config`
    pub fn new(config: FocusConfig) -> Result<Self, FocusError> {
        config.validate()?;
        Ok(Self {
            config,
            sessions: RwLock::new(HashMap::new()),
        })
    }

    /// Register a new idle session and return its id
    pub fn create(&self) -> Result<SessionId, FocusError> {
        let id = SessionId::new();
        let session = FocusSession::with_id(id, self.config.clone())?;
        self.sessions.write().insert(id, Arc::new(Mutex::new(session)));
        debug!(session_id = %id, "session registered");
        Ok(id)
    }

    pub fn handle(&self, id: SessionId) -> Result<SessionHandle, FocusError> {
        self.sessions
            .read()
            .get(&id)
            .cloned()
            .ok_or(FocusError::UnknownSession(id))
    }

    fn with_session<T>(
        &self,
        id: SessionId,
        f: impl FnOnce(&mut FocusSession) -> Result<T, FocusError>,
    ) -> Result<T, FocusError> {
        let handle = self.handle(id)?;
        let mut session = handle.lock();
        f(&mut session)
    }

    pub fn start_session(&self, id: SessionId) -> Result<(), FocusError> {
        self.with_session(id, |session| {
            session.start_session();
            Ok(())
        })
    }

    pub fn record_frame(
        &self,
        id: SessionId,
        frame: &FrameRecord,
    ) -> Result<FrameObservation, FocusError> {
        self.with_session(id, |session| session.record_frame(frame))
    }

    pub fn record_raw_frame(
        &self,
        id: SessionId,
        raw: &RawFrame,
    ) -> Result<FrameObservation, FocusError> {
        self.with_session(id, |session| session.record_raw_frame(raw))
    }

    pub fn set_tracking_quality(&self, id: SessionId, quality: f64) -> Result<(), FocusError> {
        self.with_session(id, |session| {
            session.set_tracking_quality(quality);
            Ok(())
        })
    }

    pub fn end_session(&self, id: SessionId) -> Result<(), FocusError> {
        self.with_session(id, |session| session.end_session())
    }

    pub fn generate_report(&self, id: SessionId) -> Result<SessionReport, FocusError> {
        self.with_session(id, |session| session.generate_report())
    }

    pub fn save_report(
        &self,
        id: SessionId,
        filename: Option<&str>,
    ) -> Result<PathBuf, FocusError> {
        self.with_session(id, |session| session.try_save_report(filename))
    }

    /// Drop a session from the registry, returning it if present
    pub fn remove(&self, id: SessionId) -> Option<SessionHandle> {
        let removed = self.sessions.write().remove(&id);
        if removed.is_some() {
            debug!(session_id = %id, "session removed");
        }
        removed
    }

    pub fn ids(&self) -> Vec<SessionId> {
        self.sessions.read().keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PoseAngles, SessionState};
    use std::thread;

    fn forward() -> RawFrame {
        RawFrame {
            head_pose: Some(PoseAngles {
                yaw: 0.0,
                pitch: 0.0,
                roll: 0.0,
            }),
            ..RawFrame::default()
        }
    }

    #[test]
    fn test_unknown_session() {
        let registry = SessionRegistry::default();
        let id = SessionId::new();
        assert!(matches!(
            registry.start_session(id),
            Err(FocusError::UnknownSession(missing)) if missing == id
        ));
    }

    #[test]
    fn test_sessions_are_independent() {
        let registry = SessionRegistry::default();
        let a = registry.create().unwrap();
        let b = registry.create().unwrap();
        assert_eq!(registry.len(), 2);

        registry.start_session(a).unwrap();
        registry.record_raw_frame(a, &forward()).unwrap();

        // b was never started
        assert!(matches!(
            registry.record_raw_frame(b, &forward()),
            Err(FocusError::InvalidState { .. })
        ));
        assert!(matches!(
            registry.generate_report(b),
            Err(FocusError::NoSession)
        ));

        let report = registry.generate_report(a).unwrap();
        assert_eq!(report.focus_analysis.total_frames, 1);
        assert_eq!(report.session_id, a);
    }

    #[test]
    fn test_remove() {
        let registry = SessionRegistry::default();
        let id = registry.create().unwrap();
        assert!(registry.remove(id).is_some());
        assert!(registry.remove(id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_background_producer_and_controller() {
        let registry = Arc::new(SessionRegistry::default());
        let id = registry.create().unwrap();
        registry.start_session(id).unwrap();

        let producer = {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for _ in 0..200 {
                    registry.record_raw_frame(id, &forward()).unwrap();
                }
            })
        };
        producer.join().unwrap();

        registry.set_tracking_quality(id, 1.0).unwrap();
        registry.end_session(id).unwrap();

        let handle = registry.handle(id).unwrap();
        let session = handle.lock();
        assert!(matches!(session.state(), SessionState::Ended { .. }));
        assert_eq!(session.counters().total_frames, 200);
        assert!((session.focus_percentage() - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_concurrent_sessions() {
        let registry = Arc::new(SessionRegistry::default());
        let ids: Vec<SessionId> = (0..4).map(|_| registry.create().unwrap()).collect();

        let workers: Vec<_> = ids
            .iter()
            .enumerate()
            .map(|(n, &id)| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    registry.start_session(id).unwrap();
                    for _ in 0..(n + 1) * 10 {
                        registry.record_raw_frame(id, &forward()).unwrap();
                    }
                    registry.end_session(id).unwrap();
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        for (n, id) in ids.into_iter().enumerate() {
            let report = registry.generate_report(id).unwrap();
            assert_eq!(report.focus_analysis.total_frames, ((n + 1) * 10) as u64);
        }
    }
}
