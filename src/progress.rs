use crate::provider::ProgressSync;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

/// Work items handed to the sync worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncRequest {
    Progress { progress_id: u64, quality: u8 },
    Advance { plan_id: u64 },
}

/// Fire-and-forget bridge to the progress-sync collaborator.
///
/// Requests are queued to a worker thread so controller transitions
/// never wait on the sync backend. Failures come back as transient
/// notice strings; the session is never halted by a failed sync.
pub struct ProgressReporter {
    tx: Sender<SyncRequest>,
    notices: Receiver<String>,
}

impl ProgressReporter {
    pub fn new(mut sync: Box<dyn ProgressSync>) -> Self {
        let (tx, rx) = mpsc::channel::<SyncRequest>();
        let (notice_tx, notices) = mpsc::channel();

        thread::spawn(move || {
            while let Ok(request) = rx.recv() {
                let result = match request {
                    SyncRequest::Progress {
                        progress_id,
                        quality,
                    } => sync.update_progress(progress_id, quality),
                    SyncRequest::Advance { plan_id } => sync.advance(plan_id),
                };
                if let Err(e) = result {
                    if notice_tx.send(format!("sync failed: {}", e)).is_err() {
                        break;
                    }
                }
            }
        });

        Self { tx, notices }
    }

    /// Quality is 1 (failure) or 5 (success).
    pub fn report(&self, progress_id: u64, quality: u8) {
        let _ = self.tx.send(SyncRequest::Progress {
            progress_id,
            quality,
        });
    }

    pub fn advance(&self, plan_id: u64) {
        let _ = self.tx.send(SyncRequest::Advance { plan_id });
    }

    /// Drain one pending failure notice, if any. Polled on the tick.
    pub fn try_take_notice(&self) -> Option<String> {
        self.notices.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    struct RecordingSync {
        seen: Arc<Mutex<Vec<SyncRequest>>>,
        fail: bool,
    }

    impl ProgressSync for RecordingSync {
        fn update_progress(&mut self, progress_id: u64, quality: u8) -> Result<(), SyncError> {
            self.seen.lock().unwrap().push(SyncRequest::Progress {
                progress_id,
                quality,
            });
            if self.fail {
                Err(SyncError::Store("backend unreachable".into()))
            } else {
                Ok(())
            }
        }

        fn advance(&mut self, plan_id: u64) -> Result<(), SyncError> {
            self.seen
                .lock()
                .unwrap()
                .push(SyncRequest::Advance { plan_id });
            Ok(())
        }
    }

    fn wait_for<F: Fn() -> bool>(cond: F) {
        for _ in 0..100 {
            if cond() {
                return;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("condition not reached in time");
    }

    #[test]
    fn requests_reach_the_sync_backend_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let reporter = ProgressReporter::new(Box::new(RecordingSync {
            seen: seen.clone(),
            fail: false,
        }));
        reporter.report(7, 1);
        reporter.report(7, 5);
        reporter.advance(3);

        wait_for(|| seen.lock().unwrap().len() == 3);
        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                SyncRequest::Progress {
                    progress_id: 7,
                    quality: 1
                },
                SyncRequest::Progress {
                    progress_id: 7,
                    quality: 5
                },
                SyncRequest::Advance { plan_id: 3 },
            ]
        );
    }

    #[test]
    fn failures_surface_as_notices_without_blocking() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let reporter = ProgressReporter::new(Box::new(RecordingSync {
            seen: seen.clone(),
            fail: true,
        }));
        reporter.report(1, 5);
        wait_for(|| reporter.try_take_notice().is_some());
    }

    #[test]
    fn no_notice_when_nothing_failed() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let reporter = ProgressReporter::new(Box::new(RecordingSync {
            seen: seen.clone(),
            fail: false,
        }));
        reporter.report(1, 5);
        wait_for(|| seen.lock().unwrap().len() == 1);
        assert!(reporter.try_take_notice().is_none());
    }
}
