//! Fixed-cadence line transmitter.
//!
//! Owns the output sink on a dedicated thread and emits exactly one line per
//! tick: the next queued settling step if any, the overload token while
//! overload is latched, otherwise the previous value again. Queued input
//! never blocks the cadence.
//!
//! Safety: each `Transmitter` spawns exactly one thread that is signaled and
//! joined when the handle is dropped, preventing thread leaks.
use crossbeam_channel as xch;
use scalesim_traits::LineSink;
use scalesim_traits::clock::Clock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::thread::JoinHandle;

use crate::error::{TxError, map_sink_error_dyn};
use crate::profile::{ScaleProfile, radix_comma};
use crate::weight::Weight;

/// Per-tick engine. Separated from the thread loop so the
/// queue/overload/repeat decision is testable without timing.
struct TickEngine<S> {
    sink: S,
    profile: ScaleProfile,
    pending: xch::Receiver<Weight>,
    overload: Arc<AtomicBool>,
    last_sent: Arc<AtomicI32>,
    last_line: Option<String>,
}

impl<S: LineSink> TickEngine<S> {
    /// Send the profile's handshake frame, if any. Runs once per stream.
    fn open_stream(&mut self) -> Result<(), TxError> {
        if let Some(frame) = self.profile.handshake() {
            self.send(frame.to_string())?;
        }
        Ok(())
    }

    /// Emit one line for this tick.
    ///
    /// Priority: queued step, then overload token, then the previous value
    /// again.
    fn tick(&mut self) -> Result<(), TxError> {
        let line = match self.pending.try_recv() {
            Ok(step) => {
                self.last_sent.store(step.tenths(), Ordering::Relaxed);
                self.profile.format_reading(step)
            }
            Err(_) => {
                if self.overload.load(Ordering::Relaxed) {
                    self.profile.overload_token().to_string()
                } else {
                    let last = Weight::from_tenths(self.last_sent.load(Ordering::Relaxed));
                    self.profile.format_reading(last)
                }
            }
        };
        self.send(line)
    }

    /// Radix-substitute, write, and echo the line when it differs from the
    /// previous one.
    fn send(&mut self, line: String) -> Result<(), TxError> {
        let wire = radix_comma(&line);
        self.sink
            .write_line(&wire)
            .map_err(|e| map_sink_error_dyn(&*e))?;
        if self.last_line.as_deref() != Some(wire.as_str()) {
            tracing::info!(line = %wire, "tx");
            self.last_line = Some(wire);
        }
        Ok(())
    }
}

pub struct Transmitter {
    feed: xch::Sender<Weight>,
    overload: Arc<AtomicBool>,
    last_sent: Arc<AtomicI32>,
    /// Shutdown flag for immediate response (atomic for lock-free check)
    shutdown: Arc<AtomicBool>,
    /// Join handle for graceful thread cleanup
    join_handle: Option<JoinHandle<Result<(), TxError>>>,
}

impl Transmitter {
    pub fn spawn<S: LineSink + Send + 'static, C: Clock + Send + Sync + 'static>(
        sink: S,
        profile: ScaleProfile,
        clock: C,
    ) -> Self {
        let (feed, pending) = xch::unbounded();
        let overload = Arc::new(AtomicBool::new(false));
        let last_sent = Arc::new(AtomicI32::new(0));
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let mut engine = TickEngine {
            sink,
            profile,
            pending,
            overload: overload.clone(),
            last_sent: last_sent.clone(),
            last_line: None,
        };
        let cadence = profile.cadence();

        let join_handle = std::thread::spawn(move || {
            if let Err(e) = engine.open_stream() {
                tracing::error!(error = %e, "handshake failed, releasing sink");
                return Err(e);
            }
            loop {
                // Immediate shutdown check (lock-free atomic)
                if shutdown_clone.load(Ordering::Relaxed) {
                    tracing::debug!("transmitter thread received shutdown signal");
                    break;
                }

                // A failed write is fatal for the stream; the thread exits and
                // the sink is released with it.
                if let Err(e) = engine.tick() {
                    tracing::error!(error = %e, "write failed, stopping transmission");
                    return Err(e);
                }

                // Check shutdown before sleep to avoid waiting out a cadence
                if shutdown_clone.load(Ordering::Relaxed) {
                    break;
                }
                clock.sleep(cadence);
            }
            tracing::trace!("transmitter thread exiting cleanly");
            Ok(())
        });

        Self {
            feed,
            overload,
            last_sent,
            shutdown,
            join_handle: Some(join_handle),
        }
    }

    /// Queue settling steps for transmission, oldest first.
    pub fn enqueue(&self, steps: &[Weight]) {
        for &step in steps {
            // Send fails only after the thread exited; the fault itself
            // surfaces in stop().
            if self.feed.send(step).is_err() {
                tracing::debug!("transmit thread gone, dropping queued steps");
                break;
            }
        }
    }

    /// Latch overload: the wire carries the overload token once the queue
    /// drains, until cleared.
    pub fn set_overload(&self) {
        self.overload.store(true, Ordering::Relaxed);
    }

    pub fn clear_overload(&self) {
        self.overload.store(false, Ordering::Relaxed);
    }

    /// Last weight placed on the wire (zero before the first step).
    pub fn last_sent(&self) -> Weight {
        Weight::from_tenths(self.last_sent.load(Ordering::Relaxed))
    }

    /// Shared flag observed by the transmit thread; storing `true` stops the
    /// stream within one tick. Hand this to signal handlers.
    pub fn cancel_token(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    pub fn is_running(&self) -> bool {
        self.join_handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the stream and join the thread, surfacing any transmit fault.
    pub fn stop(mut self) -> Result<(), TxError> {
        self.shutdown.store(true, Ordering::Relaxed);
        match self.join_handle.take() {
            Some(handle) => match handle.join() {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::warn!(?e, "transmitter thread panicked");
                    Err(TxError::Panicked)
                }
            },
            None => Ok(()),
        }
    }
}

impl Drop for Transmitter {
    fn drop(&mut self) {
        // Signal shutdown immediately (atomic store, lock-free)
        self.shutdown.store(true, Ordering::Relaxed);

        // The thread exits at its next shutdown check; worst case it finishes
        // one in-flight write or sleeps out the current cadence first.
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(Ok(())) => {
                    tracing::trace!("transmitter thread joined successfully");
                }
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "transmitter exited with fault");
                }
                Err(e) => {
                    // Thread panicked; log but don't propagate (we're in Drop)
                    tracing::warn!(?e, "transmitter thread panicked during shutdown");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{FailingSink, MemorySink};

    fn engine(
        profile: ScaleProfile,
        sink: MemorySink,
    ) -> (TickEngine<MemorySink>, xch::Sender<Weight>) {
        let (feed, pending) = xch::unbounded();
        let eng = TickEngine {
            sink,
            profile,
            pending,
            overload: Arc::new(AtomicBool::new(false)),
            last_sent: Arc::new(AtomicI32::new(0)),
            last_line: None,
        };
        (eng, feed)
    }

    #[test]
    fn queued_steps_then_repeat_last() {
        let sink = MemorySink::new();
        let (mut eng, feed) = engine(ScaleProfile::GrossNet, sink.clone());
        feed.send(Weight::from_tenths(10)).unwrap();
        feed.send(Weight::from_tenths(12)).unwrap();
        for _ in 0..3 {
            eng.tick().unwrap();
        }
        assert_eq!(
            sink.lines(),
            vec![
                "PB: 0001,0kg PL: 0001,0kg T:1,0kg".to_string(),
                "PB: 0001,2kg PL: 0001,2kg T:1,0kg".to_string(),
                "PB: 0001,2kg PL: 0001,2kg T:1,0kg".to_string(),
            ]
        );
        assert_eq!(eng.last_sent.load(Ordering::Relaxed), 12);
    }

    #[test]
    fn queue_outranks_overload() {
        let sink = MemorySink::new();
        let (mut eng, feed) = engine(ScaleProfile::GrossNet, sink.clone());
        eng.overload.store(true, Ordering::Relaxed);
        feed.send(Weight::from_tenths(20)).unwrap();
        eng.tick().unwrap();
        eng.tick().unwrap();
        assert_eq!(
            sink.lines(),
            vec![
                "PB: 0002,0kg PL: 0002,0kg T:1,0kg".to_string(),
                "SOBRE".to_string(),
            ]
        );
    }

    #[test]
    fn overload_clears_back_to_repeat() {
        let sink = MemorySink::new();
        let (mut eng, _feed) = engine(ScaleProfile::SingleField, sink.clone());
        eng.overload.store(true, Ordering::Relaxed);
        eng.tick().unwrap();
        eng.overload.store(false, Ordering::Relaxed);
        eng.tick().unwrap();
        assert_eq!(
            sink.lines(),
            vec!["E61EE".to_string(), "0000,0EL".to_string()]
        );
    }

    #[test]
    fn every_tick_writes_even_when_idle() {
        let sink = MemorySink::new();
        let (mut eng, _feed) = engine(ScaleProfile::SingleField, sink.clone());
        for _ in 0..5 {
            eng.tick().unwrap();
        }
        assert_eq!(sink.line_count(), 5);
        assert!(sink.lines().iter().all(|l| l == "0000,0EL"));
    }

    #[test]
    fn handshake_precedes_readings() {
        let sink = MemorySink::new();
        let (mut eng, _feed) = engine(ScaleProfile::GrossNet, sink.clone());
        eng.open_stream().unwrap();
        eng.tick().unwrap();
        let lines = sink.lines();
        assert_eq!(lines[0], "000000");
        assert!(lines[1].starts_with("PB: "));
    }

    #[test]
    fn single_field_has_no_handshake() {
        let sink = MemorySink::new();
        let (mut eng, _feed) = engine(ScaleProfile::SingleField, sink.clone());
        eng.open_stream().unwrap();
        assert_eq!(sink.line_count(), 0);
    }

    #[test]
    fn write_failure_maps_to_typed_error() {
        let (_feed, pending) = xch::unbounded::<Weight>();
        let mut eng = TickEngine {
            sink: FailingSink,
            profile: ScaleProfile::GrossNet,
            pending,
            overload: Arc::new(AtomicBool::new(false)),
            last_sent: Arc::new(AtomicI32::new(0)),
            last_line: None,
        };
        let err = eng.tick().unwrap_err();
        assert!(matches!(err, TxError::Disconnected(_)));
    }

    #[test]
    fn echo_state_tracks_line_changes() {
        let sink = MemorySink::new();
        let (mut eng, feed) = engine(ScaleProfile::SingleField, sink.clone());
        eng.tick().unwrap();
        assert_eq!(eng.last_line.as_deref(), Some("0000,0EL"));
        feed.send(Weight::from_tenths(10)).unwrap();
        eng.tick().unwrap();
        assert_eq!(eng.last_line.as_deref(), Some("0001,0EL"));
        eng.tick().unwrap();
        assert_eq!(eng.last_line.as_deref(), Some("0001,0EL"));
    }
}
