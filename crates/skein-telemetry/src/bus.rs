//! Event bus: queues simulation events and fans them out to sinks.
//!
//! The solver loop and any helper threads emit through cheap
//! [`EventEmitter`] handles; the owner of the bus drains the queue into
//! the registered sinks once per frame with [`EventBus::flush`].

use std::sync::mpsc;

use crate::events::{EventKind, SimulationEvent};
use crate::sinks::EventSink;

/// Sending half of an [`EventBus`], cloneable across threads.
#[derive(Clone)]
pub struct EventEmitter {
    sender: mpsc::Sender<SimulationEvent>,
}

impl EventEmitter {
    /// Queues an event. Events sent after the bus is dropped are lost.
    pub fn emit(&self, event: SimulationEvent) {
        let _ = self.sender.send(event);
    }
}

/// Telemetry hub owned by whoever drives the simulation.
pub struct EventBus {
    emitter: EventEmitter,
    receiver: mpsc::Receiver<SimulationEvent>,
    sinks: Vec<Box<dyn EventSink>>,
    enabled: bool,
    /// Only every `frame_stride`-th frame reaches the sinks.
    frame_stride: u32,
    delivered: u64,
}

impl EventBus {
    /// Creates an enabled bus with no sinks that forwards every frame.
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            emitter: EventEmitter { sender },
            receiver,
            sinks: Vec::new(),
            enabled: true,
            frame_stride: 1,
            delivered: 0,
        }
    }

    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    /// A disabled bus drops events on emit.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Thins out telemetry for long runs: only frames that are a
    /// multiple of `stride` are forwarded. Failed convergence is always
    /// forwarded. A stride of zero is treated as one.
    pub fn set_frame_stride(&mut self, stride: u32) {
        self.frame_stride = stride.max(1);
    }

    /// Returns a handle that queues into this bus.
    ///
    /// Handles ignore [`EventBus::set_enabled`]; filtering for them
    /// happens at flush time through the frame stride only.
    pub fn emitter(&self) -> EventEmitter {
        self.emitter.clone()
    }

    /// Queues an event, unless the bus is disabled.
    pub fn emit(&self, event: SimulationEvent) {
        if self.enabled {
            self.emitter.emit(event);
        }
    }

    fn forwards(&self, event: &SimulationEvent) -> bool {
        if event.frame % self.frame_stride == 0 {
            return true;
        }
        matches!(event.kind, EventKind::Convergence { converged: false, .. })
    }

    /// Hands every queued event to all sinks and returns how many events
    /// were delivered.
    pub fn flush(&mut self) -> usize {
        let mut count = 0;
        while let Ok(event) = self.receiver.try_recv() {
            if !self.forwards(&event) {
                continue;
            }
            for sink in &mut self.sinks {
                sink.handle(&event);
            }
            count += 1;
        }
        self.delivered += count as u64;
        count
    }

    /// Flushes, then lets every sink finalize.
    pub fn finish(&mut self) {
        self.flush();
        for sink in &mut self.sinks {
            sink.finalize();
        }
    }

    /// Total events delivered since the bus was created.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    pub fn sink_names(&self) -> Vec<&str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
