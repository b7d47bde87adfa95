//! Integration tests for skein-telemetry.

use skein_telemetry::bus::EventBus;
use skein_telemetry::events::{EventKind, SimulationEvent};
use skein_telemetry::sinks::{EventSink, TracingSink, VecSink};

fn convergence(frame: u32, converged: bool) -> SimulationEvent {
    SimulationEvent::new(
        frame,
        EventKind::Convergence {
            status: if converged { 1 } else { 2 },
            avg_iterations: 10.0,
            max_iterations: 10,
            avg_error: 0.0,
            max_error: 0.0,
            converged,
        },
    )
}

// ─── Bus Tests ────────────────────────────────────────────────

#[test]
fn emit_and_flush() {
    let mut bus = EventBus::new();
    let sink = VecSink::new();
    bus.add_sink(Box::new(sink.clone()));

    bus.emit(SimulationEvent::new(0, EventKind::FrameBegin { sim_time: 0.0 }));
    bus.emit(SimulationEvent::new(0, EventKind::FrameEnd { wall_time: 0.001 }));
    assert!(sink.is_empty());

    bus.flush();
    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].label(), "frame_begin");
    assert_eq!(events[1].label(), "frame_end");
}

#[test]
fn disabled_bus_drops_events() {
    let mut bus = EventBus::new();
    let sink = VecSink::new();
    bus.add_sink(Box::new(sink.clone()));
    bus.set_enabled(false);
    assert!(!bus.is_enabled());

    bus.emit(SimulationEvent::new(0, EventKind::FrameBegin { sim_time: 0.0 }));
    bus.flush();
    assert!(sink.is_empty());
}

#[test]
fn multiple_sinks() {
    let mut bus = EventBus::new();
    let a = VecSink::new();
    let b = VecSink::new();
    bus.add_sink(Box::new(a.clone()));
    bus.add_sink(Box::new(b.clone()));
    bus.add_sink(Box::new(TracingSink::new(tracing::Level::DEBUG)));
    assert_eq!(bus.sink_count(), 3);
    assert_eq!(bus.sink_names(), vec!["vec_sink", "vec_sink", "tracing_sink"]);

    bus.emit(SimulationEvent::new(
        3,
        EventKind::Contacts {
            count: 4,
            max_penetration: 0.002,
        },
    ));
    bus.finish();
    assert_eq!(a.len(), 1);
    assert_eq!(b.len(), 1);
}

#[test]
fn frame_stride_keeps_failures() {
    let mut bus = EventBus::new();
    let sink = VecSink::new();
    bus.add_sink(Box::new(sink.clone()));
    bus.set_frame_stride(4);

    for frame in 0..8 {
        bus.emit(convergence(frame, frame != 5));
    }
    assert_eq!(bus.flush(), 3);

    let frames: Vec<u32> = sink.events().iter().map(|e| e.frame).collect();
    assert_eq!(frames, vec![0, 4, 5]);
    assert_eq!(bus.delivered(), 3);
}

#[test]
fn emitter_from_another_thread() {
    let mut bus = EventBus::new();
    let sink = VecSink::new();
    bus.add_sink(Box::new(sink.clone()));

    let emitter = bus.emitter();
    std::thread::spawn(move || {
        for frame in 0..3 {
            emitter.emit(SimulationEvent::new(frame, EventKind::FrameBegin { sim_time: 0.0 }));
        }
    })
    .join()
    .unwrap();

    bus.finish();
    assert_eq!(sink.len(), 3);
}

// ─── Sink and Event Tests ─────────────────────────────────────

#[test]
fn tracing_sink_handles_failures() {
    let mut sink = TracingSink::new(tracing::Level::INFO);
    sink.handle(&SimulationEvent::new(
        1,
        EventKind::Convergence {
            status: 0b10,
            avg_iterations: 100.0,
            max_iterations: 100,
            avg_error: 0.0,
            max_error: 0.0,
            converged: false,
        },
    ));
    assert_eq!(sink.name(), "tracing_sink");
}

#[test]
fn event_serialization() {
    let event = SimulationEvent::new(
        5,
        EventKind::Energy {
            kinetic: 1.0,
            potential: 2.0,
        },
    );
    let json = serde_json::to_string(&event).unwrap();
    let recovered: SimulationEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(recovered, event);
}

#[test]
fn custom_event_label() {
    let event = SimulationEvent::new(
        0,
        EventKind::Custom {
            label: "wind_gust".into(),
            payload: "{}".into(),
        },
    );
    assert_eq!(event.label(), "wind_gust");
}

#[test]
fn convergence_event() {
    let event = SimulationEvent::new(
        10,
        EventKind::Convergence {
            status: 1,
            avg_iterations: 12.5,
            max_iterations: 15,
            avg_error: 1e-3,
            max_error: 2e-3,
            converged: true,
        },
    );
    let json = serde_json::to_string(&event).unwrap();
    assert!(json.contains("converged"));
    assert!(json.contains("Convergence"));
}
