use foundation::time::Time;

use crate::frame::Frame;

/// Choreography subsystem a trace event originates from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Topic {
    /// Narrative phase transitions and ignored/refused triggers.
    Story,
    /// Snapshot fetches: preloads, stale discards, failures.
    Load,
}

impl Topic {
    pub fn label(self) -> &'static str {
        match self {
            Topic::Story => "story",
            Topic::Load => "load",
        }
    }
}

/// One trace event, stamped with the frame it happened on.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub frame_index: u64,
    pub time: Time,
    pub topic: Topic,
    pub message: String,
}

/// Frame-stamped trace log for the choreography.
///
/// The sequencer reports through the bus instead of logging; the host
/// drains it once per frame and forwards to its logger of choice. Keeping
/// the log in engine time (frame index + `Time`) is what lets tests driven
/// by a synthetic clock assert on the exact ordering of narrative events.
#[derive(Debug, Default)]
pub struct EventBus {
    events: Vec<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, frame: Frame, topic: Topic, message: impl Into<String>) {
        self.events.push(Event {
            frame_index: frame.index,
            time: frame.time,
            topic,
            message: message.into(),
        });
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn on_topic<'a>(&'a self, topic: Topic) -> impl Iterator<Item = &'a Event> + 'a {
        self.events.iter().filter(move |e| e.topic == topic)
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::{EventBus, Topic};
    use crate::frame::Frame;
    use foundation::time::Time;

    #[test]
    fn events_carry_frame_index_and_time() {
        let mut bus = EventBus::new();
        let f = Frame::start().advance(0.5).advance(0.25);
        bus.emit(f, Topic::Story, "phase -> Zooming");
        assert_eq!(bus.events().len(), 1);
        assert_eq!(bus.events()[0].frame_index, 2);
        assert_eq!(bus.events()[0].time, Time(0.75));
    }

    #[test]
    fn filters_by_topic() {
        let mut bus = EventBus::new();
        let f = Frame::start();
        bus.emit(f, Topic::Story, "enter");
        bus.emit(f, Topic::Load, "preload em-1952");
        bus.emit(f, Topic::Story, "leave");
        assert_eq!(bus.on_topic(Topic::Story).count(), 2);
        assert_eq!(bus.on_topic(Topic::Load).count(), 1);
    }

    #[test]
    fn drain_clears_the_log() {
        let mut bus = EventBus::new();
        bus.emit(Frame::start(), Topic::Load, "em-1850 failed");
        let drained = bus.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].topic.label(), "load");
        assert!(bus.events().is_empty());
    }
}
