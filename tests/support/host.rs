use masklabel::labeling::{DisplayHost, Frame};

#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Rendered(Frame),
    Error(String),
}

/// Display host that keeps every call for later assertions.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub events: Vec<HostEvent>,
}

impl RecordingHost {
    pub fn last_frame(&self) -> Option<&Frame> {
        self.events.iter().rev().find_map(|event| match event {
            HostEvent::Rendered(frame) => Some(frame),
            HostEvent::Error(_) => None,
        })
    }

    pub fn errors(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                HostEvent::Error(message) => Some(message.as_str()),
                HostEvent::Rendered(_) => None,
            })
            .collect()
    }

    pub fn render_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, HostEvent::Rendered(_)))
            .count()
    }
}

impl DisplayHost for RecordingHost {
    fn render(&mut self, frame: Frame) {
        self.events.push(HostEvent::Rendered(frame));
    }

    fn show_error(&mut self, message: &str) {
        self.events.push(HostEvent::Error(message.to_string()));
    }
}
