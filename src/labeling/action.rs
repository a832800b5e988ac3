/// A discrete user event from the display host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    Previous,
    Next,
    /// Assign this label to the current row, then move to the next row.
    Label(String),
}

/// The state change produced by one [`UserAction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: usize,
    pub to: usize,
    /// Label written to row `from`, if any.
    pub labeled: Option<String>,
}

impl Transition {
    /// True when the move passed the end (or start) of the table.
    pub fn wrapped(&self, action: &UserAction) -> bool {
        match action {
            UserAction::Previous => self.to > self.from,
            UserAction::Next | UserAction::Label(_) => self.to < self.from,
        }
    }
}
