use crate::errors::ListError;

/// Actions offered on a day-off row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayOffAction {
    Cancel,
    Move,
    Exclude,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogState<A> {
    Closed,
    ChoosingAction,
    ActionOpen(A),
}

impl<A> DialogState<A> {
    fn name(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::ChoosingAction => "choosing an action",
            Self::ActionOpen(_) => "open",
        }
    }
}

/// Transient confirmation flow: pick an action for a row, fill it in, submit or
/// cancel. Invalid transitions are rejected and leave the state untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDialog<A> {
    state: DialogState<A>,
}

impl<A> Default for ActionDialog<A> {
    fn default() -> Self {
        Self {
            state: DialogState::Closed,
        }
    }
}

impl<A: Clone> ActionDialog<A> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &DialogState<A> {
        &self.state
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        !matches!(self.state, DialogState::Closed)
    }

    fn reject(&self, action: &'static str) -> ListError {
        ListError::InvalidTransition {
            from: self.state.name(),
            action,
        }
    }

    /// # Errors
    /// Only allowed while closed.
    pub fn open(&mut self) -> Result<(), ListError> {
        match self.state {
            DialogState::Closed => {
                self.state = DialogState::ChoosingAction;
                Ok(())
            }
            _ => Err(self.reject("open")),
        }
    }

    /// # Errors
    /// Only allowed while choosing an action.
    pub fn choose(&mut self, action: A) -> Result<(), ListError> {
        match self.state {
            DialogState::ChoosingAction => {
                self.state = DialogState::ActionOpen(action);
                Ok(())
            }
            _ => Err(self.reject("choose")),
        }
    }

    /// Return from an open action to the action list.
    ///
    /// # Errors
    /// Only allowed while an action is open.
    pub fn back(&mut self) -> Result<(), ListError> {
        match self.state {
            DialogState::ActionOpen(_) => {
                self.state = DialogState::ChoosingAction;
                Ok(())
            }
            _ => Err(self.reject("go back")),
        }
    }

    /// The open action was submitted successfully; close and return it.
    ///
    /// # Errors
    /// Only allowed while an action is open.
    pub fn submitted(&mut self) -> Result<A, ListError> {
        match &self.state {
            DialogState::ActionOpen(action) => {
                let action = action.clone();
                self.state = DialogState::Closed;
                Ok(action)
            }
            _ => Err(self.reject("submit")),
        }
    }

    /// Close from any state.
    pub fn cancel(&mut self) {
        self.state = DialogState::Closed;
    }
}
