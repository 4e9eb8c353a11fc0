use crate::domain::ports::Page;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct PageState {
    location: String,
    navigations: Vec<String>,
}

/// A page held in memory, standing in for a browser window.
///
/// Records every full navigation so callers can see where the flow sent the
/// payer. Used by the CLI and by tests.
#[derive(Debug, Default)]
pub struct InMemoryPage {
    state: Mutex<PageState>,
}

impl InMemoryPage {
    /// Creates a page currently showing `location`.
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(PageState {
                location: location.into(),
                navigations: Vec::new(),
            }),
        }
    }

    /// Navigations performed so far, oldest first.
    pub fn navigations(&self) -> Vec<String> {
        self.lock().navigations.clone()
    }

    pub fn last_navigation(&self) -> Option<String> {
        self.lock().navigations.last().cloned()
    }

    fn lock(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Page for InMemoryPage {
    fn location(&self) -> String {
        self.lock().location.clone()
    }

    fn replace_location(&self, url: &str) {
        self.lock().location = url.to_string();
    }

    fn navigate(&self, url: &str) {
        let mut state = self.lock();
        state.location = url.to_string();
        state.navigations.push(url.to_string());
    }
}
