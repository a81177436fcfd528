//! Name greeting backed by a persisted name

use std::rc::Rc;

use crate::persistence::{KeyValueStore, PersistedValue};
use crate::settings::Settings;

/// Prompt shown while no name has been entered
pub const PROMPT: &str = "Please type your name";

pub struct Greeting {
    name: PersistedValue<String>,
}

impl Greeting {
    pub fn new(store: Rc<dyn KeyValueStore>, settings: &Settings) -> Self {
        let name = PersistedValue::new(
            store,
            settings.name_key.as_str(),
            settings.initial_name.clone(),
        );
        Self { name }
    }

    pub fn name(&self) -> &str {
        self.name.get()
    }

    /// Input changed
    pub fn on_name_changed(&mut self, text: &str) {
        self.name.set(text.to_string());
    }

    /// Text shown under the input
    pub fn message(&self) -> String {
        if self.name().is_empty() {
            PROMPT.to_string()
        } else {
            format!("Hello {}", self.name())
        }
    }
}
