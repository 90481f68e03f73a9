//! Change events published by the content stores

mod change_event;

pub use change_event::ChangeEvent;
