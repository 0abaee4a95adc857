pub mod channels;

pub use channels::EventBus;
