// Change notification for the statistics store
//
// Writers emit StatsEvents on the bus; subscriptions route them to
// handlers running in background tasks.

// Public API - what other modules can use
pub use bus::EventBus;
pub use events::StatsEvent;
pub use handler::StatsEventHandler;
pub use subscription::Subscription;

// Internal modules
mod bus;
mod events;
mod handler;
mod subscription;
