//! Real-time WebSocket broadcast hub.
//!
//! The hub owns the set of live client connections and fans every published
//! event out to all of them (optionally skipping one), without letting a slow or
//! dead client hold up anyone else.
//!
//! # Architecture
//!
//! - **Coordinator**: a single task owns the connection set. Register,
//!   unregister and broadcast requests reach it over one ordered channel, so the
//!   set is never shared and broadcasts are applied in submission order.
//! - **Connection pumps**: each connection runs a writer task (drains its bounded
//!   outbound queue, sends keepalive pings) and a reader task (watches for client
//!   close, read errors and idleness).
//! - **Backpressure**: a broadcast never waits. A connection whose outbound queue
//!   is full is disconnected.
//! - **Ephemeral messages**: a client that is offline simply misses the event.
//!
//! # Message Flow
//!
//! 1. Client upgrades via `GET /ws` and receives a `Connected` frame with its id
//! 2. The web layer calls [`Hub::attach_websocket`], which registers the
//!    connection and starts its pumps
//! 3. A domain operation commits and publishes a `DomainEvent`
//! 4. [`HubDomainEventHandler`] turns it into an [`Event`] and calls
//!    [`Hub::send_event`], excluding the connection that caused it
//! 5. The coordinator serializes once and enqueues on every other connection
//!
//! # Example: Sending an event
//!
//! ```rust,ignore
//! use hub::message::Event;
//!
//! app_state.hub.send_event(Event::PostCreated { post }, None);
//! ```

pub mod config;
pub mod connection;
mod coordinator;
pub mod domain_event_handler;
pub mod error;
pub mod manager;
pub mod message;
pub mod transport;

pub use config::HubConfig;
pub use connection::{ConnectionId, ConnectionState, Frame};
pub use domain_event_handler::HubDomainEventHandler;
pub use error::{Error, HubErrorKind};
pub use manager::Hub;
pub use message::{Event, Message};
