use crate::config::HubConfig;
use crate::connection::{Connection, ConnectionId, Frame};
use crate::coordinator::{Command, Coordinator};
use crate::error::Error;
use crate::message::{BroadcastMessage, Event, Message};
use futures::{Sink, Stream};
use log::*;
use std::fmt;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Cloneable handle to a running hub.
///
/// Every clone talks to the same coordinator task. Construct one with
/// [`Hub::start`] and store it in application state; there is no global instance.
#[derive(Clone)]
pub struct Hub {
    commands: mpsc::UnboundedSender<Command>,
    shutdown: CancellationToken,
    tasks: TaskTracker,
    config: HubConfig,
}

impl Hub {
    /// Spawns the coordinator on the current tokio runtime. Fails without spawning
    /// anything if `config` doesn't pass [`HubConfig::validate`].
    pub fn start(config: HubConfig) -> Result<Self, Error> {
        config.validate()?;

        let (commands, receiver) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let tasks = TaskTracker::new();

        tasks.spawn(Coordinator::new(receiver, shutdown.clone()).run());

        info!(
            "Hub started (queue capacity {}, ping every {:?}, keepalive {:?})",
            config.outbound_queue_capacity, config.ping_interval, config.keepalive_timeout
        );

        Ok(Self {
            commands,
            shutdown,
            tasks,
            config,
        })
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Hands an upgraded transport to the hub: registers it under `id` and starts
    /// its reader and writer pumps.
    pub fn attach<S, R, E>(&self, id: ConnectionId, sink: S, stream: R) -> Result<ConnectionId, Error>
    where
        S: Sink<Frame> + Unpin + Send + 'static,
        S::Error: fmt::Display + Send,
        R: Stream<Item = Result<Frame, E>> + Unpin + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        if self.shutdown.is_cancelled() {
            warn!("Rejecting connection {id}, hub is shut down");
            return Err(Error::shutdown());
        }

        let connection = Connection::new(
            id.clone(),
            self.config.outbound_queue_capacity,
            self.shutdown.child_token(),
        );

        self.commands
            .send(Command::Register(connection.handle().clone()))
            .map_err(|_| Error::shutdown())?;

        connection.spawn(sink, stream, &self.config, &self.commands, &self.tasks);

        Ok(id)
    }

    /// Removes a connection and closes it. Unknown ids are ignored.
    pub fn unregister(&self, id: &ConnectionId) {
        if self.commands.send(Command::Unregister(id.clone())).is_err() {
            debug!("Hub is shut down, ignoring unregister of {id}");
        }
    }

    /// Fans `message` out to every connection except `exclude`.
    ///
    /// Never blocks and never fails from the caller's point of view; connections
    /// that can't keep up are disconnected by the coordinator.
    pub fn broadcast(&self, message: Message, exclude: Option<ConnectionId>) {
        let message_type = message.message_type.clone();
        if self
            .commands
            .send(Command::Broadcast(BroadcastMessage { message, exclude }))
            .is_err()
        {
            debug!("Hub is shut down, dropping {message_type} broadcast");
        }
    }

    pub fn send_event(&self, event: Event, exclude: Option<ConnectionId>) {
        self.broadcast(event.into(), exclude);
    }

    /// Snapshot of the currently registered connection ids.
    pub async fn connections(&self) -> Result<Vec<ConnectionId>, Error> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Connections(reply))
            .map_err(|_| Error::shutdown())?;
        response.await.map_err(|_| Error::shutdown())
    }

    pub async fn connection_count(&self) -> Result<usize, Error> {
        Ok(self.connections().await?.len())
    }

    /// Closes every connection, stops the coordinator and waits until no hub task
    /// is left running. Safe to call more than once.
    pub async fn shutdown(&self) {
        if !self.shutdown.is_cancelled() {
            info!("Shutting down hub");
        }

        self.shutdown.cancel();
        self.tasks.close();
        self.tasks.wait().await;

        info!("Hub shut down");
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Number of hub tasks (coordinator and pumps) still running.
    pub fn active_tasks(&self) -> usize {
        self.tasks.len()
    }
}
