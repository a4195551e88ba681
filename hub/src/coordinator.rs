//! The single task that owns the connection set.
//!
//! Every mutation (register, unregister, broadcast) arrives as a [`Command`] on one
//! ordered channel, so the set needs no lock and broadcasts are applied in the
//! order they were submitted.
use crate::connection::{ConnectionHandle, ConnectionId};
use crate::message::BroadcastMessage;
use log::*;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

pub(crate) enum Command {
    Register(ConnectionHandle),
    Unregister(ConnectionId),
    Broadcast(BroadcastMessage),
    Connections(oneshot::Sender<Vec<ConnectionId>>),
}

pub(crate) struct Coordinator {
    connections: HashMap<ConnectionId, ConnectionHandle>,
    commands: mpsc::UnboundedReceiver<Command>,
    shutdown: CancellationToken,
}

impl Coordinator {
    pub(crate) fn new(
        commands: mpsc::UnboundedReceiver<Command>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            connections: HashMap::new(),
            commands,
            shutdown,
        }
    }

    pub(crate) async fn run(mut self) {
        info!("Hub coordinator started");

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                command = self.commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
            }
        }

        self.close_all();
        info!("Hub coordinator stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Register(handle) => self.register(handle),
            Command::Unregister(id) => self.unregister(&id),
            Command::Broadcast(broadcast) => self.broadcast(broadcast),
            Command::Connections(reply) => {
                let _ = reply.send(self.connections.keys().cloned().collect());
            }
        }
    }

    fn register(&mut self, handle: ConnectionHandle) {
        let id = handle.id().clone();

        if let Some(existing) = self.connections.get(&id) {
            if !existing.same_connection(&handle) {
                warn!("Connection id {id} is already registered, closing the newcomer");
                handle.close();
            }
            return;
        }

        if !handle.mark_registered() {
            debug!("Connection {id} closed before it was registered");
            return;
        }

        self.connections.insert(id.clone(), handle);
        info!(
            "Registered connection {id} ({} active)",
            self.connections.len()
        );
    }

    fn unregister(&mut self, id: &ConnectionId) {
        if let Some(handle) = self.connections.remove(id) {
            handle.close();
            info!(
                "Unregistered connection {id} ({} active)",
                self.connections.len()
            );
        }
    }

    fn broadcast(&mut self, broadcast: BroadcastMessage) {
        let message_type = broadcast.message.message_type.clone();

        // Serialized once and shared by every outbound queue.
        let frame: Arc<str> = match broadcast.message.to_json() {
            Ok(json) => json.into(),
            Err(e) => {
                error!("Failed to serialize {message_type} broadcast: {e}");
                return;
            }
        };

        let mut delivered = 0usize;
        let mut dropped = Vec::new();

        for (id, handle) in self.connections.iter() {
            if broadcast.exclude.as_ref() == Some(id) {
                continue;
            }

            match handle.try_enqueue(Arc::clone(&frame)) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!("Dropping connection {id} from {message_type} broadcast: {e}");
                    dropped.push(id.clone());
                }
            }
        }

        for id in dropped {
            self.unregister(&id);
        }

        debug!("Broadcast {message_type} queued for {delivered} connection(s)");
    }

    fn close_all(&mut self) {
        for (_, handle) in self.connections.drain() {
            handle.close();
        }

        // Registrations that raced with shutdown still get closed.
        self.commands.close();
        while let Ok(command) = self.commands.try_recv() {
            if let Command::Register(handle) = command {
                handle.close();
            }
        }
    }
}
