use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use hub::{ConnectionId, Event, Hub, Message};
use log::*;
use service::AppState;

/// Upgrades the request to a WebSocket and subscribes it to the hub.
///
/// The first frame on the socket is `Connected`, carrying the id the client can send
/// back in `x-connection-id` to avoid hearing about its own writes.
pub(crate) async fn ws_handler(ws: WebSocketUpgrade, State(app_state): State<AppState>) -> Response {
    let hub = app_state.hub.clone();

    ws.on_failed_upgrade(|e| warn!("WebSocket upgrade failed: {e}"))
        .on_upgrade(move |socket| subscribe(hub, socket))
}

async fn subscribe(hub: Hub, mut socket: WebSocket) {
    if hub.is_shutdown() {
        debug!("Refusing WebSocket connection, the hub is shut down");
        let _ = socket.send(WsMessage::Close(None)).await;
        return;
    }

    let connection_id = ConnectionId::new();

    let greeting = match Message::from(Event::Connected {
        connection_id: connection_id.clone(),
    })
    .to_json()
    {
        Ok(greeting) => greeting,
        Err(e) => {
            error!("Failed to serialize Connected frame: {e}");
            return;
        }
    };

    if let Err(e) = socket.send(WsMessage::Text(greeting)).await {
        debug!("Client {connection_id} went away before it was registered: {e}");
        return;
    }

    match hub.attach_websocket(connection_id, socket) {
        Ok(connection_id) => debug!("WebSocket connection {connection_id} attached"),
        Err(e) => warn!("Failed to attach WebSocket connection: {e}"),
    }
}
