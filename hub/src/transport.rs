//! Adapter between axum's WebSocket and the hub's transport-neutral [`Frame`]s.
use crate::connection::{ConnectionId, Frame};
use crate::error::Error;
use crate::manager::Hub;
use axum::extract::ws::{Message as WsMessage, WebSocket};
use futures::future;
use futures::{Sink, SinkExt, Stream, StreamExt};

impl From<WsMessage> for Frame {
    fn from(message: WsMessage) -> Self {
        match message {
            WsMessage::Text(text) => Frame::Text(text),
            WsMessage::Binary(data) => Frame::Binary(data),
            WsMessage::Ping(data) => Frame::Ping(data),
            WsMessage::Pong(data) => Frame::Pong(data),
            WsMessage::Close(_) => Frame::Close,
        }
    }
}

impl From<Frame> for WsMessage {
    fn from(frame: Frame) -> Self {
        match frame {
            Frame::Text(text) => WsMessage::Text(text),
            Frame::Binary(data) => WsMessage::Binary(data),
            Frame::Ping(data) => WsMessage::Ping(data),
            Frame::Pong(data) => WsMessage::Pong(data),
            Frame::Close => WsMessage::Close(None),
        }
    }
}

/// Splits an upgraded socket into the frame sink and frame stream the pumps run on.
pub fn split(
    socket: WebSocket,
) -> (
    impl Sink<Frame, Error = Error> + Unpin + Send + 'static,
    impl Stream<Item = Result<Frame, Error>> + Unpin + Send + 'static,
) {
    let (sink, stream) = socket.split();

    let sink = sink
        .sink_map_err(Error::from)
        .with(|frame: Frame| future::ready(Ok::<WsMessage, Error>(frame.into())));
    let stream = stream.map(|message| message.map(Frame::from).map_err(Error::from));

    (sink, stream)
}

impl Hub {
    /// Attaches an upgraded axum WebSocket.
    pub fn attach_websocket(&self, id: ConnectionId, socket: WebSocket) -> Result<ConnectionId, Error> {
        let (sink, stream) = split(socket);
        self.attach(id, sink, stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_messages_become_close_frames() {
        assert_eq!(Frame::from(WsMessage::Close(None)), Frame::Close);
        assert!(matches!(WsMessage::from(Frame::Close), WsMessage::Close(None)));
    }

    #[test]
    fn text_and_control_frames_keep_their_content() {
        assert_eq!(
            Frame::from(WsMessage::Text("hello".to_string())),
            Frame::Text("hello".to_string())
        );
        assert_eq!(Frame::from(WsMessage::Pong(vec![1, 2])), Frame::Pong(vec![1, 2]));
        assert!(matches!(
            WsMessage::from(Frame::Ping(Vec::new())),
            WsMessage::Ping(data) if data.is_empty()
        ));
    }
}
