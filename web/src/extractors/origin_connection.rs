use crate::CONNECTION_ID_HEADER;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;

/// The WebSocket connection id a REST client sent in `x-connection-id`, if any.
///
/// Events caused by the request are not delivered back to that connection.
pub(crate) struct OriginConnection(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for OriginConnection
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let connection_id = parts
            .headers
            .get(CONNECTION_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned);

        Ok(OriginConnection(connection_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Option<String> {
        let (mut parts, _) = request.into_parts();
        let OriginConnection(connection_id) = OriginConnection::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        connection_id
    }

    #[tokio::test]
    async fn reads_the_connection_id_header() {
        let request = Request::builder()
            .header(CONNECTION_ID_HEADER, " abc-123 ")
            .body(())
            .unwrap();

        assert_eq!(extract(request).await.as_deref(), Some("abc-123"));
    }

    #[tokio::test]
    async fn missing_or_blank_header_means_no_origin() {
        assert_eq!(extract(Request::builder().body(()).unwrap()).await, None);

        let blank = Request::builder()
            .header(CONNECTION_ID_HEADER, "  ")
            .body(())
            .unwrap();
        assert_eq!(extract(blank).await, None);
    }
}
