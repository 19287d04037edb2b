use axum::{
    Router,
    extract::{State, WebSocketUpgrade},
    response::Response,
    routing::get,
};

use crate::{services::websocket_service, state::SharedState};

/// Player socket endpoint.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/ws", get(ws_handler))
}

#[utoipa::path(
    get,
    path = "/ws",
    tag = "players",
    description = "Each connection is one player session. Clients send `ClientAction` \
                   frames and receive `ServerMessage` frames as JSON text.",
    responses((status = 101, description = "Switching protocols to WebSocket"))
)]
/// Open a player session on a WebSocket.
pub async fn ws_handler(State(state): State<SharedState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| websocket_service::handle_socket(state, socket))
}
