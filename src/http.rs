use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, Json},
    routing::{delete, get, post},
    Router,
};
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer};
use tracing::info;

use crate::device::Command;
use crate::photos::PhotoRecord;
use crate::state::AppState;
use crate::status::StatusSnapshot;

const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Debug, Serialize)]
struct ApiResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ApiResponse {
    fn ok() -> Json<Self> {
        Self::with_success(true)
    }

    fn with_success(success: bool) -> Json<Self> {
        Json(ApiResponse {
            success,
            error: None,
        })
    }

    fn bad_request(error: &str) -> (StatusCode, Json<Self>) {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse {
                success: false,
                error: Some(error.to_string()),
            }),
        )
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/api/status", get(status_handler))
        .route("/api/photos", get(photos_handler))
        .route("/api/photos/:id", delete(delete_photo_handler))
        .route("/api/turnon", post(turn_on_handler))
        .route("/api/turnoff", post(turn_off_handler))
        .route("/api/toggle", post(toggle_handler))
        .route("/api/clear", post(clear_handler))
        .route("/api/message", post(message_handler))
        .layer(
            tower::ServiceBuilder::new()
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn status_handler(State(state): State<AppState>) -> Json<StatusSnapshot> {
    Json(state.monitor().status())
}

async fn photos_handler(State(state): State<AppState>) -> Json<Vec<PhotoRecord>> {
    Json(state.monitor().photos())
}

async fn turn_on_handler(State(state): State<AppState>) -> Json<ApiResponse> {
    state.send(Command::On);
    ApiResponse::ok()
}

async fn turn_off_handler(State(state): State<AppState>) -> Json<ApiResponse> {
    state.send(Command::Off);
    ApiResponse::ok()
}

async fn toggle_handler(State(state): State<AppState>) -> Json<ApiResponse> {
    state.send(Command::Toggle);
    ApiResponse::ok()
}

async fn clear_handler(State(state): State<AppState>) -> Json<ApiResponse> {
    state.monitor().clear_photos();
    ApiResponse::ok()
}

async fn delete_photo_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<ApiResponse> {
    let removed = match id.parse::<i64>() {
        Ok(id) => state.monitor().delete_photo(id),
        Err(_) => false,
    };
    ApiResponse::with_success(removed)
}

/// Body is read raw so that a missing or non-JSON body gets the same 400 as a
/// missing `text` field.
async fn message_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ApiResponse>, (StatusCode, Json<ApiResponse>)> {
    let text = serde_json::from_slice::<Value>(&body)
        .ok()
        .as_ref()
        .and_then(|v| v.get("text"))
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(single_line)
        .ok_or_else(|| ApiResponse::bad_request("Text is required"))?;

    info!("💬 Sending message: {}", text);
    state.send(Command::Message(text));
    Ok(ApiResponse::ok())
}

/// One message must stay one protocol line.
fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

async fn dashboard(State(state): State<AppState>) -> Html<String> {
    let status = state.monitor().status();

    let demo_badge = if state.demo_mode() {
        r#"<div class="demo-badge">🎭 DEMO MODE - Simulated sensor, no board attached</div>"#
    } else {
        ""
    };

    let html = format!(r#"
<!DOCTYPE html>
<html>
<head>
    <title>🛡️ Door Guard</title>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <style>
        * {{ margin: 0; padding: 0; box-sizing: border-box; }}
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Arial, sans-serif;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            min-height: 100vh; padding: 20px;
        }}
        .container {{ max-width: 1200px; margin: 0 auto; }}
        .demo-badge {{
            background: linear-gradient(135deg, #ff9800, #f57c00); color: white;
            padding: 12px 20px; border-radius: 25px; text-align: center;
            margin-bottom: 20px; font-weight: bold; font-size: 14px;
        }}
        .panel {{
            background: white; border-radius: 20px; padding: 30px; margin-bottom: 20px;
            box-shadow: 0 20px 60px rgba(0,0,0,0.3);
        }}
        h1 {{ text-align: center; color: #333; margin-bottom: 20px; font-size: 28px; }}
        h2 {{ color: #555; font-size: 20px; }}
        .status {{
            font-size: 24px; margin: 20px 0; padding: 30px; border-radius: 15px;
            text-align: center; font-weight: bold; transition: all 0.3s ease;
        }}
        .armed {{ background: #4CAF50; color: white; }}
        .disarmed {{ background: #e0e0e0; color: #666; }}
        .alert {{ background: #f44336; color: white; animation: blink 1s infinite; }}
        @keyframes blink {{ 50% {{ opacity: 0.6; }} }}
        .controls {{ display: flex; gap: 15px; margin: 25px 0; }}
        button {{
            flex: 1; padding: 18px; font-size: 18px; cursor: pointer; border-radius: 12px;
            border: none; color: white; font-weight: bold; transition: all 0.3s ease;
        }}
        button:hover {{ transform: translateY(-2px); box-shadow: 0 6px 15px rgba(0,0,0,0.3); }}
        .on {{ background: linear-gradient(135deg, #4CAF50, #45a049); }}
        .off {{ background: linear-gradient(135deg, #f44336, #da190b); }}
        .clear, .send {{ background: linear-gradient(135deg, #ff9800, #f57c00); font-size: 16px; padding: 12px 24px; flex: none; }}
        .delete {{ background: #f44336; font-size: 13px; padding: 6px 12px; flex: none; }}
        .data {{ background: #f5f5f5; padding: 20px; border-radius: 12px; }}
        .data p {{ margin: 10px 0; color: #555; font-size: 16px; }}
        .message {{ display: flex; gap: 10px; margin-top: 20px; }}
        .message input {{ flex: 1; padding: 12px; border: 2px solid #ddd; border-radius: 8px; font-size: 16px; }}
        .photo-header {{ display: flex; justify-content: space-between; align-items: center; }}
        .photo-grid {{
            display: grid; grid-template-columns: repeat(auto-fill, minmax(280px, 1fr));
            gap: 20px; margin-top: 20px;
        }}
        .photo-item {{ background: #f5f5f5; border-radius: 12px; overflow: hidden; }}
        .photo-item img {{ width: 100%; height: 220px; object-fit: cover; background: #e0e0e0; }}
        .photo-info {{ padding: 15px; display: flex; justify-content: space-between; align-items: center; }}
        .photo-info p {{ margin: 5px 0; font-size: 14px; color: #666; }}
        .no-photos {{ text-align: center; color: #999; padding: 60px 20px; font-size: 18px; grid-column: 1 / -1; }}
    </style>
</head>
<body>
    <div class="container">
        {demo_badge}
        <div class="panel">
            <h1>🛡️ Door Guard</h1>
            <div id="status" class="status disarmed">⏳ Loading...</div>
            <div class="controls">
                <button class="on" onclick="command('turnon')">🔓 Turn ON</button>
                <button class="off" onclick="command('turnoff')">🔒 Turn OFF</button>
            </div>
            <div class="data" id="data">
                <p>📏 Distance: {distance} cm</p>
                <p>🚪 Door: {door}</p>
                <p>📷 Photos captured: {photo_count}</p>
            </div>
            <div class="message">
                <input type="text" id="message-text" placeholder="Message to blink on the board">
                <button class="send" onclick="sendMessage()">💬 Send</button>
            </div>
        </div>

        <div class="panel">
            <div class="photo-header">
                <h2>📸 Captured Photos</h2>
                <button class="clear" onclick="clearPhotos()">🗑️ Clear All</button>
            </div>
            <div id="photos" class="photo-grid"></div>
        </div>
    </div>

    <script>
        let lastPhotoCount = -1;

        function updateStatus() {{
            fetch('/api/status')
                .then(r => r.json())
                .then(d => {{
                    const s = document.getElementById('status');
                    if (d.doorOpen) {{
                        s.textContent = '🚨 ALERT - DOOR OPEN!';
                        s.className = 'status alert';
                    }} else if (d.systemOn) {{
                        s.textContent = '✅ ARMED';
                        s.className = 'status armed';
                    }} else {{
                        s.textContent = '💤 DISARMED';
                        s.className = 'status disarmed';
                    }}
                    document.getElementById('data').innerHTML =
                        '<p>📏 Distance: ' + d.distance + ' cm</p>' +
                        '<p>🚪 Door: ' + (d.doorOpen ? 'OPEN ⚠️' : 'CLOSED ✓') + '</p>' +
                        '<p>📷 Photos captured: ' + d.photoCount + '</p>';
                    if (d.photoCount !== lastPhotoCount) {{
                        lastPhotoCount = d.photoCount;
                        loadPhotos();
                    }}
                }})
                .catch(err => console.error('Error:', err));
        }}

        function loadPhotos() {{
            fetch('/api/photos')
                .then(r => r.json())
                .then(photos => {{
                    let html = '';
                    if (photos.length === 0) {{
                        html = '<div class="no-photos">📷 No photos yet</div>';
                    }}
                    photos.forEach(p => {{
                        html += '<div class="photo-item">' +
                            '<img src="' + p.imageUrl + '" alt="Security photo" loading="lazy">' +
                            '<div class="photo-info"><div>' +
                            '<p><strong>📅 ' + p.date + '</strong></p>' +
                            '<p>🕐 ' + p.time + '</p></div>' +
                            '<button class="delete" onclick="deletePhoto(' + p.id + ')">✖</button>' +
                            '</div></div>';
                    }});
                    document.getElementById('photos').innerHTML = html;
                }})
                .catch(err => console.error('Error:', err));
        }}

        function command(name) {{
            fetch('/api/' + name, {{ method: 'POST' }})
                .then(() => setTimeout(updateStatus, 100));
        }}

        function deletePhoto(id) {{
            fetch('/api/photos/' + id, {{ method: 'DELETE' }})
                .then(() => updateStatus());
        }}

        function clearPhotos() {{
            if (confirm('Delete all ' + lastPhotoCount + ' photos?')) {{
                fetch('/api/clear', {{ method: 'POST' }})
                    .then(() => updateStatus());
            }}
        }}

        function sendMessage() {{
            const input = document.getElementById('message-text');
            fetch('/api/message', {{
                method: 'POST',
                headers: {{ 'Content-Type': 'application/json' }},
                body: JSON.stringify({{ text: input.value }})
            }})
                .then(r => r.json())
                .then(d => {{
                    if (d.success) {{
                        input.value = '';
                    }} else {{
                        alert('❌ ' + d.error);
                    }}
                }});
        }}

        setInterval(updateStatus, 500);
        updateStatus();
    </script>
</body>
</html>
    "#,
        demo_badge = demo_badge,
        distance = status.distance,
        door = if status.door_open { "OPEN ⚠️" } else { "CLOSED ✓" },
        photo_count = status.photo_count,
    );

    Html(html)
}
