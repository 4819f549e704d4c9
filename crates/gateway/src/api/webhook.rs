//! WhatsApp webhook endpoint.
//!
//! `GET /webhook/whatsapp` answers Meta's subscription verification
//! handshake; `POST /webhook/whatsapp` ingests message deliveries,
//! runs each text message through the dialogue controller, and persists
//! the completed turn. Deliveries are always acked with `EVENT_RECEIVED`
//! once the envelope is recognized — a failed turn is logged, never
//! bounced back to the channel.
//!
//! When an app secret is configured, `POST` bodies must carry a valid
//! `X-Hub-Signature-256: sha256=<hex>` HMAC (verified in constant time).

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use ik_history::ConversationTurn;

use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET — subscription verification
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// `GET /webhook/whatsapp` — echo the challenge iff the token matches.
pub async fn verify(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
) -> Response {
    match challenge_response(&params, state.verify_token.as_deref()) {
        Some(challenge) => {
            tracing::info!("webhook verified");
            (StatusCode::OK, challenge).into_response()
        }
        None => (StatusCode::FORBIDDEN, "Forbidden").into_response(),
    }
}

/// The challenge to echo back, or `None` when verification fails.
fn challenge_response(params: &VerifyParams, expected_token: Option<&str>) -> Option<String> {
    let expected = expected_token?;
    if params.mode.as_deref() == Some("subscribe")
        && params.verify_token.as_deref() == Some(expected)
    {
        params.challenge.clone()
    } else {
        None
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST — message delivery envelope
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
struct WebhookEnvelope {
    #[serde(default)]
    object: String,
    #[serde(default)]
    entry: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(default)]
    changes: Vec<Change>,
}

#[derive(Debug, Deserialize)]
struct Change {
    #[serde(default)]
    value: ChangeValue,
}

#[derive(Debug, Default, Deserialize)]
struct ChangeValue {
    #[serde(default)]
    messages: Vec<InboundMessage>,
    #[serde(default)]
    contacts: Vec<Contact>,
}

#[derive(Debug, Deserialize)]
struct InboundMessage {
    #[serde(default)]
    from: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: Option<TextBody>,
}

#[derive(Debug, Deserialize)]
struct TextBody {
    #[serde(default)]
    body: String,
}

#[derive(Debug, Deserialize)]
struct Contact {
    #[serde(default)]
    wa_id: String,
    #[serde(default)]
    profile: Option<Profile>,
}

#[derive(Debug, Deserialize)]
struct Profile {
    #[serde(default)]
    name: Option<String>,
}

/// One extracted text message, ready for the controller.
#[derive(Debug, PartialEq)]
struct TextMessage {
    sender_id: String,
    sender_name: Option<String>,
    body: String,
}

/// `POST /webhook/whatsapp` — ingest a delivery.
pub async fn receive(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    // 1. Signature check (when an app secret is configured).
    if let Some(ref secret) = state.app_secret {
        let sig_header = headers
            .get("x-hub-signature-256")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if !signature_matches(secret, &body, sig_header) {
            tracing::warn!("webhook delivery with invalid signature rejected");
            return (StatusCode::UNAUTHORIZED, "invalid signature").into_response();
        }
    }

    // 2. Parse the envelope.
    let envelope: WebhookEnvelope = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "webhook delivery with invalid JSON");
            return (StatusCode::BAD_REQUEST, "Invalid JSON").into_response();
        }
    };

    if envelope.object != "whatsapp_business_account" {
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    }

    // 3. Handle each text message, strictly one at a time.
    for message in extract_text_messages(&envelope) {
        handle_text_message(&state, message).await;
    }

    (StatusCode::OK, "EVENT_RECEIVED").into_response()
}

/// Flatten the entry/changes nesting into text messages, resolving sender
/// display names from the contacts block.
fn extract_text_messages(envelope: &WebhookEnvelope) -> Vec<TextMessage> {
    let mut out = Vec::new();
    for entry in &envelope.entry {
        for change in &entry.changes {
            let value = &change.value;
            for message in &value.messages {
                if message.kind != "text" {
                    continue;
                }
                let Some(text) = &message.text else { continue };
                let sender_name = value
                    .contacts
                    .iter()
                    .find(|c| c.wa_id == message.from)
                    .and_then(|c| c.profile.as_ref())
                    .and_then(|p| p.name.clone());
                out.push(TextMessage {
                    sender_id: message.from.clone(),
                    sender_name,
                    body: text.body.clone(),
                });
            }
        }
    }
    out
}

/// Run one text message through the controller and persist the turn.
async fn handle_text_message(state: &AppState, message: TextMessage) {
    tracing::info!(
        sender = %message.sender_id,
        name = message.sender_name.as_deref().unwrap_or("unknown"),
        "inbound message"
    );

    let history = match state
        .turns
        .recent(&message.sender_id, state.config.history.context_turns)
    {
        Ok(turns) => turns,
        Err(e) => {
            tracing::warn!(error = %e, "failed to load turn history; continuing without");
            Vec::new()
        }
    };

    let reply = state
        .controller
        .handle_message(&message.sender_id, &message.body, &history)
        .await;

    let mut turn = ConversationTurn::new(
        &message.sender_id,
        message.sender_name.as_deref(),
        "text",
        &message.body,
    );
    turn.reply = Some(reply);

    if let Err(e) = state.turns.append(&turn) {
        tracing::error!(error = %e, sender = %message.sender_id, "failed to persist turn");
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Signature verification
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Check a Meta-style `sha256=<hex>` signature header against the raw
/// request body. Constant-time comparison to prevent timing attacks.
fn signature_matches(secret: &[u8], body: &[u8], sig_header: &str) -> bool {
    let sig_hex = sig_header.strip_prefix("sha256=").unwrap_or(sig_header);

    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(body);
    let computed = hex::encode(mac.finalize().into_bytes());

    computed.as_bytes().ct_eq(sig_hex.as_bytes()).unwrap_u8() == 1
}
