use async_trait::async_trait;
use roomlink_client::{IceServerEntry, RoomParameterSource, RoomSignalingParameters, SignalingError};
use std::sync::Arc;
use tokio::sync::Notify;

pub const TEST_BASE_URL: &str = "https://rooms.test/";
pub const TEST_POST_PATH: &str = "message?r=42&u=7";

/// Parameters of a well-formed test room.
pub fn test_params() -> RoomSignalingParameters {
    RoomSignalingParameters::new(
        vec![
            IceServerEntry::new("stun:s1", ""),
            IceServerEntry::new("turn:alice@t1", "secret"),
        ],
        TEST_BASE_URL,
        "tok1",
        TEST_POST_PATH,
    )
}

pub fn test_post_url() -> String {
    format!("{TEST_BASE_URL}{TEST_POST_PATH}")
}

/// RoomParameterSource with a canned answer.
pub struct StubResolver {
    params: Option<RoomSignalingParameters>,
    gate: Option<Arc<Notify>>,
}

impl StubResolver {
    pub fn ok(params: RoomSignalingParameters) -> Self {
        Self { params: Some(params), gate: None }
    }

    /// Always reports a full room.
    pub fn room_full() -> Self {
        Self { params: None, gate: None }
    }

    /// Answers only after `gate` is notified.
    pub fn gated(params: RoomSignalingParameters, gate: Arc<Notify>) -> Self {
        Self { params: Some(params), gate: Some(gate) }
    }
}

#[async_trait]
impl RoomParameterSource for StubResolver {
    async fn resolve(&self, _room_url: &str) -> Result<RoomSignalingParameters, SignalingError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.params.clone().ok_or(SignalingError::RoomFull)
    }
}
