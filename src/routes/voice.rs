use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    api::ApiResponse,
    error::AppResult,
    services::{VoiceGate, VoiceMatch, VoiceSample},
};

#[derive(Debug, Deserialize)]
pub struct ResolveVoiceRequest {
    pub samples: Vec<VoiceSample>,
}

#[derive(Debug, Serialize)]
pub struct ResolveVoiceResponse {
    pub matched: bool,
    #[serde(flatten)]
    pub profile: Option<VoiceMatch>,
}

/// POST /api/voice/resolve
pub async fn resolve(
    State(gate): State<VoiceGate>,
    body: Result<Json<ResolveVoiceRequest>, JsonRejection>,
) -> AppResult<ApiResponse<ResolveVoiceResponse>> {
    let Json(body) = body?;

    let profile = gate.resolve(&body.samples)?;
    Ok(ApiResponse::ok(ResolveVoiceResponse {
        matched: profile.is_some(),
        profile,
    }))
}
