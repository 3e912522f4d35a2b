use crate::error::Error;
use crate::solver::ChallengeRequest;
use serde::{Deserialize, Serialize};

/// The envelope exchanged with the webhook caller, holding either a request or a response.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(super) struct ChallengePayload {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<ChallengeRequestBody>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ChallengeResponse>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ChallengeAction {
    Present,
    CleanUp,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(super) struct ChallengeRequestBody {
    pub uid: String,
    pub action: ChallengeAction,
    #[serde(rename = "type", default)]
    pub challenge_type: String,
    #[serde(default)]
    pub dns_name: String,
    pub key: String,
    pub resource_namespace: String,
    #[serde(rename = "resolvedFQDN")]
    pub resolved_fqdn: String,
    #[serde(default)]
    pub resolved_zone: String,
    #[serde(default)]
    pub allow_ambient_credentials: bool,
    #[serde(default)]
    pub config: Option<serde_json::Value>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub(super) struct ChallengeResponse {
    pub uid: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ChallengeStatus>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub(super) struct ChallengeStatus {
    pub status: String,
    pub message: String,
}

impl ChallengeRequestBody {
    pub fn to_challenge(&self) -> ChallengeRequest {
        ChallengeRequest {
            uid: self.uid.clone(),
            resolved_fqdn: self.resolved_fqdn.clone(),
            key: self.key.clone(),
            resource_namespace: self.resource_namespace.clone(),
            config: self.config.as_ref().map(|v| v.to_string().into_bytes()),
        }
    }
}

impl ChallengeResponse {
    pub fn from_result(uid: String, res: &Result<(), Error>) -> Self {
        match res {
            Ok(()) => Self {
                uid,
                success: true,
                status: None,
            },
            Err(err) => Self {
                uid,
                success: false,
                status: Some(ChallengeStatus {
                    status: "Failure".to_string(),
                    message: error_chain(err),
                }),
            },
        }
    }
}

// "failed to write DNS record: record default/acme-x already exists"
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
