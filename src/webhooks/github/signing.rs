use anyhow::anyhow;
use hmac::{Hmac, Mac};
use rocket::{
    data::{ByteUnit, FromData, Outcome},
    http::{ContentType, Status},
    Data, Request,
};
use sha2::Sha256;
use tracing::{debug, trace};

use crate::webhooks::github::GitHubSecret;

const X_GITHUB_SIGNATURE: &str = "X-Hub-Signature-256";

type HmacSha256 = Hmac<Sha256>;

fn validate_signature(secret: &str, signature: &str, data: &str) -> bool {
    trace!("validating signature...");

    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };

    mac.update(data.as_bytes());

    // GitHub puts a prefix in front of its hex SHA256
    let signature = match signature.strip_prefix("sha256=") {
        Some(s) => s,
        None => {
            trace!("couldn't strip prefix from signature `{}`", signature);
            return false;
        }
    };

    match hex::decode(signature) {
        Ok(bytes) => mac.verify_slice(&bytes).is_ok(),
        Err(_) => {
            trace!("couldn't decode hex-encoded signature {}", signature);
            false
        }
    }
}

/// Signature header GitHub would send along `data`.
#[cfg(test)]
pub(crate) fn signature_header(secret: &str, data: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC takes any key size");
    mac.update(data.as_bytes());
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

/// Body of a webhook delivery whose signature matched the shared secret.
pub struct SignedGitHubPayload(pub String);

const DEFAULT_LIMIT: ByteUnit = ByteUnit::Mebibyte(1);

#[rocket::async_trait]
impl<'r> FromData<'r> for SignedGitHubPayload {
    type Error = anyhow::Error;

    async fn from_data(request: &'r Request<'_>, data: Data<'r>) -> Outcome<'r, Self> {
        let Some(secret) = request.rocket().state::<GitHubSecret>() else {
            return Outcome::Error((
                Status::InternalServerError,
                anyhow!("webhook secret isn't configured"),
            ));
        };

        if request.content_type() != Some(&ContentType::JSON) {
            debug!(
                "rejecting delivery with content type {:?}",
                request.content_type()
            );
            return Outcome::Error((
                Status::BadRequest,
                anyhow!("deliveries must be sent as application/json"),
            ));
        }

        let signatures: Vec<_> = request.headers().get(X_GITHUB_SIGNATURE).collect();
        let [signature] = signatures[..] else {
            debug!(
                "rejecting delivery with {} {} headers",
                signatures.len(),
                X_GITHUB_SIGNATURE
            );
            return Outcome::Error((
                Status::BadRequest,
                anyhow!("delivery needs exactly one {} header", X_GITHUB_SIGNATURE),
            ));
        };

        let limit = request.limits().get("json").unwrap_or(DEFAULT_LIMIT);
        let body = match data.open(limit).into_string().await {
            Ok(body) if body.is_complete() => body.into_inner(),
            Ok(_) => {
                debug!("rejecting delivery larger than {}", limit);
                return Outcome::Error((
                    Status::PayloadTooLarge,
                    anyhow!("delivery exceeds the {} limit", limit),
                ));
            }
            Err(e) => {
                return Outcome::Error((
                    Status::BadRequest,
                    anyhow!(e).context("couldn't read delivery body"),
                ))
            }
        };

        if !validate_signature(&secret.0, signature, &body) {
            debug!("rejecting delivery whose signature doesn't match the webhook secret");
            return Outcome::Error((
                Status::BadRequest,
                anyhow!("signature doesn't match the webhook secret"),
            ));
        }

        trace!("delivery signature verified");
        Outcome::Success(SignedGitHubPayload(body))
    }
}
