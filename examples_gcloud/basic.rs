use std::error::Error;
use std::fmt;

use tracing::{debug, error, info, warn};

use tracing_gcloud_sink::init::init_tracing;
use tracing_gcloud_sink::GCloudSink;

#[derive(Debug)]
struct Timeout;

impl fmt::Display for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("upstream timed out after 30s")
    }
}

impl Error for Timeout {}

#[derive(Debug)]
struct AuthFailed(Timeout);

impl fmt::Display for AuthFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("could not reach identity provider")
    }
}

impl Error for AuthFailed {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing(GCloudSink::stdout())?;

    info!(email = "xxx@example.com", userid = "ABC123", "saml attributes for xxx@example.com");
    debug!(label.color = "blue", "cache warmed");
    warn!(attempt = 3, "retrying login");

    let err = AuthFailed(Timeout);
    error!(error = &err as &(dyn Error + 'static), user_id = 42, "authentication failed");

    Ok(())
}
