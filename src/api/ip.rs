//! Public IP lookup via ipify.
//!
//! Both lookups are best effort: the addresses only enrich the backend's
//! access log, so a failed or slow lookup degrades to `None` instead of
//! blocking registration or scanning.

use std::time::Duration;

use serde::Deserialize;

const IPV4_URL: &str = "https://api.ipify.org?format=json";
const IPV6_URL: &str = "https://api64.ipify.org?format=json";
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// The caller's public addresses, as far as ipify could tell.
#[derive(Debug, Default, Clone)]
pub struct ClientIp {
    pub ipv4: Option<String>,
    pub ipv6: Option<String>,
}

#[derive(Deserialize)]
struct IpifyResponse {
    ip: String,
}

/// Look up the caller's public IPv4 and IPv6 addresses.
pub async fn lookup_client_ip(http: &reqwest::Client) -> ClientIp {
    let (ipv4, ipv6) = tokio::join!(fetch_ip(http, IPV4_URL), fetch_ip(http, IPV6_URL));
    ClientIp { ipv4, ipv6 }
}

async fn fetch_ip(http: &reqwest::Client, url: &str) -> Option<String> {
    let result: Result<String, reqwest::Error> = async {
        let response = http.get(url).timeout(LOOKUP_TIMEOUT).send().await?;
        Ok(response.json::<IpifyResponse>().await?.ip)
    }
    .await;

    match result {
        Ok(ip) if !ip.is_empty() => Some(ip),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!(url, error = %e, "public IP lookup failed");
            None
        }
    }
}
