/*!
Builds the `SERVER` header value, in the three-token form required by the
discovery protocol: `OS/version UPnP/version product/version`.

Grounded in the teacher's `common::user_agent::user_agent_string` (referenced
from `discovery::notify`) and its use of the `os-version` crate.
*/
const UPNP_VERSION: &str = "UPnP/1.1";

/// The product token, supplied by the embedding application (its own name
/// and version), joined with the host OS and UPnP version tokens.
pub fn user_agent_string(product_name: &str, product_version: &str) -> String {
    let os_token = os_version::OsVersion::detect()
        .map(|v| v.to_string().replace(' ', "/"))
        .unwrap_or_else(|_| "unknown/0".to_string());
    format!(
        "{} {} {}/{}",
        os_token, UPNP_VERSION, product_name, product_version
    )
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn contains_product_token() {
        let value = user_agent_string("my-device", "1.0");
        assert!(value.contains("UPnP/1.1"));
        assert!(value.ends_with("my-device/1.0"));
    }
}
