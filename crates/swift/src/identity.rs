//! Keystone identity exchange
//!
//! Trades credentials for a bearer token and the service catalog, then
//! resolves the object-store endpoint into a [`Session`].

use reqwest::StatusCode;
use sc_core::session::redact;
use sc_core::{AuthMethod, Credentials, DomainRef, Error, Result, Scope, Session, UserRef};
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;

use crate::catalog::{Catalog, OBJECT_STORE, V2Service, V3Service};

/// Header carrying the issued token in Keystone v3 responses
const SUBJECT_TOKEN_HEADER: &str = "X-Subject-Token";

/// Identity API version, derived from the auth URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityVersion {
    V2,
    V3,
}

/// Pick the identity version and the tokens URL for an auth URL
///
/// `.../v2.0` selects v2.0, `.../v3` selects v3, and any other path gets
/// `v3` appended.
pub fn tokens_url(auth_url: &Url) -> Result<(IdentityVersion, Url)> {
    let mut url = auth_url.clone();
    let last = auth_url
        .path_segments()
        .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
        .unwrap_or_default()
        .to_string();

    let version = {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| Error::Config(format!("invalid identity URL: {auth_url}")))?;
        segments.pop_if_empty();
        match last.as_str() {
            "v2.0" => {
                segments.push("tokens");
                IdentityVersion::V2
            }
            "v3" => {
                segments.extend(["auth", "tokens"]);
                IdentityVersion::V3
            }
            _ => {
                segments.extend(["v3", "auth", "tokens"]);
                IdentityVersion::V3
            }
        }
    };
    url.set_query(None);
    Ok((version, url))
}

/// Authenticate and resolve the object-store endpoint
///
/// Performs the identity exchange, then the catalog lookup. No retries.
pub async fn login(http: &reqwest::Client, credentials: &Credentials) -> Result<Session> {
    let (version, url) = tokens_url(&credentials.auth_url)?;
    tracing::debug!(
        url = %url,
        method = credentials.method.name(),
        ?version,
        "authenticating against identity service"
    );

    let issued = match version {
        IdentityVersion::V3 => exchange_v3(http, &url, credentials).await?,
        IdentityVersion::V2 => exchange_v2(http, &url, credentials).await?,
    };

    if issued.token.is_empty() {
        return Err(Error::Auth("No token ID assigned to the client".into()));
    }
    tracing::info!(token = %redact(&issued.token), "client successfully acquired a token");

    let region = credentials.region.as_deref();
    let endpoint = issued
        .catalog
        .endpoint_for(OBJECT_STORE, region, credentials.interface)?;
    tracing::info!(endpoint = %endpoint, "located a storage service");

    Ok(Session::new(
        issued.token,
        endpoint,
        credentials.region.clone(),
        issued.expires_at,
    ))
}

/// Token and catalog as returned by either identity version
#[derive(Debug)]
struct IssuedToken {
    token: String,
    expires_at: Option<jiff::Timestamp>,
    catalog: Catalog,
}

#[derive(Debug, Deserialize)]
struct V3Response {
    token: V3Token,
}

#[derive(Debug, Deserialize)]
struct V3Token {
    #[serde(default)]
    expires_at: Option<String>,
    #[serde(default)]
    catalog: Vec<V3Service>,
}

#[derive(Debug, Deserialize)]
struct V2Response {
    access: V2Access,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct V2Access {
    token: V2Token,
    #[serde(default)]
    service_catalog: Vec<V2Service>,
}

#[derive(Debug, Deserialize)]
struct V2Token {
    #[serde(default)]
    id: String,
    #[serde(default)]
    expires: Option<String>,
}

async fn exchange_v3(
    http: &reqwest::Client,
    url: &Url,
    credentials: &Credentials,
) -> Result<IssuedToken> {
    let body = v3_request(credentials);
    let response = http
        .post(url.clone())
        .json(&body)
        .send()
        .await
        .map_err(|e| Error::Network(format!("Unable to reach identity service: {e}")))?;
    let response = check_status(response)?;

    let token = response
        .headers()
        .get(SUBJECT_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let parsed: V3Response = response
        .json()
        .await
        .map_err(|e| Error::Auth(format!("Unable to parse identity response: {e}")))?;

    Ok(IssuedToken {
        token,
        expires_at: parse_expiry(parsed.token.expires_at.as_deref()),
        catalog: Catalog::from_v3(parsed.token.catalog),
    })
}

async fn exchange_v2(
    http: &reqwest::Client,
    url: &Url,
    credentials: &Credentials,
) -> Result<IssuedToken> {
    let body = v2_request(credentials)?;
    let response = http
        .post(url.clone())
        .json(&body)
        .send()
        .await
        .map_err(|e| Error::Network(format!("Unable to reach identity service: {e}")))?;
    let response = check_status(response)?;

    let parsed: V2Response = response
        .json()
        .await
        .map_err(|e| Error::Auth(format!("Unable to parse identity response: {e}")))?;

    Ok(IssuedToken {
        token: parsed.access.token.id,
        expires_at: parse_expiry(parsed.access.token.expires.as_deref()),
        catalog: Catalog::from_v2(parsed.access.service_catalog),
    })
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::Auth(format!(
            "Unable to authenticate: credentials rejected ({status})"
        ))),
        s if s.is_client_error() => Err(Error::Auth(format!(
            "Unable to authenticate: identity service returned {status}"
        ))),
        _ => Err(Error::Network(format!(
            "Identity service returned {status}"
        ))),
    }
}

fn parse_expiry(value: Option<&str>) -> Option<jiff::Timestamp> {
    let value = value?;
    match value.parse() {
        Ok(ts) => Some(ts),
        Err(e) => {
            tracing::warn!(value, error = %e, "ignoring unparseable token expiry");
            None
        }
    }
}

fn domain_json(domain: &DomainRef) -> Value {
    match domain {
        DomainRef::Id(id) => json!({ "id": id }),
        DomainRef::Name(name) => json!({ "name": name }),
    }
}

fn user_json(user: &UserRef) -> Value {
    match user {
        UserRef::Id(id) => json!({ "id": id }),
        UserRef::Name { name, domain } => {
            let mut user = json!({ "name": name });
            if let Some(domain) = domain {
                user["domain"] = domain_json(domain);
            }
            user
        }
    }
}

/// Build the Keystone v3 `POST /auth/tokens` body
pub(crate) fn v3_request(credentials: &Credentials) -> Value {
    let identity = match &credentials.method {
        AuthMethod::Password { user, password } => {
            let mut user = user_json(user);
            user["password"] = json!(password);
            json!({ "methods": ["password"], "password": { "user": user } })
        }
        AuthMethod::Token { token } => {
            json!({ "methods": ["token"], "token": { "id": token } })
        }
        AuthMethod::ApplicationCredential {
            id,
            name,
            user,
            secret,
        } => {
            let mut credential = json!({ "secret": secret });
            if let Some(id) = id {
                credential["id"] = json!(id);
            } else {
                credential["name"] = json!(name);
                if let Some(user) = user {
                    credential["user"] = user_json(user);
                }
            }
            json!({ "methods": ["application_credential"], "application_credential": credential })
        }
    };

    let mut auth = json!({ "identity": identity });
    let scope = match &credentials.scope {
        Scope::Unscoped => None,
        Scope::ProjectId(id) => Some(json!({ "project": { "id": id } })),
        Scope::ProjectName { name, domain } => {
            let mut project = json!({ "name": name });
            if let Some(domain) = domain {
                project["domain"] = domain_json(domain);
            }
            Some(json!({ "project": project }))
        }
        Scope::Domain(domain) => Some(json!({ "domain": domain_json(domain) })),
    };
    if let Some(scope) = scope {
        auth["scope"] = scope;
    }
    json!({ "auth": auth })
}

/// Build the Keystone v2.0 `POST /tokens` body
pub(crate) fn v2_request(credentials: &Credentials) -> Result<Value> {
    let mut auth = match &credentials.method {
        AuthMethod::Password {
            user: UserRef::Name { name, .. },
            password,
        } => json!({ "passwordCredentials": { "username": name, "password": password } }),
        AuthMethod::Password {
            user: UserRef::Id(_),
            ..
        } => {
            return Err(Error::Config(
                "Identity v2.0 does not accept OS_USERID; use OS_USERNAME".into(),
            ));
        }
        AuthMethod::Token { token } => json!({ "token": { "id": token } }),
        AuthMethod::ApplicationCredential { .. } => {
            return Err(Error::Config(
                "Application credentials require identity v3".into(),
            ));
        }
    };

    match &credentials.scope {
        Scope::ProjectId(id) => auth["tenantId"] = json!(id),
        Scope::ProjectName { name, .. } => auth["tenantName"] = json!(name),
        Scope::Unscoped | Scope::Domain(_) => {}
    }
    Ok(json!({ "auth": auth }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use sc_core::Interface;

    fn password_credentials(auth_url: &str) -> Credentials {
        Credentials {
            auth_url: Url::parse(auth_url).unwrap(),
            method: AuthMethod::Password {
                user: UserRef::Name {
                    name: "demo".into(),
                    domain: Some(DomainRef::Name("Default".into())),
                },
                password: "secret".into(),
            },
            scope: Scope::ProjectName {
                name: "demo".into(),
                domain: Some(DomainRef::Id("default".into())),
            },
            region: Some("RegionOne".into()),
            interface: Interface::Public,
        }
    }

    fn v3_body(storage_url: &str) -> Value {
        json!({
            "token": {
                "expires_at": "2099-01-01T00:00:00.000000Z",
                "catalog": [{
                    "type": "object-store",
                    "name": "swift",
                    "endpoints": [
                        {"interface": "public", "region_id": "RegionOne", "url": storage_url},
                        {"interface": "public", "region_id": "RegionTwo", "url": "https://elsewhere.example.com/v1/AUTH_demo"}
                    ]
                }]
            }
        })
    }

    #[test]
    fn test_tokens_url() {
        let cases = [
            ("https://k.example.com:5000/v3", IdentityVersion::V3, "/v3/auth/tokens"),
            ("https://k.example.com:5000/v3/", IdentityVersion::V3, "/v3/auth/tokens"),
            ("https://k.example.com:5000/v2.0", IdentityVersion::V2, "/v2.0/tokens"),
            ("https://k.example.com:5000/", IdentityVersion::V3, "/v3/auth/tokens"),
            ("https://k.example.com/identity", IdentityVersion::V3, "/identity/v3/auth/tokens"),
        ];
        for (input, version, path) in cases {
            let (v, url) = tokens_url(&Url::parse(input).unwrap()).unwrap();
            assert_eq!(v, version, "{input}");
            assert_eq!(url.path(), path, "{input}");
        }
    }

    #[test]
    fn test_v3_password_request() {
        let body = v3_request(&password_credentials("http://k/v3"));
        assert_eq!(body["auth"]["identity"]["methods"], json!(["password"]));
        assert_eq!(
            body["auth"]["identity"]["password"]["user"],
            json!({"name": "demo", "domain": {"name": "Default"}, "password": "secret"})
        );
        assert_eq!(
            body["auth"]["scope"],
            json!({"project": {"name": "demo", "domain": {"id": "default"}}})
        );
    }

    #[test]
    fn test_v3_application_credential_request_is_unscoped() {
        let mut credentials = password_credentials("http://k/v3");
        credentials.method = AuthMethod::ApplicationCredential {
            id: Some("ac-1".into()),
            name: None,
            user: None,
            secret: "s".into(),
        };
        credentials.scope = Scope::Unscoped;
        let body = v3_request(&credentials);
        assert_eq!(
            body["auth"]["identity"]["application_credential"],
            json!({"id": "ac-1", "secret": "s"})
        );
        assert!(body["auth"].get("scope").is_none());
    }

    #[test]
    fn test_v2_request() {
        let body = v2_request(&password_credentials("http://k/v2.0")).unwrap();
        assert_eq!(
            body,
            json!({"auth": {
                "passwordCredentials": {"username": "demo", "password": "secret"},
                "tenantName": "demo"
            }})
        );

        let mut credentials = password_credentials("http://k/v2.0");
        credentials.method = AuthMethod::ApplicationCredential {
            id: Some("ac-1".into()),
            name: None,
            user: None,
            secret: "s".into(),
        };
        assert!(matches!(v2_request(&credentials), Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_login_v3() {
        let server = MockServer::start_async().await;
        let storage_url = server.url("/v1/AUTH_demo");
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v3/auth/tokens")
                    .json_body_partial(r#"{"auth": {"identity": {"methods": ["password"]}}}"#);
                then.status(201)
                    .header("X-Subject-Token", "gAAAAAB-token")
                    .json_body(v3_body(&storage_url));
            })
            .await;

        let http = reqwest::Client::new();
        let session = login(&http, &password_credentials(&server.url("/v3")))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(session.require_active().unwrap(), "gAAAAAB-token");
        assert_eq!(session.endpoint().as_str(), storage_url);
        assert_eq!(session.region(), Some("RegionOne"));
        assert!(session.expires_at().is_some());
    }

    #[tokio::test]
    async fn test_login_v3_without_token_header() {
        let server = MockServer::start_async().await;
        let storage_url = server.url("/v1/AUTH_demo");
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v3/auth/tokens");
                then.status(201).json_body(v3_body(&storage_url));
            })
            .await;

        let http = reqwest::Client::new();
        let err = login(&http, &password_credentials(&server.url("/v3")))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v3/auth/tokens");
                then.status(401)
                    .json_body(json!({"error": {"code": 401, "title": "Unauthorized"}}));
            })
            .await;

        let http = reqwest::Client::new();
        let err = login(&http, &password_credentials(&server.url("/v3")))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn test_login_server_error_is_network() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v3/auth/tokens");
                then.status(503);
            })
            .await;

        let http = reqwest::Client::new();
        let err = login(&http, &password_credentials(&server.url("/v3")))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Network(_)));
    }

    #[tokio::test]
    async fn test_login_region_not_in_catalog() {
        let server = MockServer::start_async().await;
        let storage_url = server.url("/v1/AUTH_demo");
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v3/auth/tokens");
                then.status(201)
                    .header("X-Subject-Token", "tok")
                    .json_body(v3_body(&storage_url));
            })
            .await;

        let mut credentials = password_credentials(&server.url("/v3"));
        credentials.region = Some("RegionNine".into());
        let http = reqwest::Client::new();
        let err = login(&http, &credentials).await.unwrap_err();
        assert!(matches!(err, Error::EndpointNotFound(_)));
    }

    #[tokio::test]
    async fn test_login_v2() {
        let server = MockServer::start_async().await;
        let storage_url = server.url("/v1/AUTH_demo");
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v2.0/tokens")
                    .json_body_partial(r#"{"auth": {"tenantName": "demo"}}"#);
                then.status(200).json_body(json!({
                    "access": {
                        "token": {"id": "v2-token", "expires": "2099-01-01T00:00:00Z"},
                        "serviceCatalog": [{
                            "type": "object-store",
                            "name": "swift",
                            "endpoints": [{"region": "RegionOne", "publicURL": storage_url}]
                        }]
                    }
                }));
            })
            .await;

        let http = reqwest::Client::new();
        let session = login(&http, &password_credentials(&server.url("/v2.0")))
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(session.require_active().unwrap(), "v2-token");
        assert_eq!(session.endpoint().as_str(), storage_url);
    }

    #[tokio::test]
    async fn test_login_v2_empty_token() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v2.0/tokens");
                then.status(200).json_body(json!({
                    "access": {"token": {"id": ""}, "serviceCatalog": []}
                }));
            })
            .await;

        let http = reqwest::Client::new();
        let err = login(&http, &password_credentials(&server.url("/v2.0")))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }
}
