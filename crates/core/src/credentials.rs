//! Credential resolution
//!
//! Builds the identity parameters used to log in from the standard OpenStack
//! `OS_*` environment variables, falling back to the configuration file.
//! No network I/O happens here.

use std::fmt;

use url::Url;

use crate::config::Config;
use crate::error::{Error, Result};

/// A domain, referenced by id or by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainRef {
    Id(String),
    Name(String),
}

/// A user, referenced by id or by name within an optional domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserRef {
    Id(String),
    Name {
        name: String,
        domain: Option<DomainRef>,
    },
}

/// How to prove identity to Keystone
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMethod {
    /// User and password
    Password { user: UserRef, password: String },

    /// A previously issued token
    Token { token: String },

    /// Application credential, by id or by name for a given user
    ApplicationCredential {
        id: Option<String>,
        name: Option<String>,
        user: Option<UserRef>,
        secret: String,
    },
}

impl AuthMethod {
    /// Short name of the method, safe to log
    pub fn name(&self) -> &'static str {
        match self {
            AuthMethod::Password { .. } => "password",
            AuthMethod::Token { .. } => "token",
            AuthMethod::ApplicationCredential { .. } => "application_credential",
        }
    }
}

// Secrets never reach Debug output.
impl fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMethod::Password { user, .. } => f
                .debug_struct("Password")
                .field("user", user)
                .field("password", &"<redacted>")
                .finish(),
            AuthMethod::Token { .. } => f
                .debug_struct("Token")
                .field("token", &"<redacted>")
                .finish(),
            AuthMethod::ApplicationCredential { id, name, user, .. } => f
                .debug_struct("ApplicationCredential")
                .field("id", id)
                .field("name", name)
                .field("user", user)
                .field("secret", &"<redacted>")
                .finish(),
        }
    }
}

/// Authorization scope requested for the token
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Scope {
    #[default]
    Unscoped,
    ProjectId(String),
    ProjectName {
        name: String,
        domain: Option<DomainRef>,
    },
    Domain(DomainRef),
}

/// Endpoint interface to pick from the service catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Interface {
    #[default]
    Public,
    Internal,
    Admin,
}

impl Interface {
    /// Keystone v3 catalog name of the interface
    pub fn as_str(self) -> &'static str {
        match self {
            Interface::Public => "public",
            Interface::Internal => "internal",
            Interface::Admin => "admin",
        }
    }
}

impl std::str::FromStr for Interface {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "public" | "publicurl" => Ok(Interface::Public),
            "internal" | "internalurl" => Ok(Interface::Internal),
            "admin" | "adminurl" => Ok(Interface::Admin),
            other => Err(Error::Config(format!("Unknown endpoint interface: {other}"))),
        }
    }
}

/// Everything needed to log in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Identity service URL
    pub auth_url: Url,
    pub method: AuthMethod,
    pub scope: Scope,
    /// Region used for catalog lookup; `None` matches any region
    pub region: Option<String>,
    pub interface: Interface,
}

impl Credentials {
    /// Resolve credentials from the process environment, then the config file
    pub fn from_env(config: &Config) -> Result<Self> {
        Self::from_sources(|var| std::env::var(var).ok(), config)
    }

    /// Resolve credentials from an environment lookup layered over `config`
    ///
    /// An empty environment value is treated as unset, so the config value
    /// still applies.
    pub fn from_sources<E>(env: E, config: &Config) -> Result<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        Self::resolve(|var| {
            env(var)
                .filter(|v| !v.is_empty())
                .or_else(|| config.value_for(var).map(str::to_string))
        })
    }

    /// Resolve credentials through an arbitrary variable lookup
    ///
    /// Empty values count as unset.
    pub fn resolve<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.is_empty());
        let first = |vars: &[&str]| vars.iter().find_map(|v| get(v));

        let auth_url = get("OS_AUTH_URL")
            .ok_or_else(|| Error::Config("OS_AUTH_URL must be set".into()))?;
        let auth_url = Url::parse(&auth_url)?;

        let user_domain = domain_ref(
            first(&["OS_USER_DOMAIN_ID", "OS_DOMAIN_ID"]),
            first(&["OS_USER_DOMAIN_NAME", "OS_DOMAIN_NAME"]),
        );
        let user = match (get("OS_USERID"), get("OS_USERNAME")) {
            (Some(id), _) => Some(UserRef::Id(id)),
            (None, Some(name)) => Some(UserRef::Name {
                name,
                domain: user_domain,
            }),
            (None, None) => None,
        };

        let method = if let Some(token) = get("OS_TOKEN") {
            AuthMethod::Token { token }
        } else if let Some(secret) = get("OS_APPLICATION_CREDENTIAL_SECRET") {
            let id = get("OS_APPLICATION_CREDENTIAL_ID");
            let name = get("OS_APPLICATION_CREDENTIAL_NAME");
            match (&id, &name, &user) {
                (Some(_), _, _) => {}
                (None, Some(_), Some(_)) => {}
                (None, Some(_), None) => {
                    return Err(Error::Config(
                        "OS_APPLICATION_CREDENTIAL_NAME requires OS_USERID or OS_USERNAME".into(),
                    ));
                }
                (None, None, _) => {
                    return Err(Error::Config(
                        "OS_APPLICATION_CREDENTIAL_ID or OS_APPLICATION_CREDENTIAL_NAME must be set"
                            .into(),
                    ));
                }
            }
            AuthMethod::ApplicationCredential {
                id,
                name,
                user,
                secret,
            }
        } else {
            let user = user.ok_or_else(|| {
                Error::Config("OS_USERID or OS_USERNAME must be set".into())
            })?;
            let password = get("OS_PASSWORD")
                .ok_or_else(|| Error::Config("OS_PASSWORD must be set".into()))?;
            AuthMethod::Password { user, password }
        };

        // Application credentials carry their own scope.
        let scope = if matches!(method, AuthMethod::ApplicationCredential { .. }) {
            Scope::Unscoped
        } else if let Some(id) = first(&["OS_PROJECT_ID", "OS_TENANT_ID"]) {
            Scope::ProjectId(id)
        } else if let Some(name) = first(&["OS_PROJECT_NAME", "OS_TENANT_NAME"]) {
            Scope::ProjectName {
                name,
                domain: domain_ref(
                    first(&["OS_PROJECT_DOMAIN_ID", "OS_DOMAIN_ID"]),
                    first(&["OS_PROJECT_DOMAIN_NAME", "OS_DOMAIN_NAME"]),
                ),
            }
        } else if let Some(domain) = domain_ref(get("OS_DOMAIN_ID"), get("OS_DOMAIN_NAME")) {
            Scope::Domain(domain)
        } else {
            Scope::Unscoped
        };

        let interface = match get("OS_INTERFACE") {
            Some(value) => value.parse()?,
            None => Interface::default(),
        };

        Ok(Self {
            auth_url,
            method,
            scope,
            region: get("OS_REGION_NAME"),
            interface,
        })
    }
}

fn domain_ref(id: Option<String>, name: Option<String>) -> Option<DomainRef> {
    id.map(DomainRef::Id).or(name.map(DomainRef::Name))
}
