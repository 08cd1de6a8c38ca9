//! Service catalog lookup
//!
//! Keystone v2.0 and v3 describe endpoints differently; both are normalized
//! into a [`Catalog`] before the object-store endpoint is picked.

use sc_core::{Error, Interface, Result};
use serde::Deserialize;
use url::Url;

/// Service type of Swift in the catalog
pub const OBJECT_STORE: &str = "object-store";

/// One endpoint of a catalog service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEndpoint {
    pub interface: Interface,
    pub region: Option<String>,
    pub url: String,
}

/// One service of the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogService {
    pub service_type: String,
    pub name: Option<String>,
    pub endpoints: Vec<CatalogEndpoint>,
}

/// Services available to the authenticated user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub services: Vec<CatalogService>,
}

impl Catalog {
    /// Find the single endpoint URL of `service_type` for `region` and `interface`
    ///
    /// A `None` region matches endpoints of every region. Several entries
    /// with the same URL count as one.
    pub fn endpoint_for(
        &self,
        service_type: &str,
        region: Option<&str>,
        interface: Interface,
    ) -> Result<Url> {
        let mut urls: Vec<&str> = self
            .services
            .iter()
            .filter(|s| s.service_type == service_type)
            .flat_map(|s| s.endpoints.iter())
            .filter(|e| e.interface == interface)
            .filter(|e| region.is_none_or(|r| e.region.as_deref() == Some(r)))
            .map(|e| e.url.as_str())
            .collect();
        urls.sort_unstable();
        urls.dedup();

        let describe = || {
            format!(
                "{service_type} ({} interface) in region {}",
                interface.as_str(),
                region.unwrap_or("<any>")
            )
        };

        match urls.as_slice() {
            [] => Err(Error::EndpointNotFound(describe())),
            [url] => Ok(Url::parse(url)?),
            many => Err(Error::EndpointNotFound(format!(
                "{} matches {} endpoints; set OS_REGION_NAME to pick one",
                describe(),
                many.len()
            ))),
        }
    }
}

/// Keystone v3 `token.catalog` entry
#[derive(Debug, Deserialize)]
pub(crate) struct V3Service {
    #[serde(rename = "type")]
    service_type: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    endpoints: Vec<V3Endpoint>,
}

#[derive(Debug, Deserialize)]
struct V3Endpoint {
    interface: String,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    region_id: Option<String>,
    url: String,
}

/// Keystone v2.0 `access.serviceCatalog` entry
#[derive(Debug, Deserialize)]
pub(crate) struct V2Service {
    #[serde(rename = "type")]
    service_type: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    endpoints: Vec<V2Endpoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct V2Endpoint {
    #[serde(default)]
    region: Option<String>,
    #[serde(default, rename = "publicURL")]
    public_url: Option<String>,
    #[serde(default, rename = "internalURL")]
    internal_url: Option<String>,
    #[serde(default, rename = "adminURL")]
    admin_url: Option<String>,
}

impl Catalog {
    pub(crate) fn from_v3(services: Vec<V3Service>) -> Self {
        let services = services
            .into_iter()
            .map(|s| CatalogService {
                service_type: s.service_type,
                name: s.name,
                endpoints: s
                    .endpoints
                    .into_iter()
                    .filter_map(|e| {
                        // Unknown interfaces are skipped rather than rejected.
                        let interface = e.interface.parse().ok()?;
                        Some(CatalogEndpoint {
                            interface,
                            region: e.region_id.or(e.region),
                            url: e.url,
                        })
                    })
                    .collect(),
            })
            .collect();
        Self { services }
    }

    pub(crate) fn from_v2(services: Vec<V2Service>) -> Self {
        let services = services
            .into_iter()
            .map(|s| CatalogService {
                service_type: s.service_type,
                name: s.name,
                endpoints: s
                    .endpoints
                    .into_iter()
                    .flat_map(|e| {
                        [
                            (Interface::Public, e.public_url),
                            (Interface::Internal, e.internal_url),
                            (Interface::Admin, e.admin_url),
                        ]
                        .into_iter()
                        .filter_map(move |(interface, url)| {
                            Some(CatalogEndpoint {
                                interface,
                                region: e.region.clone(),
                                url: url?,
                            })
                        })
                    })
                    .collect(),
            })
            .collect();
        Self { services }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn v3_catalog() -> Catalog {
        let services: Vec<V3Service> = serde_json::from_value(json!([
            {
                "type": "identity",
                "name": "keystone",
                "endpoints": [
                    {"interface": "public", "region_id": "RegionOne", "url": "https://keystone.example.com/v3"}
                ]
            },
            {
                "type": "object-store",
                "name": "swift",
                "endpoints": [
                    {"interface": "public", "region_id": "RegionOne", "region": "RegionOne", "url": "https://swift-one.example.com/v1/AUTH_demo"},
                    {"interface": "internal", "region_id": "RegionOne", "url": "http://10.0.0.1:8080/v1/AUTH_demo"},
                    {"interface": "public", "region_id": "RegionTwo", "url": "https://swift-two.example.com/v1/AUTH_demo"},
                    {"interface": "weird", "region_id": "RegionTwo", "url": "https://ignored.example.com"}
                ]
            }
        ]))
        .unwrap();
        Catalog::from_v3(services)
    }

    #[test]
    fn test_endpoint_by_region() {
        let catalog = v3_catalog();
        let url = catalog
            .endpoint_for(OBJECT_STORE, Some("RegionTwo"), Interface::Public)
            .unwrap();
        assert_eq!(url.as_str(), "https://swift-two.example.com/v1/AUTH_demo");
    }

    #[test]
    fn test_endpoint_by_interface() {
        let catalog = v3_catalog();
        let url = catalog
            .endpoint_for(OBJECT_STORE, Some("RegionOne"), Interface::Internal)
            .unwrap();
        assert_eq!(url.host_str(), Some("10.0.0.1"));
    }

    #[test]
    fn test_endpoint_missing_region() {
        let catalog = v3_catalog();
        let err = catalog
            .endpoint_for(OBJECT_STORE, Some("RegionThree"), Interface::Public)
            .unwrap_err();
        assert!(matches!(err, Error::EndpointNotFound(_)));
        assert!(err.to_string().contains("RegionThree"));
    }

    #[test]
    fn test_endpoint_ambiguous_without_region() {
        let catalog = v3_catalog();
        let err = catalog
            .endpoint_for(OBJECT_STORE, None, Interface::Public)
            .unwrap_err();
        assert!(matches!(err, Error::EndpointNotFound(_)));
        assert!(err.to_string().contains("OS_REGION_NAME"));
    }

    #[test]
    fn test_duplicate_urls_collapse() {
        let catalog = Catalog {
            services: vec![CatalogService {
                service_type: OBJECT_STORE.into(),
                name: Some("swift".into()),
                endpoints: vec![
                    CatalogEndpoint {
                        interface: Interface::Public,
                        region: Some("RegionOne".into()),
                        url: "https://swift.example.com/v1/AUTH_demo".into(),
                    },
                    CatalogEndpoint {
                        interface: Interface::Public,
                        region: Some("RegionOneBis".into()),
                        url: "https://swift.example.com/v1/AUTH_demo".into(),
                    },
                ],
            }],
        };
        assert!(
            catalog
                .endpoint_for(OBJECT_STORE, None, Interface::Public)
                .is_ok()
        );
    }

    #[test]
    fn test_no_object_store_service() {
        let err = Catalog::default()
            .endpoint_for(OBJECT_STORE, None, Interface::Public)
            .unwrap_err();
        assert!(matches!(err, Error::EndpointNotFound(_)));
    }

    #[test]
    fn test_v2_catalog() {
        let services: Vec<V2Service> = serde_json::from_value(json!([
            {
                "type": "object-store",
                "name": "swift",
                "endpoints": [{
                    "region": "RegionOne",
                    "publicURL": "https://swift.example.com/v1/AUTH_demo",
                    "internalURL": "http://10.0.0.1:8080/v1/AUTH_demo"
                }]
            }
        ]))
        .unwrap();
        let catalog = Catalog::from_v2(services);
        assert_eq!(catalog.services[0].endpoints.len(), 2);
        let url = catalog
            .endpoint_for(OBJECT_STORE, Some("RegionOne"), Interface::Public)
            .unwrap();
        assert_eq!(url.host_str(), Some("swift.example.com"));
        assert!(
            catalog
                .endpoint_for(OBJECT_STORE, Some("RegionOne"), Interface::Admin)
                .is_err()
        );
    }
}
