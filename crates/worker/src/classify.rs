//! Pure request classification.
//!
//! Derived only from the request and the site profile; never from earlier
//! requests or cache contents.

use lisboa_core::Request;
use url::Url;

use crate::site::{DynamicKind, SiteProfile};

/// Everything the rule tables need to know about one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestClass {
    pub is_get: bool,
    pub same_origin: bool,
    pub dev_path: bool,
    pub runtime_chunk: bool,
    pub dynamic: Option<DynamicKind>,
    pub navigation: bool,
    pub known_route: bool,
}

pub fn classify(request: &Request, origin: &Url, site: &SiteProfile) -> RequestClass {
    let url = &request.url;
    let path = url.path();
    let path_and_query = match url.query() {
        Some(q) => format!("{path}?{q}"),
        None => path.to_string(),
    };

    RequestClass {
        is_get: request.is_get(),
        same_origin: url.origin() == origin.origin(),
        dev_path: site.is_dev_path(&path_and_query),
        runtime_chunk: site.is_runtime_chunk(path),
        dynamic: site.dynamic_kind(path),
        navigation: request.is_navigation(),
        known_route: site.is_route(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Url {
        Url::parse("https://trip.example").unwrap()
    }

    fn get(path: &str) -> Request {
        Request::get(origin().join(path).unwrap())
    }

    #[test]
    fn test_classify_data_file() {
        let class = classify(&get("/data/flights.json"), &origin(), &SiteProfile::lisbon());
        assert!(class.is_get);
        assert!(class.same_origin);
        assert!(!class.dev_path);
        assert!(!class.navigation);
        assert!(!class.known_route);
        assert_eq!(class.dynamic, None);
    }

    #[test]
    fn test_classify_navigation() {
        let req = Request::navigate(origin().join("/explore").unwrap());
        let class = classify(&req, &origin(), &SiteProfile::lisbon());
        assert!(class.navigation);
        assert!(class.known_route);
    }

    #[test]
    fn test_classify_cross_origin() {
        let req = Request::get(Url::parse("https://api.mapbox.com/v4/mapbox.dark-v11/1/0/0.png").unwrap());
        let class = classify(&req, &origin(), &SiteProfile::lisbon());
        assert!(!class.same_origin);
        assert_eq!(class.dynamic, Some(DynamicKind::Image));
    }

    #[test]
    fn test_classify_other_port_is_cross_origin() {
        let req = Request::get(Url::parse("https://trip.example:8443/data/flights.json").unwrap());
        let class = classify(&req, &origin(), &SiteProfile::lisbon());
        assert!(!class.same_origin);
    }

    #[test]
    fn test_classify_dev_ping_in_query() {
        let class = classify(&get("/?__vite_ping"), &origin(), &SiteProfile::lisbon());
        assert!(class.dev_path);
    }

    #[test]
    fn test_classify_non_get() {
        let req = get("/api/flights").with_method("POST");
        let class = classify(&req, &origin(), &SiteProfile::lisbon());
        assert!(!class.is_get);
    }

    #[test]
    fn test_classify_is_pure() {
        let site = SiteProfile::lisbon();
        let req = get("/_app/immutable/chunks/app.js");
        assert_eq!(classify(&req, &origin(), &site), classify(&req, &origin(), &site));
        assert!(classify(&req, &origin(), &site).runtime_chunk);
    }
}
