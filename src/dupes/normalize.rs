use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use super::types::DetectionOptions;

static SCHEME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^https?://").expect("Failed to compile scheme regex"));

/// `www.` at the start of the string or right after any `scheme://`.
static WWW_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^([a-z][a-z0-9+.-]*://)?www\.").expect("Failed to compile www regex")
});

/// A url reduced to its comparison form, along with the parts the parser extracted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedUrl {
    pub original: String,
    pub normalized: String,
    pub domain: String,
    pub path: String,
    pub query_params: Vec<(String, String)>,
    pub fragment: String,
}

/// Canonicalize `url` for duplicate comparison.
///
/// Rules run in a fixed order, since reordering them changes the result:
/// protocol, `www.`, one trailing slash, query string, fragment, case.
///
/// Never fails. A url that cannot be parsed comes back unchanged as `normalized`
/// with every structured field left empty.
pub fn normalize_url(url: &str, options: &DetectionOptions) -> NormalizedUrl {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(err) => {
            log::trace!("leaving unparsable url {url:?} as is: {err}");
            return NormalizedUrl {
                original: url.to_string(),
                normalized: url.to_string(),
                ..Default::default()
            };
        }
    };

    let mut normalized = url.to_string();

    if options.ignore_protocol {
        normalized = SCHEME_REGEX.replace(&normalized, "").into_owned();
    }

    if options.ignore_www {
        normalized = WWW_REGEX.replace(&normalized, "${1}").into_owned();
    }

    if options.ignore_trailing_slash && normalized.ends_with('/') {
        normalized.pop();
    }

    if options.ignore_query_params {
        if let Some(idx) = normalized.find('?') {
            normalized.truncate(idx);
        }
    }

    if let Some(idx) = normalized.find('#') {
        normalized.truncate(idx);
    }

    if !options.case_sensitive {
        normalized = normalized.to_lowercase();
    }

    NormalizedUrl {
        original: url.to_string(),
        normalized,
        domain: parsed.host_str().unwrap_or_default().to_string(),
        path: parsed.path().to_string(),
        query_params: parsed
            .query_pairs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        fragment: parsed.fragment().unwrap_or_default().to_string(),
    }
}
