//! Company records extracted from upstream listing items.

use serde::Deserialize;
use url::Url;

/// One raw item as returned by the upstream listing API.
///
/// The upstream payload is loosely shaped; every field is optional and the
/// known spelling variants are folded together with serde aliases.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawListing {
    #[serde(alias = "company")]
    pub company_name: Option<String>,

    #[serde(alias = "companyLink")]
    pub company_url: Option<String>,

    #[serde(alias = "website")]
    pub company_website: Option<String>,

    #[serde(alias = "link")]
    pub job_url: Option<String>,

    #[serde(alias = "jobTitle")]
    pub title: Option<String>,
}

/// A company ready for pipeline processing.
///
/// The URL is parsed at construction, so anything that reaches the discovery
/// engine is already structurally valid.
#[derive(Debug, Clone)]
pub struct CompanyRecord {
    pub name: String,
    pub url: Url,

    /// Job posting URL on the listing site, carried through for reference
    pub listing_job_url: String,

    /// Job title from the listing item
    pub job_title: String,
}

impl CompanyRecord {
    /// Build a record from a raw listing item, applying the fallback rules.
    ///
    /// A listing-site profile URL is not a substitute for a real company
    /// website: such items are only usable when an explicit website field is
    /// present. Returns the drop reason on failure so the caller can log it.
    pub fn from_listing(item: &RawListing) -> Result<Self, String> {
        let name = item
            .company_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "missing company name".to_string())?;

        let mut candidate = item
            .company_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "missing company website".to_string())?;

        if candidate.contains("linkedin.com") {
            candidate = item
                .company_website
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| "only a listing profile URL, no company website".to_string())?;
        }

        let url = Url::parse(candidate).map_err(|e| format!("invalid URL {candidate}: {e}"))?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(format!("invalid URL {candidate}: no http(s) scheme and host"));
        }

        Ok(Self {
            name: name.to_string(),
            url,
            listing_job_url: item.job_url.clone().unwrap_or_default(),
            job_title: item.title.clone().unwrap_or_default(),
        })
    }
}
