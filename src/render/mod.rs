pub mod candidate;
pub mod europass;
pub mod markdown;

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::record::{self, RecordSet};

static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Identity links and artifact paths injected into the renderers. The
/// record set carries no contact data, so these come from configuration;
/// every field is optional and an empty value drops the related output.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Hero fallback when the profile record has empty name fields.
    pub fallback_name: String,
    pub github_user: String,
    pub linkedin_url: String,
    pub email: String,
    /// Relative paths to sibling artifacts the Markdown page links to.
    pub stats_image: String,
    pub langs_image: String,
    pub pdf_path: String,
    pub candidate_xml_path: String,
    pub passport_xml_path: String,
    /// skillicons.dev icon ids for the tech-stack banner.
    pub skill_icons: String,
    /// Certifications from this authority are featured as badges.
    pub featured_cert_authority: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            fallback_name: "My Profile".to_string(),
            github_user: "macel94".to_string(),
            linkedin_url: "https://www.linkedin.com/in/fbelacca/".to_string(),
            email: "francesco.belacca@outlook.it".to_string(),
            stats_image: "./profile/stats.svg".to_string(),
            langs_image: "./profile/top-langs.svg".to_string(),
            pdf_path: "./cv.pdf".to_string(),
            candidate_xml_path: "./candidate_cv.xml".to_string(),
            passport_xml_path: "./skills_passport.xml".to_string(),
            skill_icons: "azure,dotnet,cs,docker,kubernetes,powershell,bash,github,githubactions,git,js,vscode,visualstudio".to_string(),
            featured_cert_authority: "Microsoft".to_string(),
        }
    }
}

/// The one shared XML escape applied to every text node of both dialects.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Summary text with its synonym chain: the PROFILE_SUMMARY block (either
/// key casing), else the profile record's own Summary field.
pub(crate) fn summary_text(records: &RecordSet) -> String {
    let from_block = records
        .first(record::PROFILE_SUMMARY)
        .map(|r| r.first_field(&["Summary", "summary"]))
        .unwrap_or_default();
    if !from_block.is_empty() {
        return from_block;
    }
    records
        .first(record::PROFILE)
        .map(|r| r.field("Summary"))
        .unwrap_or_default()
}

/// Collapse the double-space/newline conventions into single spaces for
/// single-line XML text nodes.
pub(crate) fn flatten_ws(text: &str) -> String {
    WS_RE.replace_all(text.trim(), " ").into_owned()
}

/// Split a "City, Region, Country" locality into (city, country, country code).
pub(crate) fn split_locality(geo: &str) -> (String, String, String) {
    let parts: Vec<&str> = geo.split(',').map(str::trim).filter(|p| !p.is_empty()).collect();
    let city = parts.first().map(|p| p.to_string()).unwrap_or_default();
    let country = if parts.len() > 1 {
        parts.last().map(|p| p.to_string()).unwrap_or_default()
    } else {
        String::new()
    };
    let code = country_code(&country);
    (city, country, code)
}

fn country_code(country: &str) -> String {
    match country {
        "Italy" => "IT".to_string(),
        "Germany" => "DE".to_string(),
        "France" => "FR".to_string(),
        "Spain" => "ES".to_string(),
        "United Kingdom" => "GB".to_string(),
        "United States" => "US".to_string(),
        _ if country.len() == 2 => country.to_string(),
        _ => String::new(),
    }
}

// ── Tests ──
