use tracing::debug;

use crate::dates;
use crate::languages::normalize_language_name;
use crate::record::{self, Record, RecordSet};
use crate::render::{flatten_ws, summary_text, RenderOptions};
use crate::segment::{truncate_ellipsis, Bullet, Segmenter, SummarySegment};
use crate::skills::SkillTaxonomy;

const TOP_POSITIONS: usize = 3;
const EARLIER_ROLE_CAP: usize = 200;
const RECOMMENDATION_CAP: usize = 250;
const MAX_RECOMMENDATIONS: usize = 3;

/// Render the Markdown profile page. Sections are emitted in a fixed
/// order, each gated on its domain: an absent or empty domain omits the
/// section entirely, header included.
pub fn render(records: &RecordSet, opts: &RenderOptions) -> String {
    let segmenter = Segmenter::default();
    let taxonomy = SkillTaxonomy::default();

    let mut out = String::new();
    hero(&mut out, records, opts);
    badges(&mut out, records, opts);
    about(&mut out, records, &segmenter);
    stats(&mut out, opts);
    tech_stack(&mut out, records, opts, &taxonomy);
    certifications(&mut out, records, opts);
    experience(&mut out, records, opts, &segmenter);
    projects(&mut out, records, opts);
    education(&mut out, records);
    languages_section(&mut out, records);
    volunteering(&mut out, records);
    recommendations(&mut out, records);
    footer(&mut out, opts);
    debug!("markdown profile rendered ({} bytes)", out.len());
    out
}

fn hero(out: &mut String, records: &RecordSet, opts: &RenderOptions) {
    let Some(profile) = records.first(record::PROFILE) else {
        return;
    };
    let full = format!("{} {}", profile.field("First Name"), profile.field("Last Name"));
    let mut name = full.trim().to_string();
    if name.is_empty() {
        name = opts.fallback_name.clone();
    }
    out.push_str(&format!("# Hi, I'm {name} 👋\n\n"));

    let headline = profile.field("Headline");
    if !headline.is_empty() {
        out.push_str(&format!("### {headline}\n\n"));
    }
}

fn badges(out: &mut String, records: &RecordSet, opts: &RenderOptions) {
    let geo = records
        .first(record::PROFILE)
        .map(|r| r.field("Geo Location"))
        .unwrap_or_default();
    if opts.linkedin_url.is_empty()
        && opts.email.is_empty()
        && opts.github_user.is_empty()
        && geo.is_empty()
    {
        return;
    }

    out.push_str("<p>\n");
    if !opts.linkedin_url.is_empty() {
        out.push_str(&format!(
            "  <a href=\"{}\"><img src=\"https://img.shields.io/badge/LinkedIn-0A66C2?style=for-the-badge&logo=linkedin&logoColor=white\" alt=\"LinkedIn\"/></a>\n",
            opts.linkedin_url
        ));
    }
    if !opts.email.is_empty() {
        out.push_str(&format!(
            "  <a href=\"mailto:{}\"><img src=\"https://img.shields.io/badge/Email-D14836?style=for-the-badge&logo=microsoft-outlook&logoColor=white\" alt=\"Email\"/></a>\n",
            opts.email
        ));
    }
    if !opts.github_user.is_empty() {
        out.push_str(&format!(
            "  <a href=\"https://github.com/{0}\"><img src=\"https://img.shields.io/badge/GitHub-181717?style=for-the-badge&logo=github&logoColor=white\" alt=\"GitHub\"/></a>\n",
            opts.github_user
        ));
    }
    if !geo.is_empty() {
        let encoded = geo.replace(' ', "_").replace(',', "%2C");
        out.push_str(&format!(
            "  <img src=\"https://img.shields.io/badge/📍_{encoded}-grey?style=for-the-badge\" alt=\"Location\"/>\n"
        ));
    }
    out.push_str("</p>\n\n");
}

fn about(out: &mut String, records: &RecordSet, segmenter: &Segmenter) {
    let summary = summary_text(records);
    if summary.is_empty() {
        return;
    }
    out.push_str("## 🧑‍💻 About Me\n\n");
    out.push_str(&format_summary(&segmenter.summary(&summary)));
    out.push_str("\n\n");
}

fn format_summary(segments: &[SummarySegment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            SummarySegment::Paragraph(p) => {
                out.push_str(p);
                out.push_str("\n\n");
            }
            SummarySegment::Mission(m) => {
                out.push_str(&format!("\n**🎯 {m}**\n\n"));
            }
            SummarySegment::Locality(l) => {
                out.push_str(&format!("\n*{l}*\n"));
            }
            SummarySegment::Competencies { header, chunks } => {
                if !header.is_empty() {
                    out.push_str(&format!("\n**{header}**\n\n"));
                }
                for chunk in chunks {
                    match &chunk.label {
                        Some(label) => out.push_str(&format!("- **{label}:** {}\n", chunk.body)),
                        None => out.push_str(&format!("{}\n", chunk.body)),
                    }
                }
            }
        }
    }
    out.trim_end().to_string()
}

fn stats(out: &mut String, opts: &RenderOptions) {
    if opts.stats_image.is_empty() && opts.langs_image.is_empty() {
        return;
    }
    out.push_str("## 📊 GitHub Stats\n\n<p>\n");
    if !opts.stats_image.is_empty() {
        out.push_str(&format!(
            "  <img src=\"{}\" height=\"170\" alt=\"GitHub Stats\"/>\n",
            opts.stats_image
        ));
    }
    if !opts.langs_image.is_empty() {
        out.push_str(&format!(
            "  <img src=\"{}\" height=\"170\" alt=\"Top Languages\"/>\n",
            opts.langs_image
        ));
    }
    out.push_str("</p>\n\n");
}

fn tech_stack(out: &mut String, records: &RecordSet, opts: &RenderOptions, taxonomy: &SkillTaxonomy) {
    let skills = records.domain(record::SKILLS);
    if skills.is_empty() {
        return;
    }
    let names: Vec<String> = skills
        .iter()
        .map(|s| s.first_field(&["Name", "Skill"]))
        .filter(|n| !n.is_empty())
        .collect();
    if names.is_empty() {
        return;
    }

    let grouped = taxonomy.categorize(&names);
    if grouped.is_empty() && opts.skill_icons.is_empty() {
        return;
    }

    out.push_str("## 🛠 Tech Stack\n\n");
    if !opts.skill_icons.is_empty() {
        out.push_str(&format!(
            "<img src=\"https://skillicons.dev/icons?i={}&perline=8\" alt=\"Tech Stack\"/>\n\n",
            opts.skill_icons
        ));
    }
    for (kind, bucket) in grouped.buckets() {
        if bucket.is_empty() {
            continue;
        }
        out.push_str(&format!(
            "**{}:** {}\n\n",
            kind.display_label(),
            bucket.join(" · ")
        ));
    }
}

fn certifications(out: &mut String, records: &RecordSet, opts: &RenderOptions) {
    let certs = records.domain(record::CERTIFICATIONS);
    if certs.is_empty() {
        return;
    }

    let is_featured = |c: &Record| {
        !opts.featured_cert_authority.is_empty()
            && contains_ignore_case(&c.field("Authority"), &opts.featured_cert_authority)
            && contains_ignore_case(&c.field("Name"), "Certified")
    };

    let mut featured: Vec<&Record> = certs.iter().filter(|c| is_featured(c)).collect();
    featured.sort_by_key(|c| std::cmp::Reverse(dates::sort_key(&c.field("Started On"))));

    // The rest, minus LinkedIn Learning micro-courses (unless a "career
    // essentials" track), newest first.
    let mut other: Vec<&Record> = certs
        .iter()
        .filter(|c| !is_featured(c))
        .filter(|c| {
            let authority = c.field("Authority").to_lowercase();
            let name = c.field("Name").to_lowercase();
            !authority.contains("linkedin") || name.contains("career essentials")
        })
        .collect();
    other.sort_by_key(|c| std::cmp::Reverse(dates::sort_key(&c.field("Started On"))));

    if featured.is_empty() && other.is_empty() {
        return;
    }
    out.push_str("## 📜 Certifications\n\n");

    if !featured.is_empty() {
        let prefix = format!("{} Certified: ", opts.featured_cert_authority);
        let logo = opts.featured_cert_authority.to_lowercase();
        out.push_str("<p>\n");
        for c in &featured {
            let name = c.field("Name");
            let url = c.field("Url");
            let label = name.strip_prefix(&prefix).unwrap_or(&name).to_string();
            let badge = badge_encode(&label.replace(' ', "_").replace('-', "--"));
            let img = format!(
                "<img src=\"https://img.shields.io/badge/{badge}-0078D4?style=for-the-badge&logo={logo}&logoColor=white\" alt=\"{label}\"/>"
            );
            if url.is_empty() {
                out.push_str(&format!("  {img}\n"));
            } else {
                out.push_str(&format!("  <a href=\"{url}\">{img}</a>\n"));
            }
        }
        out.push_str("</p>\n\n");
    }

    if !other.is_empty() {
        out.push_str("<details>\n<summary>Other certifications & courses</summary>\n\n");
        for c in &other {
            let name = c.field("Name");
            let authority = c.field("Authority");
            let url = c.field("Url");
            let range = dates::date_range(c);

            let mut header = if name.is_empty() {
                String::new()
            } else {
                format!("**{name}**")
            };
            if !authority.is_empty() {
                header.push_str(&format!(" – {authority}"));
            }
            if !range.is_empty() {
                header.push_str(&format!(" ({range})"));
            }
            if !url.is_empty() {
                header = format!("[{header}]({url})");
            }
            out.push_str(&format!("- {header}\n"));
        }
        out.push_str("\n</details>\n\n");
    }
}

fn experience(out: &mut String, records: &RecordSet, opts: &RenderOptions, segmenter: &Segmenter) {
    let positions = records.domain(record::POSITIONS);
    if positions.is_empty() {
        return;
    }
    out.push_str("## 💼 Experience\n\n");

    for pos in positions.iter().take(TOP_POSITIONS) {
        let title = pos.field("Title");
        let company = pos.field("Company Name");
        let location = pos.field("Location");
        let description = pos.field("Description");
        let range = dates::date_range(pos);

        let mut header = if title.is_empty() {
            String::new()
        } else {
            format!("**{title}**")
        };
        if !company.is_empty() {
            header.push_str(&format!(" @ {company}"));
        }
        if !range.is_empty() {
            header.push_str(&format!(" ({range})"));
        }
        out.push_str(&format!("### {header}\n"));
        if !location.is_empty() {
            out.push_str(&format!("📍 {location}\n"));
        }
        out.push('\n');

        if !description.is_empty() {
            for bullet in segmenter.description(&description) {
                match bullet {
                    Bullet::Plain(t) => out.push_str(&format!("- {t}\n")),
                    Bullet::Focus(t) => out.push_str(&format!("- **{t}**\n")),
                }
            }
            out.push('\n');
        }
    }

    if positions.len() > TOP_POSITIONS {
        out.push_str("<details>\n<summary>Earlier roles</summary>\n\n");
        for pos in &positions[TOP_POSITIONS..] {
            let title = pos.field("Title");
            let company = pos.field("Company Name");
            let location = pos.field("Location");
            let description = pos.field("Description");
            let range = dates::date_range(pos);

            let mut header = if title.is_empty() {
                String::new()
            } else {
                format!("**{title}**")
            };
            if !company.is_empty() {
                header.push_str(&format!(" @ {company}"));
            }
            if !location.is_empty() {
                header.push_str(&format!(" · {location}"));
            }
            if !range.is_empty() {
                header.push_str(&format!(" ({range})"));
            }
            out.push_str(&format!("- {header}\n"));
            if !description.is_empty() {
                let flat = flatten_ws(&description);
                out.push_str(&format!("  > {}\n", truncate_ellipsis(&flat, EARLIER_ROLE_CAP)));
            }
        }
        out.push_str("\n</details>\n\n");
    }

    if !opts.linkedin_url.is_empty() {
        out.push_str(&format!(
            "> 📄 [Full career history on LinkedIn]({})\n\n",
            opts.linkedin_url
        ));
    }
}

fn projects(out: &mut String, records: &RecordSet, opts: &RenderOptions) {
    let projects = records.domain(record::PROJECTS);
    if projects.is_empty() && opts.github_user.is_empty() {
        return;
    }
    out.push_str("## 🚀 Featured Projects\n\n");

    if !opts.github_user.is_empty() {
        out.push_str(&format!(
            "- [**{0}**](https://github.com/{0}/{0}) — This page, the PDF export, and both CV XML dialects are rendered from one career-data snapshot.\n",
            opts.github_user
        ));
    }
    for proj in projects {
        let title = proj.first_field(&["Title", "Name"]);
        let desc = proj.field("Description");
        let url = proj.field("Url");
        let range = dates::date_range(proj);

        let mut header = if title.is_empty() {
            String::new()
        } else {
            format!("**{title}**")
        };
        if !range.is_empty() {
            header.push_str(&format!(" ({range})"));
        }
        if !url.is_empty() {
            header = format!("[{header}]({url})");
        }
        out.push_str(&format!("- {header}\n"));
        if !desc.is_empty() {
            out.push_str(&format!("  > {desc}\n"));
        }
    }
    out.push('\n');
}

fn education(out: &mut String, records: &RecordSet) {
    let education = records.domain(record::EDUCATION);
    if education.is_empty() {
        return;
    }
    out.push_str("## 🎓 Education\n\n");
    for edu in education {
        let school = edu.field("School Name");
        let degree = edu.field("Degree Name");
        let field = edu.first_field(&["Fields of Study", "Field Of Study"]);
        let notes = edu.field("Notes");
        let activities = edu.field("Activities");
        let range = dates::date_range(edu);

        let mut header = if school.is_empty() {
            "**School**".to_string()
        } else {
            format!("**{school}**")
        };
        let degree_parts: Vec<&str> = [degree.as_str(), field.as_str()]
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect();
        if !degree_parts.is_empty() {
            header.push_str(&format!(" – {}", degree_parts.join(", ")));
        }
        if !range.is_empty() {
            header.push_str(&format!(" ({range})"));
        }
        out.push_str(&format!("- {header}\n"));
        if !notes.is_empty() {
            out.push_str(&format!("  > {notes}\n"));
        }
        if !activities.is_empty() {
            out.push_str(&format!("  > Activities: {activities}\n"));
        }
    }
    out.push('\n');
}

fn languages_section(out: &mut String, records: &RecordSet) {
    let langs = records.domain(record::LANGUAGES);
    if langs.is_empty() {
        return;
    }
    out.push_str("## 🌐 Languages\n\n");
    for lang in langs {
        let name = lang.field("Name");
        let proficiency = lang.field("Proficiency");
        let mut entry = if name.is_empty() {
            String::new()
        } else {
            format!("**{}**", normalize_language_name(&name))
        };
        if !proficiency.is_empty() {
            entry.push_str(&format!(" — {proficiency}"));
        }
        out.push_str(&format!("- {entry}\n"));
    }
    out.push('\n');
}

fn volunteering(out: &mut String, records: &RecordSet) {
    let entries = records.domain(record::VOLUNTEERING);
    if entries.is_empty() {
        return;
    }
    out.push_str("## 🤝 Volunteering\n\n");
    for vol in entries {
        let role = vol.field("Role");
        let org = vol.first_field(&["Organization", "Company"]);
        let cause = vol.field("Cause");
        let description = vol.field("Description");
        let range = dates::date_range(vol);

        let mut header = if role.is_empty() {
            String::new()
        } else {
            format!("**{role}**")
        };
        if !org.is_empty() {
            header.push_str(&format!(" @ {org}"));
        }
        if !cause.is_empty() {
            header.push_str(&format!(" · {cause}"));
        }
        if !range.is_empty() {
            header.push_str(&format!(" ({range})"));
        }
        out.push_str(&format!("- {header}\n"));
        if !description.is_empty() {
            out.push_str(&format!("  > {description}\n"));
        }
    }
    out.push('\n');
}

fn recommendations(out: &mut String, records: &RecordSet) {
    let recs = records.domain(record::RECOMMENDATIONS);
    if recs.is_empty() {
        return;
    }

    let received: Vec<(String, String)> = recs
        .iter()
        .filter(|r| {
            r.field("Type").eq_ignore_ascii_case("received")
                || r.field("Direction").eq_ignore_ascii_case("received")
        })
        .filter_map(|r| {
            let text = r.first_field(&["Recommendation", "Text"]);
            if text.is_empty() {
                return None;
            }
            let mut who = r.field("Recommender");
            if who.is_empty() {
                let full = format!("{} {}", r.field("First Name"), r.field("Last Name"));
                who = full.trim().to_string();
            }
            Some((who, text))
        })
        .take(MAX_RECOMMENDATIONS)
        .collect();

    if received.is_empty() {
        return;
    }
    out.push_str("## 💬 What People Say\n\n");
    for (who, text) in received {
        out.push_str(&format!(
            "> *\"{}\"*\n",
            truncate_ellipsis(&text, RECOMMENDATION_CAP)
        ));
        if !who.is_empty() {
            out.push_str(&format!("> — **{who}**\n"));
        }
        out.push('\n');
    }
}

fn footer(out: &mut String, opts: &RenderOptions) {
    out.push_str("---\n\n### 📥 Download CV\n\n");
    if !opts.pdf_path.is_empty() {
        out.push_str(&format!("- [PDF Version]({})\n", opts.pdf_path));
    }
    if !opts.candidate_xml_path.is_empty() {
        out.push_str(&format!("- [Candidate XML]({})\n", opts.candidate_xml_path));
    }
    if !opts.passport_xml_path.is_empty() {
        out.push_str(&format!("- [SkillsPassport XML]({})\n", opts.passport_xml_path));
    }
    out.push_str("\n<sub>🔄 Auto-generated from a career-profile snapshot</sub>\n");
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

// Shields.io badge path segment: spaces were already folded to
// underscores, everything else outside the unreserved set is
// percent-encoded byte-wise.
fn badge_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn set(value: serde_json::Value) -> RecordSet {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn hero_uses_fallback_for_empty_names() {
        let records = set(json!({ "PROFILE": [{ "Headline": "Engineer" }] }));
        let md = render(&records, &RenderOptions::default());
        assert!(md.contains("# Hi, I'm My Profile 👋"));
        assert!(md.contains("### Engineer"));
    }

    #[test]
    fn no_profile_no_hero() {
        let records = set(json!({}));
        let md = render(&records, &RenderOptions::default());
        assert!(!md.contains("# Hi, I'm"));
    }

    #[test]
    fn absent_domains_omit_sections() {
        let records = set(json!({}));
        let md = render(&records, &RenderOptions::default());
        for header in [
            "## 🛠 Tech Stack",
            "## 📜 Certifications",
            "## 💼 Experience",
            "## 🎓 Education",
            "## 🌐 Languages",
            "## 🤝 Volunteering",
            "## 💬 What People Say",
            "## 🧑‍💻 About Me",
        ] {
            assert!(!md.contains(header), "unexpected section: {header}");
        }
    }

    #[test]
    fn top_three_positions_then_collapsed() {
        let records = set(json!({
            "POSITIONS": [
                { "Title": "Fourth", "Company Name": "D" },
                { "Title": "Third", "Company Name": "C" },
                { "Title": "Second", "Company Name": "B" },
                { "Title": "First", "Company Name": "A", "Description": "Oldest role description" }
            ]
        }));
        let md = render(&records, &RenderOptions::default());
        assert!(md.contains("### **Fourth** @ D"));
        assert!(md.contains("### **Second** @ B"));
        assert!(md.contains("<summary>Earlier roles</summary>"));
        assert!(md.contains("- **First** @ A"));
        assert!(md.contains("> Oldest role description"));
        assert!(!md.contains("### **First** @ A"));
    }

    #[test]
    fn exactly_three_positions_no_collapse() {
        let records = set(json!({
            "POSITIONS": [
                { "Title": "Third" }, { "Title": "Second" }, { "Title": "First" }
            ]
        }));
        let md = render(&records, &RenderOptions::default());
        assert!(!md.contains("<summary>Earlier roles</summary>"));
    }

    #[test]
    fn featured_certs_become_badges_sorted_desc() {
        let records = set(json!({
            "CERTIFICATIONS": [
                { "Name": "Microsoft Certified: Azure Fundamentals", "Authority": "Microsoft", "Started On": "Feb 2020" },
                { "Name": "Microsoft Certified: DevOps Engineer Expert", "Authority": "Microsoft", "Started On": "Sep 2022" },
                { "Name": "Intro to Something", "Authority": "LinkedIn Learning", "Started On": "Jan 2021" },
                { "Name": "CKA", "Authority": "CNCF", "Started On": "Mar 2021" }
            ]
        }));
        let md = render(&records, &RenderOptions::default());
        let devops = md.find("DevOps_Engineer_Expert").unwrap();
        let fundamentals = md.find("Azure_Fundamentals").unwrap();
        assert!(devops < fundamentals, "newest badge should come first");
        assert!(md.contains("<summary>Other certifications & courses</summary>"));
        assert!(md.contains("**CKA** – CNCF"));
        assert!(!md.contains("Intro to Something"));
    }

    #[test]
    fn skills_grouped_by_bucket() {
        let records = set(json!({
            "SKILLS": [
                { "Name": "Azure" }, { "Name": "C#" },
                { "Name": "Lingua inglese" }, { "Name": "Unknown Skill" }
            ]
        }));
        let md = render(&records, &RenderOptions::default());
        assert!(md.contains("**Cloud & Infrastructure:** Azure"));
        assert!(md.contains("**Backend & Languages:** C#"));
        assert!(!md.contains("Lingua inglese"));
        assert!(!md.contains("Unknown Skill"));
    }

    #[test]
    fn only_received_recommendations_quoted() {
        let records = set(json!({
            "RECOMMENDATIONS": [
                { "Type": "given", "Recommendation": "I recommended someone else entirely", "Recommender": "Me" },
                { "Type": "Received", "Recommendation": "A stellar colleague and engineer", "Recommender": "Ada" }
            ]
        }));
        let md = render(&records, &RenderOptions::default());
        assert!(md.contains("> *\"A stellar colleague and engineer\"*"));
        assert!(md.contains("> — **Ada**"));
        assert!(!md.contains("someone else entirely"));
    }

    #[test]
    fn location_badge_is_encoded() {
        let records = set(json!({
            "PROFILE": [{ "First Name": "Jo", "Last Name": "Doe", "Geo Location": "Milan, Italy" }]
        }));
        let md = render(&records, &RenderOptions::default());
        assert!(md.contains("📍_Milan%2C_Italy-grey"));
    }
}
