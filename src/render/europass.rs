use tracing::debug;

use crate::dates;
use crate::languages::{competency_profile, is_native, language_code, normalize_language_name};
use crate::record::{self, Record, RecordSet};
use crate::render::{escape_xml, flatten_ws, split_locality, summary_text, RenderOptions};
use crate::segment::truncate_ellipsis;
use crate::skills::SkillTaxonomy;

const SUMMARY_CAP: usize = 2000;

/// Render the SkillsPassport CV dialect: a flat, non-namespaced document
/// with inline CEFR sub-elements per foreign language.
pub fn render(records: &RecordSet, opts: &RenderOptions) -> String {
    let taxonomy = SkillTaxonomy::default();
    let mut out = String::new();

    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<SkillsPassport locale=\"en\">\n\n");

    out.push_str("  <DocumentInfo>\n");
    out.push_str("    <DocumentType>ECV</DocumentType>\n");
    out.push_str("    <XSDVersion>V3.4</XSDVersion>\n");
    out.push_str("    <Generator>profilegen</Generator>\n");
    out.push_str("    <Comment>Generated from a career-profile snapshot</Comment>\n");
    out.push_str("  </DocumentInfo>\n\n");

    out.push_str("  <LearnerInfo>\n");
    identification(&mut out, records, opts);
    headline(&mut out, records);
    work_experience(&mut out, records);
    education(&mut out, records);
    skills(&mut out, records, &taxonomy);
    achievements(&mut out, records);
    out.push_str("  </LearnerInfo>\n");
    out.push_str("</SkillsPassport>\n");
    debug!("skills passport rendered ({} bytes)", out.len());
    out
}

fn identification(out: &mut String, records: &RecordSet, opts: &RenderOptions) {
    let profile = records.first(record::PROFILE);
    let first = profile.map(|p| p.field("First Name")).unwrap_or_default();
    let last = profile.map(|p| p.field("Last Name")).unwrap_or_default();
    let geo = profile.map(|p| p.field("Geo Location")).unwrap_or_default();
    let (city, country, code) = split_locality(&geo);

    let has_name = !first.is_empty() || !last.is_empty();
    let has_contact = !city.is_empty() || !opts.email.is_empty()
        || !opts.github_user.is_empty() || !opts.linkedin_url.is_empty();
    if !has_name && !has_contact {
        return;
    }

    out.push_str("    <Identification>\n");
    if has_name {
        out.push_str("      <PersonName>\n");
        if !first.is_empty() {
            out.push_str(&format!("        <FirstName>{}</FirstName>\n", escape_xml(&first)));
        }
        if !last.is_empty() {
            out.push_str(&format!("        <Surname>{}</Surname>\n", escape_xml(&last)));
        }
        out.push_str("      </PersonName>\n");
    }
    if has_contact {
        out.push_str("      <ContactInfo>\n");
        if !city.is_empty() {
            out.push_str("        <Address>\n          <Contact>\n");
            out.push_str(&format!(
                "            <Municipality>{}</Municipality>\n",
                escape_xml(&city)
            ));
            if !code.is_empty() {
                out.push_str(&format!(
                    "            <Country><Code>{code}</Code><Label>{}</Label></Country>\n",
                    escape_xml(&country)
                ));
            }
            out.push_str("          </Contact>\n        </Address>\n");
        }
        if !opts.email.is_empty() {
            out.push_str(&format!(
                "        <Email><Contact>{}</Contact></Email>\n",
                escape_xml(&opts.email)
            ));
        }
        if !opts.github_user.is_empty() {
            out.push_str(&format!(
                "        <Website><Contact>https://github.com/{}</Contact></Website>\n",
                escape_xml(&opts.github_user)
            ));
        }
        if !opts.linkedin_url.is_empty() {
            out.push_str(&format!(
                "        <Website><Contact>{}</Contact></Website>\n",
                escape_xml(&opts.linkedin_url)
            ));
        }
        out.push_str("      </ContactInfo>\n");
    }
    out.push_str("    </Identification>\n\n");
}

fn headline(out: &mut String, records: &RecordSet) {
    let text = records
        .first(record::PROFILE)
        .map(|p| p.field("Headline"))
        .unwrap_or_default();
    if text.is_empty() {
        return;
    }
    out.push_str("    <Headline>\n");
    out.push_str("      <Type><Code>position</Code><Label>Desired employment / Occupational field</Label></Type>\n");
    out.push_str(&format!(
        "      <Description><Label>{}</Label></Description>\n",
        escape_xml(&text)
    ));
    out.push_str("    </Headline>\n\n");
}

fn work_experience(out: &mut String, records: &RecordSet) {
    let positions = records.domain(record::POSITIONS);
    if positions.is_empty() {
        return;
    }

    out.push_str("    <WorkExperienceList>\n");
    for pos in positions {
        let title = pos.field("Title");
        let company = pos.field("Company Name");
        let location = pos.field("Location");
        let description = pos.field("Description");
        let started = pos.first_field(dates::START_KEYS);
        let finished = pos.first_field(dates::END_KEYS);

        out.push_str("      <WorkExperience>\n");
        if !started.is_empty() {
            out.push_str("        <Period>\n");
            out.push_str(&format!("          <From>{}</From>\n", date_parts(&started)));
            if finished.is_empty() {
                out.push_str("          <Current>true</Current>\n");
            } else {
                out.push_str(&format!("          <To>{}</To>\n", date_parts(&finished)));
            }
            out.push_str("        </Period>\n");
        }
        out.push_str("        <Position>\n");
        out.push_str(&format!("          <Label>{}</Label>\n", escape_xml(&title)));
        out.push_str("        </Position>\n");
        if !description.is_empty() {
            out.push_str(&format!(
                "        <Activities>{}</Activities>\n",
                escape_xml(&flatten_ws(&description))
            ));
        }
        out.push_str("        <Employer>\n");
        out.push_str(&format!("          <Name>{}</Name>\n", escape_xml(&company)));
        if !location.is_empty() {
            out.push_str("          <ContactInfo>\n            <Address>\n              <Contact>\n");
            out.push_str(&format!(
                "                <Municipality>{}</Municipality>\n",
                escape_xml(&location)
            ));
            out.push_str("              </Contact>\n            </Address>\n          </ContactInfo>\n");
        }
        out.push_str("        </Employer>\n");
        out.push_str("      </WorkExperience>\n");
    }
    out.push_str("    </WorkExperienceList>\n\n");
}

fn education(out: &mut String, records: &RecordSet) {
    let entries = records.domain(record::EDUCATION);
    if entries.is_empty() {
        return;
    }

    out.push_str("    <EducationList>\n");
    for edu in entries {
        let school = edu.field("School Name");
        let degree = edu.field("Degree Name");
        let field = edu.first_field(&["Fields of Study", "Field Of Study"]);
        let notes = edu.field("Notes");
        let started = edu.first_field(dates::START_KEYS);
        let finished = edu.first_field(dates::END_KEYS);

        out.push_str("      <Education>\n");
        if !started.is_empty() {
            out.push_str("        <Period>\n");
            out.push_str(&format!("          <From>{}</From>\n", date_parts(&started)));
            if !finished.is_empty() {
                out.push_str(&format!("          <To>{}</To>\n", date_parts(&finished)));
            }
            out.push_str("        </Period>\n");
        }
        let title_parts: Vec<&str> = [degree.as_str(), field.as_str()]
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect();
        let title = if title_parts.is_empty() {
            "Education".to_string()
        } else {
            title_parts.join(" – ")
        };
        out.push_str(&format!("        <Title>{}</Title>\n", escape_xml(&title)));
        if !notes.is_empty() {
            out.push_str(&format!(
                "        <Activities>{}</Activities>\n",
                escape_xml(&notes)
            ));
        }
        out.push_str("        <Organisation>\n");
        out.push_str(&format!("          <Name>{}</Name>\n", escape_xml(&school)));
        out.push_str("        </Organisation>\n");
        out.push_str("      </Education>\n");
    }
    out.push_str("    </EducationList>\n\n");
}

fn skills(out: &mut String, records: &RecordSet, taxonomy: &SkillTaxonomy) {
    let langs = records.domain(record::LANGUAGES);
    let summary = flatten_ws(&summary_text(records));
    let skill_names: Vec<String> = records
        .domain(record::SKILLS)
        .iter()
        .map(|s| s.first_field(&["Name", "Skill"]))
        .filter(|n| !n.is_empty())
        .collect();
    let retained = taxonomy.retain(&skill_names);

    if langs.is_empty() && summary.is_empty() && retained.is_empty() {
        return;
    }

    out.push_str("    <Skills>\n");
    if !langs.is_empty() {
        linguistic(out, langs);
    }
    if !summary.is_empty() {
        out.push_str(&format!(
            "      <Other><Description>{}</Description></Other>\n",
            escape_xml(&truncate_ellipsis(&summary, SUMMARY_CAP))
        ));
    }
    if !retained.is_empty() {
        out.push_str(&format!(
            "      <Computer><Description>{}</Description></Computer>\n",
            escape_xml(&retained.join(", "))
        ));
    }
    out.push_str("    </Skills>\n\n");
}

fn linguistic(out: &mut String, langs: &[Record]) {
    let mother_tongues: Vec<&Record> = langs
        .iter()
        .filter(|l| is_native(&l.field("Proficiency")))
        .collect();
    let foreign: Vec<&Record> = langs
        .iter()
        .filter(|l| !is_native(&l.field("Proficiency")))
        .collect();

    out.push_str("      <Linguistic>\n");
    if !mother_tongues.is_empty() {
        out.push_str("        <MotherTongueList>\n");
        for lang in mother_tongues {
            let name = normalize_language_name(&lang.field("Name")).to_string();
            out.push_str("          <MotherTongue>\n");
            out.push_str(&format!(
                "            <Description><Code>{}</Code><Label>{}</Label></Description>\n",
                escape_xml(&language_code(&name)),
                escape_xml(&name)
            ));
            out.push_str("          </MotherTongue>\n");
        }
        out.push_str("        </MotherTongueList>\n");
    }
    if !foreign.is_empty() {
        out.push_str("        <ForeignLanguageList>\n");
        for lang in foreign {
            let name = normalize_language_name(&lang.field("Name")).to_string();
            let profile = competency_profile(&lang.field("Proficiency"));
            out.push_str("          <ForeignLanguage>\n");
            out.push_str(&format!(
                "            <Description><Code>{}</Code><Label>{}</Label></Description>\n",
                escape_xml(&language_code(&name)),
                escape_xml(&name)
            ));
            out.push_str("            <ProficiencyLevel>\n");
            out.push_str(&format!(
                "              <Listening>{}</Listening>\n",
                profile.listening
            ));
            out.push_str(&format!("              <Reading>{}</Reading>\n", profile.reading));
            out.push_str(&format!(
                "              <SpokenInteraction>{}</SpokenInteraction>\n",
                profile.spoken_interaction
            ));
            out.push_str(&format!(
                "              <SpokenProduction>{}</SpokenProduction>\n",
                profile.spoken_production
            ));
            out.push_str(&format!("              <Writing>{}</Writing>\n", profile.writing));
            out.push_str("            </ProficiencyLevel>\n");
            out.push_str("          </ForeignLanguage>\n");
        }
        out.push_str("        </ForeignLanguageList>\n");
    }
    out.push_str("      </Linguistic>\n");
}

fn achievements(out: &mut String, records: &RecordSet) {
    let certs = records.domain(record::CERTIFICATIONS);
    if certs.is_empty() {
        return;
    }

    out.push_str("    <AchievementList>\n");
    for cert in certs {
        let name = cert.field("Name");
        let authority = cert.field("Authority");
        let url = cert.field("Url");
        let started = cert.field("Started On");

        out.push_str("      <Achievement>\n");
        out.push_str("        <Title>\n");
        out.push_str(&format!("          <Label>{}</Label>\n", escape_xml(&name)));
        out.push_str("        </Title>\n");
        if !authority.is_empty() {
            out.push_str(&format!(
                "        <Description>Issued by {}</Description>\n",
                escape_xml(&authority)
            ));
        }
        if !started.is_empty() {
            out.push_str(&format!("        <Date>{}</Date>\n", date_parts(&started)));
        }
        if !url.is_empty() {
            out.push_str(&format!(
                "        <ReferenceTo><Label>{}</Label></ReferenceTo>\n",
                escape_xml(&url)
            ));
        }
        out.push_str("      </Achievement>\n");
    }
    out.push_str("    </AchievementList>\n");
}

// "<Year>2017</Year><Month>--09</Month>" for "Sep 2017"; bare years drop
// the month; unparseable text lands escaped inside <Year>.
fn date_parts(text: &str) -> String {
    match dates::year_month(text) {
        Some((year, Some(month))) => {
            format!("<Year>{year}</Year><Month>--{month:02}</Month>")
        }
        Some((year, None)) => format!("<Year>{year}</Year>"),
        None => format!("<Year>{}</Year>", escape_xml(text)),
    }
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
    fn skeleton_for_empty_snapshot() {
        let xml = render(&set(json!({})), &RenderOptions::default());
        assert!(xml.contains("<SkillsPassport locale=\"en\">"));
        assert!(xml.contains("<DocumentType>ECV</DocumentType>"));
        assert!(!xml.contains("<WorkExperienceList>"));
        assert!(!xml.contains("<EducationList>"));
        assert!(!xml.contains("<AchievementList>"));
    }

    #[test]
    fn date_fragments() {
        assert_eq!(date_parts("Sep 2017"), "<Year>2017</Year><Month>--09</Month>");
        assert_eq!(date_parts("2014"), "<Year>2014</Year>");
        assert_eq!(date_parts("when I was young"), "<Year>when I was young</Year>");
    }

    #[test]
    fn open_ended_period_marks_current() {
        let xml = render(
            &set(json!({
                "POSITIONS": [{ "Title": "Engineer", "Company Name": "Acme", "Started On": "Jan 2020" }]
            })),
            &RenderOptions::default(),
        );
        assert!(xml.contains("<From><Year>2020</Year><Month>--01</Month></From>"));
        assert!(xml.contains("<Current>true</Current>"));
        assert!(!xml.contains("<To>"));
    }

    #[test]
    fn native_language_in_mother_tongue_list_only() {
        let xml = render(
            &set(json!({
                "LANGUAGES": [
                    { "Name": "Italiano", "Proficiency": "Native or bilingual proficiency" },
                    { "Name": "Inglese", "Proficiency": "Full professional proficiency" }
                ]
            })),
            &RenderOptions::default(),
        );
        let mother = xml.find("<MotherTongueList>").unwrap();
        let mother_end = xml.find("</MotherTongueList>").unwrap();
        assert!(xml[mother..mother_end].contains("<Label>Italian</Label>"));
        assert!(!xml[mother..mother_end].contains("<Label>English</Label>"));
        assert!(!xml[mother..mother_end].contains("ProficiencyLevel"));

        let foreign = xml.find("<ForeignLanguageList>").unwrap();
        let foreign_end = xml.find("</ForeignLanguageList>").unwrap();
        let fragment = &xml[foreign..foreign_end];
        assert!(fragment.contains("<Label>English</Label>"));
        assert!(fragment.contains("<Listening>C1</Listening>"));
        assert!(fragment.contains("<SpokenInteraction>B2</SpokenInteraction>"));
        assert!(fragment.contains("<SpokenProduction>B2</SpokenProduction>"));
        assert!(fragment.contains("<Writing>C1</Writing>"));
    }

    #[test]
    fn summary_lands_in_other_skills() {
        let xml = render(
            &set(json!({
                "PROFILE_SUMMARY": [{ "Summary": "Cloud engineer with a platform focus." }]
            })),
            &RenderOptions::default(),
        );
        assert!(xml.contains(
            "<Other><Description>Cloud engineer with a platform focus.</Description></Other>"
        ));
    }

    #[test]
    fn computer_skills_drop_excluded() {
        let xml = render(
            &set(json!({
                "SKILLS": [
                    { "Name": "Azure" }, { "Skill": "Kubernetes" }, { "Name": "Lingua inglese" }
                ]
            })),
            &RenderOptions::default(),
        );
        assert!(xml.contains("<Computer><Description>Azure, Kubernetes</Description></Computer>"));
    }

    #[test]
    fn achievement_from_certification() {
        let xml = render(
            &set(json!({
                "CERTIFICATIONS": [{
                    "Name": "Azure Administrator",
                    "Authority": "Microsoft",
                    "Started On": "Feb 2021",
                    "Url": "https://learn.microsoft.com/creds/1"
                }]
            })),
            &RenderOptions::default(),
        );
        assert!(xml.contains("<Label>Azure Administrator</Label>"));
        assert!(xml.contains("<Description>Issued by Microsoft</Description>"));
        assert!(xml.contains("<Date><Year>2021</Year><Month>--02</Month></Date>"));
        assert!(xml.contains("<ReferenceTo><Label>https://learn.microsoft.com/creds/1</Label></ReferenceTo>"));
    }
}
