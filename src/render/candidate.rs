use tracing::debug;

use crate::dates;
use crate::languages::{is_native, language_code, normalize_language_name, proficiency_level};
use crate::record::{self, RecordSet};
use crate::render::{escape_xml, flatten_ws, split_locality, summary_text, RenderOptions};
use crate::skills::SkillTaxonomy;

const CANDIDATE_NS: &str = "http://ns.hr-xml.org/2006-02-28";

/// Render the namespaced Candidate CV dialect. Populated sections follow
/// the domain-gating rule; the schema-required `Licenses`, `Publications`
/// and `Memberships` sections are emitted as empty placeholders when the
/// snapshot has nothing for them.
pub fn render(records: &RecordSet, opts: &RenderOptions) -> String {
    let taxonomy = SkillTaxonomy::default();
    let mut out = String::new();

    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(&format!(
        "<Candidate xmlns=\"{CANDIDATE_NS}\" xml:lang=\"en\">\n"
    ));
    out.push_str("  <CandidateProfile>\n");

    personal_data(&mut out, records, opts);
    objective(&mut out, records);
    employment_history(&mut out, records);
    education_history(&mut out, records);
    out.push_str("    <Licenses/>\n");
    certifications(&mut out, records);
    qualifications(&mut out, records, &taxonomy);
    languages(&mut out, records);
    out.push_str("    <Publications/>\n");
    out.push_str("    <Memberships/>\n");

    out.push_str("  </CandidateProfile>\n");
    out.push_str("</Candidate>\n");
    debug!("candidate CV rendered ({} bytes)", out.len());
    out
}

fn personal_data(out: &mut String, records: &RecordSet, opts: &RenderOptions) {
    let profile = records.first(record::PROFILE);
    let first = profile.map(|p| p.field("First Name")).unwrap_or_default();
    let last = profile.map(|p| p.field("Last Name")).unwrap_or_default();
    let geo = profile.map(|p| p.field("Geo Location")).unwrap_or_default();
    let (city, _, code) = split_locality(&geo);

    let has_name = !first.is_empty() || !last.is_empty();
    let has_contact = !opts.email.is_empty() || !opts.github_user.is_empty()
        || !opts.linkedin_url.is_empty() || !city.is_empty();
    if !has_name && !has_contact {
        return;
    }

    out.push_str("    <PersonalData>\n");
    if has_name {
        out.push_str("      <PersonName>\n");
        if !first.is_empty() {
            out.push_str(&format!("        <GivenName>{}</GivenName>\n", escape_xml(&first)));
        }
        if !last.is_empty() {
            out.push_str(&format!("        <FamilyName>{}</FamilyName>\n", escape_xml(&last)));
        }
        let formatted = format!("{first} {last}");
        out.push_str(&format!(
            "        <FormattedName>{}</FormattedName>\n",
            escape_xml(formatted.trim())
        ));
        out.push_str("      </PersonName>\n");
    }
    if has_contact {
        out.push_str("      <ContactData>\n");
        if !opts.email.is_empty() {
            out.push_str(&format!(
                "        <InternetEmailAddress>{}</InternetEmailAddress>\n",
                escape_xml(&opts.email)
            ));
        }
        if !opts.github_user.is_empty() {
            out.push_str(&format!(
                "        <InternetWebAddress>https://github.com/{}</InternetWebAddress>\n",
                escape_xml(&opts.github_user)
            ));
        }
        if !opts.linkedin_url.is_empty() {
            out.push_str(&format!(
                "        <InternetWebAddress>{}</InternetWebAddress>\n",
                escape_xml(&opts.linkedin_url)
            ));
        }
        if !city.is_empty() {
            out.push_str("        <PostalAddress>\n");
            out.push_str(&format!(
                "          <Municipality>{}</Municipality>\n",
                escape_xml(&city)
            ));
            if !code.is_empty() {
                out.push_str(&format!("          <CountryCode>{code}</CountryCode>\n"));
            }
            out.push_str("        </PostalAddress>\n");
        }
        out.push_str("      </ContactData>\n");
    }
    out.push_str("    </PersonalData>\n");
}

fn objective(out: &mut String, records: &RecordSet) {
    let headline = records
        .first(record::PROFILE)
        .map(|p| p.field("Headline"))
        .unwrap_or_default();
    let summary = flatten_ws(&summary_text(records));

    let text = match (headline.is_empty(), summary.is_empty()) {
        (false, false) => format!("{headline} – {summary}"),
        (false, true) => headline,
        (true, false) => summary,
        (true, true) => return,
    };
    out.push_str(&format!("    <Objective>{}</Objective>\n", escape_xml(&text)));
}

fn employment_history(out: &mut String, records: &RecordSet) {
    let positions = records.domain(record::POSITIONS);
    if positions.is_empty() {
        return;
    }

    out.push_str("    <EmploymentHistory>\n");
    for pos in positions {
        let title = pos.field("Title");
        let company = pos.field("Company Name");
        let location = pos.field("Location");
        let description = pos.field("Description");
        let started = pos.first_field(dates::START_KEYS);
        let finished = pos.first_field(dates::END_KEYS);

        out.push_str("      <EmployerOrg>\n");
        if !company.is_empty() {
            out.push_str(&format!(
                "        <EmployerOrgName>{}</EmployerOrgName>\n",
                escape_xml(&company)
            ));
        }
        out.push_str("        <PositionHistory>\n");
        if !title.is_empty() {
            out.push_str(&format!("          <Title>{}</Title>\n", escape_xml(&title)));
        }
        if !started.is_empty() {
            out.push_str(&format!(
                "          <StartDate><AnyDate>{}</AnyDate></StartDate>\n",
                escape_xml(&dates::iso_date(&started))
            ));
            if finished.is_empty() {
                out.push_str("          <CurrentIndicator>true</CurrentIndicator>\n");
            } else {
                out.push_str(&format!(
                    "          <EndDate><AnyDate>{}</AnyDate></EndDate>\n",
                    escape_xml(&dates::iso_date(&finished))
                ));
            }
        }
        if !description.is_empty() {
            out.push_str(&format!(
                "          <Description>{}</Description>\n",
                escape_xml(&flatten_ws(&description))
            ));
        }
        if !location.is_empty() {
            out.push_str(&format!(
                "          <PositionLocation><Municipality>{}</Municipality></PositionLocation>\n",
                escape_xml(&location)
            ));
        }
        out.push_str("        </PositionHistory>\n");
        out.push_str("      </EmployerOrg>\n");
    }
    out.push_str("    </EmploymentHistory>\n");
}

fn education_history(out: &mut String, records: &RecordSet) {
    let education = records.domain(record::EDUCATION);
    if education.is_empty() {
        return;
    }

    out.push_str("    <EducationHistory>\n");
    for edu in education {
        let school = edu.field("School Name");
        let degree = edu.field("Degree Name");
        let major = edu.first_field(&["Fields of Study", "Field Of Study"]);
        let notes = edu.field("Notes");
        let started = edu.first_field(dates::START_KEYS);
        let finished = edu.first_field(dates::END_KEYS);

        out.push_str("      <SchoolOrInstitution>\n");
        if !school.is_empty() {
            out.push_str(&format!(
                "        <SchoolName>{}</SchoolName>\n",
                escape_xml(&school)
            ));
        }
        out.push_str("        <Degree>\n");
        if !degree.is_empty() {
            out.push_str(&format!(
                "          <DegreeName>{}</DegreeName>\n",
                escape_xml(&degree)
            ));
        }
        if !major.is_empty() {
            out.push_str(&format!(
                "          <DegreeMajor>{}</DegreeMajor>\n",
                escape_xml(&major)
            ));
        }
        if !started.is_empty() {
            out.push_str("          <DatesOfAttendance>\n");
            out.push_str(&format!(
                "            <StartDate><AnyDate>{}</AnyDate></StartDate>\n",
                escape_xml(&dates::iso_date(&started))
            ));
            if !finished.is_empty() {
                out.push_str(&format!(
                    "            <EndDate><AnyDate>{}</AnyDate></EndDate>\n",
                    escape_xml(&dates::iso_date(&finished))
                ));
            }
            out.push_str("          </DatesOfAttendance>\n");
        }
        if !notes.is_empty() {
            out.push_str(&format!(
                "          <Comments>{}</Comments>\n",
                escape_xml(&notes)
            ));
        }
        out.push_str("        </Degree>\n");
        out.push_str("      </SchoolOrInstitution>\n");
    }
    out.push_str("    </EducationHistory>\n");
}

fn certifications(out: &mut String, records: &RecordSet) {
    let certs = records.domain(record::CERTIFICATIONS);
    if certs.is_empty() {
        return;
    }

    out.push_str("    <Certifications>\n");
    for cert in certs {
        let name = cert.field("Name");
        let authority = cert.field("Authority");
        let url = cert.field("Url");
        let started = cert.field("Started On");

        out.push_str("      <Certification>\n");
        if !name.is_empty() {
            out.push_str(&format!("        <Name>{}</Name>\n", escape_xml(&name)));
        }
        if !authority.is_empty() {
            out.push_str(&format!(
                "        <IssuingAuthority>{}</IssuingAuthority>\n",
                escape_xml(&authority)
            ));
        }
        if !started.is_empty() {
            out.push_str(&format!(
                "        <FirstIssuedDate><AnyDate>{}</AnyDate></FirstIssuedDate>\n",
                escape_xml(&dates::iso_date(&started))
            ));
        }
        if !url.is_empty() {
            out.push_str(&format!(
                "        <ReferenceUrl>{}</ReferenceUrl>\n",
                escape_xml(&url)
            ));
        }
        out.push_str("      </Certification>\n");
    }
    out.push_str("    </Certifications>\n");
}

fn qualifications(out: &mut String, records: &RecordSet, taxonomy: &SkillTaxonomy) {
    let skills = records.domain(record::SKILLS);
    if skills.is_empty() {
        return;
    }
    let names: Vec<String> = skills
        .iter()
        .map(|s| s.first_field(&["Name", "Skill"]))
        .filter(|n| !n.is_empty())
        .collect();
    let retained = taxonomy.retain(&names);
    if retained.is_empty() {
        return;
    }

    out.push_str("    <Qualifications>\n");
    out.push_str(&format!(
        "      <QualificationSummary>{}</QualificationSummary>\n",
        escape_xml(&retained.join(", "))
    ));
    for skill in &retained {
        match taxonomy.bucket_of(skill) {
            Some(bucket) => out.push_str(&format!(
                "      <Competency name=\"{}\" bucket=\"{}\"/>\n",
                escape_xml(skill),
                bucket.key()
            )),
            None => out.push_str(&format!(
                "      <Competency name=\"{}\"/>\n",
                escape_xml(skill)
            )),
        }
    }
    out.push_str("    </Qualifications>\n");
}

fn languages(out: &mut String, records: &RecordSet) {
    let langs = records.domain(record::LANGUAGES);
    if langs.is_empty() {
        return;
    }

    out.push_str("    <Languages>\n");
    for lang in langs {
        let name = normalize_language_name(&lang.field("Name")).to_string();
        if name.is_empty() {
            continue;
        }
        let proficiency = lang.field("Proficiency");

        out.push_str("      <Language>\n");
        out.push_str(&format!(
            "        <LanguageCode>{}</LanguageCode>\n",
            escape_xml(&language_code(&name))
        ));
        out.push_str(&format!("        <Name>{}</Name>\n", escape_xml(&name)));
        if is_native(&proficiency) {
            // Mother tongues carry no CEFR breakdown.
            out.push_str("        <MotherTongue>true</MotherTongue>\n");
        } else {
            out.push_str(&format!(
                "        <ProficiencyCode>{}</ProficiencyCode>\n",
                proficiency_level(&proficiency)
            ));
        }
        out.push_str("      </Language>\n");
    }
    out.push_str("    </Languages>\n");
}

// ── Tests ──
