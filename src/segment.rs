use regex::Regex;
use tracing::debug;

const MAX_BULLETS: usize = 6;
const LONG_FRAGMENT: usize = 200;
const SINGLE_BULLET_CAP: usize = 300;
const MIN_FRAGMENT: usize = 5;
const MIN_SENTENCE: usize = 10;

/// Marker vocabulary driving the segmenter. Injectable so alternate marker
/// sets can be swapped in without touching the algorithm.
#[derive(Debug, Clone)]
pub struct SegmenterVocabulary {
    /// Section markers that open competency-extraction mode, e.g. "Key Competencies:".
    pub competency_sections: Vec<String>,
    /// Prefix of a mission-statement chunk, rendered as one emphasized block.
    pub mission_marker: String,
    /// Prefix of a locality aside, rendered italicized.
    pub locality_marker: String,
    /// Prefix of a description fragment promoted to an emphasized sub-header bullet.
    pub focus_marker: String,
    /// Ordered competency labels, each a compound noun phrase ending in a
    /// colon. Compound phrases come before their generic suffixes so the
    /// leftmost-match scan prefers them.
    pub competency_labels: Vec<String>,
}

impl Default for SegmenterVocabulary {
    fn default() -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        SegmenterVocabulary {
            competency_sections: owned(&["Key Competencies:", "Core Competencies:"]),
            mission_marker: "My Mission:".to_string(),
            locality_marker: "Based in".to_string(),
            focus_marker: "Focus areas".to_string(),
            competency_labels: owned(&[
                "Governance at Scale:",
                "Infrastructure as Code:",
                "Backend Engineering:",
                "Security Automation:",
                "Cloud Solutions Architecting:",
                "Power Platform Administration:",
                "Cloud Architecture:",
                "DevOps:",
                "Security:",
                "Automation:",
            ]),
        }
    }
}

/// A (label, body) pair produced by segmenting free text. A chunk with no
/// label is verbatim prose.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledChunk {
    pub label: Option<String>,
    pub body: String,
}

/// One displayable unit of a segmented biography summary.
#[derive(Debug, Clone, PartialEq)]
pub enum SummarySegment {
    Paragraph(String),
    Mission(String),
    Locality(String),
    Competencies {
        /// The section marker that opened this group; empty for bullet
        /// groups continuing after an interruption.
        header: String,
        chunks: Vec<LabeledChunk>,
    },
}

/// One bullet of a segmented job description.
#[derive(Debug, Clone, PartialEq)]
pub enum Bullet {
    Plain(String),
    /// A "focus areas" fragment, rendered as an emphasized sub-header.
    Focus(String),
}

/// Heuristic splitter for the free-text summary and description fields.
/// Best-effort pattern recognition with a verbatim fallback: malformed
/// input degrades to plain prose, never to an error.
pub struct Segmenter {
    vocab: SegmenterVocabulary,
    label_re: Option<Regex>,
}

impl Default for Segmenter {
    fn default() -> Self {
        Segmenter::new(SegmenterVocabulary::default())
    }
}

impl Segmenter {
    pub fn new(vocab: SegmenterVocabulary) -> Self {
        let label_re = if vocab.competency_labels.is_empty() {
            None
        } else {
            let alternation = vocab
                .competency_labels
                .iter()
                .map(|l| regex::escape(l))
                .collect::<Vec<_>>()
                .join("|");
            // Alternation order mirrors the vocabulary, so at equal offsets
            // the earlier (more specific) label wins.
            Regex::new(&format!("(?i){alternation}")).ok()
        };
        Segmenter { vocab, label_re }
    }

    /// Segment a biography summary into ordered display units.
    ///
    /// The source uses a double-space in place of paragraph breaks. Each
    /// chunk is tested against the section markers; a competencies marker
    /// opens a sticky label-scanning mode that persists until a mission
    /// marker or the end of the text.
    pub fn summary(&self, text: &str) -> Vec<SummarySegment> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }

        let mut chunks: Vec<&str> = trimmed
            .split("  ")
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .collect();
        if chunks.len() <= 1 {
            chunks = vec![trimmed];
        }

        let mut segments: Vec<SummarySegment> = Vec::new();
        let mut in_competencies = false;

        for chunk in chunks {
            if let Some(section) = self
                .vocab
                .competency_sections
                .iter()
                .find(|s| chunk.starts_with(s.as_str()))
            {
                in_competencies = true;
                let rest = chunk[section.len()..].trim();
                let labeled = if rest.is_empty() {
                    Vec::new()
                } else {
                    self.scan_labels(rest)
                };
                segments.push(SummarySegment::Competencies {
                    header: section.clone(),
                    chunks: labeled,
                });
                continue;
            }

            if chunk.starts_with(&self.vocab.mission_marker) {
                in_competencies = false;
                segments.push(SummarySegment::Mission(chunk.to_string()));
                continue;
            }

            if chunk.starts_with(&self.vocab.locality_marker) {
                segments.push(SummarySegment::Locality(chunk.to_string()));
                continue;
            }

            if in_competencies {
                let labeled = self.scan_labels(chunk);
                match segments.last_mut() {
                    Some(SummarySegment::Competencies { chunks, .. }) => chunks.extend(labeled),
                    _ => segments.push(SummarySegment::Competencies {
                        header: String::new(),
                        chunks: labeled,
                    }),
                }
                continue;
            }

            segments.push(SummarySegment::Paragraph(chunk.to_string()));
        }

        segments
    }

    /// Greedy leftmost-match scan over the competency labels. Text before
    /// the first label is discarded; text between labels belongs to the
    /// preceding label; trailing text joins the last label's body. With no
    /// label match the whole text comes back as one unlabeled chunk.
    fn scan_labels(&self, text: &str) -> Vec<LabeledChunk> {
        let matches: Vec<regex::Match> = match &self.label_re {
            Some(re) => re.find_iter(text).collect(),
            None => Vec::new(),
        };

        if matches.is_empty() {
            debug!("no competency label matched; keeping chunk verbatim");
            return vec![LabeledChunk {
                label: None,
                body: text.trim().to_string(),
            }];
        }

        let mut chunks = Vec::with_capacity(matches.len());
        for (i, m) in matches.iter().enumerate() {
            let body_end = matches.get(i + 1).map(|n| n.start()).unwrap_or(text.len());
            let body = text[m.end()..body_end].trim().to_string();
            chunks.push(LabeledChunk {
                label: Some(self.canonical_label(m.as_str())),
                body,
            });
        }
        chunks
    }

    // Labels render with the vocabulary's casing, not the source text's.
    fn canonical_label(&self, matched: &str) -> String {
        self.vocab
            .competency_labels
            .iter()
            .find(|l| l.eq_ignore_ascii_case(matched))
            .map(|l| l.as_str())
            .unwrap_or(matched)
            .trim_end_matches(':')
            .to_string()
    }

    /// Segment a job-description paragraph into at most six bullets.
    ///
    /// Fragments come from the double-space/newline convention; an
    /// overlong fragment is sub-split on sentence boundaries, and a single
    /// unsplittable block is capped with an ellipsis.
    pub fn description(&self, text: &str) -> Vec<Bullet> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }

        let parts: Vec<&str> = trimmed
            .split('\n')
            .flat_map(|line| line.split("  "))
            .map(str::trim)
            .filter(|p| p.chars().count() > MIN_FRAGMENT)
            .collect();

        if parts.len() <= 1 {
            let sentences = split_sentences(trimmed);
            if sentences.len() > 1 {
                return sentences
                    .into_iter()
                    .take(MAX_BULLETS)
                    .map(Bullet::Plain)
                    .collect();
            }
            return vec![Bullet::Plain(truncate_ellipsis(trimmed, SINGLE_BULLET_CAP))];
        }

        let mut bullets = Vec::new();
        for part in parts {
            if bullets.len() >= MAX_BULLETS {
                break;
            }
            let cleaned = part.trim_start_matches(['-', '•', '*', ' ']);
            if starts_with_ignore_case(cleaned, &self.vocab.focus_marker) {
                bullets.push(Bullet::Focus(cleaned.to_string()));
            } else if cleaned.chars().count() > LONG_FRAGMENT {
                for sentence in split_sentences(cleaned) {
                    if bullets.len() >= MAX_BULLETS {
                        break;
                    }
                    bullets.push(Bullet::Plain(sentence));
                }
            } else {
                bullets.push(Bullet::Plain(cleaned.to_string()));
            }
        }
        bullets
    }
}

fn split_sentences(text: &str) -> Vec<String> {
    text.split(". ")
        .map(|s| s.trim().trim_end_matches('.').to_string())
        .filter(|s| s.chars().count() > MIN_SENTENCE)
        .collect()
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Char-aware truncation with a trailing ellipsis.
pub fn truncate_ellipsis(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max).collect();
    format!("{}...", truncated.trim_end())
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks(segments: &[SummarySegment]) -> Vec<(Option<&str>, &str)> {
        segments
            .iter()
            .filter_map(|s| match s {
                SummarySegment::Competencies { chunks, .. } => Some(chunks),
                _ => None,
            })
            .flatten()
            .map(|c| (c.label.as_deref(), c.body.as_str()))
            .collect()
    }

    #[test]
    fn plain_prose_passthrough() {
        let seg = Segmenter::default();
        let out = seg.summary("I build cloud platforms for a living.");
        assert_eq!(
            out,
            vec![SummarySegment::Paragraph(
                "I build cloud platforms for a living.".to_string()
            )]
        );
    }

    #[test]
    fn competency_extraction_in_order() {
        let seg = Segmenter::default();
        let out = seg.summary(
            "Key Competencies: Cloud Architecture: builds platforms. DevOps: ships pipelines.",
        );
        assert_eq!(
            chunks(&out),
            vec![
                (Some("Cloud Architecture"), "builds platforms."),
                (Some("DevOps"), "ships pipelines."),
            ]
        );
    }

    #[test]
    fn competency_labels_case_insensitive() {
        let seg = Segmenter::default();
        let out = seg.summary("Key Competencies: cloud architecture: builds platforms.");
        assert_eq!(chunks(&out), vec![(Some("Cloud Architecture"), "builds platforms.")]);
    }

    #[test]
    fn compound_label_beats_generic_suffix() {
        let seg = Segmenter::default();
        let out = seg.summary("Key Competencies: Security Automation: policy as code.");
        assert_eq!(chunks(&out), vec![(Some("Security Automation"), "policy as code.")]);
    }

    #[test]
    fn competency_mode_persists_across_chunks() {
        let seg = Segmenter::default();
        let out = seg.summary(
            "Key Competencies: Cloud Architecture: platforms.  DevOps: pipelines.  My Mission: ship it.  Plain closing paragraph here.",
        );
        assert_eq!(
            chunks(&out),
            vec![
                (Some("Cloud Architecture"), "platforms."),
                (Some("DevOps"), "pipelines."),
            ]
        );
        assert!(matches!(&out[1], SummarySegment::Mission(m) if m == "My Mission: ship it."));
        assert!(matches!(&out[2], SummarySegment::Paragraph(p) if p == "Plain closing paragraph here."));
    }

    #[test]
    fn mission_and_locality_markers() {
        let seg = Segmenter::default();
        let out = seg.summary("First paragraph about work.  My Mission: automate everything.  Based in Milan, Italy.");
        assert_eq!(out.len(), 3);
        assert!(matches!(&out[0], SummarySegment::Paragraph(_)));
        assert!(matches!(&out[1], SummarySegment::Mission(_)));
        assert!(matches!(&out[2], SummarySegment::Locality(l) if l == "Based in Milan, Italy."));
    }

    #[test]
    fn unmatched_competency_text_kept_verbatim() {
        let seg = Segmenter::default();
        let out = seg.summary("Key Competencies: nothing that looks like a label");
        assert_eq!(chunks(&out), vec![(None, "nothing that looks like a label")]);
    }

    #[test]
    fn trailing_text_joins_last_label() {
        let seg = Segmenter::default();
        let out = seg.summary("Key Competencies: DevOps: pipelines and more trailing detail");
        assert_eq!(chunks(&out), vec![(Some("DevOps"), "pipelines and more trailing detail")]);
    }

    #[test]
    fn alternate_vocabulary() {
        let vocab = SegmenterVocabulary {
            competency_sections: vec!["Expertise:".to_string()],
            competency_labels: vec!["Brewing:".to_string(), "Roasting:".to_string()],
            ..SegmenterVocabulary::default()
        };
        let seg = Segmenter::new(vocab);
        let out = seg.summary("Expertise: Brewing: espresso. Roasting: light roasts.");
        assert_eq!(
            chunks(&out),
            vec![(Some("Brewing"), "espresso."), (Some("Roasting"), "light roasts.")]
        );
    }

    #[test]
    fn description_single_sentence_idempotent() {
        let seg = Segmenter::default();
        let out = seg.description("  Maintained the build farm  ");
        assert_eq!(out, vec![Bullet::Plain("Maintained the build farm".to_string())]);
    }

    #[test]
    fn description_single_block_truncated() {
        let seg = Segmenter::default();
        let long = "x".repeat(400);
        let out = seg.description(&long);
        assert_eq!(out.len(), 1);
        match &out[0] {
            Bullet::Plain(t) => {
                assert!(t.ends_with("..."));
                assert_eq!(t.chars().count(), 303);
            }
            other => panic!("unexpected bullet: {:?}", other),
        }
    }

    #[test]
    fn description_fragments_become_bullets() {
        let seg = Segmenter::default();
        let out = seg.description("- Led the platform team\n- Cut deploy times in half");
        assert_eq!(
            out,
            vec![
                Bullet::Plain("Led the platform team".to_string()),
                Bullet::Plain("Cut deploy times in half".to_string()),
            ]
        );
    }

    #[test]
    fn description_caps_at_six_bullets() {
        let seg = Segmenter::default();
        let text = (1..=9)
            .map(|i| format!("Did the thing number {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(seg.description(&text).len(), 6);
    }

    #[test]
    fn description_focus_fragment_emphasized() {
        let seg = Segmenter::default();
        let out = seg.description("Ran the migration program\nFocus areas: IaC, governance");
        assert_eq!(out[1], Bullet::Focus("Focus areas: IaC, governance".to_string()));
    }

    #[test]
    fn description_sentence_split_single_fragment() {
        let seg = Segmenter::default();
        let out = seg.description(
            "Designed the landing zone architecture. Built the deployment pipelines. Mentored four engineers.",
        );
        assert_eq!(
            out,
            vec![
                Bullet::Plain("Designed the landing zone architecture".to_string()),
                Bullet::Plain("Built the deployment pipelines".to_string()),
                Bullet::Plain("Mentored four engineers".to_string()),
            ]
        );
    }

    #[test]
    fn description_drops_short_noise_fragments() {
        let seg = Segmenter::default();
        let out = seg.description("ok\nShipped the observability stack\nBuilt the on-call rotation");
        assert_eq!(
            out,
            vec![
                Bullet::Plain("Shipped the observability stack".to_string()),
                Bullet::Plain("Built the on-call rotation".to_string()),
            ]
        );
    }

    #[test]
    fn truncate_is_char_aware() {
        assert_eq!(truncate_ellipsis("héllo wörld", 100), "héllo wörld");
        assert_eq!(truncate_ellipsis("héllo wörld", 5), "héllo...");
    }
}
