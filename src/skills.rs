use std::collections::HashSet;

/// The five display buckets, in match-priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketKind {
    Cloud,
    Backend,
    Devops,
    Frontend,
    Tools,
}

impl BucketKind {
    pub fn key(self) -> &'static str {
        match self {
            BucketKind::Cloud => "cloud",
            BucketKind::Backend => "backend",
            BucketKind::Devops => "devops",
            BucketKind::Frontend => "frontend",
            BucketKind::Tools => "tools",
        }
    }

    pub fn display_label(self) -> &'static str {
        match self {
            BucketKind::Cloud => "Cloud & Infrastructure",
            BucketKind::Backend => "Backend & Languages",
            BucketKind::Devops => "DevOps & CI/CD",
            BucketKind::Frontend => "Frontend",
            BucketKind::Tools => "Methods & Tools",
        }
    }
}

/// Curated keyword sets per bucket plus the exclusion list. This is an
/// allow-list, not an exhaustive classifier: membership is exact
/// (case-insensitive), unlisted skills are dropped, and the exclusion set
/// removes duplicate-language and overly generic entries before any
/// bucket is consulted.
#[derive(Debug, Clone)]
pub struct SkillTaxonomy {
    pub cloud: Vec<String>,
    pub backend: Vec<String>,
    pub devops: Vec<String>,
    pub frontend: Vec<String>,
    pub tools: Vec<String>,
    pub excluded: Vec<String>,
}

impl Default for SkillTaxonomy {
    fn default() -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        SkillTaxonomy {
            cloud: owned(&[
                "Azure", "Windows Azure", "Cloud Infrastructure", "Cloud Security",
                "Cost Optimization", "Microsoft Entra ID", "Microsoft Dynamics 365",
                "Microsoft Power Platform", "Microsoft Fabric", "Business Central",
                "Software Infrastructure", "Containerization", "Distributed Systems",
                "Kubernetes",
            ]),
            backend: owned(&[
                "C#", ".NET", ".NET Framework", "SQL", "T-SQL", "LINQ",
                "Microservices", "Server Microsoft SQL", "OOP", "JavaScript",
                "Database", "ETL",
            ]),
            devops: owned(&[
                "DevOps", "Azure DevOps", "Git", "Version Control", "Automation",
                "Continuous improvement", "Github Enterprise", "Powershell Core",
                "Windows PowerShell", "Bash", "DSC", "Troubleshooting",
            ]),
            frontend: owned(&["HTML", "Kibana"]),
            tools: owned(&[
                "Visual Studio", "JIRA", "wsl", "Microsoft Office",
                "Agile Methodologies", "Agile Project Management", "Stakeholder Management",
                "Project management", "Project Leadership", "Communication",
                "Public speaking", "Attention to Detail", "Analytical Skills",
                "Generative AI", "Artificial Intelligence (AI)", "Artificial Intelligence for Business",
                "Chatbots", "Microsoft Search", "Search Engine Technology",
            ]),
            excluded: owned(&[
                "Lingua inglese", "Pianificazione delle capacità", "Lavoro di squadra",
                "Analisi dei dati", "Sviluppo di prodotto", "Infrastrutture",
                "Applicazioni Web", "Sviluppo di software", "Integrazione continua",
                "Social media", "Time management", "Customer Requirements",
                "Computer Ethics", "Identity management", "Security Administration",
            ]),
        }
    }
}

/// Skills grouped into the five display buckets, each preserving input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategorizedSkills {
    pub cloud: Vec<String>,
    pub backend: Vec<String>,
    pub devops: Vec<String>,
    pub frontend: Vec<String>,
    pub tools: Vec<String>,
}

impl CategorizedSkills {
    pub fn is_empty(&self) -> bool {
        self.buckets().iter().all(|(_, skills)| skills.is_empty())
    }

    /// Buckets in display order.
    pub fn buckets(&self) -> [(BucketKind, &[String]); 5] {
        [
            (BucketKind::Cloud, self.cloud.as_slice()),
            (BucketKind::Backend, self.backend.as_slice()),
            (BucketKind::Devops, self.devops.as_slice()),
            (BucketKind::Frontend, self.frontend.as_slice()),
            (BucketKind::Tools, self.tools.as_slice()),
        ]
    }
}

impl SkillTaxonomy {
    /// Sort each skill into the first bucket whose keyword set contains it.
    /// Excluded skills are dropped before bucket lookup; skills matching no
    /// bucket are dropped silently.
    pub fn categorize(&self, names: &[String]) -> CategorizedSkills {
        let excluded = lower_set(&self.excluded);
        let cloud = lower_set(&self.cloud);
        let backend = lower_set(&self.backend);
        let devops = lower_set(&self.devops);
        let frontend = lower_set(&self.frontend);
        let tools = lower_set(&self.tools);

        let mut out = CategorizedSkills::default();
        for name in names {
            let key = name.to_lowercase();
            if excluded.contains(&key) {
                continue;
            }
            if cloud.contains(&key) {
                out.cloud.push(name.clone());
            } else if backend.contains(&key) {
                out.backend.push(name.clone());
            } else if devops.contains(&key) {
                out.devops.push(name.clone());
            } else if frontend.contains(&key) {
                out.frontend.push(name.clone());
            } else if tools.contains(&key) {
                out.tools.push(name.clone());
            }
        }
        out
    }

    /// All skills minus the exclusion list, input order preserved. Feeds
    /// the flat skill listings of the CV dialects, which keep unbucketed
    /// skills the display buckets would drop.
    pub fn retain(&self, names: &[String]) -> Vec<String> {
        let excluded = lower_set(&self.excluded);
        names
            .iter()
            .filter(|n| !excluded.contains(&n.to_lowercase()))
            .cloned()
            .collect()
    }

    /// The bucket a single skill would land in, if any.
    pub fn bucket_of(&self, name: &str) -> Option<BucketKind> {
        let key = name.to_lowercase();
        if lower_set(&self.excluded).contains(&key) {
            return None;
        }
        for (kind, set) in [
            (BucketKind::Cloud, &self.cloud),
            (BucketKind::Backend, &self.backend),
            (BucketKind::Devops, &self.devops),
            (BucketKind::Frontend, &self.frontend),
            (BucketKind::Tools, &self.tools),
        ] {
            if lower_set(set).contains(&key) {
                return Some(kind);
            }
        }
        None
    }
}

fn lower_set(items: &[String]) -> HashSet<String> {
    items.iter().map(|s| s.to_lowercase()).collect()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn curated_buckets() {
        let tax = SkillTaxonomy::default();
        let out = tax.categorize(&names(&["Azure", "C#", "Lingua inglese", "Unknown Skill"]));
        assert_eq!(out.cloud, vec!["Azure"]);
        assert_eq!(out.backend, vec!["C#"]);
        assert!(out.devops.is_empty());
        assert!(out.frontend.is_empty());
        assert!(out.tools.is_empty());
    }

    #[test]
    fn matching_is_case_insensitive() {
        let tax = SkillTaxonomy::default();
        let out = tax.categorize(&names(&["azure", "KUBERNETES"]));
        assert_eq!(out.cloud, vec!["azure", "KUBERNETES"]);
    }

    #[test]
    fn exclusion_beats_bucket_membership() {
        let tax = SkillTaxonomy {
            excluded: vec!["Azure".to_string()],
            ..SkillTaxonomy::default()
        };
        let out = tax.categorize(&names(&["Azure"]));
        assert!(out.is_empty());
    }

    #[test]
    fn first_bucket_wins() {
        let tax = SkillTaxonomy {
            cloud: vec!["Shared".to_string()],
            devops: vec!["Shared".to_string()],
            ..SkillTaxonomy::default()
        };
        let out = tax.categorize(&names(&["Shared"]));
        assert_eq!(out.cloud, vec!["Shared"]);
        assert!(out.devops.is_empty());
    }

    #[test]
    fn retain_drops_only_excluded() {
        let tax = SkillTaxonomy::default();
        let retained = tax.retain(&names(&["Azure", "Lingua inglese", "Underwater Basket Weaving"]));
        assert_eq!(retained, vec!["Azure", "Underwater Basket Weaving"]);
    }

    #[test]
    fn bucket_of_known_and_unknown() {
        let tax = SkillTaxonomy::default();
        assert_eq!(tax.bucket_of("Git"), Some(BucketKind::Devops));
        assert_eq!(tax.bucket_of("Interpretive Dance"), None);
        assert_eq!(tax.bucket_of("Lingua inglese"), None);
    }

    #[test]
    fn empty_input_empty_buckets() {
        let tax = SkillTaxonomy::default();
        assert!(tax.categorize(&[]).is_empty());
    }
}
