//! Static career knowledge base.
//!
//! Each entry pairs a lowercase match key with a rendered recommendation.
//! Matching is substring containment against lowercased interest terms, so
//! keys must stay lowercase for the comparison to hold. `validate` runs at
//! startup and refuses to serve from a malformed table.

use anyhow::{bail, Result};

#[derive(Debug, Clone, Copy)]
pub struct KnowledgeBaseEntry {
    /// Lowercase token matched against interest terms by containment.
    pub key: &'static str,
    pub title: &'static str,
    pub careers: &'static [&'static str],
    pub summary: &'static str,
}

pub const KNOWLEDGE_BASE: &[KnowledgeBaseEntry] = &[
    KnowledgeBaseEntry {
        key: "ai",
        title: "Artificial Intelligence",
        careers: &["AI Engineering", "Research Science", "AI Product Management"],
        summary: "Builds systems that learn from data and automate decisions across industries.",
    },
    KnowledgeBaseEntry {
        key: "machine learning",
        title: "Machine Learning",
        careers: &["ML Engineering", "Applied Research", "MLOps Engineering"],
        summary: "Designs, trains, and ships predictive models into production systems.",
    },
    KnowledgeBaseEntry {
        key: "data",
        title: "Data Careers",
        careers: &[
            "Data Science",
            "Data Engineering",
            "Business Intelligence Analysis",
        ],
        summary: "Turns raw data into pipelines, insight, and decision support.",
    },
    KnowledgeBaseEntry {
        key: "biology",
        title: "Life Sciences",
        careers: &["Biotechnology", "Genetic Engineering", "Pharma Research"],
        summary: "Applies biological insight to medicine, agriculture, and industry.",
    },
    KnowledgeBaseEntry {
        key: "biotechnology",
        title: "Biotechnology",
        careers: &["Bioprocess Engineering", "Clinical Research", "Regulatory Affairs"],
        summary: "Engineers living systems into therapies, diagnostics, and materials.",
    },
    KnowledgeBaseEntry {
        key: "pharma",
        title: "Pharmaceutical Sciences",
        careers: &["Drug Discovery", "Clinical Trials Management", "Pharmacovigilance"],
        summary: "Moves treatments from the lab bench through trials to patients.",
    },
    KnowledgeBaseEntry {
        key: "engineering",
        title: "Engineering",
        careers: &["Software Engineering", "Civil Engineering", "Systems Engineering"],
        summary: "Designs and builds the systems and structures the world runs on.",
    },
    KnowledgeBaseEntry {
        key: "mechanics",
        title: "Mechanical Disciplines",
        careers: &["Mechanical Engineering", "Automotive Engineering", "Aerospace Engineering"],
        summary: "Applies force, motion, and materials to machines and vehicles.",
    },
    KnowledgeBaseEntry {
        key: "electronics",
        title: "Electronics",
        careers: &["Electronics Engineering", "Embedded Systems Development", "Hardware Design"],
        summary: "Creates the circuits and embedded platforms inside modern devices.",
    },
    KnowledgeBaseEntry {
        key: "robotics",
        title: "Robotics",
        careers: &["Robotics Engineering", "Automation Engineering", "Control Systems Design"],
        summary: "Combines sensing, control, and mechanics into autonomous machines.",
    },
    KnowledgeBaseEntry {
        key: "leadership",
        title: "Leadership & Management",
        careers: &["Project Management", "Strategy Consulting", "Executive Leadership"],
        summary: "Guides teams and organizations toward long-term goals.",
    },
    KnowledgeBaseEntry {
        key: "strategy",
        title: "Strategy",
        careers: &["Strategy Consulting", "Corporate Development", "Operations Strategy"],
        summary: "Shapes where organizations compete and how they win.",
    },
    KnowledgeBaseEntry {
        key: "management",
        title: "Management",
        careers: &["Product Management", "Operations Management", "Program Management"],
        summary: "Coordinates people, budgets, and delivery across workstreams.",
    },
];

/// Startup check over the bundled table.
pub fn validate() -> Result<()> {
    validate_entries(KNOWLEDGE_BASE)
}

fn validate_entries(entries: &[KnowledgeBaseEntry]) -> Result<()> {
    let mut seen_keys: Vec<&str> = Vec::with_capacity(entries.len());

    for entry in entries {
        if entry.key.is_empty() {
            bail!("knowledge base entry has an empty key");
        }
        if entry.key.chars().any(|c| c.is_uppercase()) {
            bail!("knowledge base key '{}' must be lowercase", entry.key);
        }
        if seen_keys.contains(&entry.key) {
            bail!("knowledge base key '{}' is duplicated", entry.key);
        }
        if entry.title.is_empty() {
            bail!("knowledge base entry '{}' has an empty title", entry.key);
        }
        if entry.careers.is_empty() {
            bail!("knowledge base entry '{}' lists no careers", entry.key);
        }
        if entry.careers.iter().any(|career| career.is_empty()) {
            bail!("knowledge base entry '{}' lists an empty career", entry.key);
        }
        if entry.summary.is_empty() {
            bail!("knowledge base entry '{}' has an empty summary", entry.key);
        }
        seen_keys.push(entry.key);
    }

    Ok(())
}
