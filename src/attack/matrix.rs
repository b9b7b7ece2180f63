//! Hierarchy builder.
//!
//! Turns a flat [`FrameworkBundle`] into the tactic -> technique ->
//! subtechnique tree for one platform.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::{
    bundle::{FrameworkBundle, FrameworkObject, RelationshipType},
    Framework,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subtechnique {
    pub id: String,
    pub name: String,
    pub reference_url: String,
}

impl From<&FrameworkObject> for Subtechnique {
    fn from(object: &FrameworkObject) -> Self {
        return Self {
            id: object.id.clone(),
            name: object.name.clone(),
            reference_url: object.reference_url.clone(),
        };
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Technique {
    pub id: String,
    pub name: String,
    pub reference_url: String,
    pub subtechniques: Vec<Subtechnique>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tactic {
    pub id: String,
    pub name: String,
    pub techniques: Vec<Technique>,
}

/// Objects left out of a tree because the bundle could not place them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DropReport {
    pub tactic_less_techniques: usize,
    pub dangling_subtechniques: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixTree {
    pub framework: Framework,
    pub platform: String,
    pub tactics: Vec<Tactic>,
    pub dropped: DropReport,
}

impl MatrixTree {
    /// Technique entries across all tactics; a technique listed under two
    /// tactics counts twice.
    pub fn technique_count(&self) -> usize {
        return self.tactics.iter().map(|tactic| tactic.techniques.len()).sum();
    }

    pub fn is_empty(&self) -> bool {
        return self.technique_count() == 0;
    }

    pub fn title(&self) -> String {
        return format!("MITRE ATT&CK {} Matrix for {}", self.framework, self.platform);
    }
}

impl Into<comfy_table::Table> for MatrixTree {
    fn into(self) -> comfy_table::Table {
        let mut table = comfy_table::Table::new();
        table
            .load_preset(comfy_table::presets::UTF8_FULL)
            .set_content_arrangement(comfy_table::ContentArrangement::Dynamic)
            .set_header(vec![
                comfy_table::Cell::new("Tactic")
                    .add_attribute(comfy_table::Attribute::Bold)
                    .fg(comfy_table::Color::Red),
                comfy_table::Cell::new("ID")
                    .add_attribute(comfy_table::Attribute::Bold)
                    .fg(comfy_table::Color::Red),
                comfy_table::Cell::new("Technique")
                    .add_attribute(comfy_table::Attribute::Bold)
                    .fg(comfy_table::Color::Red),
                comfy_table::Cell::new("Subtechniques")
                    .add_attribute(comfy_table::Attribute::Bold)
                    .fg(comfy_table::Color::Red),
            ]);

        for tactic in self.tactics {
            if tactic.techniques.is_empty() {
                table.add_row(vec![tactic.name.clone(), String::new(), String::new(), String::new()]);
            }

            for technique in tactic.techniques {
                table.add_row(vec![
                    tactic.name.clone(),
                    technique.id,
                    technique.name,
                    technique
                        .subtechniques
                        .iter()
                        .map(|sub| format!("{} {}", sub.id, sub.name))
                        .collect::<Vec<String>>()
                        .join("\n"),
                ]);
            }
        }

        return table;
    }
}

fn matches_platform(technique: &FrameworkObject, platform_key: &str) -> bool {
    return technique
        .platforms
        .iter()
        .any(|platform| platform.trim().to_lowercase() == platform_key);
}

/// Builds the tree for `platform` (case-insensitive).
///
/// Tactics follow the matrix column order declared by the bundle, then the
/// order in which `uses` edges first reference them; tactics nobody references
/// are appended so the tree always covers the whole framework. Techniques keep
/// their declaration order and are repeated under every tactic they resolve to.
/// Subtechniques inherit their parent's platforms and are sorted by ID.
pub fn build(bundle: &FrameworkBundle, platform: &str) -> MatrixTree {
    let platform_key = platform.trim().to_lowercase();

    let is_tactic = |id: &str| bundle.get(id).map_or(false, FrameworkObject::is_tactic);
    let is_parent_technique = |id: &str| {
        bundle
            .get(id)
            .map_or(false, |object| object.is_technique() && !object.is_subtechnique)
    };

    let mut technique_tactics: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut referenced_tactics: Vec<&str> = Vec::new();

    for edge in bundle.relationships() {
        if edge.relationship_type != RelationshipType::Uses
            || !is_tactic(&edge.target_id)
            || !is_parent_technique(&edge.source_id)
        {
            continue;
        }

        let tactics = technique_tactics.entry(edge.source_id.as_str()).or_default();

        if !tactics.contains(&edge.target_id.as_str()) {
            tactics.push(edge.target_id.as_str());
        }

        referenced_tactics.push(edge.target_id.as_str());
    }

    let mut seen_tactics: HashSet<&str> = HashSet::new();
    let tactic_ids: Vec<&str> = bundle
        .tactic_order()
        .iter()
        .map(String::as_str)
        .chain(referenced_tactics)
        .chain(
            bundle
                .objects()
                .filter(|object| object.is_tactic())
                .map(|object| object.id.as_str()),
        )
        .filter(|id| is_tactic(*id) && seen_tactics.insert(*id))
        .collect();

    let mut subtechniques: HashMap<&str, Vec<&FrameworkObject>> = HashMap::new();

    for object in bundle
        .objects()
        .filter(|object| object.is_technique() && object.is_subtechnique)
    {
        subtechniques
            .entry(object.parent_id.as_str())
            .or_default()
            .push(object);
    }

    for children in subtechniques.values_mut() {
        children.sort_by(|left, right| left.id.cmp(&right.id));
    }

    let mut columns: HashMap<&str, Vec<Technique>> = HashMap::new();
    let mut retained: HashSet<&str> = HashSet::new();
    let mut dropped = DropReport::default();

    for object in bundle
        .objects()
        .filter(|object| object.is_technique() && !object.is_subtechnique)
    {
        let tactics = match technique_tactics.get(object.id.as_str()) {
            Some(tactics) => tactics,
            None => {
                log::debug!("Technique '{}' does not resolve to any tactic", object.id);
                dropped.tactic_less_techniques += 1;
                continue;
            }
        };

        if !matches_platform(object, &platform_key) {
            continue;
        }

        retained.insert(object.id.as_str());

        let technique = Technique {
            id: object.id.clone(),
            name: object.name.clone(),
            reference_url: object.reference_url.clone(),
            subtechniques: subtechniques
                .get(object.id.as_str())
                .map(|children| children.iter().map(|child| Subtechnique::from(*child)).collect())
                .unwrap_or_default(),
        };

        for tactic_id in tactics {
            columns
                .entry(*tactic_id)
                .or_default()
                .push(technique.clone());
        }
    }

    for (parent_id, children) in subtechniques.iter() {
        if !retained.contains(parent_id) {
            for child in children {
                log::debug!(
                    "Subtechnique '{}' has no retained parent '{}'",
                    child.id,
                    parent_id
                );
            }

            dropped.dangling_subtechniques += children.len();
        }
    }

    if dropped.tactic_less_techniques > 0 {
        log::warn!(
            "Dropped {} {} technique(s) without a resolvable tactic",
            dropped.tactic_less_techniques,
            bundle.framework()
        );
    }

    if dropped.dangling_subtechniques > 0 {
        log::warn!(
            "Dropped {} {} subtechnique(s) without a retained parent for platform '{}'",
            dropped.dangling_subtechniques,
            bundle.framework(),
            platform
        );
    }

    let tactics: Vec<Tactic> = tactic_ids
        .into_iter()
        .filter_map(|id| bundle.get(id))
        .map(|tactic| Tactic {
            id: tactic.id.clone(),
            name: tactic.name.clone(),
            techniques: columns.remove(tactic.id.as_str()).unwrap_or_default(),
        })
        .collect();

    return MatrixTree {
        framework: bundle.framework(),
        platform: platform.trim().to_string(),
        tactics,
        dropped,
    };
}
