//! Framework data loader.
//!
//! Reads a MITRE CTI STIX bundle and flattens it into tactic and technique
//! records keyed by ATT&CK ID, plus the relationship edges between them.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{attack::Framework, error, WebFetch};

const ATTACK_SOURCE_NAMES: [&'static str; 3] =
    ["mitre-attack", "mitre-mobile-attack", "mitre-ics-attack"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Tactic,
    Technique,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameworkObject {
    pub id: String,
    pub object_type: ObjectType,
    pub name: String,
    pub description: String,
    pub platforms: BTreeSet<String>,
    pub reference_url: String,
    pub is_subtechnique: bool,
    /// Empty unless `is_subtechnique` is set.
    pub parent_id: String,
}

impl FrameworkObject {
    pub fn tactic(id: &str, name: &str) -> Self {
        return Self {
            id: id.to_string(),
            object_type: ObjectType::Tactic,
            name: name.to_string(),
            description: String::new(),
            platforms: BTreeSet::new(),
            reference_url: String::new(),
            is_subtechnique: false,
            parent_id: String::new(),
        };
    }

    /// Builds a technique record, deriving the subtechnique fields from a
    /// dotted ID such as `T1566.001`.
    pub fn technique(id: &str, name: &str, platforms: &[&str]) -> Self {
        let parent_id = parent_technique_id(id).unwrap_or_default().to_string();

        return Self {
            id: id.to_string(),
            object_type: ObjectType::Technique,
            name: name.to_string(),
            description: String::new(),
            platforms: platforms.iter().map(|platform| platform.to_string()).collect(),
            reference_url: String::new(),
            is_subtechnique: !parent_id.is_empty(),
            parent_id,
        };
    }

    pub fn with_reference_url(mut self, url: &str) -> Self {
        self.reference_url = url.to_string();

        return self;
    }

    pub fn is_tactic(&self) -> bool {
        return self.object_type == ObjectType::Tactic;
    }

    pub fn is_technique(&self) -> bool {
        return self.object_type == ObjectType::Technique;
    }
}

/// `T1566.001` -> `T1566`
pub fn parent_technique_id(id: &str) -> Option<&str> {
    return id
        .split_once('.')
        .map(|(parent, _)| parent)
        .filter(|parent| !parent.is_empty());
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationshipType {
    Uses,
    SubtechniqueOf,
    Other(String),
}

impl From<&str> for RelationshipType {
    fn from(value: &str) -> Self {
        match value {
            "uses" => Self::Uses,
            "subtechnique-of" => Self::SubtechniqueOf,
            other => Self::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub source_id: String,
    pub target_id: String,
    pub relationship_type: RelationshipType,
}

impl Relationship {
    pub fn uses(source_id: &str, target_id: &str) -> Self {
        return Self {
            source_id: source_id.to_string(),
            target_id: target_id.to_string(),
            relationship_type: RelationshipType::Uses,
        };
    }
}

/// Where a framework bundle is read from.
#[derive(Debug, Clone)]
pub enum DataSource {
    Remote,
    Local(PathBuf),
    /// Reads `<dir>/<framework>.json` when present, fetching and storing it
    /// otherwise. `refresh` always fetches.
    Cached { dir: PathBuf, refresh: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameworkBundle {
    framework: Framework,
    objects: Vec<FrameworkObject>,
    index: HashMap<String, usize>,
    relationships: Vec<Relationship>,
    tactic_order: Vec<String>,
}

impl FrameworkBundle {
    /// Objects keep their declaration order. A repeated ID keeps its first
    /// declaration.
    pub fn new(
        framework: Framework,
        objects: Vec<FrameworkObject>,
        relationships: Vec<Relationship>,
    ) -> Self {
        let mut kept: Vec<FrameworkObject> = Vec::with_capacity(objects.len());
        let mut index: HashMap<String, usize> = HashMap::with_capacity(objects.len());

        for object in objects {
            if index.contains_key(&object.id) {
                log::warn!("Duplicate {} object '{}' ignored", framework, object.id);
                continue;
            }

            index.insert(object.id.clone(), kept.len());
            kept.push(object);
        }

        return Self {
            framework,
            objects: kept,
            index,
            relationships,
            tactic_order: Vec::new(),
        };
    }

    /// Column order declared by the upstream matrix, as tactic IDs.
    pub fn with_tactic_order(mut self, tactic_order: Vec<String>) -> Self {
        self.tactic_order = tactic_order;

        return self;
    }

    pub fn framework(&self) -> Framework {
        return self.framework;
    }

    pub fn get(&self, id: &str) -> Option<&FrameworkObject> {
        return self.index.get(id).map(|inx| &self.objects[*inx]);
    }

    pub fn objects(&self) -> std::slice::Iter<FrameworkObject> {
        return self.objects.iter();
    }

    pub fn relationships(&self) -> &[Relationship] {
        return &self.relationships;
    }

    pub fn tactic_order(&self) -> &[String] {
        return &self.tactic_order;
    }

    pub fn len(&self) -> usize {
        return self.objects.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.objects.is_empty();
    }

    pub fn fetch(framework: Framework, req_client: &impl WebFetch) -> Result<Self, error::Error> {
        let url: &'static str = framework.into();
        log::info!("Fetching MITRE ATT&CK {} data from {}", framework, url);

        let fetched_response = req_client.fetch(url)?;

        return Self::parse(framework, &fetched_response);
    }

    pub fn from_file(framework: Framework, path: &Path) -> Result<Self, error::Error> {
        log::info!("Reading MITRE ATT&CK {} data from {}", framework, path.display());

        let raw = std::fs::read_to_string(path).map_err(|err| {
            error::Error::DataUnavailable(format!("{}: {}", path.display(), err))
        })?;

        return Self::parse(framework, &raw);
    }

    pub fn load(
        framework: Framework,
        source: &DataSource,
        req_client: &impl WebFetch,
    ) -> Result<Self, error::Error> {
        match source {
            DataSource::Remote => Self::fetch(framework, req_client),
            DataSource::Local(path) => Self::from_file(framework, path),
            DataSource::Cached { dir, refresh } => {
                let cache_file = dir.join(format!("{}.json", framework.slug()));

                if !refresh && cache_file.exists() {
                    match Self::from_file(framework, &cache_file) {
                        Err(error::Error::Parser(err)) => log::warn!(
                            "Discarding unreadable cache '{}': {}",
                            cache_file.display(),
                            err
                        ),
                        cached => return cached,
                    }
                }

                let url: &'static str = framework.into();
                log::info!("Fetching MITRE ATT&CK {} data from {}", framework, url);
                let fetched_response = req_client.fetch(url)?;
                let bundle = Self::parse(framework, &fetched_response)?;

                if let Err(err) = std::fs::create_dir_all(dir)
                    .and_then(|_| std::fs::write(&cache_file, &fetched_response))
                {
                    log::warn!("Unable to cache '{}': {}", cache_file.display(), err);
                } else {
                    log::debug!("Cached {} data at '{}'", framework, cache_file.display());
                }

                Ok(bundle)
            }
        }
    }

    pub fn parse(framework: Framework, raw: &str) -> Result<Self, error::Error> {
        let raw_bundle: RawBundle = serde_json::from_str(raw)?;

        if let Some(kind) = &raw_bundle.kind {
            if kind != "bundle" {
                return Err(error::Error::Parser(format!(
                    "expected a STIX bundle, found '{}'",
                    kind
                )));
            }
        }

        let mut objects: Vec<FrameworkObject> = Vec::new();
        let mut attack_ids: HashMap<String, String> = HashMap::new();
        let mut tactic_shortnames: HashMap<String, String> = HashMap::new();
        let mut technique_phases: Vec<(String, Vec<String>)> = Vec::new();
        let mut raw_relationships: Vec<RawObject> = Vec::new();
        let mut matrix_refs: Option<Vec<String>> = None;
        let mut ignored = 0usize;

        for value in raw_bundle.objects {
            let raw_object: RawObject = match serde_json::from_value(value) {
                Ok(raw_object) => raw_object,
                Err(err) => {
                    log::warn!("Skipping malformed {} object: {}", framework, err);
                    continue;
                }
            };

            if raw_object.revoked || raw_object.x_mitre_deprecated {
                log::debug!("Skipping retired object '{}'", raw_object.id);
                continue;
            }

            match raw_object.kind.as_str() {
                "x-mitre-tactic" | "attack-pattern" => {
                    let object = match raw_object.to_framework_object() {
                        Some(object) => object,
                        None => {
                            log::debug!("Skipping '{}': no ATT&CK ID", raw_object.id);
                            continue;
                        }
                    };

                    if object.is_tactic() && !raw_object.x_mitre_shortname.is_empty() {
                        tactic_shortnames
                            .insert(raw_object.x_mitre_shortname.clone(), object.id.clone());
                    }

                    if object.is_technique() {
                        technique_phases.push((
                            object.id.clone(),
                            raw_object
                                .kill_chain_phases
                                .iter()
                                .map(|phase| phase.phase_name.clone())
                                .collect(),
                        ));
                    }

                    attack_ids.insert(raw_object.id.clone(), object.id.clone());
                    objects.push(object);
                }
                "relationship" => raw_relationships.push(raw_object),
                "x-mitre-matrix" => {
                    if matrix_refs.is_none() {
                        matrix_refs = Some(raw_object.tactic_refs);
                    }
                }
                _ => ignored += 1,
            }
        }

        let mut relationships: Vec<Relationship> = Vec::new();

        for (technique_id, phases) in technique_phases {
            for phase in phases {
                match tactic_shortnames.get(&phase) {
                    Some(tactic_id) => {
                        relationships.push(Relationship::uses(&technique_id, tactic_id))
                    }
                    None => log::debug!(
                        "Technique '{}' references unknown phase '{}'",
                        technique_id,
                        phase
                    ),
                }
            }
        }

        for raw_relationship in raw_relationships {
            match (
                attack_ids.get(&raw_relationship.source_ref),
                attack_ids.get(&raw_relationship.target_ref),
            ) {
                (Some(source_id), Some(target_id)) => relationships.push(Relationship {
                    source_id: source_id.clone(),
                    target_id: target_id.clone(),
                    relationship_type: raw_relationship.relationship_type.as_str().into(),
                }),
                _ => ignored += 1,
            }
        }

        for relationship in relationships.iter() {
            if relationship.relationship_type != RelationshipType::SubtechniqueOf {
                continue;
            }

            if let Some(object) = objects
                .iter_mut()
                .find(|object| object.id == relationship.source_id)
            {
                if object.parent_id.is_empty() {
                    object.parent_id = relationship.target_id.clone();
                    object.is_subtechnique = true;
                }
            }
        }

        let tactic_order: Vec<String> = matrix_refs
            .unwrap_or_default()
            .iter()
            .filter_map(|stix_id| attack_ids.get(stix_id).cloned())
            .collect();

        log::info!(
            "Parsed {} {} objects and {} relationships ({} ignored)",
            objects.len(),
            framework,
            relationships.len(),
            ignored
        );

        return Ok(Self::new(framework, objects, relationships).with_tactic_order(tactic_order));
    }
}

/// Sorted union of every technique's platforms.
pub fn list_available_platforms(bundle: &FrameworkBundle) -> Vec<String> {
    return bundle
        .objects()
        .filter(|object| object.is_technique())
        .flat_map(|object| object.platforms.iter().cloned())
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect();
}

#[derive(Deserialize)]
struct RawBundle {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    objects: Vec<serde_json::Value>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawExternalReference {
    source_name: String,
    external_id: String,
    url: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawKillChainPhase {
    phase_name: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawObject {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    name: String,
    description: String,
    revoked: bool,
    x_mitre_deprecated: bool,
    x_mitre_platforms: Vec<String>,
    x_mitre_shortname: String,
    x_mitre_is_subtechnique: bool,
    external_references: Vec<RawExternalReference>,
    kill_chain_phases: Vec<RawKillChainPhase>,
    relationship_type: String,
    source_ref: String,
    target_ref: String,
    tactic_refs: Vec<String>,
}

impl RawObject {
    fn attack_reference(&self) -> Option<&RawExternalReference> {
        return self
            .external_references
            .iter()
            .find(|reference| {
                ATTACK_SOURCE_NAMES
                    .iter()
                    .any(|source_name| *source_name == reference.source_name)
            })
            .or(self.external_references.first())
            .filter(|reference| !reference.external_id.is_empty());
    }

    fn to_framework_object(&self) -> Option<FrameworkObject> {
        let reference = self.attack_reference()?;
        let id = reference.external_id.trim().to_string();

        let object_type = match self.kind.as_str() {
            "x-mitre-tactic" => ObjectType::Tactic,
            _ => ObjectType::Technique,
        };

        let (is_subtechnique, parent_id) = match object_type {
            ObjectType::Tactic => (false, String::new()),
            ObjectType::Technique => {
                let parent_id = parent_technique_id(&id).unwrap_or_default().to_string();
                (self.x_mitre_is_subtechnique || !parent_id.is_empty(), parent_id)
            }
        };

        return Some(FrameworkObject {
            id,
            object_type,
            name: self.name.trim().to_string(),
            description: self.description.clone(),
            platforms: self.x_mitre_platforms.iter().cloned().collect(),
            reference_url: reference.url.clone(),
            is_subtechnique,
            parent_id,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakers::FakeHttpReqwest;

    const SAMPLE_BUNDLE: &'static str = include_str!("json/enterprise_sample.json");

    const PARSED_TACTICS: usize = 3;
    const PARSED_TECHNIQUES: usize = 10;

    #[test]
    fn test_parse_sample_bundle() -> Result<(), error::Error> {
        let bundle = FrameworkBundle::parse(Framework::ENTERPRISE, SAMPLE_BUNDLE)?;

        assert_eq!(bundle.objects().filter(|object| object.is_tactic()).count(), PARSED_TACTICS);
        assert_eq!(
            bundle.objects().filter(|object| object.is_technique()).count(),
            PARSED_TECHNIQUES
        );

        let phishing = bundle.get("T1566").expect("T1566 should be parsed");
        assert_eq!(phishing.name, "Phishing");
        assert_eq!(phishing.reference_url, "https://attack.mitre.org/techniques/T1566");
        assert!(!phishing.is_subtechnique);
        assert!(phishing.parent_id.is_empty());
        assert!(phishing.platforms.contains("macOS"));

        let attachment = bundle.get("T1566.001").expect("T1566.001 should be parsed");
        assert!(attachment.is_subtechnique);
        assert_eq!(attachment.parent_id, "T1566");

        Ok(())
    }

    #[test]
    fn test_skip_retired_and_unusable_objects() -> Result<(), error::Error> {
        let bundle = FrameworkBundle::parse(Framework::ENTERPRISE, SAMPLE_BUNDLE)?;

        assert!(bundle.get("T1200").is_none(), "revoked technique should be skipped");
        assert!(bundle.get("T1546").is_none(), "deprecated technique should be skipped");
        assert!(bundle.get("G0007").is_none(), "intrusion sets are not framework objects");
        assert!(bundle
            .objects()
            .all(|object| object.name != "Technique Without References"));

        Ok(())
    }

    #[test]
    fn test_kill_chain_phases_become_uses_edges() -> Result<(), error::Error> {
        let bundle = FrameworkBundle::parse(Framework::ENTERPRISE, SAMPLE_BUNDLE)?;

        let scheduled_task_tactics: Vec<&str> = bundle
            .relationships()
            .iter()
            .filter(|edge| {
                edge.source_id == "T1053" && edge.relationship_type == RelationshipType::Uses
            })
            .map(|edge| edge.target_id.as_str())
            .collect();

        assert_eq!(scheduled_task_tactics, vec!["TA0002", "TA0003"]);
        assert!(bundle
            .relationships()
            .iter()
            .all(|edge| edge.source_id != "T1999"));

        Ok(())
    }

    #[test]
    fn test_explicit_relationships_use_attack_ids() -> Result<(), error::Error> {
        let bundle = FrameworkBundle::parse(Framework::ENTERPRISE, SAMPLE_BUNDLE)?;

        assert!(bundle.relationships().contains(&Relationship {
            source_id: String::from("T1566.001"),
            target_id: String::from("T1566"),
            relationship_type: RelationshipType::SubtechniqueOf,
        }));
        assert!(
            bundle
                .relationships()
                .iter()
                .all(|edge| !edge.source_id.starts_with("intrusion-set")),
            "edges from unknown objects should be dropped"
        );

        Ok(())
    }

    #[test]
    fn test_matrix_declares_tactic_order() -> Result<(), error::Error> {
        let bundle = FrameworkBundle::parse(Framework::ENTERPRISE, SAMPLE_BUNDLE)?;

        assert_eq!(bundle.tactic_order(), &["TA0001", "TA0002", "TA0003"]);

        Ok(())
    }

    #[test]
    fn test_parent_from_subtechnique_relationship() -> Result<(), error::Error> {
        let raw = r#"{
            "type": "bundle",
            "objects": [
                {
                    "type": "attack-pattern",
                    "id": "attack-pattern--parent",
                    "name": "Exploitation",
                    "x_mitre_platforms": ["Android"],
                    "external_references": [{"source_name": "mitre-mobile-attack", "external_id": "T1404"}]
                },
                {
                    "type": "attack-pattern",
                    "id": "attack-pattern--child",
                    "name": "Kernel Exploitation",
                    "x_mitre_platforms": ["Android"],
                    "external_references": [{"source_name": "mitre-mobile-attack", "external_id": "T1404-K"}]
                },
                {
                    "type": "relationship",
                    "relationship_type": "subtechnique-of",
                    "source_ref": "attack-pattern--child",
                    "target_ref": "attack-pattern--parent"
                }
            ]
        }"#;

        let bundle = FrameworkBundle::parse(Framework::MOBILE, raw)?;
        let child = bundle.get("T1404-K").expect("child technique should be parsed");

        assert!(child.is_subtechnique);
        assert_eq!(child.parent_id, "T1404");

        Ok(())
    }

    #[test]
    fn test_missing_optional_fields_default_to_empty() -> Result<(), error::Error> {
        let raw = r#"{"objects": [
            {"type": "x-mitre-tactic", "external_references": [{"external_id": "TA0100"}]}
        ]}"#;

        let bundle = FrameworkBundle::parse(Framework::ICS, raw)?;
        let tactic = bundle.get("TA0100").expect("tactic should be parsed");

        assert!(tactic.name.is_empty());
        assert!(tactic.reference_url.is_empty());
        assert!(tactic.platforms.is_empty());
        assert!(bundle.relationships().is_empty());

        Ok(())
    }

    #[test]
    fn test_reject_unrecognizable_bundles() {
        for raw in [
            "[1, 2, 3]",
            r#"{"type": "bundle"}"#,
            r#"{"type": "x-mitre-collection", "objects": []}"#,
            "<html>rate limited</html>",
        ] {
            let error = FrameworkBundle::parse(Framework::ENTERPRISE, raw).unwrap_err();

            assert!(
                matches!(error, error::Error::Parser(_)),
                "'{}' should fail to parse",
                raw
            );
        }
    }

    #[test]
    fn test_parse_is_idempotent() -> Result<(), error::Error> {
        let first = FrameworkBundle::parse(Framework::ENTERPRISE, SAMPLE_BUNDLE)?;
        let second = FrameworkBundle::parse(Framework::ENTERPRISE, SAMPLE_BUNDLE)?;

        assert_eq!(first, second);

        Ok(())
    }

    #[test]
    fn test_duplicate_ids_keep_first_declaration() {
        let bundle = FrameworkBundle::new(
            Framework::ENTERPRISE,
            vec![
                FrameworkObject::technique("T1566", "Phishing", &["Windows"]),
                FrameworkObject::technique("T1566", "Phishing (copy)", &["Linux"]),
            ],
            Vec::new(),
        );

        assert_eq!(bundle.len(), 1);
        assert_eq!(bundle.get("T1566").map(|object| object.name.as_str()), Some("Phishing"));
    }

    #[test]
    fn test_list_available_platforms() -> Result<(), error::Error> {
        let bundle = FrameworkBundle::parse(Framework::ENTERPRISE, SAMPLE_BUNDLE)?;

        assert_eq!(
            list_available_platforms(&bundle),
            vec!["Linux", "Office 365", "Windows", "macOS"]
        );

        Ok(())
    }

    #[test]
    fn test_fetch_bundle() -> Result<(), error::Error> {
        let fake_reqwest = FakeHttpReqwest::default().set_success_response(SAMPLE_BUNDLE.to_string());

        let bundle = FrameworkBundle::fetch(Framework::ENTERPRISE, &fake_reqwest)?;

        assert_eq!(bundle.framework(), Framework::ENTERPRISE);
        assert_eq!(bundle.len(), PARSED_TACTICS + PARSED_TECHNIQUES);
        assert_eq!(fake_reqwest.calls(), 1);

        Ok(())
    }

    #[test]
    fn test_dont_panic_on_request_error() {
        let fake_reqwest = FakeHttpReqwest::default()
            .set_error_response(error::Error::DataUnavailable(format!("Reqwest error")));

        let error = FrameworkBundle::fetch(Framework::MOBILE, &fake_reqwest).unwrap_err();

        assert!(matches!(error, error::Error::DataUnavailable(_)));
    }

    #[test]
    fn test_missing_local_file_is_unavailable() {
        let error = FrameworkBundle::from_file(
            Framework::ICS,
            Path::new("/nonexistent/mitre_matrix/ics-attack.json"),
        )
        .unwrap_err();

        assert!(matches!(error, error::Error::DataUnavailable(_)));
    }

    #[test]
    fn test_cached_source_fetches_once() -> Result<(), error::Error> {
        let cache_dir = tempfile::tempdir()?;
        let source = DataSource::Cached {
            dir: cache_dir.path().join("attack"),
            refresh: false,
        };

        let online = FakeHttpReqwest::default().set_success_response(SAMPLE_BUNDLE.to_string());
        let fetched = FrameworkBundle::load(Framework::ENTERPRISE, &source, &online)?;

        assert_eq!(online.calls(), 1);
        assert!(cache_dir.path().join("attack").join("enterprise.json").exists());

        let offline = FakeHttpReqwest::default()
            .set_error_response(error::Error::DataUnavailable(format!("offline")));
        let cached = FrameworkBundle::load(Framework::ENTERPRISE, &source, &offline)?;

        assert_eq!(offline.calls(), 0);
        assert_eq!(fetched, cached);

        Ok(())
    }

    #[test]
    fn test_corrupt_cache_is_refetched() -> Result<(), error::Error> {
        let cache_dir = tempfile::tempdir()?;
        let cache_file = cache_dir.path().join("enterprise.json");
        std::fs::write(&cache_file, &SAMPLE_BUNDLE[..SAMPLE_BUNDLE.len() / 2])?;

        let source = DataSource::Cached {
            dir: cache_dir.path().to_path_buf(),
            refresh: false,
        };
        let fake_reqwest = FakeHttpReqwest::default().set_success_response(SAMPLE_BUNDLE.to_string());

        let bundle = FrameworkBundle::load(Framework::ENTERPRISE, &source, &fake_reqwest)?;

        assert_eq!(fake_reqwest.calls(), 1);
        assert_eq!(bundle, FrameworkBundle::parse(Framework::ENTERPRISE, SAMPLE_BUNDLE)?);
        assert_eq!(std::fs::read_to_string(&cache_file)?, SAMPLE_BUNDLE);

        Ok(())
    }

    #[test]
    fn test_cached_source_refresh_refetches() -> Result<(), error::Error> {
        let cache_dir = tempfile::tempdir()?;
        std::fs::write(cache_dir.path().join("ics.json"), "not json")?;

        let source = DataSource::Cached {
            dir: cache_dir.path().to_path_buf(),
            refresh: true,
        };
        let fake_reqwest =
            FakeHttpReqwest::default().set_success_response(r#"{"objects": []}"#.to_string());

        let bundle = FrameworkBundle::load(Framework::ICS, &source, &fake_reqwest)?;

        assert_eq!(fake_reqwest.calls(), 1);
        assert!(bundle.is_empty());
        assert_eq!(
            std::fs::read_to_string(cache_dir.path().join("ics.json"))?,
            r#"{"objects": []}"#
        );

        Ok(())
    }
}
