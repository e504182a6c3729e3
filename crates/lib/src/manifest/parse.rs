use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use tracing::{info, warn};

use crate::config::ReportConfig;
use crate::consts::DELETE_POLICY_VALUE;
use crate::ident::{item_file_name, normalize_id};

use super::{DeclaredEntry, DeployManifest, ManifestError};

const ROOT_ELEMENT: &str = "DeployedItems";
const ENTRY_ELEMENT: &str = "DeployedItem";

const ATTR_DELETE_POLICY: &str = "RecursiveDeployAction";
const ATTR_ID: &str = "Id";
const ATTR_NAME: &str = "Name";
const ATTR_PARENT: &str = "Parent";
const ATTR_PARTITION: &str = "Database";
const ATTR_KEEP_CHILDREN: &str = "KeepChildrenInSync";

/// Read and parse the extracted manifest file.
pub fn load_manifest(path: &Path, config: &ReportConfig) -> Result<DeployManifest, ManifestError> {
  let content = fs::read_to_string(path).map_err(|source| ManifestError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  parse_manifest(&content, config)
}

/// Parse a manifest document.
///
/// Entries for partitions outside `config.partitions` are skipped, as are
/// repeated declarations of an identifier within one partition.
pub fn parse_manifest(xml: &str, config: &ReportConfig) -> Result<DeployManifest, ManifestError> {
  let xml = xml.trim_start_matches('\u{feff}');
  let mut reader = Reader::from_str(xml);

  let mut manifest = DeployManifest::default();
  let mut root_seen = false;
  let mut depth = 0usize;
  let mut ordinal = 0usize;
  let mut declared: HashSet<(String, String)> = HashSet::new();

  loop {
    let event = match reader.read_event() {
      Ok(event) => event,
      Err(e) => {
        return Err(ManifestError::Xml {
          position: reader.buffer_position() as u64,
          message: e.to_string(),
        });
      }
    };
    let position = reader.buffer_position() as u64;

    let (element, opens) = match event {
      Event::Start(e) => (e, true),
      Event::Empty(e) => (e, false),
      Event::End(_) => {
        depth = depth.saturating_sub(1);
        continue;
      }
      Event::Eof => break,
      _ => continue,
    };

    match depth {
      0 if !root_seen => {
        root_seen = true;
        let name = element_name(&element);
        if name != ROOT_ELEMENT {
          return Err(ManifestError::UnexpectedRoot(name));
        }
        let attrs = attributes(&element, position)?;
        manifest.can_delete_items = attrs.get(ATTR_DELETE_POLICY).map(String::as_str) == Some(DELETE_POLICY_VALUE);
      }
      1 if element.name().as_ref() == ENTRY_ELEMENT.as_bytes() => {
        ordinal += 1;
        let attrs = attributes(&element, position)?;
        let entry = declared_entry(&attrs, ordinal, config)?;

        if !config.is_partition(&entry.partition) {
          warn!(id = %entry.id, partition = %entry.partition, "skipping entry for unknown partition");
        } else if !declared.insert((entry.partition.clone(), entry.normalized_id())) {
          warn!(id = %entry.id, partition = %entry.partition, "skipping repeated declaration");
        } else {
          manifest.entries.push(entry);
        }
      }
      _ => {}
    }

    if opens {
      depth += 1;
    }
  }

  if !root_seen {
    return Err(ManifestError::Blank);
  }
  if depth != 0 {
    return Err(ManifestError::Xml {
      position: reader.buffer_position() as u64,
      message: "document ends inside an open element".to_string(),
    });
  }

  info!(
    can_delete_items = manifest.can_delete_items,
    entries = manifest.entries.len(),
    "parsed manifest"
  );
  Ok(manifest)
}

fn element_name(element: &BytesStart<'_>) -> String {
  String::from_utf8_lossy(element.name().as_ref()).into_owned()
}

fn attributes(element: &BytesStart<'_>, position: u64) -> Result<HashMap<String, String>, ManifestError> {
  let xml_err = |message: String| ManifestError::Xml { position, message };
  let mut attrs = HashMap::new();
  for attr in element.attributes() {
    let attr = attr.map_err(|e| xml_err(e.to_string()))?;
    let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
    let value = attr.unescape_value().map_err(|e| xml_err(e.to_string()))?.into_owned();
    attrs.insert(key, value);
  }
  Ok(attrs)
}

fn declared_entry(
  attrs: &HashMap<String, String>,
  ordinal: usize,
  config: &ReportConfig,
) -> Result<DeclaredEntry, ManifestError> {
  let required = |attribute: &'static str| -> Result<String, ManifestError> {
    attrs
      .get(attribute)
      .map(|v| v.trim())
      .filter(|v| !v.is_empty())
      .map(str::to_string)
      .ok_or(ManifestError::MissingAttribute { ordinal, attribute })
  };

  let id = required(ATTR_ID)?;
  if normalize_id(&id).is_empty() {
    return Err(ManifestError::MissingAttribute {
      ordinal,
      attribute: ATTR_ID,
    });
  }
  let name = required(ATTR_NAME)?;
  let partition = required(ATTR_PARTITION)?;
  let parent_id = attrs
    .get(ATTR_PARENT)
    .map(|v| v.trim())
    .filter(|v| !v.is_empty())
    .map(str::to_string);
  let can_delete_children = attrs.get(ATTR_KEEP_CHILDREN).map(String::as_str) == Some("true");
  let item_file = item_file_name(&name, &id, &config.item_suffix);

  Ok(DeclaredEntry {
    id,
    name,
    parent_id,
    partition,
    can_delete_children,
    item_file,
  })
}
