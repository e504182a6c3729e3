//! Collision classification for items that already exist in the live store.
//!
//! An item definition may carry a `CollisionBehavior` element whose
//! `Overwrite` attribute is `false`, meaning the installer leaves an existing
//! item untouched ("deploy once"). Anything else means the item is updated.
//!
//! There is no safe default when the definition cannot be read, so every
//! failure here aborts the run.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use thiserror::Error;
use tracing::debug;

use crate::manifest::DeclaredEntry;

const COLLISION_ELEMENT: &str = "collisionbehavior";
const OVERWRITE_ATTRIBUTE: &str = "overwrite";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionBehavior {
  /// The live item is replaced by the packaged one.
  Overwrite,
  /// The live item is left as it is.
  Skip,
}

#[derive(Debug, Error)]
pub enum CollisionError {
  #[error("cannot read item definition {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("malformed item definition {path}: {message}")]
  Malformed { path: PathBuf, message: String },
}

/// Classify a declared entry whose item already exists live.
pub fn classify_collision(items_dir: &Path, entry: &DeclaredEntry) -> Result<CollisionBehavior, CollisionError> {
  let path = items_dir.join(&entry.item_file);
  if !is_plain_file_name(&entry.item_file) {
    return Err(CollisionError::Malformed {
      path,
      message: format!("item name '{}' does not resolve inside the partition directory", entry.name),
    });
  }
  let behavior = read_collision_behavior(&path)?;
  debug!(id = %entry.id, file = %entry.item_file, ?behavior, "classified collision");
  Ok(behavior)
}

/// Extracted definitions are flattened, so their names never carry a separator
/// or a relative component.
fn is_plain_file_name(name: &str) -> bool {
  if name.contains(['/', '\\']) {
    return false;
  }
  let mut components = Path::new(name).components();
  matches!(
    (components.next(), components.next()),
    (Some(Component::Normal(_)), None)
  )
}

/// Read the collision behavior from an item definition file.
pub fn read_collision_behavior(path: &Path) -> Result<CollisionBehavior, CollisionError> {
  let content = fs::read_to_string(path).map_err(|source| CollisionError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  parse_collision_behavior(&content).map_err(|message| CollisionError::Malformed {
    path: path.to_path_buf(),
    message,
  })
}

/// The whole document is read so that a truncated or corrupt definition is
/// rejected even when the flag appears before the damage.
fn parse_collision_behavior(xml: &str) -> Result<CollisionBehavior, String> {
  let mut reader = Reader::from_str(xml.trim_start_matches('\u{feff}'));
  let mut behavior = None;
  let mut saw_element = false;
  let mut depth = 0usize;

  loop {
    let (element, opens) = match reader.read_event().map_err(|e| e.to_string())? {
      Event::Start(e) => (e, true),
      Event::Empty(e) => (e, false),
      Event::End(_) => {
        depth = depth.saturating_sub(1);
        continue;
      }
      Event::Eof => break,
      _ => continue,
    };

    saw_element = true;
    if behavior.is_none() && element.name().as_ref().eq_ignore_ascii_case(COLLISION_ELEMENT.as_bytes()) {
      behavior = Some(overwrite_flag(&element)?);
    }
    if opens {
      depth += 1;
    }
  }

  if !saw_element {
    return Err("document has no elements".to_string());
  }
  if depth != 0 {
    return Err("document ends inside an open element".to_string());
  }
  Ok(behavior.unwrap_or(CollisionBehavior::Overwrite))
}

fn overwrite_flag(element: &BytesStart<'_>) -> Result<CollisionBehavior, String> {
  for attr in element.attributes() {
    let attr = attr.map_err(|e| e.to_string())?;
    if attr.key.as_ref().eq_ignore_ascii_case(OVERWRITE_ATTRIBUTE.as_bytes()) {
      let value = attr.unescape_value().map_err(|e| e.to_string())?;
      if value.trim().eq_ignore_ascii_case("false") {
        return Ok(CollisionBehavior::Skip);
      }
      return Ok(CollisionBehavior::Overwrite);
    }
  }
  Ok(CollisionBehavior::Overwrite)
}
