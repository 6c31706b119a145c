use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum Dimension {
    Pixels(i32),
    Text(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SizeHint {
    width: Dimension,
    height: Dimension,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PositionHint {
    x: i32,
    y: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogEntry {
    id: String,
    display_name: String,
    #[serde(default)]
    icon_id: String,
    default_size: SizeHint,
    #[serde(default)]
    default_position: Option<PositionHint>,
    #[serde(default)]
    open_on_startup: bool,
    #[serde(default)]
    singleton: bool,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    schema_version: u32,
    apps: Vec<CatalogEntry>,
}

fn is_identifier(raw: &str) -> bool {
    let mut chars = raw.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn main() {
    let crate_root = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").expect("manifest dir"));
    let path = crate_root.join("app_catalog.toml");
    println!("cargo:rerun-if-changed={}", path.display());

    let raw = fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("failed to read {}: {err}", path.display()));
    let catalog: CatalogFile = toml::from_str(&raw)
        .unwrap_or_else(|err| panic!("failed to parse {}: {err}", path.display()));
    if catalog.schema_version != 1 {
        panic!(
            "catalog schema mismatch in {}: expected 1 found {}",
            path.display(),
            catalog.schema_version
        );
    }

    let mut seen = BTreeSet::new();
    for entry in &catalog.apps {
        if !is_identifier(&entry.id) || entry.id.len() > 64 {
            panic!("invalid app id `{}` in {}", entry.id, path.display());
        }
        if !seen.insert(entry.id.as_str()) {
            panic!("duplicate app id `{}` in {}", entry.id, path.display());
        }
    }

    let json = serde_json::to_string_pretty(&catalog.apps).expect("serialize app catalog");
    let generated = format!(
        "/// Build-time generated app catalog JSON, in manifest order.\n\
pub const APP_CATALOG_JSON: &str = r##\"{}\"##;\n",
        json
    );

    let out_dir = PathBuf::from(std::env::var("OUT_DIR").expect("OUT_DIR"));
    let out_file = out_dir.join("app_catalog_generated.rs");
    fs::write(&out_file, generated)
        .unwrap_or_else(|err| panic!("failed to write {}: {err}", out_file.display()));
}
