//! `orderfix.snapshot.v1`: the host's parsed view of one source file.
//!
//! Members are listed in current sibling order. Declaration ids are not part of the wire format;
//! they are assigned in listing order when a snapshot is loaded.

use crate::container::{BaseType, Container, ContainerKind};
use crate::decor::Decoration;
use crate::model::{Accessibility, DeclKind, Declaration, Location, SymbolInfo};
use crate::snapshot::Snapshot;
use crate::wire::WireError;
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotV1 {
    pub schema: String,
    pub path: Utf8PathBuf,

    #[serde(default)]
    pub containers: Vec<ContainerV1>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerV1 {
    pub name: String,

    #[serde(default)]
    pub kind: ContainerKind,

    #[serde(default)]
    pub line: u32,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub base_list: Vec<BaseType>,

    #[serde(default)]
    pub members: Vec<MemberV1>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberV1 {
    pub name: String,

    #[serde(flatten)]
    pub kind: DeclKind,

    #[serde(default)]
    pub accessibility: Accessibility,

    #[serde(default)]
    pub is_static: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,

    #[serde(default, skip_serializing_if = "is_default_symbol")]
    pub symbol: SymbolInfo,

    /// Declaring file when it differs from the snapshot path (partial types).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<Utf8PathBuf>,

    #[serde(default)]
    pub line: u32,

    #[serde(default)]
    pub decor: Decoration,
}

fn is_default_symbol(symbol: &SymbolInfo) -> bool {
    *symbol == SymbolInfo::default()
}

impl TryFrom<SnapshotV1> for Snapshot {
    type Error = WireError;

    fn try_from(wire: SnapshotV1) -> Result<Self, Self::Error> {
        if wire.schema != crate::schema::ORDERFIX_SNAPSHOT_V1 {
            return Err(WireError::UnsupportedSchema { found: wire.schema });
        }

        let path = wire.path;
        let containers = wire
            .containers
            .into_iter()
            .map(|c| container_from_wire(&path, c))
            .collect();
        Ok(Snapshot { path, containers })
    }
}

fn container_from_wire(path: &Utf8PathBuf, wire: ContainerV1) -> Container {
    let mut container = Container::new(
        wire.name,
        wire.kind,
        Location {
            file: path.clone(),
            line: wire.line,
        },
    );
    container.attributes = wire.attributes;
    container.base_list = wire.base_list;

    for m in wire.members {
        let decl = Declaration {
            name: m.name,
            kind: m.kind,
            accessibility: m.accessibility,
            is_static: m.is_static,
            attributes: m.attributes,
            symbol: m.symbol,
            location: Location {
                file: m.file.unwrap_or_else(|| path.clone()),
                line: m.line,
            },
        };
        container.push(decl, m.decor);
    }
    container
}

impl From<&Snapshot> for SnapshotV1 {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            schema: crate::schema::ORDERFIX_SNAPSHOT_V1.to_string(),
            path: snapshot.path.clone(),
            containers: snapshot
                .containers
                .iter()
                .map(|c| container_to_wire(&snapshot.path, c))
                .collect(),
        }
    }
}

fn container_to_wire(path: &Utf8PathBuf, container: &Container) -> ContainerV1 {
    let members = container
        .siblings()
        .iter()
        .filter_map(|s| container.decl(s.id).map(|d| (d, &s.decor)))
        .map(|(d, decor)| MemberV1 {
            name: d.name.clone(),
            kind: d.kind.clone(),
            accessibility: d.accessibility,
            is_static: d.is_static,
            attributes: d.attributes.clone(),
            symbol: d.symbol.clone(),
            file: (d.location.file != *path).then(|| d.location.file.clone()),
            line: d.location.line,
            decor: decor.clone(),
        })
        .collect();

    ContainerV1 {
        name: container.name.clone(),
        kind: container.kind,
        line: container.location.line,
        attributes: container.attributes.clone(),
        base_list: container.base_list.clone(),
        members,
    }
}
