//! Declarations as supplied by the host's source model.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Declared accessibility, ordered from most to least visible.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    Public,
    ProtectedInternal,
    Internal,
    Protected,
    PrivateProtected,
    #[default]
    Private,
}

impl Accessibility {
    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Accessibility::Public => "public",
            Accessibility::ProtectedInternal => "protected internal",
            Accessibility::Internal => "internal",
            Accessibility::Protected => "protected",
            Accessibility::PrivateProtected => "private protected",
            Accessibility::Private => "private",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    #[serde(default)]
    pub name: String,
    pub type_name: String,

    /// Variadic tail (`params T[]`).
    #[serde(default, skip_serializing_if = "is_false")]
    pub variadic: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Kind-specific payload of a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeclKind {
    Method {
        #[serde(default)]
        params: Vec<Param>,
    },
    Constructor {
        #[serde(default)]
        params: Vec<Param>,
    },
    Finalizer,
    Operator {
        token: String,
        #[serde(default)]
        params: Vec<Param>,
    },
    Field {
        #[serde(default)]
        type_name: String,
        #[serde(default)]
        is_const: bool,
        #[serde(default)]
        is_readonly: bool,
    },
    Property {
        #[serde(default)]
        type_name: String,
    },
    Indexer {
        #[serde(default)]
        params: Vec<Param>,
    },
    Event,
    NestedType {
        #[serde(default)]
        type_kind: String,
    },
}

impl DeclKind {
    pub fn label(&self) -> &'static str {
        match self {
            DeclKind::Method { .. } => "method",
            DeclKind::Constructor { .. } => "constructor",
            DeclKind::Finalizer => "finalizer",
            DeclKind::Operator { .. } => "operator",
            DeclKind::Field { .. } => "field",
            DeclKind::Property { .. } => "property",
            DeclKind::Indexer { .. } => "indexer",
            DeclKind::Event => "event",
            DeclKind::NestedType { .. } => "nested_type",
        }
    }
}

/// Resolution of the declaration's defining symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInfo {
    #[serde(default)]
    pub is_override: bool,

    /// Interface named by an explicit implementation (`IDisposable.Dispose`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explicit_interface: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub file: Utf8PathBuf,
    pub line: u32,
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// One member of a container's sibling list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub kind: DeclKind,
    pub accessibility: Accessibility,
    pub is_static: bool,
    pub attributes: Vec<String>,
    pub symbol: SymbolInfo,
    pub location: Location,
}

impl Declaration {
    pub fn new(name: impl Into<String>, kind: DeclKind) -> Self {
        Self {
            name: name.into(),
            kind,
            accessibility: Accessibility::default(),
            is_static: false,
            attributes: Vec::new(),
            symbol: SymbolInfo::default(),
            location: Location::default(),
        }
    }

    pub fn with_accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attributes.push(attribute.into());
        self
    }

    pub fn with_location(mut self, file: impl Into<Utf8PathBuf>, line: u32) -> Self {
        self.location = Location {
            file: file.into(),
            line,
        };
        self
    }

    pub fn with_symbol(mut self, symbol: SymbolInfo) -> Self {
        self.symbol = symbol;
        self
    }

    /// Parameter list for callable kinds; empty otherwise.
    pub fn params(&self) -> &[Param] {
        match &self.kind {
            DeclKind::Method { params }
            | DeclKind::Constructor { params }
            | DeclKind::Operator { params, .. }
            | DeclKind::Indexer { params } => params,
            DeclKind::Finalizer
            | DeclKind::Field { .. }
            | DeclKind::Property { .. }
            | DeclKind::Event
            | DeclKind::NestedType { .. } => &[],
        }
    }

    pub fn is_variadic(&self) -> bool {
        self.params().last().is_some_and(|p| p.variadic)
    }

    pub fn is_method(&self) -> bool {
        matches!(self.kind, DeclKind::Method { .. })
    }

    pub fn is_constructor(&self) -> bool {
        matches!(self.kind, DeclKind::Constructor { .. })
    }

    /// Method named `name` that takes no parameters.
    pub fn is_parameterless_method(&self, name: &str) -> bool {
        self.is_method() && self.name == name && self.params().is_empty()
    }

    /// Attribute names without namespace qualification or the `Attribute` suffix.
    pub fn normalized_attributes(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|a| normalize_attribute(a))
    }

    /// Human-readable signature used in diagnostics and expected-order listings.
    pub fn signature(&self) -> String {
        let name = match &self.symbol.explicit_interface {
            Some(iface) => format!("{}.{}", iface, self.name),
            None => self.name.clone(),
        };
        match &self.kind {
            DeclKind::Method { params }
            | DeclKind::Constructor { params }
            | DeclKind::Indexer { params } => format!("{}({})", name, render_params(params)),
            DeclKind::Operator { token, params } => {
                format!("operator {}({})", token, render_params(params))
            }
            DeclKind::Finalizer => format!("~{}()", self.name),
            DeclKind::Field { .. }
            | DeclKind::Property { .. }
            | DeclKind::Event
            | DeclKind::NestedType { .. } => name,
        }
    }
}

fn render_params(params: &[Param]) -> String {
    params
        .iter()
        .map(|p| {
            if p.variadic {
                format!("params {}", p.type_name)
            } else {
                p.type_name.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Strip namespace qualification and the conventional `Attribute` suffix.
pub fn normalize_attribute(raw: &str) -> &str {
    let raw = raw.trim();
    let raw = raw.split('(').next().unwrap_or(raw);
    let simple = raw.rsplit('.').next().unwrap_or(raw);
    match simple.strip_suffix("Attribute") {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => simple,
    }
}
