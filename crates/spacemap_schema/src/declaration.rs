//! Declared structure of entity and repository classes.
//!
//! Every class describes itself explicitly: an entity lists its properties with
//! their documented types, a repository lists its default indexes. Rust types
//! can implement [`Declare`]; external tools can ship a JSON
//! [`DeclarationManifest`].

use serde::{Deserialize, Serialize};
use spacemap_store::IndexDescriptor;

use crate::error::{Result, SchemaError};

/// Which base contract a class fulfils.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    /// Source of a space's properties
    Entity,
    /// Source of a space's indexes
    Repository,
}

impl ClassKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassKind::Entity => "entity",
            ClassKind::Repository => "repository",
        }
    }

    /// Short name of the abstract base class itself.
    pub fn base_contract(&self) -> &'static str {
        match self {
            ClassKind::Entity => "Entity",
            ClassKind::Repository => "Repository",
        }
    }

    /// Parse a manifest kind tag.
    pub fn parse(class: &str, tag: &str) -> Result<Self> {
        match tag {
            "entity" => Ok(ClassKind::Entity),
            "repository" => Ok(ClassKind::Repository),
            other => Err(SchemaError::invalid_registration(
                class,
                format!("kind {:?} is neither entity nor repository", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

/// A field of an entity class with its documented type(s).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredProperty {
    pub name: String,
    #[serde(default)]
    pub visibility: Visibility,
    /// Documented types; exactly one is required for public fields
    #[serde(default)]
    pub types: Vec<String>,
}

impl DeclaredProperty {
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }
}

/// One entry of a repository's default index list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexDeclaration {
    /// `"slug"`
    Field(String),
    /// `["author", "month"]`
    Fields(Vec<String>),
    /// `{"fields": [...], "unique": false}`
    Detailed {
        fields: Vec<String>,
        #[serde(default)]
        unique: Option<bool>,
        #[serde(default)]
        name: Option<String>,
    },
}

impl IndexDeclaration {
    pub fn fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        IndexDeclaration::Fields(fields.into_iter().map(Into::into).collect())
    }

    pub fn non_unique<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        IndexDeclaration::Detailed {
            fields: fields.into_iter().map(Into::into).collect(),
            unique: Some(false),
            name: None,
        }
    }

    /// Normalized store descriptor, always marked `if_not_exists`.
    pub fn to_descriptor(&self) -> IndexDescriptor {
        let descriptor = match self {
            IndexDeclaration::Field(field) => IndexDescriptor::new([field.as_str()]),
            IndexDeclaration::Fields(fields) => IndexDescriptor::new(fields.iter().cloned()),
            IndexDeclaration::Detailed {
                fields,
                unique,
                name,
            } => {
                let mut descriptor =
                    IndexDescriptor::new(fields.iter().cloned()).with_unique(unique.unwrap_or(true));
                descriptor.name = name.clone();
                descriptor
            }
        };
        descriptor.if_not_exists()
    }
}

impl From<&str> for IndexDeclaration {
    fn from(field: &str) -> Self {
        IndexDeclaration::Field(field.to_string())
    }
}

impl From<Vec<&str>> for IndexDeclaration {
    fn from(fields: Vec<&str>) -> Self {
        IndexDeclaration::fields(fields)
    }
}

/// A class registered with the mapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDeclaration {
    /// Class name, optionally namespaced (`App\Entity\Person`, `app::Person`)
    pub name: String,
    pub kind: ClassKind,
    /// Abstract base marker; never registrable
    pub is_abstract: bool,
    pub properties: Vec<DeclaredProperty>,
    /// Default index list; `None` when the repository declares none
    pub indexes: Option<Vec<IndexDeclaration>>,
}

impl ClassDeclaration {
    fn with_kind(name: impl Into<String>, kind: ClassKind) -> Self {
        Self {
            name: name.into(),
            kind,
            is_abstract: false,
            properties: Vec::new(),
            indexes: None,
        }
    }

    pub fn entity(name: impl Into<String>) -> Self {
        Self::with_kind(name, ClassKind::Entity)
    }

    pub fn repository(name: impl Into<String>) -> Self {
        Self::with_kind(name, ClassKind::Repository)
    }

    /// The abstract base class of a kind.
    pub fn base(kind: ClassKind) -> Self {
        let mut decl = Self::with_kind(kind.base_contract(), kind);
        decl.is_abstract = true;
        decl
    }

    /// Public property with a single documented type.
    pub fn property(self, name: impl Into<String>, doc_type: impl Into<String>) -> Self {
        self.typed_property(name, Visibility::Public, vec![doc_type.into()])
    }

    /// Public property without documentation.
    pub fn untyped_property(self, name: impl Into<String>) -> Self {
        self.typed_property(name, Visibility::Public, Vec::new())
    }

    pub fn typed_property(
        mut self,
        name: impl Into<String>,
        visibility: Visibility,
        types: Vec<String>,
    ) -> Self {
        self.properties.push(DeclaredProperty {
            name: name.into(),
            visibility,
            types,
        });
        self
    }

    pub fn index(mut self, index: impl Into<IndexDeclaration>) -> Self {
        self.indexes.get_or_insert_with(Vec::new).push(index.into());
        self
    }

    /// Name without namespace.
    pub fn short_name(&self) -> &str {
        let tail = self.name.rsplit('\\').next().unwrap_or(&self.name);
        tail.rsplit("::").next().unwrap_or(tail)
    }
}

/// A Rust type that describes its own declaration.
pub trait Declare {
    fn declaration() -> ClassDeclaration;
}

// ============================================================================
// JSON manifest
// ============================================================================

/// Declarations loaded from JSON.
///
/// ```json
/// {"classes": [
///   {"kind": "entity", "name": "Person",
///    "properties": [{"name": "id", "types": ["int"]}]},
///   {"kind": "repository", "name": "PersonRepository", "indexes": [["name"]]}
/// ]}
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeclarationManifest {
    #[serde(default)]
    pub classes: Vec<ManifestClass>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestClass {
    pub kind: String,
    pub name: String,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default)]
    pub properties: Vec<DeclaredProperty>,
    #[serde(default)]
    pub indexes: Option<Vec<IndexDeclaration>>,
}

impl TryFrom<ManifestClass> for ClassDeclaration {
    type Error = SchemaError;

    fn try_from(class: ManifestClass) -> Result<Self> {
        let kind = ClassKind::parse(&class.name, &class.kind)?;
        Ok(ClassDeclaration {
            name: class.name,
            kind,
            is_abstract: class.is_abstract,
            properties: class.properties,
            indexes: class.indexes,
        })
    }
}

impl DeclarationManifest {
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn into_declarations(self) -> Result<Vec<ClassDeclaration>> {
        self.classes.into_iter().map(ClassDeclaration::try_from).collect()
    }
}
