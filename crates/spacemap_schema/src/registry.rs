//! Registry of entity and repository classes and their canonical space names.

use tracing::{debug, info};

use crate::declaration::{ClassDeclaration, ClassKind, Declare};
use crate::error::{Result, SchemaError};
use crate::naming::NameCache;

/// Fallback consulted by [`ClassRegistry::validate_space`] for spaces no
/// registered class maps to.
pub trait SpaceValidator {
    fn validate_space(&self, space: &str) -> bool;
}

/// Base validator that knows no spaces.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSpaces;

impl SpaceValidator for NoSpaces {
    fn validate_space(&self, _space: &str) -> bool {
        false
    }
}

/// A registered class together with its canonical space name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredClass {
    pub declaration: ClassDeclaration,
    pub space: String,
}

/// Tracks registered classes in registration order.
pub struct ClassRegistry {
    entities: Vec<RegisteredClass>,
    repositories: Vec<RegisteredClass>,
    entity_postfix: Option<String>,
    repository_postfix: Option<String>,
    names: NameCache,
    base: Box<dyn SpaceValidator>,
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassRegistry")
            .field("entities", &self.entities.len())
            .field("repositories", &self.repositories.len())
            .field("entity_postfix", &self.entity_postfix)
            .field("repository_postfix", &self.repository_postfix)
            .finish()
    }
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::with_validator(NoSpaces)
    }

    pub fn with_validator(base: impl SpaceValidator + 'static) -> Self {
        Self {
            entities: Vec::new(),
            repositories: Vec::new(),
            entity_postfix: None,
            repository_postfix: None,
            names: NameCache::new(),
            base: Box::new(base),
        }
    }

    /// Suffix stripped from entity class names (`PersonEntity` -> `person`).
    ///
    /// Space names of already registered entities are recomputed.
    pub fn set_entity_postfix(&mut self, postfix: Option<String>) -> Result<&mut Self> {
        self.entity_postfix = postfix.filter(|p| !p.is_empty());
        self.recompute(ClassKind::Entity)?;
        Ok(self)
    }

    /// Suffix stripped from repository class names.
    pub fn set_repository_postfix(&mut self, postfix: Option<String>) -> Result<&mut Self> {
        self.repository_postfix = postfix.filter(|p| !p.is_empty());
        self.recompute(ClassKind::Repository)?;
        Ok(self)
    }

    /// Register a class and return its canonical space name.
    ///
    /// Abstract base classes are rejected. Registering the same class twice
    /// is a no-op.
    pub fn register(&mut self, declaration: ClassDeclaration) -> Result<String> {
        let kind = declaration.kind;
        if declaration.is_abstract || declaration.name == kind.base_contract() {
            return Err(SchemaError::invalid_registration(
                &declaration.name,
                format!("{} is an abstract {} base", declaration.name, kind.as_str()),
            ));
        }

        if let Some(existing) = self
            .classes(kind)
            .iter()
            .find(|c| c.declaration.name == declaration.name)
        {
            debug!(class = %declaration.name, "Class already registered");
            return Ok(existing.space.clone());
        }

        let space = self.space_name_for(&declaration)?;
        info!(class = %declaration.name, kind = kind.as_str(), space = %space, "Registered class");

        self.classes_mut(kind).push(RegisteredClass {
            declaration,
            space: space.clone(),
        });
        Ok(space)
    }

    /// Register a type that describes itself.
    pub fn register_type<T: Declare>(&mut self) -> Result<String> {
        self.register(T::declaration())
    }

    /// True if a registered class maps to `space`, else asks the base validator.
    pub fn validate_space(&self, space: &str) -> bool {
        self.entities
            .iter()
            .chain(self.repositories.iter())
            .any(|c| c.space == space)
            || self.base.validate_space(space)
    }

    pub fn entities(&self) -> &[RegisteredClass] {
        &self.entities
    }

    pub fn repositories(&self) -> &[RegisteredClass] {
        &self.repositories
    }

    pub fn space_name(&self, kind: ClassKind, class: &str) -> Option<&str> {
        self.classes(kind)
            .iter()
            .find(|c| c.declaration.name == class)
            .map(|c| c.space.as_str())
    }

    pub fn entity_for_space(&self, space: &str) -> Option<&ClassDeclaration> {
        Self::find_by_space(&self.entities, space)
    }

    pub fn repository_for_space(&self, space: &str) -> Option<&ClassDeclaration> {
        Self::find_by_space(&self.repositories, space)
    }

    fn find_by_space<'a>(classes: &'a [RegisteredClass], space: &str) -> Option<&'a ClassDeclaration> {
        classes
            .iter()
            .find(|c| c.space == space)
            .map(|c| &c.declaration)
    }

    fn classes(&self, kind: ClassKind) -> &[RegisteredClass] {
        match kind {
            ClassKind::Entity => &self.entities,
            ClassKind::Repository => &self.repositories,
        }
    }

    fn classes_mut(&mut self, kind: ClassKind) -> &mut Vec<RegisteredClass> {
        match kind {
            ClassKind::Entity => &mut self.entities,
            ClassKind::Repository => &mut self.repositories,
        }
    }

    fn space_name_for(&mut self, declaration: &ClassDeclaration) -> Result<String> {
        let postfix = match declaration.kind {
            ClassKind::Entity => self.entity_postfix.as_deref(),
            ClassKind::Repository => self.repository_postfix.as_deref(),
        };

        let short = declaration.short_name();
        let stem = postfix
            .and_then(|p| short.strip_suffix(p))
            .unwrap_or(short);

        self.names
            .normalize(stem)
            .map_err(|_| SchemaError::InvalidIdentifier(declaration.name.clone()))
    }

    fn recompute(&mut self, kind: ClassKind) -> Result<()> {
        let mut classes = std::mem::take(self.classes_mut(kind));
        let result = classes.iter_mut().try_for_each(|class| -> Result<()> {
            class.space = self.space_name_for(&class.declaration)?;
            Ok(())
        });
        *self.classes_mut(kind) = classes;
        result
    }
}
