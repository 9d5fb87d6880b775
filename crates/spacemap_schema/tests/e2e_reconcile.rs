//! End-to-End tests for schema reconciliation
//!
//! Drives the full lifecycle: declare -> register -> bootstrap -> migrate ->
//! re-migrate. Uses a real MemoryStore, saved to disk where persistence
//! matters.

use spacemap_schema::{
    ClassDeclaration, ClassKind, CreatedIndex, Declare, DeclarationManifest, IndexDeclaration, Mapper,
    MapperConfig, Meta, Migration, SchemaError, Visibility, PROPERTY_SPACE, SEQUENCE_SPACE,
};
use spacemap_store::{
    IndexDescriptor, MemoryStore, Property, SchemaStore, StorageType, Value, FIRST_SPACE_ID,
};

fn plain_config() -> MapperConfig {
    MapperConfig {
        bootstrap: false,
        ..MapperConfig::default()
    }
}

fn postfix_config() -> MapperConfig {
    MapperConfig {
        entity_postfix: Some("Entity".to_string()),
        repository_postfix: Some("Repository".to_string()),
        bootstrap: false,
        nested_set: false,
    }
}

fn property_names(store: &MemoryStore, space: &str) -> Vec<String> {
    store
        .space(space)
        .unwrap()
        .properties()
        .iter()
        .map(|p| p.name.clone())
        .collect()
}

// =============================================================================
// ENTITY RECONCILIATION
// =============================================================================

/// Person with id:int and name:string ends up as person[id:unsigned, name:str]
/// with exactly one unique index on id.
#[test]
fn test_person_end_to_end() {
    let mut mapper = Mapper::new(MemoryStore::new(), plain_config()).unwrap();
    let space = mapper
        .register(
            ClassDeclaration::entity("Person")
                .property("id", "int")
                .property("name", "string"),
        )
        .unwrap();
    assert_eq!(space, "person");

    let report = mapper.migrate().unwrap();
    assert_eq!(report.spaces_created, vec!["person"]);
    assert_eq!(report.properties_added.len(), 2);
    assert_eq!(
        report.indexes_created,
        vec![CreatedIndex {
            space: "person".to_string(),
            index: "id".to_string(),
        }]
    );

    let person = mapper.store().space("person").unwrap();
    assert_eq!(
        person.properties(),
        &[
            Property {
                name: "id".to_string(),
                ordinal: 0,
                storage_type: StorageType::Unsigned,
            },
            Property {
                name: "name".to_string(),
                ordinal: 1,
                storage_type: StorageType::Str,
            },
        ]
    );
    assert_eq!(person.indexes().len(), 1);
    assert_eq!(person.indexes()[0].fields, vec!["id"]);
    assert!(person.indexes()[0].unique);
}

/// Second migrate over the same declarations changes nothing.
#[test]
fn test_migrate_is_idempotent() {
    let mut mapper = Mapper::new(MemoryStore::new(), MapperConfig::default()).unwrap();
    mapper
        .register(
            ClassDeclaration::entity("BlogPost")
                .property("id", "int")
                .property("authorName", "string")
                .property("tags", "array")
                .property("category", "\\App\\Entity\\Category"),
        )
        .unwrap();
    mapper
        .register(
            ClassDeclaration::repository("BlogPost")
                .index("author_name")
                .index(vec!["id", "tags"]),
        )
        .unwrap();

    mapper.migrate().unwrap();
    let first = mapper.store().clone();

    let report = mapper.migrate().unwrap();
    assert!(report.is_empty(), "second run changed: {report:?}");
    assert_eq!(mapper.store(), &first);
}

/// Property names are normalized and their types resolved.
#[test]
fn test_property_names_and_types() {
    let mut mapper = Mapper::new(MemoryStore::new(), postfix_config()).unwrap();
    mapper
        .register(
            ClassDeclaration::entity("App\\Entity\\BlogPostEntity")
                .property("id", "int")
                .property("authorName", "string")
                .property("tags", "array")
                .property("category", "\\App\\Entity\\Category")
                .property("HTTPStatus", "mystery"),
        )
        .unwrap();

    mapper.migrate().unwrap();

    let space = mapper.store().space("blog_post").unwrap();
    let types: Vec<(&str, StorageType)> = space
        .properties()
        .iter()
        .map(|p| (p.name.as_str(), p.storage_type))
        .collect();
    assert_eq!(
        types,
        vec![
            ("id", StorageType::Unsigned),
            ("author_name", StorageType::Str),
            ("tags", StorageType::Any),
            ("category", StorageType::Unsigned),
            ("http_status", StorageType::Str),
        ]
    );
}

/// Non-public fields never become properties.
#[test]
fn test_private_fields_skipped() {
    let mut mapper = Mapper::new(MemoryStore::new(), plain_config()).unwrap();
    mapper
        .register(
            ClassDeclaration::entity("Session")
                .property("id", "int")
                .typed_property("secret", Visibility::Private, Vec::new())
                .typed_property("cache", Visibility::Protected, vec!["array".to_string()]),
        )
        .unwrap();

    mapper.migrate().unwrap();
    assert_eq!(property_names(mapper.store(), "session"), vec!["id"]);
}

/// Removing a field from the declaration never drops the stored property.
#[test]
fn test_schema_evolution_is_additive() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("schema.json");

    let mut mapper = Mapper::new(MemoryStore::new(), plain_config()).unwrap();
    mapper
        .register(
            ClassDeclaration::entity("Person")
                .property("id", "int")
                .property("nickname", "string"),
        )
        .unwrap();
    mapper.migrate().unwrap();
    mapper.store().save(&path).unwrap();

    let mut mapper = Mapper::new(MemoryStore::load(&path).unwrap(), plain_config()).unwrap();
    mapper
        .register(
            ClassDeclaration::entity("Person")
                .property("id", "string")
                .property("email", "string"),
        )
        .unwrap();
    let report = mapper.migrate().unwrap();

    assert_eq!(report.properties_added.len(), 1);
    let person = mapper.store().space("person").unwrap();
    assert_eq!(property_names(mapper.store(), "person"), vec!["id", "nickname", "email"]);
    // existing property keeps its original type
    assert_eq!(person.property("id").unwrap().storage_type, StorageType::Unsigned);
    assert_eq!(person.property("email").unwrap().ordinal, 2);
}

// =============================================================================
// DECLARATION ERRORS
// =============================================================================

#[test]
fn test_missing_type_annotation() {
    let mut mapper = Mapper::new(MemoryStore::new(), plain_config()).unwrap();
    mapper
        .register(
            ClassDeclaration::entity("Person")
                .property("id", "int")
                .untyped_property("nickname"),
        )
        .unwrap();

    let err = mapper.migrate().unwrap_err();
    assert!(matches!(
        err,
        SchemaError::MissingTypeAnnotation { ref property, .. } if property == "nickname"
    ));

    let person = mapper.store().space("person").unwrap();
    assert!(!person.has_property("nickname"));
    // earlier mutations stay applied
    assert!(person.has_property("id"));
}

#[test]
fn test_ambiguous_type_annotation() {
    let mut mapper = Mapper::new(MemoryStore::new(), plain_config()).unwrap();
    mapper
        .register(ClassDeclaration::entity("Person").typed_property(
            "id",
            Visibility::Public,
            vec!["int".to_string(), "string".to_string()],
        ))
        .unwrap();

    let err = mapper.migrate().unwrap_err();
    assert!(matches!(err, SchemaError::AmbiguousTypeAnnotation { count: 2, .. }));
}

#[test]
fn test_repository_without_entity() {
    let mut mapper = Mapper::new(MemoryStore::new(), postfix_config()).unwrap();
    let space = mapper
        .register(ClassDeclaration::repository("PersonRepository").index("name"))
        .unwrap();
    assert_eq!(space, "person");

    let err = mapper.migrate().unwrap_err();
    assert!(matches!(
        err,
        SchemaError::MissingEntityDefinition { ref space, .. } if space == "person"
    ));
    assert!(!mapper.store().has_space("person"));
}

#[test]
fn test_repository_registered_before_entity() {
    let mut mapper = Mapper::new(MemoryStore::new(), postfix_config()).unwrap();
    mapper
        .register(ClassDeclaration::repository("PersonRepository").index("name"))
        .unwrap();
    mapper
        .register(
            ClassDeclaration::entity("PersonEntity")
                .property("id", "int")
                .property("name", "string"),
        )
        .unwrap();

    // entities always reconcile first
    mapper.migrate().unwrap();
    let person = mapper.store().space("person").unwrap();
    assert_eq!(person.indexes().len(), 1);
    assert_eq!(person.indexes()[0].name, "name");
}

#[test]
fn test_no_primary_index() {
    let mut mapper = Mapper::new(MemoryStore::new(), plain_config()).unwrap();
    mapper
        .register(ClassDeclaration::entity("Tag").property("label", "string"))
        .unwrap();

    let err = mapper.migrate().unwrap_err();
    assert!(matches!(err, SchemaError::NoPrimaryIndex { ref space } if space == "tag"));
}

#[test]
fn test_abstract_bases_rejected() {
    let mut mapper = Mapper::new(MemoryStore::new(), plain_config()).unwrap();
    for kind in [ClassKind::Entity, ClassKind::Repository] {
        let err = mapper.register(ClassDeclaration::base(kind)).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidRegistration { .. }));
    }
    assert!(mapper.registry().entities().is_empty());
}

// =============================================================================
// INDEXES
// =============================================================================

/// Spaces created outside any declaration still get their id index.
#[test]
fn test_primary_index_for_preexisting_space() {
    let mut store = MemoryStore::new();
    store.create_space("legacy").unwrap();
    store.add_property("legacy", "id", StorageType::Unsigned).unwrap();

    let mut mapper = Mapper::new(store, plain_config()).unwrap();
    let report = mapper.migrate().unwrap();

    assert_eq!(report.indexes_created.len(), 1);
    let legacy = mapper.store().space("legacy").unwrap();
    assert_eq!(legacy.indexes()[0].fields, vec!["id"]);
}

/// Declared indexes replace the synthesized primary.
#[test]
fn test_declared_indexes_applied_in_order() {
    let mut mapper = Mapper::new(MemoryStore::new(), postfix_config()).unwrap();
    mapper
        .register(
            ClassDeclaration::entity("PostEntity")
                .property("id", "int")
                .property("author", "int")
                .property("month", "int"),
        )
        .unwrap();
    mapper
        .register(
            ClassDeclaration::repository("PostRepository")
                .index("id")
                .index(IndexDeclaration::non_unique(["author", "month"]))
                // reversed field order is a distinct index
                .index(IndexDeclaration::non_unique(["month", "author"])),
        )
        .unwrap();

    mapper.migrate().unwrap();
    mapper.migrate().unwrap();

    let post = mapper.store().space("post").unwrap();
    let names: Vec<&str> = post.indexes().iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["id", "author_month", "month_author"]);
    assert!(!post.index("author_month").unwrap().unique);
}

#[test]
fn test_nested_set_indexes() {
    let config = MapperConfig {
        nested_set: true,
        ..plain_config()
    };
    let mut mapper = Mapper::new(MemoryStore::new(), config).unwrap();
    let mut category = ClassDeclaration::entity("Category").property("id", "int");
    for field in ["parent", "root", "depth", "left", "right"] {
        category = category.property(field, "int");
    }
    mapper.register(category).unwrap();

    mapper.migrate().unwrap();
    let names: Vec<String> = mapper
        .store()
        .space("category")
        .unwrap()
        .indexes()
        .iter()
        .map(|i| i.name.clone())
        .collect();
    assert_eq!(names, vec!["id", "parent", "root_left", "root_right"]);
}

// =============================================================================
// MIGRATIONS AND BOOTSTRAP
// =============================================================================

struct CreatePosts;

impl Migration for CreatePosts {
    fn name(&self) -> &str {
        "create_posts"
    }

    fn migrate(&self, meta: &mut Meta<'_>) -> spacemap_schema::Result<()> {
        meta.create("posts", &["body", "slug", "title"])?
            .add_index(IndexDescriptor::new(["slug"]))?;
        Ok(())
    }
}

struct PostAuthors;

impl Migration for PostAuthors {
    fn name(&self) -> &str {
        "post_authors"
    }

    fn migrate(&self, meta: &mut Meta<'_>) -> spacemap_schema::Result<()> {
        meta.space("posts")?
            .add_typed_property("author", StorageType::Unsigned)?
            .add_property("month")?
            .add_index(IndexDescriptor::new(["author", "month"]).non_unique())?;
        Ok(())
    }
}

/// Re-running the posts migrations adds nothing and keeps ordinals.
#[test]
fn test_posts_migration_rerun() {
    let mut mapper = Mapper::new(MemoryStore::new(), plain_config()).unwrap();
    mapper.add_migration(CreatePosts).add_migration(PostAuthors);

    let report = mapper.migrate().unwrap();
    assert_eq!(report.spaces_created, vec!["posts"]);
    assert_eq!(report.indexes_created.len(), 3);

    let before = mapper.store().space("posts").unwrap().clone();
    let report = mapper.migrate().unwrap();
    assert!(report.is_empty());

    let posts = mapper.store().space("posts").unwrap();
    assert_eq!(posts, &before);
    assert_eq!(
        property_names(mapper.store(), "posts"),
        vec!["id", "body", "slug", "title", "author", "month"]
    );
    let names: Vec<&str> = posts.indexes().iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["id", "slug", "author_month"]);
    assert!(!posts.index("author_month").unwrap().unique);
}

#[test]
fn test_bootstrap_seed_rows() {
    let mut mapper = Mapper::new(MemoryStore::new(), MapperConfig::default()).unwrap();
    let report = mapper.migrate().unwrap();
    assert_eq!(report.spaces_created, vec![SEQUENCE_SPACE, PROPERTY_SPACE]);
    assert_eq!(report.rows_seeded, 10);

    let store = mapper.store();
    let sequence_id = u64::from(FIRST_SPACE_ID);
    let property_id = sequence_id + 1;

    let rows = store.select(PROPERTY_SPACE).unwrap();
    assert_eq!(rows.len(), 8);
    assert_eq!(
        rows[0],
        vec![
            Value::from(1u64),
            Value::from(sequence_id),
            Value::from(0u64),
            Value::from("id"),
            Value::from("integer"),
        ]
    );
    assert_eq!(
        rows[7],
        vec![
            Value::from(8u64),
            Value::from(property_id),
            Value::from(4u64),
            Value::from("type"),
            Value::from("string"),
        ]
    );

    let sequences = store.select(SEQUENCE_SPACE).unwrap();
    assert_eq!(
        sequences,
        vec![
            vec![Value::from(1u64), Value::from(sequence_id), Value::from(2u64)],
            vec![Value::from(2u64), Value::from(property_id), Value::from(8u64)],
        ]
    );

    let index_space = store.space(PROPERTY_SPACE).unwrap().index("index_space").unwrap();
    assert_eq!(index_space.fields, vec!["index", "space"]);
    assert!(index_space.unique);

    // second bootstrap is a no-op
    assert!(mapper.migrate().unwrap().is_empty());
}

#[test]
fn test_catalog_mirrors_declared_properties() {
    let mut mapper = Mapper::new(MemoryStore::new(), MapperConfig::default()).unwrap();
    mapper
        .register(
            ClassDeclaration::entity("Person")
                .property("id", "int")
                .property("name", "string"),
        )
        .unwrap();
    mapper.migrate().unwrap();

    let person_id = u64::from(mapper.store().space_id("person").unwrap());
    let rows = mapper.store().select(PROPERTY_SPACE).unwrap();
    assert_eq!(rows.len(), 10);
    assert_eq!(
        rows[8],
        vec![
            Value::from(9u64),
            Value::from(person_id),
            Value::from(0u64),
            Value::from("id"),
            Value::from("unsigned"),
        ]
    );

    assert_eq!(mapper.next_id("person").unwrap(), 1);
    assert_eq!(mapper.next_id("person").unwrap(), 2);
}

// =============================================================================
// SELF-DESCRIBING TYPES AND MANIFESTS
// =============================================================================

struct Author;

impl Declare for Author {
    fn declaration() -> ClassDeclaration {
        ClassDeclaration::entity("app::model::Author")
            .property("id", "int")
            .property("displayName", "string")
    }
}

#[test]
fn test_register_declared_type() {
    let mut mapper = Mapper::new(MemoryStore::new(), plain_config()).unwrap();
    assert_eq!(mapper.register_type::<Author>().unwrap(), "author");
    mapper.migrate().unwrap();
    assert_eq!(property_names(mapper.store(), "author"), vec!["id", "display_name"]);
}

#[test]
fn test_manifest_end_to_end() {
    let manifest = DeclarationManifest::from_json(
        r#"{"classes": [
            {"kind": "entity", "name": "PersonEntity",
             "properties": [
                {"name": "id", "types": ["int"]},
                {"name": "name", "types": ["string"]},
                {"name": "password", "visibility": "private"}
             ]},
            {"kind": "repository", "name": "PersonRepository",
             "indexes": ["id", {"fields": ["name"], "unique": false}]}
        ]}"#,
    )
    .unwrap();

    let mut mapper = Mapper::new(MemoryStore::new(), postfix_config()).unwrap();
    for declaration in manifest.into_declarations().unwrap() {
        mapper.register(declaration).unwrap();
    }
    mapper.migrate().unwrap();

    let person = mapper.store().space("person").unwrap();
    assert_eq!(property_names(mapper.store(), "person"), vec!["id", "name"]);
    assert_eq!(person.indexes().len(), 2);
    assert!(!person.index("name").unwrap().unique);
}
