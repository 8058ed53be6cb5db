//! End-to-end runs of the validation pipeline over small schema sets.

use std::fs;
use std::path::{Path, PathBuf};

use lumos_core::{
    AttributeMap, AttributeValue, CollectionKind, CollectionShape, Dimension, DiagnosticKind,
    EnumMember, FieldDefinition, FileUnit, Severity, TypeDefinition, ValidationConfig,
};
use lumos_validate::{registry_for, ValidationResult, Validator};

fn run(config: &ValidationConfig, files: &[FileUnit]) -> ValidationResult {
    let registry = registry_for(config).unwrap();
    Validator::new(config, &registry).unwrap().validate(files)
}

fn kinds(result: &ValidationResult) -> Vec<DiagnosticKind> {
    result.report().diagnostics().iter().map(|d| d.kind).collect()
}

/// Write empty source files so imports can resolve, returning one record
/// per file with its namespace set from `name`.
fn workspace(root: &Path, names: &[&str]) -> Vec<FileUnit> {
    names
        .iter()
        .map(|name| {
            let path = root.join(format!("{name}.msg"));
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&path, "").unwrap();
            FileUnit::new(path).with_namespace(name.replace('/', "::"))
        })
        .collect()
}

fn config_with_search(root: &Path) -> ValidationConfig {
    ValidationConfig {
        search_paths: vec![root.to_path_buf()],
        ..ValidationConfig::default()
    }
}

fn can_bus_config(strict: bool) -> ValidationConfig {
    let mut config = ValidationConfig::default();
    config.attributes.enabled_schemas = vec!["can_bus".into()];
    config.attributes.strict_mode = strict;
    config
}

#[test]
fn unnumbered_float_struct_is_clean() {
    let unit = FileUnit::new("geometry.msg").with_type(
        TypeDefinition::structure("Vector2")
            .with_field(FieldDefinition::new("x", "float32"))
            .with_field(FieldDefinition::new("y", "float32")),
    );
    let result = run(&ValidationConfig::default(), &[unit]);
    assert!(result.is_success());
    assert!(result.errors().is_empty());
}

#[test]
fn partial_numbering_fails_once() {
    let unit = FileUnit::new("pose.msg").with_type(
        TypeDefinition::structure("Pose")
            .with_field(FieldDefinition::new("a", "int32").numbered(1))
            .with_field(FieldDefinition::new("b", "int32"))
            .with_field(FieldDefinition::new("c", "int32").numbered(2)),
    );
    let result = run(&ValidationConfig::default(), &[unit]);
    assert!(!result.is_success());
    assert_eq!(kinds(&result), vec![DiagnosticKind::FieldNumberMissing]);
}

#[test]
fn explicit_zero_twice_is_duplicate_value() {
    let unit = FileUnit::new("mode.msg").with_type(
        TypeDefinition::enumeration("Mode")
            .with_member(EnumMember::explicit("Off", 0))
            .with_member(EnumMember::explicit("Standby", 0)),
    );
    let result = run(&ValidationConfig::default(), &[unit]);
    assert!(!result.is_success());
    assert_eq!(kinds(&result), vec![DiagnosticKind::EnumDuplicateValue]);
}

#[test]
fn missing_import_lists_every_search_directory() {
    let dir = tempfile::TempDir::new().unwrap();
    let first = dir.path().join("idl");
    let second = dir.path().join("vendor");
    fs::create_dir_all(&first).unwrap();
    fs::create_dir_all(&second).unwrap();

    let mut files = workspace(dir.path(), &["robot/arm"]);
    files[0] = files[0].clone().with_import("common/missing", 2);

    let config = ValidationConfig {
        search_paths: vec![first.clone(), second.clone()],
        ..ValidationConfig::default()
    };
    let result = run(&config, &files);

    assert!(!result.is_success());
    let errors = result.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, DiagnosticKind::ImportNotFound);
    assert_eq!(errors[0].line, 2);
    for searched in [&first, &second, &dir.path().join("robot")] {
        assert!(
            errors[0].message.contains(&searched.display().to_string()),
            "{} not listed in: {}",
            searched.display(),
            errors[0].message
        );
    }
}

#[test]
fn import_cycle_is_reported_and_blocks_ordering() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut files = workspace(dir.path(), &["a", "b", "c"]);
    files[0] = files[0].clone().with_import("b", 1);
    files[1] = files[1].clone().with_import("c", 1);
    files[2] = files[2].clone().with_import("a", 1);

    let result = run(&config_with_search(dir.path()), &files);
    assert!(!result.is_success());
    assert!(result.processing_order().is_none());

    let cycles: Vec<_> = result
        .errors()
        .into_iter()
        .filter(|d| d.kind == DiagnosticKind::CircularDependency)
        .collect();
    assert_eq!(cycles.len(), 1);

    let message = &cycles[0].message;
    let at = |name: &str| {
        message
            .find(&dir.path().join(name).display().to_string())
            .unwrap()
    };
    // Cited in cyclic order starting from a.
    assert!(at("a.msg") < at("b.msg"));
    assert!(at("b.msg") < at("c.msg"));
    assert!(result.dependency_graph().topological_order().is_err());
}

#[test]
fn diamond_imports_order_shared_dependency_first() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut files = workspace(dir.path(), &["d", "b", "c", "a"]);
    files[0] = files[0].clone().with_import("b", 1).with_import("c", 2);
    files[1] = files[1].clone().with_import("a", 1);
    files[2] = files[2].clone().with_import("a", 1);

    let result = run(&config_with_search(dir.path()), &files);
    assert!(result.is_success(), "{}", result.report().render());

    let order: Vec<PathBuf> = result.processing_order().unwrap().to_vec();
    let pos = |name: &str| order.iter().position(|p| p == &dir.path().join(name)).unwrap();
    assert!(pos("a.msg") < pos("b.msg"));
    assert!(pos("a.msg") < pos("c.msg"));
    assert!(pos("b.msg") < pos("d.msg"));
    assert!(pos("c.msg") < pos("d.msg"));
}

#[test]
fn imported_type_resolves_across_files() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut files = workspace(dir.path(), &["common/geometry", "robot/pose"]);
    files[0] = files[0]
        .clone()
        .with_type(TypeDefinition::structure("Vector3").with_field(FieldDefinition::new("x", "float64")));
    files[1] = files[1].clone().with_import("common/geometry", 1).with_type(
        TypeDefinition::structure("Pose")
            .with_field(FieldDefinition::new("position", "Vector3"))
            .with_field(FieldDefinition::new("frame", "common::geometry::Vector3")),
    );

    let result = run(&config_with_search(dir.path()), &files);
    assert!(result.is_success(), "{}", result.report().render());
    assert_eq!(result.symbol_table().statistics().namespaces, 2);
}

#[test]
fn can_message_without_id_is_missing_property() {
    let mut frame = AttributeMap::new();
    frame.insert("cycle_time".into(), AttributeValue::Integer(10));
    let unit = FileUnit::new("speed.msg").with_type(
        TypeDefinition::structure("WheelSpeed")
            .at_line(1)
            .with_attribute("can_message", AttributeValue::Map(frame)),
    );
    let result = run(&can_bus_config(false), &[unit]);
    assert!(!result.is_success());
    let errors = result.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, DiagnosticKind::AttributeMissingRequiredProperty);
    assert!(errors[0].message.contains("'id'"));
}

#[test]
fn unknown_attribute_warns_by_default_and_fails_when_strict() {
    let unit = FileUnit::new("speed.msg").with_type(
        TypeDefinition::structure("WheelSpeed").with_field(
            FieldDefinition::new("rpm", "float32")
                .with_attribute("colour", AttributeValue::Text("red".into())),
        ),
    );

    let relaxed = run(&can_bus_config(false), &[unit.clone()]);
    assert!(relaxed.is_success());
    assert_eq!(relaxed.errors().len(), 0);
    let warnings = relaxed.warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].kind, DiagnosticKind::AttributeUnknown);

    let strict = run(&can_bus_config(true), &[unit]);
    assert!(!strict.is_success());
    let errors = strict.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, DiagnosticKind::AttributeUnknown);
    assert_eq!(errors[0].severity, Severity::Error);
}

#[test]
fn indented_field_attributes_are_validated() {
    let mut signal = AttributeMap::new();
    signal.insert("start_bit".into(), AttributeValue::Integer(0));
    let unit = FileUnit::new("speed.msg").with_type(
        TypeDefinition::structure("WheelSpeed").with_field(
            FieldDefinition::new("rpm", "uint16")
                .at_line(4)
                .with_indented_attribute("can_signal", AttributeValue::Map(signal)),
        ),
    );
    let result = run(&can_bus_config(false), &[unit]);
    let errors = result.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, DiagnosticKind::AttributeMissingRequiredProperty);
    assert!(errors[0].message.contains("'length'"));
    assert_eq!(errors[0].line, 4);
}

#[test]
fn diagnostics_sorted_by_file_then_line() {
    let late = FileUnit::new("z.msg").with_type(
        TypeDefinition::structure("Z").with_field(FieldDefinition::new("q", "Nope").at_line(9)),
    );
    let early = FileUnit::new("a.msg").with_type(
        TypeDefinition::structure("A")
            .with_field(FieldDefinition::new("p", "Nope").at_line(5))
            .with_field(
                FieldDefinition::new("grid", "float32")
                    .at_line(2)
                    .with_collection(CollectionShape::new(CollectionKind::Array, vec![Dimension::Fixed(0)])),
            ),
    );
    let result = run(&ValidationConfig::default(), &[late, early]);
    let located: Vec<(String, u32)> = result
        .report()
        .diagnostics()
        .iter()
        .map(|d| (d.file.display().to_string(), d.line))
        .collect();
    assert_eq!(
        located,
        vec![
            ("a.msg".to_string(), 2),
            ("a.msg".to_string(), 5),
            ("z.msg".to_string(), 9)
        ]
    );
}

#[test]
fn custom_schema_from_config_is_enabled() {
    let dir = tempfile::TempDir::new().unwrap();
    let schema = dir.path().join("telemetry.yaml");
    fs::write(
        &schema,
        "schema_name: telemetry\nversion: '1'\nstruct_attributes: {}\nfield_attributes:\n  sample_rate:\n    type: integer\n    constraints: { min: 1 }\n",
    )
    .unwrap();

    let config = ValidationConfig::from_yaml_str(&format!(
        "attributes:\n  enabled_schemas: [telemetry]\n  custom_schemas: ['{}']\n",
        schema.display()
    ))
    .unwrap();

    let unit = FileUnit::new("imu.msg").with_type(
        TypeDefinition::structure("Imu").with_field(
            FieldDefinition::new("accel", "float32")
                .with_attribute("sample_rate", AttributeValue::Integer(0)),
        ),
    );
    let result = run(&config, &[unit]);
    let errors = result.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, DiagnosticKind::AttributeConstraintViolation);
}

#[test]
fn losing_duplicate_in_same_file_is_not_validated() {
    let unit = FileUnit::new("a.msg")
        .with_type(TypeDefinition::enumeration("Mode"))
        .with_type(TypeDefinition::structure("Mode").with_field(FieldDefinition::new("f", "Nope")));
    let result = run(&ValidationConfig::default(), &[unit]);
    assert_eq!(
        kinds(&result),
        vec![DiagnosticKind::DuplicateTypeName, DiagnosticKind::EnumNoMembers]
    );
}
