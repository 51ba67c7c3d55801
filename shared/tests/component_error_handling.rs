use tundra_shared::{
    AttributeChange, AttributeError, AttributeTypeId, AttributeValue, ComponentError,
    ComponentRegistry, Deserializer, DYNAMIC_COMPONENT, MAX_ATTRIBUTES, MESH, NAME,
};

/// Tests for Component attribute error handling

fn registry() -> ComponentRegistry {
    ComponentRegistry::tundra()
}

#[test]
fn test_not_dynamic_error() {
    let mut mesh = registry().create_component(MESH, 1, "").unwrap();

    let error = mesh
        .create_attribute(AttributeTypeId::Int, "extra", AttributeChange::Default)
        .unwrap_err();

    assert_eq!(
        error,
        ComponentError::NotDynamic {
            type_name: "Mesh".to_string(),
        }
    );
    assert_eq!(
        format!("{}", error),
        "Component 'Mesh' does not support dynamic attributes"
    );
    assert!(mesh.remove_attribute(0, AttributeChange::Default).is_err());
}

#[test]
fn test_attribute_already_exists() {
    let mut dynamic = registry().create_component(DYNAMIC_COMPONENT, 1, "").unwrap();
    dynamic
        .create_attribute(AttributeTypeId::Bool, "flag", AttributeChange::Disconnected)
        .unwrap();

    let by_name = dynamic.create_attribute_with_value(5, "flag", AttributeValue::Bool(true), AttributeChange::Default);
    let by_index = dynamic.create_attribute_with_value(0, "other", AttributeValue::Int(1), AttributeChange::Default);

    assert_eq!(
        by_name,
        Err(ComponentError::AttributeAlreadyExists {
            type_name: "DynamicComponent".to_string(),
            attribute: "flag".to_string(),
        })
    );
    assert!(matches!(by_index, Err(ComponentError::AttributeAlreadyExists { .. })));
    assert_eq!(dynamic.attribute_count(), 1);
}

#[test]
fn test_attribute_name_too_long() {
    let mut dynamic = registry().create_component(DYNAMIC_COMPONENT, 1, "").unwrap();
    let name = "n".repeat(256);

    let error = dynamic
        .create_attribute(AttributeTypeId::String, &name, AttributeChange::Default)
        .unwrap_err();

    assert_eq!(
        error,
        ComponentError::NameTooLong {
            type_name: "DynamicComponent".to_string(),
            byte_len: 256,
        }
    );
    assert_eq!(
        format!("{}", error),
        "Attribute name of 256 bytes is too long for component 'DynamicComponent', at most 255 fit"
    );
    assert_eq!(dynamic.attribute_count(), 0);
    assert!(dynamic
        .create_attribute(AttributeTypeId::String, &name[..255], AttributeChange::Default)
        .is_ok());
}

#[test]
fn test_attribute_not_found() {
    let mut dynamic = registry().create_component(DYNAMIC_COMPONENT, 1, "").unwrap();

    let error = dynamic.remove_attribute(7, AttributeChange::Default).unwrap_err();

    assert_eq!(
        error,
        ComponentError::AttributeNotFound {
            type_name: "DynamicComponent".to_string(),
            attribute: "7".to_string(),
        }
    );
    assert_eq!(
        format!("{}", error),
        "Attribute '7' not found in component 'DynamicComponent'"
    );
}

#[test]
fn test_index_space_exhausted() {
    let mut dynamic = registry().create_component(DYNAMIC_COMPONENT, 1, "").unwrap();
    for i in 0..MAX_ATTRIBUTES {
        dynamic
            .create_attribute(AttributeTypeId::Bool, &format!("b{}", i), AttributeChange::Disconnected)
            .unwrap();
    }

    let error = dynamic
        .create_attribute(AttributeTypeId::Bool, "overflow", AttributeChange::Disconnected)
        .unwrap_err();

    assert_eq!(
        error,
        ComponentError::IndexSpaceExhausted {
            type_name: "DynamicComponent".to_string(),
        }
    );

    // a freed index becomes available again
    dynamic.remove_attribute(40, AttributeChange::Disconnected).unwrap();
    assert_eq!(
        dynamic.create_attribute(AttributeTypeId::Bool, "overflow", AttributeChange::Disconnected),
        Ok(40)
    );
}

#[test]
fn test_wrong_value_kind() {
    let mut name = registry().create_component(NAME, 1, "").unwrap();

    let error = name
        .try_set_attribute(0, AttributeValue::Int(5), AttributeChange::Default)
        .unwrap_err();

    assert_eq!(
        error,
        ComponentError::Attribute(AttributeError::TypeMismatch {
            attribute: "name".to_string(),
            expected: AttributeTypeId::String,
            actual: AttributeTypeId::Int,
        })
    );
    assert_eq!(format!("{}", error), "Attribute 'name' holds string values, refused a int value");
    assert_eq!(name.set_attribute(0, AttributeValue::Int(5), AttributeChange::Default), None);
}

#[test]
fn test_truncated_attribute_read() {
    let mut name = registry().create_component(NAME, 1, "").unwrap();
    // u16 length header announcing more bytes than present
    let bytes = [0x10u8, 0x00, b'a'];
    let mut reader = Deserializer::new(&bytes);

    let result = name.read_attribute(0, &mut reader, AttributeChange::Default);

    assert!(matches!(result, Err(ComponentError::Codec(_))));
    assert_eq!(name.value(0), Some(&AttributeValue::String(String::new())));
}

#[test]
fn test_error_clone() {
    let error1 = ComponentError::NotDynamic {
        type_name: "Mesh".to_string(),
    };
    let error2 = error1.clone();

    assert_eq!(error1, error2);
}
