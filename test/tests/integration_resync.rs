use statesync_client::{ClientConfig, StateClient, StateError};
use statesync_shared::{PrimitiveKind, SchemaDefinition, TypeRegistry, TypeTag, ROOT_REF_ID};
use statesync_test::{
    assert_field_eq, encode_handshake, encode_snapshot, game_registry, game_state, hero_registry,
    hero_state, PatchBuilder,
};

fn hero_client() -> StateClient {
    let mut client = StateClient::new(ClientConfig::default());
    client
        .handshake(&encode_handshake(&hero_registry()))
        .expect("handshake decodes");
    client
        .set_state(&encode_snapshot(&hero_state(), &hero_registry()))
        .expect("snapshot decodes");
    client
}

/// Hero with an extra `mana` field
fn extended_hero_registry() -> TypeRegistry {
    let mut registry = TypeRegistry::builder();
    registry
        .add_type(
            SchemaDefinition::new(1)
                .with_field("hp", TypeTag::Primitive(PrimitiveKind::Int32))
                .with_field("name", TypeTag::Primitive(PrimitiveKind::String))
                .with_field("mana", TypeTag::Primitive(PrimitiveKind::UInt8)),
        )
        .expect("valid layout")
        .set_root_type(1);
    registry
}

#[test]
fn patch_before_first_snapshot_requires_resync() {
    let mut client = StateClient::new(ClientConfig::default());
    client
        .handshake(&encode_handshake(&hero_registry()))
        .expect("handshake decodes");

    assert_eq!(
        client.patch(&PatchBuilder::new().replace(0, 1).build()),
        Err(StateError::ResyncRequired)
    );
}

#[test]
fn identical_rehandshake_keeps_patching() {
    let mut client = hero_client();

    client
        .handshake(&encode_handshake(&hero_registry()))
        .expect("handshake decodes");

    assert!(!client.is_resync_required());
    client
        .patch(&PatchBuilder::new().replace(0, 5).build())
        .expect("patch applies");
    assert_field_eq!(client.state(), ROOT_REF_ID, 0, 5);
}

#[test]
fn changed_live_type_requires_resync() {
    let mut client = hero_client();

    client
        .handshake(&encode_handshake(&extended_hero_registry()))
        .expect("handshake decodes");

    assert!(client.is_resync_required());
    assert_eq!(
        client.patch(&PatchBuilder::new().replace(0, 5).build()),
        Err(StateError::ResyncRequired)
    );
    // the old state is still readable
    assert_field_eq!(client.state(), ROOT_REF_ID, 0, 100);

    let next = statesync_test::GraphBuilder::from_graph(hero_state())
        .root_field(2, statesync_shared::Value::UInt8(30))
        .build();
    client
        .set_state(&encode_snapshot(&next, &extended_hero_registry()))
        .expect("snapshot decodes");

    assert!(!client.is_resync_required());
    client
        .patch(
            &PatchBuilder::new()
                .replace(2, statesync_shared::Value::UInt8(31))
                .build(),
        )
        .expect("patch applies");
    assert_field_eq!(client.state(), ROOT_REF_ID, 2, statesync_shared::Value::UInt8(31));
}

#[test]
fn changed_root_type_requires_resync() {
    let mut client = hero_client();

    client
        .handshake(&encode_handshake(&game_registry()))
        .expect("handshake decodes");
    assert!(client.is_resync_required());

    client
        .set_state(&encode_snapshot(&game_state(), &game_registry()))
        .expect("snapshot decodes");
    assert!(!client.is_resync_required());
    assert_eq!(client.state(), &game_state());
}
