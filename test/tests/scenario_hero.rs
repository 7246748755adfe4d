//! The smallest end-to-end flow: one root type, one snapshot, one patch.

use statesync_client::{ClientConfig, StateClient};
use statesync_shared::{Operation, Value, ROOT_REF_ID};
use statesync_test::{
    assert_changed_fields, assert_field_eq, encode_handshake, encode_snapshot, hero_registry,
    hero_state, ChangeLog, PatchBuilder,
};

fn connected_client() -> StateClient {
    let mut client = StateClient::new(ClientConfig::default());
    client
        .handshake(&encode_handshake(&hero_registry()))
        .expect("handshake decodes");
    client
        .set_state(&encode_snapshot(&hero_state(), &hero_registry()))
        .expect("snapshot decodes");
    client
}

#[test]
fn replace_hp_notifies_once() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Trace)
        .is_test(true)
        .try_init()
        .ok();

    let mut client = connected_client();
    let log = ChangeLog::new();
    client
        .observe_field(ROOT_REF_ID, "hp", log.recorder())
        .expect("hp is declared");

    client
        .patch(&PatchBuilder::new().replace(0, 90).build())
        .expect("patch applies");

    assert_field_eq!(client.state(), ROOT_REF_ID, 0, 90);
    assert_field_eq!(client.state(), ROOT_REF_ID, 1, "Ann");
    assert_changed_fields!(log, ["hp"]);

    let change = &log.changes()[0];
    assert_eq!(change.operation, Operation::Replace);
    assert_eq!(change.previous, Some(Value::Int32(100)));
    assert_eq!(change.value, Some(Value::Int32(90)));
}

#[test]
fn statically_declared_layout_skips_handshake() {
    let mut client =
        StateClient::with_registry(hero_registry(), ClientConfig::default()).expect("valid layout");
    client
        .set_state(&encode_snapshot(&hero_state(), &hero_registry()))
        .expect("snapshot decodes");

    client
        .patch(&PatchBuilder::new().replace(1, "Bea").build())
        .expect("patch applies");

    assert_eq!(client.root().get(1), Some(&Value::from("Bea")));
    assert_eq!(client.root().get(0), Some(&Value::Int32(100)));
}

#[test]
fn set_state_notifies_every_initial_field() {
    let mut client = StateClient::new(ClientConfig::default());
    client
        .handshake(&encode_handshake(&hero_registry()))
        .expect("handshake decodes");
    let log = ChangeLog::new();
    client.observe_instance(ROOT_REF_ID, log.recorder());

    client
        .set_state(&encode_snapshot(&hero_state(), &hero_registry()))
        .expect("snapshot decodes");

    assert_changed_fields!(log, ["hp", "name"]);
    assert!(log
        .changes()
        .iter()
        .all(|change| change.operation == Operation::Add && change.previous.is_none()));
}
