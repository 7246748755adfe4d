use statesync_client::{ClientConfig, StateClient, StateError};
use statesync_shared::{decode_snapshot, ByteReader, DecodeConfig, DecodeError, Value};
use statesync_test::{
    encode_handshake, encode_snapshot, game_registry, game_state, game_types, map, sequence, set,
    GraphBuilder,
};

fn decode(bytes: &[u8]) -> Result<statesync_shared::StateGraph, DecodeError> {
    decode_snapshot(
        &mut ByteReader::new(bytes),
        &game_registry(),
        game_types::GAME,
        &DecodeConfig::default(),
    )
}

#[test]
fn snapshot_round_trips() {
    let state = game_state();

    let decoded = decode(&encode_snapshot(&state, &game_registry())).expect("snapshot decodes");

    assert_eq!(decoded, state);
}

#[test]
fn shared_child_is_decoded_once() {
    let decoded = decode(&encode_snapshot(&game_state(), &game_registry())).expect("decodes");

    // both players point at the same position instance
    assert_eq!(decoded.get(1).and_then(|player| player.get(2)), Some(&Value::Ref(2)));
    assert_eq!(decoded.get(3).and_then(|boss| boss.get(2)), Some(&Value::Ref(2)));
    assert_eq!(decoded.len(), 4);
    assert_eq!(decoded.get(3).map(|boss| boss.type_id()), Some(game_types::BOSS));
}

#[test]
fn empty_collections_and_null_child() {
    let state = GraphBuilder::new(game_types::GAME)
        .root_field(0, Value::Null)
        .root_field(1, map([]))
        .root_field(2, sequence([]))
        .root_field(3, set([]))
        .root_field(4, Value::UInt16(0))
        .root_field(5, "")
        .build();

    let decoded = decode(&encode_snapshot(&state, &game_registry())).expect("decodes");

    assert_eq!(decoded, state);
    assert_eq!(decoded.len(), 1);
}

#[test]
fn truncated_snapshot_underruns_at_every_cut() {
    let bytes = encode_snapshot(&game_state(), &game_registry());

    for cut in 0..bytes.len() {
        assert!(
            matches!(decode(&bytes[..cut]), Err(DecodeError::BufferUnderrun { .. })),
            "cut at {}",
            cut
        );
    }
}

#[test]
fn failed_snapshot_keeps_previous_state() {
    let mut client = StateClient::new(ClientConfig::default());
    client
        .handshake(&encode_handshake(&game_registry()))
        .expect("handshake decodes");
    client
        .set_state(&encode_snapshot(&game_state(), &game_registry()))
        .expect("snapshot decodes");

    let result = client.set_state(&[0x01]);

    assert!(matches!(result, Err(StateError::Decode(_))));
    assert_eq!(client.state(), &game_state());
}

#[test]
fn nested_fields_starting_with_marker_byte_round_trip() {
    // hp 213 and this x both put 0xd5 first in their instance body
    let x = f32::from_le_bytes([0xd5, 0xf3, 0xa1, 0x43]);
    let state = GraphBuilder::from_graph(game_state())
        .field(1, 0, 213)
        .field(2, 0, Value::Float32(x))
        .build();

    let decoded = decode(&encode_snapshot(&state, &game_registry())).expect("snapshot decodes");

    assert_eq!(decoded, state);
}
