/// PROPERTY-BASED TESTS: snapshot round trips
///
/// Arbitrary game states encode to snapshots that decode back to the same
/// graph, and every strict prefix of such a snapshot is rejected as an
/// underrun instead of producing a partial graph.

use proptest::prelude::*;
use statesync_shared::{
    decode_snapshot, ByteReader, DecodeConfig, DecodeError, RefId, StateGraph, Value,
};
use statesync_test::{encode_snapshot, game_registry, game_types, map, sequence, set, GraphBuilder};

#[derive(Clone, Debug)]
struct PlayerModel {
    name: String,
    hp: i32,
    alive: bool,
    x: f32,
    y: f32,
    rage: Option<u8>,
}

#[derive(Clone, Debug)]
struct GameModel {
    leader: bool,
    players: Vec<PlayerModel>,
    scores: Vec<f64>,
    tags: Vec<String>,
    turn: u16,
    title: String,
}

fn player_strategy() -> impl Strategy<Value = PlayerModel> {
    (
        "[a-z]{1,8}",
        any::<i32>(),
        any::<bool>(),
        -1000.0f32..1000.0f32,
        -1000.0f32..1000.0f32,
        proptest::option::of(any::<u8>()),
    )
        .prop_map(|(name, hp, alive, x, y, rage)| PlayerModel {
            name,
            hp,
            alive,
            x,
            y,
            rage,
        })
}

fn score_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![
        any::<i32>().prop_map(f64::from),
        any::<u32>().prop_map(f64::from),
        -1.0e12f64..1.0e12f64,
    ]
}

fn game_strategy() -> impl Strategy<Value = GameModel> {
    (
        any::<bool>(),
        prop::collection::vec(player_strategy(), 0..5),
        prop::collection::vec(score_strategy(), 0..8),
        prop::collection::btree_set("[a-z]{1,6}", 0..4),
        any::<u16>(),
        "[ -~]{0,40}",
    )
        .prop_map(|(leader, players, scores, tags, turn, title)| GameModel {
            leader,
            players,
            scores,
            tags: tags.into_iter().collect(),
            turn,
            title,
        })
}

fn build(model: &GameModel) -> StateGraph {
    let mut builder = GraphBuilder::new(game_types::GAME);
    let mut next_ref: RefId = 1;
    let mut entries = Vec::new();

    for player in &model.players {
        let player_ref = next_ref;
        let position = next_ref + 1;
        next_ref += 2;

        let type_id = match player.rage {
            Some(_) => game_types::BOSS,
            None => game_types::PLAYER,
        };
        builder = builder
            .instance(player_ref, type_id)
            .field(player_ref, 0, player.hp)
            .field(player_ref, 1, player.name.as_str())
            .field(player_ref, 2, Value::Ref(position))
            .field(player_ref, 3, player.alive)
            .instance(position, game_types::VEC2)
            .field(position, 0, Value::Float32(player.x))
            .field(position, 1, Value::Float32(player.y));
        if let Some(rage) = player.rage {
            builder = builder.field(player_ref, 4, Value::UInt8(rage));
        }
        entries.push((player.name.as_str(), Value::Ref(player_ref)));
    }

    // later players with a repeated name overwrite earlier ones
    let leader = match (model.leader, entries.last()) {
        (true, Some((_, value))) => value.clone(),
        _ => Value::Null,
    };

    builder
        .root_field(0, leader)
        .root_field(1, map(entries))
        .root_field(2, sequence(model.scores.iter().copied().map(Value::Number)))
        .root_field(3, set(model.tags.iter().map(|tag| Value::from(tag.as_str()))))
        .root_field(4, Value::UInt16(model.turn))
        .root_field(5, model.title.as_str())
        .build()
}

fn decode(bytes: &[u8]) -> Result<StateGraph, DecodeError> {
    decode_snapshot(
        &mut ByteReader::new(bytes),
        &game_registry(),
        game_types::GAME,
        &DecodeConfig::default(),
    )
}

proptest! {
    #[test]
    fn prop_snapshot_round_trips(model in game_strategy()) {
        let mut state = build(&model);
        state.collect_garbage();

        let decoded = decode(&encode_snapshot(&state, &game_registry()));

        prop_assert_eq!(decoded, Ok(state));
    }

    #[test]
    fn prop_truncated_snapshot_never_decodes(model in game_strategy(), cut in any::<prop::sample::Index>()) {
        let bytes = encode_snapshot(&build(&model), &game_registry());
        let cut = cut.index(bytes.len());

        let result = decode(&bytes[..cut]);

        prop_assert!(
            matches!(result, Err(DecodeError::BufferUnderrun { .. })),
            "cut {} of {}: {:?}",
            cut,
            bytes.len(),
            result
        );
    }
}
