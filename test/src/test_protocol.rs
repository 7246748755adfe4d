use statesync_shared::{
    PrimitiveKind, SchemaDefinition, StateGraph, TypeId, TypeRegistry, TypeTag, Value,
};

use crate::helpers::{map, sequence, set, GraphBuilder};

/// Type ids of the hero layout: a single root type
pub mod hero_types {
    use statesync_shared::TypeId;

    pub const HERO: TypeId = 1;
}

/// Type ids of the game layout
pub mod game_types {
    use statesync_shared::TypeId;

    pub const GAME: TypeId = 0;
    pub const VEC2: TypeId = 1;
    pub const PLAYER: TypeId = 2;
    pub const BOSS: TypeId = 3;
}

fn primitive(kind: PrimitiveKind) -> TypeTag {
    TypeTag::Primitive(kind)
}

/// `Hero { hp: int32 @0, name: string @1 }`, also the root type
pub fn hero_registry() -> TypeRegistry {
    let mut registry = TypeRegistry::builder();
    registry
        .add_type(
            SchemaDefinition::new(hero_types::HERO)
                .with_field("hp", primitive(PrimitiveKind::Int32))
                .with_field("name", primitive(PrimitiveKind::String)),
        )
        .expect("hero layout is valid")
        .set_root_type(hero_types::HERO);
    registry
}

fn player_fields(type_id: TypeId) -> SchemaDefinition {
    SchemaDefinition::new(type_id)
        .with_field("hp", primitive(PrimitiveKind::Int32))
        .with_field("name", primitive(PrimitiveKind::String))
        .with_field("position", TypeTag::NestedSchema(game_types::VEC2))
        .with_field("alive", primitive(PrimitiveKind::Boolean))
}

/// ```text
/// Game   (0): player: ref Player, players: map<Player>, scores: array:number,
///             tags: set:string, turn: uint16, title: string
/// Vec2   (1): x: float32, y: float32
/// Player (2): hp: int32, name: string, position: ref Vec2, alive: boolean
/// Boss   (3): Player + rage: uint8
/// ```
pub fn game_registry() -> TypeRegistry {
    use game_types::*;

    let mut registry = TypeRegistry::builder();
    registry
        .add_type(
            SchemaDefinition::new(GAME)
                .with_field("player", TypeTag::NestedSchema(PLAYER))
                .with_field("players", TypeTag::map_of(TypeTag::NestedSchema(PLAYER)))
                .with_field("scores", TypeTag::sequence_of(primitive(PrimitiveKind::Number)))
                .with_field("tags", TypeTag::set_of(primitive(PrimitiveKind::String)))
                .with_field("turn", primitive(PrimitiveKind::UInt16))
                .with_field("title", primitive(PrimitiveKind::String)),
        )
        .expect("game layout is valid")
        .add_type(
            SchemaDefinition::new(VEC2)
                .with_field("x", primitive(PrimitiveKind::Float32))
                .with_field("y", primitive(PrimitiveKind::Float32)),
        )
        .expect("game layout is valid")
        .add_type(player_fields(PLAYER))
        .expect("game layout is valid")
        .add_type(
            player_fields(BOSS)
                .extending(PLAYER)
                .with_field("rage", primitive(PrimitiveKind::UInt8)),
        )
        .expect("game layout is valid")
        .set_root_type(GAME);
    registry
}

/// `Hero { hp: 100, name: "Ann" }`
pub fn hero_state() -> StateGraph {
    GraphBuilder::new(hero_types::HERO)
        .root_field(0, 100)
        .root_field(1, "Ann")
        .build()
}

/// A populated game:
///
/// ```text
/// player  = ref 1 Player { hp 100, "ann", position ref 2 Vec2 { 1, 2 }, alive }
/// players = { "ann": ref 1, "bob": ref 3 Boss { hp 500, "bob", position ref 2, alive, rage 3 } }
/// scores  = [1.5, 2], tags = { "red" }, turn = 7, title = "arena"
/// ```
pub fn game_state() -> StateGraph {
    use game_types::*;

    GraphBuilder::new(GAME)
        .instance(1, PLAYER)
        .instance(2, VEC2)
        .instance(3, BOSS)
        .field(1, 0, 100)
        .field(1, 1, "ann")
        .field(1, 2, Value::Ref(2))
        .field(1, 3, true)
        .field(2, 0, Value::Float32(1.0))
        .field(2, 1, Value::Float32(2.0))
        .field(3, 0, 500)
        .field(3, 1, "bob")
        .field(3, 2, Value::Ref(2))
        .field(3, 3, true)
        .field(3, 4, Value::UInt8(3))
        .root_field(0, Value::Ref(1))
        .root_field(1, map([("ann", Value::Ref(1)), ("bob", Value::Ref(3))]))
        .root_field(2, sequence([Value::Number(1.5), Value::Number(2.0)]))
        .root_field(3, set([Value::from("red")]))
        .root_field(4, Value::UInt16(7))
        .root_field(5, "arena")
        .build()
}
