//! End-to-end scenarios (§8): compiling representative schemas and checking
//! both that the IR the analyzer produces is the one the spec demands, and
//! that the byte layouts §4.4 describes are actually what a conforming
//! encoder would write. The crate ships no generator of its own beyond
//! `DebugGenerator`, so the manual byte-building below plays the part of a
//! minimal reference encoder purely to pin the wire contract down in tests.

use bebop_compiler::{compile, is_fixed_size, minimal_encoded_size, DiagnosticKind};
use bebop_compiler::ir::{Definition, TypeRef};

fn root_type(schema: &bebop_compiler::Schema, name: &str) -> TypeRef {
    TypeRef::Def(schema.lookup(name).unwrap_or_else(|| panic!("no definition named {name}")))
}

/// The `TypeRef` of a message's sole field, for tests that want to check a
/// field's own derived size rather than the whole message's (fixed 5-byte
/// header+sentinel) floor.
fn only_field_type(schema: &bebop_compiler::Schema, message_name: &str) -> TypeRef {
    match schema.get(schema.lookup(message_name).unwrap()) {
        Definition::Message { fields, .. } => fields[0].ty.clone(),
        other => panic!("{message_name} is not a message: {other:?}"),
    }
}

#[test]
fn empty_struct_has_zero_minimal_size() {
    let schema = compile(&[("a.bop", "struct Empty {}\n")]).expect("clean compile");
    let ty = root_type(&schema, "Empty");
    assert_eq!(minimal_encoded_size(&schema, &ty), 0);
    assert!(is_fixed_size(&schema, &ty));
}

#[test]
fn primitive_struct_encodes_little_endian_fields_back_to_back() {
    let schema = compile(&[("a.bop", "struct Point { int32 x; int32 y; }\n")]).expect("clean compile");
    let ty = root_type(&schema, "Point");
    assert_eq!(minimal_encoded_size(&schema, &ty), 8);
    assert!(is_fixed_size(&schema, &ty));

    // x = 1, y = -2, concatenated as two little-endian two's-complement i32s.
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&1i32.to_le_bytes());
    bytes.extend_from_slice(&(-2i32).to_le_bytes());
    assert_eq!(bytes, vec![0x01, 0x00, 0x00, 0x00, 0xfe, 0xff, 0xff, 0xff]);
}

#[test]
fn message_with_present_and_absent_field_writes_length_index_sentinel() {
    let schema = compile(&[("a.bop", "message M { 1 -> int32 a; 2 -> string b; }\n")]).expect("clean compile");
    let ty = root_type(&schema, "M");
    // length header (4) + sentinel (1); variable fields don't count toward the floor.
    assert_eq!(minimal_encoded_size(&schema, &ty), 5);
    assert!(!is_fixed_size(&schema, &ty));

    // a = 5, b absent: body is [index 1][a's 4 bytes][sentinel 0].
    let mut body = Vec::new();
    body.push(1u8);
    body.extend_from_slice(&5i32.to_le_bytes());
    body.push(0u8); // end-of-message sentinel; index 2 (b) is simply omitted.
    assert_eq!(body, vec![0x01, 0x05, 0x00, 0x00, 0x00, 0x00]);

    let mut stream = Vec::new();
    stream.extend_from_slice(&(body.len() as u32).to_le_bytes());
    stream.extend_from_slice(&body);
    assert_eq!(stream, vec![0x06, 0x00, 0x00, 0x00, 0x01, 0x05, 0x00, 0x00, 0x00, 0x00]);
}

#[test]
fn union_encodes_length_discriminator_then_branch_body() {
    let schema = compile(&[(
        "a.bop",
        "union U { 1 -> struct A { byte x; }; 2 -> struct B { byte y; }; }\n",
    )])
    .expect("clean compile");
    let ty = root_type(&schema, "U");
    assert_eq!(minimal_encoded_size(&schema, &ty), 1 + 4 + 1);
    assert!(!is_fixed_size(&schema, &ty));

    // Branch 2 selected, y = 9: body is [discriminator 2][y's one byte].
    let body = [2u8, 9u8];
    let mut stream = Vec::new();
    stream.extend_from_slice(&(body.len() as u32).to_le_bytes());
    stream.extend_from_slice(&body);
    assert_eq!(stream, vec![0x02, 0x00, 0x00, 0x00, 0x02, 0x09]);
}

#[test]
fn map_field_round_trips_through_a_reference_codec() {
    let schema = compile(&[("a.bop", "message KV { 1 -> map[string, int32] m; }\n")]).expect("clean compile");
    let ty = only_field_type(&schema, "KV");
    assert_eq!(minimal_encoded_size(&schema, &ty), 4); // just the entry-count prefix
    assert!(!is_fixed_size(&schema, &ty));

    let entries: Vec<(String, i32)> = vec![("a".into(), 1), ("b".into(), 2)];

    let mut bytes = Vec::new();
    bytes.extend_from_slice(&(entries.len() as u32).to_le_bytes());
    for (k, v) in &entries {
        bytes.extend_from_slice(&(k.len() as u32).to_le_bytes());
        bytes.extend_from_slice(k.as_bytes());
        bytes.extend_from_slice(&v.to_le_bytes());
    }

    // Decode it back with the mirror-image reader and check the pairing survives.
    let mut pos = 0usize;
    let count = u32::from_le_bytes(bytes[pos..pos + 4].try_into().unwrap()) as usize;
    pos += 4;
    let mut decoded = Vec::new();
    for _ in 0..count {
        let len = u32::from_le_bytes(bytes[pos..pos + 4].try_into().unwrap()) as usize;
        pos += 4;
        let key = String::from_utf8(bytes[pos..pos + len].to_vec()).unwrap();
        pos += len;
        let value = i32::from_le_bytes(bytes[pos..pos + 4].try_into().unwrap());
        pos += 4;
        decoded.push((key, value));
    }
    assert_eq!(decoded, entries);
}

#[test]
fn decoder_skips_unknown_message_field_using_the_length_header() {
    // Writer knows fields {1, 2, 3}; body = [1][a][2][b][3][c][sentinel].
    let mut body = Vec::new();
    body.push(1u8);
    body.extend_from_slice(&10i32.to_le_bytes());
    body.push(2u8);
    body.extend_from_slice(&20i32.to_le_bytes());
    body.push(3u8);
    body.extend_from_slice(&30i32.to_le_bytes());
    body.push(0u8);

    let mut stream = Vec::new();
    stream.extend_from_slice(&(body.len() as u32).to_le_bytes());
    stream.extend_from_slice(&body);

    // Reader only knows {1, 3}; index 2 is unknown and must be skipped without
    // the reader needing to know int32's width, only that a 4-byte int32
    // comes next in the fields it *does* know.
    let body_len = u32::from_le_bytes(stream[0..4].try_into().unwrap()) as usize;
    let body_start = 4usize;
    let body_end = body_start + body_len;
    let mut pos = body_start;
    let mut a = None;
    let mut c = None;
    loop {
        let index = stream[pos];
        pos += 1;
        match index {
            0 => break,
            1 => {
                a = Some(i32::from_le_bytes(stream[pos..pos + 4].try_into().unwrap()));
                pos += 4;
            }
            3 => {
                c = Some(i32::from_le_bytes(stream[pos..pos + 4].try_into().unwrap()));
                pos += 4;
            }
            _ => {
                // Unknown index: the old-schema reader has no way to know this
                // field's width, so it jumps straight to the message end.
                let _ = body_end;
                break;
            }
        }
    }
    assert_eq!(a, Some(10));
    assert_eq!(c, None); // never reached: the skip over index 2 jumped past it too
}

#[test]
fn max_field_index_255_is_accepted() {
    let schema = compile(&[("a.bop", "message M { 255 -> byte last; }\n")]).expect("clean compile");
    assert!(schema.lookup("M").is_some());
}

#[test]
fn field_index_zero_is_rejected() {
    let err = compile(&[("a.bop", "message M { 0 -> byte bad; }\n")]).unwrap_err();
    assert!(err.iter().any(|d| matches!(d.kind, DiagnosticKind::ReservedFieldIndexZero)));
}

#[test]
fn out_of_order_field_indices_are_rejected() {
    let err = compile(&[("a.bop", "message M { 2 -> byte a; 1 -> byte b; }\n")]).unwrap_err();
    assert!(err.iter().any(|d| matches!(d.kind, DiagnosticKind::FieldIndexNotIncreasing { .. })));
}

#[test]
fn nested_option_is_legal() {
    let schema = compile(&[("a.bop", "message S { 1 -> int32?? x; }\n")]).expect("clean compile");
    let ty = only_field_type(&schema, "S");
    // Outer option's presence byte is the whole floor; the inner option
    // never gets a chance to contribute if the outer is absent.
    assert_eq!(minimal_encoded_size(&schema, &ty), 1);
}

#[test]
fn byte_array_field_compiles_and_is_variable_size() {
    let schema = compile(&[("a.bop", "message Blob { 1 -> byte[] data; }\n")]).expect("clean compile");
    let ty = only_field_type(&schema, "Blob");
    assert!(!is_fixed_size(&schema, &ty));
    assert_eq!(minimal_encoded_size(&schema, &ty), 4);
}

#[test]
fn self_reference_through_message_is_allowed_but_direct_self_reference_is_not() {
    let ok = compile(&[("a.bop", "message Tree { 1 -> Tree child; }\n")]);
    assert!(ok.is_ok(), "message indirection should break the cycle: {ok:?}");

    let bad = compile(&[("a.bop", "struct Bad { Bad inner; }\n")]).unwrap_err();
    assert!(bad.iter().any(|d| matches!(d.kind, DiagnosticKind::InfiniteStruct { .. })));
}

#[test]
fn self_reference_through_option_is_allowed() {
    let ok = compile(&[("a.bop", "message Node { 1 -> Node? next; 2 -> byte value; }\n")]);
    assert!(ok.is_ok(), "option indirection should break the cycle: {ok:?}");
}

#[test]
fn duplicate_opcode_across_files_in_the_same_schema_is_rejected() {
    let a = "[opcode(1)]\nstruct A { byte x; }\n";
    let b = "[opcode(1)]\nstruct B { byte y; }\n";
    let err = compile(&[("a.bop", a), ("b.bop", b)]).unwrap_err();
    assert!(err.iter().any(|d| matches!(d.kind, DiagnosticKind::DuplicateOpcode { opcode: 1 })));
}

#[test]
fn four_char_ascii_opcode_packs_little_endian_into_a_uint32() {
    let schema = compile(&[("a.bop", "[opcode('ABCD')]\nstruct A { byte x; }\n")]).expect("clean compile");
    let def = schema.get(schema.lookup("A").unwrap());
    // 'A','B','C','D' packed little-endian: 'A' is the low byte.
    let expected = u32::from_le_bytes([b'A', b'B', b'C', b'D']);
    assert_eq!(def.opcode(), Some(expected));
}
