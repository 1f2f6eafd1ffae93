//! End-to-end scenarios exercising the public API: parse, load, and
//! serialize a document the way a real caller would, rather than poking
//! at individual parser internals.

use clausewitz_tree::{load_bytes, parse_binary, parse_text, save_to_string, NoLookup, Value};
use std::io::Write;

#[test]
fn flat_object_with_array_and_scalars() {
    let input = b"tag=FRA\ncapital=123\narmy_tradition=45.678\nat_war=yes\n";
    let value = parse_text(input).unwrap();

    assert_eq!(value.get("tag").unwrap().as_str(), Some("FRA"));
    assert_eq!(value.get("capital").unwrap().as_float(), Some(123.0));
    assert_eq!(value.get("at_war").unwrap().as_bool(), Some(true));
}

#[test]
fn nested_object_and_duplicate_keys_preserved() {
    let input = b"army={ name=\"1st Army\" unit=1 }\narmy={ name=\"2nd Army\" unit=2 }\n";
    let value = parse_text(input).unwrap();

    let armies = value.collect("army");
    assert_eq!(armies.len(), 2);
    assert_eq!(
        armies[0].get("name").unwrap().as_str(),
        Some("1st Army")
    );
    assert_eq!(
        armies[1].get("name").unwrap().as_str(),
        Some("2nd Army")
    );
}

#[test]
fn array_of_arrays_and_hsv_literal() {
    let input = b"grid={ {1 2} {3 4} }\ncolor=hsv{ 0.5 1.0 1.0 }\n";
    let value = parse_text(input).unwrap();

    match value.get("grid").unwrap() {
        Value::Array(rows) => {
            assert_eq!(rows.len(), 2);
            assert!(matches!(rows[0], Value::Array(ref inner) if inner.len() == 2));
        }
        other => panic!("expected array, got {other:?}"),
    }
    assert!(matches!(value.get("color").unwrap(), Value::Hsv(..)));
}

#[test]
fn header_line_is_discarded() {
    let input = b"EU4txt\r\nbar=foo\r\n";
    let value = parse_text(input).unwrap();
    assert_eq!(value.get("bar").unwrap().as_str(), Some("foo"));
}

#[test]
fn binary_hidden_date_and_empty_subgroup_round_trip() {
    let lookup = |id: u16| match id {
        0x284d => Some("date".to_string()),
        0xdddd => Some("foo".to_string()),
        _ => None,
    };

    let date_doc = [
        0x4d, 0x28, 0x01, 0x00, 0x0c, 0x00, 0x10, 0x77, 0x5d, 0x03,
    ];
    let value = parse_binary(&date_doc, lookup).unwrap();
    assert!(matches!(value.get("date").unwrap(), Value::Date(_)));

    let empty_group_doc = [0xdd, 0xdd, 0x01, 0x00, 0x03, 0x00, 0x04, 0x00];
    let value = parse_binary(&empty_group_doc, lookup).unwrap();
    match value.get("foo").unwrap() {
        Value::Record(pairs) => assert!(pairs.is_empty()),
        other => panic!("expected empty record, got {other:?}"),
    }
}

#[test]
fn load_unwraps_zip_and_dispatches_to_text() {
    let mut buf = Vec::new();
    {
        let cursor = std::io::Cursor::new(&mut buf);
        let mut writer = zip::ZipWriter::new(cursor);
        let options: zip::write::FileOptions<()> = zip::write::FileOptions::default();
        writer.start_file("gamestate.eu4", options).unwrap();
        writer.write_all(b"tag=FRA\n").unwrap();
        writer.finish().unwrap();
    }

    let value = load_bytes(&buf, &[], &[], NoLookup).unwrap();
    assert_eq!(value.get("tag").unwrap().as_str(), Some("FRA"));
}

#[test]
fn load_is_fatal_when_neither_header_matches() {
    let data = b"????\r\ntag=FRA\r\n".to_vec();
    let err = load_bytes(&data, b"EU4bin", b"EU4txt", NoLookup).unwrap_err();
    assert!(matches!(err, clausewitz_tree::Error::InvalidHeader { .. }));
}

#[test]
fn parse_then_serialize_round_trips_scalar_shapes() {
    let input = b"tag=FRA\nflag=yes\ncapital=1.500\nwhen=1444.11.11\n";
    let value = parse_text(input).unwrap();
    let text = save_to_string(&value).unwrap();

    let reparsed = parse_text(text.as_bytes()).unwrap();
    assert_eq!(reparsed.get("tag").unwrap().as_str(), Some("FRA"));
    assert_eq!(reparsed.get("flag").unwrap().as_bool(), Some(true));
    assert_eq!(reparsed.get("capital").unwrap().as_float(), Some(1.5));
    assert!(matches!(reparsed.get("when").unwrap(), Value::Date(_)));
}

#[test]
fn depth_limit_turns_runaway_nesting_into_an_error() {
    let mut input = String::new();
    for _ in 0..10 {
        input.push_str("foo={ ");
    }
    input.push_str("1 ");
    for _ in 0..10 {
        input.push('}');
    }

    let err = clausewitz_tree::parse_text_with_max_depth(input.as_bytes(), 3).unwrap_err();
    assert!(matches!(err, clausewitz_tree::Error::DepthLimitExceeded { .. }));
}
