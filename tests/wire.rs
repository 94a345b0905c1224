use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;

use leon::codec::tag::{self, Kind};
use leon::codec::{Decoder, Encodable, Encoder, Tag, from_slice, to_vec};
use leon::{LeonError, Map, Value};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("leon-{}-{name}.out", std::process::id()))
}

struct MyObj {
    a: i64,
}

impl Encodable for MyObj {
    fn encode_to<'e, W: Write>(
        &self,
        encoder: &'e mut Encoder<W>,
    ) -> Result<&'e mut Encoder<W>, LeonError> {
        encoder.encode_integer(self.a)
    }
}

#[test]
fn basic_file_round_trip() {
    let path = temp_path("basic");
    let map = Map::from([(Value::from(0xCAFE_BABEi64), Value::from("class file magic number"))]);
    let list = vec![Value::from(true), Value::from(1.0), Value::from(945)];

    let mut enc = Encoder::create(&path).unwrap();
    enc.encode_string("LEON is simple")
        .unwrap()
        .encode_list(&list)
        .unwrap()
        .encode_map(&map)
        .unwrap();
    enc.close().unwrap();

    let mut dec = Decoder::open(&path).unwrap();
    assert_eq!(dec.decode_string().unwrap(), "LEON is simple");
    assert_eq!(dec.decode_list().unwrap(), list);
    assert_eq!(dec.decode_map().unwrap(), map);
    assert_eq!(dec.peek_tag().unwrap(), Tag::Eof);
    dec.close().unwrap();
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn pack_unpack_sequence() {
    let long_str = "Hello loooooooooooooooooooooooong!";
    let blob = vec![0xCAu8, 0xFE, 0xBA, 0xBE];
    let sub_list = vec![Value::from(false), Value::from(78)];
    let list = vec![
        Value::from(3),
        Value::from(true),
        Value::Null,
        Value::from("abc"),
        Value::from(blob.clone()),
        Value::from(long_str),
        Value::from(sub_list.clone()),
    ];
    let long_list = vec![true; 52];
    let map = Map::from([
        (Value::from("One"), Value::from(1)),
        (Value::from(42), Value::from(sub_list)),
        (Value::from(true), Value::from(1.0f32)),
        (Value::from(false), Value::from(2.0)),
    ]);

    let mut enc = Encoder::new(Vec::new());
    for i in -70..70 {
        enc.encode_integer(i).unwrap();
    }
    enc.encode_integer(-741)
        .unwrap()
        .encode(&MyObj { a: 7 })
        .unwrap()
        .encode_string("Hello!")
        .unwrap()
        .encode_string(long_str)
        .unwrap()
        .encode_bool(true)
        .unwrap()
        .encode_null()
        .unwrap()
        .encode_list(&list)
        .unwrap()
        .encode_list(&long_list)
        .unwrap()
        .encode_map(&map)
        .unwrap();
    let bytes = enc.into_inner().unwrap();

    let mut dec = Decoder::new(&bytes[..]);
    for i in -70..70 {
        assert_eq!(dec.decode_integer().unwrap(), i);
    }
    assert_eq!(dec.decode_integer().unwrap(), -741);
    assert_eq!(dec.decode_integer().unwrap(), 7);
    assert_eq!(dec.decode_string().unwrap(), "Hello!");
    assert_eq!(dec.decode_string().unwrap(), long_str);
    assert!(dec.decode_bool().unwrap());
    dec.decode_null().unwrap();

    let decoded = dec.decode_list().unwrap();
    assert_eq!(decoded, list);
    assert_eq!(decoded[4].as_bytes(), Some(&blob[..]));

    let decoded_long = dec.decode_list().unwrap();
    assert_eq!(decoded_long.len(), 52);
    assert!(decoded_long.iter().all(|v| *v == Value::Bool(true)));

    let decoded_map = dec.decode_map().unwrap();
    assert_eq!(decoded_map, map);
    assert_eq!(dec.next_value().unwrap(), None);
}

#[test]
fn tag_level_api() {
    let path = temp_path("raw");
    let list = vec![Value::from(3), Value::from(true), Value::Null, Value::from(2.13)];
    let map = Map::from([
        (Value::from("One"), Value::from(1)),
        (Value::from(true), Value::from(1.0f32)),
        (Value::from(42), Value::from("123456789")),
        (Value::from(false), Value::from(2.0)),
    ]);
    let list2 = vec![Value::from(false), Value::from(784_599), Value::Null];
    let map2: HashMap<&str, i64> = HashMap::from([("Two", 2), ("Three", 3)]);

    let mut enc = Encoder::create(&path).unwrap();
    enc.encode_list_tag(list.len()).unwrap();
    for item in &list {
        enc.encode(item).unwrap();
    }
    enc.encode_string("Hello").unwrap();
    enc.encode_map_tag(map.len()).unwrap();
    for (k, v) in &map {
        enc.encode(k).unwrap().encode(v).unwrap();
    }
    enc.encode_list(&list2)
        .unwrap()
        .encode(&map2)
        .unwrap()
        .encode_list(&list2)
        .unwrap()
        .encode_bytes_tag(3)
        .unwrap()
        .encode_raw_bytes(&[1, 2])
        .unwrap()
        .encode_raw_bytes(&[3])
        .unwrap()
        .encode_bytes(&[0u8; 4096])
        .unwrap()
        .encode_string("END")
        .unwrap();
    enc.close().unwrap();

    let mut dec = Decoder::open(&path).unwrap();

    let tag = dec.peek_tag().unwrap();
    assert!(tag.is_list());
    assert_eq!(dec.decode_list_with_tag(tag).unwrap(), list);

    let tag = dec.peek_tag().unwrap();
    assert!(tag.is_string());
    dec.skip(tag).unwrap();

    let tag = dec.peek_tag().unwrap();
    assert!(tag.is_map());
    dec.skip(tag).unwrap();

    // walk into list2 and stop at its second element
    let tag = dec.peek_tag().unwrap();
    let mut remaining = dec.decode_list_length_with_tag(tag).unwrap();
    let mut tag = dec.peek_tag().unwrap();
    while remaining != 2 {
        dec.skip(tag).unwrap();
        tag = dec.peek_tag().unwrap();
        remaining -= 1;
    }
    assert!(tag.is_int());
    assert_eq!(dec.decode_integer_with_tag(tag).unwrap(), 784_599);
    dec.decode_null().unwrap();

    let tag = dec.peek_tag().unwrap();
    assert!(tag.is_map());
    let size = dec.decode_map_size_with_tag(tag).unwrap();
    assert_eq!(size, 2);
    let mut decoded = Map::new();
    for _ in 0..size {
        let key = dec.decode_value().unwrap();
        let value = dec.decode_value().unwrap();
        decoded.insert(key, value);
    }
    assert_eq!(decoded, Map::from([("Two", 2), ("Three", 3)]));

    let tag = dec.peek_tag().unwrap();
    assert!(tag.is_list());
    dec.skip(tag).unwrap();

    let tag = dec.peek_tag().unwrap();
    assert!(tag.is_bytes());
    let size = dec.decode_bytes_size_with_tag(tag).unwrap();
    let mut buf = vec![0u8; size];
    let mut filled = 0;
    while filled < size {
        let n = dec.decode_raw_bytes(&mut buf[filled..]).unwrap();
        assert_ne!(n, 0, "stream ended inside raw bytes");
        filled += n;
    }
    assert_eq!(buf, [1, 2, 3]);

    let tag = dec.peek_tag().unwrap();
    assert!(tag.is_bytes());
    dec.skip(tag).unwrap();

    let tag = dec.peek_tag().unwrap();
    assert!(tag.is_string());
    assert_eq!(dec.decode_string_with_tag(tag).unwrap(), "END");
    assert!(!dec.skip_value().unwrap());
    drop(dec);
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn integer_boundaries_and_sizes() {
    let cases: [(i64, usize); 8] = [
        (-32, 1),
        (31, 1),
        (-33, 2),
        (32, 2),
        (4095, 2),
        (4096, 3),
        (i64::MIN, 10),
        (i64::MAX, 10),
    ];
    for (value, len) in cases {
        let bytes = to_vec(&value).unwrap();
        assert_eq!(bytes.len(), len, "size of {value}");
        assert_eq!(from_slice(&bytes).unwrap(), Value::Integer(value));
    }
}

#[test]
fn string_boundary_31_32() {
    let short = "s".repeat(31);
    let long = "s".repeat(32);
    let short_bytes = to_vec(short.as_str()).unwrap();
    let long_bytes = to_vec(long.as_str()).unwrap();
    assert_eq!(short_bytes[0], 0x7F);
    assert_eq!(short_bytes.len(), 32);
    assert_eq!(&long_bytes[..3], &[tag::STRING, 0xA0, 0x00]);
    assert_eq!(long_bytes.len(), 35);
    assert_eq!(from_slice(&long_bytes).unwrap(), Value::String(long));
}

#[test]
fn list_boundary_15_16() {
    let short = vec![Value::Null; 15];
    let long = vec![Value::Null; 16];
    assert_eq!(to_vec(&short).unwrap()[0], 0x5F);
    assert_eq!(&to_vec(&long).unwrap()[..3], &[tag::LIST, 0xA0, 0x00]);
    assert_eq!(from_slice(&to_vec(&long).unwrap()).unwrap(), Value::List(long));
}

#[test]
fn float_bits_preserved() {
    for bits in [
        f64::NAN.to_bits(),
        0x7FF8_0000_0000_0001,
        f64::INFINITY.to_bits(),
        f64::NEG_INFINITY.to_bits(),
        (-0.0f64).to_bits(),
        f64::MIN_POSITIVE.to_bits(),
    ] {
        let bytes = to_vec(&f64::from_bits(bits)).unwrap();
        let decoded = Decoder::new(&bytes[..]).decode_double().unwrap();
        assert_eq!(decoded.to_bits(), bits);
    }
    for bits in [
        f32::NAN.to_bits(),
        0x7FC0_0001,
        f32::INFINITY.to_bits(),
        f32::NEG_INFINITY.to_bits(),
        (-0.0f32).to_bits(),
        1.5f32.to_bits(),
    ] {
        let bytes = to_vec(&f32::from_bits(bits)).unwrap();
        let decoded = Decoder::new(&bytes[..]).decode_float32().unwrap();
        assert_eq!(decoded.to_bits(), bits);
    }
}

#[test]
fn reserved_tags_rejected() {
    for byte in 0x49u8..=0x4F {
        assert_eq!(tag::classify(byte), None);
        let input = [byte];
        match Decoder::new(&input[..]).peek_tag() {
            Err(LeonError::InvalidTag { byte: b, offset: 0 }) => assert_eq!(b, byte),
            other => panic!("0x{byte:02X}: expected invalid tag, got {other:?}"),
        }
    }
    assert_eq!(tag::classify(0x48), Some(Kind::Map));
}

fn sample() -> Value {
    Value::from(vec![
        Value::from("LEON is simple"),
        Value::from(-741),
        Value::from(i64::MAX),
        Value::from(1.5f32),
        Value::from(-2.25),
        Value::from(vec![0xABu8; 40]),
        Value::Map(Map::from([
            (Value::from("nested"), Value::from(vec![Value::Null, Value::from(false)])),
            (Value::from(7), Value::from("x".repeat(33))),
        ])),
    ])
}

#[test]
fn truncation_at_every_byte() {
    let bytes = to_vec(&sample()).unwrap();
    for cut in 1..bytes.len() {
        let err = from_slice(&bytes[..cut]).unwrap_err();
        assert!(err.is_truncated(), "cut at {cut}: {err}");

        let mut dec = Decoder::new(&bytes[..cut]);
        let err = dec.skip_value().unwrap_err();
        assert!(err.is_truncated(), "skip cut at {cut}: {err}");
    }
}

#[test]
fn skip_matches_decode_length() {
    let value = sample();
    let mut bytes = to_vec(&value).unwrap();
    let value_len = bytes.len() as u64;
    bytes.extend(to_vec(&0xCAFEi64).unwrap());

    let mut decoding = Decoder::new(&bytes[..]);
    assert_eq!(decoding.decode_value().unwrap(), value);
    assert_eq!(decoding.position(), value_len);

    let mut skipping = Decoder::new(&bytes[..]);
    assert!(skipping.skip_value().unwrap());
    assert_eq!(skipping.position(), value_len);
    assert_eq!(skipping.decode_integer().unwrap(), 0xCAFE);
}

#[test]
fn values_iterator_reads_whole_stream() {
    let mut enc = Encoder::new(Vec::new());
    enc.encode_integer(1).unwrap().encode_value(&sample()).unwrap().encode_null().unwrap();
    let bytes = enc.into_inner().unwrap();

    let values = Decoder::new(&bytes[..])
        .values()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(values, vec![Value::from(1), sample(), Value::Null]);
}

#[test]
fn bytes_written_tracks_output() {
    let mut enc = Encoder::new(Vec::new());
    enc.encode_integer(945).unwrap();
    assert_eq!(enc.bytes_written(), 2);
    enc.encode_string("abc").unwrap();
    assert_eq!(enc.bytes_written(), 6);
}
