use crate::error::Error;
use crate::protocol::primitive::*;

#[test]
fn lenenc_lengths_survive_encoding() {
    for len in [0_u64, 250, 252, 65535, 65536, 16_777_215, 16_777_216, 1 << 32] {
        let mut out = Vec::new();
        write_int_lenenc(&mut out, len);
        let prefix = match out[0] {
            0xFC => 3,
            0xFD => 4,
            0xFE => 9,
            _ => 1,
        };
        assert_eq!(out.len(), prefix);
        let (decoded, rest) = read_int_lenenc(&out).unwrap();
        assert_eq!(decoded, len);
        assert!(rest.is_empty());
    }
}

#[test]
fn lenenc_prefix_widths() {
    let mut out = Vec::new();
    write_int_lenenc(&mut out, 251);
    assert_eq!(out, [0xFC, 0xFB, 0x00]);

    out.clear();
    write_int_lenenc(&mut out, 65535);
    assert_eq!(out, [0xFC, 0xFF, 0xFF]);

    out.clear();
    write_int_lenenc(&mut out, 16_777_215);
    assert_eq!(out, [0xFD, 0xFF, 0xFF, 0xFF]);

    out.clear();
    write_int_lenenc(&mut out, 1 << 32);
    assert_eq!(out, [0xFE, 0, 0, 0, 0, 1, 0, 0, 0]);
}

#[test]
fn null_marker() {
    let data = [NULL_MARKER, 0x01];
    let (prefix, rest) = read_length_prefix(&data).unwrap();
    assert_eq!(prefix, LengthPrefix::Null);
    assert_eq!(rest, &[0x01]);

    assert!(matches!(
        read_int_lenenc(&data),
        Err(Error::ProtocolCorruption(_))
    ));
}

#[test]
fn invalid_prefix() {
    assert!(matches!(
        read_length_prefix(&[0xFF]),
        Err(Error::ProtocolCorruption(_))
    ));
}

#[test]
fn truncated_input() {
    assert!(matches!(read_int_1(&[]), Err(Error::UnexpectedEof)));
    assert!(matches!(read_int_2(&[1]), Err(Error::UnexpectedEof)));
    assert!(matches!(read_int_3(&[1, 2]), Err(Error::UnexpectedEof)));
    assert!(matches!(read_int_4(&[1, 2, 3]), Err(Error::UnexpectedEof)));
    assert!(matches!(read_int_8(&[0; 7]), Err(Error::UnexpectedEof)));
    assert!(matches!(read_length_prefix(&[0xFC, 1]), Err(Error::UnexpectedEof)));
    assert!(matches!(read_string_lenenc(&[5, b'a']), Err(Error::UnexpectedEof)));
}

#[test]
fn fixed_width_reads() {
    let (v, rest) = read_int_2(&[0x34, 0x12, 0xAA]).unwrap();
    assert_eq!(v, 0x1234);
    assert_eq!(rest, &[0xAA]);

    let (v, _) = read_int_3(&[0x56, 0x34, 0x12]).unwrap();
    assert_eq!(v, 0x12_3456);

    let (v, _) = read_int_4(&[0x78, 0x56, 0x34, 0x12]).unwrap();
    assert_eq!(v, 0x1234_5678);

    let (v, _) = read_int_8(&u64::MAX.to_le_bytes()).unwrap();
    assert_eq!(v, u64::MAX);
}

#[test]
fn lenenc_string() {
    let mut out = Vec::new();
    write_bytes_lenenc(&mut out, b"hello");
    out.push(0x99);
    let (s, rest) = read_string_lenenc(&out).unwrap();
    assert_eq!(s, b"hello");
    assert_eq!(rest, &[0x99]);
}
