use super::{BufferError, NetworkBuffer};

#[test]
fn sub_buffer_keep_original() {
    let mut buffer = NetworkBuffer::new(&b"hello world"[..]);

    let sub = buffer.get_sub_buffer(6, 5, false).unwrap();

    assert_eq!(sub.as_slice(), b"world");
    assert_eq!(buffer.as_slice(), b"hello world");
}

#[test]
fn sub_buffer_remove() {
    macro_rules! test {
        ($input:literal, $offset:literal, $len:literal => $sub:literal, $rest:literal) => {
            let mut buffer = NetworkBuffer::new(&$input[..]);
            let sub = buffer.get_sub_buffer($offset, $len, true).unwrap();
            assert_eq!(sub.as_slice(), $sub);
            assert_eq!(buffer.as_slice(), $rest);
        };
    }

    test!(b"hello world", 0, 6 => b"hello ", b"world");
    test!(b"hello world", 5, 6 => b" world", b"hello");
    test!(b"hello world", 2, 3 => b"llo", b"he world");
    test!(b"hello world", 0, 11 => b"hello world", b"");
    test!(b"hello world", 4, 0 => b"", b"hello world");
}

#[test]
fn sub_buffer_out_of_bounds() {
    let mut buffer = NetworkBuffer::new(&b"abc"[..]);

    let err = buffer.get_sub_buffer(2, 2, true).unwrap_err();
    assert_eq!(err, BufferError::OutOfBounds { offset: 2, length: 2, len: 3 });

    let err = buffer.get_sub_buffer(usize::MAX, 2, false).unwrap_err();
    assert!(matches!(err, BufferError::OutOfBounds { .. }));

    // failed removal leaves the buffer intact
    assert_eq!(buffer.as_slice(), b"abc");
}

#[test]
fn copy_to() {
    let buffer = NetworkBuffer::new(&b"abcdef"[..]);
    let mut dest = [0u8; 4];

    buffer.copy_to(&mut dest, 2, 3).unwrap();
    assert_eq!(&dest, b"cde\0");

    let err = buffer.copy_to(&mut dest, 0, 5).unwrap_err();
    assert_eq!(err, BufferError::DestinationTooSmall { needed: 5, available: 4 });

    let err = buffer.copy_to(&mut dest, 4, 3).unwrap_err();
    assert!(matches!(err, BufferError::OutOfBounds { .. }));
}
