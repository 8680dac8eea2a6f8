//! Wire-layout contracts of the converters
//!
//! The byte layout below is the cross-process wire contract: fixed-width
//! little-endian primitives, NUL-terminated byte strings, NUL-terminated
//! u16-unit wide strings, arguments in declaration order. Changing any of
//! these breaks every deployed peer.

#[cfg(test)]
mod tests {
    use marshal::{
        EventDataStream, MarshalMode, RawBuffer, SharedBuffer, BLOCK_SIZE,
    };

    #[test]
    fn test_u32_is_little_endian() {
        let mut stream = EventDataStream::new(MarshalMode::External);
        stream.writer().unwrap().write_u32(0xDEAD_BEEF).unwrap();
        assert_eq!(stream.payload(), &[0xEF, 0xBE, 0xAD, 0xDE]);
    }

    #[test]
    fn test_string_is_nul_terminated() {
        let mut stream = EventDataStream::new(MarshalMode::External);
        stream.writer().unwrap().write_str("hi").unwrap();
        assert_eq!(stream.payload(), b"hi\0");
    }

    #[test]
    fn test_wide_string_is_u16_units() {
        let mut stream = EventDataStream::new(MarshalMode::External);
        stream.writer().unwrap().write_wide_str("hi").unwrap();
        assert_eq!(stream.payload(), &[b'h', 0, b'i', 0, 0, 0]);
    }

    #[test]
    fn test_bool_is_one_byte() {
        let mut stream = EventDataStream::new(MarshalMode::External);
        {
            let mut writer = stream.writer().unwrap();
            writer.write_bool(true).unwrap();
            writer.write_bool(false).unwrap();
        }
        assert_eq!(stream.payload(), &[1, 0]);
    }

    #[test]
    fn test_arguments_round_trip_in_declaration_order() {
        // One call's argument list: (id: u16, gain: f64, label: str, on: bool)
        let mut stream = EventDataStream::new(MarshalMode::External);
        {
            let mut writer = stream.writer().unwrap();
            writer.write_u16(258).unwrap();
            writer.write_f64(-2.5).unwrap();
            writer.write_str("main").unwrap();
            writer.write_bool(true).unwrap();
        }

        let mut reader = stream.reader();
        assert_eq!(reader.read_u16(), Some(258));
        assert_eq!(reader.read_f64().map(f64::to_bits), Some((-2.5f64).to_bits()));
        assert_eq!(reader.read_str(), "main");
        assert_eq!(reader.read_bool(), Some(true));
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_release_on_zero_reserve() {
        let mut buffer = RawBuffer::from_slice(b"payload").unwrap();
        buffer.reserve(0, true).unwrap();
        assert!(!buffer.is_valid());
        assert_eq!(buffer.allocated_len(), 0);
    }

    #[test]
    fn test_shared_owner_growth_cannot_corrupt_the_other_view() {
        let mut first = SharedBuffer::from(RawBuffer::from_slice(b"stable").unwrap());
        let second = first.clone();

        let before = first.allocated_len();
        let after = first.reserve(8 * BLOCK_SIZE, true).unwrap();

        assert_eq!(after, before);
        assert_eq!(second.as_slice(), b"stable");
    }

    #[test]
    fn test_internal_copy_shares_external_copy_duplicates() {
        let mut internal = EventDataStream::with_payload(MarshalMode::Internal, b"x").unwrap();
        let internal_copy = internal.duplicate();
        assert_eq!(internal.buffer_ref_count(), 2);
        assert_eq!(internal_copy.buffer_ref_count(), 2);

        let mut external = EventDataStream::with_payload(MarshalMode::External, b"x").unwrap();
        let external_copy = external.duplicate();
        assert_eq!(external.buffer_ref_count(), 1);
        assert_eq!(external_copy.buffer_ref_count(), 1);
    }
}
