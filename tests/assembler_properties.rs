//! Property tests for the receive assembler: garbage, corruption and
//! arbitrary chunking of the inbound stream.

use bsb_engine::encoding::{FrameEncoder, FRAME_START, MAX_FRAME_LEN, MAX_PAYLOAD_LEN};
use bsb_engine::{Address, Command, FieldId, Packet, ReceiveAssembler};
use proptest::prelude::*;

fn not_start() -> impl Strategy<Value = u8> {
    any::<u8>().prop_filter("no start byte", |b| *b != FRAME_START)
}

fn arb_command() -> impl Strategy<Value = Command> {
    prop_oneof![
        Just(Command::Inf),
        Just(Command::Ret),
        Just(Command::Ack),
        Just(Command::Nack),
        Just(Command::Get),
        Just(Command::Set),
    ]
}

fn arb_packet() -> impl Strategy<Value = Packet> {
    (
        0u8..=0x7F,
        0u8..=0x7F,
        arb_command(),
        any::<u32>(),
        proptest::collection::vec(not_start(), 0..=MAX_PAYLOAD_LEN),
    )
        .prop_map(|(src, dst, command, field, payload)| {
            Packet::new(
                Address::new(src).unwrap(),
                Address::new(dst).unwrap(),
                command,
                FieldId::new(field),
                payload,
            )
        })
}

proptest! {
    /// Bytes without a start byte are discarded and never become a packet.
    #[test]
    fn garbage_never_yields_packet(garbage in proptest::collection::vec(not_start(), 0..256)) {
        let mut assembler = ReceiveAssembler::new();
        prop_assert!(assembler.feed(&garbage).is_empty());
        prop_assert_eq!(assembler.pending(), 0);
        prop_assert_eq!(assembler.stats().bytes_discarded as usize, garbage.len());
    }

    /// Arbitrary input never panics and never buffers more than one frame.
    #[test]
    fn arbitrary_input_stays_bounded(data in proptest::collection::vec(any::<u8>(), 0..512)) {
        let mut assembler = ReceiveAssembler::new();
        for chunk in data.chunks(7) {
            assembler.feed(chunk);
            prop_assert!(assembler.pending() < MAX_FRAME_LEN);
        }
    }

    /// A frame behind garbage is always recovered intact.
    #[test]
    fn frame_after_garbage_is_recovered(
        garbage in proptest::collection::vec(not_start(), 0..64),
        packet in arb_packet(),
    ) {
        let mut data = garbage;
        data.extend(FrameEncoder::encode(&packet).unwrap());

        let packets = ReceiveAssembler::new().feed(&data);
        prop_assert_eq!(packets, vec![packet]);
    }

    /// Splitting the stream at any point does not change what is decoded.
    #[test]
    fn chunking_does_not_matter(packet in arb_packet(), split in 0usize..MAX_FRAME_LEN) {
        let frame = FrameEncoder::encode(&packet).unwrap();
        let split = split.min(frame.len());

        let mut assembler = ReceiveAssembler::new();
        let mut packets = assembler.feed(&frame[..split]);
        packets.extend(assembler.feed(&frame[split..]));
        prop_assert_eq!(packets, vec![packet]);
    }

    /// A corrupted frame is dropped and the next good frame still decodes.
    #[test]
    fn corruption_is_dropped_then_resynchronized(
        bad in arb_packet(),
        good in arb_packet(),
        position in 4usize..MAX_FRAME_LEN,
        mask in 1u8..=255,
    ) {
        prop_assume!(bad != good);
        let mut corrupted = FrameEncoder::encode(&bad).unwrap();
        let index = position % (corrupted.len() - 4) + 4;
        corrupted[index] ^= mask;

        let mut data = corrupted;
        data.extend(FrameEncoder::encode(&good).unwrap());
        // flush any false start found inside the corrupted bytes
        data.extend([0u8; MAX_FRAME_LEN]);

        let mut assembler = ReceiveAssembler::new();
        let packets = assembler.feed(&data);
        prop_assert!(!packets.contains(&bad));
        prop_assert!(packets.contains(&good));
        prop_assert!(assembler.stats().frames_dropped >= 1);
    }
}
