use comtrace_frame::{Frame, FrameDecoder, ACK, CHECKSUM_SIZE, DLE, ETX, NAK, PREAMBLE, STX};
use proptest::prelude::*;
use proptest::sample::Index;

#[derive(Debug, Clone)]
struct Encoded {
    opcode: u8,
    payload: Vec<u8>,
    wire: Vec<u8>,
}

fn acknowledge() -> impl Strategy<Value = Encoded> {
    prop_oneof![Just(ACK), Just(NAK)].prop_map(|opcode| Encoded {
        opcode,
        payload: Vec::new(),
        wire: vec![PREAMBLE, opcode],
    })
}

fn legacy() -> impl Strategy<Value = Encoded> {
    (
        prop_oneof![0x00u8..=0x1F, Just(0xC4u8)],
        prop::collection::vec(any::<u8>(), 0..32),
    )
        .prop_map(|(opcode, payload)| {
            let mut wire = vec![PREAMBLE, STX, opcode];
            for &byte in &payload {
                if byte == DLE || byte == ETX {
                    wire.push(DLE);
                }
                wire.push(byte);
            }
            wire.push(ETX);
            Encoded {
                opcode,
                payload,
                wire,
            }
        })
}

fn length_prefixed() -> impl Strategy<Value = Encoded> {
    (
        (0x20u8..=0xFF).prop_filter("0xC4 uses legacy framing", |op| *op != 0xC4),
        prop::collection::vec(any::<u8>(), 0..64),
        any::<[u8; CHECKSUM_SIZE]>(),
    )
        .prop_map(|(opcode, payload, checksum)| {
            let mut wire = vec![PREAMBLE, STX, opcode, payload.len() as u8];
            wire.extend_from_slice(&payload);
            wire.extend_from_slice(&checksum);
            wire.push(ETX);
            Encoded {
                opcode,
                payload,
                wire,
            }
        })
}

fn encoded_frame() -> impl Strategy<Value = Encoded> {
    prop_oneof![acknowledge(), legacy(), length_prefixed()]
}

fn decode_in_chunks(wire: &[u8], cuts: &[usize]) -> Vec<Frame> {
    let mut decoder = FrameDecoder::new();
    let mut frames = Vec::new();
    let mut start = 0;
    for &cut in cuts.iter().chain(std::iter::once(&wire.len())) {
        decoder.feed(&wire[start..cut]);
        start = cut;
        while let Some(frame) = decoder.decode_next().expect("valid stream") {
            frames.push(frame);
        }
    }
    assert!(decoder.is_idle());
    frames
}

proptest! {
    #[test]
    fn chunk_boundaries_do_not_change_frames(
        encoded in prop::collection::vec(encoded_frame(), 1..8),
        raw_cuts in prop::collection::vec(any::<Index>(), 0..16),
    ) {
        let wire: Vec<u8> = encoded.iter().flat_map(|e| e.wire.iter().copied()).collect();

        let mut cuts: Vec<usize> = raw_cuts.iter().map(|i| i.index(wire.len() + 1)).collect();
        cuts.sort_unstable();

        let whole = decode_in_chunks(&wire, &[]);
        let chunked = decode_in_chunks(&wire, &cuts);
        let bytewise = decode_in_chunks(&wire, &(1..wire.len()).collect::<Vec<_>>());

        prop_assert_eq!(&whole, &chunked);
        prop_assert_eq!(&whole, &bytewise);
        prop_assert_eq!(whole.len(), encoded.len());
        for (frame, expected) in whole.iter().zip(&encoded) {
            prop_assert_eq!(frame.opcode, expected.opcode);
            prop_assert_eq!(frame.payload.as_ref(), expected.payload.as_slice());
            prop_assert_eq!(frame.raw.as_ref(), expected.wire.as_slice());
        }
    }

    #[test]
    fn clean_always_terminates(junk in prop::collection::vec(any::<u8>(), 1..128)) {
        let mut decoder = FrameDecoder::new();
        decoder.feed(&junk);

        let garbage = decoder.clean();
        // Whatever was not discarded is a frame or a frame prefix.
        prop_assert_eq!(garbage.len() + decoder.pending_len(), junk.len());
        prop_assert_eq!(&junk[..garbage.len()], garbage.as_slice());
        if decoder.has_pending() {
            prop_assert_eq!(decoder.clone().clean().len(), 0);
        }
    }
}
