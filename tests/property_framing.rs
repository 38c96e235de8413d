// tests/property_framing.rs

mod common;

use common::{split_at_offsets, FrameBuilder};
use inotools::event::{EventKind, EventRecord};
use inotools::reader::EventReader;
use inotools::stats::StatsCollector;
use inotools::transport::MockTransport;
use inotools::{Timeout, WatchIndex};
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct FrameShape {
    handle: i32,
    kind: usize,
    cookie: u32,
    name: Option<String>,
}

fn frame_strategy() -> impl Strategy<Value = FrameShape> {
    (
        1..6i32,
        0..EventKind::COUNT,
        any::<u32>(),
        proptest::option::of("[a-zA-Z0-9._-]{1,40}"),
    )
        .prop_map(|(handle, kind, cookie, name)| FrameShape {
            handle,
            kind,
            cookie,
            name,
        })
}

fn encode(frames: &[FrameShape]) -> Vec<u8> {
    frames
        .iter()
        .fold(FrameBuilder::new(), |builder, s| {
            builder.frame(s.handle, EventKind::ALL[s.kind].mask(), s.cookie, s.name.as_deref())
        })
        .build()
}

fn drain(chunks: Vec<Vec<u8>>, batch: usize) -> Vec<EventRecord> {
    let transport = MockTransport::new();
    for chunk in chunks {
        transport.push_bytes(chunk);
    }
    let mut reader = EventReader::new();
    let mut index = WatchIndex::new();
    let mut stats = StatsCollector::new();

    let mut out = Vec::new();
    while let Some(event) = reader
        .next_event(&transport, &mut index, &mut stats, Timeout::NonBlocking, batch)
        .unwrap()
    {
        out.push(event);
    }
    out
}

proptest! {
    #[test]
    fn split_reads_yield_the_same_records(
        frames in proptest::collection::vec(frame_strategy(), 1..30),
        cuts in proptest::collection::vec(any::<prop::sample::Index>(), 0..12),
    ) {
        let stream = encode(&frames);
        let offsets: Vec<usize> = cuts.iter().map(|i| i.index(stream.len())).collect();

        let whole = drain(vec![stream.clone()], 1);
        let split = drain(split_at_offsets(&stream, &offsets), 1);

        prop_assert_eq!(whole.len(), frames.len());
        prop_assert_eq!(&whole, &split);
        for (record, frame) in whole.iter().zip(&frames) {
            prop_assert_eq!(record.handle, frame.handle);
            prop_assert_eq!(record.cookie, frame.cookie);
            prop_assert_eq!(&record.name, &frame.name);
        }
    }

    #[test]
    fn batching_never_surfaces_more_events(
        frames in proptest::collection::vec(frame_strategy(), 1..20),
        batch in 2..64usize,
    ) {
        let stream = encode(&frames);
        let single = drain(vec![stream.clone()], 1);
        let batched = drain(vec![stream], batch);
        prop_assert!(batched.len() <= single.len());
    }
}
