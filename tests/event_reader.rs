// tests/event_reader.rs

mod common;

use std::io::ErrorKind;
use std::time::Instant;

use common::{mock_session, split_at_offsets, FrameBuilder, TestResult};
use inotools::errors::InotoolsError;
use inotools::event::{EventMask, HEADER_LEN};
use inotools::reader::{EventReader, ReaderState, MAX_EVENTS};
use inotools::stats::StatsCollector;
use inotools::transport::MockTransport;
use inotools::{Timeout, WatchIndex};

#[test]
fn modify_on_watched_file_is_returned_and_counted() -> TestResult {
    let (mut session, transport, fs) = mock_session();
    fs.add_file("/tmp/file.txt");
    session.watch_file("/tmp/file.txt", EventMask::MODIFY)?;
    session.initialize_stats()?;
    let handle = transport.handle_of("/tmp/file.txt").unwrap();

    transport.push_bytes(FrameBuilder::new().event(handle, EventMask::MODIFY).build());

    let event = session.next_event(0)?.expect("event should be ready");
    assert_eq!(event.handle, handle);
    assert_eq!(event.mask, EventMask::MODIFY);
    assert_eq!(event.name, None);

    assert_eq!(session.stat_by_handle(handle, EventMask::MODIFY)?, Some(1));
    assert_eq!(session.stat_by_handle(handle, EventMask::empty())?, Some(1));
    assert_eq!(session.stat_total(EventMask::MODIFY)?, Some(1));
    Ok(())
}

#[test]
fn nothing_pending_times_out_with_none() -> TestResult {
    let (mut session, transport, _fs) = mock_session();

    assert!(session.next_event(0)?.is_none());
    assert_eq!(transport.waits(), vec![Timeout::NonBlocking]);
    assert_eq!(transport.read_count(), 0);
    assert_eq!(session.reader_state()?, ReaderState::Idle);
    Ok(())
}

#[test]
fn named_events_carry_the_entry_name_and_cookie() -> TestResult {
    let (mut session, transport, fs) = mock_session();
    fs.add_dir("/srv/in");
    session.watch_file("/srv/in", EventMask::MOVE)?;
    let handle = transport.handle_of("/srv/in").unwrap();

    transport.push_bytes(
        FrameBuilder::new()
            .frame(handle, EventMask::MOVED_FROM, 42, Some("a.txt"))
            .frame(handle, EventMask::MOVED_TO, 42, Some("a-renamed-to-a-long-name.txt"))
            .build(),
    );

    let from = session.next_event(0)?.unwrap();
    assert_eq!(from.name.as_deref(), Some("a.txt"));
    assert_eq!(from.cookie, 42);
    assert_eq!(session.reader_state()?, ReaderState::Draining);

    let to = session.next_event(0)?.unwrap();
    assert_eq!(to.name.as_deref(), Some("a-renamed-to-a-long-name.txt"));
    assert_eq!(to.cookie, 42);
    assert_eq!(session.reader_state()?, ReaderState::Idle);

    // both frames came from a single read
    assert_eq!(transport.read_count(), 1);
    Ok(())
}

#[test]
fn frames_split_across_reads_are_reassembled() -> TestResult {
    let (mut session, transport, _fs) = mock_session();
    let stream = FrameBuilder::new()
        .named(1, EventMask::CREATE, "first")
        .event(1, EventMask::ATTRIB)
        .named(2, EventMask::DELETE | EventMask::ISDIR, "second-dir")
        .build();

    // cut inside a header, inside a name and right after a header
    for chunk in split_at_offsets(&stream, &[5, 20, 40, 48, 70]) {
        transport.push_bytes(chunk);
    }

    let mut seen = Vec::new();
    while let Some(event) = session.next_event(0)? {
        seen.push(event);
    }

    assert_eq!(seen.len(), 3);
    assert_eq!(seen[0].name.as_deref(), Some("first"));
    assert_eq!(seen[0].mask, EventMask::CREATE);
    assert_eq!(seen[1].mask, EventMask::ATTRIB);
    assert_eq!(seen[1].name, None);
    assert_eq!(seen[2].handle, 2);
    assert!(seen[2].is_dir());
    assert_eq!(seen[2].name.as_deref(), Some("second-dir"));
    assert_eq!(transport.read_count(), 6);
    Ok(())
}

#[test]
fn incomplete_frame_is_kept_until_the_rest_arrives() {
    let transport = MockTransport::new();
    let mut reader = EventReader::new();
    let mut index = WatchIndex::new();
    let mut stats = StatsCollector::new();

    let stream = FrameBuilder::new().named(3, EventMask::OPEN, "f").build();
    transport.push_bytes(stream[..HEADER_LEN + 4].to_vec());

    let first = reader
        .next_event(&transport, &mut index, &mut stats, Timeout::NonBlocking, 1)
        .unwrap();
    assert!(first.is_none());
    assert_eq!(reader.state(), ReaderState::Draining);
    assert_eq!(reader.buffered(), HEADER_LEN + 4);

    transport.push_bytes(stream[HEADER_LEN + 4..].to_vec());
    let event = reader
        .next_event(&transport, &mut index, &mut stats, Timeout::NonBlocking, 1)
        .unwrap()
        .unwrap();
    assert_eq!(event.name.as_deref(), Some("f"));
    assert_eq!(reader.state(), ReaderState::Idle);
    assert_eq!(reader.buffered(), 0);
}

#[test]
fn end_of_stream_is_reported_as_stream_closed() {
    let (mut session, transport, _fs) = mock_session();
    transport.push_eof();

    let err = session.next_event(0).unwrap_err();
    assert!(matches!(err, InotoolsError::StreamClosed));
    assert_eq!(session.last_error(), libc::EIO);
}

#[test]
fn wait_failure_surfaces_the_os_error() {
    let (mut session, transport, _fs) = mock_session();
    transport.fail_next_wait(libc::EINTR);

    let err = session.next_event(-1).unwrap_err();
    assert!(matches!(err, InotoolsError::IoError(_)));
    assert_eq!(err.os_code(), Some(libc::EINTR));
    assert_eq!(session.last_error(), libc::EINTR);
}

#[test]
fn read_failure_surfaces_the_os_error() {
    let (mut session, transport, _fs) = mock_session();
    transport.push_bytes(FrameBuilder::new().event(1, EventMask::OPEN).build());
    transport.fail_next_read(libc::EIO);

    let err = session.next_event(0).unwrap_err();
    assert_eq!(err.os_code(), Some(libc::EIO));

    // the queued bytes are still delivered afterwards
    let event = session.next_event(0).unwrap().unwrap();
    assert_eq!(event.mask, EventMask::OPEN);
    assert_eq!(session.last_error(), 0);
}

#[test]
fn frame_larger_than_buffer_is_invalid_data() {
    let (mut session, transport, _fs) = mock_session();
    let mut header = Vec::new();
    header.extend_from_slice(&1i32.to_ne_bytes());
    header.extend_from_slice(&EventMask::CREATE.bits().to_ne_bytes());
    header.extend_from_slice(&0u32.to_ne_bytes());
    header.extend_from_slice(&(1u32 << 20).to_ne_bytes());
    transport.push_bytes(header);

    match session.next_event(0) {
        Err(InotoolsError::IoError(e)) => assert_eq!(e.kind(), ErrorKind::InvalidData),
        other => panic!("expected InvalidData, got {other:?}"),
    }
}

#[test]
fn reader_recovers_after_oversized_frame() -> TestResult {
    let (mut session, transport, fs) = mock_session();
    fs.add_file("/f");
    session.watch_file("/f", EventMask::OPEN)?;
    let handle = transport.handle_of("/f").unwrap();

    let mut header = Vec::new();
    header.extend_from_slice(&handle.to_ne_bytes());
    header.extend_from_slice(&EventMask::OPEN.bits().to_ne_bytes());
    header.extend_from_slice(&0u32.to_ne_bytes());
    header.extend_from_slice(&(1u32 << 20).to_ne_bytes());
    transport.push_bytes(header);
    assert!(session.next_event(0).is_err());

    assert_eq!(session.reader_state()?, ReaderState::Idle);
    assert!(session.next_event(0)?.is_none());

    transport.push_bytes(FrameBuilder::new().event(handle, EventMask::OPEN).build());
    let event = session.next_event(0)?.expect("stream usable again");
    assert_eq!(event.mask, EventMask::OPEN);
    Ok(())
}

#[test]
fn huge_timeout_with_batching_does_not_overflow() -> TestResult {
    let (mut session, transport, _fs) = mock_session();
    transport.push_bytes(
        FrameBuilder::new()
            .event(3, EventMask::MODIFY)
            .event(3, EventMask::ATTRIB)
            .build(),
    );

    let event = session.next_events(i64::MAX, 2)?.expect("batch already queued");
    assert_eq!(event.mask, EventMask::MODIFY);
    assert!(Timeout::Seconds(u64::MAX).deadline_from(Instant::now()).is_none());
    Ok(())
}

#[test]
fn batch_size_is_bounded() -> TestResult {
    let (mut session, transport, _fs) = mock_session();

    let err = session.next_events(0, MAX_EVENTS + 1).unwrap_err();
    assert!(matches!(err, InotoolsError::InvalidArgument(_)));
    assert_eq!(session.last_error(), libc::EINVAL);

    assert!(session.next_events(0, 0)?.is_none());
    assert!(transport.waits().is_empty());
    Ok(())
}

#[test]
fn batch_reads_once_enough_events_are_queued() -> TestResult {
    let (mut session, transport, _fs) = mock_session();
    transport.push_bytes(
        FrameBuilder::new()
            .event(1, EventMask::MODIFY)
            .event(1, EventMask::MODIFY)
            .event(1, EventMask::CLOSE_WRITE)
            .build(),
    );

    let event = session.next_events(Timeout::Seconds(5), 2)?.unwrap();
    assert_eq!(event.mask, EventMask::MODIFY);
    assert_eq!(transport.read_count(), 1);
    Ok(())
}

#[test]
fn non_blocking_batch_reads_whatever_is_queued() -> TestResult {
    let (mut session, transport, _fs) = mock_session();
    transport.push_bytes(FrameBuilder::new().event(1, EventMask::ACCESS).build());

    let event = session.next_events(0, 64)?.unwrap();
    assert_eq!(event.mask, EventMask::ACCESS);
    assert!(session.next_events(0, 64)?.is_none());
    Ok(())
}

#[test]
fn filtered_event_restarts_the_wait_with_a_fresh_timeout() -> TestResult {
    let (mut session, transport, fs) = mock_session();
    fs.add_dir("/tmp/ignore");
    fs.add_file("/tmp/keep.log");
    session.watch_file("/tmp/ignore", EventMask::ALL_EVENTS)?;
    session.watch_file("/tmp/keep.log", EventMask::ALL_EVENTS)?;
    session.initialize_stats()?;
    session.ignore_events_by_regex(Some("^/tmp/ignore/"))?;

    let ignored = transport.handle_of("/tmp/ignore").unwrap();
    let kept = transport.handle_of("/tmp/keep.log").unwrap();
    transport.push_bytes(FrameBuilder::new().named(ignored, EventMask::CREATE, "x").build());
    transport.push_bytes(FrameBuilder::new().event(kept, EventMask::MODIFY).build());

    let event = session.next_event(3)?.unwrap();
    assert_eq!(event.handle, kept);
    assert_eq!(
        transport.waits(),
        vec![Timeout::Seconds(3), Timeout::Seconds(3)]
    );

    // only the surfaced event is counted
    assert_eq!(session.stat_total(EventMask::empty())?, Some(1));
    assert_eq!(session.stat_by_handle(ignored, EventMask::empty())?, Some(0));
    Ok(())
}

#[test]
fn filtered_event_alone_never_surfaces() -> TestResult {
    let (mut session, transport, fs) = mock_session();
    fs.add_dir("/tmp/ignore");
    session.watch_file("/tmp/ignore", EventMask::CREATE)?;
    session.ignore_events_by_regex(Some("^/tmp/ignore/"))?;
    let handle = transport.handle_of("/tmp/ignore").unwrap();
    transport.push_bytes(FrameBuilder::new().named(handle, EventMask::CREATE, "x").build());

    assert!(session.next_event(1)?.is_none());
    assert_eq!(transport.waits().len(), 2);

    // removing the filter lets later events through
    session.ignore_events_by_regex(None)?;
    transport.push_bytes(FrameBuilder::new().named(handle, EventMask::CREATE, "y").build());
    assert_eq!(session.next_event(0)?.unwrap().name.as_deref(), Some("y"));
    Ok(())
}

#[test]
fn invalid_filter_pattern_leaves_no_filter() -> TestResult {
    let (mut session, transport, fs) = mock_session();
    fs.add_dir("/d");
    session.watch_file("/d", EventMask::CREATE)?;
    session.ignore_events_by_regex(Some("^/d/"))?;

    let err = session.ignore_events_by_regex(Some("(unclosed")).unwrap_err();
    assert!(matches!(err, InotoolsError::InvalidArgument(_)));

    let handle = transport.handle_of("/d").unwrap();
    transport.push_bytes(FrameBuilder::new().named(handle, EventMask::CREATE, "z").build());
    assert!(session.next_event(0)?.is_some());
    Ok(())
}

#[test]
fn overflow_event_is_surfaced_but_not_counted() -> TestResult {
    let (mut session, transport, _fs) = mock_session();
    session.initialize_stats()?;
    transport.push_bytes(FrameBuilder::new().event(-1, EventMask::Q_OVERFLOW).build());

    let event = session.next_event(0)?.unwrap();
    assert_eq!(event.handle, -1);
    assert_eq!(event.mask, EventMask::Q_OVERFLOW);
    assert_eq!(session.stat_total(EventMask::empty())?, Some(0));
    Ok(())
}
