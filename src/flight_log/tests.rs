use super::{
    DEFAULT_LOG_CAPACITY, DropReason, FileSink, FlightLogger, FlightSummary, LogError, LogMode,
    LogSink, RowOutcome, write_summary,
};
use crate::common::Vec3D;
use crate::flight_control::{Sample, Stage};
use crate::test_support::MemorySink;
use std::{fs, io};

fn sample(timestamp: f64) -> Sample {
    Sample {
        timestamp,
        accel: Vec3D::new(0.12345, 12.5, -0.00004),
        gyro: Vec3D::new(0.001, -0.5, 2.5),
        pressure: 1001.456,
        altitude: 152.004,
        temperature: 19.996,
        velocity: Vec3D::new(0.0, 3.125, -0.25),
    }
}

fn open_memory(sink: &MemorySink) -> FlightLogger<MemorySink> {
    let handle = sink.clone();
    FlightLogger::open(LogMode::Durable, DEFAULT_LOG_CAPACITY, move || Ok(handle))
}

#[test]
fn test_row_format_and_precision() {
    let row = FlightLogger::<MemorySink>::format_row(&sample(12.3456), Stage::PoweredAscent);
    assert_eq!(
        row,
        "12.346,152.00,1001.46,20.00,0.0000,3.1250,-0.2500,0.1235,12.5000,-0.0000,\
         0.0010,-0.5000,2.5000,PoweredAscent"
    );
    assert_eq!(row.split(',').count(), FlightLogger::<MemorySink>::HEADER.split(',').count());
}

#[test]
fn test_durable_open_writes_header_then_rows() {
    let sink = MemorySink::default();
    let mut logger = open_memory(&sink);
    assert_eq!(logger.mode(), LogMode::Durable);
    assert_eq!(logger.write_row(&sample(0.5), Stage::LaunchPad).unwrap(), RowOutcome::Written);
    assert_eq!(logger.write_row(&sample(0.6), Stage::LaunchPad).unwrap(), RowOutcome::Written);
    let stats = logger.close();
    assert_eq!(stats.written, 2);

    let log = sink.log();
    assert_eq!(log.lines[0], FlightLogger::<MemorySink>::HEADER);
    assert!(log.lines[0].starts_with("Timestamp,Altitude,Pressure,Temperature,Velocity_X"));
    assert!(log.lines[0].ends_with("Angular_Velocity_Z,FlightStage"));
    assert_eq!(log.lines.len(), 3);
    assert_eq!(log.closes, 1);
}

#[test]
fn test_open_failure_degrades_to_transient() {
    let mut logger: FlightLogger<MemorySink> = FlightLogger::open(LogMode::Durable, DEFAULT_LOG_CAPACITY, || {
        Err(io::Error::new(io::ErrorKind::ReadOnlyFilesystem, "mounted read-only"))
    });
    assert_eq!(logger.mode(), LogMode::Transient);
    for i in 0..5_i32 {
        assert_eq!(logger.write_row(&sample(f64::from(i)), Stage::LaunchPad).unwrap(), RowOutcome::Printed);
    }
    let stats = logger.close();
    assert_eq!(stats.printed, 5);
    assert_eq!(stats.written, 0);
}

#[test]
fn test_header_failure_also_degrades() {
    let sink = MemorySink::default();
    sink.log().fail_append = Some(io::ErrorKind::StorageFull);
    let mut logger = open_memory(&sink);
    assert_eq!(logger.mode(), LogMode::Transient);
    logger.write_row(&sample(1.0), Stage::Apogee).unwrap();
    assert_eq!(sink.log().appends, 1, "only the failed header append reached the sink");
}

#[test]
fn test_transient_mode_never_opens_sink() {
    let mut logger: FlightLogger<MemorySink> =
        FlightLogger::open(LogMode::Transient, DEFAULT_LOG_CAPACITY, || unreachable!("opener called"));
    assert_eq!(logger.mode(), LogMode::Transient);
    assert_eq!(logger.write_row(&sample(0.0), Stage::Descent).unwrap(), RowOutcome::Printed);
    assert!(!logger.overflow());
}

#[test]
fn test_overflow_is_sticky_and_leaves_one_trailer() {
    let sink = MemorySink::with_base_size(DEFAULT_LOG_CAPACITY - 1_000);
    let mut logger = open_memory(&sink);
    let mut written = 0;
    let mut i = 0_i32;
    loop {
        match logger.write_row(&sample(f64::from(i)), Stage::CoastingAscent).unwrap() {
            RowOutcome::Written => written += 1,
            RowOutcome::Dropped(DropReason::Capacity) => break,
            other => panic!("unexpected outcome {other:?}"),
        }
        i += 1;
    }
    assert!(written > 0);
    assert!(logger.overflow());
    {
        let log = sink.log();
        assert!(log.base_size + log.bytes > DEFAULT_LOG_CAPACITY);
    }
    for j in 0..10_i32 {
        assert_eq!(
            logger.write_row(&sample(f64::from(j)), Stage::Apogee).unwrap(),
            RowOutcome::Dropped(DropReason::Capacity)
        );
        assert!(logger.overflow());
    }
    let stats = logger.close();
    assert_eq!(stats.written, written);
    assert_eq!(stats.dropped_capacity, 11);

    let log = sink.log();
    let trailers =
        log.lines.iter().filter(|l| *l == FlightLogger::<MemorySink>::OVERFLOW_TRAILER).count();
    assert_eq!(trailers, 1);
    assert_eq!(log.lines.last().map(String::as_str), Some(FlightLogger::<MemorySink>::OVERFLOW_TRAILER));
}

#[test]
fn test_no_trailer_without_overflow() {
    let sink = MemorySink::default();
    let mut logger = open_memory(&sink);
    logger.write_row(&sample(0.0), Stage::LaunchPad).unwrap();
    logger.close();
    assert!(sink.log().lines.iter().all(|l| !l.starts_with('#')));
}

#[test]
fn test_storage_write_failure_drops_row() {
    let sink = MemorySink::default();
    let mut logger = open_memory(&sink);
    sink.log().fail_append = Some(io::ErrorKind::PermissionDenied);
    assert_eq!(
        logger.write_row(&sample(0.0), Stage::LaunchPad).unwrap(),
        RowOutcome::Dropped(DropReason::Storage)
    );
    sink.log().fail_append = None;
    assert_eq!(logger.write_row(&sample(0.1), Stage::LaunchPad).unwrap(), RowOutcome::Written);
    assert!(!logger.overflow());
    let stats = logger.close();
    assert_eq!((stats.written, stats.dropped_storage), (1, 1));
}

#[test]
fn test_unexpected_write_failure_is_returned() {
    let sink = MemorySink::default();
    let mut logger = open_memory(&sink);
    sink.log().fail_append = Some(io::ErrorKind::InvalidData);
    let err = logger.write_row(&sample(0.0), Stage::LaunchPad).unwrap_err();
    assert!(matches!(err, LogError::Unexpected(_)));
    assert!(!err.is_recoverable());
}

#[test]
fn test_close_failure_is_swallowed() {
    let sink = MemorySink::default();
    let logger = open_memory(&sink);
    sink.log().fail_close = true;
    let _ = logger.close();
    assert_eq!(sink.log().closes, 1);
}

#[test]
fn test_error_classification() {
    let os_error = LogError::from(io::Error::from_raw_os_error(5));
    assert!(os_error.is_recoverable());
    assert!(LogError::from(io::Error::new(io::ErrorKind::NotFound, "card removed")).is_recoverable());
    assert!(!LogError::from(io::Error::other("bug")).is_recoverable());
}

#[test]
fn test_file_sink_round_trip_with_small_capacity() {
    let path = std::env::temp_dir().join(format!("sora-fc-log-{}.csv", std::process::id()));
    let target = path.clone();
    let mut logger = FlightLogger::open(LogMode::Durable, 400, move || FileSink::create(&target));
    assert_eq!(logger.mode(), LogMode::Durable);
    let outcomes: Vec<RowOutcome> =
        (0..6_i32).map(|i| logger.write_row(&sample(f64::from(i)), Stage::Landing).unwrap()).collect();
    assert!(outcomes.contains(&RowOutcome::Dropped(DropReason::Capacity)));
    logger.close();

    let contents = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines[0], FlightLogger::<FileSink>::HEADER);
    assert_eq!(lines.last().copied(), Some(FlightLogger::<FileSink>::OVERFLOW_TRAILER));
    assert!(lines[1].ends_with(",Landing"));
    let _ = fs::remove_file(path);
}

#[test]
fn test_file_sink_rows_reach_the_file_before_close() {
    let path = std::env::temp_dir().join(format!("sora-fc-flush-{}.csv", std::process::id()));
    let mut sink = FileSink::create(&path).unwrap();
    sink.append("first\n").unwrap();
    sink.append("second\n").unwrap();

    let on_disk = fs::read_to_string(&path).unwrap();
    assert_eq!(on_disk, "first\nsecond\n");
    assert_eq!(sink.size().unwrap(), on_disk.len() as u64);
    sink.close().unwrap();
    let _ = fs::remove_file(path);
}

#[test]
fn test_summary_artifact() {
    let summary =
        FlightSummary { max_altitude_agl: 400.0, max_velocity_y: 12.34567, max_acceleration_y: 45.1 };
    let rendered = summary.render();
    assert_eq!(
        rendered,
        "Max altitude : 400.0000m\nMax velocity y : 12.3457m/s\nMax acceleration y : 45.1000m/s²\n"
    );
    let path = std::env::temp_dir().join(format!("sora-fc-summary-{}.txt", std::process::id()));
    write_summary(&path, &summary).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), rendered);
    let _ = fs::remove_file(path);
}
