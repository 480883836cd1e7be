//! End-to-end checks over multi-block streams: frame context stamping,
//! report ordering across categories, exact length accounting and the
//! JSON shape of emitted reports.

use hexlit::hex;
use sddl::decode::report::FrameDate;
use sddl::prelude::*;

fn context() -> DecoderContext {
    // Surface the decoder's soft diagnostics in test output.
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    DecoderContext::new(DecoderConfig::default())
}

#[test]
fn mixed_stream_keeps_order_and_frame_context() {
    let mut ctx = context();
    let mut sink = VecSink::default();

    ctx.set_frame(
        Some(FrameDate { year: 2018, month: 4, day: 27 }),
        Some(36_000.5),
        Some(4),
    );

    // A sector crossing, then a block of two plots, then a sensor status.
    decode_data_block(&mut ctx, 2, &hex!("f000100240000200"), &mut sink).unwrap();
    decode_data_block(&mut ctx, 1, &hex!("a00102400080002040008000"), &mut sink).unwrap();
    decode_data_block(&mut ctx, 63, &hex!("814000a0fff60032"), &mut sink).unwrap();

    assert_eq!(sink.reports.len(), 4);
    assert_eq!(ctx.records_in_current_frame, 4);

    let categories: Vec<u8> = sink.reports.iter().map(|r| r.header().category).collect();
    assert_eq!(categories, [2, 1, 1, 63]);

    for report in &sink.reports {
        let header = report.header();
        assert_eq!(header.frame_time, Some(36_000.5));
        assert_eq!(header.line_number, Some(4));
        assert_eq!(header.frame_date.map(|d| d.day), Some(27));
    }
}

#[test]
fn a_block_consumes_exactly_its_records() {
    // Two category 048 records, nothing more, nothing less: a trailing
    // partial record must fail, a clean boundary must not.
    let mut ctx = context();
    let mut sink = VecSink::default();
    decode_data_block(
        &mut ctx,
        48,
        &hex!("84010200508401022000"),
        &mut sink,
    )
    .unwrap();
    assert_eq!(sink.reports.len(), 2);

    let mut ctx = context();
    let mut sink = VecSink::default();
    let err = decode_data_block(&mut ctx, 48, &hex!("840102005084"), &mut sink);
    assert!(err.is_err());
    // The complete first record was emitted before the failure.
    assert_eq!(sink.reports.len(), 1);
}

#[test]
fn decode_errors_name_the_item() {
    let mut ctx = context();
    let mut sink = VecSink::default();
    let err = decode_data_block(&mut ctx, 48, &hex!("840102005084"), &mut sink).unwrap_err();
    let text = err.to_string();
    assert!(text.contains("I048"), "unexpected message: {text}");
}

#[test]
fn json_lines_shape() {
    let mut ctx = context();
    let mut sink = VecSink::default();
    decode_data_block(&mut ctx, 2, &hex!("c0001001"), &mut sink).unwrap();

    let json = serde_json::to_value(&sink.reports[0]).unwrap();
    assert_eq!(json["report"], "service");
    assert_eq!(json["kind"], "north_marker");
    assert_eq!(json["category"], 2);
    assert_eq!(json["data_source"]["sic"], 0x10);
    // Absent optionals stay out of the object.
    assert!(json.get("polar_window").is_none());
}

#[test]
fn json_sink_round_trip() {
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Buf(Arc<Mutex<Vec<u8>>>);

    impl Write for Buf {
        fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(data);
            Ok(data.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let buf = Buf::default();
    let mut ctx = context();
    let mut sink = JsonLinesSink::new(buf.clone());
    decode_data_block(&mut ctx, 1, &hex!("a00102400080002040008000"), &mut sink).unwrap();
    sink.finish().unwrap();

    let bytes = buf.0.lock().unwrap().clone();
    let text = String::from_utf8(bytes).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);

    let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(first["report"], "plot");
    assert_eq!(first["data_source"]["supplemented"], false);
    assert_eq!(second["data_source"]["supplemented"], true);
    assert_eq!(second["data_source"]["sac"], 1);
}

#[test]
fn supplemented_sources_do_not_leak_across_streams() {
    // Two independent contexts fed from the same recording must agree.
    let block = hex!("a00102400080002040008000");

    let mut ctx_a = context();
    let mut sink_a = VecSink::default();
    decode_data_block(&mut ctx_a, 1, &block, &mut sink_a).unwrap();

    let mut ctx_b = context();
    let mut sink_b = VecSink::default();
    decode_data_block(&mut ctx_b, 1, &block, &mut sink_b).unwrap();

    assert_eq!(sink_a.reports, sink_b.reports);
}
