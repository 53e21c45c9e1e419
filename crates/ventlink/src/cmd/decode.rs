use serde::Serialize;
use ventlink_backend::{
    BackendMessage, BackendReceiver, InputStatus, MessageType, OutputStatus, ReceiveError,
    StateSegment,
};
use ventlink_protocol::{Crc32c, DatagramError};

use crate::cmd::DecodeArgs;
use crate::exit::{CliResult, DATA_INVALID, SUCCESS};
use crate::output::{parse_hex, print_json, print_table, OutputFormat};

#[derive(Debug, Clone, Serialize)]
struct DecodedFrame {
    index: usize,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    type_code: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<MessageType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sequence: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<StateSegment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl DecodedFrame {
    // A sequence mismatch still carries a complete message.
    fn is_valid(&self) -> bool {
        self.state.is_some()
    }
}

#[derive(Serialize)]
struct DecodeOutput<'a> {
    frames: &'a [DecodedFrame],
}

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let mut wire = parse_hex(&args.hex)?;
    if wire.last() != Some(&0x00) {
        wire.push(0x00);
    }

    let frames = decode_all(&wire);
    let failed = frames.is_empty() || frames.iter().any(|frame| !frame.is_valid());
    print_frames(&frames, format);

    Ok(if failed { DATA_INVALID } else { SUCCESS })
}

fn decode_all(wire: &[u8]) -> Vec<DecodedFrame> {
    let mut receiver = BackendReceiver::new(Crc32c);
    let mut frames = Vec::new();

    for &byte in wire {
        let ready = match receiver.input(byte) {
            Ok(InputStatus::Ready) => true,
            Ok(InputStatus::Pending) => false,
            // Over-long frames are reported once by `output` below.
            Err(_) => byte == 0x00,
        };
        if !ready {
            continue;
        }

        let mut message = BackendMessage::default();
        let result = receiver.output(&mut message);
        if result == Ok(OutputStatus::Waiting) {
            continue;
        }
        frames.push(describe(frames.len(), result, &message, &receiver));
    }
    frames
}

fn describe(
    index: usize,
    result: Result<OutputStatus, ReceiveError>,
    message: &BackendMessage,
    receiver: &BackendReceiver<Crc32c>,
) -> DecodedFrame {
    let sequence = Some(receiver.expected_seq().wrapping_sub(1));
    let mut frame = DecodedFrame {
        index,
        status: "available",
        type_code: None,
        kind: None,
        sequence: None,
        state: None,
        error: None,
    };

    match result {
        Ok(_) | Err(ReceiveError::Datagram(DatagramError::InvalidSequence { .. })) => {
            if let Err(err) = &result {
                frame.status = err.status();
            }
            frame.type_code = Some(message.type_code());
            frame.kind = message.payload().kind();
            frame.sequence = sequence;
            frame.state = Some(message.payload().clone());
        }
        Err(err) => {
            frame.status = err.status();
            frame.error = Some(err.to_string());
            if let ReceiveError::Message(_) = err {
                frame.type_code = Some(message.type_code());
                frame.sequence = sequence;
            }
        }
    }
    frame
}

fn print_frames(frames: &[DecodedFrame], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&DecodeOutput { frames }),
        OutputFormat::Table => print_table(
            &["#", "STATUS", "TYPE", "SEQ", "STATE"],
            frames.iter().map(|frame| {
                [
                    frame.index.to_string(),
                    frame.status.to_string(),
                    describe_type(frame),
                    frame.sequence.map(|s| s.to_string()).unwrap_or_default(),
                    state_text(frame),
                ]
            }),
        ),
        OutputFormat::Pretty => {
            for frame in frames {
                println!(
                    "#{} status={} type={} seq={} {}",
                    frame.index,
                    frame.status,
                    describe_type(frame),
                    frame
                        .sequence
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    state_text(frame)
                );
            }
        }
        OutputFormat::Raw => {
            for state in frames.iter().filter_map(|frame| frame.state.as_ref()) {
                print_json(state);
            }
        }
    }
}

fn describe_type(frame: &DecodedFrame) -> String {
    match (frame.kind, frame.type_code) {
        (Some(kind), _) => kind.to_string(),
        (None, Some(code)) => code.to_string(),
        (None, None) => "-".to_string(),
    }
}

fn state_text(frame: &DecodedFrame) -> String {
    match (&frame.state, &frame.error) {
        (Some(state), _) => serde_json::to_string(state).unwrap_or_default(),
        (None, Some(error)) => error.clone(),
        (None, None) => String::new(),
    }
}
