use serde::Serialize;
use ventlink_backend::{
    AlarmLimits, AlarmLimitsRequest, BackendMessage, BackendSender, CycleMeasurements,
    MessageType, Parameters, ParametersRequest, SensorMeasurements, StateSegment, StateStore,
    States,
};
use ventlink_frame::ChunkBuffer;
use ventlink_protocol::Crc32c;

use crate::cmd::EncodeArgs;
use crate::exit::{CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_json, print_raw, print_table, to_hex, OutputFormat};

#[derive(Serialize)]
struct EncodeOutput {
    kind: MessageType,
    type_code: u8,
    sequence: u8,
    length: usize,
    frame: String,
}

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let segment = match &args.json {
        Some(json) => segment_from_json(args.kind, json)
            .map_err(|err| CliError::usage(format!("--json is not a valid {}: {err}", args.kind)))?,
        None => States::default()
            .read(args.kind)
            .ok_or_else(|| CliError::new(INTERNAL, format!("no default for {}", args.kind)))?,
    };

    let mut sender = BackendSender::starting_at(Crc32c, args.sequence);
    let mut message = BackendMessage::new(segment);
    let mut frame = ChunkBuffer::new();
    sender.transform(&mut message, &mut frame).map_err(|err| {
        CliError::data(format!("cannot encode {}: {} ({err})", args.kind, err.status()))
    })?;

    let out = EncodeOutput {
        kind: args.kind,
        type_code: message.type_code(),
        sequence: args.sequence,
        length: frame.len(),
        frame: to_hex(&frame),
    };
    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => print_table(
            &["KIND", "TYPE", "SEQ", "LENGTH", "FRAME"],
            [[
                out.kind.to_string(),
                out.type_code.to_string(),
                out.sequence.to_string(),
                out.length.to_string(),
                out.frame.clone(),
            ]],
        ),
        OutputFormat::Pretty => println!(
            "kind={} type={} seq={} length={}\n{}",
            out.kind, out.type_code, out.sequence, out.length, out.frame
        ),
        OutputFormat::Raw => print_raw(&frame),
    }
    Ok(SUCCESS)
}

pub fn segment_from_json(kind: MessageType, json: &str) -> serde_json::Result<StateSegment> {
    Ok(match kind {
        MessageType::SensorMeasurements => {
            serde_json::from_str::<SensorMeasurements>(json)?.into()
        }
        MessageType::CycleMeasurements => serde_json::from_str::<CycleMeasurements>(json)?.into(),
        MessageType::Parameters => serde_json::from_str::<Parameters>(json)?.into(),
        MessageType::ParametersRequest => serde_json::from_str::<ParametersRequest>(json)?.into(),
        MessageType::AlarmLimits => serde_json::from_str::<AlarmLimits>(json)?.into(),
        MessageType::AlarmLimitsRequest => {
            serde_json::from_str::<AlarmLimitsRequest>(json)?.into()
        }
    })
}
