use serde::Serialize;
use ventlink_protocol::{Crc32, Crc32c};

use crate::cmd::CrcArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{parse_hex, print_json, print_raw, print_table, OutputFormat};

#[derive(Serialize)]
struct CrcOutput {
    length: usize,
    crc: String,
}

pub fn run(args: CrcArgs, format: OutputFormat) -> CliResult<i32> {
    let bytes = match (&args.hex, &args.text) {
        (_, Some(text)) => text.as_bytes().to_vec(),
        (Some(hex), None) => parse_hex(hex)?,
        (None, None) => Vec::new(),
    };
    let crc = Crc32c.compute(&bytes);
    let out = CrcOutput {
        length: bytes.len(),
        crc: format!("{crc:08x}"),
    };

    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => print_table(
            &["LENGTH", "CRC-32C"],
            [[out.length.to_string(), out.crc.clone()]],
        ),
        OutputFormat::Pretty => println!("crc32c={} length={}", out.crc, out.length),
        OutputFormat::Raw => print_raw(&crc.to_be_bytes()),
    }
    Ok(SUCCESS)
}
