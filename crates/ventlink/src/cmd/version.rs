use ventlink_frame::FRAME_PAYLOAD_MAX_SIZE;
use ventlink_protocol::MESSAGE_PAYLOAD_MAX_SIZE;

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("ventlink {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: ventlink");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("VENTLINK_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("frame_payload_max: {FRAME_PAYLOAD_MAX_SIZE}");
    println!("message_payload_max: {MESSAGE_PAYLOAD_MAX_SIZE}");
    println!(
        "features: backend={}, async={}, cli=true",
        cfg!(feature = "backend"),
        cfg!(feature = "async")
    );

    Ok(SUCCESS)
}
