use serde::Serialize;
use ventlink_backend::{
    AlarmLimits, Backend, BackendConfig, CycleMeasurements, LinkDriver, MessageType, OutputStatus,
    Parameters, ParametersRequest, Range, StateSegment, StateStore, States, VentilationMode,
};
use ventlink_protocol::{Crc32c, ScheduleEntry};
use ventlink_transport::{bridge, QueueTransport};

use crate::cmd::SimulateArgs;
use crate::config;
use crate::exit::{backend_error, CliError, CliResult, SUCCESS};
use crate::output::{print_json, print_table, OutputFormat};

type Endpoint = LinkDriver<QueueTransport<1024>, Crc32c, States>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum Direction {
    DeviceToHost,
    HostToDevice,
}

#[derive(Debug, Serialize)]
struct Delivery {
    tick: u32,
    direction: Direction,
    kind: MessageType,
    state: Option<StateSegment>,
}

#[derive(Debug, Default, Serialize)]
struct SimulateOutput {
    ticks: u32,
    device_frames: usize,
    host_frames: usize,
    dropped_frames: usize,
    deliveries: Vec<Delivery>,
}

pub fn run(args: SimulateArgs, format: OutputFormat) -> CliResult<i32> {
    if args.drop_every == Some(0) {
        return Err(CliError::usage("--drop-every must be greater than zero"));
    }
    let device_config = config::load(args.config.as_deref())?;
    let out = simulate(args.ticks, &device_config, args.drop_every)?;
    print_output(&out, format);
    Ok(SUCCESS)
}

fn endpoint(config: &BackendConfig, states: States) -> CliResult<Endpoint> {
    let backend = Backend::new(Crc32c, states, config)
        .map_err(|err| backend_error("invalid backend config", err))?;
    Ok(LinkDriver::new(QueueTransport::new(), backend))
}

fn device_states() -> States {
    States {
        parameters: Parameters {
            ventilating: true,
            mode: VentilationMode::PcAc,
            fio2: 40.0,
            flow: 30.0,
            pip: 20.0,
            peep: 5.0,
            vt: 450.0,
            rr: 15.0,
            ie: 0.5,
            ..Default::default()
        },
        alarm_limits: AlarmLimits {
            spo2: Range::new(90, 100),
            hr: Range::new(50, 120),
            rr: Range::new(8, 30),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn host_states() -> States {
    States {
        parameters_request: ParametersRequest {
            ventilating: true,
            mode: VentilationMode::PcAc,
            rr: 18.0,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Advance the device's live readings to `tick`.
fn update_device(states: &mut States, tick: u32) {
    let phase = (tick % 40) as f32 / 40.0;
    let measurements = &mut states.sensor_measurements;
    measurements.time = u64::from(tick);
    measurements.cycle = tick / 40;
    measurements.paw = if phase < 0.33 { 20.0 } else { 5.0 };
    measurements.flow = if phase < 0.33 { 30.0 } else { -10.0 };
    measurements.volume = 450.0 * phase.min(0.33) / 0.33;
    measurements.fio2 = 40.0;
    measurements.spo2 = 97.0;
    measurements.hr = 72.0;

    if tick % 40 == 0 {
        states.cycle_measurements = CycleMeasurements {
            time: u64::from(tick),
            vt: 450.0,
            rr: 15.0,
            peep: 5.0,
            pip: 20.0,
            ip: 18.0,
            ve: 6.75,
        };
    }
}

fn simulate(
    ticks: u32,
    device_config: &BackendConfig,
    drop_every: Option<u32>,
) -> CliResult<SimulateOutput> {
    let host_config = BackendConfig::with_schedule([
        ScheduleEntry::new(50, MessageType::ParametersRequest),
        ScheduleEntry::new(50, MessageType::AlarmLimitsRequest),
    ]);
    let mut device = endpoint(device_config, device_states())?;
    let mut host = endpoint(&host_config, host_states())?;
    let mut out = SimulateOutput {
        ticks,
        ..Default::default()
    };

    for tick in 1..=ticks {
        update_device(device.backend_mut().states_mut(), tick);
        device.update_clock(tick);
        host.update_clock(tick);

        if send(&mut device)? {
            out.device_frames += 1;
            let device_frames = u32::try_from(out.device_frames).unwrap_or(u32::MAX);
            if drop_every.is_some_and(|n| device_frames % n == 0) {
                tracing::info!(tick, "dropping device frame");
                device.transport_mut().drain_transmitted().for_each(drop);
                out.dropped_frames += 1;
            }
        }
        if send(&mut host)? {
            out.host_frames += 1;
        }

        bridge(device.transport_mut(), host.transport_mut());
        host.receive_with(|kind, states| {
            out.deliveries.push(Delivery {
                tick,
                direction: Direction::DeviceToHost,
                kind,
                state: states.read(kind),
            })
        });
        device.receive_with(|kind, states| {
            out.deliveries.push(Delivery {
                tick,
                direction: Direction::HostToDevice,
                kind,
                state: states.read(kind),
            })
        });
    }

    tracing::debug!(
        deliveries = out.deliveries.len(),
        device_frames = out.device_frames,
        host_frames = out.host_frames,
        "simulation finished"
    );
    Ok(out)
}

fn send(endpoint: &mut Endpoint) -> CliResult<bool> {
    let status = endpoint
        .send()
        .map_err(|err| backend_error("send failed", err))?;
    Ok(status == OutputStatus::Available)
}

fn print_output(out: &SimulateOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => print_table(
            &["TICK", "DIRECTION", "KIND", "STATE"],
            out.deliveries.iter().map(|delivery| {
                [
                    delivery.tick.to_string(),
                    direction_name(delivery.direction).to_string(),
                    delivery.kind.to_string(),
                    delivery
                        .state
                        .as_ref()
                        .and_then(|state| serde_json::to_string(state).ok())
                        .unwrap_or_default(),
                ]
            }),
        ),
        OutputFormat::Pretty => {
            for delivery in &out.deliveries {
                println!(
                    "tick {:>5} {} {}",
                    delivery.tick,
                    direction_name(delivery.direction),
                    delivery.kind
                );
            }
            println!(
                "{} ticks, {} device frames ({} dropped), {} host frames, {} delivered",
                out.ticks,
                out.device_frames,
                out.dropped_frames,
                out.host_frames,
                out.deliveries.len()
            );
        }
        OutputFormat::Raw => {
            for delivery in &out.deliveries {
                print_json(delivery);
            }
        }
    }
}

fn direction_name(direction: Direction) -> &'static str {
    match direction {
        Direction::DeviceToHost => "device->host",
        Direction::HostToDevice => "host->device",
    }
}
