use ventlink_backend::{
    Backend, BackendConfig, BackendMessage, BackendReceiver, InputStatus, LinkDriver,
    MessageType, OutputStatus, Parameters, SensorMeasurements, StateSegment, StateStore, States,
    VentilationMode,
};
use ventlink_frame::ChunkBuffer;
use ventlink_protocol::{Crc32c, ScheduleEntry};
use ventlink_transport::{bridge, QueueTransport};

fn decode_frame(frame: &[u8]) -> BackendMessage {
    let mut receiver = BackendReceiver::new(Crc32c);
    let mut message = BackendMessage::default();
    for &byte in frame {
        if receiver.input(byte).unwrap() == InputStatus::Ready {
            assert_eq!(receiver.output(&mut message).unwrap(), OutputStatus::Available);
            return message;
        }
    }
    panic!("frame never completed");
}

#[test]
fn scheduled_broadcast_carries_live_state() {
    let config = BackendConfig::with_schedule([
        ScheduleEntry::new(10, MessageType::SensorMeasurements),
        ScheduleEntry::new(10, MessageType::Parameters),
    ]);
    let mut backend = Backend::new(Crc32c, States::default(), &config).unwrap();
    let mut buffer = ChunkBuffer::new();

    for tick in 1..=10u32 {
        backend.states_mut().sensor_measurements = SensorMeasurements {
            time: u64::from(tick),
            paw: tick as f32 * 1.5,
            ..Default::default()
        };
        let due = backend.update_clock(tick);
        if tick < 10 {
            assert_eq!(due, None, "tick {tick}");
            assert_eq!(backend.output(&mut buffer), Ok(OutputStatus::Waiting));
        } else {
            assert_eq!(due, Some(MessageType::SensorMeasurements));
        }
    }
    assert_eq!(backend.output(&mut buffer), Ok(OutputStatus::Available));
    let message = decode_frame(&buffer);
    assert_eq!(message.type_code(), MessageType::SensorMeasurements.code());
    assert_eq!(
        message.payload(),
        &backend.states().read(MessageType::SensorMeasurements).unwrap()
    );
    assert_eq!(
        message.payload(),
        &StateSegment::from(SensorMeasurements {
            time: 10,
            paw: 15.0,
            ..Default::default()
        })
    );

    backend.states_mut().parameters = Parameters {
        ventilating: true,
        mode: VentilationMode::VcAc,
        vt: 400.0,
        ..Default::default()
    };
    for tick in 11..=20u32 {
        let due = backend.update_clock(tick);
        assert_eq!(due.is_some(), tick == 20, "tick {tick}");
    }
    assert_eq!(backend.output(&mut buffer), Ok(OutputStatus::Available));
    let message = decode_frame(&buffer);
    assert_eq!(message.type_code(), MessageType::Parameters.code());
    assert_eq!(
        message.payload(),
        &StateSegment::Parameters(backend.states().parameters)
    );
}

type Link = LinkDriver<QueueTransport<1024>, Crc32c, States>;

fn link(schedule: &[ScheduleEntry<MessageType>]) -> Link {
    let config = BackendConfig::with_schedule(schedule.to_vec());
    LinkDriver::new(
        QueueTransport::new(),
        Backend::new(Crc32c, States::default(), &config).unwrap(),
    )
}

#[test]
fn device_state_reaches_host() {
    let mut device = link(&BackendConfig::default().schedule);
    let mut host = link(&[ScheduleEntry::new(10, MessageType::ParametersRequest)]);

    device.backend_mut().states_mut().sensor_measurements.spo2 = 96.0;
    device.backend_mut().states_mut().cycle_measurements.rr = 15.0;
    host.backend_mut().states_mut().parameters_request.rr = 22.0;

    let mut received = Vec::new();
    for tick in 1..=90u32 {
        device.update_clock(tick);
        host.update_clock(tick);
        device.send().unwrap();
        host.send().unwrap();
        bridge(device.transport_mut(), host.transport_mut());
        host.receive_with(|kind, _| received.push(kind));
        device.receive();
    }

    assert_eq!(
        received,
        [
            MessageType::SensorMeasurements,
            MessageType::Parameters,
            MessageType::AlarmLimits,
            MessageType::SensorMeasurements,
            MessageType::CycleMeasurements,
            MessageType::AlarmLimitsRequest,
            MessageType::SensorMeasurements,
            MessageType::ParametersRequest,
            MessageType::CycleMeasurements,
        ]
    );
    assert_eq!(host.backend().states().sensor_measurements.spo2, 96.0);
    assert_eq!(host.backend().states().cycle_measurements.rr, 15.0);
    assert_eq!(device.backend().states().parameters_request.rr, 22.0);
}

#[test]
fn lost_frame_is_recovered_by_rebroadcast() {
    let mut device = link(&[
        ScheduleEntry::new(1, MessageType::SensorMeasurements),
        ScheduleEntry::new(1, MessageType::CycleMeasurements),
    ]);
    let mut host = link(&[ScheduleEntry::new(1000, MessageType::Parameters)]);
    device.backend_mut().states_mut().cycle_measurements.vt = 480.0;

    let mut received = Vec::new();
    for tick in 1..=4u32 {
        device.update_clock(tick);
        device.send().unwrap();
        if tick == 2 {
            // Dropped on the wire.
            device.transport_mut().drain_transmitted().for_each(drop);
            continue;
        }
        bridge(device.transport_mut(), host.transport_mut());
        host.receive_with(|kind, _| received.push(kind));
    }

    assert_eq!(
        received,
        [
            MessageType::SensorMeasurements,
            MessageType::SensorMeasurements,
            MessageType::CycleMeasurements
        ]
    );
    assert_eq!(host.backend().states().cycle_measurements.vt, 480.0);
    assert_eq!(host.backend().receiver().expected_seq(), 4);
}

#[test]
fn corrupted_bytes_are_skipped() {
    let mut device = link(&[ScheduleEntry::new(1, MessageType::Parameters)]);
    let mut host = link(&[ScheduleEntry::new(1000, MessageType::Parameters)]);
    device.backend_mut().states_mut().parameters.fio2 = 40.0;

    host.transport_mut()
        .push_received(&[0x7f, 0x13, 0x55, 0xaa, 0x00, 0x05, 0x01, 0x00]);
    device.update_clock(1);
    device.send().unwrap();
    bridge(device.transport_mut(), host.transport_mut());

    assert_eq!(host.receive(), 1);
    assert_eq!(host.backend().states().parameters.fio2, 40.0);
}
