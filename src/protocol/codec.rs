//! Binary sync protocol encoder and decoder
//!
//! Every frame starts with a 1-byte message type tag. All multi-byte
//! numeric fields are little-endian.
//!
//! ```text
//! Tag 1 - INIT_DEVICES       u32 count, count x device record
//! Tag 2 - NEW_DEVICE         one device record
//! Tag 3 - INIT_MEASUREMENTS  u32 count, count x measurement record
//! Tag 4 - NEW_MEASUREMENTS   u32 count, count x measurement record
//!
//! Device record:       16 bytes id | u16 name length | name bytes (UTF-8)
//! Measurement record:  16 bytes id | 16 bytes device id | u8 kind |
//!                      f32 value | u32 unix timestamp
//! ```
//!
//! Identifiers travel as raw 16 bytes, never as text. Encoding computes
//! the exact buffer size up front; decoding rejects any buffer shorter
//! than its declared contents and any unknown tag.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::CodecError;
use crate::store::{Device, DeviceId, Measurement, MeasurementId, MeasurementKind};

/// Fixed wire size of one measurement record
const MEASUREMENT_WIRE_LEN: usize = 16 + 16 + 1 + 4 + 4;

/// Minimum wire size of one device record (empty name)
const DEVICE_WIRE_MIN_LEN: usize = 16 + 2;

/// Message type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    /// Snapshot of all devices, sent once on connect
    InitDevices,
    /// A single newly created device
    NewDevice,
    /// Snapshot of all measurements, sent once on connect
    InitMeasurements,
    /// A batch of newly created measurements
    NewMeasurements,
}

impl MessageType {
    /// Wire tag for this message type
    pub fn tag(&self) -> u8 {
        match self {
            MessageType::InitDevices => 1,
            MessageType::NewDevice => 2,
            MessageType::InitMeasurements => 3,
            MessageType::NewMeasurements => 4,
        }
    }

    /// Look up a message type by its wire tag
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(MessageType::InitDevices),
            2 => Some(MessageType::NewDevice),
            3 => Some(MessageType::InitMeasurements),
            4 => Some(MessageType::NewMeasurements),
            _ => None,
        }
    }
}

/// A decoded protocol frame
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Full device snapshot
    InitDevices(Vec<Device>),
    /// Incremental device creation
    NewDevice(Device),
    /// Full measurement snapshot
    InitMeasurements(Vec<Measurement>),
    /// Incremental measurement batch
    NewMeasurements(Vec<Measurement>),
}

impl Frame {
    /// Message type of this frame
    pub fn message_type(&self) -> MessageType {
        match self {
            Frame::InitDevices(_) => MessageType::InitDevices,
            Frame::NewDevice(_) => MessageType::NewDevice,
            Frame::InitMeasurements(_) => MessageType::InitMeasurements,
            Frame::NewMeasurements(_) => MessageType::NewMeasurements,
        }
    }

    /// Exact encoded size of this frame in bytes
    pub fn encoded_len(&self) -> Result<usize, CodecError> {
        let len = match self {
            Frame::InitDevices(devices) => {
                let mut len = 1 + 4;
                for device in devices {
                    len += device_wire_len(device)?;
                }
                len
            }
            Frame::NewDevice(device) => 1 + device_wire_len(device)?,
            Frame::InitMeasurements(measurements) | Frame::NewMeasurements(measurements) => {
                1 + 4 + measurements.len() * MEASUREMENT_WIRE_LEN
            }
        };
        Ok(len)
    }

    /// Encode this frame into an exactly-sized buffer
    pub fn encode(&self) -> Result<Bytes, CodecError> {
        let len = self.encoded_len()?;
        let mut buf = BytesMut::with_capacity(len);
        buf.put_u8(self.message_type().tag());

        match self {
            Frame::InitDevices(devices) => {
                buf.put_u32_le(devices.len() as u32);
                for device in devices {
                    encode_device(&mut buf, device)?;
                }
            }
            Frame::NewDevice(device) => {
                encode_device(&mut buf, device)?;
            }
            Frame::InitMeasurements(measurements) | Frame::NewMeasurements(measurements) => {
                buf.put_u32_le(measurements.len() as u32);
                for measurement in measurements {
                    encode_measurement(&mut buf, measurement);
                }
            }
        }

        debug_assert_eq!(buf.len(), len);
        Ok(buf.freeze())
    }

    /// Decode a single frame from the buffer
    ///
    /// Consumes exactly one frame's worth of bytes on success. Any failure
    /// means the frame is malformed and the producing connection should be
    /// considered desynchronized.
    pub fn decode(buf: &mut Bytes) -> Result<Frame, CodecError> {
        if buf.is_empty() {
            return Err(CodecError::UnexpectedEof);
        }

        let tag = buf.get_u8();
        let message_type =
            MessageType::from_tag(tag).ok_or(CodecError::UnknownMessageType(tag))?;

        match message_type {
            MessageType::InitDevices => {
                let count = decode_count(buf, DEVICE_WIRE_MIN_LEN)?;
                let mut devices = Vec::with_capacity(count);
                for _ in 0..count {
                    devices.push(decode_device(buf)?);
                }
                Ok(Frame::InitDevices(devices))
            }
            MessageType::NewDevice => Ok(Frame::NewDevice(decode_device(buf)?)),
            MessageType::InitMeasurements => {
                let count = decode_count(buf, MEASUREMENT_WIRE_LEN)?;
                let mut measurements = Vec::with_capacity(count);
                for _ in 0..count {
                    measurements.push(decode_measurement(buf)?);
                }
                Ok(Frame::InitMeasurements(measurements))
            }
            MessageType::NewMeasurements => {
                let count = decode_count(buf, MEASUREMENT_WIRE_LEN)?;
                let mut measurements = Vec::with_capacity(count);
                for _ in 0..count {
                    measurements.push(decode_measurement(buf)?);
                }
                Ok(Frame::NewMeasurements(measurements))
            }
        }
    }
}

/// Wire size of one device record, failing if the name cannot be framed
fn device_wire_len(device: &Device) -> Result<usize, CodecError> {
    let name_len = device.name.len();
    if name_len > u16::MAX as usize {
        return Err(CodecError::NameTooLong(name_len));
    }
    Ok(DEVICE_WIRE_MIN_LEN + name_len)
}

fn encode_device(buf: &mut BytesMut, device: &Device) -> Result<(), CodecError> {
    let name_len = device.name.len();
    if name_len > u16::MAX as usize {
        return Err(CodecError::NameTooLong(name_len));
    }

    buf.put_slice(device.id.as_bytes());
    buf.put_u16_le(name_len as u16);
    buf.put_slice(device.name.as_bytes());
    Ok(())
}

fn encode_measurement(buf: &mut BytesMut, measurement: &Measurement) {
    buf.put_slice(measurement.id.as_bytes());
    buf.put_slice(measurement.device_id.as_bytes());
    buf.put_u8(measurement.kind.tag());
    buf.put_f32_le(measurement.value);
    buf.put_u32_le(measurement.created_at);
}

/// Read a u32 record count and reject counts the buffer cannot possibly hold
fn decode_count(buf: &mut Bytes, min_record_len: usize) -> Result<usize, CodecError> {
    if buf.remaining() < 4 {
        return Err(CodecError::UnexpectedEof);
    }
    let count = buf.get_u32_le() as usize;
    if count.saturating_mul(min_record_len) > buf.remaining() {
        return Err(CodecError::UnexpectedEof);
    }
    Ok(count)
}

fn decode_device(buf: &mut Bytes) -> Result<Device, CodecError> {
    if buf.remaining() < DEVICE_WIRE_MIN_LEN {
        return Err(CodecError::UnexpectedEof);
    }

    let mut id = [0u8; 16];
    buf.copy_to_slice(&mut id);

    let name_len = buf.get_u16_le() as usize;
    if buf.remaining() < name_len {
        return Err(CodecError::UnexpectedEof);
    }
    let name_bytes = buf.copy_to_bytes(name_len);
    let name = String::from_utf8(name_bytes.to_vec()).map_err(|_| CodecError::InvalidUtf8)?;

    Ok(Device {
        id: DeviceId::from_bytes(id),
        name,
    })
}

fn decode_measurement(buf: &mut Bytes) -> Result<Measurement, CodecError> {
    if buf.remaining() < MEASUREMENT_WIRE_LEN {
        return Err(CodecError::UnexpectedEof);
    }

    let mut id = [0u8; 16];
    buf.copy_to_slice(&mut id);
    let mut device_id = [0u8; 16];
    buf.copy_to_slice(&mut device_id);

    let kind_tag = buf.get_u8();
    let kind = MeasurementKind::from_tag(kind_tag).ok_or(CodecError::UnknownKind(kind_tag))?;

    let value = buf.get_f32_le();
    let created_at = buf.get_u32_le();

    Ok(Measurement {
        id: MeasurementId::from_bytes(id),
        device_id: DeviceId::from_bytes(device_id),
        kind,
        value,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(id_byte: u8, name: &str) -> Device {
        Device {
            id: DeviceId::from_bytes([id_byte; 16]),
            name: name.to_string(),
        }
    }

    fn measurement(id_byte: u8, device_byte: u8) -> Measurement {
        Measurement {
            id: MeasurementId::from_bytes([id_byte; 16]),
            device_id: DeviceId::from_bytes([device_byte; 16]),
            kind: MeasurementKind::Temperature,
            value: 21.5,
            created_at: 1_700_000_000,
        }
    }

    #[test]
    fn test_new_device_exact_bytes() {
        let frame = Frame::NewDevice(device(0xAA, "ab"));
        let encoded = frame.encode().unwrap();

        let mut expected = vec![2u8]; // NEW_DEVICE tag
        expected.extend_from_slice(&[0xAA; 16]);
        expected.extend_from_slice(&[2, 0]); // name length, little-endian
        expected.extend_from_slice(b"ab");

        assert_eq!(&encoded[..], &expected[..]);
    }

    #[test]
    fn test_new_measurements_exact_bytes() {
        let frame = Frame::NewMeasurements(vec![measurement(0x11, 0x22)]);
        let encoded = frame.encode().unwrap();

        let mut expected = vec![4u8]; // NEW_MEASUREMENTS tag
        expected.extend_from_slice(&[1, 0, 0, 0]); // count
        expected.extend_from_slice(&[0x11; 16]);
        expected.extend_from_slice(&[0x22; 16]);
        expected.push(1); // temperature kind tag
        expected.extend_from_slice(&21.5f32.to_le_bytes());
        expected.extend_from_slice(&1_700_000_000u32.to_le_bytes());

        assert_eq!(encoded.len(), 1 + 4 + 41);
        assert_eq!(&encoded[..], &expected[..]);
    }

    #[test]
    fn test_empty_snapshots_encode_to_header_only() {
        let devices = Frame::InitDevices(Vec::new()).encode().unwrap();
        assert_eq!(&devices[..], &[1, 0, 0, 0, 0]);

        let measurements = Frame::InitMeasurements(Vec::new()).encode().unwrap();
        assert_eq!(&measurements[..], &[3, 0, 0, 0, 0]);
    }

    #[test]
    fn test_device_round_trip() {
        let frame = Frame::InitDevices(vec![device(0x01, "kitchen"), device(0x02, "bedroom")]);
        let mut encoded = frame.encode().unwrap();

        let decoded = Frame::decode(&mut encoded).unwrap();
        assert_eq!(decoded, frame);
        assert!(encoded.is_empty());
    }

    #[test]
    fn test_measurement_round_trip() {
        let frame = Frame::InitMeasurements(vec![
            Measurement {
                id: MeasurementId::from_bytes([3; 16]),
                device_id: DeviceId::from_bytes([4; 16]),
                kind: MeasurementKind::Humidity,
                value: 40.25,
                created_at: 123,
            },
            Measurement {
                id: MeasurementId::from_bytes([5; 16]),
                device_id: DeviceId::from_bytes([4; 16]),
                kind: MeasurementKind::Lightness,
                value: -1.5,
                created_at: u32::MAX,
            },
        ]);

        let mut encoded = frame.encode().unwrap();
        assert_eq!(Frame::decode(&mut encoded).unwrap(), frame);
    }

    #[test]
    fn test_multibyte_utf8_name_round_trip() {
        let frame = Frame::NewDevice(device(0x07, "küche 🌡"));
        let mut encoded = frame.encode().unwrap();

        match Frame::decode(&mut encoded).unwrap() {
            Frame::NewDevice(decoded) => assert_eq!(decoded.name, "küche 🌡"),
            other => panic!("unexpected frame: {:?}", other),
        }
    }

    #[test]
    fn test_name_length_is_bytes_not_chars() {
        let name = "🌡"; // 4 bytes, 1 char
        let frame = Frame::NewDevice(device(0x08, name));
        let encoded = frame.encode().unwrap();

        // length prefix sits right after the tag and the 16 id bytes
        assert_eq!(encoded[17], 4);
        assert_eq!(encoded[18], 0);
    }

    #[test]
    fn test_name_too_long_rejected() {
        let frame = Frame::NewDevice(device(0x09, &"x".repeat(u16::MAX as usize + 1)));
        assert_eq!(
            frame.encode(),
            Err(CodecError::NameTooLong(u16::MAX as usize + 1))
        );
    }

    #[test]
    fn test_name_at_max_length_accepted() {
        let frame = Frame::NewDevice(device(0x0A, &"x".repeat(u16::MAX as usize)));
        let mut encoded = frame.encode().unwrap();
        assert_eq!(Frame::decode(&mut encoded).unwrap(), frame);
    }

    #[test]
    fn test_decode_empty_buffer() {
        let mut buf = Bytes::new();
        assert_eq!(Frame::decode(&mut buf), Err(CodecError::UnexpectedEof));
    }

    #[test]
    fn test_decode_unknown_tag() {
        let mut buf = Bytes::from_static(&[99, 0, 0, 0, 0]);
        assert_eq!(
            Frame::decode(&mut buf),
            Err(CodecError::UnknownMessageType(99))
        );
    }

    #[test]
    fn test_decode_truncated_at_every_step() {
        let frame = Frame::InitMeasurements(vec![measurement(0x11, 0x22)]);
        let full = frame.encode().unwrap();

        // Chopping the frame anywhere short of its full length must fail.
        for len in 0..full.len() {
            let mut truncated = full.slice(..len);
            assert_eq!(
                Frame::decode(&mut truncated),
                Err(CodecError::UnexpectedEof),
                "length {}",
                len
            );
        }
    }

    #[test]
    fn test_decode_count_larger_than_buffer() {
        // INIT_DEVICES declaring u32::MAX records with no payload.
        let mut buf = Bytes::from_static(&[1, 0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(Frame::decode(&mut buf), Err(CodecError::UnexpectedEof));
    }

    #[test]
    fn test_decode_unknown_kind() {
        let mut bad = BytesMut::new();
        bad.put_u8(4); // NEW_MEASUREMENTS
        bad.put_u32_le(1);
        bad.put_slice(&[0x11; 16]);
        bad.put_slice(&[0x22; 16]);
        bad.put_u8(7); // no such kind
        bad.put_f32_le(0.0);
        bad.put_u32_le(0);

        let mut buf = bad.freeze();
        assert_eq!(Frame::decode(&mut buf), Err(CodecError::UnknownKind(7)));
    }

    #[test]
    fn test_decode_invalid_utf8_name() {
        let mut bad = BytesMut::new();
        bad.put_u8(2); // NEW_DEVICE
        bad.put_slice(&[0x11; 16]);
        bad.put_u16_le(2);
        bad.put_slice(&[0xFF, 0xFE]);

        let mut buf = bad.freeze();
        assert_eq!(Frame::decode(&mut buf), Err(CodecError::InvalidUtf8));
    }

    #[test]
    fn test_encoded_len_matches_encode() {
        let frames = [
            Frame::InitDevices(vec![device(1, "kitchen"), device(2, "küche")]),
            Frame::NewDevice(device(3, "garage")),
            Frame::InitMeasurements(vec![measurement(4, 1), measurement(5, 2)]),
            Frame::NewMeasurements(Vec::new()),
        ];

        for frame in frames {
            let encoded = frame.encode().unwrap();
            assert_eq!(encoded.len(), frame.encoded_len().unwrap());
        }
    }
}
