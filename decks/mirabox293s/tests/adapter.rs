//! Adapter behaviour against an in-memory transport.

use std::collections::VecDeque;

use deck_sync_core::{Brightness, ControlStates, Deck, DeckError, Result, Transport};
use mirabox293s::consts::{ACK_KEY_OFFSET, ACK_MAGIC, FRAME_LENGTH, KEY_COUNT, PACKET_LENGTH};
use mirabox293s::{abi, Mirabox293S, PollState, BLANK_KEY_IMAGE};

/// Records every written report and replays queued input reports
#[derive(Default)]
struct FakeTransport {
    written: Vec<Vec<u8>>,
    input: VecDeque<Vec<u8>>,
    reads: usize,
    input_report: Vec<u8>,
    fail_writes_after: Option<usize>,
}

impl Transport for FakeTransport {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        if self.fail_writes_after.is_some_and(|n| self.written.len() >= n) {
            return Err(DeckError::Io(std::io::ErrorKind::BrokenPipe.into()));
        }
        self.written.push(data.to_vec());
        Ok(data.len())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.reads += 1;
        match self.input.pop_front() {
            Some(report) => {
                let len = report.len().min(buf.len());
                buf[..len].copy_from_slice(&report[..len]);
                Ok(len)
            },
            None => Ok(0),
        }
    }

    fn serial_number(&mut self) -> Result<Option<String>> {
        Ok(Some("293S-0001".into()))
    }

    fn read_input_report(&mut self, report_id: u8, buf: &mut [u8]) -> Result<usize> {
        assert_eq!(report_id, 0);
        let len = self.input_report.len().min(buf.len());
        buf[..len].copy_from_slice(&self.input_report[..len]);
        Ok(len)
    }
}

fn deck() -> Mirabox293S<FakeTransport> {
    Mirabox293S::new(FakeTransport::default())
}

fn ack(device_id: u8) -> Vec<u8> {
    let mut report = vec![0u8; PACKET_LENGTH];
    report[..8].copy_from_slice(&ACK_MAGIC);
    report[ACK_KEY_OFFSET] = device_id;
    report
}

/// Payload of a written report with trailing padding removed
fn payload(report: &[u8]) -> &[u8] {
    let end = report.iter().rposition(|&b| b != 0).map_or(1, |i| i + 1);
    &report[1..end]
}

#[test]
fn reset_writes_three_reports_in_order() {
    let mut deck = deck();
    deck.reset().unwrap();

    let written = &deck.transport().written;
    assert_eq!(written.len(), 3);
    assert!(written.iter().all(|r| r.len() == FRAME_LENGTH && r[0] == 0));
    assert_eq!(payload(&written[0]), b"CRT\0\0DIS");
    assert_eq!(payload(&written[1]), b"CRT\0\0CONNECT");
    assert_eq!(payload(&written[2]), b"CRT\0\0CLE\0\0\0\xff");
}

#[test]
fn reset_propagates_write_failure() {
    let mut deck = deck();
    deck.transport_mut().fail_writes_after = Some(1);
    assert!(matches!(deck.reset(), Err(DeckError::Io(_))));
    assert_eq!(deck.transport().written.len(), 1);
}

#[test]
fn brightness_is_clamped_and_scaled() {
    let cases = [
        (Brightness::Percent(-5), 0),
        (Brightness::Percent(150), 100),
        (Brightness::Percent(30), 30),
        (Brightness::Fraction(0.5), 50),
    ];
    for (brightness, percent) in cases {
        let mut deck = deck();
        deck.set_brightness(brightness).unwrap();
        let report = &deck.transport().written[0];
        assert_eq!(&report[1..13], &abi::set_brightness(percent)[..], "{brightness:?}");
        assert_eq!(report[11], percent);
    }
}

#[test]
fn key_image_is_sent_as_batch() {
    let image: Vec<u8> = (0..1300u32).map(|i| (i % 256) as u8).collect();
    let mut deck = deck();
    let mut progress = Vec::new();
    deck.set_key_image_with_progress(5, Some(&image[..]), &mut |i| progress.push(i))
        .unwrap();

    let written = &deck.transport().written;
    let pages = image.len().div_ceil(PACKET_LENGTH);
    assert_eq!(written.len(), pages + 2);
    assert!(written.iter().all(|r| r.len() == FRAME_LENGTH));

    // key 5 is device key 0x0e, 1300 = 0x0514
    assert_eq!(payload(&written[0]), b"CRT\0\0BAT\0\0\x05\x14\x0e");
    assert_eq!(payload(written.last().unwrap()), b"CRT\0\0STP");

    let mut sent = Vec::new();
    for (i, report) in written[1..=pages].iter().enumerate() {
        let remaining = image.len() - i * PACKET_LENGTH;
        sent.extend_from_slice(&report[1..1 + remaining.min(PACKET_LENGTH)]);
    }
    assert_eq!(sent, image);
    assert_eq!(progress, vec![0, 1, 2, 3]);
}

#[test]
fn missing_image_uploads_blank() {
    let mut deck = deck();
    deck.set_key_image(0, None).unwrap();
    deck.set_key_image(0, Some(&[][..])).unwrap();

    let written = &deck.transport().written;
    let pages = BLANK_KEY_IMAGE.len().div_ceil(PACKET_LENGTH);
    assert_eq!(written.len(), 2 * (pages + 2));
    let size = (BLANK_KEY_IMAGE.len() as u16).to_be_bytes();
    assert_eq!(&written[0][11..14], &[size[0], size[1], 0x0d]);
    assert_eq!(&written[1][1..], &BLANK_KEY_IMAGE[..PACKET_LENGTH]);
}

#[test]
fn out_of_range_key_writes_nothing() {
    let mut deck = deck();
    let err = deck.set_key_image(KEY_COUNT, Some(&b"jpeg"[..])).unwrap_err();
    assert!(matches!(err, DeckError::InvalidKey { key: 15, count: 15 }));
    assert!(deck.clear_key(KEY_COUNT).is_err());
    assert!(deck.transport().written.is_empty());
}

#[test]
fn oversized_image_writes_nothing() {
    let mut deck = deck();
    let image = vec![0u8; 70_000];
    let err = deck.set_key_image(3, Some(&image[..])).unwrap_err();
    assert!(matches!(err, DeckError::MediaTooLarge(_)));
    assert!(deck.transport().written.is_empty());
}

#[test]
fn clear_single_key_uses_device_id() {
    let mut deck = deck();
    deck.clear_key(14).unwrap();
    deck.clear_all().unwrap();
    let written = &deck.transport().written;
    assert_eq!(payload(&written[0]), b"CRT\0\0CLE\0\0\0\x03");
    assert_eq!(payload(&written[1]), b"CRT\0\0CLE\0\0\0\xff");
}

#[test]
fn release_report_is_paired() {
    let mut deck = deck();
    deck.transport_mut().input.push_back(ack(0x0b));

    let press = deck.read_control_states().unwrap().unwrap();
    assert_eq!(press, ControlStates::pressed(KEY_COUNT, 6));
    assert_eq!(deck.transport().reads, 1);

    let release = deck.read_control_states().unwrap().unwrap();
    assert_eq!(release, ControlStates::released(KEY_COUNT));
    assert_eq!(deck.transport().reads, 1, "release must not read the device");

    assert_eq!(deck.read_control_states().unwrap(), None);
    assert_eq!(deck.transport().reads, 2, "third poll must read the device");
}

#[test]
fn malformed_report_does_not_arm() {
    let mut deck = deck();
    let mut bad = ack(0x0b);
    bad[5] = b'N';
    deck.transport_mut().input.extend([bad, ack(0x20), ack(0x01)]);

    assert_eq!(deck.read_control_states().unwrap(), None);
    assert_eq!(deck.read_control_states().unwrap(), None);
    assert_eq!(deck.poll_state(), PollState::WaitingForHardware);

    let press = deck.read_control_states().unwrap().unwrap();
    assert_eq!(press.pressed_keys().collect::<Vec<_>>(), vec![4]);
    let release = deck.read_control_states().unwrap().unwrap();
    assert_eq!(release.pressed_keys().count(), 0);
    assert_eq!(deck.transport().reads, 3);
}

#[test]
fn decks_poll_independently() {
    let mut a = deck();
    let mut b = deck();
    a.transport_mut().input.push_back(ack(0x0d));
    b.transport_mut().input.push_back(ack(0x03));

    assert!(a.read_control_states().unwrap().is_some());
    assert_eq!(a.poll_state(), PollState::ReleasePending);
    assert_eq!(b.poll_state(), PollState::WaitingForHardware);

    let press = b.read_control_states().unwrap().unwrap();
    assert_eq!(press.pressed_keys().collect::<Vec<_>>(), vec![14]);
}

#[test]
fn serial_and_firmware() {
    let mut deck = deck();
    let mut report = vec![0u8; FRAME_LENGTH];
    report[1..8].copy_from_slice(b"V25.1.2");
    deck.transport_mut().input_report = report;

    assert_eq!(deck.serial_number().unwrap().as_deref(), Some("293S-0001"));
    assert_eq!(deck.firmware_version().unwrap(), "V25.1.2");
}

#[test]
fn touchscreen_image_is_ignored() {
    let mut deck = deck();
    deck.set_touchscreen_image(&[1, 2, 3], 0, 0, 80, 80).unwrap();
    assert!(deck.transport().written.is_empty());
}

#[test]
fn works_through_dyn_deck() {
    let mut deck: Box<dyn Deck> = Box::new(deck());
    assert_eq!(deck.info().cli_name, "mirabox293s");
    assert!(deck.info().visual);
    assert!(!deck.info().touch);
    assert_eq!(deck.info().layout.count, KEY_COUNT);

    deck.as_brightness()
        .unwrap()
        .set_brightness(Brightness::Percent(10))
        .unwrap();
    deck.as_key_images()
        .unwrap()
        .set_key_image(1, None, &mut |_| {})
        .unwrap();
    assert_eq!(deck.as_control_states().unwrap().read_control_states().unwrap(), None);
}
