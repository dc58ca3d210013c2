//! Fuzz target for channel transition sequences
//!
//! Drives a ChannelSet through arbitrary writes and seeds and checks after
//! every step that:
//! - The reflected overall only changes through a write
//! - A write that reflects a new overall also reports it
//! - Only error channels carry error text
//! - A surfaced error exists exactly when some channel is in error

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use nostrframe_core::{ChannelAction, ChannelKey, ChannelSet, Status};

#[derive(Debug, Clone, Copy, Arbitrary)]
enum FuzzStatus {
    Idle,
    Loading,
    Ready,
    Error,
}

impl From<FuzzStatus> for Status {
    fn from(status: FuzzStatus) -> Self {
        match status {
            FuzzStatus::Idle => Status::Idle,
            FuzzStatus::Loading => Status::Loading,
            FuzzStatus::Ready => Status::Ready,
            FuzzStatus::Error => Status::Error,
        }
    }
}

#[derive(Debug, Arbitrary)]
enum Op {
    Set { key: u8, status: FuzzStatus, message: Option<String> },
    Seed { key: u8, status: FuzzStatus },
}

fn key(index: u8) -> ChannelKey {
    match index % 5 {
        0 => ChannelKey::CONNECTION,
        1 => ChannelKey::EVENT,
        2 => ChannelKey::AUTHOR,
        3 => ChannelKey::PROFILE,
        _ => ChannelKey::new("custom"),
    }
}

fuzz_target!(|ops: Vec<Op>| {
    let mut channels = ChannelSet::new();

    for op in ops.into_iter().take(256) {
        let reflected_before = channels.reflected_overall();

        match op {
            Op::Set { key: index, status, message } => {
                let actions = channels.set(key(index), status.into(), message);
                let changed = actions.iter().find_map(|action| match action {
                    ChannelAction::StatusChanged(overall) => Some(*overall),
                    _ => None,
                });
                match changed {
                    Some(overall) => {
                        assert_ne!(overall, reflected_before);
                        assert_eq!(overall, channels.reflected_overall());
                        assert_eq!(overall, channels.overall());
                    }
                    None => assert_eq!(channels.reflected_overall(), reflected_before),
                }
            }
            Op::Seed { key: index, status } => {
                channels.seed(key(index), status.into());
                assert_eq!(channels.reflected_overall(), reflected_before);
            }
        }

        let mut any_error = false;
        for (_, channel) in channels.iter() {
            let is_error = channel.status() == Status::Error;
            any_error |= is_error;
            assert_eq!(channel.error_message().is_some(), is_error);
        }
        assert_eq!(channels.error_message().is_some(), any_error);
    }
});
