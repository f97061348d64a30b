/// Asserts that exactly `$open` channels are open and every other channel is
/// closed with age 0, the state right after a phase switch.
#[macro_export]
macro_rules! assert_channel_population {
    ($cell:expr, $open:expr) => {
        let open = $cell.open_channel_count();
        assert_eq!(open, $open, "Open channel count mismatch");
        for ch in &$cell.channels {
            assert!(
                ch.state == secretion_data::ChannelState::Open
                    || ch.state == secretion_data::ChannelState::Closed(0),
                "{} left in state {:?} after a phase switch",
                ch.name,
                ch.state
            );
        }
    };
}

/// Asserts that no vesicle is a cluster member of two channels.
#[macro_export]
macro_rules! assert_exclusive_docking {
    ($clusters:expr, $cell:expr) => {
        for v in &$cell.vesicles {
            let owners = $cell
                .channels
                .iter()
                .filter(|c| $clusters.is_member(c.id, v.id))
                .count();
            assert!(owners <= 1, "{} docked to {} channels", v.name, owners);
        }
    };
}
