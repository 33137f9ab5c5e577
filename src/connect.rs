//! The QR-code pairing choreography, kept as a plain state machine so the
//! dialog timers only *drive* it and tests can step it synchronously.
//!
//! No credential exchange happens anywhere in this flow; the sequence is
//! pure UI choreography ending in the persisted connected flag.

/// Pages of the connect dialog, in the order the flow visits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectState {
    /// Waiting for the user to "scan" the code.
    Qrcode,
    /// Pretend authentication in progress.
    Loading,
    /// Paired; shown briefly before the dialog closes.
    Success,
}

impl ConnectState {
    /// Stack page name for the dialog.
    pub fn page(&self) -> &'static str {
        match self {
            ConnectState::Qrcode => "qrcode",
            ConnectState::Loading => "loading",
            ConnectState::Success => "success",
        }
    }
}

/// Advances `Qrcode → Loading → Success` and back to `Qrcode`, reporting
/// completion exactly once per cycle. Out-of-order triggers are ignored.
#[derive(Debug)]
pub struct ConnectFlow {
    state: ConnectState,
}

impl ConnectFlow {
    pub fn new() -> Self {
        Self {
            state: ConnectState::Qrcode,
        }
    }

    pub fn state(&self) -> ConnectState {
        self.state
    }

    /// User tapped the QR code. Returns true when the trigger was accepted.
    pub fn scan(&mut self) -> bool {
        if self.state == ConnectState::Qrcode {
            self.state = ConnectState::Loading;
            true
        } else {
            false
        }
    }

    /// First timer fired: the fake handshake "authenticated".
    pub fn authenticated(&mut self) -> bool {
        if self.state == ConnectState::Loading {
            self.state = ConnectState::Success;
            true
        } else {
            false
        }
    }

    /// Second timer fired: the cycle is complete and the machine resets so
    /// the dialog can be reopened. True means the caller should persist the
    /// connected flag and close.
    pub fn finish(&mut self) -> bool {
        if self.state == ConnectState::Success {
            self.state = ConnectState::Qrcode;
            true
        } else {
            false
        }
    }
}

impl Default for ConnectFlow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_the_three_steps_in_order() {
        let mut flow = ConnectFlow::new();
        assert_eq!(flow.state(), ConnectState::Qrcode);
        assert!(flow.scan());
        assert_eq!(flow.state(), ConnectState::Loading);
        assert!(flow.authenticated());
        assert_eq!(flow.state(), ConnectState::Success);
        assert!(flow.finish());
        assert_eq!(flow.state(), ConnectState::Qrcode);
    }

    #[test]
    fn completion_is_reported_once_per_cycle() {
        let mut flow = ConnectFlow::new();
        flow.scan();
        flow.authenticated();
        assert!(flow.finish());
        assert!(!flow.finish());

        // next cycle reports again
        flow.scan();
        flow.authenticated();
        assert!(flow.finish());
    }

    #[test]
    fn out_of_order_triggers_are_ignored() {
        let mut flow = ConnectFlow::new();
        assert!(!flow.authenticated());
        assert!(!flow.finish());
        assert_eq!(flow.state(), ConnectState::Qrcode);

        flow.scan();
        assert!(!flow.scan());
        assert!(!flow.finish());
        assert_eq!(flow.state(), ConnectState::Loading);
    }
}
