/// The lifecycle phase of a session.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, strum::AsRefStr)]
pub enum Phase {
    Handshake,
    Login,
    Configuration,
    Spawning,
    Play,
    Transferring,
    Disconnected,
}

impl Phase {
    /// Whether `self -> to` is a legal transition.
    pub fn can_transition_to(self, to: Phase) -> bool {
        use Phase::*;
        match (self, to) {
            (Disconnected, _) => false,
            (_, Disconnected) => true,
            (Handshake, Login)
            | (Login, Configuration)
            | (Configuration, Spawning)
            | (Spawning, Play)
            | (Play, Transferring)
            | (Transferring, Configuration) => true,
            _ => false,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Phase::Disconnected
    }
}
