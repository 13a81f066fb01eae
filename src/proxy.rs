//! The seam between a session and the codecs that carry its packets.
//!
//! Framing, compression and encryption live on the far side of
//! [`PacketIo`]; the gateway only ever sees decoded packets.

use anyhow::Context;
use std::future::Future;

/// One end of a decoded packet stream.
///
/// `S` is the type sent through this end, `R` the type received.
pub trait PacketIo<S, R> {
    fn send_packet(&self, packet: S) -> impl Future<Output = anyhow::Result<()>> + Send;

    fn recv_packet(&self) -> impl Future<Output = anyhow::Result<R>> + Send;
}

/// `PacketIo` over a pair of bounded channels.
///
/// A full inbound queue makes the codec side wait, which in turn stops it
/// reading from the network.
pub struct ChannelPacketIo<S, R> {
    sender: flume::Sender<S>,
    receiver: flume::Receiver<R>,
}

impl<S, R> ChannelPacketIo<S, R> {
    pub fn new(sender: flume::Sender<S>, receiver: flume::Receiver<R>) -> Self {
        Self { sender, receiver }
    }

    /// Creates two connected ends. Whatever one end sends, the other
    /// receives.
    pub fn pair(capacity: usize) -> (ChannelPacketIo<S, R>, ChannelPacketIo<R, S>) {
        let (a_tx, a_rx) = flume::bounded(capacity);
        let (b_tx, b_rx) = flume::bounded(capacity);
        (Self::new(a_tx, b_rx), ChannelPacketIo::new(b_tx, a_rx))
    }

    /// Packets received but not yet taken.
    pub fn queued(&self) -> usize {
        self.receiver.len()
    }
}

impl<S, R> PacketIo<S, R> for ChannelPacketIo<S, R>
where
    S: Send + 'static,
    R: Send + 'static,
{
    async fn send_packet(&self, packet: S) -> anyhow::Result<()> {
        self.sender
            .send_async(packet)
            .await
            .ok()
            .context("disconnected")
    }

    async fn recv_packet(&self) -> anyhow::Result<R> {
        self.receiver.recv_async().await.context("disconnected")
    }
}
