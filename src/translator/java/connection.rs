use crate::{
    phase::Phase,
    protocol::{
        bedrock,
        java::{client, server},
    },
    session::Session,
    translator::{in_phase, Translator},
};

pub struct LoginSuccessTranslator;

impl Translator for LoginSuccessTranslator {
    type Source = server::Packet;
    type Packet = server::LoginSuccess;

    fn translate(&self, session: &mut Session, packet: &server::LoginSuccess) {
        if !in_phase(session, &[Phase::Login], "login success") {
            return;
        }
        tracing::info!(
            "{} logged in to the Java server as {} ({})",
            session.identity().display_name,
            packet.username,
            packet.uuid
        );
        session.send_java(client::LoginAcknowledged);
        session.transition(Phase::Configuration);
    }
}

pub struct FinishConfigurationTranslator;

impl Translator for FinishConfigurationTranslator {
    type Source = server::Packet;
    type Packet = server::FinishConfiguration;

    fn translate(&self, session: &mut Session, _packet: &server::FinishConfiguration) {
        if !in_phase(session, &[Phase::Configuration], "finish configuration") {
            return;
        }
        session.send_java(client::FinishConfiguration);
        session.transition(Phase::Spawning);
    }
}

pub struct KeepAliveTranslator;

impl Translator for KeepAliveTranslator {
    type Source = server::Packet;
    type Packet = server::KeepAlive;

    fn translate(&self, session: &mut Session, packet: &server::KeepAlive) {
        session.send_java(client::KeepAlive { id: packet.id });
    }
}

pub struct DisconnectTranslator;

impl Translator for DisconnectTranslator {
    type Source = server::Packet;
    type Packet = server::Disconnect;

    fn translate(&self, session: &mut Session, packet: &server::Disconnect) {
        tracing::info!("Java server disconnected {}: {}", session.identity().display_name, packet.reason);
        session.disconnect(packet.reason.clone());
    }
}

pub struct StartConfigurationTranslator;

impl Translator for StartConfigurationTranslator {
    type Source = server::Packet;
    type Packet = server::StartConfiguration;

    fn translate(&self, session: &mut Session, _packet: &server::StartConfiguration) {
        if !in_phase(session, &[Phase::Play], "start configuration") {
            return;
        }
        session.reconfigure();
    }
}

pub struct TransferTranslator;

impl Translator for TransferTranslator {
    type Source = server::Packet;
    type Packet = server::Transfer;

    fn translate(&self, session: &mut Session, packet: &server::Transfer) {
        if !in_phase(
            session,
            &[Phase::Configuration, Phase::Spawning, Phase::Play],
            "transfer",
        ) {
            return;
        }
        session.send_bedrock(bedrock::server::Transfer {
            address: packet.host.clone(),
            port: packet.port,
        });
        session.disconnect_silently(format!("Transferred to {}:{}", packet.host, packet.port));
    }
}
