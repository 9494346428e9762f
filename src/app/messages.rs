//! Operator-facing text.
//!
//! The device is deployed with a Portuguese-speaking operator, so every
//! notification and durable log record uses this fixed vocabulary.  Keeping
//! the strings here lets tests assert on them without duplicating literals.

use super::commands::{CHAT_ARM, CHAT_DISARM, CHAT_LOGS, CHAT_STATUS, CommandSource};
use super::controller::AlarmState;

pub const ALREADY_ARMED: &str = "ℹ️ O sistema já se encontra armado.";

pub const ALARM_TRIGGERED: &str = "⚠️ ALERTA! Movimento detectado! Sirene disparada!";
pub const ALARM_TRIGGERED_RECORD: &str = "Movimento detectado, alarme disparado (sirene + notificação).";

pub const LOG_EMPTY: &str = "O arquivo de log está vazio.";
pub const LOG_UNREADABLE: &str = "Erro: Não foi possível encontrar o arquivo de log.";
pub const LOG_EXPORT_FILENAME: &str = "log_sentinela.txt";

pub const BOOT_RECORD: &str = "Sistema iniciado e configurado.";

pub const LINK_CONNECTED: &str = "WiFi conectado.";
pub const LINK_CONNECT_FAILED: &str = "Falha na conexão WiFi.";
pub const LINK_LOST: &str = "Conexão Wi-Fi perdida.";
pub const LINK_RESTORED: &str = "Conexão Wi-Fi restabelecida.";
pub const LINK_RESTORED_NOTICE: &str = "✅ Sentinela: Conexão Wi-Fi restabelecida!";

/// Notification and log record for a successful arm.
pub fn armed(source: CommandSource) -> String {
    format!("🔒 Sistema ARMADO com sucesso pela origem: {}", source)
}

/// Notification and log record for a disarm.
pub fn disarmed(source: CommandSource) -> String {
    format!("✅ Sistema DESARMADO com sucesso pela origem: {}", source)
}

/// Diagnostic record for a radio code that matches neither key-fob code.
pub fn unknown_radio_code(code: u32) -> String {
    format!("Código RF desconhecido recebido: {}", code)
}

/// Reply to chat text outside the vocabulary.
pub fn help() -> String {
    format!(
        "Comando não reconhecido. Use {}, {}, {} ou {}.",
        CHAT_ARM, CHAT_DISARM, CHAT_STATUS, CHAT_LOGS
    )
}

/// Two-field status summary, rendered as rich text.
pub fn status_report(state: AlarmState) -> String {
    let system = if state.armed { "ARMADO" } else { "DESARMADO" };
    let siren = if state.triggered { "SIM" } else { "NÃO" };
    format!(
        "📊 *Status do Sentinela*\n\n*Sistema:* {}\n*Sirene Disparada:* {}",
        system, siren
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_report_fields() {
        let idle = status_report(AlarmState::default());
        assert!(idle.contains("*Sistema:* DESARMADO"));
        assert!(idle.contains("*Sirene Disparada:* NÃO"));

        let ringing = status_report(AlarmState {
            armed: true,
            triggered: true,
        });
        assert!(ringing.contains("*Sistema:* ARMADO"));
        assert!(ringing.contains("*Sirene Disparada:* SIM"));
    }

    #[test]
    fn help_lists_the_whole_vocabulary() {
        let text = help();
        for cmd in ["/armar", "/desarmar", "/status", "/logs"] {
            assert!(text.contains(cmd), "help must mention {cmd}");
        }
    }

    #[test]
    fn transition_texts_name_the_source() {
        assert!(armed(CommandSource::Chat).contains("ARMADO"));
        assert!(armed(CommandSource::Chat).ends_with("chat"));
        assert!(disarmed(CommandSource::Radio).contains("DESARMADO"));
        assert!(disarmed(CommandSource::Radio).ends_with("radio"));
    }
}
